//! Human-readable identifier formats.
//!
//! Vouchers are numbered `<PREFIX>-<YEAR>-<SEQ>` per transaction type,
//! statements `SOA-<YYYYMMDD>-<SEQ>`. Sequences come from the store's
//! serialized counters, keyed by `(kind, period)`; this module only defines
//! the keys and the formats.
//!
//! # Modules
//!
//! - `format` - Prefix table, sequence keys, and identifier rendering

pub mod format;

pub use format::{NumberKind, format_identifier};
