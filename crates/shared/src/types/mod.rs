//! Common types used across the application.

pub mod actor;
pub mod id;
pub mod money;

pub use actor::{Actor, UserRole};
pub use id::*;
pub use money::{Currency, Money};
