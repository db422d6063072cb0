//! Shared types and configuration for Cartage.
//!
//! This crate provides common types used across all other crates:
//! - Money types with decimal precision
//! - Typed IDs for type-safe entity references
//! - Resolved actors and the role hierarchy
//! - Configuration management

pub mod config;
pub mod types;

pub use config::EngineConfig;
pub use types::{Actor, Money, UserRole};
