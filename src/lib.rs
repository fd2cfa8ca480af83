//! Kit Ledger - Elo rating ledger for kit-scoped competition
//!
//! This crate persists per-kit player rating records and updates them from
//! head-to-head match outcomes, with provisional-player weighting and
//! lost-update protection on concurrent match commits.

pub mod config;
pub mod error;
pub mod rating;
pub mod store;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{LedgerError, Result};
pub use types::*;

// Re-export key components
pub use rating::RatingEngine;
pub use store::{InMemoryStore, PostgresStore, RatingStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
