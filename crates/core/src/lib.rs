//! Stockfolio Core - Domain entities, the holdings ledger, services, and traits.
//!
//! This crate contains the core business logic for Stockfolio.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod accounts;
pub mod constants;
pub mod demo;
pub mod errors;
pub mod portfolio;

// Re-export common types from the portfolio module
pub use portfolio::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
