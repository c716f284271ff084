//! Portfolio module - holdings ledger and related services.

pub mod holdings;
