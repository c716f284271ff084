//! Holdings module - the position ledger and the service persisting it.

mod holdings_ledger;
mod holdings_model;
mod holdings_service;
mod holdings_traits;

pub use holdings_model::*;
pub use holdings_service::HoldingsService;
pub use holdings_traits::*;


#[cfg(test)]
mod holdings_service_tests;
