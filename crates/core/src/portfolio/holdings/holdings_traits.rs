//! Position repository and holdings service traits.

use async_trait::async_trait;

use super::holdings_model::{
    LedgerSnapshot, NewAcquisition, PortfolioSummary, Position, PositionUpdate,
};
use crate::errors::Result;

/// Persistence boundary for position sets.
///
/// The repository stores one versioned position set per account. It never
/// performs ledger arithmetic.
#[async_trait]
pub trait PositionRepositoryTrait: Send + Sync {
    /// Loads an account's positions along with the current version.
    ///
    /// Fails with `Error::NotFound` when the account does not exist.
    fn load_positions(&self, account_id: &str) -> Result<LedgerSnapshot>;

    /// Atomically replaces the stored position set.
    ///
    /// Succeeds only if the stored version still equals `snapshot.version`,
    /// otherwise fails with `Error::ConcurrentModification` and leaves the
    /// stored set untouched. Returns the new version.
    async fn save_positions(&self, snapshot: LedgerSnapshot) -> Result<i64>;

    /// Returns the id of the account owning a position, if the position exists.
    fn find_position_owner(&self, position_id: &str) -> Result<Option<String>>;
}

/// Holdings operations exposed to the API layer.
#[async_trait]
pub trait HoldingsServiceTrait: Send + Sync {
    /// Lists an account's positions ordered by symbol.
    fn get_positions(&self, account_id: &str) -> Result<Vec<Position>>;

    /// Applies an acquisition and persists the result.
    async fn acquire(&self, acquisition: NewAcquisition) -> Result<Position>;

    /// Overwrites a position's quantity and average cost.
    async fn set_position(&self, position_id: &str, update: PositionUpdate) -> Result<Position>;

    /// Removes a position by id. Unknown ids are not an error.
    async fn remove_position(&self, position_id: &str) -> Result<Option<Position>>;

    /// Removes an account's position for `symbol`. Absent symbols are not an error.
    async fn remove_symbol(&self, account_id: &str, symbol: &str) -> Result<Option<Position>>;

    /// Aggregates the account's cost basis.
    fn portfolio_summary(&self, account_id: &str) -> Result<PortfolioSummary>;
}
