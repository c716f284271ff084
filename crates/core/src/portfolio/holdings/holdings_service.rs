use async_trait::async_trait;
use dashmap::DashMap;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::holdings_model::{
    NewAcquisition, PortfolioSummary, Position, PositionSet, PositionUpdate,
};
use super::holdings_traits::{HoldingsServiceTrait, PositionRepositoryTrait};
use crate::constants::DEFAULT_MAX_WRITE_ATTEMPTS;
use crate::errors::{Error, LedgerError, Result};

/// Applies ledger operations to persisted position sets.
///
/// Every mutation is a read-modify-write: load the account's snapshot, apply
/// the ledger, save with the version that was read. Mutations for the same
/// account are serialized in-process by a per-account mutex; the version check
/// in the repository covers writers outside this process. A version conflict
/// restarts the whole cycle, up to `max_write_attempts` times.
pub struct HoldingsService {
    position_repository: Arc<dyn PositionRepositoryTrait>,
    account_locks: DashMap<String, Arc<Mutex<()>>>,
    max_write_attempts: u32,
}

impl HoldingsService {
    pub fn new(position_repository: Arc<dyn PositionRepositoryTrait>) -> Self {
        Self {
            position_repository,
            account_locks: DashMap::new(),
            max_write_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
        }
    }

    pub fn with_max_write_attempts(mut self, attempts: u32) -> Self {
        self.max_write_attempts = attempts.max(1);
        self
    }

    fn account_lock<'a>(&'a self, account_id: &'a str) -> AccountLockLease<'a> {
        let lock = self
            .account_locks
            .entry(account_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        AccountLockLease {
            locks: &self.account_locks,
            account_id,
            lock,
        }
    }

    #[cfg(test)]
    pub(crate) fn tracked_account_locks(&self) -> usize {
        self.account_locks.len()
    }

    async fn mutate<T, F>(&self, account_id: &str, op: F) -> Result<T>
    where
        T: Send,
        F: Fn(&mut PositionSet) -> std::result::Result<T, LedgerError> + Send + Sync,
    {
        let lease = self.account_lock(account_id);
        let _guard = lease.lock.clone().lock_owned().await;

        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut snapshot = self.position_repository.load_positions(account_id)?;
            let before = snapshot.positions.clone();
            let outcome = op(&mut snapshot.positions)?;

            if snapshot.positions == before {
                debug!("No change to positions of account {}", account_id);
                return Ok(outcome);
            }

            let read_version = snapshot.version;
            match self.position_repository.save_positions(snapshot).await {
                Ok(version) => {
                    debug!(
                        "Saved positions of account {} (version {} -> {})",
                        account_id, read_version, version
                    );
                    return Ok(outcome);
                }
                Err(Error::ConcurrentModification(reason))
                    if attempt < self.max_write_attempts =>
                {
                    warn!(
                        "Version conflict saving account {} (attempt {}/{}): {}",
                        account_id, attempt, self.max_write_attempts, reason
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// A clone of an account's mutex taken from the lock map. Dropping the last
/// lease removes the map entry, so the map only holds accounts with a
/// mutation in flight.
struct AccountLockLease<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    account_id: &'a str,
    lock: Arc<Mutex<()>>,
}

impl Drop for AccountLockLease<'_> {
    fn drop(&mut self) {
        // The map and this lease hold the only references: nobody else is
        // waiting on the mutex.
        self.locks.remove_if(self.account_id, |_, lock| {
            Arc::ptr_eq(lock, &self.lock) && Arc::strong_count(lock) == 2
        });
    }
}

#[async_trait]
impl HoldingsServiceTrait for HoldingsService {
    fn get_positions(&self, account_id: &str) -> Result<Vec<Position>> {
        let snapshot = self.position_repository.load_positions(account_id)?;
        Ok(snapshot.positions.into_positions())
    }

    async fn acquire(&self, acquisition: NewAcquisition) -> Result<Position> {
        acquisition.validate()?;
        let NewAcquisition {
            account_id,
            symbol,
            display_name,
            quantity,
            price,
        } = acquisition;

        let position = self
            .mutate(&account_id, |set| {
                set.acquire(&symbol, &display_name, quantity, price)
            })
            .await?;
        info!(
            "Account {} acquired {} {} @ {}",
            account_id, quantity, position.symbol, price
        );
        Ok(position)
    }

    async fn set_position(&self, position_id: &str, update: PositionUpdate) -> Result<Position> {
        let account_id = self
            .position_repository
            .find_position_owner(position_id)?
            .ok_or_else(|| LedgerError::PositionNotFound(position_id.to_string()))?;

        let position = self
            .mutate(&account_id, |set| {
                set.set_absolute(position_id, update.quantity, update.price)
            })
            .await?;
        info!(
            "Position {} set to quantity={}, average_cost={}",
            position_id, position.quantity, position.average_cost
        );
        Ok(position)
    }

    async fn remove_position(&self, position_id: &str) -> Result<Option<Position>> {
        let Some(account_id) = self.position_repository.find_position_owner(position_id)? else {
            debug!("Position {} already absent", position_id);
            return Ok(None);
        };

        let removed = self
            .mutate(&account_id, |set| {
                let symbol = set.get_by_id(position_id).map(|p| p.symbol.clone());
                Ok(symbol.and_then(|s| set.remove(&s)))
            })
            .await?;
        if let Some(position) = &removed {
            info!("Removed position {} ({})", position.id, position.symbol);
        }
        Ok(removed)
    }

    async fn remove_symbol(&self, account_id: &str, symbol: &str) -> Result<Option<Position>> {
        self.mutate(account_id, |set| Ok(set.remove(symbol))).await
    }

    fn portfolio_summary(&self, account_id: &str) -> Result<PortfolioSummary> {
        let snapshot = self.position_repository.load_positions(account_id)?;
        let total_cost_basis = snapshot.positions.total_market_value_at_cost()?;
        Ok(PortfolioSummary {
            account_id: account_id.to_string(),
            position_count: snapshot.positions.len(),
            total_cost_basis,
        })
    }
}
