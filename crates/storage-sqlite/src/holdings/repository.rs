use async_trait::async_trait;
use diesel::prelude::*;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

use super::model::PositionDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::{accounts, positions};
use stockfolio_core::errors::{Error, Result};
use stockfolio_core::portfolio::holdings::{
    LedgerSnapshot, Position, PositionRepositoryTrait, PositionSet,
};

/// Stores each account's position set together with a version counter kept
/// on the account row.
pub struct PositionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PositionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn account_version(conn: &mut SqliteConnection, account_id: &str) -> Result<i64> {
    accounts::table
        .find(account_id)
        .select(accounts::positions_version)
        .first::<i64>(conn)
        .optional()
        .into_core()?
        .ok_or_else(|| Error::NotFound(format!("Account {}", account_id)))
}

fn load_rows(conn: &mut SqliteConnection, account_id: &str) -> Result<Vec<PositionDB>> {
    positions::table
        .filter(positions::account_id.eq(account_id))
        .select(PositionDB::as_select())
        .order(positions::symbol.asc())
        .load::<PositionDB>(conn)
        .into_core()
}

#[async_trait]
impl PositionRepositoryTrait for PositionRepository {
    fn load_positions(&self, account_id: &str) -> Result<LedgerSnapshot> {
        let mut pooled = get_connection(&self.pool)?;
        let conn: &mut SqliteConnection = &mut pooled;

        // One read transaction so the version and the rows come from the same
        // committed state.
        let (version, rows) = conn
            .transaction::<_, StorageError, _>(|c| {
                let version = account_version(c, account_id)?;
                let rows = load_rows(c, account_id)?;
                Ok((version, rows))
            })
            .map_err(Error::from)?;

        let positions = rows
            .into_iter()
            .map(Position::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(LedgerSnapshot::new(
            version,
            PositionSet::from_positions(account_id, positions),
        ))
    }

    async fn save_positions(&self, snapshot: LedgerSnapshot) -> Result<i64> {
        self.writer
            .exec(move |conn| {
                let account_id = snapshot.account_id().to_string();
                let current = account_version(conn, &account_id)?;
                if current != snapshot.version {
                    return Err(Error::ConcurrentModification(format!(
                        "positions of account {} changed (read version {}, stored version {})",
                        account_id, snapshot.version, current
                    )));
                }

                let stored: HashMap<String, PositionDB> = load_rows(conn, &account_id)?
                    .into_iter()
                    .map(|row| (row.id.clone(), row))
                    .collect();
                let now = chrono::Utc::now().naive_utc();

                let removed: Vec<String> = stored
                    .keys()
                    .filter(|id| snapshot.positions.get_by_id(id).is_none())
                    .cloned()
                    .collect();
                if !removed.is_empty() {
                    diesel::delete(positions::table.filter(positions::id.eq_any(removed)))
                        .execute(conn)
                        .into_core()?;
                }

                for position in snapshot.positions.iter() {
                    match stored.get(&position.id) {
                        Some(row) if row.matches(position) => {}
                        Some(_) => {
                            diesel::update(positions::table.find(&position.id))
                                .set((
                                    positions::display_name.eq(&position.display_name),
                                    positions::quantity.eq(position.quantity.to_string()),
                                    positions::average_cost.eq(position.average_cost.to_string()),
                                    positions::total_cost_basis
                                        .eq(position.total_cost_basis.to_string()),
                                    positions::updated_at.eq(position.updated_at),
                                ))
                                .execute(conn)
                                .into_core()?;
                        }
                        None => {
                            diesel::insert_into(positions::table)
                                .values(PositionDB::from_domain(position))
                                .execute(conn)
                                .into_core()?;
                        }
                    }
                }

                let next = current + 1;
                diesel::update(accounts::table.find(&account_id))
                    .set((
                        accounts::positions_version.eq(next),
                        accounts::updated_at.eq(now),
                    ))
                    .execute(conn)
                    .into_core()?;

                debug!(
                    "Stored {} positions for account {} at version {}",
                    snapshot.positions.len(),
                    account_id,
                    next
                );
                Ok(next)
            })
            .await
    }

    fn find_position_owner(&self, position_id: &str) -> Result<Option<String>> {
        let mut conn = get_connection(&self.pool)?;

        positions::table
            .find(position_id)
            .select(positions::account_id)
            .first::<String>(&mut conn)
            .optional()
            .into_core()
    }
}
