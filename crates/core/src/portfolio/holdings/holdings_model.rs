//! Holdings domain models: positions, position sets and persisted snapshots.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::errors::{Result, ValidationError};

/// One account's holding of a single symbol.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub account_id: String,
    pub symbol: String,
    pub display_name: String,
    pub quantity: Decimal,
    /// Volume-weighted average cost per unit, derived from `total_cost_basis`.
    pub average_cost: Decimal,
    /// Exact sum of `quantity * price` over all fills. Never rounded, so merges
    /// give the same result in any order.
    pub total_cost_basis: Decimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Position {
    /// Position ids are derived from the owning account and the symbol, so
    /// re-acquiring a symbol after it was removed yields the same id.
    pub fn id_for(account_id: &str, symbol: &str) -> String {
        Uuid::new_v5(
            &Uuid::NAMESPACE_OID,
            format!("{}/{}", account_id, symbol).as_bytes(),
        )
        .to_string()
    }

    /// Opens a position from its first fill, stamped `at`.
    ///
    /// Returns `None` when `quantity * price` overflows. The average cost is
    /// the price as given; the ledger applies its rounding policy.
    pub fn open(
        account_id: &str,
        symbol: &str,
        display_name: &str,
        quantity: Decimal,
        price: Decimal,
        at: NaiveDateTime,
    ) -> Option<Self> {
        Some(Self {
            id: Self::id_for(account_id, symbol),
            account_id: account_id.to_string(),
            symbol: symbol.to_string(),
            display_name: display_name.to_string(),
            quantity,
            average_cost: price,
            total_cost_basis: quantity.checked_mul(price)?,
            created_at: at,
            updated_at: at,
        })
    }

    /// `quantity * average_cost`, `None` on overflow.
    pub fn value_at_cost(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.average_cost)
    }
}

/// The positions owned by one account, keyed by normalized symbol.
///
/// Iteration is ordered by symbol.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PositionSet {
    account_id: String,
    positions: BTreeMap<String, Position>,
}

impl PositionSet {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            positions: BTreeMap::new(),
        }
    }

    /// Builds a set from stored positions. Later duplicates of a symbol win.
    pub fn from_positions(
        account_id: impl Into<String>,
        positions: impl IntoIterator<Item = Position>,
    ) -> Self {
        let mut set = Self::new(account_id);
        for position in positions {
            set.positions.insert(position.symbol.clone(), position);
        }
        set
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn get(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(&normalize_symbol(symbol))
    }

    pub fn get_by_id(&self, position_id: &str) -> Option<&Position> {
        self.positions.values().find(|p| p.id == position_id)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    pub fn into_positions(self) -> Vec<Position> {
        self.positions.into_values().collect()
    }

    pub(crate) fn entries_mut(&mut self) -> &mut BTreeMap<String, Position> {
        &mut self.positions
    }
}

/// A position set together with the storage version it was read at.
///
/// Saving a snapshot succeeds only if the stored version still equals
/// `version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub version: i64,
    pub positions: PositionSet,
}

impl LedgerSnapshot {
    pub fn new(version: i64, positions: PositionSet) -> Self {
        Self { version, positions }
    }

    pub fn account_id(&self) -> &str {
        self.positions.account_id()
    }
}

/// Request to acquire `quantity` units of `symbol` at `price` for an account.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewAcquisition {
    pub account_id: String,
    pub symbol: String,
    pub display_name: String,
    pub quantity: Decimal,
    pub price: Decimal,
}

impl NewAcquisition {
    /// Checks that the required text fields are present. Numeric rules are
    /// enforced by the ledger.
    pub fn validate(&self) -> Result<()> {
        if self.account_id.trim().is_empty() {
            return Err(ValidationError::MissingField("accountId".to_string()).into());
        }
        if self.symbol.trim().is_empty() {
            return Err(ValidationError::MissingField("symbol".to_string()).into());
        }
        if self.display_name.trim().is_empty() {
            return Err(ValidationError::MissingField("displayName".to_string()).into());
        }
        Ok(())
    }
}

/// Absolute correction of a position's quantity and average cost.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PositionUpdate {
    pub quantity: Decimal,
    pub price: Decimal,
}

/// Aggregate view of one account's holdings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub account_id: String,
    pub position_count: usize,
    pub total_cost_basis: Decimal,
}

/// Normalizes a ticker symbol for storage and lookup.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}
