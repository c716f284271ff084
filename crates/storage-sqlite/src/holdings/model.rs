//! Database model for positions.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::errors::StorageError;
use stockfolio_core::portfolio::holdings::Position;

/// Database model for positions. Decimals are stored as text.
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::positions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PositionDB {
    pub id: String,
    pub account_id: String,
    pub symbol: String,
    pub display_name: String,
    pub quantity: String,
    pub average_cost: String,
    pub total_cost_basis: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl PositionDB {
    pub fn from_domain(position: &Position) -> Self {
        Self {
            id: position.id.clone(),
            account_id: position.account_id.clone(),
            symbol: position.symbol.clone(),
            display_name: position.display_name.clone(),
            quantity: position.quantity.to_string(),
            average_cost: position.average_cost.to_string(),
            total_cost_basis: position.total_cost_basis.to_string(),
            created_at: position.created_at,
            updated_at: position.updated_at,
        }
    }

    /// True when the stored row already holds the domain values.
    pub fn matches(&self, position: &Position) -> bool {
        self.display_name == position.display_name
            && self.quantity == position.quantity.to_string()
            && self.average_cost == position.average_cost.to_string()
            && self.total_cost_basis == position.total_cost_basis.to_string()
            && self.updated_at == position.updated_at
    }
}

impl TryFrom<PositionDB> for Position {
    type Error = StorageError;

    fn try_from(db: PositionDB) -> Result<Self, Self::Error> {
        let parse = |field: &str, raw: &str| {
            Decimal::from_str(raw).map_err(|e| {
                StorageError::CorruptValue(format!("position {} {} '{}': {}", db.id, field, raw, e))
            })
        };
        let quantity = parse("quantity", &db.quantity)?;
        let average_cost = parse("average_cost", &db.average_cost)?;
        let total_cost_basis = parse("total_cost_basis", &db.total_cost_basis)?;

        Ok(Position {
            id: db.id,
            account_id: db.account_id,
            symbol: db.symbol,
            display_name: db.display_name,
            quantity,
            average_cost,
            total_cost_basis,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}
