//! Holdings ledger: the arithmetic applied to one account's position set.
//!
//! Every operation is synchronous and free of I/O. On error the set is left
//! exactly as it was; persisting the result is the caller's job.
//!
//! Each position carries its exact cost basis. Merges add to that basis and
//! derive the average cost from it, rounded to [`AVERAGE_COST_DECIMAL_PRECISION`]
//! places using [`AVERAGE_COST_ROUNDING`] (half-even). Rounding never feeds
//! back into the next merge, so fills applied in any order end at the same
//! average.

use chrono::{NaiveDateTime, Utc};
use log::debug;
use rust_decimal::Decimal;

use super::holdings_model::{normalize_symbol, Position, PositionSet};
use crate::constants::{AVERAGE_COST_DECIMAL_PRECISION, AVERAGE_COST_ROUNDING};
use crate::errors::LedgerError;

type LedgerResult<T> = std::result::Result<T, LedgerError>;

impl PositionSet {
    /// Adds `quantity` units bought at `price`.
    ///
    /// Creates the position on first acquisition, otherwise merges into the
    /// volume-weighted average cost:
    /// `(total_cost_basis + qty * price) / (old_qty + qty)`.
    pub fn acquire(
        &mut self,
        symbol: &str,
        display_name: &str,
        quantity: Decimal,
        price: Decimal,
    ) -> LedgerResult<Position> {
        if quantity <= Decimal::ZERO {
            return Err(LedgerError::InvalidQuantity {
                expected: "positive",
                actual: quantity,
            });
        }
        if price.is_sign_negative() && !price.is_zero() {
            return Err(LedgerError::InvalidPrice(price));
        }
        let symbol = validated_symbol(symbol)?;
        let now = Utc::now().naive_utc();

        let updated = match self.get(&symbol) {
            Some(existing) if existing.quantity > Decimal::ZERO => {
                merge(existing, display_name, quantity, price, now)?
            }
            _ => {
                let mut opened = Position::open(
                    self.account_id(),
                    &symbol,
                    &display_name_or(display_name, &symbol),
                    quantity,
                    price,
                    now,
                )
                .ok_or_else(|| LedgerError::ArithmeticOverflow(symbol.clone()))?;
                opened.average_cost = round_cost(price);
                opened
            }
        };

        debug!(
            "Acquired {} {} @ {} for account {}: quantity={}, average_cost={}",
            quantity,
            symbol,
            price,
            updated.account_id,
            updated.quantity,
            updated.average_cost
        );
        self.entries_mut().insert(symbol, updated.clone());
        Ok(updated)
    }

    /// Overwrites quantity and average cost of an existing position, as given.
    /// The cost basis becomes `quantity * price`.
    ///
    /// Setting the quantity to zero removes the position; the returned value
    /// then carries the zero quantity.
    pub fn set_absolute(
        &mut self,
        position_id: &str,
        quantity: Decimal,
        price: Decimal,
    ) -> LedgerResult<Position> {
        if quantity.is_sign_negative() && !quantity.is_zero() {
            return Err(LedgerError::InvalidQuantity {
                expected: "zero or positive",
                actual: quantity,
            });
        }
        if price.is_sign_negative() && !price.is_zero() {
            return Err(LedgerError::InvalidPrice(price));
        }
        let symbol = self
            .get_by_id(position_id)
            .map(|p| p.symbol.clone())
            .ok_or_else(|| LedgerError::PositionNotFound(position_id.to_string()))?;

        let total_cost_basis = quantity
            .checked_mul(price)
            .ok_or_else(|| LedgerError::ArithmeticOverflow(symbol.clone()))?;
        let now = Utc::now().naive_utc();

        let entries = self.entries_mut();
        if quantity.is_zero() {
            let mut removed = entries
                .remove(&symbol)
                .ok_or_else(|| LedgerError::PositionNotFound(position_id.to_string()))?;
            removed.quantity = quantity;
            removed.average_cost = price;
            removed.total_cost_basis = total_cost_basis;
            removed.updated_at = now;
            debug!("Position {} set to zero and removed", position_id);
            return Ok(removed);
        }

        let position = entries
            .get_mut(&symbol)
            .ok_or_else(|| LedgerError::PositionNotFound(position_id.to_string()))?;
        let unchanged = position.quantity == quantity
            && position.average_cost == price
            && position.total_cost_basis == total_cost_basis;
        if !unchanged {
            position.quantity = quantity;
            position.average_cost = price;
            position.total_cost_basis = total_cost_basis;
            position.updated_at = now;
        }
        Ok(position.clone())
    }

    /// Removes the position for `symbol`. Removing an absent symbol is a no-op.
    pub fn remove(&mut self, symbol: &str) -> Option<Position> {
        self.entries_mut().remove(&normalize_symbol(symbol))
    }

    /// Sum of `quantity * average_cost` over all positions.
    pub fn total_market_value_at_cost(&self) -> LedgerResult<Decimal> {
        self.iter().try_fold(Decimal::ZERO, |total, position| {
            position
                .value_at_cost()
                .and_then(|basis| total.checked_add(basis))
                .ok_or_else(|| LedgerError::ArithmeticOverflow(position.symbol.clone()))
        })
    }
}

fn merge(
    existing: &Position,
    display_name: &str,
    quantity: Decimal,
    price: Decimal,
    now: NaiveDateTime,
) -> LedgerResult<Position> {
    let overflow = || LedgerError::ArithmeticOverflow(existing.symbol.clone());

    let added_cost = quantity.checked_mul(price).ok_or_else(overflow)?;
    let total_cost_basis = existing
        .total_cost_basis
        .checked_add(added_cost)
        .ok_or_else(overflow)?;
    let new_quantity = existing.quantity.checked_add(quantity).ok_or_else(overflow)?;
    let average_cost = total_cost_basis
        .checked_div(new_quantity)
        .ok_or_else(overflow)?;

    let display_name = if existing.display_name.trim().is_empty() {
        display_name_or(display_name, &existing.symbol)
    } else {
        existing.display_name.clone()
    };

    Ok(Position {
        display_name,
        quantity: new_quantity,
        average_cost: round_cost(average_cost),
        total_cost_basis,
        updated_at: now,
        ..existing.clone()
    })
}

fn round_cost(value: Decimal) -> Decimal {
    value
        .round_dp_with_strategy(AVERAGE_COST_DECIMAL_PRECISION, AVERAGE_COST_ROUNDING)
        .normalize()
}

fn validated_symbol(symbol: &str) -> LedgerResult<String> {
    let symbol = normalize_symbol(symbol);
    if symbol.is_empty() || symbol.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(LedgerError::InvalidSymbol);
    }
    Ok(symbol)
}

fn display_name_or(display_name: &str, symbol: &str) -> String {
    let trimmed = display_name.trim();
    if trimmed.is_empty() {
        symbol.to_string()
    } else {
        trimmed.to_string()
    }
}
