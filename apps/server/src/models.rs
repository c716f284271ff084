use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockfolio_core::accounts as core_accounts;
use stockfolio_core::demo::DemoSeedResult;
use stockfolio_core::portfolio::holdings as core_holdings;
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<core_accounts::Account> for Account {
    fn from(a: core_accounts::Account) -> Self {
        Self {
            id: a.id,
            name: a.name,
            email: a.email,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl From<NewAccount> for core_accounts::NewAccount {
    fn from(a: NewAccount) -> Self {
        core_accounts::NewAccount::new(a.name, a.email)
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub account_id: String,
    pub symbol: String,
    pub display_name: String,
    #[schema(value_type = String)]
    pub quantity: Decimal,
    #[schema(value_type = String)]
    pub average_cost: Decimal,
    #[schema(value_type = String)]
    pub total_cost_basis: Decimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<core_holdings::Position> for Position {
    fn from(p: core_holdings::Position) -> Self {
        Self {
            id: p.id,
            account_id: p.account_id,
            symbol: p.symbol,
            display_name: p.display_name,
            quantity: p.quantity,
            average_cost: p.average_cost,
            total_cost_basis: p.total_cost_basis,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Body of `POST /portfolio`. Decimals are accepted as strings or numbers.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AcquireRequest {
    pub account_id: String,
    pub symbol: String,
    pub display_name: String,
    #[schema(value_type = String)]
    pub quantity: Decimal,
    #[schema(value_type = String)]
    pub price: Decimal,
}

impl From<AcquireRequest> for core_holdings::NewAcquisition {
    fn from(r: AcquireRequest) -> Self {
        Self {
            account_id: r.account_id,
            symbol: r.symbol,
            display_name: r.display_name,
            quantity: r.quantity,
            price: r.price,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PositionUpdateRequest {
    #[schema(value_type = String)]
    pub quantity: Decimal,
    #[schema(value_type = String)]
    pub price: Decimal,
}

impl From<PositionUpdateRequest> for core_holdings::PositionUpdate {
    fn from(r: PositionUpdateRequest) -> Self {
        Self {
            quantity: r.quantity,
            price: r.price,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub account_id: String,
    pub position_count: usize,
    #[schema(value_type = String)]
    pub total_cost_basis: Decimal,
}

impl From<core_holdings::PortfolioSummary> for PortfolioSummary {
    fn from(s: core_holdings::PortfolioSummary) -> Self {
        Self {
            account_id: s.account_id,
            position_count: s.position_count,
            total_cost_basis: s.total_cost_basis,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DemoAccount {
    pub account: Account,
    pub created: bool,
    pub positions: Vec<Position>,
}

impl From<DemoSeedResult> for DemoAccount {
    fn from(r: DemoSeedResult) -> Self {
        Self {
            account: r.account.into(),
            created: r.created,
            positions: r.positions.into_iter().map(Position::from).collect(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub database: String,
    pub checked_at: NaiveDateTime,
}
