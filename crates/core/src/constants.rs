use rust_decimal::RoundingStrategy;

/// Decimal places kept on a position's average cost after a merge.
pub const AVERAGE_COST_DECIMAL_PRECISION: u32 = 6;

/// Rounding applied to average cost after a merge.
pub const AVERAGE_COST_ROUNDING: RoundingStrategy = RoundingStrategy::MidpointNearestEven;

/// Attempts made by the holdings service when a save hits a version conflict.
pub const DEFAULT_MAX_WRITE_ATTEMPTS: u32 = 3;

/// Email identifying the seeded demo account.
pub const DEMO_ACCOUNT_EMAIL: &str = "demo@stockfolio.app";

/// Display name of the seeded demo account.
pub const DEMO_ACCOUNT_NAME: &str = "Demo User";
