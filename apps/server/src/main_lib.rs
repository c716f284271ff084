use std::sync::Arc;

use crate::config::Config;
use stockfolio_core::{
    accounts::{AccountService, AccountServiceTrait},
    demo::DemoDataService,
    portfolio::holdings::{HoldingsService, HoldingsServiceTrait},
};
use stockfolio_storage_sqlite::{
    accounts::AccountRepository,
    db::{self, DbPool},
    holdings::PositionRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub account_service: Arc<dyn AccountServiceTrait>,
    pub holdings_service: Arc<dyn HoldingsServiceTrait>,
    pub demo_service: Arc<DemoDataService>,
    pub pool: Arc<DbPool>,
    pub db_path: String,
}

pub fn init_tracing() {
    let log_format = std::env::var("SF_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone())?;

    let account_repo = Arc::new(AccountRepository::new(pool.clone(), writer.clone()));
    let account_service: Arc<dyn AccountServiceTrait> =
        Arc::new(AccountService::new(account_repo));

    let position_repo = Arc::new(PositionRepository::new(pool.clone(), writer));
    let holdings_service: Arc<dyn HoldingsServiceTrait> = Arc::new(
        HoldingsService::new(position_repo).with_max_write_attempts(config.max_write_attempts),
    );

    let demo_service = Arc::new(DemoDataService::new(
        account_service.clone(),
        holdings_service.clone(),
    ));

    Ok(Arc::new(AppState {
        account_service,
        holdings_service,
        demo_service,
        pool,
        db_path,
    }))
}
