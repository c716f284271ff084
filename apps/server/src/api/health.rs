use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
    models::HealthStatus,
};
use axum::{extract::State, routing::get, Json, Router};
use stockfolio_storage_sqlite::db;
use tokio::task;

#[utoipa::path(get, path = "/api/v1/healthz", responses((status = 200, description = "Health")))]
pub async fn healthz() -> &'static str {
    "ok"
}

async fn ping_database(state: &Arc<AppState>) -> ApiResult<()> {
    let pool = state.pool.clone();
    task::spawn_blocking(move || db::ping(&pool))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(())
}

/// Ready once the database answers a query.
#[utoipa::path(get, path = "/api/v1/readyz", responses((status = 200, description = "Ready"), (status = 503)))]
pub async fn readyz(State(state): State<Arc<AppState>>) -> ApiResult<&'static str> {
    ping_database(&state).await?;
    Ok("ok")
}

#[utoipa::path(get, path = "/api/v1/health", responses((status = 200, body = HealthStatus)))]
pub async fn health_status(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    let (status, database) = match ping_database(&state).await {
        Ok(()) => ("ok", "ok".to_string()),
        Err(e) => {
            tracing::warn!("Health check against {} failed: {}", state.db_path, e);
            ("degraded", e.to_string())
        }
    };
    Json(HealthStatus {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        checked_at: chrono::Utc::now().naive_utc(),
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/health", get(health_status))
}
