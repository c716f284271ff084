use std::sync::Arc;

use crate::{
    error::{ApiError, ApiJson, ApiResult},
    main_lib::AppState,
    models::{AcquireRequest, PortfolioSummary, Position, PositionUpdateRequest},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioQuery {
    account_id: Option<String>,
}

impl PortfolioQuery {
    fn account_id(self) -> ApiResult<String> {
        self.account_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ApiError::BadRequest("accountId is required".to_string()))
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/portfolio",
    params(("accountId" = String, Query, description = "Owning account")),
    responses((status = 200, body = [Position]), (status = 400), (status = 404))
)]
pub async fn get_portfolio(
    State(state): State<Arc<AppState>>,
    Query(q): Query<PortfolioQuery>,
) -> ApiResult<Json<Vec<Position>>> {
    let account_id = q.account_id()?;
    let positions = state.holdings_service.get_positions(&account_id)?;
    Ok(Json(positions.into_iter().map(Position::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/portfolio",
    request_body = AcquireRequest,
    responses((status = 200, body = Position), (status = 400), (status = 404), (status = 409))
)]
pub async fn acquire_position(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<AcquireRequest>,
) -> ApiResult<Json<Position>> {
    let position = state.holdings_service.acquire(payload.into()).await?;
    Ok(Json(Position::from(position)))
}

#[utoipa::path(
    put,
    path = "/api/v1/portfolio/{id}",
    request_body = PositionUpdateRequest,
    responses((status = 200, body = Position), (status = 400), (status = 404), (status = 409))
)]
pub async fn update_position(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<PositionUpdateRequest>,
) -> ApiResult<Json<Position>> {
    let position = state
        .holdings_service
        .set_position(&id, payload.into())
        .await?;
    Ok(Json(Position::from(position)))
}

/// Removing an unknown position succeeds.
#[utoipa::path(delete, path = "/api/v1/portfolio/{id}", responses((status = 204)))]
pub async fn delete_position(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state.holdings_service.remove_position(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/portfolio/summary",
    params(("accountId" = String, Query, description = "Owning account")),
    responses((status = 200, body = PortfolioSummary), (status = 400), (status = 404))
)]
pub async fn get_portfolio_summary(
    State(state): State<Arc<AppState>>,
    Query(q): Query<PortfolioQuery>,
) -> ApiResult<Json<PortfolioSummary>> {
    let account_id = q.account_id()?;
    let summary = state.holdings_service.portfolio_summary(&account_id)?;
    Ok(Json(PortfolioSummary::from(summary)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/portfolio", get(get_portfolio).post(acquire_position))
        .route("/portfolio/summary", get(get_portfolio_summary))
        .route("/portfolio/{id}", put(update_position).delete(delete_position))
}
