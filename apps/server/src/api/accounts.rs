use std::sync::Arc;

use crate::{
    error::{ApiJson, ApiResult},
    main_lib::AppState,
    models::{Account, DemoAccount, NewAccount},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::info;

#[utoipa::path(get, path="/api/v1/accounts", responses((status=200, body = [Account])))]
pub async fn list_accounts(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Account>>> {
    let accounts = state.account_service.list_accounts()?;
    Ok(Json(accounts.into_iter().map(Account::from).collect()))
}

#[utoipa::path(post, path="/api/v1/accounts", request_body = NewAccount, responses((status=201, body = Account), (status=400), (status=409)))]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<NewAccount>,
) -> ApiResult<(StatusCode, Json<Account>)> {
    let created = state.account_service.create_account(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(Account::from(created))))
}

#[utoipa::path(get, path="/api/v1/accounts/{id}", responses((status=200, body = Account), (status=404)))]
pub async fn get_account(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Account>> {
    let account = state.account_service.get_account(&id)?;
    Ok(Json(Account::from(account)))
}

#[utoipa::path(delete, path="/api/v1/accounts/{id}", responses((status=204), (status=404)))]
pub async fn delete_account(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state.account_service.delete_account(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Creates the demo account with its sample holdings, or returns the existing one.
#[utoipa::path(post, path="/api/v1/demo-account", responses((status=201, body = DemoAccount), (status=200, body = DemoAccount)))]
pub async fn create_demo_account(
    State(state): State<Arc<AppState>>,
) -> ApiResult<(StatusCode, Json<DemoAccount>)> {
    let seeded = state.demo_service.seed_demo_account().await?;
    let status = if seeded.created {
        info!("Demo account {} created", seeded.account.id);
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(DemoAccount::from(seeded))))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/{id}", get(get_account).delete(delete_account))
        .route("/demo-account", post(create_demo_account))
}
