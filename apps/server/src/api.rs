use std::sync::Arc;

use crate::{config::Config, main_lib::AppState, models};
use anyhow::Context;
use axum::{http::HeaderValue, routing::get, Json, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

pub mod accounts;
pub mod health;
pub mod portfolio;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        health::readyz,
        health::health_status,
        accounts::list_accounts,
        accounts::create_account,
        accounts::get_account,
        accounts::delete_account,
        accounts::create_demo_account,
        portfolio::get_portfolio,
        portfolio::acquire_position,
        portfolio::update_position,
        portfolio::delete_position,
        portfolio::get_portfolio_summary,
    ),
    components(schemas(
        models::Account,
        models::NewAccount,
        models::Position,
        models::AcquireRequest,
        models::PositionUpdateRequest,
        models::PortfolioSummary,
        models::DemoAccount,
        models::HealthStatus,
    )),
    tags((name = "stockfolio"))
)]
pub struct ApiDoc;

pub fn app_router(state: Arc<AppState>, config: &Config) -> anyhow::Result<Router> {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin '{}'", o))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        CorsLayer::new().allow_origin(origins)
    };

    let openapi = ApiDoc::openapi();

    let api = Router::new()
        .merge(health::router())
        .merge(accounts::router())
        .merge(portfolio::router())
        .route("/openapi.json", get(move || async move { Json(openapi) }));

    Ok(Router::new()
        .nest("/api/v1", api)
        .with_state(state)
        .layer(cors)
        // Propagate sits inside Set so the generated id reaches the response.
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http()))
}
