use std::sync::Arc;

use awards_review::workflows::auth::{auth_router, AuthRepository, AuthService};
use awards_review::workflows::review::{
    review_router, BallotRepository, CatalogRepository, ReviewApi,
};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;

use crate::infra::AppState;

/// The full application surface: login endpoints, the review API, and the
/// operational endpoints the deployment probes.
pub(crate) fn with_review_routes<C, B, A>(
    auth: Arc<AuthService<A, C>>,
    api: ReviewApi<C, B, A>,
) -> axum::Router
where
    C: CatalogRepository + 'static,
    B: BallotRepository + 'static,
    A: AuthRepository + 'static,
{
    auth_router(auth)
        .merge(review_router(api))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
