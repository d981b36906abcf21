use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::repository::AuthRepository;
use super::service::{AuthError, AuthService};
use crate::workflows::review::repository::CatalogRepository;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

/// Router builder for the login endpoints.
pub fn auth_router<A, C>(service: Arc<AuthService<A, C>>) -> Router
where
    A: AuthRepository + 'static,
    C: CatalogRepository + 'static,
{
    Router::new()
        .route("/api/v1/auth/login", post(request_login_handler::<A, C>))
        .route("/api/v1/auth/login/:key", get(redeem_key_handler::<A, C>))
        .with_state(service)
}

pub(crate) async fn request_login_handler<A, C>(
    State(service): State<Arc<AuthService<A, C>>>,
    axum::Json(request): axum::Json<LoginRequest>,
) -> Response
where
    A: AuthRepository + 'static,
    C: CatalogRepository + 'static,
{
    match service.request_login(&request.email, Utc::now()) {
        // The key travels by e-mail; the response only confirms dispatch.
        Ok(key) => {
            let payload = json!({
                "status": "login key sent",
                "email": key.email,
            });
            (StatusCode::ACCEPTED, axum::Json(payload)).into_response()
        }
        Err(AuthError::UnknownEmail) => {
            let payload = json!({
                "error": AuthError::UnknownEmail.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn redeem_key_handler<A, C>(
    State(service): State<Arc<AuthService<A, C>>>,
    Path(key): Path<String>,
) -> Response
where
    A: AuthRepository + 'static,
    C: CatalogRepository + 'static,
{
    match service.redeem_key(&key, Utc::now()) {
        Ok(session) => {
            let payload = json!({
                "token": session.token,
                "reviewer_id": session.reviewer_id,
                "expires_at": session.expires_at,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(AuthError::UnknownKey | AuthError::ExpiredKey) => {
            let payload = json!({
                "error": "login link is invalid or has expired",
            });
            (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

/// Pulls the bearer token out of an `Authorization` header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}
