use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::domain::BallotStatus;
use super::form::BallotForm;
use super::repository::{BallotRepository, CatalogRepository, RepositoryError};
use super::service::{ReviewService, ReviewServiceError};
use crate::workflows::auth::domain::ReviewerContext;
use crate::workflows::auth::repository::AuthRepository;
use crate::workflows::auth::router::bearer_token;
use crate::workflows::auth::service::{AuthError, AuthService};
use crate::workflows::catalog::{EntryId, ReviewerId};

/// Shared handler state: the review service plus the auth service that
/// resolves bearer tokens.
pub struct ReviewApi<C, B, A> {
    pub review: Arc<ReviewService<C, B>>,
    pub auth: Arc<AuthService<A, C>>,
}

impl<C, B, A> Clone for ReviewApi<C, B, A> {
    fn clone(&self) -> Self {
        Self {
            review: Arc::clone(&self.review),
            auth: Arc::clone(&self.auth),
        }
    }
}

/// Router builder exposing the reviewer and staff endpoints.
pub fn review_router<C, B, A>(api: ReviewApi<C, B, A>) -> Router
where
    C: CatalogRepository + 'static,
    B: BallotRepository + 'static,
    A: AuthRepository + 'static,
{
    Router::new()
        .route("/api/v1/reviews/queue", get(queue_handler::<C, B, A>))
        .route("/api/v1/entries/:entry_id", get(entry_handler::<C, B, A>))
        .route(
            "/api/v1/entries/:entry_id/rating",
            post(rating_handler::<C, B, A>),
        )
        .route("/api/v1/staff/overview", get(overview_handler::<C, B, A>))
        .route(
            "/api/v1/staff/reviewers",
            get(reviewer_progress_handler::<C, B, A>),
        )
        .route(
            "/api/v1/staff/assignments",
            get(assignments_handler::<C, B, A>),
        )
        .route(
            "/api/v1/staff/entries/:entry_id/reviewers/:reviewer_id",
            post(reassign_handler::<C, B, A>),
        )
        .route("/api/v1/staff/balance", post(balance_handler::<C, B, A>))
        .with_state(api)
}

#[derive(Debug, Deserialize)]
pub struct AssignmentsQuery {
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BalanceRequest {
    #[serde(default)]
    pub reviews_per_entry: Option<u32>,
    #[serde(default)]
    pub commit: bool,
}

fn authenticate<C, B, A>(
    api: &ReviewApi<C, B, A>,
    headers: &HeaderMap,
) -> Result<ReviewerContext, Response>
where
    C: CatalogRepository + 'static,
    B: BallotRepository + 'static,
    A: AuthRepository + 'static,
{
    let Some(token) = bearer_token(headers) else {
        return Err(unauthorized());
    };

    match api.auth.context(token, Utc::now()) {
        Ok(ctx) => Ok(ctx),
        Err(AuthError::Repository(err)) => {
            let payload = json!({ "error": err.to_string() });
            Err((StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response())
        }
        Err(_) => Err(unauthorized()),
    }
}

fn unauthorized() -> Response {
    let payload = json!({ "error": "authentication required" });
    (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
}

fn require_staff(ctx: &ReviewerContext) -> Result<(), Response> {
    if ctx.staff {
        return Ok(());
    }
    let payload = json!({ "error": "staff access required" });
    Err((StatusCode::FORBIDDEN, axum::Json(payload)).into_response())
}

fn service_error_response(error: ReviewServiceError) -> Response {
    match error {
        ReviewServiceError::Validation(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        ReviewServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({ "error": "not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        ReviewServiceError::Repository(RepositoryError::Conflict) => {
            let payload = json!({ "error": "record already exists" });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        ReviewServiceError::Assignment(err) => {
            let payload = json!({
                "error": err.to_string(),
                "ballots_written": 0,
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn queue_handler<C, B, A>(
    State(api): State<ReviewApi<C, B, A>>,
    headers: HeaderMap,
) -> Response
where
    C: CatalogRepository + 'static,
    B: BallotRepository + 'static,
    A: AuthRepository + 'static,
{
    let ctx = match authenticate(&api, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };

    match api.review.queue(ctx.reviewer_id) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn entry_handler<C, B, A>(
    State(api): State<ReviewApi<C, B, A>>,
    headers: HeaderMap,
    Path(entry_id): Path<i64>,
) -> Response
where
    C: CatalogRepository + 'static,
    B: BallotRepository + 'static,
    A: AuthRepository + 'static,
{
    let ctx = match authenticate(&api, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };

    match api
        .review
        .entry_for_review(ctx.reviewer_id, ctx.staff, EntryId(entry_id))
    {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn rating_handler<C, B, A>(
    State(api): State<ReviewApi<C, B, A>>,
    headers: HeaderMap,
    Path(entry_id): Path<i64>,
    axum::Json(form): axum::Json<BallotForm>,
) -> Response
where
    C: CatalogRepository + 'static,
    B: BallotRepository + 'static,
    A: AuthRepository + 'static,
{
    let ctx = match authenticate(&api, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };

    match api
        .review
        .submit_rating(ctx.reviewer_id, EntryId(entry_id), &form)
    {
        Ok(ballot) => {
            let message = if ballot.status == BallotStatus::Draft {
                "Your draft review has been saved."
            } else {
                "Your review has been saved."
            };
            let payload = json!({
                "message": message,
                "ballot": ballot,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn overview_handler<C, B, A>(
    State(api): State<ReviewApi<C, B, A>>,
    headers: HeaderMap,
) -> Response
where
    C: CatalogRepository + 'static,
    B: BallotRepository + 'static,
    A: AuthRepository + 'static,
{
    let ctx = match authenticate(&api, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_staff(&ctx) {
        return response;
    }

    match api.review.overview() {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn reviewer_progress_handler<C, B, A>(
    State(api): State<ReviewApi<C, B, A>>,
    headers: HeaderMap,
) -> Response
where
    C: CatalogRepository + 'static,
    B: BallotRepository + 'static,
    A: AuthRepository + 'static,
{
    let ctx = match authenticate(&api, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_staff(&ctx) {
        return response;
    }

    match api.review.reviewer_overview() {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn assignments_handler<C, B, A>(
    State(api): State<ReviewApi<C, B, A>>,
    headers: HeaderMap,
    Query(query): Query<AssignmentsQuery>,
) -> Response
where
    C: CatalogRepository + 'static,
    B: BallotRepository + 'static,
    A: AuthRepository + 'static,
{
    let ctx = match authenticate(&api, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_staff(&ctx) {
        return response;
    }

    match api.review.assignments(query.category.as_deref()) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn reassign_handler<C, B, A>(
    State(api): State<ReviewApi<C, B, A>>,
    headers: HeaderMap,
    Path((entry_id, reviewer_id)): Path<(i64, i64)>,
) -> Response
where
    C: CatalogRepository + 'static,
    B: BallotRepository + 'static,
    A: AuthRepository + 'static,
{
    let ctx = match authenticate(&api, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_staff(&ctx) {
        return response;
    }

    match api
        .review
        .reassign(EntryId(entry_id), ReviewerId(reviewer_id))
    {
        Ok(outcome) => {
            let payload = json!({
                "outcome": outcome,
                "detail": outcome.label(),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn balance_handler<C, B, A>(
    State(api): State<ReviewApi<C, B, A>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<BalanceRequest>,
) -> Response
where
    C: CatalogRepository + 'static,
    B: BallotRepository + 'static,
    A: AuthRepository + 'static,
{
    let ctx = match authenticate(&api, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if let Err(response) = require_staff(&ctx) {
        return response;
    }

    match api
        .review
        .run_assignment(request.reviews_per_entry, request.commit)
    {
        Ok(run) => (StatusCode::OK, axum::Json(run)).into_response(),
        Err(error) => service_error_response(error),
    }
}
