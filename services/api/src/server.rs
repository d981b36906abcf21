use std::sync::atomic::Ordering;
use std::sync::Arc;

use awards_review::config::AppConfig;
use awards_review::error::AppError;
use awards_review::telemetry;
use awards_review::workflows::auth::AuthService;
use awards_review::workflows::review::{ReviewApi, ReviewService};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;

use crate::cli::ServeArgs;
use crate::infra::{AppState, LoggedKeyDelivery, MemoryStore};
use crate::routes::with_review_routes;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = MemoryStore::load(args.state.as_deref())?;
    let catalog = Arc::new(store.clone());
    let ballots = Arc::new(store.clone());
    let auth_store = Arc::new(store);

    let review = Arc::new(ReviewService::new(
        catalog.clone(),
        ballots,
        config.review.clone(),
    ));
    let auth = Arc::new(AuthService::new(
        auth_store,
        catalog,
        Arc::new(LoggedKeyDelivery),
        &config.auth,
    ));

    let app = with_review_routes(auth.clone(), ReviewApi { review, auth })
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "awards review service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
