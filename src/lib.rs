//! esgrid is a lightweight ESG reporting core: scoring store, provisioning
//! tooling and ERP/SHEQ connectors.

pub mod client;
pub mod config;
pub mod connector;
pub mod crypto;
pub mod database;
pub mod error;
pub mod esg;
mod router;
pub mod store;
pub mod telemetry;
pub mod user;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{Method, header};
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    app: Router,
    method: Method,
    path: &str,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    app.oneshot(
        Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Configuration>,
    pub db: database::Database,
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(size_bytes = chunk.len(), latency = ?latency, "sending body chunk")
                })
                .make_span_with(DefaultMakeSpan::new().include_headers(true).level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new().include_headers(true).latency_unit(LatencyUnit::Micros)),
        )
        // Set a timeout.
        .layer(TimeoutLayer::new(Duration::from_secs(10)))
        // Remove senstive headers from trace.
        .layer(SetSensitiveHeadersLayer::new([header::AUTHORIZATION, header::COOKIE]))
        // Add CORS preflight support.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(Any),
        );

    Router::new()
        // `GET /api/health` goes to `health`.
        .route("/api/health", get(router::health::handler))
        // Dashboard read path and generation write path.
        .route(
            "/api/reports/dashboard-summary",
            get(router::reports::summary),
        )
        .route("/api/reports/generate", post(router::reports::generate))
        .route("/api/reports/company", get(router::reports::by_company))
        // Connector wiring and compliance catalogue.
        .route("/api/integrations/status", get(router::integrations::handler))
        .route(
            "/api/compliance/requirements",
            get(router::compliance::handler),
        )
        .with_state(state)
        .layer(middleware)
}

/// Initialize the application state.
pub async fn initialize_state() -> Result<AppState, Box<dyn std::error::Error>>
{
    // read configuration file. let it in memory.
    let config = config::Configuration::default().read()?;

    let db = match config.sqlite {
        Some(ref sqlite) => {
            database::Database::new(
                &sqlite.path,
                sqlite.pool_size.unwrap_or(database::DEFAULT_POOL_SIZE),
            )
            .await?
        },
        None => {
            tracing::warn!("missing `sqlite` entry on `config.yaml` file, using default path");
            database::Database::new(
                database::DEFAULT_DATABASE_PATH,
                database::DEFAULT_POOL_SIZE,
            )
            .await?
        },
    };

    // execute migrations scripts on start.
    db.migrate().await?;

    Ok(AppState { config, db })
}
