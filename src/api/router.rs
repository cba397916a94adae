//! Report router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! HTML pages live under `/report/`, JSON endpoints under `/api/`.
//!
//! Layers (outermost → innermost):
//! 1. `Cache-Control: no-store` → 2. Trace span → 3. Access logger

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::inference::ModelRepository;

/// Build the report router over a shared model repository.
pub fn report_router(repository: Arc<ModelRepository>) -> Router {
    build_router(ApiContext::new(repository))
}

/// Build router from a pre-constructed `ApiContext`.
// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn build_router(ctx: ApiContext) -> Router {
    let pages = Router::new()
        .route("/", get(endpoints::report::index))
        .route(
            "/report/:disease",
            get(endpoints::report::show).post(endpoints::report::submit),
        );

    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/schema/:disease", get(endpoints::schema::describe))
        .route("/predict/:disease", post(endpoints::predict::predict))
        .route("/models", get(endpoints::models::list))
        .route("/models/:disease/reload", post(endpoints::models::reload));

    // Every page or body may echo patient measurements.
    Router::new()
        .merge(pages)
        .nest("/api", api)
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
}
