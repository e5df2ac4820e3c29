//! HTTP router.
//!
//! Returns a composable `Router` with every route nested under `/api/`,
//! wrapped in CORS and a request body limit.

use axum::extract::DefaultBodyLimit;
use axum::http::header::CONTENT_DISPOSITION;
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Uploaded report snapshots are small; this bounds a runaway client.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn api_router(ctx: ApiContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
        .expose_headers([CONTENT_DISPOSITION]);

    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/normalize", post(endpoints::normalize::normalize))
        .route("/compare", post(endpoints::compare::compare))
        .route(
            "/compare/export/:format",
            post(endpoints::export::download),
        )
        .with_state(ctx);

    Router::new()
        .nest("/api", routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
}
