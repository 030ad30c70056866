use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{health, llm};
use crate::state::AppState;

/// Creates the application router: the combined `/llm` endpoint, the
/// health check, and the static console page with its assets.
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/llm", post(llm::llm_router))
        .route("/health", get(health::health))
        .route("/favicon.ico", get(favicon))
        .route_service("/", ServeFile::new("assets/index.html"))
        .nest_service("/assets", ServeDir::new("assets"))
        .with_state(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}

async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}
