use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let indexed_chunks = state.store.count().await.unwrap_or(0);
    Json(json!({
        "status": "ok",
        "indexed_chunks": indexed_chunks,
    }))
}
