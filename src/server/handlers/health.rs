use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let reachable = state.llm.health_check().await.unwrap_or(false);
    let settings = &state.settings;

    Json(json!({
        "status": if reachable { "ok" } else { "degraded" },
        "inference": {
            "provider": state.llm.name(),
            "reachable": reachable,
            "embedding_model": settings.inference.embedding_model,
            "generation_model": settings.inference.generation_model,
        },
        "vector_store": {
            "index_name": settings.vector_store.index_name,
            "namespace": settings.vector_store.namespace,
        }
    }))
}
