use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::required;
use crate::core::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: Option<String>,
    pub session_id: Option<String>,
    pub team_id: Option<String>,
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = required(payload.message.as_deref(), "message")?;
    let session_id = required(payload.session_id.as_deref(), "sessionId")?;
    let team_id = required(payload.team_id.as_deref(), "teamId")?;

    let answer = state
        .orchestrator()
        .answer(message, session_id, team_id)
        .await?;

    Ok(Json(json!({ "status": "success", "message": answer })))
}
