use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::required;
use crate::core::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamParams {
    pub team_id: Option<String>,
}

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TeamParams>,
) -> Result<impl IntoResponse, ApiError> {
    let team_id = required(payload.team_id.as_deref(), "teamId")?;
    let session = state.chats.create_session(team_id).await?;
    Ok((StatusCode::CREATED, Json(json!({ "session": session }))))
}

pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TeamParams>,
) -> Result<impl IntoResponse, ApiError> {
    let team_id = required(params.team_id.as_deref(), "teamId")?;
    let sessions = state.chats.list_sessions(team_id).await?;
    Ok(Json(json!({ "sessions": sessions })))
}

/// Messages of a session, visible only to the team that owns it.
pub async fn get_session_messages(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Query(params): Query<TeamParams>,
) -> Result<impl IntoResponse, ApiError> {
    let team_id = required(params.team_id.as_deref(), "teamId")?;
    state
        .chats
        .get_session(&session_id)
        .await?
        .filter(|session| session.team_id == team_id)
        .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))?;

    let messages = state.chats.list_messages(&session_id).await?;
    Ok(Json(json!({ "messages": messages })))
}
