use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::required;
use super::sessions::TeamParams;
use crate::core::errors::ApiError;
use crate::rag::SourceDocument;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDocumentRequest {
    pub team_id: Option<String>,
    pub file_id: Option<String>,
    pub file_name: Option<String>,
    #[serde(default)]
    pub text: String,
}

pub async fn index_document(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<IndexDocumentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let team_id = required(payload.team_id.as_deref(), "teamId")?;
    let file_id = required(payload.file_id.as_deref(), "fileId")?;
    let file_name = payload
        .file_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(file_id);

    let document = SourceDocument {
        team_id: team_id.to_string(),
        file_id: file_id.to_string(),
        file_name: file_name.to_string(),
        text: payload.text,
    };
    let chunks = state.indexer().index(&document).await?;

    Ok(Json(json!({ "status": "success", "chunks": chunks })))
}

pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
    Query(params): Query<TeamParams>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .indexer()
        .delete_file(&file_id, params.team_id.as_deref())
        .await?;
    Ok(Json(json!({ "status": "success" })))
}
