use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("inference backend error: {0}")]
    Inference(String),
    #[error("model '{0}' is not ready yet")]
    ModelNotReady(String),
    #[error("vector store error: {0}")]
    VectorStore(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("RAG chain invocation failed: {0}")]
    Chain(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }

    pub fn storage<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Storage(err.to_string())
    }

    pub fn inference<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Inference(err.to_string())
    }

    pub fn vector_store<E: std::fmt::Display>(err: E) -> Self {
        ApiError::VectorStore(err.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ModelNotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Inference(_) | ApiError::VectorStore(_) => StatusCode::BAD_GATEWAY,
            ApiError::Storage(_) | ApiError::Chain(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let message = match &self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => msg.clone(),
            other => other.to_string(),
        };

        let body = Json(json!({ "status": "error", "message": message }));
        (status, body).into_response()
    }
}
