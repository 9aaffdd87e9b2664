//! Typed view over the merged configuration document.
//!
//! Every section is optional in `config.yml`; missing keys fall back to the
//! defaults below, which match a local Ollama + hosted Pinecone deployment.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::errors::ApiError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub inference: InferenceSettings,
    pub vector_store: VectorStoreSettings,
    pub chat: ChatSettings,
    pub ingest: IngestSettings,
}

impl AppSettings {
    pub fn from_value(config: &Value) -> Result<Self, ApiError> {
        let settings: Self = serde_json::from_value(config.clone())
            .map_err(|e| ApiError::BadRequest(format!("Invalid config: {}", e)))?;
        if settings.ingest.chunk_overlap >= settings.ingest.chunk_size {
            return Err(super::validation::overlap_error());
        }
        Ok(settings)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            cors_allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceSettings {
    pub base_url: String,
    pub embedding_model: String,
    pub generation_model: String,
    pub temperature: f64,
    /// Upper bound on a single model pull before the model is reported as pending.
    pub pull_timeout_secs: u64,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            generation_model: "llama3".to_string(),
            temperature: 0.0,
            pull_timeout_secs: 600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    pub api_key: Option<String>,
    pub index_name: String,
    /// Data-plane host; resolved through the control plane when absent.
    pub index_host: Option<String>,
    pub control_plane_url: String,
    pub namespace: String,
    pub top_k: usize,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            index_name: "knoverse-index".to_string(),
            index_host: None,
            control_plane_url: "https://api.pinecone.io".to_string(),
            namespace: "pdf-documents".to_string(),
            top_k: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// Most recent turns rendered into the prompt.
    pub history_turns: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self { history_turns: 10 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}
