use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::provider::LlmProvider;
use super::types::{GenerateRequest, ProviderModel};
use crate::core::errors::ApiError;

/// Ollama HTTP API (`/api/tags`, `/api/pull`, `/api/generate`, `/api/embed`).
#[derive(Clone)]
pub struct OllamaProvider {
    base_url: String,
    client: Client,
}

impl OllamaProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn error_text(res: reqwest::Response) -> String {
        let status = res.status();
        let text = res.text().await.unwrap_or_default();
        if text.trim().is_empty() {
            status.to_string()
        } else {
            format!("{}: {}", status, text.trim())
        }
    }
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagInfo>,
}

#[derive(Deserialize)]
struct TagInfo {
    name: String,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct PullResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    async fn list_models(&self) -> Result<Vec<ProviderModel>, ApiError> {
        let url = format!("{}/api/tags", self.base_url);
        let res = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ApiError::inference)?;

        if !res.status().is_success() {
            return Err(ApiError::Inference(format!(
                "Failed to list models: {}",
                Self::error_text(res).await
            )));
        }

        let response: TagsResponse = res.json().await.map_err(ApiError::inference)?;
        Ok(response
            .models
            .into_iter()
            .map(|m| ProviderModel {
                id: m.model.unwrap_or_else(|| m.name.clone()),
                name: m.name,
            })
            .collect())
    }

    async fn pull_model(&self, model_id: &str) -> Result<(), ApiError> {
        let url = format!("{}/api/pull", self.base_url);
        let res = self
            .client
            .post(&url)
            .json(&json!({ "name": model_id, "stream": false }))
            .send()
            .await
            .map_err(ApiError::inference)?;

        if !res.status().is_success() {
            return Err(ApiError::Inference(format!(
                "Failed to pull model '{}': {}",
                model_id,
                Self::error_text(res).await
            )));
        }

        let payload: PullResponse = res.json().await.map_err(ApiError::inference)?;
        if let Some(error) = payload.error {
            return Err(ApiError::Inference(format!(
                "Failed to pull model '{}': {}",
                model_id, error
            )));
        }
        tracing::debug!(
            "Pull of '{}' finished with status {:?}",
            model_id,
            payload.status
        );
        Ok(())
    }

    async fn generate(
        &self,
        request: GenerateRequest,
        model_id: &str,
    ) -> Result<String, ApiError> {
        let url = format!("{}/api/generate", self.base_url);

        let mut body = json!({
            "model": model_id,
            "prompt": request.prompt,
            "stream": false,
        });
        if let (Some(obj), Some(t)) = (body.as_object_mut(), request.temperature) {
            obj.insert("options".to_string(), json!({ "temperature": t }));
        }

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::inference)?;

        if !res.status().is_success() {
            return Err(ApiError::Inference(format!(
                "Ollama generate error: {}",
                Self::error_text(res).await
            )));
        }

        let payload: GenerateResponse = res.json().await.map_err(ApiError::inference)?;
        Ok(payload.response)
    }

    async fn embed(&self, inputs: &[String], model_id: &str) -> Result<Vec<Vec<f32>>, ApiError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/api/embed", self.base_url);
        let res = self
            .client
            .post(&url)
            .json(&json!({ "model": model_id, "input": inputs }))
            .send()
            .await
            .map_err(ApiError::inference)?;

        if !res.status().is_success() {
            return Err(ApiError::Inference(format!(
                "Ollama embed error: {}",
                Self::error_text(res).await
            )));
        }

        let payload: EmbedResponse = res.json().await.map_err(ApiError::inference)?;
        if payload.embeddings.len() != inputs.len() {
            return Err(ApiError::Inference(format!(
                "Ollama returned {} embeddings for {} inputs",
                payload.embeddings.len(),
                inputs.len()
            )));
        }
        Ok(payload.embeddings)
    }
}
