use async_trait::async_trait;

use super::types::{GenerateRequest, ProviderModel};
use crate::core::errors::ApiError;

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// return the provider name (e.g. "ollama")
    fn name(&self) -> &str;

    /// check if the provider is reachable
    async fn health_check(&self) -> Result<bool, ApiError>;

    /// list models installed on the provider
    async fn list_models(&self) -> Result<Vec<ProviderModel>, ApiError>;

    /// download a model; resolves once the provider reports it installed
    async fn pull_model(&self, model_id: &str) -> Result<(), ApiError>;

    /// single-shot completion (non-streaming)
    async fn generate(&self, request: GenerateRequest, model_id: &str)
        -> Result<String, ApiError>;

    /// generate one embedding per input, in input order
    async fn embed(&self, inputs: &[String], model_id: &str) -> Result<Vec<Vec<f32>>, ApiError>;
}
