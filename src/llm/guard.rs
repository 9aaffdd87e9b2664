use std::sync::Arc;
use std::time::Duration;

use super::provider::LlmProvider;
use crate::core::errors::ApiError;

/// Outcome of [`ModelGuard::ensure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelReadiness {
    /// Already installed; no pull was issued.
    Present,
    /// Pulled during this call.
    Installed,
    /// The pull did not finish within the configured bound and was dropped,
    /// which interrupts the download. A later call pulls again and resumes
    /// from the layers already on disk.
    Pending,
}

impl ModelReadiness {
    pub fn is_ready(&self) -> bool {
        !matches!(self, ModelReadiness::Pending)
    }
}

/// Makes sure a model is installed on the inference server before it is used.
#[derive(Clone)]
pub struct ModelGuard {
    provider: Arc<dyn LlmProvider>,
    pull_timeout: Duration,
}

impl ModelGuard {
    pub fn new(provider: Arc<dyn LlmProvider>, pull_timeout: Duration) -> Self {
        Self {
            provider,
            pull_timeout,
        }
    }

    pub async fn ensure(&self, model_id: &str) -> Result<ModelReadiness, ApiError> {
        let model_id = model_id.trim();
        if model_id.is_empty() {
            return Err(ApiError::BadRequest("model id cannot be empty".to_string()));
        }

        let installed = self.provider.list_models().await?;
        if installed.iter().any(|m| m.matches(model_id)) {
            tracing::debug!("Model '{}' already available", model_id);
            return Ok(ModelReadiness::Present);
        }

        tracing::info!(
            "Model '{}' not found on {}; pulling",
            model_id,
            self.provider.name()
        );

        match tokio::time::timeout(self.pull_timeout, self.provider.pull_model(model_id)).await {
            Ok(Ok(())) => {
                tracing::info!("Model '{}' pulled", model_id);
                Ok(ModelReadiness::Installed)
            }
            Ok(Err(err)) => Err(err),
            Err(_) => {
                tracing::warn!(
                    "Pull of '{}' interrupted after {}s; a retry resumes it",
                    model_id,
                    self.pull_timeout.as_secs()
                );
                Ok(ModelReadiness::Pending)
            }
        }
    }
}
