use std::sync::Arc;

use super::store::{ScoredDocument, TenantFilter, VectorStore};
use crate::core::errors::ApiError;
use crate::llm::LlmProvider;

/// Embeds the question and runs a team-scoped similarity query.
#[derive(Clone)]
pub struct TenantRetriever {
    llm: Arc<dyn LlmProvider>,
    store: Arc<dyn VectorStore>,
    embedding_model: String,
    top_k: usize,
    filter: TenantFilter,
}

impl TenantRetriever {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        store: Arc<dyn VectorStore>,
        embedding_model: impl Into<String>,
        top_k: usize,
        filter: TenantFilter,
    ) -> Self {
        Self {
            llm,
            store,
            embedding_model: embedding_model.into(),
            top_k,
            filter,
        }
    }

    pub fn filter(&self) -> &TenantFilter {
        &self.filter
    }

    pub async fn retrieve(&self, question: &str) -> Result<Vec<ScoredDocument>, ApiError> {
        let vectors = self
            .llm
            .embed(&[question.to_string()], &self.embedding_model)
            .await?;
        let vector = vectors
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Inference("embedding response was empty".to_string()))?;

        let documents = self.store.query(&vector, self.top_k, &self.filter).await?;
        tracing::debug!(
            "Retrieved {} passages for team {}",
            documents.len(),
            self.filter.team_id()
        );
        Ok(documents)
    }
}
