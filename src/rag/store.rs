//! VectorStore trait: abstract interface for the retrieval index.
//!
//! Queries are always tenant-scoped: the only way to obtain a [`TenantFilter`]
//! is [`TenantFilter::for_team`], and `query` does not accept anything else.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::errors::ApiError;

/// Metadata key holding the owning team of a vector.
pub const TEAM_ID_KEY: &str = "team_id";
/// Metadata key holding the chunk text.
pub const TEXT_KEY: &str = "text";

/// Mandatory `team_id` equality filter for retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantFilter {
    team_id: String,
}

impl TenantFilter {
    pub fn for_team(team_id: &str) -> Result<Self, ApiError> {
        let team_id = team_id.trim();
        if team_id.is_empty() {
            return Err(ApiError::BadRequest("team id cannot be empty".to_string()));
        }
        Ok(Self {
            team_id: team_id.to_string(),
        })
    }

    pub fn team_id(&self) -> &str {
        &self.team_id
    }

    /// Metadata filter document, e.g. `{"team_id": {"$eq": "t1"}}`.
    pub fn to_metadata_filter(&self) -> Value {
        json!({ TEAM_ID_KEY: { "$eq": self.team_id } })
    }
}

/// A vector with its metadata, ready for upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: Value,
}

/// A retrieved passage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub id: String,
    /// Similarity score (higher = better).
    pub score: f32,
    pub text: String,
    pub metadata: Value,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Nearest neighbours of `vector` within the filter's team, best first.
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: &TenantFilter,
    ) -> Result<Vec<ScoredDocument>, ApiError>;

    /// Insert or overwrite records. Returns the number written.
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<usize, ApiError>;

    /// Delete every vector whose metadata matches `filter`.
    async fn delete_by_filter(&self, filter: Value) -> Result<(), ApiError>;
}
