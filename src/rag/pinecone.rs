use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::store::{ScoredDocument, TenantFilter, VectorRecord, VectorStore, TEXT_KEY};
use crate::core::config::VectorStoreSettings;
use crate::core::errors::ApiError;

const API_VERSION: &str = "2024-07";
const UPSERT_BATCH: usize = 100;

/// Pinecone REST data plane for one index/namespace.
#[derive(Clone)]
pub struct PineconeStore {
    client: Client,
    api_key: String,
    host: String,
    namespace: String,
}

#[derive(Deserialize)]
struct DescribeIndexResponse {
    host: String,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: Option<usize>,
}

impl PineconeStore {
    /// Uses the configured index host, or asks the control plane for it.
    pub async fn connect(settings: &VectorStoreSettings) -> Result<Self, ApiError> {
        Self::connect_with_client(settings, Client::new()).await
    }

    pub async fn connect_with_client(
        settings: &VectorStoreSettings,
        client: Client,
    ) -> Result<Self, ApiError> {
        let api_key = settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                ApiError::BadRequest("vector_store.api_key (PINECONE_API_KEY) is not set".to_string())
            })?
            .to_string();

        let host = match settings
            .index_host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
        {
            Some(host) => host.to_string(),
            None => {
                describe_index_host(
                    &client,
                    &settings.control_plane_url,
                    &settings.index_name,
                    &api_key,
                )
                .await?
            }
        };

        tracing::info!(
            "Pinecone index '{}' at {} (namespace '{}')",
            settings.index_name,
            host,
            settings.namespace
        );

        Ok(Self {
            client,
            api_key,
            host: normalize_host(&host),
            namespace: settings.namespace.clone(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn post(&self, path: &str, body: &Value) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{}", self.host, path);
        let res = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(body)
            .send()
            .await
            .map_err(ApiError::vector_store)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::VectorStore(format!(
                "{} failed with {}: {}",
                path,
                status,
                text.trim()
            )));
        }
        Ok(res)
    }
}

async fn describe_index_host(
    client: &Client,
    control_plane_url: &str,
    index_name: &str,
    api_key: &str,
) -> Result<String, ApiError> {
    let url = format!(
        "{}/indexes/{}",
        control_plane_url.trim_end_matches('/'),
        index_name
    );
    let res = client
        .get(&url)
        .header("Api-Key", api_key)
        .header("X-Pinecone-API-Version", API_VERSION)
        .send()
        .await
        .map_err(ApiError::vector_store)?;

    if !res.status().is_success() {
        return Err(ApiError::VectorStore(format!(
            "Failed to describe index '{}': {}",
            index_name,
            res.status()
        )));
    }

    let payload: DescribeIndexResponse = res.json().await.map_err(ApiError::vector_store)?;
    Ok(payload.host)
}

fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[async_trait]
impl VectorStore for PineconeStore {
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: &TenantFilter,
    ) -> Result<Vec<ScoredDocument>, ApiError> {
        let body = json!({
            "namespace": self.namespace,
            "vector": vector,
            "topK": top_k,
            "filter": filter.to_metadata_filter(),
            "includeMetadata": true,
            "includeValues": false,
        });

        let res = self.post("/query", &body).await?;
        let payload: QueryResponse = res.json().await.map_err(ApiError::vector_store)?;

        Ok(payload
            .matches
            .into_iter()
            .map(|m| {
                let metadata = m.metadata.unwrap_or_default();
                let text = metadata
                    .get(TEXT_KEY)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                ScoredDocument {
                    id: m.id,
                    score: m.score,
                    text,
                    metadata: Value::Object(metadata),
                }
            })
            .collect())
    }

    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<usize, ApiError> {
        let mut written = 0;
        for batch in records.chunks(UPSERT_BATCH) {
            let body = json!({ "vectors": batch, "namespace": self.namespace });
            let res = self.post("/vectors/upsert", &body).await?;
            let payload: UpsertResponse = res.json().await.map_err(ApiError::vector_store)?;
            written += payload.upserted_count.unwrap_or(batch.len());
        }
        Ok(written)
    }

    async fn delete_by_filter(&self, filter: Value) -> Result<(), ApiError> {
        let body = json!({ "filter": filter, "namespace": self.namespace });
        self.post("/vectors/delete", &body).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_hosts_get_https_scheme() {
        assert_eq!(
            normalize_host("idx-abc.svc.pinecone.io"),
            "https://idx-abc.svc.pinecone.io"
        );
        assert_eq!(normalize_host("http://127.0.0.1:5081/"), "http://127.0.0.1:5081");
    }

    #[tokio::test]
    async fn missing_api_key_is_rejected() {
        let settings = VectorStoreSettings::default();
        let err = PineconeStore::connect(&settings).await.err().unwrap();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg.contains("PINECONE_API_KEY")));
    }
}
