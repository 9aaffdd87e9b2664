//! Document ingestion: chunk, embed, upsert.
//!
//! Chunks are overlapping character windows that prefer to end on a sentence
//! boundary. Every vector carries the owning team so retrieval can filter on it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::store::{VectorRecord, VectorStore, TEAM_ID_KEY, TEXT_KEY};
use crate::core::config::IngestSettings;
use crate::core::errors::ApiError;
use crate::llm::LlmProvider;

const EMBED_BATCH: usize = 32;

/// A text chunk with its position in the source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextChunk {
    pub text: String,
    /// Character offset in the original document.
    pub start_offset: usize,
    pub chunk_index: usize,
}

/// A document submitted for indexing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub team_id: String,
    pub file_id: String,
    pub file_name: String,
    pub text: String,
}

pub struct DocumentIndexer {
    llm: Arc<dyn LlmProvider>,
    store: Arc<dyn VectorStore>,
    embedding_model: String,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl DocumentIndexer {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        store: Arc<dyn VectorStore>,
        embedding_model: impl Into<String>,
        settings: &IngestSettings,
    ) -> Self {
        Self {
            llm,
            store,
            embedding_model: embedding_model.into(),
            chunk_size: settings.chunk_size.max(1),
            chunk_overlap: settings.chunk_overlap,
        }
    }

    /// Returns the number of chunks written.
    pub async fn index(&self, document: &SourceDocument) -> Result<usize, ApiError> {
        if document.team_id.trim().is_empty() || document.file_id.trim().is_empty() {
            return Err(ApiError::BadRequest(
                "team id and file id are required".to_string(),
            ));
        }

        let chunks: Vec<TextChunk> = split_into_chunks(&document.text, self.chunk_size, self.chunk_overlap)
            .into_iter()
            .filter(|chunk| !chunk.text.is_empty())
            .collect();
        if chunks.is_empty() {
            return Ok(0);
        }

        let mut records = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(EMBED_BATCH) {
            let inputs: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = self.llm.embed(&inputs, &self.embedding_model).await?;
            if vectors.len() != batch.len() {
                return Err(ApiError::Inference(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    vectors.len()
                )));
            }

            for (chunk, values) in batch.iter().zip(vectors) {
                records.push(VectorRecord {
                    id: format!("{}-{}", document.file_id, chunk.chunk_index),
                    values,
                    metadata: json!({
                        TEXT_KEY: chunk.text,
                        TEAM_ID_KEY: document.team_id,
                        "file_id": document.file_id,
                        "file_name": document.file_name,
                        "chunk_index": chunk.chunk_index,
                    }),
                });
            }
        }

        let written = self.store.upsert(records).await?;
        tracing::info!(
            "Indexed {} chunks of '{}' for team {}",
            written,
            document.file_name,
            document.team_id
        );
        Ok(written)
    }

    /// Removes every chunk of `file_id`, optionally only within one team.
    pub async fn delete_file(&self, file_id: &str, team_id: Option<&str>) -> Result<(), ApiError> {
        let file_id = file_id.trim();
        if file_id.is_empty() {
            return Err(ApiError::BadRequest("file id cannot be empty".to_string()));
        }

        let mut filter = json!({ "file_id": { "$eq": file_id } });
        if let Some(team) = team_id.map(str::trim).filter(|t| !t.is_empty()) {
            filter[TEAM_ID_KEY] = json!({ "$eq": team });
        }

        self.store.delete_by_filter(filter).await?;
        tracing::info!("Deleted vectors of file {}", file_id);
        Ok(())
    }
}

/// Split text into overlapping chunks of at most `chunk_size` characters.
pub fn split_into_chunks(text: &str, chunk_size: usize, overlap: usize) -> Vec<TextChunk> {
    let mut chunks = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let total_chars = chars.len();

    if total_chars == 0 || chunk_size == 0 {
        return chunks;
    }

    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut start = 0;
    let mut chunk_index = 0;

    loop {
        let end = (start + chunk_size).min(total_chars);
        let window = &chars[start..end];

        // Try to break at sentence boundary
        let cut = if end < total_chars {
            find_sentence_boundary(window)
        } else {
            window.len()
        };

        chunks.push(TextChunk {
            text: window[..cut].iter().collect::<String>().trim().to_string(),
            start_offset: start,
            chunk_index,
        });

        if end >= total_chars {
            break;
        }
        // Never skip past the cut, or the text between cut and step is lost.
        start += cut.min(step).max(1);
        chunk_index += 1;
    }

    chunks
}

/// Length of `window` up to the last sentence ending in its final 20%.
fn find_sentence_boundary(window: &[char]) -> usize {
    let search_start = (window.len() * 80) / 100;

    for i in (search_start..window.len().saturating_sub(1)).rev() {
        if matches!(window[i], '.' | '!' | '?') && matches!(window[i + 1], ' ' | '\n') {
            return i + 2;
        }
    }

    window.len()
}
