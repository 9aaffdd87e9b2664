//! Retrieval-augmented generation.
//!
//! - `TenantRetriever`: embeds a question and queries the index within one team
//! - `RagChain`: retrieval, prompt filling and generation for one question
//! - `DocumentIndexer`: chunks, embeds and upserts documents

pub mod chain;
pub mod engine;
pub mod pinecone;
pub mod retriever;
pub mod store;


pub use chain::RagChain;
pub use engine::{DocumentIndexer, SourceDocument};
pub use pinecone::PineconeStore;
pub use retriever::TenantRetriever;
pub use store::{ScoredDocument, TenantFilter, VectorRecord, VectorStore};
