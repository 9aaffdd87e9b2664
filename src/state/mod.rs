use std::sync::Arc;

use crate::chat::ConversationOrchestrator;
use crate::core::config::{AppPaths, AppSettings, ConfigService};
use crate::history::{ChatStore, SqliteChatStore};
use crate::llm::{LlmProvider, OllamaProvider};
use crate::rag::{DocumentIndexer, PineconeStore, VectorStore};

pub mod error;

use error::InitializationError;

/// Process-wide clients shared by all routes.
///
/// Each client is built once here; request handlers build the short-lived
/// orchestrator and indexer on top of them.
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: ConfigService,
    pub settings: Arc<AppSettings>,
    pub llm: Arc<dyn LlmProvider>,
    pub vectors: Arc<dyn VectorStore>,
    pub chats: Arc<dyn ChatStore>,
}

impl AppState {
    /// Merged, validated settings for startup.
    pub fn load_settings(config: &ConfigService) -> Result<AppSettings, InitializationError> {
        config
            .load_settings()
            .map_err(|e| InitializationError::Config(e.into()))
    }

    pub async fn initialize(
        config: ConfigService,
        settings: AppSettings,
    ) -> Result<Arc<Self>, InitializationError> {
        let paths = Arc::new(config.paths().clone());

        if let Some(parent) = paths.db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| InitializationError::ChatStore(e.into()))?;
        }
        let chats = SqliteChatStore::new(&paths.db_path)
            .await
            .map_err(|e| InitializationError::ChatStore(e.into()))?;

        let llm = OllamaProvider::new(settings.inference.base_url.clone());

        let vectors = PineconeStore::connect(&settings.vector_store)
            .await
            .map_err(|e| InitializationError::VectorStore(e.into()))?;

        tracing::info!(
            "Using {} at {} (embedding '{}', generation '{}')",
            llm.name(),
            llm.base_url(),
            settings.inference.embedding_model,
            settings.inference.generation_model
        );

        Ok(Arc::new(Self::from_parts(
            paths,
            config,
            settings,
            Arc::new(llm),
            Arc::new(vectors),
            Arc::new(chats),
        )))
    }

    pub fn from_parts(
        paths: Arc<AppPaths>,
        config: ConfigService,
        settings: AppSettings,
        llm: Arc<dyn LlmProvider>,
        vectors: Arc<dyn VectorStore>,
        chats: Arc<dyn ChatStore>,
    ) -> Self {
        Self {
            paths,
            config,
            settings: Arc::new(settings),
            llm,
            vectors,
            chats,
        }
    }

    pub fn orchestrator(&self) -> ConversationOrchestrator {
        ConversationOrchestrator::new(
            self.llm.clone(),
            self.vectors.clone(),
            self.chats.clone(),
            &self.settings,
        )
    }

    pub fn indexer(&self) -> DocumentIndexer {
        DocumentIndexer::new(
            self.llm.clone(),
            self.vectors.clone(),
            self.settings.inference.embedding_model.clone(),
            &self.settings.ingest,
        )
    }
}
