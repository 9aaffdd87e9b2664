use std::sync::Arc;
use std::time::Duration;

use super::titler::SessionTitler;
use crate::core::config::AppSettings;
use crate::core::errors::ApiError;
use crate::history::{
    format_chat_history, render_chat_history, ChatMessage, ChatSession, ChatStore,
};
use crate::llm::{LlmProvider, ModelGuard, ModelReadiness};
use crate::rag::{RagChain, TenantFilter, TenantRetriever, VectorStore};

enum SessionAccess {
    Owned(ChatSession),
    Missing,
    /// The lookup failed, so ownership cannot be checked.
    Unverified,
}

/// Answers one user message within a chat session.
///
/// Built per request from process-wide clients. Model readiness, chain
/// failures and sessions of another team abort the request; history, title
/// and persistence failures are logged and the request carries on without them.
pub struct ConversationOrchestrator {
    llm: Arc<dyn LlmProvider>,
    vectors: Arc<dyn VectorStore>,
    chats: Arc<dyn ChatStore>,
    embedding_model: String,
    generation_model: String,
    temperature: f64,
    pull_timeout: Duration,
    top_k: usize,
    history_turns: usize,
}

impl ConversationOrchestrator {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        vectors: Arc<dyn VectorStore>,
        chats: Arc<dyn ChatStore>,
        settings: &AppSettings,
    ) -> Self {
        Self {
            llm,
            vectors,
            chats,
            embedding_model: settings.inference.embedding_model.clone(),
            generation_model: settings.inference.generation_model.clone(),
            temperature: settings.inference.temperature,
            pull_timeout: Duration::from_secs(settings.inference.pull_timeout_secs),
            top_k: settings.vector_store.top_k,
            history_turns: settings.chat.history_turns,
        }
    }

    pub async fn answer(
        &self,
        user_message: &str,
        session_id: &str,
        team_id: &str,
    ) -> Result<String, ApiError> {
        let filter = TenantFilter::for_team(team_id)?;

        self.ensure_models().await?;

        let owned = match self.resolve_session(session_id, filter.team_id()).await? {
            SessionAccess::Owned(session) => {
                if let Err(err) = self.ensure_session_title(&session, user_message).await {
                    tracing::warn!("Session {}: title check failed: {}", session_id, err);
                }
                true
            }
            SessionAccess::Missing | SessionAccess::Unverified => false,
        };

        let history = if owned {
            self.load_history(session_id).await
        } else {
            Vec::new()
        };
        let chat_history = render_chat_history(&format_chat_history(&history), self.history_turns);

        let chain = self.build_chain(filter);
        let answer = chain
            .invoke(user_message, &chat_history)
            .await
            .map_err(|err| {
                tracing::error!("Session {}: chain invocation failed: {}", session_id, err);
                ApiError::Chain(err.to_string())
            })?;

        if owned {
            let exchange = [
                ChatMessage::user(user_message),
                ChatMessage::assistant(answer.as_str()),
            ];
            if let Err(err) = self.chats.append_messages(session_id, &exchange).await {
                tracing::warn!("Session {}: failed to persist exchange: {}", session_id, err);
            }
        }

        Ok(answer)
    }

    /// Only a session owned by `team_id` may lend history or receive the exchange.
    /// A session of another team is reported as not found.
    async fn resolve_session(
        &self,
        session_id: &str,
        team_id: &str,
    ) -> Result<SessionAccess, ApiError> {
        match self.chats.get_session(session_id).await {
            Ok(Some(session)) if session.team_id == team_id => Ok(SessionAccess::Owned(session)),
            Ok(Some(session)) => {
                tracing::warn!(
                    "Session {} belongs to team {}, request came from team {}",
                    session_id,
                    session.team_id,
                    team_id
                );
                Err(ApiError::NotFound("Session not found".to_string()))
            }
            Ok(None) => {
                tracing::warn!("Session {} not found; answering without it", session_id);
                Ok(SessionAccess::Missing)
            }
            Err(err) => {
                tracing::warn!(
                    "Session {}: lookup failed, answering without history: {}",
                    session_id,
                    err
                );
                Ok(SessionAccess::Unverified)
            }
        }
    }

    async fn load_history(&self, session_id: &str) -> Vec<ChatMessage> {
        match self.chats.list_messages(session_id).await {
            Ok(rows) => rows.into_iter().map(|row| row.message).collect(),
            Err(err) => {
                tracing::warn!(
                    "Session {}: history unavailable, answering without it: {}",
                    session_id,
                    err
                );
                Vec::new()
            }
        }
    }

    async fn ensure_models(&self) -> Result<(), ApiError> {
        let guard = ModelGuard::new(self.llm.clone(), self.pull_timeout);

        for model in [&self.embedding_model, &self.generation_model] {
            match guard.ensure(model).await {
                Ok(ModelReadiness::Present) | Ok(ModelReadiness::Installed) => {}
                Ok(ModelReadiness::Pending) => {
                    return Err(ApiError::ModelNotReady(model.clone()));
                }
                Err(err) => {
                    tracing::error!("Model '{}' unavailable: {}", model, err);
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    async fn ensure_session_title(
        &self,
        session: &ChatSession,
        user_message: &str,
    ) -> Result<(), ApiError> {
        if session.has_name() {
            return Ok(());
        }

        let title = SessionTitler::new(self.llm.clone(), self.generation_model.clone())
            .title_for(user_message)
            .await;
        if self.chats.set_session_name_if_unset(&session.id, &title).await? {
            tracing::info!("Session {} titled '{}'", session.id, title);
        }
        Ok(())
    }

    fn build_chain(&self, filter: TenantFilter) -> RagChain {
        let retriever = TenantRetriever::new(
            self.llm.clone(),
            self.vectors.clone(),
            self.embedding_model.clone(),
            self.top_k,
            filter,
        );
        RagChain::new(
            retriever,
            self.llm.clone(),
            self.generation_model.clone(),
            self.temperature,
        )
    }
}
