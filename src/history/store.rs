//! ChatStore trait: persistence seam for chat sessions and their messages.
//!
//! The orchestrator only ever reads sessions/messages, appends message rows and
//! sets a session name once. Sessions are normally created by the surrounding
//! service (`create_session`), never by the answer path.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    Unknown,
}

impl MessageRole {
    /// Case-insensitive; `bot` is an alias of `assistant`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "user" => MessageRole::User,
            "assistant" | "bot" => MessageRole::Assistant,
            _ => MessageRole::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// A persisted message row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: i64,
    pub chat_session_id: String,
    #[serde(flatten)]
    pub message: ChatMessage,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    pub team_id: String,
    pub session_name: Option<String>,
    pub created_at: String,
}

impl ChatSession {
    /// A blank stored name counts as unset.
    pub fn has_name(&self) -> bool {
        self.session_name
            .as_deref()
            .map(|name| !name.trim().is_empty())
            .unwrap_or(false)
    }
}

#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn create_session(&self, team_id: &str) -> Result<ChatSession, ApiError>;

    async fn get_session(&self, session_id: &str) -> Result<Option<ChatSession>, ApiError>;

    /// Sessions of one team, newest first.
    async fn list_sessions(&self, team_id: &str) -> Result<Vec<ChatSession>, ApiError>;

    /// Writes `name` only while the stored name is null or blank.
    ///
    /// Returns whether a row was updated.
    async fn set_session_name_if_unset(
        &self,
        session_id: &str,
        name: &str,
    ) -> Result<bool, ApiError>;

    /// All messages of a session, oldest first.
    async fn list_messages(&self, session_id: &str) -> Result<Vec<StoredMessage>, ApiError>;

    /// Appends rows in the given order.
    async fn append_messages(
        &self,
        session_id: &str,
        messages: &[ChatMessage],
    ) -> Result<(), ApiError>;
}
