use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use super::store::{ChatMessage, ChatSession, ChatStore, MessageRole, StoredMessage};
use crate::core::errors::ApiError;

/// SQLite-backed `chat_sessions` / `chat_messages` tables.
#[derive(Clone)]
pub struct SqliteChatStore {
    pool: SqlitePool,
}

impl SqliteChatStore {
    pub async fn new(db_path: &Path) -> Result<Self, ApiError> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| ApiError::Storage(format!("Failed to connect to chat db: {}", e)))?;

        Self::with_pool(pool).await
    }

    pub async fn with_pool(pool: SqlitePool) -> Result<Self, ApiError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS chat_sessions (
                id TEXT PRIMARY KEY,
                team_id TEXT NOT NULL,
                session_name TEXT,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .map_err(|e| ApiError::Storage(format!("Failed to init chat_sessions table: {}", e)))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS chat_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                chat_session_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(chat_session_id) REFERENCES chat_sessions(id) ON DELETE CASCADE
            )",
        )
        .execute(&pool)
        .await
        .map_err(|e| ApiError::Storage(format!("Failed to init chat_messages table: {}", e)))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_chat_messages_session ON chat_messages(chat_session_id)",
        )
        .execute(&pool)
        .await
        .map_err(|e| ApiError::Storage(format!("Failed to create index: {}", e)))?;

        Ok(Self { pool })
    }
}

fn session_from_row(row: &SqliteRow) -> Result<ChatSession, ApiError> {
    Ok(ChatSession {
        id: row.try_get("id").map_err(ApiError::storage)?,
        team_id: row.try_get("team_id").map_err(ApiError::storage)?,
        session_name: row.try_get("session_name").map_err(ApiError::storage)?,
        created_at: row.try_get("created_at").map_err(ApiError::storage)?,
    })
}

fn message_from_row(row: &SqliteRow) -> Result<StoredMessage, ApiError> {
    let role: String = row.try_get("role").map_err(ApiError::storage)?;
    Ok(StoredMessage {
        id: row.try_get("id").map_err(ApiError::storage)?,
        chat_session_id: row.try_get("chat_session_id").map_err(ApiError::storage)?,
        message: ChatMessage {
            role: MessageRole::parse(&role),
            content: row.try_get("content").map_err(ApiError::storage)?,
        },
        created_at: row.try_get("created_at").map_err(ApiError::storage)?,
    })
}

#[async_trait]
impl ChatStore for SqliteChatStore {
    async fn create_session(&self, team_id: &str) -> Result<ChatSession, ApiError> {
        let session = ChatSession {
            id: uuid::Uuid::new_v4().to_string(),
            team_id: team_id.to_string(),
            session_name: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        sqlx::query("INSERT INTO chat_sessions (id, team_id, session_name, created_at) VALUES (?, ?, NULL, ?)")
            .bind(&session.id)
            .bind(&session.team_id)
            .bind(&session.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| ApiError::Storage(format!("Failed to create session: {}", e)))?;

        Ok(session)
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<ChatSession>, ApiError> {
        let row = sqlx::query(
            "SELECT id, team_id, session_name, created_at FROM chat_sessions WHERE id = ?",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(ApiError::storage)?;

        row.as_ref().map(session_from_row).transpose()
    }

    async fn list_sessions(&self, team_id: &str) -> Result<Vec<ChatSession>, ApiError> {
        let rows = sqlx::query(
            "SELECT id, team_id, session_name, created_at FROM chat_sessions \
             WHERE team_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await
        .map_err(ApiError::storage)?;

        rows.iter().map(session_from_row).collect()
    }

    async fn set_session_name_if_unset(
        &self,
        session_id: &str,
        name: &str,
    ) -> Result<bool, ApiError> {
        let result = sqlx::query(
            "UPDATE chat_sessions SET session_name = ? \
             WHERE id = ? AND (session_name IS NULL OR TRIM(session_name) = '')",
        )
        .bind(name)
        .bind(session_id)
        .execute(&self.pool)
        .await
        .map_err(ApiError::storage)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_messages(&self, session_id: &str) -> Result<Vec<StoredMessage>, ApiError> {
        let rows = sqlx::query(
            "SELECT id, chat_session_id, role, content, created_at FROM chat_messages \
             WHERE chat_session_id = ? ORDER BY id ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(ApiError::storage)?;

        rows.iter().map(message_from_row).collect()
    }

    async fn append_messages(
        &self,
        session_id: &str,
        messages: &[ChatMessage],
    ) -> Result<(), ApiError> {
        let now = chrono::Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await.map_err(ApiError::storage)?;

        for message in messages {
            sqlx::query(
                "INSERT INTO chat_messages (chat_session_id, role, content, created_at) VALUES (?, ?, ?, ?)",
            )
            .bind(session_id)
            .bind(message.role.as_str())
            .bind(&message.content)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::storage)?;
        }

        tx.commit().await.map_err(ApiError::storage)?;
        Ok(())
    }
}
