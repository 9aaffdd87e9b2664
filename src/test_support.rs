//! In-memory fakes for the client seams, recording every call.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::chat::titler::TITLE_INSTRUCTION;
use crate::core::errors::ApiError;
use crate::history::{ChatMessage, ChatSession, ChatStore, StoredMessage};
use crate::llm::{GenerateRequest, LlmProvider, ProviderModel};
use crate::rag::{ScoredDocument, TenantFilter, VectorRecord, VectorStore};

pub struct FakeLlm {
    models: Mutex<Vec<String>>,
    pull_delay: Option<Duration>,
    answer: String,
    title: String,
    list_calls: AtomicUsize,
    pulled: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
    fail_list: AtomicBool,
    fail_pull: AtomicBool,
    fail_generate: AtomicBool,
    fail_title: AtomicBool,
}

impl FakeLlm {
    pub fn with_models(models: &[&str]) -> Self {
        Self {
            models: Mutex::new(models.iter().map(|m| m.to_string()).collect()),
            pull_delay: None,
            answer: "fake answer".to_string(),
            title: "Fake Title".to_string(),
            list_calls: AtomicUsize::new(0),
            pulled: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
            fail_list: AtomicBool::new(false),
            fail_pull: AtomicBool::new(false),
            fail_generate: AtomicBool::new(false),
            fail_title: AtomicBool::new(false),
        }
    }

    pub fn with_pull_delay(mut self, delay: Duration) -> Self {
        self.pull_delay = Some(delay);
        self
    }

    pub fn with_answer(mut self, answer: &str) -> Self {
        self.answer = answer.to_string();
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn fail_list(&self) {
        self.fail_list.store(true, Ordering::SeqCst);
    }

    pub fn fail_pull(&self) {
        self.fail_pull.store(true, Ordering::SeqCst);
    }

    /// Fails every generate call, titles included.
    pub fn fail_generate(&self) {
        self.fail_generate.store(true, Ordering::SeqCst);
    }

    pub fn fail_title(&self) {
        self.fail_title.store(true, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn pull_calls(&self) -> usize {
        self.pulled.lock().unwrap().len()
    }

    pub fn pulled(&self) -> Vec<String> {
        self.pulled.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LlmProvider for FakeLlm {
    fn name(&self) -> &str {
        "fake"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        Ok(!self.fail_list.load(Ordering::SeqCst))
    }

    async fn list_models(&self) -> Result<Vec<ProviderModel>, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(ApiError::Inference("connection refused".to_string()));
        }
        Ok(self
            .models
            .lock()
            .unwrap()
            .iter()
            .map(|m| ProviderModel {
                id: m.clone(),
                name: m.clone(),
            })
            .collect())
    }

    async fn pull_model(&self, model_id: &str) -> Result<(), ApiError> {
        self.pulled.lock().unwrap().push(model_id.to_string());
        if let Some(delay) = self.pull_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_pull.load(Ordering::SeqCst) {
            return Err(ApiError::Inference("pull failed".to_string()));
        }
        self.models.lock().unwrap().push(model_id.to_string());
        Ok(())
    }

    async fn generate(
        &self,
        request: GenerateRequest,
        _model_id: &str,
    ) -> Result<String, ApiError> {
        let is_title = request.prompt.starts_with(TITLE_INSTRUCTION);
        self.prompts.lock().unwrap().push(request.prompt);

        if self.fail_generate.load(Ordering::SeqCst)
            || (is_title && self.fail_title.load(Ordering::SeqCst))
        {
            return Err(ApiError::Inference("generation failed".to_string()));
        }
        Ok(if is_title {
            self.title.clone()
        } else {
            self.answer.clone()
        })
    }

    async fn embed(&self, inputs: &[String], _model_id: &str) -> Result<Vec<Vec<f32>>, ApiError> {
        Ok(inputs
            .iter()
            .map(|input| vec![input.len() as f32, 1.0])
            .collect())
    }
}

#[derive(Default)]
pub struct FakeVectorStore {
    documents: Vec<ScoredDocument>,
    queries: Mutex<Vec<(String, usize)>>,
    upserted: Mutex<Vec<VectorRecord>>,
    deleted: Mutex<Vec<Value>>,
    fail_query: AtomicBool,
}

impl FakeVectorStore {
    pub fn with_documents(documents: Vec<ScoredDocument>) -> Self {
        Self {
            documents,
            ..Self::default()
        }
    }

    pub fn fail_query(&self) {
        self.fail_query.store(true, Ordering::SeqCst);
    }

    /// Team id of every query issued, in order.
    pub fn query_teams(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .map(|(team, _)| team.clone())
            .collect()
    }

    pub fn upserted(&self) -> Vec<VectorRecord> {
        self.upserted.lock().unwrap().clone()
    }

    pub fn deleted_filters(&self) -> Vec<Value> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorStore for FakeVectorStore {
    async fn query(
        &self,
        _vector: &[f32],
        top_k: usize,
        filter: &TenantFilter,
    ) -> Result<Vec<ScoredDocument>, ApiError> {
        self.queries
            .lock()
            .unwrap()
            .push((filter.team_id().to_string(), top_k));
        if self.fail_query.load(Ordering::SeqCst) {
            return Err(ApiError::VectorStore("index unavailable".to_string()));
        }
        Ok(self.documents.iter().take(top_k).cloned().collect())
    }

    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<usize, ApiError> {
        let count = records.len();
        self.upserted.lock().unwrap().extend(records);
        Ok(count)
    }

    async fn delete_by_filter(&self, filter: Value) -> Result<(), ApiError> {
        self.deleted.lock().unwrap().push(filter);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeChatStore {
    sessions: Mutex<HashMap<String, ChatSession>>,
    messages: Mutex<HashMap<String, Vec<ChatMessage>>>,
    name_writes: AtomicUsize,
    fail_get_session: AtomicBool,
    fail_set_name: AtomicBool,
    fail_list_messages: AtomicBool,
    fail_append: AtomicBool,
}

impl FakeChatStore {
    pub fn with_session(id: &str, team_id: &str, name: Option<&str>) -> Self {
        let store = Self::default();
        store.insert_session(id, team_id, name);
        store
    }

    pub fn insert_session(&self, id: &str, team_id: &str, name: Option<&str>) {
        self.sessions.lock().unwrap().insert(
            id.to_string(),
            ChatSession {
                id: id.to_string(),
                team_id: team_id.to_string(),
                session_name: name.map(str::to_string),
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        );
    }

    pub fn seed_messages(&self, session_id: &str, messages: Vec<ChatMessage>) {
        self.messages
            .lock()
            .unwrap()
            .insert(session_id.to_string(), messages);
    }

    pub fn messages(&self, session_id: &str) -> Vec<ChatMessage> {
        self.messages
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn session_name(&self, session_id: &str) -> Option<String> {
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .and_then(|s| s.session_name.clone())
    }

    pub fn name_writes(&self) -> usize {
        self.name_writes.load(Ordering::SeqCst)
    }

    pub fn fail_get_session(&self) {
        self.fail_get_session.store(true, Ordering::SeqCst);
    }

    pub fn fail_set_name(&self) {
        self.fail_set_name.store(true, Ordering::SeqCst);
    }

    pub fn fail_list_messages(&self) {
        self.fail_list_messages.store(true, Ordering::SeqCst);
    }

    pub fn fail_append(&self) {
        self.fail_append.store(true, Ordering::SeqCst);
    }
}

fn storage_down() -> ApiError {
    ApiError::Storage("database is locked".to_string())
}

#[async_trait]
impl ChatStore for FakeChatStore {
    async fn create_session(&self, team_id: &str) -> Result<ChatSession, ApiError> {
        let id = uuid::Uuid::new_v4().to_string();
        self.insert_session(&id, team_id, None);
        self.get_session(&id)
            .await?
            .ok_or_else(|| ApiError::internal("session vanished"))
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<ChatSession>, ApiError> {
        if self.fail_get_session.load(Ordering::SeqCst) {
            return Err(storage_down());
        }
        Ok(self.sessions.lock().unwrap().get(session_id).cloned())
    }

    async fn list_sessions(&self, team_id: &str) -> Result<Vec<ChatSession>, ApiError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.team_id == team_id)
            .cloned()
            .collect())
    }

    async fn set_session_name_if_unset(
        &self,
        session_id: &str,
        name: &str,
    ) -> Result<bool, ApiError> {
        if self.fail_set_name.load(Ordering::SeqCst) {
            return Err(storage_down());
        }
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get_mut(session_id) {
            Some(session) if !session.has_name() => {
                session.session_name = Some(name.to_string());
                self.name_writes.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_messages(&self, session_id: &str) -> Result<Vec<StoredMessage>, ApiError> {
        if self.fail_list_messages.load(Ordering::SeqCst) {
            return Err(storage_down());
        }
        Ok(self
            .messages(session_id)
            .into_iter()
            .enumerate()
            .map(|(i, message)| StoredMessage {
                id: i as i64 + 1,
                chat_session_id: session_id.to_string(),
                message,
                created_at: String::new(),
            })
            .collect())
    }

    async fn append_messages(
        &self,
        session_id: &str,
        messages: &[ChatMessage],
    ) -> Result<(), ApiError> {
        if self.fail_append.load(Ordering::SeqCst) {
            return Err(storage_down());
        }
        self.messages
            .lock()
            .unwrap()
            .entry(session_id.to_string())
            .or_default()
            .extend_from_slice(messages);
        Ok(())
    }
}
