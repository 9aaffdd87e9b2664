//! Retrieve, fill the prompt, generate.

use std::sync::Arc;

use super::retriever::TenantRetriever;
use super::store::ScoredDocument;
use crate::core::errors::ApiError;
use crate::llm::{GenerateRequest, LlmProvider};

const PROMPT_TEMPLATE: &str = "You are a helpful assistant for Q&A over PDFs.
You must use the context and recent chat history to answer.
If you don't know the answer, say you don't know.

Chat history (most recent first):
{chat_history}

Context:
{context}

Question: {question}

Answer:";

/// Joins passage texts with a blank line, keeping retrieval order.
pub fn format_docs(documents: &[ScoredDocument]) -> String {
    documents
        .iter()
        .map(|doc| doc.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Single pass over the template; substituted values are never rescanned.
pub fn fill_prompt(context: &str, chat_history: &str, question: &str) -> String {
    let fields = [
        ("{context}", context),
        ("{chat_history}", chat_history),
        ("{question}", question),
    ];

    let mut out = String::with_capacity(
        PROMPT_TEMPLATE.len() + context.len() + chat_history.len() + question.len(),
    );
    let mut rest = PROMPT_TEMPLATE;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match fields.iter().find(|(key, _)| tail.starts_with(*key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// A single-use pipeline: `answer = chain(question, chat_history)`.
pub struct RagChain {
    retriever: TenantRetriever,
    llm: Arc<dyn LlmProvider>,
    generation_model: String,
    temperature: f64,
}

impl RagChain {
    pub fn new(
        retriever: TenantRetriever,
        llm: Arc<dyn LlmProvider>,
        generation_model: impl Into<String>,
        temperature: f64,
    ) -> Self {
        Self {
            retriever,
            llm,
            generation_model: generation_model.into(),
            temperature,
        }
    }

    /// Returns the model's raw response.
    pub async fn invoke(&self, question: &str, chat_history: &str) -> Result<String, ApiError> {
        let documents = self.retriever.retrieve(question).await?;
        let prompt = fill_prompt(&format_docs(&documents), chat_history, question);

        let request = GenerateRequest::new(prompt).with_temperature(self.temperature);
        self.llm.generate(request, &self.generation_model).await
    }
}
