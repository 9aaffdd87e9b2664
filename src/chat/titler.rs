use std::sync::Arc;

use crate::llm::{GenerateRequest, LlmProvider};

/// Leading text of every title prompt.
pub(crate) const TITLE_INSTRUCTION: &str =
    "Generate a short, descriptive title (at most 6 words) for a conversation";

const MAX_PROMPT_CHARS: usize = 500;
const MAX_TITLE_CHARS: usize = 50;
const ELLIPSIS: &str = "...";
const DEFAULT_TITLE: &str = "New Chat";

const QUOTES: [char; 7] = ['"', '\'', '`', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}'];

/// Names a session after its opening message. Never fails.
pub struct SessionTitler {
    llm: Arc<dyn LlmProvider>,
    model: String,
}

impl SessionTitler {
    pub fn new(llm: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    pub async fn title_for(&self, first_message: &str) -> String {
        let request = GenerateRequest::new(title_prompt(first_message)).with_temperature(0.0);

        match self.llm.generate(request, &self.model).await {
            Ok(raw) => {
                let cleaned = clean_title(&raw);
                if cleaned.is_empty() {
                    tracing::debug!("Model returned an empty title; using fallback");
                    fallback_title(first_message)
                } else {
                    cleaned
                }
            }
            Err(err) => {
                tracing::warn!("Title generation failed, using fallback: {}", err);
                fallback_title(first_message)
            }
        }
    }
}

fn title_prompt(message: &str) -> String {
    let excerpt: String = message.chars().take(MAX_PROMPT_CHARS).collect();
    format!(
        "{} that starts with the message below. \
Reply with the title only, without quotes or punctuation at the end.\n\n\
Message: {}\n\nTitle:",
        TITLE_INSTRUCTION, excerpt
    )
}

pub fn clean_title(raw: &str) -> String {
    let title = raw
        .trim_start_matches(|c: char| c.is_whitespace() || QUOTES.contains(&c))
        .trim_end_matches(|c: char| {
            c.is_whitespace()
                || QUOTES.contains(&c)
                || matches!(c, '.' | '!' | '?' | ',' | ';' | ':')
        });

    if title.chars().count() > MAX_TITLE_CHARS {
        let head: String = title
            .chars()
            .take(MAX_TITLE_CHARS - ELLIPSIS.len())
            .collect();
        format!("{}{}", head, ELLIPSIS)
    } else {
        title.to_string()
    }
}

pub fn fallback_title(message: &str) -> String {
    let first_line = message.lines().next().unwrap_or_default();
    let title: String = first_line.chars().take(MAX_TITLE_CHARS).collect();
    let title = title.trim();
    if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title.to_string()
    }
}
