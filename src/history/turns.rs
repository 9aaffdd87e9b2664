//! Reconstruction of question/answer turns from a flat message log.

use serde::{Deserialize, Serialize};

use super::store::{ChatMessage, MessageRole};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub question: String,
    pub answer: String,
}

impl Turn {
    fn open(question: &str) -> Self {
        Self {
            question: question.to_string(),
            answer: String::new(),
        }
    }

    fn answer_only(answer: &str) -> Self {
        Self {
            question: String::new(),
            answer: answer.to_string(),
        }
    }
}

/// Pairs each user message with the assistant message that follows it.
///
/// Input must be chronological. An assistant message with no open turn becomes
/// an answer-only turn. Unknown roles are treated as user messages.
// FIXME(product): confirm that unknown roles (e.g. `admin`) should really open a turn.
pub fn format_chat_history(messages: &[ChatMessage]) -> Vec<Turn> {
    let mut turns: Vec<Turn> = Vec::new();

    for message in messages {
        match message.role {
            MessageRole::Assistant => match turns.last_mut() {
                Some(last) if last.answer.is_empty() => {
                    last.answer = message.content.clone();
                }
                _ => turns.push(Turn::answer_only(&message.content)),
            },
            MessageRole::User | MessageRole::Unknown => {
                turns.push(Turn::open(&message.content));
            }
        }
    }

    turns
}

/// Renders at most `limit` of the latest turns, most recent first.
pub fn render_chat_history(turns: &[Turn], limit: usize) -> String {
    if turns.is_empty() || limit == 0 {
        return "(no previous conversation)".to_string();
    }

    turns
        .iter()
        .rev()
        .take(limit)
        .map(|turn| {
            let mut block = String::new();
            if !turn.question.is_empty() {
                block.push_str("User: ");
                block.push_str(&turn.question);
            }
            if !turn.answer.is_empty() {
                if !block.is_empty() {
                    block.push('\n');
                }
                block.push_str("Assistant: ");
                block.push_str(&turn.answer);
            }
            block
        })
        .filter(|block| !block.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
