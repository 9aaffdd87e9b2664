mod sqlite;
mod store;
mod turns;

pub use sqlite::SqliteChatStore;
pub use store::{ChatMessage, ChatSession, ChatStore, MessageRole, StoredMessage};
pub use turns::{format_chat_history, render_chat_history, Turn};
