pub mod chat;
pub mod core;
pub mod history;
pub mod llm;
pub mod rag;
pub mod server;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;
