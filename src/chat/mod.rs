pub mod orchestrator;
pub mod titler;


pub use orchestrator::ConversationOrchestrator;
pub use titler::SessionTitler;
