pub mod guard;
pub mod ollama;
pub mod provider;
pub mod types;


pub use guard::{ModelGuard, ModelReadiness};
pub use ollama::OllamaProvider;
pub use provider::LlmProvider;
pub use types::{GenerateRequest, ProviderModel};
