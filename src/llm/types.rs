use serde::{Deserialize, Serialize};

/// A model the inference server reports as locally installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderModel {
    pub id: String,
    pub name: String,
}

impl ProviderModel {
    /// Exact match, or `<id>:latest` when `requested` carries no tag.
    pub fn matches(&self, requested: &str) -> bool {
        let requested = requested.trim();
        if self.id == requested || self.name == requested {
            return true;
        }
        !requested.contains(':')
            && (self.id == format!("{}:latest", requested)
                || self.name == format!("{}:latest", requested))
    }
}

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    pub temperature: Option<f64>,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}
