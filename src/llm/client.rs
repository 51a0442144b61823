//! Core trait for LLM text-completion clients.

use crate::llm::error::ProviderError;
use async_trait::async_trait;

/// A single text-completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier (provider-specific).
    pub model: String,
    /// System instruction.
    pub system: String,
    /// User prompt.
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Create a new completion request.
    pub fn new(
        model: impl Into<String>,
        system: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            system: system.into(),
            prompt: prompt.into(),
            temperature: 0.0,
            max_tokens: 1000,
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Text-completion provider boundary.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// Complete a request and return the generated text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;

    /// Get provider name (e.g., "openrouter").
    fn provider_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = CompletionRequest::new("m1", "system", "prompt")
            .with_temperature(0.1)
            .with_max_tokens(500);
        assert_eq!(request.model, "m1");
        assert_eq!(request.temperature, 0.1);
        assert_eq!(request.max_tokens, 500);
    }
}
