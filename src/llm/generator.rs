//! SQL generation with a fallback model chain.
//!
//! Models are tried in order. A retryable failure (rate limit, insufficient
//! credit) moves on to the next model; auth and network failures stop the
//! chain immediately. Guardrail validation of the generated SQL happens
//! downstream in the orchestrator, never here.

use crate::config::{
    DEFAULT_EXPLAIN_MAX_TOKENS, DEFAULT_EXPLAIN_TEMPERATURE, DEFAULT_SQL_MAX_TOKENS,
    DEFAULT_SQL_TEMPERATURE,
};
use crate::llm::client::{CompletionRequest, TextCompletion};
use crate::llm::error::ProviderError;
use crate::llm::prompt;
use std::sync::Arc;
use tracing::{info, warn};

/// Generates SQL (and explanations) through a text-completion provider.
pub struct SqlGenerator {
    client: Arc<dyn TextCompletion>,
    /// Models to try in order; the first entry is the primary.
    models: Vec<String>,
}

impl SqlGenerator {
    /// Create a generator over a completion client and a model chain.
    /// The chain must contain at least the primary model.
    pub fn new(client: Arc<dyn TextCompletion>, models: Vec<String>) -> Self {
        debug_assert!(!models.is_empty(), "model chain cannot be empty");
        Self { client, models }
    }

    /// Generate SQL for a natural-language question given rendered schema
    /// context. Markdown code fences are stripped from the raw output.
    pub async fn generate_sql(
        &self,
        natural_language_query: &str,
        schema_context: &str,
    ) -> Result<String, ProviderError> {
        let user_prompt = prompt::nl_to_sql_prompt(natural_language_query, schema_context, None);

        let raw = self
            .complete_with_fallback(
                prompt::SQL_SYSTEM_INSTRUCTION,
                &user_prompt,
                DEFAULT_SQL_TEMPERATURE,
                DEFAULT_SQL_MAX_TOKENS,
            )
            .await?;

        Ok(prompt::strip_code_fences(&raw))
    }

    /// Ask for a plain-English explanation of a SQL query.
    ///
    /// An empty completion degrades to a fixed message rather than an error.
    pub async fn explain_sql(&self, sql_query: &str) -> Result<String, ProviderError> {
        let user_prompt = prompt::explain_sql_prompt(sql_query);

        let explanation = self
            .complete_with_fallback(
                prompt::EXPLAIN_SYSTEM_INSTRUCTION,
                &user_prompt,
                DEFAULT_EXPLAIN_TEMPERATURE,
                DEFAULT_EXPLAIN_MAX_TOKENS,
            )
            .await?;

        if explanation.is_empty() {
            Ok("Unable to explain query".to_string())
        } else {
            Ok(explanation)
        }
    }

    /// Try each model in the chain until one succeeds or a non-retryable
    /// error stops the chain.
    async fn complete_with_fallback(
        &self,
        system: &str,
        user_prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, ProviderError> {
        let mut last_error: Option<ProviderError> = None;

        for model in &self.models {
            let request = CompletionRequest::new(model.clone(), system, user_prompt)
                .with_temperature(temperature)
                .with_max_tokens(max_tokens);

            match self.client.complete(&request).await {
                Ok(text) => {
                    info!(model = %model, "LLM completion succeeded");
                    return Ok(text);
                }
                Err(err) if err.is_retryable() => {
                    warn!(model = %model, error = %err, "Model failed, trying next in chain");
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        let last = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no models configured".to_string());
        Err(ProviderError::other(format!(
            "All {} configured model(s) failed; last error: {}",
            self.models.len(),
            last
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted client: returns each response in order per call.
    struct ScriptedClient {
        responses: Vec<Result<String, ProviderError>>,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        fn new(responses: Vec<Result<String, ProviderError>>) -> Self {
            Self {
                responses,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextCompletion for ScriptedClient {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String, ProviderError> {
            let idx = self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.responses[idx.min(self.responses.len() - 1)] {
                Ok(text) => Ok(text.clone()),
                Err(ProviderError::RateLimited {
                    message,
                    retry_after,
                }) => Err(ProviderError::rate_limited(message.clone(), *retry_after)),
                Err(ProviderError::Auth { message }) => Err(ProviderError::auth(message.clone())),
                Err(ProviderError::InsufficientCredit { message }) => {
                    Err(ProviderError::insufficient_credit(message.clone()))
                }
                Err(other) => Err(ProviderError::other(other.to_string())),
            }
        }

        fn provider_name(&self) -> &str {
            "scripted"
        }
    }

    fn generator(client: ScriptedClient, models: &[&str]) -> (SqlGenerator, Arc<ScriptedClient>) {
        let client = Arc::new(client);
        let generator = SqlGenerator::new(
            client.clone(),
            models.iter().map(|m| m.to_string()).collect(),
        );
        (generator, client)
    }

    #[tokio::test]
    async fn test_primary_model_success() {
        let (generator, client) = generator(
            ScriptedClient::new(vec![Ok("SELECT 1".to_string())]),
            &["primary"],
        );
        let sql = generator.generate_sql("one", "Table: t").await.unwrap();
        assert_eq!(sql, "SELECT 1");
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fences_stripped_from_output() {
        let (generator, _) = generator(
            ScriptedClient::new(vec![Ok("```sql\nSELECT 1\n```".to_string())]),
            &["primary"],
        );
        let sql = generator.generate_sql("one", "Table: t").await.unwrap();
        assert_eq!(sql, "SELECT 1");
    }

    #[tokio::test]
    async fn test_rate_limit_falls_back_to_next_model() {
        let (generator, client) = generator(
            ScriptedClient::new(vec![
                Err(ProviderError::rate_limited("slow down", None)),
                Ok("SELECT 2".to_string()),
            ]),
            &["primary", "fallback"],
        );
        let sql = generator.generate_sql("two", "Table: t").await.unwrap();
        assert_eq!(sql, "SELECT 2");
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_auth_error_stops_chain_immediately() {
        let (generator, client) = generator(
            ScriptedClient::new(vec![
                Err(ProviderError::auth("bad key")),
                Ok("SELECT 2".to_string()),
            ]),
            &["primary", "fallback"],
        );
        let err = generator.generate_sql("two", "Table: t").await.unwrap_err();
        assert!(matches!(err, ProviderError::Auth { .. }));
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_chain_names_last_failure() {
        let (generator, client) = generator(
            ScriptedClient::new(vec![
                Err(ProviderError::rate_limited("limit a", None)),
                Err(ProviderError::insufficient_credit("no credit")),
            ]),
            &["primary", "fallback"],
        );
        let err = generator.generate_sql("q", "Table: t").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("All 2 configured model(s) failed"));
        assert!(message.contains("no credit"));
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_explain_sql_degrades_on_empty_completion() {
        let (generator, _) = generator(
            ScriptedClient::new(vec![Ok(String::new())]),
            &["primary"],
        );
        let explanation = generator.explain_sql("SELECT 1").await.unwrap();
        assert_eq!(explanation, "Unable to explain query");
    }
}
