//! OpenAI-compatible chat-completions client.
//!
//! Works against OpenRouter or any other OpenAI-compatible endpoint. HTTP
//! statuses are classified into the tagged [`ProviderError`] union at this
//! boundary; callers upstream dispatch on the tag only.

use crate::llm::client::{CompletionRequest, TextCompletion};
use crate::llm::error::ProviderError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

const REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// LLM client for OpenAI-compatible chat-completions endpoints.
pub struct OpenAiCompatibleClient {
    api_key: String,
    base_url: String,
    referer: Option<String>,
    http_client: reqwest::Client,
}

impl OpenAiCompatibleClient {
    /// Create a new client with the given API key and base URL
    /// (e.g. "https://openrouter.ai/api/v1").
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ProviderError::auth("API key cannot be empty"));
        }

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::Network { source: e })?;

        Ok(Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            referer: None,
            http_client,
        })
    }

    /// Set the HTTP-Referer header (OpenRouter attribution).
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    fn headers(&self) -> Result<HeaderMap, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|_| ProviderError::auth("Invalid API key format"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(referer) = &self.referer {
            if let Ok(value) = HeaderValue::from_str(referer) {
                headers.insert("HTTP-Referer", value);
            }
        }
        Ok(headers)
    }

    /// Classify a non-success response into a tagged error.
    fn classify_error(status: reqwest::StatusCode, retry_after: Option<u64>, body: String) -> ProviderError {
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);

        match status.as_u16() {
            400 => ProviderError::invalid_request(message),
            401 | 403 => ProviderError::auth(message),
            402 => ProviderError::insufficient_credit(message),
            429 => ProviderError::rate_limited(message, retry_after),
            status => ProviderError::api(status, message),
        }
    }
}

#[async_trait]
impl TextCompletion for OpenAiCompatibleClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = ChatCompletionRequest {
            model: &request.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .http_client
            .post(&url)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network { source: e })?;

        let status = response.status();

        if status.is_success() {
            let completion: ChatCompletionResponse = response
                .json()
                .await
                .map_err(|e| ProviderError::other(format!("Failed to parse response: {}", e)))?;

            let text = completion
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .unwrap_or_default();

            Ok(text.trim().to_string())
        } else {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());

            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            Err(Self::classify_error(status, retry_after, body))
        }
    }

    fn provider_name(&self) -> &str {
        "openai-compatible"
    }
}
