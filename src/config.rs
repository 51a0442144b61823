//! Configuration handling for the askdb pipeline.
//!
//! This module provides configuration management via CLI arguments and
//! environment variables.

use clap::Parser;
use std::time::Duration;

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PIPELINE_DEADLINE_SECS: u64 = 120;

// LLM defaults mirror the hosted OpenRouter deployment.
pub const DEFAULT_LLM_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_LLM_MODEL: &str = "openai/gpt-4-turbo-preview";
pub const DEFAULT_SQL_TEMPERATURE: f32 = 0.1;
pub const DEFAULT_SQL_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_EXPLAIN_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_EXPLAIN_MAX_TOKENS: u32 = 500;

/// Configuration for the askdb pipeline.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "askdb",
    about = "Ask a database a question in natural language and get a safely-executed SQL result",
    version,
    author
)]
pub struct Config {
    /// LLM provider API key (sensitive - never logged)
    #[arg(long, env = "ASKDB_LLM_API_KEY", hide_env_values = true)]
    pub llm_api_key: String,

    /// Base URL of the OpenAI-compatible completion endpoint
    #[arg(long, default_value = DEFAULT_LLM_BASE_URL, env = "ASKDB_LLM_BASE_URL")]
    pub llm_base_url: String,

    /// Primary model identifier for SQL generation
    #[arg(long, default_value = DEFAULT_LLM_MODEL, env = "ASKDB_LLM_MODEL")]
    pub llm_model: String,

    /// Fallback model identifiers, tried in order when the primary model
    /// fails with a retryable error (rate limit, insufficient credit).
    #[arg(
        long = "llm-fallback-model",
        value_name = "MODEL",
        env = "ASKDB_LLM_FALLBACK_MODELS",
        value_delimiter = ','
    )]
    pub llm_fallback_models: Vec<String>,

    /// Database connect timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS,
        env = "ASKDB_CONNECT_TIMEOUT"
    )]
    pub connect_timeout: u64,

    /// Overall deadline for one query pipeline (schema introspection, LLM
    /// generation, guardrails, and execution) in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_PIPELINE_DEADLINE_SECS,
        env = "ASKDB_PIPELINE_DEADLINE"
    )]
    pub pipeline_deadline: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "ASKDB_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "ASKDB_JSON_LOGS")]
    pub json_logs: bool,
}

impl Config {
    /// Parse configuration from command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_base_url: DEFAULT_LLM_BASE_URL.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_fallback_models: Vec::new(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT_SECS,
            pipeline_deadline: DEFAULT_PIPELINE_DEADLINE_SECS,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }

    /// All models to try, primary first.
    pub fn model_chain(&self) -> Vec<String> {
        let mut chain = vec![self.llm_model.clone()];
        chain.extend(self.llm_fallback_models.iter().cloned());
        chain
    }

    /// Get the connect timeout as a Duration.
    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    /// Get the pipeline deadline as a Duration.
    pub fn pipeline_deadline_duration(&self) -> Duration {
        Duration::from_secs(self.pipeline_deadline)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
