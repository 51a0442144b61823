//! LLM text-completion integration.
//!
//! The provider is an external collaborator: this module owns the completion
//! trait, an OpenAI-compatible HTTP client, prompt construction, markdown
//! fence stripping, and the fallback model chain. Retry decisions dispatch
//! on the provider error tag, never on status codes or message substrings.

pub mod client;
pub mod error;
pub mod generator;
pub mod openai;
pub mod prompt;

pub use client::{CompletionRequest, TextCompletion};
pub use error::ProviderError;
pub use generator::SqlGenerator;
pub use openai::OpenAiCompatibleClient;
