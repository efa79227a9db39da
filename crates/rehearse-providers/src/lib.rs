//! rehearse-providers — LLM provider integrations.
//!
//! Implements the `LlmProvider` trait for Google Gemini and OpenAI-compatible
//! chat APIs, plus a scriptable mock, and loads `rehearse.toml`.

pub mod config;
pub mod gemini;
mod http;
pub mod mock;
pub mod openai;

pub use config::{create_provider, load_config, load_config_from, ProviderConfig, RehearseConfig};
pub use mock::MockProvider;
pub use rehearse_core::error::ProviderError;
