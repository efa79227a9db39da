//! Core trait definitions for LLM providers.
//!
//! The evaluator gateway and the follow-up generator both talk to a model
//! through [`LlmProvider`]; implementations live in `rehearse-providers`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LLM Provider trait
// ---------------------------------------------------------------------------

/// Trait for LLM backends that turn a prompt into text.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Run a single completion. Failures should be `ProviderError`s so the
    /// retry loop can classify them.
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<CompletionResponse>;
}

/// Request for a single completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier (e.g. "gemini-2.5-flash").
    pub model: String,
    /// Persona / instruction prompt.
    #[serde(default)]
    pub system_prompt: String,
    /// The main prompt.
    pub prompt: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Ask the backend for a JSON object instead of free text.
    #[serde(default)]
    pub json_mode: bool,
}

/// Response from a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The raw response text.
    pub content: String,
    /// Model that actually generated the response.
    pub model: String,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

// ---------------------------------------------------------------------------
// JSON payload extraction
// ---------------------------------------------------------------------------

/// Strip Markdown code fences some models wrap around JSON output.
///
/// Handles ```` ```json ```` and bare ```` ``` ```` fences, including an
/// unclosed trailing fence. Text without fences is returned trimmed.
pub fn extract_json_payload(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}
