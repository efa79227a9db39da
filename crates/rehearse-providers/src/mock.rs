//! Mock provider for testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use rehearse_core::traits::{CompletionRequest, CompletionResponse, LlmProvider};

use crate::ProviderError;

/// A mock LLM provider for exercising sessions without real API calls.
///
/// Resolution order per call: the scripted queue, then the first route whose
/// needle appears in the system prompt or the prompt, then the default.
pub struct MockProvider {
    /// Substring → response, checked in insertion order.
    routes: Vec<(String, String)>,
    /// One-shot results consumed before routing.
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    /// Response when nothing else applies.
    default_response: String,
    /// When set, every unscripted call fails with a network error.
    failing: bool,
    call_count: AtomicU32,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl MockProvider {
    /// Route by prompt content, falling back to `default_response`.
    pub fn new(routes: Vec<(String, String)>, default_response: &str) -> Self {
        Self {
            routes,
            script: Mutex::new(VecDeque::new()),
            default_response: default_response.to_string(),
            failing: false,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same response.
    pub fn with_fixed_response(response: &str) -> Self {
        Self::new(Vec::new(), response)
    }

    /// Create a mock whose every call fails with a network error.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::with_fixed_response("")
        }
    }

    /// Add a route: prompts containing `needle` get `response`.
    pub fn route(mut self, needle: &str, response: &str) -> Self {
        self.routes.push((needle.to_string(), response.to_string()));
        self
    }

    /// Queue results returned, in order, before any routing applies.
    pub fn with_script(self, script: Vec<Result<String, ProviderError>>) -> Self {
        if let Ok(mut queue) = self.script.lock() {
            queue.extend(script);
        }
        self
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this provider.
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().ok().and_then(|r| r.clone())
    }

    fn resolve(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        if let Some(scripted) = self.script.lock().ok().and_then(|mut q| q.pop_front()) {
            return scripted;
        }
        if self.failing {
            return Err(ProviderError::NetworkError("mock provider is offline".into()));
        }
        let routed = self.routes.iter().find(|(needle, _)| {
            request.system_prompt.contains(needle.as_str())
                || request.prompt.contains(needle.as_str())
        });
        Ok(routed
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| self.default_response.clone()))
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<CompletionResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        let content = self.resolve(request)?;
        Ok(CompletionResponse {
            content,
            model: request.model.clone(),
            latency_ms: 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(system_prompt: &str, prompt: &str) -> CompletionRequest {
        CompletionRequest {
            model: "mock".into(),
            system_prompt: system_prompt.into(),
            prompt: prompt.into(),
            max_tokens: 100,
            temperature: 0.0,
            json_mode: false,
        }
    }

    #[tokio::test]
    async fn fixed_response() {
        let provider = MockProvider::with_fixed_response("Why?");
        let response = provider.complete(&request("", "anything")).await.unwrap();
        assert_eq!(response.content, "Why?");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn routes_match_system_prompt_or_prompt_in_order() {
        let provider = MockProvider::with_fixed_response("default")
            .route("impartial evaluator", "{\"scores\": {}}")
            .route("rate limiter", "How would you shard it?")
            .route("evaluator", "never reached");

        let critic = provider
            .complete(&request("You are an impartial evaluator.", "Q"))
            .await
            .unwrap();
        assert_eq!(critic.content, "{\"scores\": {}}");

        let follow_up = provider
            .complete(&request("interviewer", "Design a rate limiter"))
            .await
            .unwrap();
        assert_eq!(follow_up.content, "How would you shard it?");

        let other = provider.complete(&request("", "hello")).await.unwrap();
        assert_eq!(other.content, "default");
    }

    #[tokio::test]
    async fn script_runs_before_routes() {
        let provider = MockProvider::with_fixed_response("after").with_script(vec![
            Err(ProviderError::Timeout(5)),
            Ok("scripted".into()),
        ]);

        let err = provider.complete(&request("", "x")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProviderError>(),
            Some(ProviderError::Timeout(5))
        ));
        assert_eq!(provider.complete(&request("", "x")).await.unwrap().content, "scripted");
        assert_eq!(provider.complete(&request("", "x")).await.unwrap().content, "after");
    }

    #[tokio::test]
    async fn failing_mock_records_requests() {
        let provider = MockProvider::failing();
        assert!(provider.complete(&request("sys", "prompt")).await.is_err());
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.last_request().unwrap().prompt, "prompt");
    }
}
