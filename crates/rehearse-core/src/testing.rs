//! In-crate fake provider for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::traits::{CompletionRequest, CompletionResponse, LlmProvider};

type Handler = Box<dyn Fn(&CompletionRequest) -> Result<String, ProviderError> + Send + Sync>;

pub(crate) struct ScriptedProvider {
    handler: Handler,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub(crate) fn new(
        handler: impl Fn(&CompletionRequest) -> Result<String, ProviderError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn fixed(response: &str) -> Self {
        let response = response.to_string();
        Self::new(move |_| Ok(response.clone()))
    }

    pub(crate) fn failing() -> Self {
        Self::new(|_| Err(ProviderError::NetworkError("connection refused".into())))
    }

    /// Replays `script` in order, then fails with a network error.
    pub(crate) fn sequence(script: Vec<Result<String, ProviderError>>) -> Self {
        let queue = Mutex::new(VecDeque::from(script));
        Self::new(move |_| {
            queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::NetworkError("script exhausted".into())))
        })
    }

    pub(crate) fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<CompletionResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let content = (self.handler)(request)?;
        Ok(CompletionResponse {
            content,
            model: request.model.clone(),
            latency_ms: 0,
        })
    }
}
