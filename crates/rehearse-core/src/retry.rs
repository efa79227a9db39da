//! Retrying completions with exponential backoff.

use std::time::Duration;

use tracing::warn;

use crate::error::ProviderError;
use crate::traits::{CompletionRequest, LlmProvider};

/// How many times to call a provider before giving up, and how long to wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first call.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled after every retry.
    pub initial_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Retry without waiting between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }
}

/// Why a completion produced no usable text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionFailure {
    /// Retries were exhausted or the error was permanent.
    Unavailable(String),
    /// The provider refused the content; never retried.
    SafetyBlocked(String),
}

/// Call `provider` until it returns non-blank text or the policy runs out.
///
/// Blank responses count as transient failures. Permanent errors (bad key,
/// unknown model, safety blocks) stop immediately. A rate-limit hint from the
/// provider replaces the next backoff delay, still capped at `max_delay`.
pub async fn complete_with_retry(
    provider: &dyn LlmProvider,
    request: &CompletionRequest,
    policy: &RetryPolicy,
) -> Result<String, CompletionFailure> {
    let attempts = policy.max_attempts.max(1);
    let mut delay = policy.initial_delay;
    let mut last_error = String::from("no attempts made");

    for attempt in 1..=attempts {
        if attempt > 1 {
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(policy.max_delay);
        }

        let err: anyhow::Error = match provider.complete(request).await {
            Ok(response) if !response.content.trim().is_empty() => {
                return Ok(response.content.trim().to_string());
            }
            Ok(_) => ProviderError::EmptyResponse.into(),
            Err(e) => e,
        };

        if let Some(provider_err) = err.downcast_ref::<ProviderError>() {
            if let ProviderError::SafetyBlocked(reason) = provider_err {
                warn!(provider = provider.name(), "completion blocked: {reason}");
                return Err(CompletionFailure::SafetyBlocked(reason.clone()));
            }
            if provider_err.is_permanent() {
                warn!(provider = provider.name(), "permanent provider error: {err:#}");
                return Err(CompletionFailure::Unavailable(format!("{err:#}")));
            }
            if let Some(ms) = provider_err.retry_after_ms() {
                delay = Duration::from_millis(ms).min(policy.max_delay);
            }
        }

        warn!(
            provider = provider.name(),
            attempt, attempts, "completion attempt failed: {err:#}"
        );
        last_error = format!("{err:#}");
    }

    Err(CompletionFailure::Unavailable(last_error))
}
