//! HTTP plumbing shared by the REST providers.

use std::time::Duration;

use serde_json::Value;

use crate::ProviderError;

pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Rate-limit wait used when the server gives no hint.
const DEFAULT_RETRY_AFTER_MS: u64 = 5000;

pub(crate) fn build_client(timeout_secs: u64) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ProviderError::NetworkError(format!("failed to build HTTP client: {e}")))
}

pub(crate) fn send_error(e: reqwest::Error, timeout_secs: u64) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(timeout_secs)
    } else {
        ProviderError::NetworkError(e.to_string())
    }
}

/// Pass successful responses through; classify everything else.
pub(crate) async fn check_status(
    response: reqwest::Response,
    model: &str,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();
    if status < 400 {
        return Ok(response);
    }

    let header_hint = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(retry_after_header_ms);
    let body = response.text().await.unwrap_or_default();

    Err(match status {
        429 => ProviderError::RateLimited {
            retry_after_ms: header_hint
                .or_else(|| retry_delay_from_body(&body))
                .unwrap_or(DEFAULT_RETRY_AFTER_MS),
        },
        401 | 403 => ProviderError::AuthenticationFailed(body),
        // Gemini reports a bad key as 400 INVALID_ARGUMENT.
        400 if body.contains("API_KEY_INVALID") => ProviderError::AuthenticationFailed(body),
        404 => ProviderError::ModelNotFound(model.to_string()),
        _ => ProviderError::ApiError {
            status,
            message: body,
        },
    })
}

/// `retry-after` in whole seconds, as milliseconds. Absurd values saturate.
fn retry_after_header_ms(value: &str) -> Option<u64> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| secs.saturating_mul(1000))
}

/// Google APIs put the wait in `error.details[].retryDelay`, e.g. `"13s"`.
fn retry_delay_from_body(body: &str) -> Option<u64> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/details")?
        .as_array()?
        .iter()
        .filter_map(|d| d.get("retryDelay")?.as_str())
        .find_map(|delay| delay.trim().strip_suffix('s')?.parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(|secs| (secs * 1000.0).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_delay_is_read_from_error_details() {
        let body = r#"{"error": {"code": 429, "details": [
            {"@type": "type.googleapis.com/google.rpc.QuotaFailure"},
            {"@type": "type.googleapis.com/google.rpc.RetryInfo", "retryDelay": "13s"}
        ]}}"#;
        assert_eq!(retry_delay_from_body(body), Some(13_000));
    }

    #[test]
    fn fractional_retry_delay() {
        let body = r#"{"error": {"details": [{"retryDelay": "1.5s"}]}}"#;
        assert_eq!(retry_delay_from_body(body), Some(1500));
    }

    #[test]
    fn retry_after_header_saturates() {
        assert_eq!(retry_after_header_ms(" 7 "), Some(7000));
        assert_eq!(retry_after_header_ms(&u64::MAX.to_string()), Some(u64::MAX));
        assert_eq!(retry_after_header_ms("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }

    #[test]
    fn missing_retry_delay() {
        assert_eq!(retry_delay_from_body("slow down"), None);
        assert_eq!(retry_delay_from_body(r#"{"error": {}}"#), None);
    }
}
