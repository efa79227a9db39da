//! OpenAI-compatible chat completions provider.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use rehearse_core::traits::{CompletionRequest, CompletionResponse, LlmProvider};

use crate::http::{build_client, check_status, send_error, DEFAULT_TIMEOUT_SECS};
use crate::ProviderError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Any server speaking the OpenAI `/v1/chat/completions` protocol.
pub struct OpenAiProvider {
    api_key: String,
    base_url: String,
    org_id: Option<String>,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(
        api_key: &str,
        base_url: Option<String>,
        org_id: Option<String>,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            org_id,
            client: build_client(DEFAULT_TIMEOUT_SECS)?,
        })
    }
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    messages: Vec<OpenAiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct OpenAiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<CompletionResponse> {
        let start = Instant::now();

        let mut messages = Vec::with_capacity(2);
        if !request.system_prompt.is_empty() {
            messages.push(OpenAiMessage {
                role: "system",
                content: &request.system_prompt,
            });
        }
        messages.push(OpenAiMessage {
            role: "user",
            content: &request.prompt,
        });

        let body = OpenAiRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages,
            response_format: request.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let mut req = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json");

        if let Some(org) = &self.org_id {
            req = req.header("OpenAI-Organization", org);
        }

        let response = req
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(e, DEFAULT_TIMEOUT_SECS))?;
        let response = check_status(response, &request.model).await?;

        let api_response: OpenAiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status: 0,
                message: format!("failed to parse response: {e}"),
            })?;

        let choice = api_response.choices.into_iter().next();
        if let Some(reason) = choice.as_ref().and_then(|c| c.finish_reason.as_deref()) {
            if reason == "content_filter" {
                return Err(ProviderError::SafetyBlocked(reason.to_string()).into());
            }
        }
        let content = choice
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse)?;

        Ok(CompletionResponse {
            content,
            model: api_response.model.unwrap_or_else(|| request.model.clone()),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(json_mode: bool) -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4.1-mini".into(),
            system_prompt: "You are an interview coach.".into(),
            prompt: "Evaluate this answer.".into(),
            max_tokens: 512,
            temperature: 0.3,
            json_mode,
        }
    }

    fn provider(server: &MockServer) -> OpenAiProvider {
        OpenAiProvider::new("test-key", Some(server.uri()), None).unwrap()
    }

    fn downcast(err: &anyhow::Error) -> &ProviderError {
        err.downcast_ref::<ProviderError>().unwrap()
    }

    #[tokio::test]
    async fn successful_completion_in_json_mode() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "choices": [{"message": {"content": "{\"scores\": {}}", "role": "assistant"}, "index": 0, "finish_reason": "stop"}],
            "model": "gpt-4.1-mini"
        });

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "response_format": {"type": "json_object"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let response = provider(&server).complete(&request(true)).await.unwrap();
        assert_eq!(response.content, "{\"scores\": {}}");
        assert_eq!(response.model, "gpt-4.1-mini");
    }

    #[tokio::test]
    async fn plain_mode_sends_no_response_format() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "What happened next?"}}]
            })))
            .mount(&server)
            .await;

        let response = provider(&server).complete(&request(false)).await.unwrap();
        assert_eq!(response.content, "What happened next?");
        assert_eq!(response.model, "gpt-4.1-mini");

        let received = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        assert!(body.get("response_format").is_none());
    }

    #[tokio::test]
    async fn empty_content_is_an_empty_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "  "}}]
            })))
            .mount(&server)
            .await;

        let err = provider(&server).complete(&request(false)).await.unwrap_err();
        assert!(matches!(downcast(&err), ProviderError::EmptyResponse));
    }

    #[tokio::test]
    async fn content_filter_is_a_safety_block() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": null}, "finish_reason": "content_filter"}]
            })))
            .mount(&server)
            .await;

        let err = provider(&server).complete(&request(true)).await.unwrap_err();
        assert!(matches!(downcast(&err), ProviderError::SafetyBlocked(_)));
    }

    #[tokio::test]
    async fn status_codes_are_classified() {
        let cases: [(u16, fn(&ProviderError) -> bool); 4] = [
            (401, |e| matches!(e, ProviderError::AuthenticationFailed(_))),
            (404, |e| matches!(e, ProviderError::ModelNotFound(m) if m == "gpt-4.1-mini")),
            (500, |e| matches!(e, ProviderError::ApiError { status: 500, .. })),
            (429, |e| matches!(e, ProviderError::RateLimited { retry_after_ms: 7000 })),
        ];

        for (status, check) in cases {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/v1/chat/completions"))
                .respond_with(
                    ResponseTemplate::new(status)
                        .insert_header("retry-after", "7")
                        .set_body_string("nope"),
                )
                .mount(&server)
                .await;

            let err = provider(&server).complete(&request(true)).await.unwrap_err();
            assert!(check(downcast(&err)), "status {status}: {err}");
        }
    }
}
