// Together AI completions adapter
// API Reference: https://docs.together.ai/reference/completions-1
//
// Uses the plain-prompt `/completions` endpoint, not chat completions. The
// stop sequences keep the model from continuing a made-up dialogue.

use crate::config::AnswerServiceConfig;
use crate::llm::provider::{AnswerService, GENERATION_PARAMS};
use crate::types::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub struct TogetherAdapter {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f64,
    top_k: u32,
    top_p: f64,
    repetition_penalty: f64,
    stop: &'a [&'a str],
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct TogetherErrorResponse {
    error: TogetherError,
}

#[derive(Deserialize)]
struct TogetherError {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

impl TogetherAdapter {
    pub fn new(config: &AnswerServiceConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/completions", self.base_url)
    }
}

#[async_trait]
impl AnswerService for TogetherAdapter {
    async fn complete(&self, prompt: &str) -> AppResult<String> {
        if self.api_key.is_empty() {
            return Err(AppError::service(
                "TOGETHER_API_KEY is not set; cannot reach the completion service",
            ));
        }

        let request = CompletionRequest {
            model: &self.model,
            prompt,
            max_tokens: GENERATION_PARAMS.max_tokens,
            temperature: GENERATION_PARAMS.temperature,
            top_k: GENERATION_PARAMS.top_k,
            top_p: GENERATION_PARAMS.top_p,
            repetition_penalty: GENERATION_PARAMS.repetition_penalty,
            stop: GENERATION_PARAMS.stop,
        };

        debug!(model = %self.model, prompt_chars = prompt.len(), "Sending completion request");

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::service(format!("Together request failed: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(%status, "Completion request rejected");

            if let Ok(error_response) = serde_json::from_str::<TogetherErrorResponse>(&error_text) {
                return Err(AppError::service(format!(
                    "Together API error ({}): {} (type: {})",
                    status,
                    error_response.error.message,
                    error_response.error.error_type.as_deref().unwrap_or("unknown")
                )));
            }

            return Err(AppError::service(format!(
                "Together API error ({}): {}",
                status, error_text
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::service(format!("Failed to parse Together response: {}", e)))?;

        let choice = completion
            .choices
            .first()
            .ok_or_else(|| AppError::service("Together returned no choices"))?;

        Ok(choice.text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn adapter_for(server: &mockito::Server) -> TogetherAdapter {
        TogetherAdapter::new(&AnswerServiceConfig {
            api_key: "test-key".to_string(),
            model: "test-model".to_string(),
            base_url: server.url(),
        })
    }

    #[tokio::test]
    async fn test_complete_sends_fixed_params_and_trims() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(json!({
                "model": "test-model",
                "prompt": "Here is the data:\nx\n\nQuestion: q\nAnswer:",
                "max_tokens": 512,
                "temperature": 0.7,
                "top_k": 50,
                "top_p": 0.7,
                "repetition_penalty": 1.1,
                "stop": ["User:", "AI:"]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"text":"  Asia had the highest revenue.\n"}]}"#)
            .create_async()
            .await;

        let answer = adapter_for(&server)
            .complete("Here is the data:\nx\n\nQuestion: q\nAnswer:")
            .await
            .unwrap();

        assert_eq!(answer, "Asia had the highest revenue.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_body_is_service_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/completions")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":{"message":"Invalid API key provided","type":"invalid_request_error"}}"#)
            .create_async()
            .await;

        let err = adapter_for(&server).complete("prompt").await.unwrap_err();
        assert!(matches!(err, AppError::Service(_)));
        assert!(err.to_string().contains("Invalid API key provided"));
    }

    #[tokio::test]
    async fn test_empty_choices_is_service_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let err = adapter_for(&server).complete("prompt").await.unwrap_err();
        assert_eq!(err.to_string(), "LLM API error: Together returned no choices");
    }

    #[tokio::test]
    async fn test_missing_key_skips_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/completions")
            .expect(0)
            .create_async()
            .await;

        let adapter = TogetherAdapter::new(&AnswerServiceConfig {
            base_url: server.url(),
            ..AnswerServiceConfig::default()
        });
        let err = adapter.complete("prompt").await.unwrap_err();
        assert!(matches!(err, AppError::Service(_)));
        mock.assert_async().await;
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let adapter = TogetherAdapter::new(&AnswerServiceConfig {
            base_url: "https://api.together.xyz/v1/".to_string(),
            ..AnswerServiceConfig::default()
        });
        assert_eq!(adapter.endpoint(), "https://api.together.xyz/v1/completions");
    }
}
