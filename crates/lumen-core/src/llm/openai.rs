//! OpenAI chat client using the Chat Completions API.
//!
//! Images travel as data URLs inside the user message content array.

use super::provider::{ChatClient, ChatMessage, ChatResponse};
use crate::error::PipelineError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// OpenAI client bound to one model and temperature.
pub struct OpenAiClient {
    api_key: String,
    model: String,
    temperature: f32,
    timeout: Duration,
    client: reqwest::Client,
    endpoint: String,
}

impl OpenAiClient {
    /// Create a client posting to `endpoint`.
    pub fn with_endpoint(api_key: &str, model: &str, endpoint: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            temperature: 0.0,
            timeout: Duration::from_secs(60),
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[cfg(test)]
    pub(super) fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_body<'a>(&'a self, messages: &'a [ChatMessage]) -> ChatRequest<'a> {
        ChatRequest {
            model: Some(&self.model),
            messages,
            temperature: self.temperature,
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
pub(super) struct ChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<&'a str>,
    pub messages: &'a [ChatMessage],
    pub temperature: f32,
}

// --- Response types ---

#[derive(Deserialize)]
pub(super) struct ChatCompletion {
    choices: Vec<Choice>,
    #[serde(default)]
    model: String,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

impl ChatCompletion {
    /// Take the first choice's text, or fail if the model produced none.
    pub(super) fn into_response(
        self,
        provider: &str,
        start: Instant,
    ) -> Result<ChatResponse, PipelineError> {
        let content = self
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                PipelineError::model(format!(
                    "{provider} returned empty choices array, no content generated"
                ))
            })?;

        Ok(ChatResponse {
            content: content.trim().to_string(),
            model: self.model,
            tokens_used: self.usage.map(|u| u.total_tokens),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Send a prepared request and decode a chat completion.
pub(super) async fn send_completion(
    provider: &str,
    request: reqwest::RequestBuilder,
    start: Instant,
) -> Result<ChatResponse, PipelineError> {
    let resp = request
        .header("Content-Type", "application/json")
        .send()
        .await
        .map_err(|e| PipelineError::model(format!("{provider} request failed: {e}")))?;

    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(PipelineError::ModelProcessing {
            message: format!("{provider} HTTP {status}: {text}"),
            status_code: Some(status.as_u16()),
        });
    }

    let completion: ChatCompletion = resp
        .json()
        .await
        .map_err(|e| PipelineError::model(format!("Failed to parse {provider} response: {e}")))?;

    completion.into_response(provider, start)
}

#[async_trait]
impl ChatClient for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn invoke(&self, messages: &[ChatMessage]) -> Result<ChatResponse, PipelineError> {
        let start = Instant::now();
        let request = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&self.request_body(messages))
            .timeout(self.timeout);

        send_completion("OpenAI", request, start).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::ContentPart;

    #[test]
    fn test_request_body_shape() {
        let client = OpenAiClient::with_endpoint(
            "sk-test",
            "gpt-4o-mini",
            "https://api.openai.com/v1/chat/completions",
        ).with_temperature(0.0);
        let messages = vec![ChatMessage::user(vec![
            ContentPart::text("Summarize"),
            ContentPart::image_url("data:image/jpeg;base64,/9j/"),
        ])];
        let json = serde_json::to_value(client.request_body(&messages)).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["temperature"], 0.0);
        assert_eq!(json["messages"][0]["content"][1]["type"], "image_url");
        assert_eq!(
            json["messages"][0]["content"][1]["image_url"]["url"],
            "data:image/jpeg;base64,/9j/"
        );
    }

    #[test]
    fn test_completion_takes_first_choice() {
        let completion: ChatCompletion = serde_json::from_value(serde_json::json!({
            "model": "gpt-4o-mini",
            "choices": [{"message": {"content": "  - Medium: photo\n"}}],
            "usage": {"total_tokens": 120}
        }))
        .unwrap();
        let response = completion.into_response("OpenAI", Instant::now()).unwrap();
        assert_eq!(response.content, "- Medium: photo");
        assert_eq!(response.tokens_used, Some(120));
        assert_eq!(response.model, "gpt-4o-mini");
    }

    #[test]
    fn test_completion_without_choices_is_error() {
        let completion: ChatCompletion =
            serde_json::from_value(serde_json::json!({"model": "m", "choices": []})).unwrap();
        let err = completion.into_response("OpenAI", Instant::now()).unwrap_err();
        assert!(matches!(err, PipelineError::ModelProcessing { .. }));
    }
}
