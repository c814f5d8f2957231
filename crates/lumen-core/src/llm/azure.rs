//! Azure OpenAI chat client.
//!
//! Same wire format as OpenAI, but the model is chosen by deployment in the
//! URL and authentication uses the `api-key` header.

use super::openai::{send_completion, ChatRequest};
use super::provider::{ChatClient, ChatMessage, ChatResponse};
use crate::error::PipelineError;
use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Azure OpenAI client bound to one deployment.
pub struct AzureClient {
    api_key: String,
    url: String,
    temperature: f32,
    timeout: Duration,
    client: reqwest::Client,
}

impl AzureClient {
    pub fn new(endpoint: &str, api_key: &str, deployment: &str, api_version: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            url: build_url(endpoint, deployment, api_version),
            temperature: 0.0,
            timeout: Duration::from_secs(60),
            client: reqwest::Client::new(),
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
}

fn build_url(endpoint: &str, deployment: &str, api_version: &str) -> String {
    format!(
        "{}/openai/deployments/{}/chat/completions?api-version={}",
        endpoint.trim_end_matches('/'),
        deployment,
        api_version
    )
}

#[async_trait]
impl ChatClient for AzureClient {
    fn name(&self) -> &str {
        "azure"
    }

    async fn invoke(&self, messages: &[ChatMessage]) -> Result<ChatResponse, PipelineError> {
        let start = Instant::now();
        let body = ChatRequest {
            model: None,
            messages,
            temperature: self.temperature,
        };
        let request = self
            .client
            .post(&self.url)
            .header("api-key", self.api_key.as_str())
            .json(&body)
            .timeout(self.timeout);

        send_completion("Azure OpenAI", request, start).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        let url = build_url(
            "https://my-resource.openai.azure.com/",
            "gpt4o-vision",
            "2024-02-01",
        );
        assert_eq!(
            url,
            "https://my-resource.openai.azure.com/openai/deployments/gpt4o-vision/chat/completions?api-version=2024-02-01"
        );
    }

    #[test]
    fn test_body_omits_model() {
        let messages = vec![ChatMessage::user_text("hi")];
        let body = ChatRequest {
            model: None,
            messages: &messages,
            temperature: 0.0,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("model").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
