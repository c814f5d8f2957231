//! Groq chat client (OpenAI-compatible API).
//!
//! Groq uses the same Chat Completions format as OpenAI,
//! so this delegates to `OpenAiClient` with a custom endpoint.

use super::openai::OpenAiClient;
use super::provider::{ChatClient, ChatMessage, ChatResponse};
use crate::error::PipelineError;
use async_trait::async_trait;
use std::time::Duration;

/// Groq client wrapping an OpenAI-compatible endpoint.
pub struct GroqClient {
    inner: OpenAiClient,
}

impl GroqClient {
    pub fn new(endpoint: &str, api_key: &str, model: &str) -> Self {
        let url = format!("{}/chat/completions", endpoint.trim_end_matches('/'));
        Self {
            inner: OpenAiClient::with_endpoint(api_key, model, &url),
        }
    }

    pub fn with_temperature(self, temperature: f32) -> Self {
        Self {
            inner: self.inner.with_temperature(temperature),
        }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            inner: self.inner.with_timeout(timeout),
        }
    }
}

#[async_trait]
impl ChatClient for GroqClient {
    fn name(&self) -> &str {
        "groq"
    }

    async fn invoke(&self, messages: &[ChatMessage]) -> Result<ChatResponse, PipelineError> {
        self.inner.invoke(messages).await
    }
}
