//! Chat client trait, message types, and provider selection.
//!
//! Stages talk to a model only through [`ChatClient`]. Which backend answers
//! is decided once at startup from [`LlmConfig`] as a [`ModelProvider`], and
//! [`ProviderFactory`] builds configured clients for the client cache.

use crate::config::{AzureConfig, GroqConfig, LlmConfig, LlmService, ModelRoles, OpenAiConfig};
use crate::error::PipelineError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One part of a multi-part message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrl { url: url.into() },
        }
    }
}

/// Image reference: a remote URL or a data URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// One chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Vec<ContentPart>,
}

impl ChatMessage {
    /// A user turn with arbitrary parts.
    pub fn user(content: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }

    /// A user turn with a single text part.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::user(vec![ContentPart::text(text)])
    }
}

/// The response from a chat completion call.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Generated text
    pub content: String,
    /// Model identifier used
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// A configured chat model.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (handles are shared as `Arc<dyn ChatClient>`).
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Provider name for logging (e.g., "openai", "azure").
    fn name(&self) -> &str;

    /// Send messages and return the model's reply.
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<ChatResponse, PipelineError>;
}

/// Shared handle to a configured chat model.
pub type ModelClientHandle = Arc<dyn ChatClient>;

/// Builds chat clients for a (role, temperature) pair.
pub trait ChatClientFactory: Send + Sync {
    fn create(&self, role: &str, temperature: f32) -> Result<ModelClientHandle, PipelineError>;
}

impl<F> ChatClientFactory for F
where
    F: Fn(&str, f32) -> Result<ModelClientHandle, PipelineError> + Send + Sync,
{
    fn create(&self, role: &str, temperature: f32) -> Result<ModelClientHandle, PipelineError> {
        self(role, temperature)
    }
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// The active chat completion service, resolved once from config.
#[derive(Debug, Clone)]
pub enum ModelProvider {
    OpenAi(OpenAiConfig),
    Azure(AzureConfig),
    Groq(GroqConfig),
}

impl ModelProvider {
    /// Select the provider named by `llm.service`, using defaults for missing sections.
    pub fn from_config(config: &LlmConfig) -> Self {
        match config.service {
            LlmService::OpenAi => Self::OpenAi(config.openai.clone().unwrap_or_default()),
            LlmService::Azure => Self::Azure(config.azure.clone().unwrap_or_default()),
            LlmService::Groq => Self::Groq(config.groq.clone().unwrap_or_default()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAi(_) => "openai",
            Self::Azure(_) => "azure",
            Self::Groq(_) => "groq",
        }
    }
}

/// Factory that creates provider clients from resolved configuration.
pub struct ProviderFactory {
    provider: ModelProvider,
    models: ModelRoles,
    timeout: Duration,
}

impl ProviderFactory {
    pub fn new(provider: ModelProvider, models: ModelRoles, timeout: Duration) -> Self {
        Self {
            provider,
            models,
            timeout,
        }
    }

    /// Build from the `[llm]` section and a per-request timeout.
    pub fn from_config(config: &LlmConfig, timeout: Duration) -> Self {
        Self::new(
            ModelProvider::from_config(config),
            config.models.clone(),
            timeout,
        )
    }

    pub fn provider(&self) -> &ModelProvider {
        &self.provider
    }

    fn model_for(&self, role: &str) -> Result<&str, PipelineError> {
        self.models
            .model_for(role)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| PipelineError::model(format!("No model configured for role '{role}'")))
    }
}

fn missing_key(provider: &str, env: &str) -> PipelineError {
    PipelineError::model(format!("{provider} API key not set. Set {env} env var."))
}

impl ChatClientFactory for ProviderFactory {
    fn create(&self, role: &str, temperature: f32) -> Result<ModelClientHandle, PipelineError> {
        let handle: ModelClientHandle = match &self.provider {
            ModelProvider::OpenAi(cfg) => {
                let api_key = resolve_env_var(&cfg.api_key)
                    .ok_or_else(|| missing_key("OpenAI", "OPENAI_API_KEY"))?;
                let model = self.model_for(role)?;
                Arc::new(
                    super::openai::OpenAiClient::with_endpoint(&api_key, model, &cfg.endpoint)
                        .with_temperature(temperature)
                        .with_timeout(self.timeout),
                )
            }
            ModelProvider::Azure(cfg) => {
                if cfg.endpoint.is_empty() {
                    return Err(PipelineError::model(
                        "Azure endpoint not set. Set llm.azure.endpoint in config.",
                    ));
                }
                let api_key = resolve_env_var(&cfg.api_key)
                    .ok_or_else(|| missing_key("Azure OpenAI", "AZURE_OPENAI_API_KEY"))?;
                let deployment = match cfg.deployments.get(role) {
                    Some(deployment) => deployment.as_str(),
                    None => self.model_for(role)?,
                };
                Arc::new(
                    super::azure::AzureClient::new(
                        &cfg.endpoint,
                        &api_key,
                        deployment,
                        &cfg.api_version,
                    )
                    .with_temperature(temperature)
                    .with_timeout(self.timeout),
                )
            }
            ModelProvider::Groq(cfg) => {
                let api_key = resolve_env_var(&cfg.api_key)
                    .ok_or_else(|| missing_key("Groq", "GROQ_API_KEY"))?;
                Arc::new(
                    super::groq::GroqClient::new(&cfg.endpoint, &api_key, &cfg.model)
                        .with_temperature(temperature)
                        .with_timeout(self.timeout),
                )
            }
        };

        tracing::debug!(
            "Created {} chat client for role '{role}' at temperature {temperature}",
            handle.name()
        );
        Ok(handle)
    }
}
