//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Image extensions accepted by default.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Input handling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Supported input extensions (lower-case, no leading dot)
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            supported_formats: SUPPORTED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Retry policies per stage.
///
/// Keys missing from a `[retry.*]` table fall back to that stage's preset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RetryConfigFile")]
pub struct RetryConfig {
    /// Policy guarding the file read / encode stage
    pub encode: RetrySettings,

    /// Policy guarding the summarization stage
    pub summarize: RetrySettings,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            encode: RetrySettings::encode_preset(),
            summarize: RetrySettings::summarize_preset(),
        }
    }
}

/// Bounded retry with capped exponential backoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Total attempts, including the first
    pub max_attempts: u32,

    /// Delay before the first retry in milliseconds
    pub initial_delay_ms: u64,

    /// Multiplier applied to the delay after each retry
    pub backoff_factor: f64,

    /// Ceiling for any single delay in milliseconds
    pub max_delay_ms: u64,
}

impl RetrySettings {
    /// 3 attempts, 4s initial delay, x2, capped at 10s.
    pub fn encode_preset() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 4000,
            backoff_factor: 2.0,
            max_delay_ms: 10_000,
        }
    }

    /// 3 attempts, 2s initial delay, x2, capped at 10s.
    pub fn summarize_preset() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 2000,
            backoff_factor: 2.0,
            max_delay_ms: 10_000,
        }
    }
}

/// `[retry]` as written on disk, every key optional.
#[derive(Deserialize, Default)]
#[serde(default)]
struct RetryConfigFile {
    encode: RetrySettingsFile,
    summarize: RetrySettingsFile,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RetrySettingsFile {
    max_attempts: Option<u32>,
    initial_delay_ms: Option<u64>,
    backoff_factor: Option<f64>,
    max_delay_ms: Option<u64>,
}

impl RetrySettingsFile {
    fn or_preset(self, preset: RetrySettings) -> RetrySettings {
        RetrySettings {
            max_attempts: self.max_attempts.unwrap_or(preset.max_attempts),
            initial_delay_ms: self.initial_delay_ms.unwrap_or(preset.initial_delay_ms),
            backoff_factor: self.backoff_factor.unwrap_or(preset.backoff_factor),
            max_delay_ms: self.max_delay_ms.unwrap_or(preset.max_delay_ms),
        }
    }
}

impl From<RetryConfigFile> for RetryConfig {
    fn from(file: RetryConfigFile) -> Self {
        Self {
            encode: file.encode.or_preset(RetrySettings::encode_preset()),
            summarize: file.summarize.or_preset(RetrySettings::summarize_preset()),
        }
    }
}

/// Model client cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached client handles
    pub capacity: u64,

    /// Eviction policy once capacity is exceeded
    pub eviction: EvictionKind,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 128,
            eviction: EvictionKind::Lru,
        }
    }
}

/// Eviction policy for the client cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionKind {
    /// Least-recently-used
    Lru,
    /// Frequency-aware admission (TinyLFU)
    TinyLfu,
}

/// Timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Per-request timeout for chat completion calls in milliseconds
    pub request_timeout_ms: u64,

    /// Whole-pipeline timeout applied by callers in milliseconds
    pub pipeline_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 60_000,
            pipeline_timeout_ms: 180_000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Which chat completion service answers model requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LlmService {
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    Azure,
    Groq,
}

impl std::fmt::Display for LlmService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmService::OpenAi => write!(f, "openai"),
            LlmService::Azure => write!(f, "azure"),
            LlmService::Groq => write!(f, "groq"),
        }
    }
}

/// LLM service selection and provider configurations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LlmConfig {
    /// Active service
    pub service: LlmService,

    /// Model identifier per role
    pub models: ModelRoles,

    /// OpenAI configuration
    pub openai: Option<OpenAiConfig>,

    /// Azure OpenAI configuration
    pub azure: Option<AzureConfig>,

    /// Groq configuration
    pub groq: Option<GroqConfig>,
}

/// Model identifiers keyed by the role they serve.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelRoles {
    /// General chat model, used for summarization and classification
    pub chat: String,

    /// Vision-specialized summarization model
    pub summarize_vision: String,

    /// Dedicated classification model
    pub classification: String,
}

impl Default for ModelRoles {
    fn default() -> Self {
        Self {
            chat: "gpt-4o-mini".to_string(),
            summarize_vision: "gpt-4o".to_string(),
            classification: "gpt-4o-mini".to_string(),
        }
    }
}

impl ModelRoles {
    /// Look up the model configured for a role key.
    pub fn model_for(&self, role: &str) -> Option<&str> {
        match role {
            "chat" => Some(&self.chat),
            "summarize_vision" => Some(&self.summarize_vision),
            "classification" => Some(&self.classification),
            _ => None,
        }
    }
}

/// OpenAI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Chat completions endpoint
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: "${OPENAI_API_KEY}".to_string(),
        }
    }
}

/// Azure OpenAI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    /// Resource endpoint, e.g. https://my-resource.openai.azure.com
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// API version query parameter
    pub api_version: String,

    /// Deployment name per role; roles without an entry use the model name
    #[serde(default)]
    pub deployments: BTreeMap<String, String>,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: "${AZURE_OPENAI_API_KEY}".to_string(),
            api_version: "2024-02-01".to_string(),
            deployments: BTreeMap::new(),
        }
    }
}

/// Groq configuration (OpenAI-compatible API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroqConfig {
    /// API base URL
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Vision model served for every role
    pub model: String,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.groq.com/openai/v1".to_string(),
            api_key: "${GROQ_API_KEY}".to_string(),
            model: "llama-3.2-11b-vision-preview".to_string(),
        }
    }
}
