//! Language-model integration: chat clients, the client cache, and the
//! summarize and classify stages built on them.
//!
//! Provides a client abstraction over OpenAI, Azure OpenAI and Groq, a
//! bounded cache of configured handles, and a structured-output parser.

pub(crate) mod azure;
pub mod cache;
pub mod classify;
pub(crate) mod groq;
pub mod mock;
pub(crate) mod openai;
pub mod parse;
pub mod prompts;
pub mod provider;
pub mod summarize;

pub use cache::ModelClientCache;
pub use classify::Classifier;
pub use mock::MockChatClient;
pub use parse::{parse_json, ParseError};
pub use provider::{
    ChatClient, ChatClientFactory, ChatMessage, ChatResponse, ContentPart, ModelClientHandle,
    ModelProvider, ProviderFactory, Role,
};
pub use summarize::{ImageSource, Summarizer};

/// Role key under which both stages request their client.
pub const CHAT_ROLE: &str = "chat";

/// Temperature for deterministic summarization and classification.
pub const DETERMINISTIC_TEMPERATURE: f32 = 0.0;
