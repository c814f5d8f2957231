//! Lumen Core - embeddable image content-safety library.
//!
//! Lumen takes a single image, asks a vision-capable language model to
//! describe it, and classifies that description into a content-safety
//! category.
//!
//! # Architecture
//!
//! ```text
//! Image → Validate → Encode (base64 data URI) → Summarize (LLM) → Classify (LLM) → Verdict
//! ```
//!
//! Encoding and summarization are retried with capped exponential backoff.
//! Chat clients are built once per (role, temperature) and shared through
//! [`ModelClientCache`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use lumen_core::{Config, ImagePipeline, ProcessType};
//!
//! #[tokio::main]
//! async fn main() -> lumen_core::Result<()> {
//!     let config = Config::load()?;
//!     let pipeline = ImagePipeline::from_config(&config);
//!
//!     let verdict = pipeline
//!         .process("./image.jpg".as_ref(), ProcessType::Base64, None)
//!         .await?;
//!     println!("{}: {}", verdict.classification, verdict.explanation);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod retry;
pub mod types;

pub use config::Config;
pub use error::{ConfigError, ErrorKind, LumenError, PipelineError, PipelineResult, Result};
pub use llm::{
    ChatClient, ChatClientFactory, Classifier, ImageSource, ModelClientCache, ModelProvider,
    ProviderFactory, Summarizer,
};
pub use pipeline::{ImageEncoder, ImagePipeline, PipelineRun, PipelineState, Validator};
pub use retry::RetryPolicy;
pub use types::{
    Classification, ClassificationVerdict, EncodedImage, ImageAsset, ImageMetadata, ProcessType,
    Summary,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
