//! Error types for the Lumen content-safety pipeline.
//!
//! Errors are organized by stage so each failure carries the context needed
//! to act on it (file path, offending extension, upstream model message).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Lumen operations.
#[derive(Error, Debug)]
pub enum LumenError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline errors, one variant per failure class a caller can observe.
///
/// A pipeline invocation either returns a verdict or exactly one of these.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input path does not exist
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Extension is not in the supported allow-list
    #[error("Unsupported file type for {path}: {extension:?}")]
    UnsupportedType { path: PathBuf, extension: String },

    /// Reading or encoding the image failed after retries
    #[error("Failed to process image {path}: {message}")]
    ImageProcessing { path: PathBuf, message: String },

    /// No usable input (e.g. an empty image URL) reached a stage
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Client unavailable, request failure, or unexpected response shape
    #[error("Model processing failed: {message}")]
    ModelProcessing {
        message: String,
        status_code: Option<u16>,
    },
}

/// Discriminant of a [`PipelineError`], used to tag failed pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    UnsupportedType,
    ImageProcessing,
    InvalidInput,
    ModelProcessing,
}

impl PipelineError {
    /// Build a `ModelProcessing` error without an HTTP status.
    pub fn model(message: impl Into<String>) -> Self {
        Self::ModelProcessing {
            message: message.into(),
            status_code: None,
        }
    }

    /// Re-raise as `ModelProcessing` with `context` prefixed, keeping any HTTP status.
    pub fn with_model_context(self, context: &str) -> Self {
        match self {
            Self::ModelProcessing {
                message,
                status_code,
            } => Self::ModelProcessing {
                message: format!("{context}: {message}"),
                status_code,
            },
            other => Self::model(format!("{context}: {other}")),
        }
    }

    /// The error's kind, without its payload.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            Self::ImageProcessing { .. } => ErrorKind::ImageProcessing,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::ModelProcessing { .. } => ErrorKind::ModelProcessing,
        }
    }
}

/// Convenience type alias for Lumen results.
pub type Result<T> = std::result::Result<T, LumenError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(
            PipelineError::NotFound(PathBuf::from("a.jpg")).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            PipelineError::model("boom").kind(),
            ErrorKind::ModelProcessing
        );
        assert_eq!(
            PipelineError::InvalidInput("empty url".into()).kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn test_model_error_keeps_message() {
        let err = PipelineError::model("Failed to summarize image: connection reset");
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_model_context_keeps_status() {
        let err = PipelineError::ModelProcessing {
            message: "HTTP 429".to_string(),
            status_code: Some(429),
        }
        .with_model_context("Failed to summarize image");
        match err {
            PipelineError::ModelProcessing {
                message,
                status_code,
            } => {
                assert_eq!(message, "Failed to summarize image: HTTP 429");
                assert_eq!(status_code, Some(429));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_model_context_converts_other_kinds() {
        let err = PipelineError::InvalidInput("bad".into()).with_model_context("ctx");
        assert_eq!(err.kind(), ErrorKind::ModelProcessing);
        assert!(err.to_string().contains("Invalid input: bad"));
    }

    #[test]
    fn test_pipeline_error_converts_to_top_level() {
        let err: LumenError = PipelineError::InvalidInput("x".into()).into();
        assert!(matches!(err, LumenError::Pipeline(_)));
    }
}
