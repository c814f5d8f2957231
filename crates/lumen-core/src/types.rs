//! Core data types flowing through the Lumen pipeline.
//!
//! An [`ImageAsset`] is validated input, an [`EncodedImage`] is what the
//! vision model sees, a [`Summary`] is what it says back, and a
//! [`ClassificationVerdict`] is the pipeline's final answer.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::PipelineError;

/// How an image is turned into model input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProcessType {
    /// Inline base64 data URI
    #[default]
    Base64,
}

impl ProcessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessType::Base64 => "base64",
        }
    }
}

impl std::fmt::Display for ProcessType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessType {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base64" => Ok(ProcessType::Base64),
            other => Err(PipelineError::InvalidInput(format!(
                "Unsupported process type: {other}"
            ))),
        }
    }
}

/// A validated image on disk, with its resolved MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    /// Path to the source file
    pub path: PathBuf,

    /// Declared (from a hint) or inferred MIME type, e.g. "image/png"
    pub mime_type: String,

    /// Processing mode tag
    pub process_type: ProcessType,
}

impl ImageAsset {
    /// Just the filename portion of the path.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string()
    }
}

/// Descriptive metadata carried alongside an encoded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Source path
    pub source: PathBuf,

    /// Filename portion of the source
    pub file_name: String,

    /// Processing mode tag
    pub process_type: ProcessType,

    /// MIME type used in the data URI
    pub mime_type: String,
}

/// Base64 payload plus the data URI a vision model consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage {
    /// Standard base64 of the file bytes
    pub content: String,

    /// `data:<mime>;base64,<content>`
    pub image_url: String,

    pub metadata: ImageMetadata,
}

/// Free-text image summary produced by the vision model. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Summary(String);

impl Summary {
    /// Wrap model output, rejecting empty or whitespace-only text.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content-safety label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Classification {
    Safe,
    Offensive,
    Nudity,
    Harmful,
    Unclear,
}

impl Classification {
    pub const ALL: [Classification; 5] = [
        Classification::Safe,
        Classification::Offensive,
        Classification::Nudity,
        Classification::Harmful,
        Classification::Unclear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Safe => "Safe",
            Classification::Offensive => "Offensive",
            Classification::Nudity => "Nudity",
            Classification::Harmful => "Harmful",
            Classification::Unclear => "Unclear",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Classification {
    type Err = String;

    /// Case-insensitive; models are inconsistent about "SAFE" vs "Safe".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown classification label {wanted:?}"))
    }
}

impl TryFrom<String> for Classification {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The pipeline's final output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationVerdict {
    pub classification: Classification,

    /// Model's reasoning for the label
    pub explanation: String,

    /// The summary the label was derived from
    pub image_summary: String,
}
