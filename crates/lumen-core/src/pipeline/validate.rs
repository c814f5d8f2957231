//! Input validation before encoding.

use std::path::Path;

use crate::config::ProcessingConfig;
use crate::error::PipelineError;
use crate::types::{ImageAsset, ProcessType};

use super::mime::resolve_mime_type;

/// Checks that an input path exists and carries a supported extension.
pub struct Validator {
    supported_formats: Vec<String>,
}

impl Validator {
    /// Create a validator accepting the configured extensions.
    pub fn new(processing: &ProcessingConfig) -> Self {
        Self {
            supported_formats: processing
                .supported_formats
                .iter()
                .map(|f| f.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Validate `path` and build the [`ImageAsset`] for it.
    ///
    /// Checks:
    /// - File exists
    /// - Lower-cased extension is in the allow-list
    ///
    /// The MIME type is resolved from `image_type_hint` or the extension.
    pub fn validate(
        &self,
        path: &Path,
        process_type: ProcessType,
        image_type_hint: Option<&str>,
    ) -> Result<ImageAsset, PipelineError> {
        if !path.exists() {
            return Err(PipelineError::NotFound(path.to_path_buf()));
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        if !self.is_supported(&extension) {
            return Err(PipelineError::UnsupportedType {
                path: path.to_path_buf(),
                extension,
            });
        }

        Ok(ImageAsset {
            path: path.to_path_buf(),
            mime_type: resolve_mime_type(path, image_type_hint),
            process_type,
        })
    }

    /// Whether a lower-case extension (no dot) is accepted.
    pub fn is_supported(&self, extension: &str) -> bool {
        !extension.is_empty() && self.supported_formats.iter().any(|f| f == extension)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(&ProcessingConfig::default())
    }
}
