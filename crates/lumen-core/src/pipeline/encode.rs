//! Image loading and base64 encoding.
//!
//! Reads the validated file once per attempt and produces an
//! [`EncodedImage`] whose `image_url` is a `data:<mime>;base64,<payload>` URI
//! suitable for OpenAI-style vision APIs.

use base64::Engine;
use std::time::Instant;

use crate::error::PipelineError;
use crate::retry::RetryPolicy;
use crate::types::{EncodedImage, ImageAsset, ImageMetadata};

/// Loads image bytes under a retry policy and encodes them.
pub struct ImageEncoder {
    policy: RetryPolicy,
}

impl ImageEncoder {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Read and encode `asset` without blocking the runtime.
    ///
    /// I/O failures are retried; once attempts run out the last failure is
    /// returned as [`PipelineError::ImageProcessing`].
    pub async fn encode(&self, asset: &ImageAsset) -> Result<EncodedImage, PipelineError> {
        let start = Instant::now();
        let bytes = self
            .policy
            .run("encode image", || async move {
                tokio::fs::read(&asset.path)
                    .await
                    .map_err(|e| read_error(asset, e))
            })
            .await?;

        let encoded = encode_bytes(asset, &bytes);
        tracing::debug!(
            "Encoded {:?} ({} bytes, {}) in {:?}",
            asset.path,
            bytes.len(),
            asset.mime_type,
            start.elapsed()
        );
        Ok(encoded)
    }

    /// Blocking variant of [`ImageEncoder::encode`]; sleeps the calling thread between retries.
    pub fn encode_blocking(&self, asset: &ImageAsset) -> Result<EncodedImage, PipelineError> {
        let bytes = self.policy.run_blocking("encode image", || {
            std::fs::read(&asset.path).map_err(|e| read_error(asset, e))
        })?;
        Ok(encode_bytes(asset, &bytes))
    }
}

impl Default for ImageEncoder {
    fn default() -> Self {
        Self::new(RetryPolicy::encode())
    }
}

fn read_error(asset: &ImageAsset, e: std::io::Error) -> PipelineError {
    PipelineError::ImageProcessing {
        path: asset.path.clone(),
        message: format!("Failed to encode image: {e}"),
    }
}

/// Encode raw bytes for `asset`.
pub fn encode_bytes(asset: &ImageAsset, bytes: &[u8]) -> EncodedImage {
    let content = base64::engine::general_purpose::STANDARD.encode(bytes);
    let image_url = data_url(&asset.mime_type, &content);
    EncodedImage {
        content,
        image_url,
        metadata: ImageMetadata {
            source: asset.path.clone(),
            file_name: asset.file_name(),
            process_type: asset.process_type,
            mime_type: asset.mime_type.clone(),
        },
    }
}

/// Build a data URI from a MIME type and base64 payload.
pub fn data_url(mime_type: &str, base64_payload: &str) -> String {
    format!("data:{mime_type};base64,{base64_payload}")
}
