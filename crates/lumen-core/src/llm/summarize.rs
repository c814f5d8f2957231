//! Summarization stage: image in, categorical bullet-point summary out.

use std::sync::Arc;
use std::time::Instant;

use super::cache::ModelClientCache;
use super::prompts::IMAGE_SUMMARY_PROMPT;
use super::provider::{ChatMessage, ContentPart};
use super::{CHAT_ROLE, DETERMINISTIC_TEMPERATURE};
use crate::error::PipelineError;
use crate::retry::RetryPolicy;
use crate::types::{EncodedImage, Summary};

/// Image reference accepted by [`Summarizer::summarize`].
#[derive(Debug, Clone, Copy)]
pub enum ImageSource<'a> {
    /// Remote URL or data URI
    Url(&'a str),
    /// Encoded image; its `image_url` is used
    Encoded(&'a EncodedImage),
}

impl<'a> ImageSource<'a> {
    /// The usable URL, if any.
    pub fn url(&self) -> Option<&'a str> {
        let url = match self {
            ImageSource::Url(url) => url,
            ImageSource::Encoded(image) => image.image_url.as_str(),
        };
        let url = url.trim();
        (!url.is_empty()).then_some(url)
    }
}

impl<'a> From<&'a str> for ImageSource<'a> {
    fn from(url: &'a str) -> Self {
        ImageSource::Url(url)
    }
}

impl<'a> From<&'a String> for ImageSource<'a> {
    fn from(url: &'a String) -> Self {
        ImageSource::Url(url.as_str())
    }
}

impl<'a> From<&'a EncodedImage> for ImageSource<'a> {
    fn from(image: &'a EncodedImage) -> Self {
        ImageSource::Encoded(image)
    }
}

/// Asks the chat model for a structured description of an image.
pub struct Summarizer {
    clients: Arc<ModelClientCache>,
    policy: RetryPolicy,
}

impl Summarizer {
    pub fn new(clients: Arc<ModelClientCache>, policy: RetryPolicy) -> Self {
        Self { clients, policy }
    }

    /// Summarize the image at `source`.
    ///
    /// A missing URL fails immediately with `InvalidInput`. Everything else
    /// (client construction, transport, empty reply) is retried under the
    /// stage policy and surfaces as `ModelProcessing`.
    pub async fn summarize<'a>(
        &self,
        source: impl Into<ImageSource<'a>>,
    ) -> Result<Summary, PipelineError> {
        let source: ImageSource<'a> = source.into();
        let url = source
            .url()
            .ok_or_else(|| PipelineError::InvalidInput("Invalid image URL format".to_string()))?;

        let start = Instant::now();
        let summary = self
            .policy
            .run("summarize image", move || self.request_summary(url))
            .await?;
        tracing::debug!("Execution time for summarize: {:?}", start.elapsed());
        Ok(summary)
    }

    async fn request_summary(&self, url: &str) -> Result<Summary, PipelineError> {
        self.try_summary(url)
            .await
            .map_err(|e| e.with_model_context("Failed to summarize image"))
    }

    async fn try_summary(&self, url: &str) -> Result<Summary, PipelineError> {
        let client = self
            .clients
            .get_client(CHAT_ROLE, DETERMINISTIC_TEMPERATURE)?;

        let messages = [ChatMessage::user(vec![
            ContentPart::text(IMAGE_SUMMARY_PROMPT),
            ContentPart::image_url(url),
        ])];
        let response = client.invoke(&messages).await?;
        tracing::trace!(
            "Summary from {} ({}ms, {:?} tokens)",
            response.model,
            response.latency_ms,
            response.tokens_used
        );

        Summary::new(response.content)
            .ok_or_else(|| PipelineError::model("Model returned an empty summary"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::MockChatClient;
    use crate::llm::provider::ModelClientHandle;
    use crate::types::{ImageMetadata, ProcessType};
    use std::path::PathBuf;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1), 2.0, Duration::from_millis(2))
    }

    fn summarizer(mock: MockChatClient) -> Summarizer {
        Summarizer::new(Arc::new(mock.into_cache()), fast_policy())
    }

    fn encoded(url: &str) -> EncodedImage {
        EncodedImage {
            content: "AAAA".to_string(),
            image_url: url.to_string(),
            metadata: ImageMetadata {
                source: PathBuf::from("a.png"),
                file_name: "a.png".to_string(),
                process_type: ProcessType::Base64,
                mime_type: "image/png".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_summarize_url() {
        let mock = MockChatClient::fixed("- Medium: photograph\n- Subject: bicycle");
        let requests = mock.requests_handle();
        let summary = summarizer(mock)
            .summarize("data:image/png;base64,AAAA")
            .await
            .unwrap();

        assert_eq!(summary.as_str(), "- Medium: photograph\n- Subject: bicycle");
        let recorded = requests.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(
            recorded[0][0].content,
            vec![
                ContentPart::text(IMAGE_SUMMARY_PROMPT),
                ContentPart::image_url("data:image/png;base64,AAAA"),
            ]
        );
    }

    #[tokio::test]
    async fn test_summarize_encoded_image_uses_its_url() {
        let mock = MockChatClient::fixed("A cat.");
        let requests = mock.requests_handle();
        let image = encoded("data:image/png;base64,AAAA");
        summarizer(mock).summarize(&image).await.unwrap();

        let recorded = requests.lock().unwrap();
        assert_eq!(
            recorded[0][0].content[1],
            ContentPart::image_url("data:image/png;base64,AAAA")
        );
    }

    #[tokio::test]
    async fn test_missing_url_is_invalid_input_and_not_sent() {
        let mock = MockChatClient::fixed("unused");
        let calls = mock.call_count_handle();
        let stage = summarizer(mock);

        let err = stage.summarize("   ").await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));

        let err = stage.summarize(&encoded("")).await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transient_failure_retried() {
        let mock = MockChatClient::new(|idx| {
            if idx == 0 {
                Err(PipelineError::model("connection reset"))
            } else {
                Ok("Recovered summary.".to_string())
            }
        });
        let calls = mock.call_count_handle();
        let summary = summarizer(mock).summarize("https://x/y.png").await.unwrap();

        assert_eq!(summary.as_str(), "Recovered summary.");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_exhaustion_surfaces_model_error() {
        let mock = MockChatClient::failing("HTTP 503: overloaded", Some(503));
        let calls = mock.call_count_handle();
        let err = summarizer(mock).summarize("https://x/y.png").await.unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match err {
            PipelineError::ModelProcessing {
                message,
                status_code,
            } => {
                assert!(message.starts_with("Failed to summarize image"), "Got: {message}");
                assert!(message.contains("overloaded"));
                assert_eq!(status_code, Some(503));
            }
            other => panic!("Expected ModelProcessing, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_reply_is_model_error() {
        let err = summarizer(MockChatClient::fixed("  "))
            .summarize("https://x/y.png")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("empty summary"));
    }

    #[tokio::test]
    async fn test_client_construction_failure() {
        let cache = ModelClientCache::with_factory(
            |_role: &str, _temperature: f32| -> Result<ModelClientHandle, PipelineError> {
                Err(PipelineError::model("Failed to initialize chat model"))
            },
        );
        let stage = Summarizer::new(Arc::new(cache), fast_policy());
        let err = stage.summarize("https://x/y.png").await.unwrap_err();
        assert!(matches!(err, PipelineError::ModelProcessing { .. }));
        assert!(err.to_string().contains("Failed to initialize chat model"));
    }
}
