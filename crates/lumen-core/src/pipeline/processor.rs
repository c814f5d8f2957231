//! Pipeline orchestration - wires together all processing stages.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::llm::{Classifier, ModelClientCache, ProviderFactory, Summarizer};
use crate::retry::RetryPolicy;
use crate::types::{ClassificationVerdict, ProcessType};

use super::encode::ImageEncoder;
use super::state::{PipelineState, StateTracker};
use super::validate::Validator;

/// Outcome of one pipeline run together with its terminal state.
#[derive(Debug)]
pub struct PipelineRun {
    pub state: PipelineState,
    pub result: PipelineResult<ClassificationVerdict>,
}

/// Runs validate -> encode -> summarize -> classify for one image.
pub struct ImagePipeline {
    validator: Validator,
    encoder: ImageEncoder,
    summarizer: Summarizer,
    classifier: Classifier,
}

impl ImagePipeline {
    /// Create a pipeline sharing `clients` between its model stages.
    pub fn new(config: &Config, clients: Arc<ModelClientCache>) -> Self {
        Self {
            validator: Validator::new(&config.processing),
            encoder: ImageEncoder::new(RetryPolicy::from(&config.retry.encode)),
            summarizer: Summarizer::new(
                clients.clone(),
                RetryPolicy::from(&config.retry.summarize),
            ),
            classifier: Classifier::new(clients),
        }
    }

    /// Create a pipeline backed by the configured LLM service.
    pub fn from_config(config: &Config) -> Self {
        let factory = ProviderFactory::from_config(
            &config.llm,
            Duration::from_millis(config.limits.request_timeout_ms),
        );
        tracing::debug!("Using LLM service: {}", factory.provider().name());
        let clients = ModelClientCache::new(Arc::new(factory), &config.cache);
        Self::new(config, Arc::new(clients))
    }

    /// Classify the image at `path`.
    ///
    /// Returns the full verdict or the first stage error, unchanged.
    pub async fn process(
        &self,
        path: &Path,
        process_type: ProcessType,
        image_type_hint: Option<&str>,
    ) -> PipelineResult<ClassificationVerdict> {
        self.run(path, process_type, image_type_hint).await.result
    }

    /// Like [`ImagePipeline::process`], also reporting the terminal state.
    pub async fn run(
        &self,
        path: &Path,
        process_type: ProcessType,
        image_type_hint: Option<&str>,
    ) -> PipelineRun {
        let start = Instant::now();
        tracing::debug!("Processing: {:?}", path);

        let mut tracker = StateTracker::new();
        let result = self
            .run_stages(&mut tracker, path, process_type, image_type_hint)
            .await;

        match &result {
            Ok(verdict) => {
                tracker.advance(PipelineState::Done);
                tracing::info!(
                    "Classified {:?} as {} in {:?}",
                    path,
                    verdict.classification,
                    start.elapsed()
                );
            }
            Err(e) => {
                tracker.advance(PipelineState::Failed(e.kind()));
                tracing::debug!("Pipeline failed for {:?}: {}", path, e);
            }
        }

        PipelineRun {
            state: tracker.state(),
            result,
        }
    }

    async fn run_stages(
        &self,
        tracker: &mut StateTracker,
        path: &Path,
        process_type: ProcessType,
        image_type_hint: Option<&str>,
    ) -> Result<ClassificationVerdict, PipelineError> {
        // Validate
        let stage_start = Instant::now();
        let asset = self.validator.validate(path, process_type, image_type_hint)?;
        tracing::trace!("  Validate: {:?}", stage_start.elapsed());

        // Encode
        tracker.advance(PipelineState::Encoding);
        let stage_start = Instant::now();
        let encoded = self.encoder.encode(&asset).await?;
        tracing::trace!("  Encode: {:?}", stage_start.elapsed());

        // Summarize
        tracker.advance(PipelineState::Summarizing);
        let stage_start = Instant::now();
        let summary = self.summarizer.summarize(&encoded).await?;
        tracing::trace!("  Summarize: {:?}", stage_start.elapsed());

        // Classify
        tracker.advance(PipelineState::Classifying);
        let stage_start = Instant::now();
        let verdict = self.classifier.classify(summary.as_str()).await?;
        tracing::trace!("  Classify: {:?}", stage_start.elapsed());

        Ok(verdict)
    }
}
