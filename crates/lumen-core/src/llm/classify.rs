//! Classification stage: summary in, typed safety verdict out.

use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;

use super::cache::ModelClientCache;
use super::parse::parse_json;
use super::prompts::classification_prompt;
use super::provider::ChatMessage;
use super::{CHAT_ROLE, DETERMINISTIC_TEMPERATURE};
use crate::error::PipelineError;
use crate::types::{Classification, ClassificationVerdict};

/// The JSON shape the model is asked to produce.
#[derive(Debug, Deserialize)]
struct ModelVerdict {
    classification: Classification,
    explanation: String,
}

/// Labels an image summary with one of the five safety classes.
pub struct Classifier {
    clients: Arc<ModelClientCache>,
}

impl Classifier {
    pub fn new(clients: Arc<ModelClientCache>) -> Self {
        Self { clients }
    }

    /// Classify `summary`.
    ///
    /// Output that is not a JSON object with a known `classification` label
    /// and an `explanation` is a `ModelProcessing` error, never a guess.
    pub async fn classify(&self, summary: &str) -> Result<ClassificationVerdict, PipelineError> {
        if summary.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "Image summary is empty".to_string(),
            ));
        }
        tracing::debug!("Classifying image content: {summary}");

        let start = Instant::now();
        let verdict = self
            .try_classify(summary)
            .await
            .map_err(|e| e.with_model_context("Failed to classify image"))?;
        tracing::debug!("Execution time for classify: {:?}", start.elapsed());
        Ok(verdict)
    }

    async fn try_classify(&self, summary: &str) -> Result<ClassificationVerdict, PipelineError> {
        let client = self
            .clients
            .get_client(CHAT_ROLE, DETERMINISTIC_TEMPERATURE)?;

        let messages = [ChatMessage::user_text(classification_prompt(summary))];
        let response = client.invoke(&messages).await?;

        let parsed: ModelVerdict =
            parse_json(&response.content).map_err(|e| PipelineError::model(e.to_string()))?;

        Ok(ClassificationVerdict {
            classification: parsed.classification,
            explanation: parsed.explanation,
            image_summary: summary.to_string(),
        })
    }
}
