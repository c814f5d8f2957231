//! The `lumen classify` command for classifying a single image.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use lumen_core::{ClassificationVerdict, Config, ImagePipeline, ProcessType};

/// Arguments for the `classify` command.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Image file to classify
    #[arg(required = true)]
    pub image: PathBuf,

    /// Image type (jpg, jpeg, png, gif, webp); inferred from the extension when omitted
    #[arg(long)]
    pub image_type: Option<String>,

    /// How the image is prepared for the model
    #[arg(long, default_value = "base64")]
    pub process_type: String,

    /// Print the verdict on one line instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

/// Execute the classify command.
pub async fn execute(args: ClassifyArgs, config: &Config) -> anyhow::Result<()> {
    let process_type: ProcessType = args.process_type.parse()?;
    let pipeline = ImagePipeline::from_config(config);

    let limit = Duration::from_millis(config.limits.pipeline_timeout_ms);
    let verdict = tokio::time::timeout(
        limit,
        pipeline.process(&args.image, process_type, args.image_type.as_deref()),
    )
    .await
    .map_err(|_| anyhow::anyhow!("Classification of {:?} timed out after {:?}", args.image, limit))??;

    println!("{}", render_verdict(&verdict, args.compact)?);
    Ok(())
}

fn render_verdict(verdict: &ClassificationVerdict, compact: bool) -> anyhow::Result<String> {
    let json = if compact {
        serde_json::to_string(verdict)?
    } else {
        serde_json::to_string_pretty(verdict)?
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{Classification, PipelineError};

    fn sample_verdict() -> ClassificationVerdict {
        ClassificationVerdict {
            classification: Classification::Unclear,
            explanation: "Too dark to tell.".to_string(),
            image_summary: "- Lighting: very low".to_string(),
        }
    }

    fn args(image: PathBuf, process_type: &str) -> ClassifyArgs {
        ClassifyArgs {
            image,
            image_type: None,
            process_type: process_type.to_string(),
            compact: false,
        }
    }

    #[test]
    fn test_render_compact() {
        let json = render_verdict(&sample_verdict(), true).unwrap();
        assert_eq!(
            json,
            r#"{"classification":"Unclear","explanation":"Too dark to tell.","image_summary":"- Lighting: very low"}"#
        );
    }

    #[test]
    fn test_render_pretty_is_multiline() {
        let json = render_verdict(&sample_verdict(), false).unwrap();
        assert!(json.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["classification"], "Unclear");
    }

    #[tokio::test]
    async fn test_unknown_process_type_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        std::fs::write(&path, b"png").unwrap();

        let err = execute(args(path, "ocr"), &Config::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_image_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.jpg");

        let err = execute(args(path, "base64"), &Config::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::NotFound(_))
        ));
    }
}
