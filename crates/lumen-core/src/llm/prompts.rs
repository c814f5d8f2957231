//! Prompt templates for the summarize and classify stages.

/// Instruction sent alongside the image to produce a categorical summary.
pub const IMAGE_SUMMARY_PROMPT: &str = "\
Please provide bullet point summaries for the image in each of the following categories:
- Medium:
- Subject:
- Scene:
- Style:
- Artistic Influence or Movement:
- Website:
- Color:
- Lighting:
- Description:
- Additional Details:

If you don't know the answer for one of the categories, leave it blank.";

const SUMMARY_PLACEHOLDER: &str = "{image_summary}";

/// Classification instructions; `{image_summary}` is replaced with the summary.
pub const IMAGE_CLASSIFICATION_TEMPLATE: &str = r#"
Analyze the provided summary of an image and decide whether it describes offensive content, nudity, or harmful elements.

**Image Summary**: {image_summary}

Classify the image into exactly one of the following categories:
- "Safe" if the summary does not indicate any of these categories.
- "Offensive" if the summary suggests offensive content.
- "Nudity" if the summary suggests the presence of nudity.
- "Harmful" if the summary suggests harmful content.
- "Unclear" if the summary is too vague to classify.

Base your classification strictly on the given summary without making assumptions beyond it.

Respond with only a JSON object with exactly these fields:
{
    "classification": "<one of Safe, Offensive, Nudity, Harmful, Unclear>",
    "explanation": "<brief explanation of the classification>"
}
"#;

/// Render the classification prompt for a summary.
pub fn classification_prompt(image_summary: &str) -> String {
    IMAGE_CLASSIFICATION_TEMPLATE.replacen(SUMMARY_PLACEHOLDER, image_summary, 1)
}
