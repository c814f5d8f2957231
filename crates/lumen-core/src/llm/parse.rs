//! Structured-output parsing for model responses.
//!
//! Models wrap JSON in prose, markdown fences, or `<think>` blocks. The
//! parser tries, in order: the whole cleaned text, a ```json fence, any
//! fence, then the first balanced `{...}` object. Whatever it finds must
//! deserialize into the requested type, or parsing fails.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Why a response could not be parsed.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("no JSON object found in response: {snippet}")]
    NoJson { snippet: String },

    #[error("JSON did not match the expected shape: {reason} (in {snippet})")]
    Shape { reason: String, snippet: String },
}

/// Parse a model response into `T`.
pub fn parse_json<T: DeserializeOwned>(response: &str) -> Result<T, ParseError> {
    let cleaned = strip_think_tags(response);
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(ParseError::EmptyResponse);
    }

    let candidate = find_json_candidate(cleaned).ok_or_else(|| ParseError::NoJson {
        snippet: truncate(cleaned, 120),
    })?;

    serde_json::from_str(candidate).map_err(|e| ParseError::Shape {
        reason: e.to_string(),
        snippet: truncate(candidate, 200),
    })
}

fn find_json_candidate(text: &str) -> Option<&str> {
    if is_json(text) {
        return Some(text);
    }
    if let Some(block) = extract_code_block(text, Some("json")) {
        return Some(block);
    }
    if let Some(block) = extract_code_block(text, None) {
        if is_json(block) {
            return Some(block);
        }
    }
    find_object(text)
}

fn is_json(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text).is_ok()
}

/// Remove `<think>...</think>` and `<thinking>...</thinking>` blocks.
///
/// An unclosed block swallows the rest of the text.
pub fn strip_think_tags(text: &str) -> String {
    let mut result = strip_tag(text, "<think>", "</think>");
    result = strip_tag(&result, "<thinking>", "</thinking>");
    result
}

fn strip_tag(text: &str, open: &str, close: &str) -> String {
    let mut result = text.to_string();
    while let Some(start) = result.find(open) {
        match result[start..].find(close) {
            Some(offset) => {
                let end = start + offset + close.len();
                result.replace_range(start..end, "");
            }
            None => {
                result.truncate(start);
                break;
            }
        }
    }
    result
}

/// Content of the first fenced block, optionally requiring a language tag.
fn extract_code_block<'a>(text: &'a str, lang: Option<&str>) -> Option<&'a str> {
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find("```") {
        let fence = search_from + offset + 3;
        let line_end = fence + text[fence..].find('\n')?;
        let tag = text[fence..line_end].trim();
        let body_start = line_end + 1;
        let body_end = body_start + text[body_start..].find("```")?;

        let matches = match lang {
            Some(wanted) => tag.eq_ignore_ascii_case(wanted),
            None => true,
        };
        if matches {
            return Some(text[body_start..body_end].trim());
        }
        search_from = body_end + 3;
    }
    None
}

/// First balanced `{...}` span, ignoring braces inside strings.
fn find_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut start = text.find('{')?;
    loop {
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        for (i, &b) in bytes.iter().enumerate().skip(start) {
            if in_string {
                match b {
                    _ if escaped => escaped = false,
                    b'\\' => escaped = true,
                    b'"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match b {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        let candidate = &text[start..=i];
                        if is_json(candidate) {
                            return Some(candidate);
                        }
                        break;
                    }
                }
                _ => {}
            }
        }
        start = start + 1 + text[start + 1..].find('{')?;
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    }
}
