//! MIME type resolution for images.
//!
//! Precedence: explicit type hint, then extension-based guess, then
//! `image/jpeg`.

use std::path::Path;

/// Fallback when neither hint nor extension identifies the image type.
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Map an image type hint ("jpg", "PNG", ".webp") to its MIME type.
pub fn mime_for_hint(hint: &str) -> Option<&'static str> {
    let hint = hint.trim().trim_start_matches('.').to_ascii_lowercase();
    match hint.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Resolve the MIME type for an image at `path`.
pub fn resolve_mime_type(path: &Path, hint: Option<&str>) -> String {
    if let Some(hint) = hint {
        if let Some(mime) = mime_for_hint(hint) {
            return mime.to_string();
        }
        tracing::warn!("Unknown image type hint '{hint}', guessing from extension");
    }

    match mime_guess::from_path(path).first() {
        Some(guess) if guess.type_() == mime_guess::mime::IMAGE => guess.essence_str().to_string(),
        _ => {
            tracing::debug!(
                "Could not infer image MIME type for {:?}, defaulting to {DEFAULT_MIME_TYPE}",
                path
            );
            DEFAULT_MIME_TYPE.to_string()
        }
    }
}
