//! Generation request rules: styles, upload limits, prompt validation, and
//! history paging bounds.
//!
//! The same checks run on the client (before any network traffic) and on the
//! server (before anything is stored), so both sides reject identical input.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Upload limits
// ---------------------------------------------------------------------------

/// Largest accepted upload, in bytes (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// MIME types accepted for the source image. `image/jpg` is a common
/// non-standard alias sent by some browsers.
pub const ACCEPTED_IMAGE_MIME_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png"];

/// Message body returned with HTTP 503 when the model is overloaded. Clients
/// key their automatic retry on this exact string.
pub const OVERLOAD_SENTINEL: &str = "MODEL_OVERLOADED";

// ---------------------------------------------------------------------------
// History limits
// ---------------------------------------------------------------------------

/// Number of history entries returned when no limit is requested.
pub const DEFAULT_HISTORY_LIMIT: i64 = 5;
/// Smallest accepted history page.
pub const MIN_HISTORY_LIMIT: i64 = 1;
/// Largest accepted history page.
pub const MAX_HISTORY_LIMIT: i64 = 50;

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

/// Rendering style applied to a generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Style {
    #[default]
    #[serde(rename = "realistic")]
    Realistic,
    #[serde(rename = "anime")]
    Anime,
    #[serde(rename = "oil-painting")]
    OilPainting,
    #[serde(rename = "watercolor")]
    Watercolor,
    #[serde(rename = "digital-art")]
    DigitalArt,
    #[serde(rename = "3d-render")]
    Render3d,
}

impl Style {
    /// Every style, in the order they are offered to users.
    pub const ALL: [Style; 6] = [
        Style::Realistic,
        Style::Anime,
        Style::OilPainting,
        Style::Watercolor,
        Style::DigitalArt,
        Style::Render3d,
    ];

    /// Wire/storage name of the style.
    pub fn as_str(self) -> &'static str {
        match self {
            Style::Realistic => "realistic",
            Style::Anime => "anime",
            Style::OilPainting => "oil-painting",
            Style::Watercolor => "watercolor",
            Style::DigitalArt => "digital-art",
            Style::Render3d => "3d-render",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Style::Realistic => "Realistic",
            Style::Anime => "Anime",
            Style::OilPainting => "Oil Painting",
            Style::Watercolor => "Watercolor",
            Style::DigitalArt => "Digital Art",
            Style::Render3d => "3D Render",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Style {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation("Style is required".into()));
        }
        Style::ALL
            .into_iter()
            .find(|style| style.as_str() == trimmed)
            .ok_or_else(|| {
                let known: Vec<&str> = Style::ALL.iter().map(|s| s.as_str()).collect();
                CoreError::Validation(format!(
                    "Unknown style '{trimmed}'. Must be one of: {}",
                    known.join(", ")
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// Reject empty or whitespace-only prompts.
pub fn validate_prompt(prompt: &str) -> Result<(), CoreError> {
    if prompt.trim().is_empty() {
        return Err(CoreError::Validation("Prompt is required".into()));
    }
    Ok(())
}

/// Check an uploaded image's declared MIME type and size.
///
/// The type check runs first so an oversized text file reports the more
/// useful "invalid type" message.
pub fn validate_image_upload(mime_type: &str, size_bytes: usize) -> Result<(), CoreError> {
    if !is_accepted_mime(mime_type) {
        return Err(CoreError::Validation(
            "Invalid file type. Only JPEG and PNG are allowed.".into(),
        ));
    }
    if size_bytes > MAX_UPLOAD_BYTES {
        return Err(CoreError::Validation(format!(
            "File size exceeds 10MB limit ({size_bytes} bytes)"
        )));
    }
    Ok(())
}

/// Whether the MIME type is one of [`ACCEPTED_IMAGE_MIME_TYPES`]
/// (case-insensitive, parameters such as `; charset=` ignored).
pub fn is_accepted_mime(mime_type: &str) -> bool {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    ACCEPTED_IMAGE_MIME_TYPES.contains(&essence.as_str())
}

/// File extension used when storing an upload of the given MIME type.
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    if mime_type.trim().eq_ignore_ascii_case("image/png") {
        "png"
    } else {
        "jpg"
    }
}

/// Validate a requested history page size.
///
/// `None` yields [`DEFAULT_HISTORY_LIMIT`]; anything outside
/// `MIN_HISTORY_LIMIT..=MAX_HISTORY_LIMIT` is rejected.
pub fn validate_history_limit(limit: Option<i64>) -> Result<i64, CoreError> {
    match limit {
        None => Ok(DEFAULT_HISTORY_LIMIT),
        Some(n) if (MIN_HISTORY_LIMIT..=MAX_HISTORY_LIMIT).contains(&n) => Ok(n),
        Some(_) => Err(CoreError::Validation(format!(
            "Limit must be between {MIN_HISTORY_LIMIT} and {MAX_HISTORY_LIMIT}"
        ))),
    }
}

/// Clamp a configured history size into the accepted range.
pub fn clamp_history_limit(limit: i64) -> i64 {
    limit.clamp(MIN_HISTORY_LIMIT, MAX_HISTORY_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_round_trips_through_wire_name() {
        for style in Style::ALL {
            assert_eq!(style.as_str().parse::<Style>().unwrap(), style);
        }
        let json = serde_json::to_string(&Style::Render3d).unwrap();
        assert_eq!(json, "\"3d-render\"");
    }

    #[test]
    fn unknown_style_is_rejected() {
        let err = "cubism".parse::<Style>().unwrap_err();
        assert!(err.to_string().contains("Unknown style 'cubism'"));
        assert!("  ".parse::<Style>().is_err());
    }

    #[test]
    fn blank_prompt_is_rejected() {
        assert!(validate_prompt("").is_err());
        assert!(validate_prompt("   \n").is_err());
        assert!(validate_prompt("a sunset").is_ok());
    }

    #[test]
    fn upload_accepts_jpeg_and_png_at_limit() {
        assert!(validate_image_upload("image/jpeg", MAX_UPLOAD_BYTES).is_ok());
        assert!(validate_image_upload("image/png", 1).is_ok());
        assert!(validate_image_upload("IMAGE/JPG", 1).is_ok());
    }

    #[test]
    fn upload_rejects_oversized_file() {
        let err = validate_image_upload("image/jpeg", 11 * 1024 * 1024).unwrap_err();
        assert!(err.to_string().contains("exceeds 10MB"));
    }

    #[test]
    fn upload_rejects_other_types() {
        let err = validate_image_upload("text/plain", 4).unwrap_err();
        assert!(err.to_string().contains("Invalid file type"));
        assert!(validate_image_upload("image/gif", 4).is_err());
    }

    #[test]
    fn history_limit_bounds() {
        assert_eq!(validate_history_limit(None).unwrap(), DEFAULT_HISTORY_LIMIT);
        assert_eq!(validate_history_limit(Some(1)).unwrap(), 1);
        assert_eq!(validate_history_limit(Some(50)).unwrap(), 50);
        assert!(validate_history_limit(Some(0)).is_err());
        assert!(validate_history_limit(Some(51)).is_err());
        assert!(validate_history_limit(Some(-3)).is_err());
    }

    #[test]
    fn history_limit_clamps() {
        assert_eq!(clamp_history_limit(0), 1);
        assert_eq!(clamp_history_limit(5), 5);
        assert_eq!(clamp_history_limit(500), 50);
    }

    #[test]
    fn extension_follows_mime() {
        assert_eq!(extension_for_mime("image/png"), "png");
        assert_eq!(extension_for_mime("image/jpeg"), "jpg");
    }
}
