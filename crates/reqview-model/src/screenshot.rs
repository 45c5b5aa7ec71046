//! Screenshots attached to requisitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ScreenshotId;

/// File name used when the caller supplies none.
pub const DEFAULT_SCREENSHOT_FILENAME: &str = "screenshot.png";

/// An image attached to a requisition.
///
/// `requisition_id` is a business identifier copied from a report row. It is
/// not a foreign key: deleting or re-uploading the report leaves screenshots
/// untouched, and a later upload containing the same requisition sees them
/// again. Screenshots are immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Screenshot {
    pub id: ScreenshotId,
    pub requisition_id: String,
    #[serde(with = "image_data")]
    pub image_data: Vec<u8>,
    pub filename: String,
    pub timestamp: DateTime<Utc>,
}

impl Screenshot {
    /// Creates a screenshot stamped with the current time.
    pub fn new(
        id: ScreenshotId,
        requisition_id: impl Into<String>,
        image_data: Vec<u8>,
        filename: &str,
    ) -> Self {
        Self {
            id,
            requisition_id: requisition_id.into(),
            image_data,
            filename: normalize_filename(filename),
            timestamp: Utc::now(),
        }
    }
}

/// Trimmed file name, or [`DEFAULT_SCREENSHOT_FILENAME`] when blank.
pub fn normalize_filename(filename: &str) -> String {
    let trimmed = filename.trim();
    if trimmed.is_empty() {
        DEFAULT_SCREENSHOT_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Sorts screenshots oldest first.
pub fn sort_by_timestamp(shots: &mut [Screenshot]) {
    shots.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
}

/// Base64 encoding for image bytes.
///
/// Also accepts `data:<mime>;base64,<payload>` URLs, the form images were
/// captured in by browser clients.
pub mod image_data {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        decode(&text).map_err(serde::de::Error::custom)
    }

    /// Decodes plain base64 or a base64 data URL.
    pub fn decode(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
        let payload = match text.split_once(";base64,") {
            Some((prefix, payload)) if prefix.starts_with("data:") => payload,
            _ => text,
        };
        STANDARD.decode(payload.trim())
    }

    pub fn encode(bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }
}
