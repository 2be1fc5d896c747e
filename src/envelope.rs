//! Transport envelope for shipping a rendered track between systems.
//!
//! The envelope pairs the rendered payload with the dialect name so the
//! receiving side knows how to parse it without re-running detection.

use crate::error::Result;
use base64::Engine;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptionEnvelope {
    pub id: String,
    pub format: String,
    pub content: String,
}

impl CaptionEnvelope {
    pub fn new(format: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: short_id(),
            format: format.into(),
            content: content.into(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Eight URL-safe characters derived from a fresh UUID. Short enough to
/// embed in file names, random enough for a transport-scoped identifier.
fn short_id() -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(Uuid::new_v4().as_bytes());
    encoded
        .replace('/', "_")
        .replace('+', "-")
        .chars()
        .take(8)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_assigns_short_id() {
        let envelope = CaptionEnvelope::new("SubRip", "1\n00:00:01,000 --> 00:00:02,000\nHi\n");
        assert_eq!(envelope.id.len(), 8);
        assert!(!envelope.id.contains('/'));
        assert!(!envelope.id.contains('+'));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = CaptionEnvelope::new("SubRip", "x");
        let b = CaptionEnvelope::new("SubRip", "x");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_json_round_trip() {
        let envelope = CaptionEnvelope::new("WebVTT", "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nHi\n");
        let json = envelope.to_json().unwrap();
        let back = CaptionEnvelope::from_json(&json).unwrap();
        assert_eq!(back, envelope);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(CaptionEnvelope::from_json("not json").is_err());
        assert!(CaptionEnvelope::from_json("{\"id\":\"x\"}").is_err());
    }
}
