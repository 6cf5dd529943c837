//! Canonical serialized representation of a document.
//!
//! The same shape is used for undo entries and for saved projects, so
//! whatever `deserialize` accepts for one it accepts for the other.

use serde::{Deserialize, Serialize};

use crate::{CanvasError, CanvasResult, SceneObject};

/// Full serialization of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    /// Document width in pixels.
    pub width: u32,
    /// Document height in pixels.
    pub height: u32,
    /// Background colour.
    pub background_color: String,
    /// Objects in render order (index 0 is back-most).
    pub objects: Vec<SceneObject>,
}

impl DocumentSnapshot {
    /// Serialize to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CanvasResult<String> {
        serde_json::to_string(self).map_err(CanvasError::Serialization)
    }

    /// Serialize to indented JSON for project files.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> CanvasResult<String> {
        serde_json::to_string_pretty(self).map_err(CanvasError::Serialization)
    }

    /// Parse a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or does not match the
    /// snapshot shape. Callers loading untrusted files must handle this.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        serde_json::from_str(json).map_err(CanvasError::Serialization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{ObjectKind, RectShape};

    #[test]
    fn test_field_names() {
        let snapshot = DocumentSnapshot {
            width: 800,
            height: 600,
            background_color: "#ffffff".to_string(),
            objects: vec![SceneObject::new(ObjectKind::Rect(RectShape::default()))],
        };
        let value: serde_json::Value =
            serde_json::from_str(&snapshot.to_json().expect("json")).expect("value");
        assert_eq!(value["backgroundColor"], "#ffffff");
        assert_eq!(value["objects"][0]["kind"], "rect");
    }

    #[test]
    fn test_round_trip() {
        let snapshot = DocumentSnapshot {
            width: 1080,
            height: 1080,
            background_color: "#f5f5f5".to_string(),
            objects: vec![SceneObject::new(ObjectKind::Rect(RectShape::default()))],
        };
        let json = snapshot.to_json_pretty().expect("json");
        let back = DocumentSnapshot::from_json(&json).expect("parse");
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_malformed_is_error() {
        let result = DocumentSnapshot::from_json("{\"width\": 10}");
        assert!(matches!(result, Err(CanvasError::Serialization(_))));
    }
}
