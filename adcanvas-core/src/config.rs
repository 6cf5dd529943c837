//! Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CanvasResult;
use crate::history::DEFAULT_HISTORY_CAPACITY;

/// Configuration for a [`crate::CanvasEngine`].
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Width of a new document.
    pub default_width: u32,
    /// Height of a new document.
    pub default_height: u32,
    /// Background of a new document.
    pub background_color: String,
    /// Maximum number of undo entries (default: 50).
    pub history_capacity: usize,
    /// Grid spacing for snapping (default: 20).
    pub grid_size: f64,
    /// Whether interactive moves snap to the grid.
    pub grid_snap: bool,
    /// Offset applied to duplicates along both axes (default: 10).
    pub duplicate_offset: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_width: 800,
            default_height: 600,
            background_color: "#ffffff".to_string(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            grid_size: 20.0,
            grid_snap: false,
            duplicate_offset: 10.0,
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON, filling omitted keys with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> CanvasResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json(r#"{"gridSize": 8, "gridSnap": true}"#)
            .expect("parse");
        assert!((config.grid_size - 8.0).abs() < f64::EPSILON);
        assert!(config.grid_snap);
        assert_eq!(config.history_capacity, 50);
        assert_eq!(config.default_width, 800);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"defaultWidth": 1080, "defaultHeight": 1920}}"#).expect("write");
        let config = EngineConfig::from_file(file.path()).expect("load");
        assert_eq!((config.default_width, config.default_height), (1080, 1920));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = EngineConfig::from_file("/nonexistent/adcanvas.json");
        assert!(matches!(result, Err(crate::CanvasError::Io(_))));
    }
}
