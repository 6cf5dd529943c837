//! Project files on disk.

use std::path::Path;

use tracing::info;

use crate::error::CanvasResult;
use crate::schema::DocumentSnapshot;

/// Write a snapshot as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn save_to_file(snapshot: &DocumentSnapshot, path: impl AsRef<Path>) -> CanvasResult<()> {
    let path = path.as_ref();
    let json = snapshot.to_json_pretty()?;
    std::fs::write(path, json)?;
    info!(
        path = %path.display(),
        objects = snapshot.objects.len(),
        "Saved project"
    );
    Ok(())
}

/// Read a snapshot from a JSON project file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid snapshot.
pub fn load_from_file(path: impl AsRef<Path>) -> CanvasResult<DocumentSnapshot> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let snapshot = DocumentSnapshot::from_json(&json)?;
    info!(
        path = %path.display(),
        width = snapshot.width,
        height = snapshot.height,
        objects = snapshot.objects.len(),
        "Loaded project"
    );
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{ObjectKind, SceneObject, TextContent};
    use crate::CanvasError;

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("ad.json");
        let snapshot = DocumentSnapshot {
            width: 1200,
            height: 628,
            background_color: "#112233".to_string(),
            objects: vec![SceneObject::new(ObjectKind::Text(TextContent::new("50% off")))],
        };

        save_to_file(&snapshot, &path).expect("save");
        let loaded = load_from_file(&path).expect("load");
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_garbage_file_fails() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").expect("write");
        assert!(matches!(
            load_from_file(&path),
            Err(CanvasError::Serialization(_))
        ));
    }
}
