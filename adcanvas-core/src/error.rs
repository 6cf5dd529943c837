//! Error types for canvas operations.

use thiserror::Error;

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur in canvas operations.
///
/// Routine UI misuse (unknown ids, degenerate geometry) never produces one of
/// these; such commands are no-ops. Errors are reserved for the persistence
/// boundary and for asynchronous collaborators.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Snapshot serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading or writing a project file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource loading failed.
    #[error("Failed to load resource: {0}")]
    ResourceLoad(String),

    /// An external service (background removal, generation) failed.
    #[error("External service failed: {0}")]
    Service(String),
}
