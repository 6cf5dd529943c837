//! Renderer error types.

use adcanvas_core::CanvasError;
use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering and export.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Rasterizing the scene failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// Encoding the raster into the output format failed.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Resource loading failed.
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// Reading an input file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the core engine.
    #[error(transparent)]
    Core(#[from] CanvasError),
}

impl From<RenderError> for CanvasError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Core(inner) => inner,
            RenderError::Io(inner) => CanvasError::Io(inner),
            other => CanvasError::ResourceLoad(other.to_string()),
        }
    }
}
