//! Asynchronous collaborators.
//!
//! Image loading and image-processing services (background removal,
//! generation) are the only operations that suspend. Their results are
//! applied to the document as one atomic mutation by the engine; the traits
//! here only describe the request/response shape.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CanvasResult;
use crate::object::{ImageContent, ObjectId};

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ImageSource {
    /// A local file.
    File(PathBuf),
    /// A remote URL.
    Url(String),
}

/// A decoded image ready to place on the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedImage {
    /// Pixel source: a `data:` URI or a URL the renderer can resolve.
    pub src: String,
    /// Decoded width in pixels.
    pub natural_width: u32,
    /// Decoded height in pixels.
    pub natural_height: u32,
}

impl LoadedImage {
    /// The image payload for a scene object.
    #[must_use]
    pub fn into_content(self) -> ImageContent {
        ImageContent {
            pixel_source: self.src,
            natural_width: self.natural_width,
            natural_height: self.natural_height,
        }
    }
}

/// A finished image-service call, waiting to be applied to its target.
///
/// Produced without holding the engine, so other commands (including
/// deleting the target) may run while the service is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCompletion {
    /// Object the result replaces.
    pub target: ObjectId,
    /// The replacement pixels.
    pub image: LoadedImage,
}

/// Call `service` on behalf of `target`.
///
/// # Errors
///
/// Returns the service's error.
pub async fn request_image_service(
    service: &dyn ImageService,
    target: ObjectId,
    bytes: Vec<u8>,
) -> CanvasResult<ServiceCompletion> {
    let image = service.process(bytes).await?;
    Ok(ServiceCompletion { target, image })
}

/// Resolves a file or URL into a decoded image.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Load and decode the image.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or decoded. The caller
    /// adds nothing in that case.
    async fn resolve(&self, source: &ImageSource) -> CanvasResult<LoadedImage>;
}

/// Transforms raster bytes into a replacement image.
#[async_trait]
pub trait ImageService: Send + Sync {
    /// Process the encoded image bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the service fails. The target object is left
    /// untouched.
    async fn process(&self, bytes: Vec<u8>) -> CanvasResult<LoadedImage>;
}
