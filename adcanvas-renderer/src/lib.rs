//! # AdCanvas Renderer
//!
//! Turns an `adcanvas-core` document into pixels and files.
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │      Scene (document coordinates)           │
//! ├─────────────────────────────────────────────┤
//! │      SVG intermediate (viewBox × m)         │
//! ├─────────────────────────────────────────────┤
//! │      usvg parse ─► resvg ─► tiny-skia       │
//! ├─────────────┬─────────────┬─────────────────┤
//! │ PNG         │ JPEG        │ PDF             │
//! └─────────────┴─────────────┴─────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;
pub mod image;
pub mod preset;
pub mod svg;

pub use error::{RenderError, RenderResult};
pub use export::{ExportConfig, ExportFormat, ExportedImage, RasterImage, SceneExporter};
pub use self::image::{FileImageProvider, ImageFormat};
pub use preset::{PresetRegistry, SizePreset};
pub use svg::{document_svg, Viewport};
