//! # AdCanvas Core
//!
//! Document model and editing engine for retail ad creatives.
//! Rendering lives in `adcanvas-renderer`; this crate never touches pixels.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               CanvasEngine                  │
//! │  commands ─► Scene ─► History + ChangeBus   │
//! ├─────────────────────────────────────────────┤
//! │  Object Model    │  Layout                  │
//! │  - Kinds         │  - Align / distribute    │
//! │  - Transforms    │  - Auto-arrange          │
//! │  - Groups        │  - Grid snap             │
//! ├─────────────────────────────────────────────┤
//! │  Clip masks      │  Filters & effects       │
//! ├─────────────────────────────────────────────┤
//! │  Snapshot schema │  Async collaborators     │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod clip;
pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod filter;
pub mod history;
pub mod layout;
pub mod object;
pub mod persist;
pub mod property;
pub mod scene;
pub mod schema;
pub mod service;

pub use clip::{ClipGeometry, ClipShape};
pub use color::parse_color;
pub use config::EngineConfig;
pub use engine::{CanvasEngine, CommandOutcome};
pub use error::{CanvasError, CanvasResult};
pub use event::{ChangeBus, SceneChange};
pub use filter::{apply_filter, Filter, FilterType, Shadow, Stroke};
pub use history::{History, DEFAULT_HISTORY_CAPACITY};
pub use layout::{Alignment, Axis};
pub use object::{
    EllipseShape, GroupContent, ImageContent, LineShape, ObjectId, ObjectKind, OriginX, OriginY,
    PolygonShape, RectShape, SceneObject, TextAlign, TextContent, Transform,
};
pub use persist::{load_from_file, save_to_file};
pub use property::Property;
pub use scene::{Layer, Scene};
pub use schema::DocumentSnapshot;
pub use service::{
    request_image_service, ImageProvider, ImageService, ImageSource, LoadedImage,
    ServiceCompletion,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
