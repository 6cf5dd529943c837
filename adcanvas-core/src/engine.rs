//! The canvas engine: one document, its history and its observers.
//!
//! Every command runs synchronously against the [`Scene`]. A command that
//! changes the document commits exactly one history snapshot and emits
//! exactly one [`SceneChange`]; a command that changes nothing does
//! neither. Interactive drags commit once, on release.

use std::path::Path;

use kurbo::Rect;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clip::{ClipGeometry, ClipShape};
use crate::config::EngineConfig;
use crate::error::CanvasResult;
use crate::event::{ChangeBus, SceneChange};
use crate::filter::{self, Filter, Shadow, Stroke};
use crate::history::History;
use crate::layout::{self, Alignment, Axis};
use crate::object::{ImageContent, ObjectId, ObjectKind, SceneObject, Transform};
use crate::persist;
use crate::property::Property;
use crate::scene::{Layer, Scene};
use crate::schema::DocumentSnapshot;
use crate::service::{
    self, ImageProvider, ImageService, ImageSource, LoadedImage, ServiceCompletion,
};

/// Result of a user-initiated command that can be refused for geometric
/// reasons, with a message suitable for a toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    /// Whether the command did what was asked.
    pub success: bool,
    /// Why it did not, when it did not.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CommandOutcome {
    /// A successful outcome.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// A refused outcome.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    id: ObjectId,
    start: Transform,
}

/// Engine instance owning one document.
#[derive(Debug)]
pub struct CanvasEngine {
    config: EngineConfig,
    scene: Scene,
    history: History,
    bus: ChangeBus,
    drag: Option<DragState>,
}

impl CanvasEngine {
    /// Create an engine with an empty document sized from the config.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let scene = Scene::new(
            config.default_width,
            config.default_height,
            config.background_color.clone(),
        );
        let history = History::seeded(config.history_capacity, scene.to_snapshot());
        Self {
            config,
            scene,
            history,
            bus: ChangeBus::new(),
            drag: None,
        }
    }

    /// Create an engine for a document of the given size.
    #[must_use]
    pub fn with_size(width: u32, height: u32) -> Self {
        Self::new(EngineConfig {
            default_width: width,
            default_height: height,
            ..EngineConfig::default()
        })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read-only view of the document.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Objects in render order.
    #[must_use]
    pub fn objects(&self) -> &[SceneObject] {
        self.scene.objects()
    }

    /// Look up a top-level object.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.scene.get(id)
    }

    /// Layer rows, front-most first.
    #[must_use]
    pub fn layers(&self) -> Vec<Layer> {
        self.scene.layers()
    }

    /// Document bounds.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.scene.bounds()
    }

    /// Front-most visible object under a point.
    #[must_use]
    pub fn object_at(&self, x: f64, y: f64) -> Option<ObjectId> {
        self.scene.object_at(x, y)
    }

    /// The undo history.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Register a change observer.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&SceneChange) + Send + 'static,
    {
        self.bus.subscribe(observer);
    }

    fn commit(&mut self, change: SceneChange) {
        let snapshot = self.committed_snapshot();
        self.history.commit(snapshot);
        self.bus.emit(&change);
    }

    /// Snapshot for the history. An open drag is recorded at its start
    /// position; its move lands only when the drag ends.
    fn committed_snapshot(&self) -> DocumentSnapshot {
        let mut snapshot = self.scene.to_snapshot();
        if let Some(drag) = self.drag {
            if let Some(object) = snapshot.objects.iter_mut().find(|o| o.id == drag.id) {
                object.transform = drag.start;
            }
        }
        snapshot
    }

    fn commit_if(&mut self, changed: bool, change: SceneChange) -> bool {
        if changed {
            self.commit(change);
        }
        changed
    }

    fn changed(id: ObjectId) -> SceneChange {
        SceneChange::ObjectsChanged { ids: vec![id] }
    }

    // ---- adding and removing ----

    /// Add an object as the front-most and return its ID.
    pub fn add_object(&mut self, object: SceneObject) -> ObjectId {
        let id = self.scene.add(object);
        debug!(%id, "Added object");
        self.commit(SceneChange::ObjectAdded { id });
        id
    }

    /// Add a default object of the given kind, centred on the document.
    pub fn add_kind(&mut self, kind: ObjectKind) -> ObjectId {
        let object = SceneObject::new(kind);
        let bounds = object.bounds();
        let doc = self.scene.bounds();
        let transform = layout::place_at(
            &object,
            (doc.width() - bounds.width()) / 2.0,
            (doc.height() - bounds.height()) / 2.0,
        );
        self.add_object(object.with_transform(transform))
    }

    /// Delete an object. No-op if absent.
    pub fn delete(&mut self, id: ObjectId) -> bool {
        let removed = self.scene.remove(id).is_some();
        if removed {
            debug!(%id, "Deleted object");
            if self.drag.is_some_and(|d| d.id == id) {
                self.drag = None;
            }
        }
        self.commit_if(removed, SceneChange::ObjectRemoved { id })
    }

    /// Remove every object.
    pub fn clear(&mut self) -> bool {
        self.drag = None;
        let changed = self.scene.clear();
        self.commit_if(changed, SceneChange::DocumentReplaced)
    }

    /// Duplicate an object above itself, offset by the configured amount.
    pub fn duplicate(&mut self, id: ObjectId) -> Option<ObjectId> {
        let offset = self.config.duplicate_offset;
        let copy = self.scene.duplicate(id, offset, offset)?;
        debug!(source = %id, %copy, "Duplicated object");
        self.commit(SceneChange::ObjectAdded { id: copy });
        Some(copy)
    }

    // ---- properties ----

    /// Apply a typed property edit.
    pub fn set_property(&mut self, id: ObjectId, property: Property) -> bool {
        let changed = self.scene.set_property(id, property);
        self.commit_if(changed, Self::changed(id))
    }

    /// Set the document background.
    pub fn set_background(&mut self, color: impl Into<String>) -> bool {
        let changed = self.scene.set_background_color(color);
        self.commit_if(changed, SceneChange::BackgroundChanged)
    }

    /// Resize the document, optionally rescaling every object.
    ///
    /// Zero sizes are rejected.
    pub fn resize_canvas(&mut self, width: u32, height: u32, rescale_objects: bool) -> bool {
        if width == 0 || height == 0 {
            warn!(width, height, "Rejected canvas resize to empty size");
            return false;
        }
        let changed = self.scene.resize(width, height, rescale_objects);
        self.commit_if(changed, SceneChange::CanvasResized { width, height })
    }

    // ---- z-order ----

    /// Move an object to the front.
    pub fn bring_to_front(&mut self, id: ObjectId) -> bool {
        let changed = self.scene.bring_to_front(id);
        self.commit_if(changed, SceneChange::Reordered)
    }

    /// Move an object to the back.
    pub fn send_to_back(&mut self, id: ObjectId) -> bool {
        let changed = self.scene.send_to_back(id);
        self.commit_if(changed, SceneChange::Reordered)
    }

    /// Move an object one step forward.
    pub fn bring_forward(&mut self, id: ObjectId) -> bool {
        let changed = self.scene.bring_forward(id);
        self.commit_if(changed, SceneChange::Reordered)
    }

    /// Move an object one step back.
    pub fn send_backward(&mut self, id: ObjectId) -> bool {
        let changed = self.scene.send_backward(id);
        self.commit_if(changed, SceneChange::Reordered)
    }

    /// Move an object to a render-order index (clamped).
    pub fn move_to(&mut self, id: ObjectId, index: usize) -> bool {
        let changed = self.scene.move_to(id, index);
        self.commit_if(changed, SceneChange::Reordered)
    }

    // ---- grouping ----

    /// Group two or more top-level objects.
    pub fn group(&mut self, ids: &[ObjectId]) -> Option<ObjectId> {
        let group = self.scene.group(ids)?;
        debug!(%group, members = ids.len(), "Grouped objects");
        self.commit(SceneChange::DocumentReplaced);
        Some(group)
    }

    /// Dissolve a group, returning the released children.
    pub fn ungroup(&mut self, id: ObjectId) -> Vec<ObjectId> {
        let children = self.scene.ungroup(id);
        if !children.is_empty() {
            debug!(group = %id, children = children.len(), "Ungrouped");
            self.commit(SceneChange::DocumentReplaced);
        }
        children
    }

    // ---- layout ----

    /// Align an object against the document.
    pub fn align(&mut self, id: ObjectId, alignment: Alignment) -> bool {
        let doc = self.scene.bounds();
        let Some(object) = self.scene.get(id) else {
            return false;
        };
        let transform = layout::align(object, alignment, doc);
        let changed = self.scene.update(id, |o| o.transform = transform);
        self.commit_if(changed, Self::changed(id))
    }

    /// Spread three or more objects evenly along an axis.
    pub fn distribute(&mut self, ids: &[ObjectId], axis: Axis) -> CommandOutcome {
        let objects: Vec<&SceneObject> = ids.iter().filter_map(|id| self.scene.get(*id)).collect();
        if objects.len() < 3 {
            warn!(count = objects.len(), "Distribute needs at least three objects");
            return CommandOutcome::failed("Select at least three objects to distribute");
        }
        let moves = layout::distribute(&objects, axis);
        self.apply_moves(moves);
        CommandOutcome::ok()
    }

    /// Mirror an object on one axis.
    pub fn flip(&mut self, id: ObjectId, axis: Axis) -> bool {
        let changed = self
            .scene
            .update(id, |o| o.transform = layout::flip(o.transform, axis));
        self.commit_if(changed, Self::changed(id))
    }

    /// Arrange the document into the standard ad layout.
    pub fn auto_arrange(&mut self) -> bool {
        let moves = layout::auto_arrange(self.scene.objects(), self.scene.bounds());
        self.apply_moves(moves)
    }

    fn apply_moves(&mut self, moves: Vec<(ObjectId, Transform)>) -> bool {
        let mut ids = Vec::new();
        for (id, transform) in moves {
            if self.scene.update(id, |o| o.transform = transform) {
                ids.push(id);
            }
        }
        let changed = !ids.is_empty();
        self.commit_if(changed, SceneChange::ObjectsChanged { ids })
    }

    // ---- clip ----

    /// Attach a clip mask of `shape` sized to the object.
    pub fn apply_clip(&mut self, id: ObjectId, shape: ClipShape) -> CommandOutcome {
        let Some(object) = self.scene.get(id) else {
            return CommandOutcome::failed("Object not found");
        };
        let Some(clip) = ClipGeometry::for_object(object, shape) else {
            warn!(%id, ?shape, "Object has no area to clip");
            return CommandOutcome::failed("Object has no visible area to clip");
        };
        let changed = self.scene.update(id, |o| o.clip = Some(clip));
        self.commit_if(changed, Self::changed(id));
        CommandOutcome::ok()
    }

    /// Remove an object's clip mask.
    pub fn clear_clip(&mut self, id: ObjectId) -> bool {
        let changed = self.scene.update(id, |o| o.clip = None);
        self.commit_if(changed, Self::changed(id))
    }

    // ---- filters and effects ----

    /// Apply a filter choice to an image. `None` clears the list.
    /// Non-image objects are left alone.
    pub fn apply_filter(&mut self, id: ObjectId, choice: Option<Filter>) -> bool {
        if !self.scene.get(id).is_some_and(SceneObject::is_image) {
            return false;
        }
        let changed = self.scene.update(id, |o| {
            filter::apply_filter(&mut o.filters, choice);
        });
        self.commit_if(changed, Self::changed(id))
    }

    /// Clear every filter on an object.
    pub fn remove_all_filters(&mut self, id: ObjectId) -> bool {
        let changed = self.scene.update(id, |o| o.filters.clear());
        self.commit_if(changed, Self::changed(id))
    }

    /// Set or remove the shadow.
    pub fn set_shadow(&mut self, id: ObjectId, shadow: Option<Shadow>) -> bool {
        self.set_property(id, Property::Shadow(shadow))
    }

    /// Apply a glow: a shadow without offset.
    pub fn apply_glow(&mut self, id: ObjectId, color: impl Into<String>, blur: f64) -> bool {
        self.set_shadow(id, Some(Shadow::glow(color, blur)))
    }

    /// Set or remove the stroke.
    pub fn set_stroke(&mut self, id: ObjectId, stroke: Option<Stroke>) -> bool {
        self.set_property(id, Property::Stroke(stroke))
    }

    /// Apply an outline: a stroke preset.
    pub fn apply_outline(&mut self, id: ObjectId, color: impl Into<String>, width: f64) -> bool {
        self.set_stroke(id, Some(Stroke::new(color, width)))
    }

    // ---- history ----

    /// Step back one committed change.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.materialize(snapshot);
        true
    }

    /// Re-apply the next undone change.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.materialize(snapshot);
        true
    }

    /// Whether undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn materialize(&mut self, snapshot: DocumentSnapshot) {
        self.drag = None;
        self.scene = Scene::from_snapshot(snapshot);
        self.bus.emit(&SceneChange::DocumentReplaced);
    }

    // ---- persistence ----

    /// Serialize the whole document.
    #[must_use]
    pub fn serialize(&self) -> DocumentSnapshot {
        self.scene.to_snapshot()
    }

    /// Replace the whole document. The load itself can be undone.
    pub fn deserialize(&mut self, snapshot: DocumentSnapshot) {
        self.drag = None;
        self.scene = Scene::from_snapshot(snapshot);
        self.commit(SceneChange::DocumentReplaced);
    }

    /// Replace the document from snapshot JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not a valid snapshot; the document is
    /// unchanged.
    pub fn load_json(&mut self, json: &str) -> CanvasResult<()> {
        let snapshot = DocumentSnapshot::from_json(json)?;
        self.deserialize(snapshot);
        Ok(())
    }

    /// Save the document to a project file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_project(&self, path: impl AsRef<Path>) -> CanvasResult<()> {
        persist::save_to_file(&self.serialize(), path)
    }

    /// Load a project file, replacing the document.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed; the document
    /// is unchanged.
    pub fn load_project(&mut self, path: impl AsRef<Path>) -> CanvasResult<()> {
        let snapshot = persist::load_from_file(path)?;
        self.deserialize(snapshot);
        Ok(())
    }

    // ---- interaction ----

    /// Turn grid snapping on or off for interactive moves.
    pub fn set_grid_snap(&mut self, enabled: bool) {
        self.config.grid_snap = enabled;
    }

    /// Whether grid snapping is on.
    #[must_use]
    pub fn grid_snap(&self) -> bool {
        self.config.grid_snap
    }

    /// Start an interactive move. Refused for missing or locked objects.
    pub fn begin_drag(&mut self, id: ObjectId) -> bool {
        match self.scene.get(id) {
            Some(object) if !object.locked => {
                self.drag = Some(DragState {
                    id,
                    start: object.transform,
                });
                true
            }
            _ => false,
        }
    }

    /// Update an interactive move with the total offset since it began.
    ///
    /// The document changes live but nothing is committed until
    /// [`Self::end_drag`].
    pub fn drag_by(&mut self, dx: f64, dy: f64) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        let (mut x, mut y) = (drag.start.x + dx, drag.start.y + dy);
        if self.config.grid_snap {
            x = layout::snap_to_grid(x, self.config.grid_size);
            y = layout::snap_to_grid(y, self.config.grid_size);
        }
        self.scene.update(drag.id, |o| {
            o.transform.x = x;
            o.transform.y = y;
        })
    }

    /// Finish an interactive move, committing once if the object moved.
    pub fn end_drag(&mut self) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        let moved = self
            .scene
            .get(drag.id)
            .is_some_and(|o| o.transform != drag.start);
        self.commit_if(moved, Self::changed(drag.id))
    }

    /// Whether an interactive move is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Interactive scale. Refused for locked objects.
    pub fn scale_interactive(&mut self, id: ObjectId, scale_x: f64, scale_y: f64) -> bool {
        if !self.scene.get(id).is_some_and(|o| !o.locked) {
            return false;
        }
        self.set_property(id, Property::Scale { x: scale_x, y: scale_y })
    }

    /// Interactive rotate. Refused for locked objects.
    pub fn rotate_interactive(&mut self, id: ObjectId, angle: f64) -> bool {
        if !self.scene.get(id).is_some_and(|o| !o.locked) {
            return false;
        }
        self.set_property(id, Property::Angle(angle))
    }

    // ---- async collaborators ----

    /// Load an image and add it, centred and scaled down to fit.
    ///
    /// Holds the engine for the whole load. Hosts that keep editing while
    /// the provider works call [`ImageProvider::resolve`] themselves and
    /// pass the result to [`Self::add_image`].
    ///
    /// # Errors
    ///
    /// Returns the provider's error; nothing is added.
    pub async fn load_image(
        &mut self,
        provider: &dyn ImageProvider,
        source: &ImageSource,
    ) -> CanvasResult<ObjectId> {
        let loaded = provider.resolve(source).await.map_err(|e| {
            warn!(?source, error = %e, "Image load failed");
            e
        })?;
        Ok(self.add_image(loaded))
    }

    /// Add an already decoded image, centred and scaled down to fit.
    pub fn add_image(&mut self, image: LoadedImage) -> ObjectId {
        let object = SceneObject::new(ObjectKind::Image(image.into_content()));
        let local = object.local_bounds();
        let doc = self.scene.bounds();
        let mut scale = 1.0;
        if local.width() > doc.width() || local.height() > doc.height() {
            scale = (doc.width() / local.width()).min(doc.height() / local.height());
        }
        let mut object = object.with_transform(Transform {
            scale_x: scale,
            scale_y: scale,
            ..Transform::default()
        });
        let bounds = object.bounds();
        object.transform = layout::place_at(
            &object,
            (doc.width() - bounds.width()) / 2.0,
            (doc.height() - bounds.height()) / 2.0,
        );
        self.add_object(object)
    }

    /// Run an image service over an image object's encoded bytes and swap
    /// in the result.
    ///
    /// Holds the engine until the service answers. For edits to continue
    /// meanwhile, await [`service::request_image_service`] without the
    /// engine and hand its result to [`Self::complete_image_service`].
    ///
    /// Returns `Ok(false)` if the object is gone (or was never an image) by
    /// the time the result arrives.
    ///
    /// # Errors
    ///
    /// Returns the service's error; the object is untouched.
    pub async fn run_image_service(
        &mut self,
        id: ObjectId,
        service: &dyn ImageService,
        bytes: Vec<u8>,
    ) -> CanvasResult<bool> {
        let completion = service::request_image_service(service, id, bytes)
            .await
            .map_err(|e| {
                warn!(%id, error = %e, "Image service failed");
                e
            })?;
        Ok(self.complete_image_service(completion))
    }

    /// Apply a finished service call. A target deleted while the call was
    /// in flight makes this a no-op.
    pub fn complete_image_service(&mut self, completion: ServiceCompletion) -> bool {
        self.apply_service_result(completion.target, completion.image)
    }

    /// Replace an image's pixels with a service result, keeping its
    /// rendered size. Last write wins; a deleted target is a no-op.
    pub fn apply_service_result(&mut self, id: ObjectId, image: LoadedImage) -> bool {
        let changed = self.scene.update(id, |o| {
            let ObjectKind::Image(current) = &mut o.kind else {
                return;
            };
            if image.natural_width > 0 && current.natural_width > 0 {
                o.transform.scale_x *=
                    f64::from(current.natural_width) / f64::from(image.natural_width);
            }
            if image.natural_height > 0 && current.natural_height > 0 {
                o.transform.scale_y *=
                    f64::from(current.natural_height) / f64::from(image.natural_height);
            }
            *current = ImageContent {
                pixel_source: image.src,
                natural_width: image.natural_width,
                natural_height: image.natural_height,
            };
        });
        if !changed {
            debug!(%id, "Discarded service result for missing object");
        }
        self.commit_if(changed, Self::changed(id))
    }
}

impl Default for CanvasEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
