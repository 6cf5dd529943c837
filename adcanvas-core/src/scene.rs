//! Scene graph store for one document.
//!
//! Objects live in a single ordered list: index 0 is back-most and the last
//! element is drawn on top. Every operation on an unknown ID is a silent
//! no-op, because commands from the UI can race with deletions. Mutators
//! return whether anything changed so the engine can skip empty history
//! entries.

use kurbo::{Point, Rect};
use serde::Serialize;

use crate::object::{GroupContent, ObjectId, ObjectKind, SceneObject, Transform};
use crate::property::Property;
use crate::schema::DocumentSnapshot;

/// A row in the layer panel. Derived from the object list, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    /// Object ID.
    pub id: ObjectId,
    /// Display name.
    pub name: String,
    /// Kind name.
    pub kind: &'static str,
    /// Visibility flag.
    pub visible: bool,
    /// Lock flag.
    pub locked: bool,
}

/// The document: bounds, background and ordered objects.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    width: u32,
    height: u32,
    background_color: String,
    objects: Vec<SceneObject>,
}

impl Scene {
    /// Create an empty document. Zero dimensions are raised to 1.
    #[must_use]
    pub fn new(width: u32, height: u32, background_color: impl Into<String>) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            background_color: background_color.into(),
            objects: Vec::new(),
        }
    }

    /// Document width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Document height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Document bounds as a rectangle at the origin.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Background colour.
    #[must_use]
    pub fn background_color(&self) -> &str {
        &self.background_color
    }

    /// Set the background colour. Returns whether it changed.
    pub fn set_background_color(&mut self, color: impl Into<String>) -> bool {
        let color = color.into();
        if color == self.background_color {
            return false;
        }
        self.background_color = color;
        true
    }

    /// Objects in render order, back to front.
    #[must_use]
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Number of top-level objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the document has no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Render-order index of a top-level object.
    #[must_use]
    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    /// Get a top-level object by ID.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Get a mutable reference to a top-level object by ID.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Whether any object, including group children, has this ID.
    #[must_use]
    pub fn contains_id(&self, id: ObjectId) -> bool {
        let mut found = false;
        for object in &self.objects {
            object.walk(&mut |o| found |= o.id == id);
        }
        found
    }

    /// Append an object as the front-most and return its ID.
    ///
    /// An object whose ID already exists in the document is given a fresh
    /// one, keeping IDs unique.
    pub fn add(&mut self, mut object: SceneObject) -> ObjectId {
        if self.contains_id(object.id) {
            object.regenerate_ids();
        }
        let id = object.id;
        self.objects.push(object);
        id
    }

    /// Insert an object at `index` (clamped), returning its ID.
    pub fn insert(&mut self, index: usize, mut object: SceneObject) -> ObjectId {
        if self.contains_id(object.id) {
            object.regenerate_ids();
        }
        let id = object.id;
        let index = index.min(self.objects.len());
        self.objects.insert(index, object);
        id
    }

    /// Remove an object. No-op if absent.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let index = self.index_of(id)?;
        Some(self.objects.remove(index))
    }

    /// Remove every object.
    pub fn clear(&mut self) -> bool {
        let changed = !self.objects.is_empty();
        self.objects.clear();
        changed
    }

    /// Move an object to `index` (clamped), preserving the relative order of
    /// all others. Returns whether the order changed.
    pub fn move_to(&mut self, id: ObjectId, index: usize) -> bool {
        let Some(from) = self.index_of(id) else {
            return false;
        };
        let to = index.min(self.objects.len() - 1);
        if from == to {
            return false;
        }
        let object = self.objects.remove(from);
        self.objects.insert(to, object);
        true
    }

    /// Move an object to the front (last index).
    pub fn bring_to_front(&mut self, id: ObjectId) -> bool {
        let last = self.objects.len().saturating_sub(1);
        self.move_to(id, last)
    }

    /// Move an object to the back (index 0).
    pub fn send_to_back(&mut self, id: ObjectId) -> bool {
        self.move_to(id, 0)
    }

    /// Move an object one step toward the front.
    pub fn bring_forward(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(index) => self.move_to(id, index + 1),
            None => false,
        }
    }

    /// Move an object one step toward the back.
    pub fn send_backward(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(index) if index > 0 => self.move_to(id, index - 1),
            _ => false,
        }
    }

    /// Apply a property edit. Returns whether the object changed.
    pub fn set_property(&mut self, id: ObjectId, property: Property) -> bool {
        self.get_mut(id)
            .is_some_and(|object| object.apply_property(property))
    }

    /// Mutate an object through a closure. Returns whether it changed.
    pub fn update<F>(&mut self, id: ObjectId, f: F) -> bool
    where
        F: FnOnce(&mut SceneObject),
    {
        let Some(object) = self.get_mut(id) else {
            return false;
        };
        let before = object.clone();
        f(object);
        // IDs are owned by the store.
        object.id = before.id;
        *object != before
    }

    /// Change the document size.
    ///
    /// With `rescale_objects`, every top-level object's position and scale
    /// are multiplied by the per-axis size ratio, preserving layout. Without
    /// it only the bounds change. Zero sizes are rejected.
    pub fn resize(&mut self, width: u32, height: u32, rescale_objects: bool) -> bool {
        if width == 0 || height == 0 || (width == self.width && height == self.height) {
            return false;
        }
        if rescale_objects {
            let fx = f64::from(width) / f64::from(self.width);
            let fy = f64::from(height) / f64::from(self.height);
            for object in &mut self.objects {
                let t = &mut object.transform;
                t.x *= fx;
                t.y *= fy;
                t.scale_x *= fx;
                t.scale_y *= fy;
            }
        }
        self.width = width;
        self.height = height;
        true
    }

    /// Deep-copy an object with fresh IDs, offset by `(dx, dy)` and inserted
    /// directly above the source.
    pub fn duplicate(&mut self, id: ObjectId, dx: f64, dy: f64) -> Option<ObjectId> {
        let index = self.index_of(id)?;
        let mut copy = self.objects[index].clone();
        copy.regenerate_ids();
        copy.transform.x += dx;
        copy.transform.y += dy;
        copy.name = copy.name.map(|name| format!("{name} copy"));
        Some(self.insert(index + 1, copy))
    }

    /// Combine top-level objects into a group.
    ///
    /// Needs at least two existing members. The group is placed at the
    /// top-left of the members' union bounds and takes the z-position of the
    /// front-most member; children keep their relative order and are
    /// re-expressed relative to the group.
    pub fn group(&mut self, ids: &[ObjectId]) -> Option<ObjectId> {
        let mut indices: Vec<usize> = ids.iter().filter_map(|id| self.index_of(*id)).collect();
        indices.sort_unstable();
        indices.dedup();
        if indices.len() < 2 {
            return None;
        }

        let union = indices
            .iter()
            .map(|&i| self.objects[i].bounds())
            .reduce(|acc, r| acc.union(r))?;
        let insert_at = indices[indices.len() - 1] + 1 - indices.len();

        let mut children = Vec::with_capacity(indices.len());
        for &index in indices.iter().rev() {
            children.push(self.objects.remove(index));
        }
        children.reverse();
        for child in &mut children {
            child.transform.x -= union.x0;
            child.transform.y -= union.y0;
        }

        let group = SceneObject::new(ObjectKind::Group(GroupContent { children }))
            .with_transform(Transform::at(union.x0, union.y0));
        Some(self.insert(insert_at, group))
    }

    /// Dissolve a group, placing its children where the group stood.
    ///
    /// The group's transform is baked into each child: positions map through
    /// the full group transform, scales multiply, angles add and flips
    /// toggle. Returns the children's IDs, empty if `id` is not a group.
    pub fn ungroup(&mut self, id: ObjectId) -> Vec<ObjectId> {
        let Some(index) = self.index_of(id) else {
            return Vec::new();
        };
        if !matches!(self.objects[index].kind, ObjectKind::Group(_)) {
            return Vec::new();
        }
        let group = self.objects.remove(index);
        let affine = group.affine();
        let gt = group.transform;
        let ObjectKind::Group(content) = group.kind else {
            return Vec::new();
        };

        let mut ids = Vec::with_capacity(content.children.len());
        for (offset, mut child) in content.children.into_iter().enumerate() {
            let position = affine * Point::new(child.transform.x, child.transform.y);
            let t = &mut child.transform;
            t.x = position.x;
            t.y = position.y;
            t.scale_x *= gt.scale_x;
            t.scale_y *= gt.scale_y;
            t.angle += gt.angle;
            t.flip_x ^= gt.flip_x;
            t.flip_y ^= gt.flip_y;
            child.opacity *= group.opacity;
            ids.push(child.id);
            self.objects.insert(index + offset, child);
        }
        ids
    }

    /// Front-most visible object whose bounds contain the point.
    #[must_use]
    pub fn object_at(&self, x: f64, y: f64) -> Option<ObjectId> {
        let point = Point::new(x, y);
        self.objects
            .iter()
            .rev()
            .find(|o| o.visible && o.bounds().contains(point))
            .map(|o| o.id)
    }

    /// Layer rows, front-most first.
    #[must_use]
    pub fn layers(&self) -> Vec<Layer> {
        self.objects
            .iter()
            .rev()
            .map(|o| Layer {
                id: o.id,
                name: o.display_name(),
                kind: o.kind.name(),
                visible: o.visible,
                locked: o.locked,
            })
            .collect()
    }

    /// Serialize the whole document.
    #[must_use]
    pub fn to_snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            width: self.width,
            height: self.height,
            background_color: self.background_color.clone(),
            objects: self.objects.clone(),
        }
    }

    /// Build a document from a snapshot, replacing nothing but itself.
    #[must_use]
    pub fn from_snapshot(snapshot: DocumentSnapshot) -> Self {
        Self {
            width: snapshot.width.max(1),
            height: snapshot.height.max(1),
            background_color: snapshot.background_color,
            objects: snapshot.objects,
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(800, 600, "#ffffff")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::RectShape;

    fn rect_at(x: f64, y: f64) -> SceneObject {
        SceneObject::new(ObjectKind::Rect(RectShape {
            width: 10.0,
            height: 10.0,
            ..RectShape::default()
        }))
        .with_position(x, y)
    }

    fn ids(scene: &Scene) -> Vec<ObjectId> {
        scene.objects().iter().map(|o| o.id).collect()
    }

    #[test]
    fn test_add_appends_front_most() {
        let mut scene = Scene::default();
        let a = scene.add(rect_at(0.0, 0.0));
        let b = scene.add(rect_at(0.0, 0.0));
        assert_eq!(ids(&scene), vec![a, b]);
    }

    #[test]
    fn test_add_duplicate_id_gets_fresh_id() {
        let mut scene = Scene::default();
        let object = rect_at(0.0, 0.0);
        let first = scene.add(object.clone());
        let second = scene.add(object);
        assert_ne!(first, second);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut scene = Scene::default();
        scene.add(rect_at(0.0, 0.0));
        assert!(scene.remove(ObjectId::new()).is_none());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_reorder() {
        let mut scene = Scene::default();
        let a = scene.add(rect_at(0.0, 0.0));
        let b = scene.add(rect_at(0.0, 0.0));
        let c = scene.add(rect_at(0.0, 0.0));

        assert!(scene.bring_to_front(a));
        assert_eq!(ids(&scene), vec![b, c, a]);

        assert!(scene.send_to_back(a));
        assert_eq!(ids(&scene), vec![a, b, c]);

        assert!(scene.bring_forward(a));
        assert_eq!(ids(&scene), vec![b, a, c]);

        assert!(scene.send_backward(c));
        assert_eq!(ids(&scene), vec![b, c, a]);

        assert!(!scene.send_backward(b));
        assert!(!scene.bring_forward(a));
        assert!(scene.move_to(b, 99));
        assert_eq!(ids(&scene), vec![c, a, b]);
    }

    #[test]
    fn test_bring_to_front_single_object_no_change() {
        let mut scene = Scene::default();
        let a = scene.add(rect_at(0.0, 0.0));
        assert!(!scene.bring_to_front(a));
    }

    #[test]
    fn test_resize_rescales() {
        let mut scene = Scene::new(800, 600, "#ffffff");
        let id = scene.add(rect_at(400.0, 300.0));
        assert!(scene.resize(400, 300, true));

        let t = scene.get(id).expect("object").transform;
        assert!((t.x - 200.0).abs() < 1e-9);
        assert!((t.y - 150.0).abs() < 1e-9);
        assert!((t.scale_x - 0.5).abs() < 1e-9);
        assert!((t.scale_y - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_resize_without_rescale_keeps_positions() {
        let mut scene = Scene::new(800, 600, "#ffffff");
        let id = scene.add(rect_at(700.0, 500.0));
        assert!(scene.resize(400, 300, false));
        let t = scene.get(id).expect("object").transform;
        assert!((t.x - 700.0).abs() < 1e-9);
        assert_eq!((scene.width(), scene.height()), (400, 300));
    }

    #[test]
    fn test_resize_rejects_zero() {
        let mut scene = Scene::default();
        assert!(!scene.resize(0, 300, true));
        assert_eq!(scene.width(), 800);
    }

    #[test]
    fn test_group_and_ungroup_preserve_bounds() {
        let mut scene = Scene::default();
        let back = scene.add(rect_at(0.0, 0.0));
        let a = scene.add(rect_at(100.0, 50.0));
        let b = scene.add(rect_at(140.0, 90.0));
        let front = scene.add(rect_at(0.0, 0.0));
        let a_bounds = scene.get(a).expect("a").bounds();

        let group = scene.group(&[b, a]).expect("group");
        assert_eq!(ids(&scene), vec![back, group, front]);
        let g = scene.get(group).expect("group");
        let bounds = g.bounds();
        assert!((bounds.x0 - 100.0).abs() < 1e-9 && (bounds.y0 - 50.0).abs() < 1e-9);
        assert!((bounds.width() - 50.0).abs() < 1e-9);

        let children = scene.ungroup(group);
        assert_eq!(children, vec![a, b]);
        assert_eq!(ids(&scene), vec![back, a, b, front]);
        let restored = scene.get(a).expect("a").bounds();
        assert!((restored.x0 - a_bounds.x0).abs() < 1e-9);
        assert!((restored.y0 - a_bounds.y0).abs() < 1e-9);
    }

    #[test]
    fn test_group_needs_two() {
        let mut scene = Scene::default();
        let a = scene.add(rect_at(0.0, 0.0));
        assert!(scene.group(&[a, ObjectId::new()]).is_none());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_duplicate_inserts_above() {
        let mut scene = Scene::default();
        let a = scene.add(rect_at(5.0, 5.0).with_name("Logo"));
        let b = scene.add(rect_at(0.0, 0.0));
        let copy = scene.duplicate(a, 10.0, 10.0).expect("copy");

        assert_eq!(ids(&scene), vec![a, copy, b]);
        let object = scene.get(copy).expect("copy");
        assert_eq!(object.name.as_deref(), Some("Logo copy"));
        assert!((object.transform.x - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_object_at_prefers_front() {
        let mut scene = Scene::default();
        let _back = scene.add(rect_at(0.0, 0.0));
        let front = scene.add(rect_at(5.0, 5.0));
        assert_eq!(scene.object_at(7.0, 7.0), Some(front));
        assert_eq!(scene.object_at(500.0, 500.0), None);
    }

    #[test]
    fn test_layers_reverse_order() {
        let mut scene = Scene::default();
        let a = scene.add(rect_at(0.0, 0.0));
        let b = scene.add(rect_at(0.0, 0.0).with_name("Badge"));
        let layers = scene.layers();
        assert_eq!(layers[0].id, b);
        assert_eq!(layers[0].name, "Badge");
        assert_eq!(layers[1].id, a);
        assert_eq!(layers[1].kind, "rect");
    }

    #[test]
    fn test_update_keeps_id() {
        let mut scene = Scene::default();
        let id = scene.add(rect_at(0.0, 0.0));
        assert!(scene.update(id, |o| {
            o.id = ObjectId::new();
            o.opacity = 0.5;
        }));
        assert!(scene.get(id).is_some());
    }
}
