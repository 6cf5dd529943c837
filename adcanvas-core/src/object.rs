//! Scene objects - the building blocks of a document.
//!
//! Every object shares one [`Transform`] plus visibility, lock, clip and
//! effect state; the kind-specific payload lives in [`ObjectKind`], a closed
//! sum type so that every operation matches exhaustively over kinds.

use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clip::ClipGeometry;
use crate::filter::{Filter, Shadow, Stroke};

/// Average advance of a glyph in ems, used for text bounds without shaping.
const AVERAGE_GLYPH_WIDTH_EM: f64 = 0.6;

/// Unique identifier for a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Create a new unique object ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Horizontal anchor of an object's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginX {
    /// `x` is the left edge of the local box.
    #[default]
    Left,
    /// `x` is the horizontal centre.
    Center,
    /// `x` is the right edge.
    Right,
}

impl OriginX {
    fn factor(self) -> f64 {
        match self {
            Self::Left => 0.0,
            Self::Center => 0.5,
            Self::Right => 1.0,
        }
    }
}

/// Vertical anchor of an object's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginY {
    /// `y` is the top edge of the local box.
    #[default]
    Top,
    /// `y` is the vertical centre.
    Center,
    /// `y` is the bottom edge.
    Bottom,
}

impl OriginY {
    fn factor(self) -> f64 {
        match self {
            Self::Top => 0.0,
            Self::Center => 0.5,
            Self::Bottom => 1.0,
        }
    }
}

/// Placement of an object in its parent's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    /// X position of the origin point.
    pub x: f64,
    /// Y position of the origin point.
    pub y: f64,
    /// Horizontal scale factor.
    pub scale_x: f64,
    /// Vertical scale factor.
    pub scale_y: f64,
    /// Clockwise rotation in degrees about the origin point.
    pub angle: f64,
    /// Horizontal anchor.
    #[serde(default)]
    pub origin_x: OriginX,
    /// Vertical anchor.
    #[serde(default)]
    pub origin_y: OriginY,
    /// Mirror horizontally about the object's centre.
    #[serde(default)]
    pub flip_x: bool,
    /// Mirror vertically about the object's centre.
    #[serde(default)]
    pub flip_y: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            origin_x: OriginX::Left,
            origin_y: OriginY::Top,
            flip_x: false,
            flip_y: false,
        }
    }
}

impl Transform {
    /// A transform placing the origin at `(x, y)` with unit scale.
    #[must_use]
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    /// Map an object's local box into parent space.
    ///
    /// Order: flip about the local centre, shift the origin point to zero,
    /// scale, rotate, then translate to `(x, y)`.
    #[must_use]
    pub fn to_affine(&self, local: Rect) -> Affine {
        let origin = Point::new(
            local.x0 + local.width() * self.origin_x.factor(),
            local.y0 + local.height() * self.origin_y.factor(),
        );
        let center = local.center();
        let flip = Affine::translate((center.x, center.y))
            * Affine::scale_non_uniform(
                if self.flip_x { -1.0 } else { 1.0 },
                if self.flip_y { -1.0 } else { 1.0 },
            )
            * Affine::translate((-center.x, -center.y));

        Affine::translate((self.x, self.y))
            * Affine::rotate(self.angle.to_radians())
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
            * Affine::translate((-origin.x, -origin.y))
            * flip
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Left aligned.
    #[default]
    Left,
    /// Centred.
    Center,
    /// Right aligned.
    Right,
}

/// Text payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    /// Text content; `\n` separates lines.
    pub text: String,
    /// Font family name.
    pub font_family: String,
    /// Font size in document pixels.
    pub font_size: f64,
    /// CSS font weight (`normal`, `bold`, `700`, ...).
    pub font_weight: String,
    /// Fill colour.
    pub fill: String,
    /// Extra spacing between glyphs in document pixels.
    #[serde(default)]
    pub letter_spacing: f64,
    /// Line height as a multiple of the font size.
    pub line_height: f64,
    /// Underline decoration.
    #[serde(default)]
    pub underline: bool,
    /// Italic style.
    #[serde(default)]
    pub italic: bool,
    /// Horizontal alignment of lines.
    #[serde(default)]
    pub text_align: TextAlign,
}

impl Default for TextContent {
    fn default() -> Self {
        Self {
            text: "Your text here".to_string(),
            font_family: "Arial".to_string(),
            font_size: 40.0,
            font_weight: "normal".to_string(),
            fill: "#000000".to_string(),
            letter_spacing: 0.0,
            line_height: 1.16,
            underline: false,
            italic: false,
            text_align: TextAlign::Left,
        }
    }
}

impl TextContent {
    /// Create a text payload with default styling.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Estimated width and height of the text block.
    ///
    /// There is no shaping engine in the core, so widths use an average
    /// glyph advance. Good enough for layout and alignment.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn measure(&self) -> (f64, f64) {
        let lines: Vec<&str> = self.text.split('\n').collect();
        let longest = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0) as f64;
        let width = longest * self.font_size * AVERAGE_GLYPH_WIDTH_EM
            + (longest - 1.0).max(0.0) * self.letter_spacing;
        let height = lines.len() as f64 * self.font_size * self.line_height;
        (width, height)
    }
}

/// Rectangle payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectShape {
    /// Width in local units.
    pub width: f64,
    /// Height in local units.
    pub height: f64,
    /// Fill colour.
    pub fill: String,
    /// Corner radius.
    #[serde(default)]
    pub corner_radius: f64,
}

impl Default for RectShape {
    fn default() -> Self {
        Self {
            width: 200.0,
            height: 150.0,
            fill: "#3b82f6".to_string(),
            corner_radius: 0.0,
        }
    }
}

/// Ellipse payload; the local box spans `2·rx × 2·ry`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EllipseShape {
    /// Horizontal radius.
    pub rx: f64,
    /// Vertical radius.
    pub ry: f64,
    /// Fill colour.
    pub fill: String,
}

impl Default for EllipseShape {
    fn default() -> Self {
        Self {
            rx: 75.0,
            ry: 75.0,
            fill: "#10b981".to_string(),
        }
    }
}

/// Polygon payload; points are in local units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonShape {
    /// Vertices in drawing order.
    pub points: Vec<Point>,
    /// Fill colour.
    pub fill: String,
}

impl Default for PolygonShape {
    fn default() -> Self {
        Self {
            points: vec![
                Point::new(75.0, 0.0),
                Point::new(150.0, 130.0),
                Point::new(0.0, 130.0),
            ],
            fill: "#f59e0b".to_string(),
        }
    }
}

/// Line payload; colour and width come from the object's stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineShape {
    /// Start x.
    pub x1: f64,
    /// Start y.
    pub y1: f64,
    /// End x.
    pub x2: f64,
    /// End y.
    pub y2: f64,
}

impl Default for LineShape {
    fn default() -> Self {
        Self {
            x1: 0.0,
            y1: 0.0,
            x2: 200.0,
            y2: 0.0,
        }
    }
}

/// Raster image payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageContent {
    /// Pixel source: a `data:` URI or an external URL.
    pub pixel_source: String,
    /// Decoded width in pixels.
    pub natural_width: u32,
    /// Decoded height in pixels.
    pub natural_height: u32,
}

/// Group payload. Child transforms are relative to the group's local space.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupContent {
    /// Children in back-to-front order.
    pub children: Vec<SceneObject>,
}

/// The kind-specific payload of a scene object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ObjectKind {
    /// A text block.
    Text(TextContent),
    /// A rectangle.
    Rect(RectShape),
    /// An ellipse.
    Ellipse(EllipseShape),
    /// A closed polygon.
    Polygon(PolygonShape),
    /// A straight line.
    Line(LineShape),
    /// A raster image.
    Image(ImageContent),
    /// A container for other objects.
    Group(GroupContent),
}

impl ObjectKind {
    /// Lowercase name of the kind, as used in snapshots.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Rect(_) => "rect",
            Self::Ellipse(_) => "ellipse",
            Self::Polygon(_) => "polygon",
            Self::Line(_) => "line",
            Self::Image(_) => "image",
            Self::Group(_) => "group",
        }
    }

    /// Whether this is a geometric shape (rect, ellipse, polygon, line).
    #[must_use]
    pub fn is_shape(&self) -> bool {
        matches!(
            self,
            Self::Rect(_) | Self::Ellipse(_) | Self::Polygon(_) | Self::Line(_)
        )
    }
}

/// A scene object with shared state and a kind payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneObject {
    /// Unique identifier.
    pub id: ObjectId,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Placement in the parent space.
    pub transform: Transform,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Whether the object is rendered.
    pub visible: bool,
    /// Locked objects reject interactive move/scale/rotate.
    pub locked: bool,
    /// Render-time visibility mask.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip: Option<ClipGeometry>,
    /// Drop shadow or glow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
    /// Outline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
    /// Image filters, applied in order. Always empty for non-image kinds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
    /// Kind payload, flattened next to the shared fields.
    #[serde(flatten)]
    pub kind: ObjectKind,
}

impl SceneObject {
    /// Create a new object of the given kind at the origin.
    #[must_use]
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            id: ObjectId::new(),
            name: None,
            transform: Transform::default(),
            opacity: 1.0,
            visible: true,
            locked: false,
            clip: None,
            shadow: None,
            stroke: None,
            filters: Vec::new(),
            kind,
        }
    }

    /// Set the transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the position, keeping the rest of the transform.
    #[must_use]
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.transform.x = x;
        self.transform.y = y;
        self
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the stroke.
    #[must_use]
    pub fn with_stroke(mut self, stroke: Stroke) -> Self {
        self.stroke = Some(stroke);
        self
    }

    /// Whether the object is an image.
    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self.kind, ObjectKind::Image(_))
    }

    /// Name shown in the layer list: the explicit name or the kind.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.kind.name().to_string())
    }

    /// The unscaled box of the object's content in its own space.
    #[must_use]
    pub fn local_bounds(&self) -> Rect {
        match &self.kind {
            ObjectKind::Text(text) => {
                let (w, h) = text.measure();
                Rect::new(0.0, 0.0, w, h)
            }
            ObjectKind::Rect(rect) => Rect::new(0.0, 0.0, rect.width, rect.height),
            ObjectKind::Ellipse(ellipse) => {
                Rect::new(0.0, 0.0, ellipse.rx * 2.0, ellipse.ry * 2.0)
            }
            ObjectKind::Polygon(polygon) => points_bounds(&polygon.points),
            ObjectKind::Line(line) => Rect::from_points(
                Point::new(line.x1, line.y1),
                Point::new(line.x2, line.y2),
            ),
            ObjectKind::Image(image) => Rect::new(
                0.0,
                0.0,
                f64::from(image.natural_width),
                f64::from(image.natural_height),
            ),
            ObjectKind::Group(group) => group
                .children
                .iter()
                .map(SceneObject::bounds)
                .reduce(|acc, r| acc.union(r))
                .unwrap_or(Rect::ZERO),
        }
    }

    /// Affine map from local space into the parent space.
    #[must_use]
    pub fn affine(&self) -> Affine {
        self.transform.to_affine(self.local_bounds())
    }

    /// Axis-aligned bounds in the parent space.
    ///
    /// For groups this is the union of the children's bounds after the group
    /// transform is applied.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        transform_rect_bbox(self.affine(), self.local_bounds())
    }

    /// Width and height as rendered, ignoring rotation.
    #[must_use]
    pub fn rendered_size(&self) -> (f64, f64) {
        let local = self.local_bounds();
        (
            local.width() * self.transform.scale_x.abs(),
            local.height() * self.transform.scale_y.abs(),
        )
    }

    /// Centre of the object in the parent space.
    #[must_use]
    pub fn center(&self) -> Point {
        self.affine() * self.local_bounds().center()
    }

    /// Visit this object and all descendants depth-first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a SceneObject)) {
        visit(self);
        if let ObjectKind::Group(group) = &self.kind {
            for child in &group.children {
                child.walk(visit);
            }
        }
    }

    /// Give this object and every descendant a fresh ID.
    pub fn regenerate_ids(&mut self) {
        self.id = ObjectId::new();
        if let ObjectKind::Group(group) = &mut self.kind {
            for child in &mut group.children {
                child.regenerate_ids();
            }
        }
    }
}

/// Bounding box of a point set; `Rect::ZERO` when empty.
fn points_bounds(points: &[Point]) -> Rect {
    let mut iter = points.iter();
    let Some(first) = iter.next() else {
        return Rect::ZERO;
    };
    iter.fold(Rect::from_points(*first, *first), |acc, p| {
        acc.union_pt(*p)
    })
}

/// Axis-aligned bounds of a rectangle after an affine map.
#[must_use]
pub fn transform_rect_bbox(affine: Affine, rect: Rect) -> Rect {
    let corners = [
        affine * Point::new(rect.x0, rect.y0),
        affine * Point::new(rect.x1, rect.y0),
        affine * Point::new(rect.x1, rect.y1),
        affine * Point::new(rect.x0, rect.y1),
    ];
    points_bounds(&corners)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_rect_bounds_with_scale() {
        let rect = SceneObject::new(ObjectKind::Rect(RectShape {
            width: 100.0,
            height: 50.0,
            ..RectShape::default()
        }))
        .with_transform(Transform {
            x: 10.0,
            y: 20.0,
            scale_x: 2.0,
            ..Transform::default()
        });

        let b = rect.bounds();
        assert!(close(b.x0, 10.0) && close(b.y0, 20.0));
        assert!(close(b.width(), 200.0) && close(b.height(), 50.0));
    }

    #[test]
    fn test_center_origin() {
        let rect = SceneObject::new(ObjectKind::Rect(RectShape {
            width: 100.0,
            height: 100.0,
            ..RectShape::default()
        }))
        .with_transform(Transform {
            x: 50.0,
            y: 50.0,
            origin_x: OriginX::Center,
            origin_y: OriginY::Center,
            ..Transform::default()
        });

        let b = rect.bounds();
        assert!(close(b.x0, 0.0) && close(b.y0, 0.0));
        assert!(close(rect.center().x, 50.0));
    }

    #[test]
    fn test_rotation_grows_bounds() {
        let rect = SceneObject::new(ObjectKind::Rect(RectShape {
            width: 100.0,
            height: 100.0,
            ..RectShape::default()
        }))
        .with_transform(Transform {
            angle: 45.0,
            ..Transform::default()
        });

        let b = rect.bounds();
        assert!(close(b.width(), 100.0 * 2f64.sqrt()));
    }

    #[test]
    fn test_flip_keeps_bounds() {
        let mut rect = SceneObject::new(ObjectKind::Rect(RectShape::default()))
            .with_position(30.0, 40.0);
        let before = rect.bounds();
        rect.transform.flip_x = true;
        rect.transform.flip_y = true;
        let after = rect.bounds();
        assert!(close(before.x0, after.x0) && close(before.y1, after.y1));
    }

    #[test]
    fn test_group_bounds_union_children() {
        let a = SceneObject::new(ObjectKind::Rect(RectShape {
            width: 10.0,
            height: 10.0,
            ..RectShape::default()
        }));
        let b = SceneObject::new(ObjectKind::Rect(RectShape {
            width: 10.0,
            height: 10.0,
            ..RectShape::default()
        }))
        .with_position(30.0, 20.0);
        let group = SceneObject::new(ObjectKind::Group(GroupContent {
            children: vec![a, b],
        }))
        .with_transform(Transform {
            x: 100.0,
            y: 100.0,
            scale_x: 2.0,
            scale_y: 2.0,
            ..Transform::default()
        });

        let bounds = group.bounds();
        assert!(close(bounds.x0, 100.0) && close(bounds.y0, 100.0));
        assert!(close(bounds.width(), 80.0) && close(bounds.height(), 60.0));
    }

    #[test]
    fn test_text_measure_multiline() {
        let text = TextContent {
            text: "ab\nabcd".to_string(),
            font_size: 10.0,
            line_height: 1.0,
            ..TextContent::default()
        };
        let (w, h) = text.measure();
        assert!(close(w, 24.0));
        assert!(close(h, 20.0));
    }

    #[test]
    fn test_regenerate_ids_recurses() {
        let child = SceneObject::new(ObjectKind::Rect(RectShape::default()));
        let child_id = child.id;
        let mut group = SceneObject::new(ObjectKind::Group(GroupContent {
            children: vec![child],
        }));
        let group_id = group.id;
        group.regenerate_ids();

        assert_ne!(group.id, group_id);
        let ObjectKind::Group(content) = &group.kind else {
            panic!("expected group");
        };
        assert_ne!(content.children[0].id, child_id);
    }

    #[test]
    fn test_kind_tag_serialization() {
        let rect = SceneObject::new(ObjectKind::Rect(RectShape::default()));
        let json = serde_json::to_value(&rect).expect("serialize");
        assert_eq!(json["kind"], "rect");
        assert_eq!(json["transform"]["scaleX"], 1.0);

        let back: SceneObject = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, rect);
    }
}
