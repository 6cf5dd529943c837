//! Alignment, distribution and arrangement.
//!
//! Everything here is a pure function from object snapshots and document
//! bounds to new transforms. The engine applies the results and commits.
//! Positions move through the object's origin: the rendered box is shifted
//! by translating `x`/`y`, so objects anchored at their centre align exactly
//! like objects anchored at their top-left.

use kurbo::Rect;
use serde::{Deserialize, Serialize};

use crate::object::{ObjectId, ObjectKind, SceneObject, Transform};

/// Fraction of the canvas given to the hero image in auto-arrange.
const AUTO_IMAGE_FRACTION: f64 = 0.4;
/// Left edge of the text column in auto-arrange, as a fraction of width.
const AUTO_TEXT_COLUMN: f64 = 0.65;
/// Top of the text column, as a fraction of height.
const AUTO_TEXT_TOP: f64 = 0.2;
/// Vertical step between stacked texts.
const AUTO_TEXT_SPACING: f64 = 80.0;
/// Inset and gap for stacked shapes.
const AUTO_SHAPE_MARGIN: f64 = 20.0;
const AUTO_SHAPE_GAP: f64 = 10.0;

/// Where to align an object within the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left edge at 0.
    Left,
    /// Horizontally centred.
    Center,
    /// Right edge at the document width.
    Right,
    /// Top edge at 0.
    Top,
    /// Vertically centred.
    Middle,
    /// Bottom edge at the document height.
    Bottom,
}

/// A layout axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Along x.
    Horizontal,
    /// Along y.
    Vertical,
}

/// Transform of `object` with its rendered box shifted by `(dx, dy)`.
#[must_use]
pub fn translated(object: &SceneObject, dx: f64, dy: f64) -> Transform {
    let mut transform = object.transform;
    transform.x += dx;
    transform.y += dy;
    transform
}

/// Transform placing the top-left of `object`'s rendered box at `(left, top)`.
#[must_use]
pub fn place_at(object: &SceneObject, left: f64, top: f64) -> Transform {
    let bounds = object.bounds();
    translated(object, left - bounds.x0, top - bounds.y0)
}

/// Align one object against the document bounds.
#[must_use]
pub fn align(object: &SceneObject, alignment: Alignment, document: Rect) -> Transform {
    let bounds = object.bounds();
    let (dx, dy) = match alignment {
        Alignment::Left => (document.x0 - bounds.x0, 0.0),
        Alignment::Center => (
            document.x0 + (document.width() - bounds.width()) / 2.0 - bounds.x0,
            0.0,
        ),
        Alignment::Right => (document.x1 - bounds.width() - bounds.x0, 0.0),
        Alignment::Top => (0.0, document.y0 - bounds.y0),
        Alignment::Middle => (
            0.0,
            document.y0 + (document.height() - bounds.height()) / 2.0 - bounds.y0,
        ),
        Alignment::Bottom => (0.0, document.y1 - bounds.height() - bounds.y0),
    };
    translated(object, dx, dy)
}

/// Spread objects evenly along an axis.
///
/// Objects are sorted by their leading edge; the first and last stay put
/// and the leading edges of the rest are spaced evenly between them. Returns
/// an empty list for fewer than three objects.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn distribute(objects: &[&SceneObject], axis: Axis) -> Vec<(ObjectId, Transform)> {
    if objects.len() < 3 {
        return Vec::new();
    }

    let edge = |o: &SceneObject| {
        let b = o.bounds();
        match axis {
            Axis::Horizontal => b.x0,
            Axis::Vertical => b.y0,
        }
    };
    let mut sorted: Vec<(&SceneObject, f64)> = objects.iter().map(|o| (*o, edge(o))).collect();
    sorted.sort_by(|a, b| a.1.total_cmp(&b.1));

    let first = sorted[0].1;
    let last = sorted[sorted.len() - 1].1;
    let step = (last - first) / (sorted.len() - 1) as f64;

    sorted
        .iter()
        .enumerate()
        .skip(1)
        .take(sorted.len() - 2)
        .map(|(i, (object, current))| {
            let delta = first + step * i as f64 - current;
            let transform = match axis {
                Axis::Horizontal => translated(object, delta, 0.0),
                Axis::Vertical => translated(object, 0.0, delta),
            };
            (object.id, transform)
        })
        .collect()
}

/// Toggle the mirror flag on one axis. Position is unchanged.
#[must_use]
pub fn flip(transform: Transform, axis: Axis) -> Transform {
    let mut flipped = transform;
    match axis {
        Axis::Horizontal => flipped.flip_x = !flipped.flip_x,
        Axis::Vertical => flipped.flip_y = !flipped.flip_y,
    }
    flipped
}

/// Round a coordinate to the nearest grid line. A non-positive grid is off.
#[must_use]
pub fn snap_to_grid(value: f64, grid_size: f64) -> f64 {
    if grid_size <= 0.0 {
        return value;
    }
    (value / grid_size).round() * grid_size
}

/// Lay out a typical ad: hero image left, text column right, shapes stacked
/// in the top-left corner.
///
/// Only the first image is placed; later images and groups keep their
/// transforms. The image is scaled uniformly to fit 40 % of the canvas
/// height (and width) and centred in the left 40 % of the canvas.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn auto_arrange(objects: &[SceneObject], document: Rect) -> Vec<(ObjectId, Transform)> {
    let width = document.width();
    let height = document.height();
    let mut result = Vec::new();

    if let Some(image) = objects.iter().find(|o| o.is_image()) {
        let local = image.local_bounds();
        if local.width() > 0.0 && local.height() > 0.0 {
            let scale = (AUTO_IMAGE_FRACTION * height / local.height())
                .min(AUTO_IMAGE_FRACTION * width / local.width());
            let mut scaled = image.clone();
            scaled.transform.scale_x = scale.copysign(image.transform.scale_x);
            scaled.transform.scale_y = scale.copysign(image.transform.scale_y);
            let bounds = scaled.bounds();
            let left = document.x0 + (width * AUTO_IMAGE_FRACTION - bounds.width()) / 2.0;
            let top = document.y0 + (height - bounds.height()) / 2.0;
            result.push((image.id, place_at(&scaled, left, top)));
        }
    }

    let texts = objects
        .iter()
        .filter(|o| matches!(o.kind, ObjectKind::Text(_)));
    for (i, text) in texts.enumerate() {
        let left = document.x0 + width * AUTO_TEXT_COLUMN;
        let top = document.y0 + height * AUTO_TEXT_TOP + AUTO_TEXT_SPACING * i as f64;
        result.push((text.id, place_at(text, left, top)));
    }

    let mut top = document.y0 + AUTO_SHAPE_MARGIN;
    for shape in objects.iter().filter(|o| o.kind.is_shape()) {
        let left = document.x0 + AUTO_SHAPE_MARGIN;
        result.push((shape.id, place_at(shape, left, top)));
        top += shape.bounds().height() + AUTO_SHAPE_GAP;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{ImageContent, OriginX, OriginY, RectShape, TextContent};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn rect(x: f64, y: f64, w: f64, h: f64) -> SceneObject {
        SceneObject::new(ObjectKind::Rect(RectShape {
            width: w,
            height: h,
            ..RectShape::default()
        }))
        .with_position(x, y)
    }

    fn apply(object: &SceneObject, transform: Transform) -> SceneObject {
        object.clone().with_transform(transform)
    }

    #[test]
    fn test_align_edges() {
        let doc = Rect::new(0.0, 0.0, 800.0, 600.0);
        let object = rect(37.0, 41.0, 100.0, 50.0);

        let left = apply(&object, align(&object, Alignment::Left, doc)).bounds();
        assert!(close(left.x0, 0.0) && close(left.y0, 41.0));

        let center = apply(&object, align(&object, Alignment::Center, doc)).bounds();
        assert!(close(center.x0, 350.0));

        let right = apply(&object, align(&object, Alignment::Right, doc)).bounds();
        assert!(close(right.x1, 800.0));

        let bottom = apply(&object, align(&object, Alignment::Bottom, doc)).bounds();
        assert!(close(bottom.y1, 600.0) && close(bottom.x0, 37.0));
    }

    #[test]
    fn test_align_through_center_origin() {
        let doc = Rect::new(0.0, 0.0, 800.0, 600.0);
        let object = rect(300.0, 300.0, 100.0, 100.0).with_transform(Transform {
            x: 300.0,
            y: 300.0,
            origin_x: OriginX::Center,
            origin_y: OriginY::Center,
            ..Transform::default()
        });
        let t = align(&object, Alignment::Left, doc);
        assert!(close(t.x, 50.0));
    }

    #[test]
    fn test_distribute_spacing() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(15.0, 0.0, 10.0, 10.0);
        let c = rect(100.0, 0.0, 10.0, 10.0);
        let moved = distribute(&[&c, &a, &b], Axis::Horizontal);

        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].0, b.id);
        assert!(close(moved[0].1.x, 50.0));
    }

    #[test]
    fn test_distribute_two_is_noop() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(50.0, 0.0, 10.0, 10.0);
        assert!(distribute(&[&a, &b], Axis::Vertical).is_empty());
    }

    #[test]
    fn test_flip_keeps_position() {
        let t = Transform::at(12.0, 34.0);
        let flipped = flip(t, Axis::Horizontal);
        assert!(flipped.flip_x && !flipped.flip_y);
        assert!(close(flipped.x, 12.0) && close(flipped.y, 34.0));
        assert!(!flip(flipped, Axis::Horizontal).flip_x);
    }

    #[test]
    fn test_snap() {
        assert!(close(snap_to_grid(29.0, 20.0), 20.0));
        assert!(close(snap_to_grid(31.0, 20.0), 40.0));
        assert!(close(snap_to_grid(-9.0, 20.0), 0.0));
        assert!(close(snap_to_grid(13.3, 0.0), 13.3));
    }

    #[test]
    fn test_auto_arrange() {
        let doc = Rect::new(0.0, 0.0, 1000.0, 500.0);
        let image = SceneObject::new(ObjectKind::Image(ImageContent {
            pixel_source: String::new(),
            natural_width: 400,
            natural_height: 400,
        }));
        let title = SceneObject::new(ObjectKind::Text(TextContent::new("Sale")));
        let subtitle = SceneObject::new(ObjectKind::Text(TextContent::new("Today")));
        let badge = rect(500.0, 500.0, 50.0, 30.0);
        let objects = vec![title.clone(), image.clone(), badge.clone(), subtitle.clone()];

        let placed = auto_arrange(&objects, doc);
        let find = |id: ObjectId| {
            let t = placed.iter().find(|(i, _)| *i == id).expect("placed").1;
            objects
                .iter()
                .find(|o| o.id == id)
                .expect("object")
                .clone()
                .with_transform(t)
        };

        // min(0.4*500/400, 0.4*1000/400) = 0.5 -> 200x200
        let img = find(image.id).bounds();
        assert!(close(img.width(), 200.0));
        assert!(close(img.center().x, 200.0));
        assert!(close(img.center().y, 250.0));

        let t1 = find(title.id).bounds();
        let t2 = find(subtitle.id).bounds();
        assert!(close(t1.x0, 650.0) && close(t1.y0, 100.0));
        assert!(close(t2.y0, 180.0));

        let shape = find(badge.id).bounds();
        assert!(close(shape.x0, 20.0) && close(shape.y0, 20.0));
    }
}
