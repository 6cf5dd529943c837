//! Clip masks.
//!
//! A clip is a path stored in the object's own local units and positioned
//! relative to the centre of its local box. Attaching one never touches the
//! transform or pixel data; it only limits what the renderer draws.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use kurbo::{Affine, BezPath, Circle, Point, Rect, Shape};
use serde::{Deserialize, Serialize};

use crate::object::SceneObject;

/// Flattening tolerance when converting curves to paths.
const PATH_TOLERANCE: f64 = 0.1;

/// Inner radius of the star as a fraction of the outer radius.
const STAR_INNER_RATIO: f64 = 0.5;

/// Shapes available as clip masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipShape {
    /// Circle of diameter `min(width, height)`.
    Circle,
    /// Upward-pointing triangle inscribed in a square.
    Triangle,
    /// Five-pointed star.
    Star,
    /// Flat-sided hexagon.
    Hexagon,
    /// Heart filling the full bounding box.
    Heart,
}

impl ClipShape {
    /// Regular shapes are sized by the smaller side of the bounding box.
    #[must_use]
    pub fn is_regular(self) -> bool {
        !matches!(self, Self::Heart)
    }

    /// Parse a shape name as used by the editor (`"circle"`, `"star"`, ...).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "circle" => Some(Self::Circle),
            "triangle" => Some(Self::Triangle),
            "star" => Some(Self::Star),
            "hexagon" => Some(Self::Hexagon),
            "heart" => Some(Self::Heart),
            _ => None,
        }
    }
}

/// A clip path attached to an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipGeometry {
    /// Which shape generated the path.
    pub shape: ClipShape,
    /// SVG path data in local units, relative to the local box centre.
    pub path_data: String,
}

impl ClipGeometry {
    /// Build a clip of `shape` sized to the object's rendered bounds.
    ///
    /// Returns `None` when the object has no visible area (zero width or
    /// height, or a degenerate scale).
    #[must_use]
    pub fn for_object(object: &SceneObject, shape: ClipShape) -> Option<Self> {
        let (width, height) = object.rendered_size();
        let scale_x = object.transform.scale_x.abs();
        let scale_y = object.transform.scale_y.abs();
        if width <= f64::EPSILON || height <= f64::EPSILON || scale_x <= 0.0 || scale_y <= 0.0 {
            return None;
        }

        let mut path = shape_path(shape, width, height);
        // Rendered units back to local units, so the object's own scale
        // brings the mask to the size computed above.
        path.apply_affine(Affine::scale_non_uniform(1.0 / scale_x, 1.0 / scale_y));

        Some(Self {
            shape,
            path_data: path.to_svg(),
        })
    }

    /// The clip as a kurbo path, in local units relative to the box centre.
    #[must_use]
    pub fn to_path(&self) -> Option<BezPath> {
        BezPath::from_svg(&self.path_data).ok()
    }

    /// Bounding box of the clip in local units relative to the box centre.
    #[must_use]
    pub fn bounding_box(&self) -> Rect {
        self.to_path().map_or(Rect::ZERO, |p| p.bounding_box())
    }
}

/// Path for `shape` in rendered units, centred on the origin.
fn shape_path(shape: ClipShape, width: f64, height: f64) -> BezPath {
    let side = width.min(height);
    let r = side / 2.0;
    match shape {
        ClipShape::Circle => Circle::new(Point::ORIGIN, r).to_path(PATH_TOLERANCE),
        ClipShape::Triangle => polygon_path(&[
            Point::new(0.0, -r),
            Point::new(r, r),
            Point::new(-r, r),
        ]),
        ClipShape::Star => {
            let points: Vec<Point> = (0..10)
                .map(|i| {
                    let radius = if i % 2 == 0 { r } else { r * STAR_INNER_RATIO };
                    let angle = f64::from(i) * PI / 5.0 - FRAC_PI_2;
                    Point::new(radius * angle.cos(), radius * angle.sin())
                })
                .collect();
            polygon_path(&points)
        }
        ClipShape::Hexagon => {
            let points: Vec<Point> = (0..6)
                .map(|i| {
                    let angle = f64::from(i) * TAU / 6.0;
                    Point::new(r * angle.cos(), r * angle.sin())
                })
                .collect();
            polygon_path(&points)
        }
        ClipShape::Heart => heart_path(width, height),
    }
}

fn polygon_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        path.move_to(*first);
        for p in iter {
            path.line_to(*p);
        }
        path.close_path();
    }
    path
}

/// Heart outline in a unit box, scaled to `width × height` and centred.
fn heart_path(width: f64, height: f64) -> BezPath {
    let p = |x: f64, y: f64| Point::new((x - 0.5) * width, (y - 0.5) * height);
    let mut path = BezPath::new();
    path.move_to(p(0.5, 0.25));
    path.curve_to(p(0.5, 0.2), p(0.42, 0.0), p(0.22, 0.0));
    path.curve_to(p(0.0, 0.0), p(0.0, 0.3), p(0.0, 0.3));
    path.curve_to(p(0.0, 0.55), p(0.2, 0.75), p(0.5, 1.0));
    path.curve_to(p(0.8, 0.75), p(1.0, 0.55), p(1.0, 0.3));
    path.curve_to(p(1.0, 0.3), p(1.0, 0.0), p(0.78, 0.0));
    path.curve_to(p(0.58, 0.0), p(0.5, 0.2), p(0.5, 0.25));
    path.close_path();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{ObjectKind, RectShape, Transform};

    fn rect(width: f64, height: f64, scale: f64) -> SceneObject {
        SceneObject::new(ObjectKind::Rect(RectShape {
            width,
            height,
            ..RectShape::default()
        }))
        .with_transform(Transform {
            scale_x: scale,
            scale_y: scale,
            ..Transform::default()
        })
    }

    #[test]
    fn test_circle_uses_smaller_side() {
        let object = rect(200.0, 100.0, 1.0);
        let clip = ClipGeometry::for_object(&object, ClipShape::Circle).expect("clip");
        let bbox = clip.bounding_box();
        assert!((bbox.width() - 100.0).abs() < 0.5);
        assert!((bbox.height() - 100.0).abs() < 0.5);
        assert!(bbox.center().x.abs() < 1e-6);
    }

    #[test]
    fn test_clip_in_local_units() {
        // Rendered 100x100 at scale 2: the mask spans 50 local units.
        let object = rect(50.0, 50.0, 2.0);
        let clip = ClipGeometry::for_object(&object, ClipShape::Hexagon).expect("clip");
        let bbox = clip.bounding_box();
        assert!((bbox.width() - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_heart_fills_box() {
        let object = rect(200.0, 100.0, 1.0);
        let clip = ClipGeometry::for_object(&object, ClipShape::Heart).expect("clip");
        let bbox = clip.bounding_box();
        assert!(bbox.width() > 150.0);
        assert!(bbox.height() > 80.0);
    }

    #[test]
    fn test_degenerate_object_has_no_clip() {
        let object = rect(0.0, 100.0, 1.0);
        assert!(ClipGeometry::for_object(&object, ClipShape::Star).is_none());
    }

    #[test]
    fn test_shape_names() {
        assert_eq!(ClipShape::from_name("Star"), Some(ClipShape::Star));
        assert_eq!(ClipShape::from_name("blob"), None);
        assert!(!ClipShape::Heart.is_regular());
    }
}
