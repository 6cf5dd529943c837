//! Typed property edits.
//!
//! The editor's inspector edits one property at a time. Each edit is a
//! [`Property`] value rather than a key/value string pair, so an edit that
//! does not apply to a kind (a fill on a line, a font on an image) is
//! rejected by the match instead of silently writing an unused field.

use serde::{Deserialize, Serialize};

use crate::filter::{Shadow, Stroke};
use crate::object::{ImageContent, ObjectKind, SceneObject, TextAlign};

/// A single property edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "camelCase")]
pub enum Property {
    /// Move the origin point.
    Position {
        /// New x.
        x: f64,
        /// New y.
        y: f64,
    },
    /// Set both scale factors.
    Scale {
        /// New horizontal scale.
        x: f64,
        /// New vertical scale.
        y: f64,
    },
    /// Rotation in degrees.
    Angle(f64),
    /// Opacity, clamped to `[0, 1]`.
    Opacity(f64),
    /// Visibility.
    Visible(bool),
    /// Interactive lock.
    Locked(bool),
    /// Display name.
    Name(Option<String>),
    /// Fill colour of text and filled shapes.
    Fill(String),
    /// Text content.
    Text(String),
    /// Font family.
    FontFamily(String),
    /// Font size in pixels.
    FontSize(f64),
    /// CSS font weight.
    FontWeight(String),
    /// Glyph spacing in pixels.
    LetterSpacing(f64),
    /// Line height multiple.
    LineHeight(f64),
    /// Underline decoration.
    Underline(bool),
    /// Italic style.
    Italic(bool),
    /// Text alignment.
    TextAlign(TextAlign),
    /// Rectangle corner radius.
    CornerRadius(f64),
    /// Rectangle width/height or ellipse diameters.
    Size {
        /// New width.
        width: f64,
        /// New height.
        height: f64,
    },
    /// Shadow; `None` removes it.
    Shadow(Option<Shadow>),
    /// Stroke; `None` removes it.
    Stroke(Option<Stroke>),
    /// Replace an image's pixel source.
    Source(ImageContent),
}

impl SceneObject {
    /// Apply a property edit in place.
    ///
    /// Returns `false` when the property does not apply to this kind or the
    /// value is unchanged. Locked objects accept property edits.
    pub fn apply_property(&mut self, property: Property) -> bool {
        let before = self.clone();
        let applicable = match property {
            Property::Position { x, y } => {
                self.transform.x = x;
                self.transform.y = y;
                true
            }
            Property::Scale { x, y } => {
                self.transform.scale_x = x;
                self.transform.scale_y = y;
                true
            }
            Property::Angle(angle) => {
                self.transform.angle = angle;
                true
            }
            Property::Opacity(opacity) => {
                self.opacity = opacity.clamp(0.0, 1.0);
                true
            }
            Property::Visible(visible) => {
                self.visible = visible;
                true
            }
            Property::Locked(locked) => {
                self.locked = locked;
                true
            }
            Property::Name(name) => {
                self.name = name;
                true
            }
            Property::Shadow(shadow) => {
                self.shadow = shadow;
                true
            }
            Property::Stroke(stroke) => {
                self.stroke = stroke;
                true
            }
            Property::Fill(fill) => match &mut self.kind {
                ObjectKind::Text(t) => replace(&mut t.fill, fill),
                ObjectKind::Rect(r) => replace(&mut r.fill, fill),
                ObjectKind::Ellipse(e) => replace(&mut e.fill, fill),
                ObjectKind::Polygon(p) => replace(&mut p.fill, fill),
                ObjectKind::Line(_) | ObjectKind::Image(_) | ObjectKind::Group(_) => false,
            },
            Property::Size { width, height } => match &mut self.kind {
                ObjectKind::Rect(r) => {
                    r.width = width.max(0.0);
                    r.height = height.max(0.0);
                    true
                }
                ObjectKind::Ellipse(e) => {
                    e.rx = (width / 2.0).max(0.0);
                    e.ry = (height / 2.0).max(0.0);
                    true
                }
                _ => false,
            },
            Property::CornerRadius(radius) => match &mut self.kind {
                ObjectKind::Rect(r) => replace(&mut r.corner_radius, radius.max(0.0)),
                _ => false,
            },
            Property::Source(source) => match &mut self.kind {
                ObjectKind::Image(image) => replace(image, source),
                _ => false,
            },
            Property::Text(text) => self.edit_text(|t| t.text = text),
            Property::FontFamily(family) => self.edit_text(|t| t.font_family = family),
            Property::FontSize(size) => self.edit_text(|t| t.font_size = size.max(1.0)),
            Property::FontWeight(weight) => self.edit_text(|t| t.font_weight = weight),
            Property::LetterSpacing(spacing) => self.edit_text(|t| t.letter_spacing = spacing),
            Property::LineHeight(height) => self.edit_text(|t| t.line_height = height.max(0.1)),
            Property::Underline(underline) => self.edit_text(|t| t.underline = underline),
            Property::Italic(italic) => self.edit_text(|t| t.italic = italic),
            Property::TextAlign(align) => self.edit_text(|t| t.text_align = align),
        };
        applicable && *self != before
    }

    fn edit_text(&mut self, edit: impl FnOnce(&mut crate::object::TextContent)) -> bool {
        if let ObjectKind::Text(text) = &mut self.kind {
            edit(text);
            true
        } else {
            false
        }
    }
}

fn replace<T>(slot: &mut T, value: T) -> bool {
    *slot = value;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{LineShape, RectShape, TextContent};

    #[test]
    fn test_fill_on_rect() {
        let mut rect = SceneObject::new(ObjectKind::Rect(RectShape::default()));
        assert!(rect.apply_property(Property::Fill("#ff0000".to_string())));
        let ObjectKind::Rect(shape) = &rect.kind else {
            panic!("expected rect");
        };
        assert_eq!(shape.fill, "#ff0000");
    }

    #[test]
    fn test_fill_on_line_rejected() {
        let mut line = SceneObject::new(ObjectKind::Line(LineShape::default()));
        assert!(!line.apply_property(Property::Fill("#ff0000".to_string())));
    }

    #[test]
    fn test_unchanged_value_reports_false() {
        let mut text = SceneObject::new(ObjectKind::Text(TextContent::new("Sale")));
        assert!(!text.apply_property(Property::Text("Sale".to_string())));
        assert!(text.apply_property(Property::Text("Sale!".to_string())));
    }

    #[test]
    fn test_locked_accepts_property_edits() {
        let mut rect = SceneObject::new(ObjectKind::Rect(RectShape::default()));
        rect.locked = true;
        assert!(rect.apply_property(Property::Position { x: 5.0, y: 6.0 }));
        assert!((rect.transform.x - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_opacity_clamped() {
        let mut rect = SceneObject::new(ObjectKind::Rect(RectShape::default()));
        rect.apply_property(Property::Opacity(3.0));
        assert!((rect.opacity - 1.0).abs() < f64::EPSILON);
    }
}
