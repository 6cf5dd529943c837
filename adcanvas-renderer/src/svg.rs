//! SVG description of a document.
//!
//! Every export goes through SVG: the document is written out in its own
//! coordinate space, a `viewBox` selects the target area, and the `width` /
//! `height` attributes carry the quality multiplier. Object transforms are
//! emitted as `matrix(...)` from the same affine the core uses for bounds,
//! so what is hit-tested is what is drawn.

use std::fmt::Write;

use adcanvas_core::object::{ObjectKind, SceneObject, TextAlign, TextContent};
use adcanvas_core::{parse_color, Filter, Scene, Stroke};

/// Baseline of a text line below its line top, in ems.
const BASELINE_EM: f64 = 0.8;

/// Standard deviation of a full-strength blur filter, in local units.
const MAX_BLUR_STD_DEV: f64 = 20.0;

/// Line stroke when the object has none.
const DEFAULT_LINE_COLOR: &str = "#000000";
const DEFAULT_LINE_WIDTH: f64 = 2.0;

/// Area of the document to draw and the pixel density to draw it at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Logical width of the target area.
    pub width: u32,
    /// Logical height of the target area.
    pub height: u32,
    /// Output pixels per logical pixel.
    pub multiplier: f64,
}

impl Viewport {
    /// The whole document at the given multiplier.
    #[must_use]
    pub fn document(scene: &Scene, multiplier: f64) -> Self {
        Self {
            width: scene.width(),
            height: scene.height(),
            multiplier,
        }
    }

    /// Output size in pixels, never below 1×1.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn pixel_size(&self) -> (u32, u32) {
        let m = if self.multiplier.is_finite() && self.multiplier > 0.0 {
            self.multiplier
        } else {
            1.0
        };
        let w = (f64::from(self.width) * m).round() as u32;
        let h = (f64::from(self.height) * m).round() as u32;
        (w.max(1), h.max(1))
    }
}

/// Write the document as a standalone SVG string.
///
/// `background` overrides the document's own background colour.
#[must_use]
pub fn document_svg(scene: &Scene, viewport: Viewport, background: Option<&str>) -> String {
    let mut writer = SvgWriter::default();
    for object in scene.objects() {
        writer.object(object);
    }

    let (px_w, px_h) = viewport.pixel_size();
    let background = escape_xml(background.unwrap_or_else(|| scene.background_color()));
    let mut svg = String::with_capacity(writer.body.len() + writer.defs.len() + 512);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" \
         width=\"{px_w}\" height=\"{px_h}\" viewBox=\"0 0 {} {}\">",
        viewport.width, viewport.height,
    );
    if !writer.defs.is_empty() {
        let _ = write!(svg, "<defs>{}</defs>", writer.defs);
    }
    let _ = write!(
        svg,
        "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"{background}\"/>",
        viewport.width, viewport.height,
    );
    svg.push_str(&writer.body);
    svg.push_str("</svg>");
    svg
}

/// Accumulates object markup and the `<defs>` it references.
#[derive(Default)]
struct SvgWriter {
    defs: String,
    body: String,
    next_id: usize,
}

impl SvgWriter {
    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn object(&mut self, object: &SceneObject) {
        if !object.visible {
            return;
        }

        let c = object.affine().as_coeffs();
        let _ = write!(
            self.body,
            "<g transform=\"matrix({} {} {} {} {} {})\" opacity=\"{}\"",
            c[0],
            c[1],
            c[2],
            c[3],
            c[4],
            c[5],
            object.opacity.clamp(0.0, 1.0),
        );
        if let Some(shadow) = &object.shadow {
            let id = self.fresh_id("shadow");
            let (color, alpha) = paint(&shadow.color);
            let _ = write!(
                self.defs,
                "<filter id=\"{id}\" x=\"-50%\" y=\"-50%\" width=\"200%\" height=\"200%\">\
                 <feDropShadow dx=\"{}\" dy=\"{}\" stdDeviation=\"{}\" flood-color=\"{color}\" flood-opacity=\"{alpha}\"/>\
                 </filter>",
                shadow.offset_x,
                shadow.offset_y,
                (shadow.blur / 2.0).max(0.0),
            );
            let _ = write!(self.body, " filter=\"url(#{id})\"");
        }
        self.body.push('>');

        let clipped = if let Some(clip) = &object.clip {
            let id = self.fresh_id("clip");
            let center = object.local_bounds().center();
            let _ = write!(
                self.defs,
                "<clipPath id=\"{id}\"><path d=\"{}\" transform=\"translate({} {})\"/></clipPath>",
                escape_xml(&clip.path_data),
                center.x,
                center.y,
            );
            let _ = write!(self.body, "<g clip-path=\"url(#{id})\">");
            true
        } else {
            false
        };

        self.content(object);

        if clipped {
            self.body.push_str("</g>");
        }
        self.body.push_str("</g>");
    }

    fn content(&mut self, object: &SceneObject) {
        let stroke = stroke_attrs(object.stroke.as_ref());
        match &object.kind {
            ObjectKind::Text(text) => self.text(text, &stroke),
            ObjectKind::Rect(rect) => {
                let _ = write!(
                    self.body,
                    "<rect width=\"{}\" height=\"{}\" rx=\"{}\" fill=\"{}\"{stroke}/>",
                    rect.width.max(0.0),
                    rect.height.max(0.0),
                    rect.corner_radius.max(0.0),
                    escape_xml(&rect.fill),
                );
            }
            ObjectKind::Ellipse(ellipse) => {
                let _ = write!(
                    self.body,
                    "<ellipse cx=\"{rx}\" cy=\"{ry}\" rx=\"{rx}\" ry=\"{ry}\" fill=\"{}\"{stroke}/>",
                    escape_xml(&ellipse.fill),
                    rx = ellipse.rx.max(0.0),
                    ry = ellipse.ry.max(0.0),
                );
            }
            ObjectKind::Polygon(polygon) => {
                let points: Vec<String> = polygon
                    .points
                    .iter()
                    .map(|p| format!("{},{}", p.x, p.y))
                    .collect();
                let _ = write!(
                    self.body,
                    "<polygon points=\"{}\" fill=\"{}\"{stroke}/>",
                    points.join(" "),
                    escape_xml(&polygon.fill),
                );
            }
            ObjectKind::Line(line) => {
                let (color, width) = object.stroke.as_ref().map_or(
                    (DEFAULT_LINE_COLOR.to_string(), DEFAULT_LINE_WIDTH),
                    |s| (escape_xml(&s.color), s.width),
                );
                let _ = write!(
                    self.body,
                    "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{color}\" stroke-width=\"{width}\"/>",
                    line.x1, line.y1, line.x2, line.y2,
                );
            }
            ObjectKind::Image(image) => {
                let filter = if object.filters.is_empty() {
                    String::new()
                } else {
                    let id = self.fresh_id("filter");
                    let _ = write!(
                        self.defs,
                        "<filter id=\"{id}\" x=\"0\" y=\"0\" width=\"100%\" height=\"100%\" \
                         color-interpolation-filters=\"sRGB\">{}</filter>",
                        filter_primitives(&object.filters),
                    );
                    format!(" filter=\"url(#{id})\"")
                };
                let _ = write!(
                    self.body,
                    "<image width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\" xlink:href=\"{}\"{filter}/>",
                    image.natural_width,
                    image.natural_height,
                    escape_xml(&image.pixel_source),
                );
                if !stroke.is_empty() {
                    let _ = write!(
                        self.body,
                        "<rect width=\"{}\" height=\"{}\" fill=\"none\"{stroke}/>",
                        image.natural_width, image.natural_height,
                    );
                }
            }
            ObjectKind::Group(group) => {
                for child in &group.children {
                    self.object(child);
                }
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn text(&mut self, text: &TextContent, stroke: &str) {
        let (width, _) = text.measure();
        let (anchor, x) = match text.text_align {
            TextAlign::Left => ("start", 0.0),
            TextAlign::Center => ("middle", width / 2.0),
            TextAlign::Right => ("end", width),
        };
        let _ = write!(
            self.body,
            "<text xml:space=\"preserve\" font-family=\"{}\" font-size=\"{}\" font-weight=\"{}\" \
             font-style=\"{}\" letter-spacing=\"{}\" text-anchor=\"{anchor}\" fill=\"{}\"",
            escape_xml(&text.font_family),
            text.font_size,
            escape_xml(&text.font_weight),
            if text.italic { "italic" } else { "normal" },
            text.letter_spacing,
            escape_xml(&text.fill),
        );
        if text.underline {
            self.body.push_str(" text-decoration=\"underline\"");
        }
        let _ = write!(self.body, "{stroke}>");

        let line_step = text.font_size * text.line_height;
        let lead = text.font_size * ((text.line_height - 1.0) / 2.0 + BASELINE_EM);
        for (i, line) in text.text.split('\n').enumerate() {
            let y = line_step * i as f64 + lead;
            let _ = write!(
                self.body,
                "<tspan x=\"{x}\" y=\"{y}\">{}</tspan>",
                escape_xml(line),
            );
        }
        self.body.push_str("</text>");
    }
}

fn stroke_attrs(stroke: Option<&Stroke>) -> String {
    match stroke {
        Some(s) if s.width > 0.0 => format!(
            " stroke=\"{}\" stroke-width=\"{}\"",
            escape_xml(&s.color),
            s.width,
        ),
        _ => String::new(),
    }
}

/// Split a CSS colour into an SVG colour and an opacity.
fn paint(color: &str) -> (String, f64) {
    match parse_color(color) {
        Some([r, g, b, a]) => (
            format!("#{r:02x}{g:02x}{b:02x}"),
            f64::from(a) / 255.0,
        ),
        None => (escape_xml(color), 1.0),
    }
}

/// Filter primitives for an image filter list, chained in order.
#[must_use]
pub fn filter_primitives(filters: &[Filter]) -> String {
    let mut out = String::new();
    for filter in filters {
        match filter {
            Filter::Grayscale => out.push_str("<feColorMatrix type=\"saturate\" values=\"0\"/>"),
            Filter::Sepia => color_matrix(
                &mut out,
                [
                    [0.393, 0.769, 0.189, 0.0],
                    [0.349, 0.686, 0.168, 0.0],
                    [0.272, 0.534, 0.131, 0.0],
                ],
            ),
            Filter::Invert => out.push_str(
                "<feComponentTransfer>\
                 <feFuncR type=\"table\" tableValues=\"1 0\"/>\
                 <feFuncG type=\"table\" tableValues=\"1 0\"/>\
                 <feFuncB type=\"table\" tableValues=\"1 0\"/>\
                 </feComponentTransfer>",
            ),
            Filter::Blur { amount } => {
                let _ = write!(
                    out,
                    "<feGaussianBlur stdDeviation=\"{}\"/>",
                    amount.clamp(0.0, 1.0) * MAX_BLUR_STD_DEV,
                );
            }
            Filter::Sharpen => out.push_str(
                "<feConvolveMatrix order=\"3\" kernelMatrix=\"0 -1 0 -1 5 -1 0 -1 0\" preserveAlpha=\"true\"/>",
            ),
            Filter::Brightness { value } => linear_transfer(&mut out, 1.0, *value),
            Filter::Contrast { value } => {
                let c = value.clamp(-1.0, 1.0) * 255.0;
                let factor = 259.0 * (c + 255.0) / (255.0 * (259.0 - c));
                linear_transfer(&mut out, factor, 0.5 * (1.0 - factor));
            }
            Filter::Saturation { value } => {
                let s = 1.0 + value.clamp(-1.0, 1.0);
                color_matrix(
                    &mut out,
                    [
                        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s, 0.0],
                        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s, 0.0],
                        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s, 0.0],
                    ],
                );
            }
            Filter::Tint { color, alpha } => {
                let [r, g, b, _] = parse_color(color).unwrap_or([0, 0, 0, 255]);
                let a = alpha.clamp(0.0, 1.0);
                let keep = 1.0 - a;
                let offset = |channel: u8| a * f64::from(channel) / 255.0;
                color_matrix(
                    &mut out,
                    [
                        [keep, 0.0, 0.0, offset(r)],
                        [0.0, keep, 0.0, offset(g)],
                        [0.0, 0.0, keep, offset(b)],
                    ],
                );
            }
        }
    }
    out
}

/// `feColorMatrix` with the given RGB rows (`[r, g, b, offset]`) and alpha
/// passed through.
fn color_matrix(out: &mut String, rows: [[f64; 4]; 3]) {
    out.push_str("<feColorMatrix type=\"matrix\" values=\"");
    for row in rows {
        let _ = write!(out, "{} {} {} 0 {} ", row[0], row[1], row[2], row[3]);
    }
    out.push_str("0 0 0 1 0\"/>");
}

fn linear_transfer(out: &mut String, slope: f64, intercept: f64) {
    out.push_str("<feComponentTransfer>");
    for channel in ["R", "G", "B"] {
        let _ = write!(
            out,
            "<feFunc{channel} type=\"linear\" slope=\"{slope}\" intercept=\"{intercept}\"/>",
        );
    }
    out.push_str("</feComponentTransfer>");
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use adcanvas_core::object::{GroupContent, RectShape};
    use adcanvas_core::{ClipGeometry, ClipShape, Shadow};

    fn rect_scene() -> (Scene, SceneObject) {
        let mut scene = Scene::new(400, 300, "#ffffff");
        let rect = SceneObject::new(ObjectKind::Rect(RectShape {
            width: 100.0,
            height: 50.0,
            fill: "#ff0000".to_string(),
            corner_radius: 0.0,
        }))
        .with_position(10.0, 20.0);
        scene.add(rect.clone());
        (scene, rect)
    }

    #[test]
    fn test_svg_frame() {
        let (scene, _) = rect_scene();
        let svg = document_svg(&scene, Viewport::document(&scene, 2.0), None);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("width=\"800\""));
        assert!(svg.contains("height=\"600\""));
        assert!(svg.contains("viewBox=\"0 0 400 300\""));
        assert!(svg.contains("fill=\"#ffffff\""));
    }

    #[test]
    fn test_rect_emitted_with_matrix() {
        let (scene, _) = rect_scene();
        let svg = document_svg(&scene, Viewport::document(&scene, 1.0), None);
        assert!(svg.contains(" 10 20)\" opacity=\"1\""));
        assert!(svg.contains("<rect width=\"100\" height=\"50\""));
    }

    #[test]
    fn test_background_override() {
        let (scene, _) = rect_scene();
        let svg = document_svg(&scene, Viewport::document(&scene, 1.0), Some("#000000"));
        assert!(svg.contains("fill=\"#000000\""));
    }

    #[test]
    fn test_hidden_objects_skipped() {
        let (mut scene, rect) = rect_scene();
        scene.update(rect.id, |o| o.visible = false);
        let svg = document_svg(&scene, Viewport::document(&scene, 1.0), None);
        assert!(!svg.contains("<rect width=\"100\""));
    }

    #[test]
    fn test_clip_and_shadow_defs() {
        let (mut scene, _) = rect_scene();
        let id = scene.objects()[0].id;
        scene.update(id, |o| {
            o.clip = ClipGeometry::for_object(o, ClipShape::Circle);
            o.shadow = Some(Shadow::drop("rgba(0,0,0,0.5)", 8.0, 4.0, 4.0));
        });
        let svg = document_svg(&scene, Viewport::document(&scene, 1.0), None);
        assert!(svg.contains("<clipPath id=\"clip"));
        assert!(svg.contains("translate(50 25)"));
        assert!(svg.contains("feDropShadow"));
        assert!(svg.contains("flood-color=\"#000000\""));
    }

    #[test]
    fn test_group_children_nested() {
        let mut scene = Scene::new(100, 100, "#ffffff");
        let child = SceneObject::new(ObjectKind::Rect(RectShape::default()));
        scene.add(SceneObject::new(ObjectKind::Group(GroupContent {
            children: vec![child],
        })));
        let svg = document_svg(&scene, Viewport::document(&scene, 1.0), None);
        assert_eq!(svg.matches("<g transform").count(), 2);
    }

    #[test]
    fn test_text_lines_escaped() {
        let mut scene = Scene::new(100, 100, "#ffffff");
        scene.add(SceneObject::new(ObjectKind::Text(TextContent::new(
            "Buy <now>\n& save",
        ))));
        let svg = document_svg(&scene, Viewport::document(&scene, 1.0), None);
        assert_eq!(svg.matches("<tspan").count(), 2);
        assert!(svg.contains("Buy &lt;now&gt;"));
        assert!(svg.contains("&amp; save"));
    }

    #[test]
    fn test_filter_primitives() {
        let chain = filter_primitives(&[Filter::Grayscale, Filter::Brightness { value: 0.2 }]);
        assert!(chain.starts_with("<feColorMatrix type=\"saturate\" values=\"0\"/>"));
        assert!(chain.contains("intercept=\"0.2\""));

        let contrast = filter_primitives(&[Filter::Contrast { value: 0.0 }]);
        assert!(contrast.contains("slope=\"1\""));
    }

    #[test]
    fn test_pixel_size_rounding() {
        let vp = Viewport {
            width: 300,
            height: 250,
            multiplier: 3.6,
        };
        assert_eq!(vp.pixel_size(), (1080, 900));
    }
}
