//! Document export to image and document formats.
//!
//! Renders a [`Scene`] to PNG, JPEG, SVG or PDF using an SVG intermediate
//! and the resvg/tiny-skia rasterization pipeline. Export only reads the
//! document; nothing here mutates it.

use std::time::Duration;

use adcanvas_core::{parse_color, Scene};
use image::ImageEncoder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{RenderError, RenderResult};
use crate::preset::PresetRegistry;
use crate::svg::{document_svg, Viewport};

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
    /// SVG vector graphics (the SVG XML as UTF-8 bytes).
    Svg,
    /// PDF document with an embedded raster image.
    Pdf,
}

impl ExportFormat {
    /// File extension without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Svg => "svg",
            Self::Pdf => "pdf",
        }
    }

    /// MIME type.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Svg => "image/svg+xml",
            Self::Pdf => "application/pdf",
        }
    }
}

/// Configuration for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportConfig {
    /// Background colour override; `None` uses the document's background.
    pub background: Option<String>,
    /// JPEG quality 1-100 (default: 85).
    pub jpeg_quality: u8,
    /// DPI for print export (default: 96.0).
    pub dpi: f32,
    /// Pause between renders in a batch export (default: 150 ms).
    pub stagger: Duration,
    /// Load system fonts for text rendering.
    pub load_system_fonts: bool,
}

impl ExportConfig {
    /// Parse a configuration from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> RenderResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| RenderError::Resource(format!("Invalid export config: {e}")))
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            background: None,
            jpeg_quality: 85,
            dpi: 96.0,
            stagger: Duration::from_millis(150),
            load_system_fonts: true,
        }
    }
}

/// A rendered raster with straight (non-premultiplied) RGBA pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA pixel data, 4 bytes per pixel, row-major.
    pub pixels: Vec<u8>,
}

impl RasterImage {
    /// The RGBA value at `(x, y)`, or `None` outside the image.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let p = self.pixels.get(i..i + 4)?;
        Some([p[0], p[1], p[2], p[3]])
    }

    fn from_pixmap(pixmap: &tiny_skia::Pixmap) -> Self {
        let mut pixels = Vec::with_capacity(pixmap.data().len());
        for pixel in pixmap.pixels() {
            let c = pixel.demultiply();
            pixels.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Self {
            width: pixmap.width(),
            height: pixmap.height(),
            pixels,
        }
    }
}

/// One output of a batch export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedImage {
    /// Preset key the image was rendered for.
    pub preset: String,
    /// Multiplier the document was rendered at.
    pub multiplier: f64,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output format.
    pub format: ExportFormat,
    /// Encoded bytes.
    pub bytes: Vec<u8>,
}

/// Exports a [`Scene`] to various image and document formats.
pub struct SceneExporter {
    config: ExportConfig,
    options: usvg::Options<'static>,
}

impl std::fmt::Debug for SceneExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneExporter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SceneExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        let mut options = usvg::Options::default();
        if config.load_system_fonts {
            options.fontdb_mut().load_system_fonts();
        }
        Self { config, options }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default())
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Rasterize a `target_width × target_height` window of the document at
    /// `multiplier` output pixels per logical pixel.
    ///
    /// The document is drawn in its own coordinates from the origin; the
    /// viewport zoom of any editor never applies.
    ///
    /// # Errors
    ///
    /// Returns an error if the SVG cannot be parsed or the pixmap cannot be
    /// allocated.
    pub fn render(
        &self,
        scene: &Scene,
        target_width: u32,
        target_height: u32,
        multiplier: f64,
    ) -> RenderResult<RasterImage> {
        let viewport = Viewport {
            width: target_width.max(1),
            height: target_height.max(1),
            multiplier,
        };
        let pixmap = self.rasterize(scene, viewport)?;
        Ok(RasterImage::from_pixmap(&pixmap))
    }

    /// Export the whole document at 1×.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene cannot be rendered or encoded.
    pub fn export(&self, scene: &Scene, format: ExportFormat) -> RenderResult<Vec<u8>> {
        self.export_at(scene, Viewport::document(scene, 1.0), format)
    }

    /// Export a viewport of the document.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene cannot be rendered or encoded.
    pub fn export_at(
        &self,
        scene: &Scene,
        viewport: Viewport,
        format: ExportFormat,
    ) -> RenderResult<Vec<u8>> {
        self.export_with_quality(scene, viewport, format, self.config.jpeg_quality)
    }

    fn export_with_quality(
        &self,
        scene: &Scene,
        viewport: Viewport,
        format: ExportFormat,
        jpeg_quality: u8,
    ) -> RenderResult<Vec<u8>> {
        match format {
            ExportFormat::Svg => Ok(self.render_to_svg(scene, viewport).into_bytes()),
            ExportFormat::Png => {
                let pixmap = self.rasterize(scene, viewport)?;
                pixmap
                    .encode_png()
                    .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}")))
            }
            ExportFormat::Jpeg => {
                let pixmap = self.rasterize(scene, viewport)?;
                self.encode_jpeg(&pixmap, jpeg_quality)
            }
            ExportFormat::Pdf => {
                let pixmap = self.rasterize(scene, viewport)?;
                self.encode_pdf(&pixmap)
            }
        }
    }

    /// Export one image per preset, sequentially, pausing for the configured
    /// stagger between renders.
    ///
    /// Each preset renders the whole document at
    /// `max(max(pw/dw, ph/dh) * 2, 2)`. Unknown keys are skipped.
    /// `quality` overrides the JPEG quality for this batch.
    ///
    /// # Errors
    ///
    /// Returns the first rendering or encoding error; images rendered before
    /// it are discarded.
    pub async fn export_multiple(
        &self,
        scene: &Scene,
        registry: &PresetRegistry,
        preset_keys: &[&str],
        format: ExportFormat,
        quality: Option<u8>,
    ) -> RenderResult<Vec<ExportedImage>> {
        let quality = quality.unwrap_or(self.config.jpeg_quality).clamp(1, 100);
        let mut exported = Vec::with_capacity(preset_keys.len());

        for key in preset_keys {
            let Some(preset) = registry.get(key) else {
                warn!(preset = %key, "Skipping unknown export preset");
                continue;
            };
            if !exported.is_empty() && !self.config.stagger.is_zero() {
                tokio::time::sleep(self.config.stagger).await;
            }

            let multiplier = preset.multiplier_for(scene.width(), scene.height());
            let viewport = Viewport::document(scene, multiplier);
            let (width, height) = viewport.pixel_size();
            debug!(preset = %key, multiplier, width, height, "Rendering preset");

            let bytes = self.export_with_quality(scene, viewport, format, quality)?;
            exported.push(ExportedImage {
                preset: preset.key.clone(),
                multiplier,
                width,
                height,
                format,
                bytes,
            });
        }

        info!(
            requested = preset_keys.len(),
            exported = exported.len(),
            format = format.extension(),
            "Batch export finished"
        );
        Ok(exported)
    }

    /// The SVG intermediate for a viewport.
    #[must_use]
    pub fn render_to_svg(&self, scene: &Scene, viewport: Viewport) -> String {
        document_svg(scene, viewport, self.config.background.as_deref())
    }

    /// Rasterize a viewport to a tiny-skia Pixmap.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize(&self, scene: &Scene, viewport: Viewport) -> RenderResult<tiny_skia::Pixmap> {
        let svg = self.render_to_svg(scene, viewport);
        let tree = usvg::Tree::from_str(&svg, &self.options)
            .map_err(|e| RenderError::Export(format!("SVG parsing failed: {e}")))?;

        let (px_w, px_h) = viewport.pixel_size();
        let mut pixmap = tiny_skia::Pixmap::new(px_w, px_h)
            .ok_or_else(|| RenderError::Export("Failed to create pixmap".to_string()))?;

        let size = tree.size();
        let transform = tiny_skia::Transform::from_scale(
            px_w as f32 / size.width(),
            px_h as f32 / size.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        Ok(pixmap)
    }

    /// Flatten onto the background and encode as JPEG.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn encode_jpeg(&self, pixmap: &tiny_skia::Pixmap, quality: u8) -> RenderResult<Vec<u8>> {
        let (width, height) = (pixmap.width(), pixmap.height());
        let bg = self
            .config
            .background
            .as_deref()
            .and_then(parse_color)
            .unwrap_or([255, 255, 255, 255]);

        let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
        for pixel in pixmap.pixels() {
            let c = pixel.demultiply();
            let alpha = f32::from(c.alpha()) / 255.0;
            let inv = 1.0 - alpha;
            for (channel, back) in [c.red(), c.green(), c.blue()].into_iter().zip(bg) {
                rgb.push(f32::from(channel).mul_add(alpha, f32::from(back) * inv).round() as u8);
            }
        }

        let mut buf = std::io::Cursor::new(Vec::new());
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
        encoder
            .write_image(&rgb, width, height, image::ExtendedColorType::Rgb8)
            .map_err(|e| RenderError::Encode(format!("JPEG encoding failed: {e}")))?;

        Ok(buf.into_inner())
    }

    /// Embed the raster in a single PDF page sized by the configured DPI.
    #[cfg(feature = "pdf")]
    #[allow(clippy::cast_precision_loss)]
    fn encode_pdf(&self, pixmap: &tiny_skia::Pixmap) -> RenderResult<Vec<u8>> {
        let png = pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}")))?;
        let (out_w, out_h) = (pixmap.width(), pixmap.height());

        // pixels / dpi * 25.4
        let page_width_mm = out_w as f32 / self.config.dpi * 25.4;
        let page_height_mm = out_h as f32 / self.config.dpi * 25.4;

        let (doc, page1, layer1) = printpdf::PdfDocument::new(
            "AdCanvas Export",
            printpdf::Mm(page_width_mm),
            printpdf::Mm(page_height_mm),
            "Layer 1",
        );
        let current_layer = doc.get_page(page1).get_layer(layer1);

        // printpdf bundles its own image crate version.
        let dynamic_image = printpdf::image_crate::load_from_memory(&png)
            .map_err(|e| RenderError::Encode(format!("Failed to decode PNG for PDF: {e}")))?;
        let pdf_image = printpdf::Image::from_dynamic_image(&dynamic_image);

        let transform = printpdf::ImageTransform {
            translate_x: Some(printpdf::Mm(0.0)),
            translate_y: Some(printpdf::Mm(0.0)),
            dpi: Some(self.config.dpi),
            ..Default::default()
        };
        pdf_image.add_to_layer(current_layer, transform);

        doc.save_to_bytes()
            .map_err(|e| RenderError::Encode(format!("PDF save failed: {e}")))
    }

    #[cfg(not(feature = "pdf"))]
    #[allow(clippy::unused_self)]
    fn encode_pdf(&self, _pixmap: &tiny_skia::Pixmap) -> RenderResult<Vec<u8>> {
        Err(RenderError::Encode(
            "PDF export requires the `pdf` feature".to_string(),
        ))
    }
}

impl Default for SceneExporter {
    fn default() -> Self {
        Self::with_defaults()
    }
}
