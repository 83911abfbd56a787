// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Design export to images and PDF.
//!
//! A [`Rasterizer`] turns a project into pixels; this module encodes the
//! result as JPEG, PNG or a single-page PDF sized to the canvas. Export
//! makes one reduced-fidelity retry before giving up, and never writes a
//! file unless encoding succeeded.
//!
//! [`FlatRasterizer`] is the built-in rasterizer. It paints backgrounds,
//! shapes, chips, images and QR codes; text runs are greeked (drawn as
//! bars the width of the text) since it carries no font engine.

use super::media;
use crate::models::element::{Element, ElementKind, ShapeKind, TextAlign};
use crate::models::project::ProjectData;
use crate::util::geometry::{self, Point};
use image::{Rgba, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("an export is already running")]
    Busy,

    #[error("rasterization failed: {0}")]
    Rasterize(String),

    #[error("encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Jpeg,
    Png,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Pdf => "pdf",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::Pdf => "PDF",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fidelity {
    /// Everything, including external image assets.
    Full,
    /// External assets replaced by placeholders.
    Reduced,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    /// Output pixels per canvas pixel.
    pub pixel_ratio: u32,
    pub jpeg_quality: u8,
    pub fidelity: Fidelity,
}

impl RasterOptions {
    pub fn full() -> Self {
        Self {
            pixel_ratio: 2,
            jpeg_quality: 95,
            fidelity: Fidelity::Full,
        }
    }

    pub fn reduced() -> Self {
        Self {
            pixel_ratio: 2,
            jpeg_quality: 90,
            fidelity: Fidelity::Reduced,
        }
    }
}

/// Renders a project to pixels.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, project: &ProjectData, options: &RasterOptions)
        -> Result<RgbaImage, ExportError>;
}

/// `PROJECT NAME` -> `PROJECT_NAME`
pub fn file_stem(project_name: &str) -> String {
    let stem = project_name.split_whitespace().collect::<Vec<_>>().join("_");
    if stem.is_empty() {
        "design".to_string()
    } else {
        stem
    }
}

/// `PROJECT NAME` -> `PROJECT_NAME.jpg`
pub fn default_file_name(project_name: &str, format: ExportFormat) -> String {
    format!("{}.{}", file_stem(project_name), format.extension())
}

/// Export `project` to `path`, retrying once at reduced fidelity.
pub fn export_project(
    rasterizer: &dyn Rasterizer,
    project: &ProjectData,
    format: ExportFormat,
    path: &Path,
) -> Result<PathBuf, ExportError> {
    let mut last_error = ExportError::Rasterize("no export attempt was made".into());

    for options in [RasterOptions::full(), RasterOptions::reduced()] {
        match render(rasterizer, project, format, &options) {
            Ok(bytes) => {
                std::fs::write(path, bytes).map_err(|source| ExportError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                log::info!(
                    "Exported {} to {} ({:?} fidelity)",
                    format.label(),
                    path.display(),
                    options.fidelity
                );
                return Ok(path.to_path_buf());
            }
            Err(e) => {
                log::warn!("{} export at {:?} fidelity failed: {}", format.label(), options.fidelity, e);
                last_error = e;
            }
        }
    }

    log::error!("{} export of {:?} failed", format.label(), project.project_name);
    Err(last_error)
}

/// Rasterize and encode in memory.
pub fn render(
    rasterizer: &dyn Rasterizer,
    project: &ProjectData,
    format: ExportFormat,
    options: &RasterOptions,
) -> Result<Vec<u8>, ExportError> {
    let raster = rasterizer.rasterize(project, options)?;
    match format {
        ExportFormat::Jpeg => encode_jpeg(&raster, options.jpeg_quality),
        ExportFormat::Png => {
            let mut bytes = Vec::new();
            raster.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
            Ok(bytes)
        }
        ExportFormat::Pdf => {
            let jpeg = encode_jpeg(&raster, options.jpeg_quality)?;
            Ok(pdf_with_image(
                &jpeg,
                (raster.width(), raster.height()),
                (project.canvas_size.width, project.canvas_size.height),
                &project.project_name,
            ))
        }
    }
}

fn encode_jpeg(raster: &RgbaImage, quality: u8) -> Result<Vec<u8>, ExportError> {
    let rgb = image::DynamicImage::ImageRgba8(raster.clone()).to_rgb8();
    let mut bytes = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, quality);
    encoder.encode_image(&rgb)?;
    Ok(bytes)
}

/// Single-page PDF whose page is `page` units large, filled by a JPEG.
fn pdf_with_image(jpeg: &[u8], pixels: (u32, u32), page: (u32, u32), title: &str) -> Vec<u8> {
    let mut pdf: Vec<u8> = Vec::new();
    let mut offsets: Vec<usize> = Vec::new();

    pdf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

    offsets.push(pdf.len());
    pdf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

    offsets.push(pdf.len());
    pdf.extend_from_slice(b"2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n");

    offsets.push(pdf.len());
    pdf.extend_from_slice(
        format!(
            "3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
             /Resources << /XObject << /Im1 4 0 R >> >> /Contents 5 0 R >>\nendobj\n",
            page.0, page.1
        )
        .as_bytes(),
    );

    offsets.push(pdf.len());
    pdf.extend_from_slice(
        format!(
            "4 0 obj\n<< /Type /XObject /Subtype /Image /Width {} /Height {} \
             /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode /Length {} >>\nstream\n",
            pixels.0,
            pixels.1,
            jpeg.len()
        )
        .as_bytes(),
    );
    pdf.extend_from_slice(jpeg);
    pdf.extend_from_slice(b"\nendstream\nendobj\n");

    offsets.push(pdf.len());
    let content = format!("q {} 0 0 {} 0 0 cm /Im1 Do Q", page.0, page.1);
    pdf.extend_from_slice(
        format!(
            "5 0 obj\n<< /Length {} >>\nstream\n{}\nendstream\nendobj\n",
            content.len(),
            content
        )
        .as_bytes(),
    );

    offsets.push(pdf.len());
    pdf.extend_from_slice(
        format!(
            "6 0 obj\n<< /Title ({}) /Producer (invite-designer) >>\nendobj\n",
            pdf_escape(title)
        )
        .as_bytes(),
    );

    let xref_offset = pdf.len();
    let num_objects = offsets.len() + 1;
    let mut xref = format!("xref\n0 {num_objects}\n0000000000 65535 f \n");
    for offset in &offsets {
        xref.push_str(&format!("{:010} 00000 n \n", offset));
    }
    xref.push_str(&format!(
        "trailer\n<< /Size {num_objects} /Root 1 0 R /Info 6 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n"
    ));
    pdf.extend_from_slice(xref.as_bytes());
    pdf
}

/// Escape a PDF literal string; non-ASCII is dropped.
fn pdf_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars().filter(|c| c.is_ascii() && !c.is_ascii_control()) {
        if matches!(c, '(' | ')' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Payload of a QR element: the `data` parameter of a QR-service URL, or
/// the content itself when it isn't a URL.
pub fn qr_payload(content: &str) -> Option<String> {
    match Url::parse(content) {
        Ok(url) => url
            .query_pairs()
            .find(|(key, _)| key == "data")
            .map(|(_, value)| value.into_owned()),
        Err(_) if !content.trim().is_empty() => Some(content.to_string()),
        Err(_) => None,
    }
}

/// Parse `#RRGGBB` (or `#RGB`); anything else is black.
pub fn parse_hex_color(color: &str) -> [u8; 3] {
    let hex = color.trim().trim_start_matches('#');
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return [0, 0, 0];
    }
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range).and_then(|s| u8::from_str_radix(s, 16).ok())
    };
    let parsed = match hex.len() {
        6 => (|| Some([channel(0..2)?, channel(2..4)?, channel(4..6)?]))(),
        3 => (|| Some([channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17]))(),
        _ => None,
    };
    parsed.unwrap_or([0, 0, 0])
}

/// Chip fill color per sub-kind.
fn chip_fill(kind: ElementKind) -> [u8; 3] {
    use crate::models::element::ChipKind;
    match kind {
        ElementKind::Chip(ChipKind::Confirmed) => [0x16, 0xA3, 0x4A],
        ElementKind::Chip(ChipKind::Gift) => [0xF9, 0x73, 0x16],
        _ => [0x25, 0x63, 0xEB],
    }
}

/// Largest output side in pixels.
pub const MAX_SURFACE_SIDE: u32 = 16_384;

/// Output size of the canvas at `ratio`, refusing empty or oversized pages.
fn surface_size(project: &ProjectData, ratio: u32) -> Result<(u32, u32), ExportError> {
    let size = &project.canvas_size;
    let scaled = |side: u32| {
        side.checked_mul(ratio)
            .filter(|px| *px <= MAX_SURFACE_SIDE)
            .ok_or_else(|| {
                ExportError::Rasterize(format!(
                    "canvas {}x{} is too large to export at {ratio}x",
                    size.width, size.height
                ))
            })
    };
    let (width, height) = (scaled(size.width)?, scaled(size.height)?);
    if width == 0 || height == 0 {
        return Err(ExportError::Rasterize("canvas has no area".into()));
    }
    Ok((width, height))
}

/// Straightforward CPU rasterizer.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlatRasterizer;

impl Rasterizer for FlatRasterizer {
    fn rasterize(
        &self,
        project: &ProjectData,
        options: &RasterOptions,
    ) -> Result<RgbaImage, ExportError> {
        let ratio = options.pixel_ratio.max(1);
        let (width, height) = surface_size(project, ratio)?;
        let ratio = ratio as f64;
        let mut surface = Surface {
            image: RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])),
            ratio,
        };

        if !project.background.image.is_empty() {
            surface.draw_background(project, options.fidelity)?;
        }
        for element in geometry::paint_order(&project.elements) {
            surface.draw_element(element, options.fidelity)?;
        }
        Ok(surface.image)
    }
}

/// Output raster plus the canvas-to-pixel ratio.
struct Surface {
    image: RgbaImage,
    ratio: f64,
}

impl Surface {
    fn blend(&mut self, x: u32, y: u32, rgb: [u8; 3], alpha: f64) {
        if x >= self.image.width() || y >= self.image.height() || alpha <= 0.0 {
            return;
        }
        let alpha = alpha.min(1.0);
        let px = self.image.get_pixel_mut(x, y);
        for c in 0..3 {
            px.0[c] = (rgb[c] as f64 * alpha + px.0[c] as f64 * (1.0 - alpha)).round() as u8;
        }
    }

    fn draw_background(&mut self, project: &ProjectData, fidelity: Fidelity) -> Result<(), ExportError> {
        if fidelity == Fidelity::Reduced {
            return Ok(());
        }
        let bg = &project.background;
        let source = media::load_reference(&bg.image)
            .map_err(|e| ExportError::Rasterize(format!("background: {e:#}")))?;

        // Cover the canvas, then apply the background scale about the center.
        let (w, h) = (self.image.width() as f64, self.image.height() as f64);
        let cover = (w / source.width() as f64).max(h / source.height() as f64) * bg.scale.max(0.01);
        let (sw, sh) = (source.width() as f64 * cover, source.height() as f64 * cover);
        let (ox, oy) = ((w - sw) / 2.0, (h - sh) / 2.0);

        for y in 0..self.image.height() {
            for x in 0..self.image.width() {
                let sx = ((x as f64 - ox) / cover).floor();
                let sy = ((y as f64 - oy) / cover).floor();
                if sx < 0.0 || sy < 0.0 || sx >= source.width() as f64 || sy >= source.height() as f64 {
                    continue;
                }
                let p = source.get_pixel(sx as u32, sy as u32).0;
                let alpha = bg.opacity * p[3] as f64 / 255.0;
                self.blend(x, y, [p[0], p[1], p[2]], alpha);
            }
        }
        Ok(())
    }

    fn draw_element(&mut self, element: &Element, fidelity: Fidelity) -> Result<(), ExportError> {
        let qr = match element.kind {
            ElementKind::QrCode => qr_payload(&element.content)
                .and_then(|data| qrcode::QrCode::new(data.as_bytes()).ok()),
            _ => None,
        };

        // A QR element without a payload shows its content as a picture.
        let picture = match element.kind {
            ElementKind::Image => Some(element.content.as_str()),
            ElementKind::QrCode if qr.is_none() => Some(element.content.as_str()),
            ElementKind::Shape(_) => element.image_content.as_deref(),
            _ => None,
        };
        let picture = match (picture, fidelity) {
            (Some(reference), Fidelity::Full) if !reference.is_empty() => Some(
                media::load_reference(reference).map_err(|e| {
                    ExportError::Rasterize(format!("element {}: {e:#}", element.id))
                })?,
            ),
            _ => None,
        };

        let (w, h) = element.scaled_size();
        let radius = (element.border_radius * element.scale).min(w / 2.0).min(h / 2.0).max(0.0);
        let ink = parse_hex_color(&element.color);
        let center = geometry::element_center(element);
        let (sin, cos) = (-element.rotation.to_radians()).sin_cos();
        let text_rows = text_rows(element);

        // Pixel bounds of the rotated, scaled box.
        let half_diag = (w * w + h * h).sqrt() / 2.0;
        let min_x = ((center.x - half_diag) * self.ratio).floor().max(0.0) as u32;
        let min_y = ((center.y - half_diag) * self.ratio).floor().max(0.0) as u32;
        let max_x = ((center.x + half_diag) * self.ratio).ceil().max(0.0) as u32;
        let max_y = ((center.y + half_diag) * self.ratio).ceil().max(0.0) as u32;
        let max_x = max_x.min(self.image.width());
        let max_y = max_y.min(self.image.height());

        for py in min_y..max_y {
            for px in min_x..max_x {
                let canvas = Point::new((px as f64 + 0.5) / self.ratio, (py as f64 + 0.5) / self.ratio);
                let d = canvas - center;
                let lx = d.x * cos - d.y * sin;
                let ly = d.x * sin + d.y * cos;
                if lx.abs() > w / 2.0 || ly.abs() > h / 2.0 || !in_rounded_rect(lx, ly, w, h, radius) {
                    continue;
                }
                // Unit coordinates within the box, origin top-left.
                let u = (lx + w / 2.0) / w;
                let v = (ly + h / 2.0) / h;

                let paint: Option<[u8; 3]> = match element.kind {
                    ElementKind::Shape(ShapeKind::Heart) => in_heart(u, v).then_some(ink),
                    ElementKind::Shape(_) | ElementKind::Image if picture.is_some() => {
                        picture.as_ref().map(|img| sample(img, u, v))
                    }
                    ElementKind::Shape(_) => Some(ink),
                    ElementKind::Image => Some([0xCB, 0xD5, 0xE1]),
                    ElementKind::QrCode => Some(match (&qr, &picture) {
                        (Some(code), _) => qr_module(code, u, v),
                        (None, Some(img)) => sample(img, u, v),
                        (None, None) => [0xCB, 0xD5, 0xE1],
                    }),
                    ElementKind::Chip(_) => Some(if text_rows.iter().any(|r| r.contains(u, v)) {
                        [0xFF, 0xFF, 0xFF]
                    } else {
                        chip_fill(element.kind)
                    }),
                    ElementKind::Text => text_rows.iter().any(|r| r.contains(u, v)).then_some(ink),
                };
                if let Some(rgb) = paint {
                    self.blend(px, py, rgb, element.opacity);
                }
            }
        }
        Ok(())
    }
}

fn in_rounded_rect(lx: f64, ly: f64, w: f64, h: f64, r: f64) -> bool {
    if r <= 0.0 {
        return true;
    }
    let qx = lx.abs() - (w / 2.0 - r);
    let qy = ly.abs() - (h / 2.0 - r);
    qx <= 0.0 || qy <= 0.0 || qx * qx + qy * qy <= r * r
}

/// Heart curve `(x^2 + y^2 - 1)^3 - x^2 y^3 <= 0`, fitted to the unit box.
fn in_heart(u: f64, v: f64) -> bool {
    let x = (u - 0.5) * 2.6;
    let y = (0.5 - v) * 2.6 + 0.2;
    let a = x * x + y * y - 1.0;
    a * a * a - x * x * y * y * y <= 0.0
}

fn sample(image: &RgbaImage, u: f64, v: f64) -> [u8; 3] {
    let x = ((u * image.width() as f64) as u32).min(image.width().saturating_sub(1));
    let y = ((v * image.height() as f64) as u32).min(image.height().saturating_sub(1));
    let p = image.get_pixel(x, y).0;
    [p[0], p[1], p[2]]
}

fn qr_module(code: &qrcode::QrCode, u: f64, v: f64) -> [u8; 3] {
    // One module of quiet zone on each side.
    let modules = code.width() + 2;
    let qx = (u * modules as f64).floor() as isize - 1;
    let qy = (v * modules as f64).floor() as isize - 1;
    if qx < 0 || qy < 0 || qx >= code.width() as isize || qy >= code.width() as isize {
        return [0xFF, 0xFF, 0xFF];
    }
    if code[(qx as usize, qy as usize)] == qrcode::Color::Dark {
        [0, 0, 0]
    } else {
        [0xFF, 0xFF, 0xFF]
    }
}

/// A greeked text line in unit box coordinates.
struct TextRow {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl TextRow {
    fn contains(&self, u: f64, v: f64) -> bool {
        u >= self.left && u <= self.right && v >= self.top && v <= self.bottom
    }
}

/// Lay out text rows for textual elements: each line becomes a bar about
/// as wide as its glyphs would be, aligned per the element.
fn text_rows(element: &Element) -> Vec<TextRow> {
    if !element.kind.is_textual() || element.kind == ElementKind::Shape(ShapeKind::Heart) {
        return Vec::new();
    }
    let text = element.display_text();
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() || element.width <= 0.0 || element.height <= 0.0 {
        return Vec::new();
    }

    let line_height = element.font_size * 1.2;
    let block = line_height * lines.len() as f64;
    let top = (element.height - block) / 2.0;

    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let glyphs = line.chars().count() as f64 * element.font_size * 0.55;
            let span = (glyphs / element.width).min(1.0);
            let (left, right) = match element.text_align {
                TextAlign::Left => (0.0, span),
                TextAlign::Center => ((1.0 - span) / 2.0, (1.0 + span) / 2.0),
                TextAlign::Right => (1.0 - span, 1.0),
            };
            let row_top = top + i as f64 * line_height + line_height * 0.25;
            let row_bottom = row_top + element.font_size * 0.7;
            TextRow {
                left,
                right,
                top: (row_top / element.height).max(0.0),
                bottom: (row_bottom / element.height).min(1.0),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::element::{ChipKind, ElementPatch};
    use crate::models::project::{CanvasPreset, DesignState};

    fn project_with(kinds: &[ElementKind]) -> ProjectData {
        let mut state = DesignState::new();
        state.set_canvas_size(CanvasPreset::Square.size());
        for kind in kinds {
            state.add_element(*kind, ElementPatch::default());
        }
        state.snapshot()
    }

    struct FailingRasterizer {
        fail_full: bool,
    }

    impl Rasterizer for FailingRasterizer {
        fn rasterize(
            &self,
            _project: &ProjectData,
            options: &RasterOptions,
        ) -> Result<RgbaImage, ExportError> {
            if options.fidelity == Fidelity::Full && self.fail_full {
                return Err(ExportError::Rasterize("fonts unavailable".into()));
            }
            if options.fidelity == Fidelity::Reduced {
                return Err(ExportError::Rasterize("still broken".into()));
            }
            Ok(RgbaImage::new(4, 4))
        }
    }

    struct ReducedOnly;

    impl Rasterizer for ReducedOnly {
        fn rasterize(
            &self,
            _project: &ProjectData,
            options: &RasterOptions,
        ) -> Result<RgbaImage, ExportError> {
            match options.fidelity {
                Fidelity::Full => Err(ExportError::Rasterize("nope".into())),
                Fidelity::Reduced => Ok(RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]))),
            }
        }
    }

    #[test]
    fn test_default_file_name() {
        assert_eq!(
            default_file_name("INVITATION - ANA  &  BRUNO", ExportFormat::Jpeg),
            "INVITATION_-_ANA_&_BRUNO.jpg"
        );
        assert_eq!(default_file_name("  ", ExportFormat::Pdf), "design.pdf");
    }

    #[test]
    fn test_fallback_to_reduced_fidelity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let project = project_with(&[]);
        export_project(&ReducedOnly, &project, ExportFormat::Png, &path).unwrap();
        let written = image::open(&path).unwrap().to_rgba8();
        assert_eq!(written.get_pixel(0, 0).0, [1, 2, 3, 255]);
    }

    #[test]
    fn test_total_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        let project = project_with(&[]);
        let result = export_project(
            &FailingRasterizer { fail_full: true },
            &project,
            ExportFormat::Jpeg,
            &path,
        );
        assert!(matches!(result, Err(ExportError::Rasterize(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_flat_raster_size_and_content() {
        let project = project_with(&[
            ElementKind::Shape(ShapeKind::Rect),
            ElementKind::Chip(ChipKind::Confirmed),
        ]);
        let raster = FlatRasterizer
            .rasterize(&project, &RasterOptions::reduced())
            .unwrap();
        assert_eq!(raster.dimensions(), (2160, 2160));
        // Corner is blank, the center is covered by the chip on top.
        assert_eq!(raster.get_pixel(0, 0).0, [255, 255, 255, 255]);
        let chip_edge = raster.get_pixel(1080, 1080 - 300).0;
        assert_eq!(&chip_edge[..3], &[0x16, 0xA3, 0x4A]);
        // The rectangle shows outside the chip.
        let rect = raster.get_pixel(1080, 1080 - 450).0;
        assert_eq!(&rect[..3], &[0xF9, 0x73, 0x16]);
    }

    #[test]
    fn test_missing_background_fails_full_only() {
        let mut project = project_with(&[]);
        project.background.image = "/definitely/not/here.png".into();
        assert!(FlatRasterizer.rasterize(&project, &RasterOptions::full()).is_err());
        assert!(FlatRasterizer.rasterize(&project, &RasterOptions::reduced()).is_ok());
    }

    #[test]
    fn test_pdf_structure() {
        let project = project_with(&[ElementKind::QrCode]);
        let bytes = render(&FlatRasterizer, &project, ExportFormat::Pdf, &RasterOptions::reduced()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(bytes.ends_with(b"%%EOF\n"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/MediaBox [0 0 1080 1080]"));
        assert!(text.contains("/Width 2160 /Height 2160"));
        assert!(text.contains("/Filter /DCTDecode"));
    }

    #[test]
    fn test_qr_payload() {
        let url = crate::io::clipboard::qr_image_url("https://x.example/#/a?token=t").unwrap();
        assert_eq!(qr_payload(url.as_str()).as_deref(), Some("https://x.example/#/a?token=t"));
        assert_eq!(qr_payload("https://example.com/plain.png"), None);
        assert_eq!(qr_payload("HELLO"), Some("HELLO".to_string()));
        assert_eq!(qr_payload(""), None);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#F97316"), [0xF9, 0x73, 0x16]);
        assert_eq!(parse_hex_color("#fff"), [255, 255, 255]);
        assert_eq!(parse_hex_color("teal"), [0, 0, 0]);
        assert_eq!(parse_hex_color("#1\u{e9}234"), [0, 0, 0]);
        assert_eq!(parse_hex_color("#\u{e9}\u{e9}\u{e9}"), [0, 0, 0]);
        assert_eq!(parse_hex_color("+f+f+f"), [0, 0, 0]);
    }

    #[test]
    fn test_oversized_canvas_is_refused() {
        let mut project = DesignState::new().snapshot();
        project.canvas_size.width = u32::MAX / 2 + 1;
        let err = FlatRasterizer
            .rasterize(&project, &RasterOptions::full())
            .unwrap_err();
        assert!(matches!(err, ExportError::Rasterize(_)));

        project.canvas_size.width = MAX_SURFACE_SIDE;
        assert!(matches!(
            surface_size(&project, 2),
            Err(ExportError::Rasterize(_))
        ));
        project.canvas_size.width = 1080;
        assert_eq!(surface_size(&project, 2).unwrap().0, 2160);
    }

    #[test]
    fn test_pdf_escape() {
        assert_eq!(pdf_escape("A (B) \\ C"), "A \\(B\\) \\\\ C");
    }
}
