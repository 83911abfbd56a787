// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Design surface.
//!
//! Paints the active design through the viewport transform and turns raw
//! pointer input into [`CanvasAction`]s for the designer. Pointer presses
//! are reported on the frame they happen, without egui's drag threshold.

use crate::designer::Designer;
use crate::interaction::PointerTarget;
use crate::io::{export, media};
use crate::models::element::{Element, ElementKind, FontStyle, TextAlign};
use crate::util::geometry::{self, Point};
use egui::{Color32, Pos2, Rect, Shape, Stroke, Vec2};
use std::collections::HashMap;

/// Pointer input on the canvas, in screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasAction {
    PointerDown(PointerTarget, Point),
    PointerMove(Point),
    PointerUp,
}

const SELECTION: Color32 = Color32::from_rgb(0x3B, 0x82, 0xF6);
const PLACEHOLDER: Color32 = Color32::from_rgb(0xCB, 0xD5, 0xE1);

/// Textures for image references and QR payloads, loaded on first use.
/// Failed loads are remembered so they are not retried every frame.
#[derive(Default)]
pub struct TextureCache {
    textures: HashMap<String, Option<egui::TextureHandle>>,
}

impl TextureCache {
    fn image(&mut self, ctx: &egui::Context, reference: &str) -> Option<egui::TextureHandle> {
        if reference.is_empty() {
            return None;
        }
        self.textures
            .entry(reference.to_string())
            .or_insert_with(|| match media::load_reference(reference) {
                Ok(image) => {
                    let size = [image.width() as usize, image.height() as usize];
                    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
                    Some(ctx.load_texture(reference, color_image, egui::TextureOptions::LINEAR))
                }
                Err(e) => {
                    log::warn!("Cannot show {}: {:#}", media::abbreviate(reference), e);
                    None
                }
            })
            .clone()
    }

    fn qr(&mut self, ctx: &egui::Context, content: &str) -> Option<egui::TextureHandle> {
        let payload = export::qr_payload(content)?;
        self.textures
            .entry(format!("qr:{payload}"))
            .or_insert_with(|| {
                let code = qrcode::QrCode::new(payload.as_bytes())
                    .map_err(|e| log::warn!("Cannot encode QR payload: {}", e))
                    .ok()?;
                let width = code.width();
                let pixels: Vec<Color32> = code
                    .to_colors()
                    .into_iter()
                    .map(|c| match c {
                        qrcode::Color::Dark => Color32::BLACK,
                        qrcode::Color::Light => Color32::WHITE,
                    })
                    .collect();
                let image = egui::ColorImage {
                    size: [width, width],
                    pixels,
                };
                Some(ctx.load_texture("qr", image, egui::TextureOptions::NEAREST))
            })
            .clone()
    }

    /// Drop everything, e.g. after the referenced files changed.
    pub fn clear(&mut self) {
        self.textures.clear();
    }
}

/// Screen position of the canvas origin when the pan offset is zero: the
/// canvas is centered in `area`.
fn canvas_origin(area: Rect, designer: &Designer) -> Point {
    let size = designer.design().canvas_size();
    let zoom = designer.viewport().zoom();
    Point::new(
        area.center().x as f64 - size.width as f64 * zoom / 2.0,
        area.center().y as f64 - size.height as f64 * zoom / 2.0,
    )
}

fn to_pos(p: Point) -> Pos2 {
    Pos2::new(p.x as f32, p.y as f32)
}

fn to_point(p: Pos2) -> Point {
    Point::new(p.x as f64, p.y as f64)
}

/// Display the canvas and collect pointer input.
pub fn show(ui: &mut egui::Ui, designer: &Designer, textures: &mut TextureCache) -> Vec<CanvasAction> {
    let mut actions = Vec::new();
    let area = ui.available_rect_before_wrap();
    let response = ui.allocate_rect(area, egui::Sense::click_and_drag());
    let painter = ui.painter_at(area);
    painter.rect_filled(area, 0.0, Color32::from_gray(40));

    let viewport = designer.viewport();
    let zoom = viewport.zoom() as f32;
    let origin = canvas_origin(area, designer);
    let design = designer.design();
    let size = design.canvas_size();

    let page = Rect::from_min_size(
        to_pos(viewport.canvas_to_screen(Point::ZERO, origin)),
        Vec2::new(size.width as f32 * zoom, size.height as f32 * zoom),
    );
    painter.rect_filled(page.translate(Vec2::splat(4.0)), 0.0, Color32::from_black_alpha(80));
    painter.rect_filled(page, 0.0, Color32::WHITE);

    let background = design.background();
    if let Some(texture) = textures.image(ui.ctx(), &background.image) {
        paint_background(&painter, page, &texture, background.scale as f32, background.opacity as f32);
    }

    let page_painter = painter.with_clip_rect(page.intersect(area));
    for element in design.paint_order() {
        paint_element(&page_painter, ui.ctx(), element, designer, origin, textures);
    }
    if let Some(selected) = design.selected_element() {
        let corners = screen_corners(selected, designer, origin);
        painter.add(Shape::closed_line(corners.to_vec(), Stroke::new(2.0, SELECTION)));
    }

    // Pointer input
    let (pressed, released, latest) = ui.input(|i| {
        (
            i.pointer.primary_pressed(),
            i.pointer.primary_released(),
            i.pointer.latest_pos(),
        )
    });
    if pressed && response.hovered() {
        if let Some(pos) = response.interact_pointer_pos().or(latest) {
            let screen = to_point(pos);
            let canvas = viewport.screen_to_canvas(screen, origin);
            let target = match design.element_at(canvas) {
                Some(element) => PointerTarget::Element(element.id.clone()),
                None => PointerTarget::Background,
            };
            actions.push(CanvasAction::PointerDown(target, screen));
        }
    }
    let active = pressed || designer.interaction().is_dragging() || designer.interaction().is_panning();
    if active {
        if let Some(pos) = latest {
            actions.push(CanvasAction::PointerMove(to_point(pos)));
        }
        if released {
            actions.push(CanvasAction::PointerUp);
        }
    }

    if designer.interaction().is_panning() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
    } else if designer.interaction().is_dragging() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Move);
    }

    if design.elements().is_empty() {
        painter.text(
            page.center(),
            egui::Align2::CENTER_CENTER,
            "Add an element from the palette",
            egui::FontId::proportional(14.0),
            Color32::from_gray(150),
        );
    }

    actions
}

fn paint_background(painter: &egui::Painter, page: Rect, texture: &egui::TextureHandle, scale: f32, opacity: f32) {
    let [w, h] = texture.size_vec2().into();
    let cover = (page.width() / w).max(page.height() / h) * scale.max(0.01);
    let rect = Rect::from_center_size(page.center(), Vec2::new(w * cover, h * cover));
    let tint = Color32::from_white_alpha((opacity.clamp(0.0, 1.0) * 255.0) as u8);
    painter
        .with_clip_rect(page)
        .image(texture.id(), rect, Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)), tint);
}

/// The element's four corners on screen, after scale and rotation.
fn screen_corners(element: &Element, designer: &Designer, origin: Point) -> [Pos2; 4] {
    let (w, h) = element.scaled_size();
    let center = geometry::element_center(element);
    let (sin, cos) = element.rotation.to_radians().sin_cos();
    [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)].map(|(sx, sy)| {
        let (dx, dy) = (sx * w / 2.0, sy * h / 2.0);
        let corner = Point::new(center.x + dx * cos - dy * sin, center.y + dx * sin + dy * cos);
        to_pos(designer.viewport().canvas_to_screen(corner, origin))
    })
}

fn color(hex: &str, opacity: f64) -> Color32 {
    let [r, g, b] = export::parse_hex_color(hex);
    Color32::from_rgba_unmultiplied(r, g, b, (opacity.clamp(0.0, 1.0) * 255.0) as u8)
}

fn chip_color(kind: ElementKind) -> &'static str {
    use crate::models::element::ChipKind;
    match kind {
        ElementKind::Chip(ChipKind::Confirmed) => "#16A34A",
        ElementKind::Chip(ChipKind::Gift) => "#F97316",
        _ => "#2563EB",
    }
}

/// Outline of a rounded rectangle centered on the origin, unrotated.
fn rounded_outline(w: f32, h: f32, radius: f32) -> Vec<Vec2> {
    let r = radius.min(w / 2.0).min(h / 2.0).max(0.0);
    if r <= 0.5 {
        return vec![
            Vec2::new(-w / 2.0, -h / 2.0),
            Vec2::new(w / 2.0, -h / 2.0),
            Vec2::new(w / 2.0, h / 2.0),
            Vec2::new(-w / 2.0, h / 2.0),
        ];
    }
    const SEGMENTS: usize = 8;
    let corners = [
        (Vec2::new(w / 2.0 - r, h / 2.0 - r), 0.0),
        (Vec2::new(-w / 2.0 + r, h / 2.0 - r), 0.5),
        (Vec2::new(-w / 2.0 + r, -h / 2.0 + r), 1.0),
        (Vec2::new(w / 2.0 - r, -h / 2.0 + r), 1.5),
    ];
    let mut points = Vec::with_capacity(corners.len() * (SEGMENTS + 1));
    for (center, start) in corners {
        for i in 0..=SEGMENTS {
            let angle = (start + 0.5 * i as f32 / SEGMENTS as f32) * std::f32::consts::PI;
            points.push(center + Vec2::new(angle.cos(), angle.sin()) * r);
        }
    }
    points
}

fn paint_element(
    painter: &egui::Painter,
    ctx: &egui::Context,
    element: &Element,
    designer: &Designer,
    origin: Point,
    textures: &mut TextureCache,
) {
    let zoom = designer.viewport().zoom() as f32;
    let (w, h) = element.scaled_size();
    let (w, h) = (w as f32 * zoom, h as f32 * zoom);
    let center = to_pos(
        designer
            .viewport()
            .canvas_to_screen(geometry::element_center(element), origin),
    );
    let rotation = egui::emath::Rot2::from_angle(element.rotation.to_radians() as f32);
    let radius = (element.border_radius * element.scale) as f32 * zoom;
    let outline: Vec<Pos2> = rounded_outline(w, h, radius)
        .into_iter()
        .map(|v| center + rotation * v)
        .collect();

    let picture = match element.kind {
        ElementKind::Image => textures.image(ctx, &element.content),
        ElementKind::QrCode => textures
            .qr(ctx, &element.content)
            .or_else(|| textures.image(ctx, &element.content)),
        ElementKind::Shape(_) => element
            .image_content
            .as_deref()
            .and_then(|reference| textures.image(ctx, reference)),
        _ => None,
    };

    match (element.kind, picture) {
        (ElementKind::Shape(crate::models::element::ShapeKind::Heart), _) => {}
        (_, Some(texture)) => {
            let tint = Color32::from_white_alpha((element.opacity.clamp(0.0, 1.0) * 255.0) as u8);
            let mut mesh = egui::Mesh::with_texture(texture.id());
            mesh.add_rect_with_uv(
                Rect::from_center_size(center, Vec2::new(w, h)),
                Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                tint,
            );
            mesh.rotate(rotation, center);
            painter.add(Shape::mesh(mesh));
        }
        (ElementKind::Image | ElementKind::QrCode, None) => {
            painter.add(Shape::convex_polygon(outline, PLACEHOLDER, Stroke::NONE));
        }
        (ElementKind::Shape(_), None) => {
            painter.add(Shape::convex_polygon(outline, color(&element.color, element.opacity), Stroke::NONE));
        }
        (ElementKind::Chip(_), None) => {
            painter.add(Shape::convex_polygon(
                outline,
                color(chip_color(element.kind), element.opacity),
                Stroke::NONE,
            ));
        }
        (ElementKind::Text, None) => {}
    }

    if element.kind.is_textual() {
        let ink = match element.kind {
            ElementKind::Chip(_) => Color32::from_white_alpha((element.opacity.clamp(0.0, 1.0) * 255.0) as u8),
            _ => color(&element.color, element.opacity),
        };
        paint_text(painter, ctx, element, center, w, zoom, rotation, ink);
    }
}

#[allow(clippy::too_many_arguments)]
fn paint_text(
    painter: &egui::Painter,
    ctx: &egui::Context,
    element: &Element,
    center: Pos2,
    width: f32,
    zoom: f32,
    rotation: egui::emath::Rot2,
    ink: Color32,
) {
    let font_size = (element.font_size * element.scale) as f32 * zoom;
    if font_size < 1.0 {
        return;
    }
    let format = egui::TextFormat {
        font_id: egui::FontId::proportional(font_size),
        color: ink,
        italics: element.font_style == FontStyle::Italic,
        ..Default::default()
    };
    let align = match element.text_align {
        TextAlign::Left => egui::Align::LEFT,
        TextAlign::Center => egui::Align::Center,
        TextAlign::Right => egui::Align::RIGHT,
    };
    let mut job = egui::text::LayoutJob::single_section(element.display_text(), format);
    job.wrap.max_width = width.max(1.0);
    job.halign = align;
    let galley = ctx.fonts(|f| f.layout_job(job));

    // Anchor the text block so its center sits on the element center.
    let anchor_x = match element.text_align {
        TextAlign::Left => -width / 2.0,
        TextAlign::Center => 0.0,
        TextAlign::Right => width / 2.0,
    };
    let offset = Vec2::new(anchor_x, -galley.size().y / 2.0);
    let pos = center + rotation * offset;
    let mut text = egui::epaint::TextShape::new(pos, galley, ink);
    text.angle = rotation.angle();
    painter.add(text);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounded_outline_stays_inside_box() {
        for radius in [0.0, 10.0, 500.0] {
            let points = rounded_outline(100.0, 60.0, radius);
            assert!(points.len() >= 4);
            for p in points {
                assert!(p.x.abs() <= 50.001 && p.y.abs() <= 30.001, "{p:?} r={radius}");
            }
        }
    }

    #[test]
    fn test_chip_colors() {
        use crate::models::element::ChipKind;
        assert_eq!(chip_color(ElementKind::Chip(ChipKind::Confirmed)), "#16A34A");
        assert_eq!(chip_color(ElementKind::Chip(ChipKind::Local)), "#2563EB");
    }
}
