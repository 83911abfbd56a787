// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Property panel.
//!
//! Edits of the selected element are returned as patches; the panel never
//! mutates the design itself. With nothing selected it shows the project
//! background settings.

use crate::io::export::parse_hex_color;
use crate::models::element::{
    Element, ElementKind, ElementPatch, FontStyle, ShapeKind, TextAlign, TextTransform, FONT_FAMILIES,
    FONT_SIZE_STEP, MAX_FONT_SIZE, MIN_FONT_SIZE, SCALE_STEP,
};
use crate::models::project::{Background, DesignState};

pub const MAX_ROTATION: f64 = 180.0;
pub const MAX_BORDER_RADIUS: f64 = 1000.0;

/// Result of property panel interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertiesAction {
    None,
    Patch(ElementPatch),
    NudgeScale(f64),
    Delete,
    Background(Background),
    PickBackground,
}

/// Font size after one step button press.
pub fn step_font_size(current: f64, delta: f64) -> f64 {
    (current + delta).clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

fn hex(rgb: [u8; 3]) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2])
}

/// Display the property panel.
pub fn show(ui: &mut egui::Ui, design: &DesignState) -> PropertiesAction {
    match design.selected_element() {
        Some(element) => element_section(ui, element),
        None => background_section(ui, design.background()),
    }
}

fn element_section(ui: &mut egui::Ui, element: &Element) -> PropertiesAction {
    let mut action = PropertiesAction::None;
    let mut patch = ElementPatch::default();

    ui.horizontal(|ui| {
        ui.heading(element.kind.label());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("🗑").on_hover_text("Delete element").clicked() {
                action = PropertiesAction::Delete;
            }
        });
    });
    ui.separator();

    egui::ScrollArea::vertical().show(ui, |ui| {
        if element.kind.is_textual() && element.kind != ElementKind::Shape(ShapeKind::Heart) {
            ui.label("Text");
            let mut content = element.content.clone();
            if ui
                .add(egui::TextEdit::multiline(&mut content).desired_rows(3))
                .changed()
            {
                patch.content = Some(content);
            }

            ui.add_space(4.0);
            let current_family = FONT_FAMILIES
                .iter()
                .find(|(_, value)| *value == element.font_family)
                .map_or(element.font_family.as_str(), |(label, _)| *label);
            egui::ComboBox::from_label("Font")
                .selected_text(current_family)
                .show_ui(ui, |ui| {
                    for (label, value) in FONT_FAMILIES {
                        if ui.selectable_label(element.font_family == value, label).clicked() {
                            patch.font_family = Some(value.to_string());
                        }
                    }
                });

            ui.horizontal(|ui| {
                ui.label("Size");
                if ui.small_button("−").clicked() {
                    patch.font_size = Some(step_font_size(element.font_size, -FONT_SIZE_STEP));
                }
                ui.label(format!("{:.0}", element.font_size));
                if ui.small_button("+").clicked() {
                    patch.font_size = Some(step_font_size(element.font_size, FONT_SIZE_STEP));
                }
            });

            ui.horizontal(|ui| {
                for (label, transform) in [
                    ("Aa", TextTransform::None),
                    ("AA", TextTransform::Uppercase),
                    ("aa", TextTransform::Lowercase),
                ] {
                    if ui.selectable_label(element.text_transform == transform, label).clicked() {
                        patch.text_transform = Some(transform);
                    }
                }
                ui.separator();
                let italic = element.font_style == FontStyle::Italic;
                if ui.selectable_label(italic, egui::RichText::new("I").italics()).clicked() {
                    patch.font_style = Some(if italic { FontStyle::Normal } else { FontStyle::Italic });
                }
            });

            ui.horizontal(|ui| {
                for (label, align) in [
                    ("⬅", TextAlign::Left),
                    ("⬌", TextAlign::Center),
                    ("➡", TextAlign::Right),
                ] {
                    if ui.selectable_label(element.text_align == align, label).clicked() {
                        patch.text_align = Some(align);
                    }
                }
            });
            ui.separator();
        }

        ui.horizontal(|ui| {
            ui.label("Scale");
            if ui.small_button("−").clicked() {
                action = PropertiesAction::NudgeScale(-SCALE_STEP);
            }
            ui.label(format!("{:.1}×", element.scale));
            if ui.small_button("+").clicked() {
                action = PropertiesAction::NudgeScale(SCALE_STEP);
            }
        });

        let mut rotation = element.rotation;
        if ui
            .add(egui::Slider::new(&mut rotation, -MAX_ROTATION..=MAX_ROTATION).text("Rotation").suffix("°"))
            .changed()
        {
            patch.rotation = Some(rotation);
        }

        if !matches!(element.kind, ElementKind::Text) {
            let mut radius = element.border_radius;
            if ui
                .add(egui::Slider::new(&mut radius, 0.0..=MAX_BORDER_RADIUS).text("Corners"))
                .changed()
            {
                patch.border_radius = Some(radius);
            }
        }

        let mut opacity = element.opacity;
        if ui
            .add(egui::Slider::new(&mut opacity, 0.0..=1.0).text("Opacity"))
            .changed()
        {
            patch.opacity = Some(opacity);
        }

        if !element.kind.is_pictorial() {
            ui.horizontal(|ui| {
                ui.label("Color");
                let mut rgb = parse_hex_color(&element.color);
                if ui.color_edit_button_srgb(&mut rgb).changed() {
                    patch.color = Some(hex(rgb));
                }
            });
        }

        ui.separator();
        ui.label(
            egui::RichText::new(format!(
                "x {:.0}  y {:.0}  {:.0}×{:.0}  z {}",
                element.x, element.y, element.width, element.height, element.z_index
            ))
            .weak(),
        );
    });

    if action == PropertiesAction::None && !patch.is_empty() {
        action = PropertiesAction::Patch(patch);
    }
    action
}

fn background_section(ui: &mut egui::Ui, background: &Background) -> PropertiesAction {
    let mut action = PropertiesAction::None;
    ui.heading("Background");
    ui.separator();

    if background.image.is_empty() {
        ui.label(egui::RichText::new("No background image").weak());
    } else {
        ui.label(crate::io::media::abbreviate(&background.image));
    }
    ui.horizontal(|ui| {
        if ui.button("📂 Choose...").clicked() {
            action = PropertiesAction::PickBackground;
        }
        if ui
            .add_enabled(!background.image.is_empty(), egui::Button::new("Clear"))
            .clicked()
        {
            action = PropertiesAction::Background(Background {
                image: String::new(),
                ..background.clone()
            });
        }
    });

    let mut edited = background.clone();
    let opacity = ui.add(egui::Slider::new(&mut edited.opacity, 0.0..=1.0).text("Opacity"));
    let scale = ui.add(egui::Slider::new(&mut edited.scale, 0.5..=3.0).text("Scale"));
    if opacity.changed() || scale.changed() {
        action = PropertiesAction::Background(edited);
    }

    ui.add_space(8.0);
    ui.label(egui::RichText::new("Click an element to edit it").weak());
    action
}
