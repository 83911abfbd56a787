// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Element palette.
//!
//! The left-hand panel with one button per element kind plus the guest
//! bundle paste and image pick actions.

use crate::models::element::{ChipKind, ElementKind, ShapeKind};

/// Result of palette interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    Add(ElementKind),
    PasteBundle,
    PickPicture,
    DeleteSelected,
}

const PALETTE: [(&str, ElementKind); 8] = [
    ("🅣 Text", ElementKind::Text),
    ("🖼 Image", ElementKind::Image),
    ("⬛ Rectangle", ElementKind::Shape(ShapeKind::Rect)),
    ("⚫ Circle", ElementKind::Shape(ShapeKind::Circle)),
    ("❤ Heart", ElementKind::Shape(ShapeKind::Heart)),
    ("✔ RSVP badge", ElementKind::Chip(ChipKind::Confirmed)),
    ("🎁 Gift badge", ElementKind::Chip(ChipKind::Gift)),
    ("📍 Venue badge", ElementKind::Chip(ChipKind::Local)),
];

/// Display the palette.
pub fn show(ui: &mut egui::Ui, has_selection: bool, selection_takes_picture: bool) -> ToolbarAction {
    let mut action = ToolbarAction::None;
    let button = |ui: &mut egui::Ui, label: &str| {
        ui.add_sized([ui.available_width(), 28.0], egui::Button::new(label))
    };

    ui.vertical(|ui| {
        ui.heading("Elements");
        ui.separator();

        for (label, kind) in PALETTE {
            if button(ui, label).clicked() {
                action = ToolbarAction::Add(kind);
            }
        }

        ui.add_space(8.0);
        ui.separator();
        ui.label(egui::RichText::new("Guests").strong());
        if button(ui, "📋 Paste guest")
            .on_hover_text("Add the guest copied from the guest list")
            .clicked()
        {
            action = ToolbarAction::PasteBundle;
        }

        ui.add_space(8.0);
        ui.separator();
        ui.label(egui::RichText::new("Selection").strong());
        ui.add_enabled_ui(selection_takes_picture, |ui| {
            if button(ui, "📂 Set image...").clicked() {
                action = ToolbarAction::PickPicture;
            }
        });
        ui.add_enabled_ui(has_selection, |ui| {
            if button(ui, "🗑 Delete").clicked() {
                action = ToolbarAction::DeleteSelected;
            }
        });
    });

    action
}
