// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! The window is a thin shell around [`Designer`]: it lays out the panels,
//! forwards input, drives the designer's timers once per frame and reacts
//! to active-event changes published by the [`EventRegistry`].

use crate::config::Cli;
use crate::designer::{Designer, NoticeLevel};
use crate::io::autosave::AutosaveStatus;
use crate::io::export::{default_file_name, file_stem, ExportFormat};
use crate::io::store::KeyValueStore;
use crate::io::{media, serialization, share};
use crate::models::element::{ElementKind, ShapeKind};
use crate::models::event::{Event, EventRegistry};
use crate::models::guest::{load_guests, Guest};
use crate::models::project::CanvasPreset;
use crate::util::geometry::Point;
use crate::ui::{canvas, properties, toolbar};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// State of the share window.
#[derive(Default)]
struct ShareDialog {
    open: bool,
    guests: Vec<Guest>,
    selected: Option<usize>,
    message: String,
}

/// Main application state.
pub struct DesignerApp {
    designer: Designer,

    /// Events and the active-event pointer
    registry: EventRegistry,

    /// Active-event changes published by the registry
    event_changes: Receiver<Option<Event>>,

    /// Base URL of invitation links
    site_url: String,

    textures: canvas::TextureCache,
    share: ShareDialog,
}

impl DesignerApp {
    pub fn new(store: Arc<dyn KeyValueStore>, cli: &Cli) -> Self {
        let mut registry = EventRegistry::load(store.as_ref()).unwrap_or_else(|e| {
            log::error!("Failed to load events: {}", e);
            EventRegistry::default()
        });

        let (sender, event_changes) = channel();
        registry.subscribe(move |event| {
            let _ = sender.send(event.cloned());
        });

        let initial = cli
            .event
            .clone()
            .or_else(|| registry.events().first().map(|e| e.id.clone()));
        if let Some(id) = initial {
            if !registry.set_active(Some(id.as_str())) {
                log::warn!("Event {} is not registered", id);
            }
        }

        Self {
            designer: Designer::new(store, cli.autosave_window()),
            registry,
            event_changes,
            site_url: cli.site_url.clone(),
            textures: canvas::TextureCache::default(),
            share: ShareDialog::default(),
        }
    }

    /// Apply active-event changes from the registry.
    fn process_event_changes(&mut self, now: Instant) {
        while let Ok(event) = self.event_changes.try_recv() {
            if !self.designer.switch_event(event, now) {
                // Keep the registry pointing at the event still on screen.
                let current = self.designer.event().map(|e| e.id.clone());
                self.registry.set_active(current.as_deref());
            }
            self.share = ShareDialog::default();
        }
    }

    fn pick_image() -> Option<std::path::PathBuf> {
        rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "webp", "bmp", "gif"])
            .pick_file()
    }

    fn export_design(&mut self, format: ExportFormat, now: Instant) {
        let file_name = default_file_name(self.designer.design().project_name(), format);
        if let Some(path) = rfd::FileDialog::new()
            .add_filter(format.label(), &[format.extension()])
            .set_file_name(file_name)
            .save_file()
        {
            self.designer.start_export(format, path, now);
        }
    }

    fn save_project_file(&mut self, now: Instant) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .add_filter("YAML", &["yaml", "yml"])
            .set_file_name(format!("{}.json", file_stem(self.designer.design().project_name())))
            .save_file()
        {
            match serialization::export_project(&self.designer.design().snapshot(), &path) {
                Ok(()) => self.designer.notify(NoticeLevel::Success, format!("Saved {}", path.display()), now),
                Err(e) => {
                    log::error!("Failed to write project file: {:#}", e);
                    self.designer.notify(NoticeLevel::Error, format!("{e:#}"), now);
                }
            }
        }
    }

    fn open_project_file(&mut self, now: Instant) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Project files", &["json", "yaml", "yml"])
            .pick_file()
        {
            match serialization::import_project(&path) {
                Ok(project) => {
                    self.textures.clear();
                    self.designer.import_project(project, now);
                }
                Err(e) => {
                    log::error!("Failed to read project file: {:#}", e);
                    self.designer.notify(NoticeLevel::Error, format!("{e:#}"), now);
                }
            }
        }
    }

    fn open_share_dialog(&mut self, now: Instant) {
        let Some(event) = self.designer.event() else {
            self.designer.notify(NoticeLevel::Info, "Select an event first", now);
            return;
        };
        match load_guests(self.designer.store(), &event.id) {
            Ok(guests) => {
                self.share = ShareDialog {
                    open: true,
                    guests,
                    selected: None,
                    message: String::new(),
                };
            }
            Err(e) => {
                log::error!("Failed to load guests: {}", e);
                self.designer.notify(NoticeLevel::Error, format!("Could not load guests: {e}"), now);
            }
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context, now: Instant) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Project File...").clicked() {
                        ui.close_menu();
                        self.open_project_file(now);
                    }
                    if ui.button("Save Project File...").clicked() {
                        ui.close_menu();
                        self.save_project_file(now);
                    }
                    ui.separator();
                    let exporting = self.designer.is_exporting();
                    for format in [ExportFormat::Jpeg, ExportFormat::Png, ExportFormat::Pdf] {
                        let label = format!("Export {}...", format.label());
                        if ui.add_enabled(!exporting, egui::Button::new(label)).clicked() {
                            ui.close_menu();
                            self.export_design(format, now);
                        }
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    if ui.button("Paste Guest (Ctrl+V)").clicked() {
                        ui.close_menu();
                        self.designer.paste_bundle(now);
                    }
                    let has_selection = self.designer.design().selected_id().is_some();
                    if ui.add_enabled(has_selection, egui::Button::new("Delete Selected")).clicked() {
                        ui.close_menu();
                        self.designer.remove_selected(now);
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.button("Zoom In").clicked() {
                        self.designer.zoom_in();
                        ui.close_menu();
                    }
                    if ui.button("Zoom Out").clicked() {
                        self.designer.zoom_out();
                        ui.close_menu();
                    }
                    if ui.button("Reset Pan").clicked() {
                        self.designer.reset_pan();
                        ui.close_menu();
                    }
                });
            });
        });
    }

    fn top_bar(&mut self, ctx: &egui::Context, now: Instant) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = 8.0;

                // Event selection
                let active = self.registry.active().map(|e| e.couple_names.clone());
                let mut chosen: Option<String> = None;
                egui::ComboBox::from_id_source("event")
                    .selected_text(active.unwrap_or_else(|| "No event".to_string()))
                    .show_ui(ui, |ui| {
                        for event in self.registry.events() {
                            let selected = self.designer.event().map(|e| e.id == event.id).unwrap_or(false);
                            if ui.selectable_label(selected, &event.couple_names).clicked() {
                                chosen = Some(event.id.clone());
                            }
                        }
                    });
                if let Some(id) = chosen {
                    self.registry.set_active(Some(id.as_str()));
                }

                ui.separator();

                let mut name = self.designer.design().project_name().to_string();
                if ui
                    .add(egui::TextEdit::singleline(&mut name).desired_width(260.0))
                    .changed()
                {
                    self.designer.set_project_name(&name, now);
                }

                let current = self.designer.design().canvas_size().clone();
                egui::ComboBox::from_id_source("canvas_size")
                    .selected_text(format!("{} ({}×{})", current.name, current.width, current.height))
                    .show_ui(ui, |ui| {
                        for preset in CanvasPreset::ALL {
                            let (w, h) = preset.dimensions();
                            let selected = current.width == w && current.height == h;
                            let label = format!("{} ({}×{})", preset.label(), w, h);
                            if ui.selectable_label(selected, label).clicked() {
                                self.designer.set_canvas_preset(preset, now);
                            }
                        }
                    });

                ui.separator();

                if ui.button("−").on_hover_text("Zoom out").clicked() {
                    self.designer.zoom_out();
                }
                ui.label(format!("{:.0}%", self.designer.viewport().zoom() * 100.0));
                if ui.button("+").on_hover_text("Zoom in").clicked() {
                    self.designer.zoom_in();
                }
                let panned = self.designer.viewport().pan() != Point::ZERO;
                if ui
                    .add_enabled(panned, egui::Button::new("⟲"))
                    .on_hover_text("Reset pan")
                    .clicked()
                {
                    self.designer.reset_pan();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let exporting = self.designer.is_exporting();
                    if ui.add_enabled(!exporting, egui::Button::new("Export PDF")).clicked() {
                        self.export_design(ExportFormat::Pdf, now);
                    }
                    if ui.add_enabled(!exporting, egui::Button::new("Export JPEG")).clicked() {
                        self.export_design(ExportFormat::Jpeg, now);
                    }
                    if ui.add_enabled(!exporting, egui::Button::new("💾 Save")).clicked() {
                        self.designer.save_now(now);
                    }
                    if ui.button("📤 Share").clicked() {
                        self.open_share_dialog(now);
                    }

                    if exporting {
                        ui.spinner();
                        ui.label("Exporting...");
                    } else if self.designer.event().is_some() {
                        let (text, color) = match self.designer.autosave_status() {
                            AutosaveStatus::Saved => ("Saved", egui::Color32::from_rgb(0x16, 0xA3, 0x4A)),
                            AutosaveStatus::Pending => ("Unsaved changes", egui::Color32::from_gray(160)),
                            AutosaveStatus::Failed => ("Save failed", egui::Color32::from_rgb(0xEF, 0x44, 0x44)),
                        };
                        ui.label(egui::RichText::new(text).color(color));
                    } else {
                        ui.label(egui::RichText::new("Not saved: no event").weak());
                    }
                });
            });
        });
    }

    fn share_window(&mut self, ctx: &egui::Context, now: Instant) {
        if !self.share.open {
            return;
        }
        let mut open = true;
        let mut send = false;
        let mut stage = false;

        egui::Window::new("Share invitation")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                if self.share.guests.is_empty() {
                    ui.label("This event has no guests yet.");
                    return;
                }
                let event_name = self
                    .designer
                    .event()
                    .map(|e| e.couple_names.clone())
                    .unwrap_or_default();
                egui::ScrollArea::vertical().max_height(220.0).show(ui, |ui| {
                    for (i, guest) in self.share.guests.iter().enumerate() {
                        let label = match &guest.phone {
                            Some(phone) => format!("{} · {}", guest.name, phone),
                            None => format!("{} · no phone", guest.name),
                        };
                        if ui.selectable_label(self.share.selected == Some(i), label).clicked() {
                            self.share.selected = Some(i);
                            self.share.message = share::default_message(guest, &event_name);
                        }
                    }
                });
                ui.separator();
                ui.add_enabled(
                    self.share.selected.is_some(),
                    egui::TextEdit::multiline(&mut self.share.message).desired_rows(3),
                );
                ui.horizontal(|ui| {
                    let ready = self.share.selected.is_some();
                    send = ui.add_enabled(ready, egui::Button::new("Send via WhatsApp")).clicked();
                    stage = ui
                        .add_enabled(ready, egui::Button::new("Copy to designer"))
                        .on_hover_text("Stage this guest for Paste Guest")
                        .clicked();
                });
            });

        let guest = self.share.selected.and_then(|i| self.share.guests.get(i)).cloned();
        if let Some(guest) = guest {
            if send {
                let message = self.share.message.clone();
                if let Some(url) = self.designer.share_link(&guest, &message, &self.site_url, now) {
                    ctx.open_url(egui::OpenUrl::new_tab(url.as_str()));
                }
            }
            if stage {
                self.designer.stage_bundle(&guest, &self.site_url, now);
            }
        }
        self.share.open = open;
    }

    fn notices(&mut self, ctx: &egui::Context) {
        if self.designer.notices().is_empty() {
            return;
        }
        let mut dismissed = None;
        egui::Area::new(egui::Id::new("notices"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -16.0))
            .show(ctx, |ui| {
                for (i, notice) in self.designer.notices().iter().enumerate() {
                    let fill = match notice.level {
                        NoticeLevel::Info => egui::Color32::from_rgb(0x33, 0x41, 0x55),
                        NoticeLevel::Success => egui::Color32::from_rgb(0x15, 0x80, 0x3D),
                        NoticeLevel::Error => egui::Color32::from_rgb(0xB9, 0x1C, 0x1C),
                    };
                    egui::Frame::popup(ui.style()).fill(fill).show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.label(egui::RichText::new(&notice.message).color(egui::Color32::WHITE));
                            if ui.small_button("✕").clicked() {
                                dismissed = Some(i);
                            }
                        });
                    });
                }
            });
        if let Some(i) = dismissed {
            self.designer.dismiss_notice(i);
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context, now: Instant) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let (delete, save, paste, zoom_in, zoom_out) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace),
                i.modifiers.command && i.key_pressed(egui::Key::S),
                i.modifiers.command && i.key_pressed(egui::Key::V),
                i.modifiers.command && (i.key_pressed(egui::Key::Plus) || i.key_pressed(egui::Key::Equals)),
                i.modifiers.command && i.key_pressed(egui::Key::Minus),
            )
        });
        if delete {
            self.designer.remove_selected(now);
        }
        if save {
            self.designer.save_now(now);
        }
        if paste {
            self.designer.paste_bundle(now);
        }
        if zoom_in {
            self.designer.zoom_in();
        }
        if zoom_out {
            self.designer.zoom_out();
        }
    }

    fn apply_picture(&mut self, now: Instant) {
        if let Some(path) = Self::pick_image() {
            self.designer.set_selected_picture(media::reference_for(&path), now);
        }
    }
}

impl eframe::App for DesignerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.process_event_changes(now);

        self.menu_bar(ctx, now);
        self.top_bar(ctx, now);

        // Element palette (left side)
        let selection = self.designer.design().selected_element().map(|e| e.kind);
        let takes_picture = selection.map_or(false, |kind| {
            kind.is_pictorial() || matches!(kind, ElementKind::Shape(s) if s != ShapeKind::Heart)
        });
        let toolbar_action = egui::SidePanel::left("palette")
            .default_width(180.0)
            .show(ctx, |ui| toolbar::show(ui, selection.is_some(), takes_picture))
            .inner;
        match toolbar_action {
            toolbar::ToolbarAction::Add(kind) => {
                self.designer.add_element(kind, Default::default(), now);
            }
            toolbar::ToolbarAction::PasteBundle => {
                self.designer.paste_bundle(now);
            }
            toolbar::ToolbarAction::PickPicture => self.apply_picture(now),
            toolbar::ToolbarAction::DeleteSelected => {
                self.designer.remove_selected(now);
            }
            toolbar::ToolbarAction::None => {}
        }

        // Properties panel (right side)
        let properties_action = egui::SidePanel::right("properties")
            .default_width(260.0)
            .show(ctx, |ui| properties::show(ui, self.designer.design()))
            .inner;
        match properties_action {
            properties::PropertiesAction::Patch(patch) => {
                self.designer.update_selected(&patch, now);
            }
            properties::PropertiesAction::NudgeScale(delta) => {
                self.designer.nudge_selected_scale(delta, now);
            }
            properties::PropertiesAction::Delete => {
                self.designer.remove_selected(now);
            }
            properties::PropertiesAction::Background(background) => {
                self.designer.set_background(background, now);
            }
            properties::PropertiesAction::PickBackground => {
                if let Some(path) = Self::pick_image() {
                    let mut background = self.designer.design().background().clone();
                    background.image = media::reference_for(&path);
                    self.designer.set_background(background, now);
                }
            }
            properties::PropertiesAction::None => {}
        }

        // Main canvas (center)
        let canvas_actions = egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| canvas::show(ui, &self.designer, &mut self.textures))
            .inner;
        for action in canvas_actions {
            match action {
                canvas::CanvasAction::PointerDown(target, screen) => {
                    self.designer.pointer_down(target, screen, now);
                }
                canvas::CanvasAction::PointerMove(screen) => {
                    self.designer.pointer_move(screen, now);
                }
                canvas::CanvasAction::PointerUp => self.designer.pointer_up(),
            }
        }

        self.handle_keys(ctx, now);
        self.share_window(ctx, now);
        self.designer.tick(now);
        self.notices(ctx);

        // Wake up for the next autosave or notice expiry
        if self.designer.is_exporting() {
            ctx.request_repaint_after(Duration::from_millis(100));
        } else if let Some(deadline) = self.designer.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        // Write anything the debounce is still holding.
        self.designer.switch_event(None, Instant::now());
    }
}
