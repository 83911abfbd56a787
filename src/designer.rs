// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Designer session.
//!
//! [`Designer`] owns everything the canvas screen works with: the design of
//! the active event, the viewport, the pointer state machine, the autosave
//! and the export worker. The UI calls into it with the current time and
//! renders its state; nothing here depends on egui.
//!
//! Every error raised by a user action ends up as a [`Notice`]. None of
//! them end the session.

use crate::interaction::{InteractionController, PointerTarget};
use crate::io::autosave::{Autosave, AutosaveStatus, SaveOutcome};
use crate::io::clipboard::{self, ClipboardError, GuestBundle};
use crate::io::export::{self, ExportError, ExportFormat, FlatRasterizer, Rasterizer};
use crate::io::share;
use crate::io::store::{KeyValueStore, ProjectRepository};
use crate::models::element::{ElementKind, ElementPatch, ShapeKind};
use crate::models::event::Event;
use crate::models::guest::Guest;
use crate::models::project::{Background, CanvasPreset, DesignState, ProjectData};
use crate::util::geometry::Point;
use crate::util::viewport::Viewport;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// How long a notice stays on screen.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Transient feedback shown to the user.
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    expires: Instant,
}

/// A running export.
struct ExportJob {
    format: ExportFormat,
    receiver: Receiver<Result<PathBuf, ExportError>>,
}

pub struct Designer {
    store: Arc<dyn KeyValueStore>,
    rasterizer: Arc<dyn Rasterizer>,
    design: DesignState,
    viewport: Viewport,
    interaction: InteractionController,
    autosave: Autosave,
    event: Option<Event>,
    /// Design revision the autosave has already been told about.
    seen_revision: u64,
    notices: Vec<Notice>,
    export: Option<ExportJob>,
}

impl Designer {
    pub fn new(store: Arc<dyn KeyValueStore>, autosave_window: Duration) -> Self {
        let design = DesignState::new();
        let seen_revision = design.revision();
        Self {
            store,
            rasterizer: Arc::new(FlatRasterizer),
            design,
            viewport: Viewport::default(),
            interaction: InteractionController::default(),
            autosave: Autosave::new(autosave_window),
            event: None,
            seen_revision,
            notices: Vec::new(),
            export: None,
        }
    }

    /// Use a different rasterizer for exports.
    #[cfg(test)]
    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    pub fn design(&self) -> &DesignState {
        &self.design
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    pub fn event(&self) -> Option<&Event> {
        self.event.as_ref()
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn is_exporting(&self) -> bool {
        self.export.is_some()
    }

    pub fn autosave_status(&self) -> AutosaveStatus {
        self.autosave.status()
    }

    /// Earliest instant at which [`Designer::tick`] has something to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        let notice = self.notices.iter().map(|n| n.expires).min();
        match (self.autosave.debouncer().deadline(), notice) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>, now: Instant) {
        self.notices.push(Notice {
            level,
            message: message.into(),
            expires: now + NOTICE_TTL,
        });
    }

    pub fn dismiss_notice(&mut self, index: usize) {
        if index < self.notices.len() {
            self.notices.remove(index);
        }
    }

    /// Make `event` the active one.
    ///
    /// A pending autosave for the previous event is written first. If that
    /// write fails the switch is refused and `false` is returned, so no edit
    /// can leak into the wrong event.
    pub fn switch_event(&mut self, event: Option<Event>, now: Instant) -> bool {
        let next_id = event.as_ref().map(|e| e.id.as_str());
        if self.event.as_ref().map(|e| e.id.as_str()) == next_id {
            self.event = event;
            return true;
        }

        self.sync_revision(now);
        if let Some(current) = &self.event {
            if let Err(e) = self.autosave.flush(self.store.as_ref(), &current.id, &self.design) {
                log::error!("Could not save {} before switching: {}", current.id, e);
                let message = format!("Could not save the current design: {e}");
                self.notify(NoticeLevel::Error, message, now);
                return false;
            }
        }
        self.interaction.cancel();

        match &event {
            Some(next) => self.load_event(next, now),
            None => {
                self.autosave.mark_loaded(None);
                log::info!("No active event, design is no longer saved");
            }
        }
        self.event = event;
        self.seen_revision = self.design.revision();
        true
    }

    fn load_event(&mut self, event: &Event, now: Instant) {
        match ProjectRepository::new(self.store.as_ref()).get(&event.id) {
            Ok(Some(project)) => {
                log::info!(
                    "Loaded design {:?} for {} ({} elements)",
                    project.project_name,
                    event.id,
                    project.elements.len()
                );
                self.design.replace_with(project);
                self.autosave.mark_loaded(Some(&self.design.snapshot()));
            }
            Ok(None) => {
                log::info!("No design stored for {}, starting a new one", event.id);
                self.design.reset(event.default_project_name());
                self.autosave.mark_loaded(None);
            }
            Err(e) => {
                log::error!("Failed to load design for {}: {}", event.id, e);
                self.design.reset(event.default_project_name());
                self.autosave.mark_loaded(None);
                self.notify(NoticeLevel::Error, format!("Stored design is unreadable: {e}"), now);
            }
        }
    }

    /// Tell the autosave about edits made since the last call.
    fn sync_revision(&mut self, now: Instant) {
        let revision = self.design.revision();
        if revision == self.seen_revision {
            return;
        }
        self.seen_revision = revision;
        if self.event.is_some() {
            log::debug!("Design changed (revision {}), autosave scheduled", revision);
            self.autosave.note_change(now);
        }
    }

    pub fn add_element(&mut self, kind: ElementKind, overrides: ElementPatch, now: Instant) -> String {
        let id = self.design.add_element(kind, overrides);
        log::debug!("Added {} element {}", kind.label(), id);
        self.sync_revision(now);
        id
    }

    pub fn update_selected(&mut self, patch: &ElementPatch, now: Instant) -> bool {
        let changed = self.design.update_selected(patch);
        self.sync_revision(now);
        changed
    }

    pub fn nudge_selected_scale(&mut self, delta: f64, now: Instant) -> bool {
        let changed = self.design.nudge_selected_scale(delta);
        self.sync_revision(now);
        changed
    }

    pub fn remove_selected(&mut self, now: Instant) -> bool {
        let removed = self.design.remove_selected();
        self.sync_revision(now);
        removed
    }

    /// Put a picked image on the selected element: shapes take it as a
    /// fill, images and QR codes as their content.
    pub fn set_selected_picture(&mut self, reference: String, now: Instant) -> bool {
        let Some(kind) = self.design.selected_element().map(|e| e.kind) else {
            return false;
        };
        let patch = match kind {
            ElementKind::Shape(ShapeKind::Rect | ShapeKind::Circle) => ElementPatch {
                image_content: Some(reference),
                ..Default::default()
            },
            ElementKind::Image | ElementKind::QrCode => ElementPatch::content(reference),
            _ => {
                self.notify(NoticeLevel::Info, "This element cannot hold an image", now);
                return false;
            }
        };
        self.update_selected(&patch, now)
    }

    pub fn pointer_down(&mut self, target: PointerTarget, screen: Point, now: Instant) {
        self.interaction
            .pointer_down(target, screen, &mut self.design, &self.viewport);
        self.sync_revision(now);
    }

    pub fn pointer_move(&mut self, screen: Point, now: Instant) -> bool {
        let changed = self
            .interaction
            .pointer_move(screen, &mut self.design, &mut self.viewport);
        self.sync_revision(now);
        changed
    }

    pub fn pointer_up(&mut self) {
        self.interaction.pointer_up();
    }

    /// Zoom controls are ignored while an element is being dragged.
    pub fn zoom_in(&mut self) -> bool {
        if self.interaction.is_dragging() {
            return false;
        }
        self.viewport.zoom_in();
        true
    }

    pub fn zoom_out(&mut self) -> bool {
        if self.interaction.is_dragging() {
            return false;
        }
        self.viewport.zoom_out();
        true
    }

    pub fn reset_pan(&mut self) {
        self.viewport.reset_pan();
    }

    /// Switch the canvas size and restore the default zoom for it.
    pub fn set_canvas_preset(&mut self, preset: CanvasPreset, now: Instant) {
        let size = preset.size();
        self.viewport.fit_canvas(&size);
        self.design.set_canvas_size(size);
        self.sync_revision(now);
    }

    pub fn set_project_name(&mut self, name: &str, now: Instant) {
        self.design.set_project_name(name);
        self.sync_revision(now);
    }

    pub fn set_background(&mut self, background: Background, now: Instant) {
        self.design.set_background(background);
        self.sync_revision(now);
    }

    /// Replace the design with an imported project record.
    pub fn import_project(&mut self, project: ProjectData, now: Instant) {
        self.interaction.cancel();
        self.design.replace_with(project);
        self.sync_revision(now);
        self.notify(NoticeLevel::Success, "Project imported", now);
    }

    /// Materialize the staged guest bundle.
    pub fn paste_bundle(&mut self, now: Instant) -> Option<Vec<String>> {
        match clipboard::paste_bundle(self.store.as_ref(), &mut self.design) {
            Ok((bundle, ids)) => {
                self.sync_revision(now);
                self.notify(
                    NoticeLevel::Success,
                    format!("Added invitation for {}", bundle.name.to_uppercase()),
                    now,
                );
                Some(ids)
            }
            Err(ClipboardError::Empty) | Err(ClipboardError::WrongType(_)) => {
                log::info!("Paste requested but no guest bundle is staged");
                self.notify(
                    NoticeLevel::Info,
                    "Clipboard is empty. Copy a guest bundle from the guest list first.",
                    now,
                );
                None
            }
            Err(e) => {
                log::warn!("Guest bundle could not be pasted: {}", e);
                self.notify(NoticeLevel::Error, format!("Could not paste guest: {e}"), now);
                None
            }
        }
    }

    /// Stage a bundle for `guest` of the active event.
    pub fn stage_bundle(&mut self, guest: &Guest, site_url: &str, now: Instant) -> bool {
        let Some(event) = self.event.clone() else {
            self.notify(NoticeLevel::Info, "Select an event first", now);
            return false;
        };
        let staged = GuestBundle::for_guest(&event, guest, site_url)
            .and_then(|bundle| clipboard::write_bundle(self.store.as_ref(), &bundle));
        match staged {
            Ok(()) => {
                self.notify(NoticeLevel::Success, format!("{} copied to the clipboard", guest.name), now);
                true
            }
            Err(e) => {
                self.notify(NoticeLevel::Error, format!("Could not copy guest: {e}"), now);
                false
            }
        }
    }

    /// WhatsApp link inviting `guest`, or a notice saying why there is none.
    pub fn share_link(&mut self, guest: &Guest, message: &str, site_url: &str, now: Instant) -> Option<Url> {
        let Some(event) = self.event.as_ref() else {
            self.notify(NoticeLevel::Info, "Select an event first", now);
            return None;
        };
        let token = guest.token(chrono::Utc::now().timestamp_millis());
        let link = clipboard::invitation_link(site_url, &event.slug, &token);
        match share::whatsapp_link(guest, message, &link) {
            Ok(url) => {
                log::info!("Sharing invitation with {}", guest.name);
                Some(url)
            }
            Err(e) => {
                self.notify(NoticeLevel::Error, e.to_string(), now);
                None
            }
        }
    }

    /// Write the design immediately.
    pub fn save_now(&mut self, now: Instant) -> bool {
        if self.is_exporting() {
            self.notify(NoticeLevel::Info, "Saving is disabled while exporting", now);
            return false;
        }
        let Some(event) = &self.event else {
            self.notify(NoticeLevel::Info, "Select an event first", now);
            return false;
        };
        self.seen_revision = self.design.revision();
        match self.autosave.save_now(self.store.as_ref(), &event.id, &self.design) {
            Ok(()) => {
                self.notify(NoticeLevel::Success, "Project saved", now);
                true
            }
            Err(e) => {
                log::error!("Manual save failed: {}", e);
                self.notify(NoticeLevel::Error, format!("Save failed: {e}"), now);
                false
            }
        }
    }

    /// Start exporting the design to `path` on a worker thread.
    pub fn start_export(&mut self, format: ExportFormat, path: PathBuf, now: Instant) -> bool {
        if self.is_exporting() {
            self.notify(NoticeLevel::Info, ExportError::Busy.to_string(), now);
            return false;
        }
        let project = self.design.snapshot();
        let rasterizer = Arc::clone(&self.rasterizer);
        let (sender, receiver) = channel();

        log::info!("Exporting {} to {}", format.label(), path.display());
        std::thread::spawn(move || {
            let result = export::export_project(rasterizer.as_ref(), &project, format, &path);
            let _ = sender.send(result);
        });

        self.export = Some(ExportJob { format, receiver });
        true
    }

    /// Advance timers and collect finished work.
    pub fn tick(&mut self, now: Instant) {
        self.sync_revision(now);

        if let Some(event_id) = self.event.as_ref().map(|e| e.id.clone()) {
            match self.autosave.poll(now, self.store.as_ref(), &event_id, &self.design) {
                Some(Ok(SaveOutcome::Written)) => log::info!("Autosaved design for {}", event_id),
                Some(Ok(SaveOutcome::Unchanged)) | None => {}
                Some(Err(e)) => {
                    self.notify(NoticeLevel::Error, format!("Autosave failed, will retry: {e}"), now);
                }
            }
        }

        self.poll_export(now);
        self.notices.retain(|n| n.expires > now);
    }

    fn poll_export(&mut self, now: Instant) {
        let Some(job) = &self.export else {
            return;
        };
        let format = job.format;
        let finished = match job.receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                Err(ExportError::Rasterize("export worker stopped".into()))
            }
        };
        self.export = None;
        match finished {
            Ok(path) => self.notify(
                NoticeLevel::Success,
                format!("{} saved to {}", format.label(), path.display()),
                now,
            ),
            Err(e) => self.notify(NoticeLevel::Error, format!("{} export failed: {e}", format.label()), now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::{MemoryStore, StoreError};
    use crate::models::element::ChipKind;

    const WINDOW: Duration = Duration::from_millis(1500);

    /// Store whose writes can be switched off.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        broken: std::sync::atomic::AtomicBool,
        writes: std::sync::atomic::AtomicUsize,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
            if self.broken.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(StoreError::Io {
                    path: "disk".into(),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.writes.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner.put(key, value)
        }
    }

    fn event(id: &str, names: &str) -> Event {
        Event::new(id, names)
    }

    fn designer_with(store: Arc<dyn KeyValueStore>, now: Instant) -> Designer {
        let mut designer = Designer::new(store, WINDOW);
        assert!(designer.switch_event(Some(event("a", "Ana & Bruno")), now));
        designer
    }

    #[test]
    fn test_new_event_gets_default_name() {
        let now = Instant::now();
        let designer = designer_with(Arc::new(MemoryStore::new()), now);
        assert_eq!(designer.design().project_name(), "INVITATION - ANA & BRUNO");
        assert!(designer.design().elements().is_empty());
        assert_eq!(designer.autosave_status(), AutosaveStatus::Saved);
    }

    #[test]
    fn test_rapid_edits_coalesce_into_one_write() {
        let store = Arc::new(FlakyStore::default());
        let t0 = Instant::now();
        let mut designer = designer_with(store.clone(), t0);

        let id = designer.add_element(ElementKind::Text, ElementPatch::default(), t0);
        for i in 1..=5u64 {
            let now = t0 + Duration::from_millis(200 * i);
            designer.update_selected(&ElementPatch::content(format!("DRAFT {i}")), now);
            designer.tick(now);
        }
        assert_eq!(store.writes.load(std::sync::atomic::Ordering::SeqCst), 0);

        designer.tick(t0 + Duration::from_millis(1000 + 1500));
        assert_eq!(store.writes.load(std::sync::atomic::Ordering::SeqCst), 1);

        let saved = ProjectRepository::new(store.as_ref()).get("a").unwrap().unwrap();
        let element = saved.elements.iter().find(|e| e.id == id).unwrap();
        assert_eq!(element.content, "DRAFT 5");
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let now = Instant::now();
        let mut designer = designer_with(store.clone(), now);
        designer.set_canvas_preset(CanvasPreset::HorizontalHd, now);
        designer.set_project_name("Final version", now);
        designer.add_element(ElementKind::Chip(ChipKind::Gift), ElementPatch::default(), now);
        designer.add_element(
            ElementKind::Shape(ShapeKind::Circle),
            ElementPatch {
                rotation: Some(33.0),
                opacity: Some(0.4),
                ..Default::default()
            },
            now,
        );
        designer.set_background(
            Background {
                image: "file:///tmp/bg.png".into(),
                opacity: 0.5,
                scale: 1.2,
            },
            now,
        );
        assert!(designer.save_now(now));
        let saved = designer.design().snapshot();

        let mut reopened = Designer::new(store, WINDOW);
        reopened.switch_event(Some(event("a", "Ana & Bruno")), now);
        let loaded = reopened.design().snapshot();
        assert_eq!(loaded.fingerprint().unwrap(), saved.fingerprint().unwrap());
        assert_eq!(loaded.project_name, "FINAL VERSION");
        assert_eq!(loaded.canvas_size, CanvasPreset::HorizontalHd.size());
    }

    #[test]
    fn test_switching_events_keeps_designs_apart() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let now = Instant::now();
        let mut designer = designer_with(store, now);

        let a_text = designer.add_element(ElementKind::Text, ElementPatch::content("FOR A"), now);
        let a_state = designer.design().snapshot();

        // Switching flushes A's pending change without waiting.
        assert!(designer.switch_event(Some(event("b", "Carla & Davi")), now));
        assert!(designer.design().elements().is_empty());
        designer.add_element(ElementKind::QrCode, ElementPatch::default(), now);
        designer.add_element(ElementKind::Image, ElementPatch::default(), now);

        assert!(designer.switch_event(Some(event("a", "Ana & Bruno")), now));
        let elements = designer.design().elements();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].id, a_text);
        assert_eq!(
            designer.design().snapshot().fingerprint().unwrap(),
            a_state.fingerprint().unwrap()
        );
    }

    #[test]
    fn test_event_ids_with_spaces_persist_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn KeyValueStore> =
            Arc::new(crate::io::store::FileStore::open(dir.path()).unwrap());
        let now = Instant::now();

        let mut designer = Designer::new(store.clone(), WINDOW);
        assert!(designer.switch_event(Some(event("ana wedding", "Ana & Bruno")), now));
        assert!(designer.notices().is_empty());
        let id = designer.add_element(ElementKind::Text, ElementPatch::content("SAVE THE DATE"), now);
        assert!(designer.save_now(now));
        assert_eq!(designer.autosave_status(), AutosaveStatus::Saved);

        let mut reopened = Designer::new(store, WINDOW);
        assert!(reopened.switch_event(Some(event("ana wedding", "Ana & Bruno")), now));
        assert!(reopened.notices().is_empty());
        assert_eq!(reopened.design().elements()[0].id, id);
    }

    #[test]
    fn test_failed_flush_refuses_switch() {
        let store = Arc::new(FlakyStore::default());
        let now = Instant::now();
        let mut designer = designer_with(store.clone(), now);
        designer.add_element(ElementKind::Text, ElementPatch::default(), now);

        store.broken.store(true, std::sync::atomic::Ordering::SeqCst);
        assert!(!designer.switch_event(Some(event("b", "Carla")), now));
        assert_eq!(designer.event().map(|e| e.id.as_str()), Some("a"));
        assert_eq!(designer.design().elements().len(), 1);
        assert_eq!(designer.notices()[0].level, NoticeLevel::Error);
    }

    #[test]
    fn test_autosave_failure_notifies_and_retries() {
        let store = Arc::new(FlakyStore::default());
        let t0 = Instant::now();
        let mut designer = designer_with(store.clone(), t0);
        designer.add_element(ElementKind::Text, ElementPatch::default(), t0);

        store.broken.store(true, std::sync::atomic::Ordering::SeqCst);
        let t1 = t0 + WINDOW;
        designer.tick(t1);
        assert_eq!(designer.autosave_status(), AutosaveStatus::Failed);
        assert_eq!(designer.notices().len(), 1);

        store.broken.store(false, std::sync::atomic::Ordering::SeqCst);
        designer.tick(t1 + WINDOW);
        assert_eq!(designer.autosave_status(), AutosaveStatus::Saved);
        assert_eq!(store.writes.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_clipboard_notice_expires() {
        let now = Instant::now();
        let mut designer = designer_with(Arc::new(MemoryStore::new()), now);
        assert!(designer.paste_bundle(now).is_none());
        assert!(designer.design().elements().is_empty());
        assert_eq!(designer.notices()[0].level, NoticeLevel::Info);

        designer.tick(now + Duration::from_millis(2999));
        assert_eq!(designer.notices().len(), 1);
        designer.tick(now + NOTICE_TTL);
        assert!(designer.notices().is_empty());
    }

    #[test]
    fn test_staged_bundle_pastes_three_elements() {
        let now = Instant::now();
        let mut designer = designer_with(Arc::new(MemoryStore::new()), now);
        let guest = Guest {
            id: "g1".into(),
            name: "Bia".into(),
            email: None,
            phone: None,
            guest_count: 2,
            invitation_token: Some("tok".into()),
            extra: Default::default(),
        };
        assert!(designer.stage_bundle(&guest, "http://localhost:3000", now));
        let ids = designer.paste_bundle(now).unwrap();
        assert_eq!(ids.len(), 3);
        assert!(designer.share_link(&guest, "Hi", "http://localhost:3000", now).is_none());
    }

    #[test]
    fn test_zoom_refused_mid_drag() {
        let now = Instant::now();
        let mut designer = designer_with(Arc::new(MemoryStore::new()), now);
        let id = designer.add_element(ElementKind::Text, ElementPatch::default(), now);
        designer.pointer_down(PointerTarget::Element(id), Point::new(100.0, 100.0), now);
        assert!(!designer.zoom_in());
        designer.pointer_up();
        assert!(designer.zoom_in());
    }

    #[test]
    fn test_preset_switch_restores_default_zoom() {
        let now = Instant::now();
        let mut designer = designer_with(Arc::new(MemoryStore::new()), now);
        designer.set_canvas_preset(CanvasPreset::VerticalHd, now);
        assert_eq!(designer.viewport().zoom(), 0.18);
        designer.set_canvas_preset(CanvasPreset::Square, now);
        assert_eq!(designer.viewport().zoom(), 0.25);
    }

    struct BrokenRasterizer;

    impl Rasterizer for BrokenRasterizer {
        fn rasterize(
            &self,
            _project: &ProjectData,
            _options: &export::RasterOptions,
        ) -> Result<image::RgbaImage, ExportError> {
            Err(ExportError::Rasterize("no surface".into()))
        }
    }

    fn wait_for_export(designer: &mut Designer, now: Instant) {
        for _ in 0..3000 {
            designer.tick(now);
            if !designer.is_exporting() {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_failed_export_reports_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let now = Instant::now();
        let mut designer = designer_with(Arc::new(MemoryStore::new()), now)
            .with_rasterizer(Arc::new(BrokenRasterizer));
        let path = dir.path().join("invite.pdf");
        assert!(designer.start_export(ExportFormat::Pdf, path.clone(), now));
        wait_for_export(&mut designer, now);

        assert!(!designer.is_exporting());
        assert!(!path.exists());
        assert!(designer.notices().iter().any(|n| n.level == NoticeLevel::Error));
    }

    #[test]
    fn test_export_is_exclusive() {
        let dir = tempfile::tempdir().unwrap();
        let now = Instant::now();
        let mut designer = designer_with(Arc::new(MemoryStore::new()), now);
        designer.set_canvas_preset(CanvasPreset::Square, now);
        designer.add_element(ElementKind::Chip(ChipKind::Local), ElementPatch::default(), now);

        let path = dir.path().join("invite.jpg");
        assert!(designer.start_export(ExportFormat::Jpeg, path.clone(), now));
        assert!(!designer.start_export(ExportFormat::Pdf, dir.path().join("x.pdf"), now));
        assert!(!designer.save_now(now));

        wait_for_export(&mut designer, now);
        assert!(!designer.is_exporting());
        assert!(path.exists());
        assert!(!dir.path().join("x.pdf").exists());
        assert!(designer
            .notices()
            .iter()
            .any(|n| n.level == NoticeLevel::Success));
    }
}
