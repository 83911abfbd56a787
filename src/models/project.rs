// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project state management.
//!
//! This module holds the persisted project record (elements, background,
//! canvas size and name) and the in-memory design state that the editor
//! mutates. The persisted record is the source of truth on reload; the
//! in-memory state is replaced wholesale whenever a record is loaded.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::element::{Element, ElementKind, ElementPatch, MAX_SCALE, MIN_SCALE, Z_INDEX_OFFSET};
use crate::util::geometry::{self, Point};

/// Name given to a project before anything else is known about it.
pub const UNTITLED_PROJECT: &str = "UNTITLED PROJECT";

/// Canvas dimensions in pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

/// The fixed set of canvas sizes the editor offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasPreset {
    Square,
    Stories,
    VerticalHd,
    HorizontalHd,
}

impl CanvasPreset {
    pub const ALL: [CanvasPreset; 4] = [
        CanvasPreset::Square,
        CanvasPreset::Stories,
        CanvasPreset::VerticalHd,
        CanvasPreset::HorizontalHd,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Square => "1080 x 1080 (SQUARE)",
            Self::Stories => "1080 x 1920 (STORIES 9:16)",
            Self::VerticalHd => "1500 x 2000 (VERTICAL HD)",
            Self::HorizontalHd => "2000 x 1500 (HORIZONTAL HD)",
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Square => (1080, 1080),
            Self::Stories => (1080, 1920),
            Self::VerticalHd => (1500, 2000),
            Self::HorizontalHd => (2000, 1500),
        }
    }

    pub fn size(&self) -> CanvasSize {
        let (width, height) = self.dimensions();
        CanvasSize {
            name: self.label().to_string(),
            width,
            height,
        }
    }

    /// Find the preset with the given pixel dimensions.
    pub fn matching(width: u32, height: u32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.dimensions() == (width, height))
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        CanvasPreset::Stories.size()
    }
}

/// Background layer behind every element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Background {
    /// Image reference; empty for no background image.
    #[serde(default)]
    pub image: String,
    pub opacity: f64,
    pub scale: f64,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            image: String::new(),
            opacity: 1.0,
            scale: 1.0,
        }
    }
}

/// Complete project data for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectData {
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub background: Background,
    #[serde(default = "untitled")]
    pub project_name: String,
    #[serde(default)]
    pub canvas_size: CanvasSize,
    /// ISO-8601 timestamp of the write that produced this record.
    #[serde(default)]
    pub updated_at: String,
}

fn untitled() -> String {
    UNTITLED_PROJECT.to_string()
}

impl ProjectData {
    /// Serialize everything except the timestamp.
    ///
    /// Two records with the same fingerprint hold the same design, so the
    /// autosave uses this to skip redundant writes.
    pub fn fingerprint(&self) -> serde_json::Result<String> {
        serde_json::to_string(&(
            &self.elements,
            &self.background,
            &self.project_name,
            &self.canvas_size,
        ))
    }
}

/// In-memory design state for the active event.
///
/// Every mutation bumps `revision`, which is what the autosave watches.
#[derive(Debug, Clone)]
pub struct DesignState {
    elements: Vec<Element>,
    selected: Option<String>,
    background: Background,
    project_name: String,
    canvas_size: CanvasSize,
    revision: u64,
}

impl Default for DesignState {
    fn default() -> Self {
        Self::new()
    }
}

impl DesignState {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            selected: None,
            background: Background::default(),
            project_name: UNTITLED_PROJECT.to_string(),
            canvas_size: CanvasSize::default(),
            revision: 0,
        }
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn canvas_size(&self) -> &CanvasSize {
        &self.canvas_size
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_element(&self) -> Option<&Element> {
        self.selected.as_deref().and_then(|id| self.element(id))
    }

    pub fn select(&mut self, id: &str) {
        if self.element(id).is_some() {
            self.selected = Some(id.to_string());
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Z-index for the next element: above every existing one, and never
    /// below `count + offset`.
    fn next_z_index(&self) -> i32 {
        let by_count = self.elements.len() as i32 + Z_INDEX_OFFSET;
        let above_max = self
            .elements
            .iter()
            .map(|e| e.z_index.saturating_add(1))
            .max()
            .unwrap_or(i32::MIN);
        by_count.max(above_max)
    }

    /// Create an element of `kind` with `overrides`, append and select it.
    /// Returns the new element's id.
    pub fn add_element(&mut self, kind: ElementKind, overrides: ElementPatch) -> String {
        let id = format!("el_{}", Uuid::new_v4().simple());
        let element = Element::new(
            id.clone(),
            kind,
            overrides,
            &self.canvas_size,
            self.next_z_index(),
        );

        log::debug!(
            "Added {} element {} at ({:.1}, {:.1}) z={}",
            kind.label(),
            id,
            element.x,
            element.y,
            element.z_index
        );

        self.elements.push(element);
        self.selected = Some(id.clone());
        self.bump();
        id
    }

    /// Merge `patch` into the element with `id`. Returns whether it changed.
    pub fn update_element(&mut self, id: &str, patch: &ElementPatch) -> bool {
        let changed = self
            .elements
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| e.apply(patch))
            .unwrap_or(false);
        if changed {
            self.bump();
        }
        changed
    }

    pub fn update_selected(&mut self, patch: &ElementPatch) -> bool {
        match self.selected.clone() {
            Some(id) => self.update_element(&id, patch),
            None => false,
        }
    }

    /// Step the selected element's scale by `delta`, clamped.
    pub fn nudge_selected_scale(&mut self, delta: f64) -> bool {
        let Some(scale) = self.selected_element().map(|e| e.scale) else {
            return false;
        };
        let scale = (scale + delta).clamp(MIN_SCALE, MAX_SCALE);
        self.update_selected(&ElementPatch::scale(scale))
    }

    /// Remove the element with `id`, clearing the selection if it was
    /// selected. Returns whether an element was removed.
    pub fn remove_element(&mut self, id: &str) -> bool {
        let before = self.elements.len();
        self.elements.retain(|e| e.id != id);
        if self.elements.len() == before {
            return false;
        }
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        log::debug!("Removed element {}, total: {}", id, self.elements.len());
        self.bump();
        true
    }

    pub fn remove_selected(&mut self) -> bool {
        match self.selected.clone() {
            Some(id) => self.remove_element(&id),
            None => false,
        }
    }

    /// Elements in paint order (ascending z-index, ties by insertion order).
    pub fn paint_order(&self) -> Vec<&Element> {
        geometry::paint_order(&self.elements)
    }

    /// Topmost element whose transformed bounds contain the canvas point.
    pub fn element_at(&self, point: Point) -> Option<&Element> {
        self.paint_order()
            .into_iter()
            .rev()
            .find(|e| geometry::element_contains(e, point))
    }

    pub fn set_project_name(&mut self, name: &str) {
        let name = name.to_uppercase();
        if name != self.project_name {
            self.project_name = name;
            self.bump();
        }
    }

    pub fn set_canvas_size(&mut self, size: CanvasSize) {
        if size != self.canvas_size {
            self.canvas_size = size;
            self.bump();
        }
    }

    pub fn set_background(&mut self, background: Background) {
        if background != self.background {
            self.background = background;
            self.bump();
        }
    }

    /// Snapshot the current state as a persistable record.
    pub fn snapshot(&self) -> ProjectData {
        ProjectData {
            elements: self.elements.clone(),
            background: self.background.clone(),
            project_name: self.project_name.clone(),
            canvas_size: self.canvas_size.clone(),
            updated_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }

    /// Replace the whole state with a loaded record.
    ///
    /// A stored canvas size is only adopted when it matches one of the
    /// presets; otherwise the current size is kept.
    pub fn replace_with(&mut self, project: ProjectData) {
        self.elements = project.elements;
        self.background = project.background;
        self.project_name = project.project_name;
        if let Some(preset) =
            CanvasPreset::matching(project.canvas_size.width, project.canvas_size.height)
        {
            self.canvas_size = preset.size();
        }
        self.selected = None;
        self.bump();
    }

    /// Reset to an empty project called `name`, keeping the canvas size.
    pub fn reset(&mut self, name: String) {
        self.elements.clear();
        self.background = Background::default();
        self.project_name = name;
        self.selected = None;
        self.bump();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::element::{ChipKind, ShapeKind};

    #[test]
    fn test_add_selects_and_bumps_revision() {
        let mut state = DesignState::new();
        let rev = state.revision();
        let id = state.add_element(ElementKind::Text, ElementPatch::default());
        assert_eq!(state.selected_id(), Some(id.as_str()));
        assert!(state.revision() > rev);
        assert!(id.starts_with("el_"));
    }

    #[test]
    fn test_new_element_z_index_exceeds_existing() {
        let mut state = DesignState::new();
        let a = state.add_element(ElementKind::Text, ElementPatch::default());
        let b = state.add_element(ElementKind::Image, ElementPatch::default());
        let c = state.add_element(ElementKind::QrCode, ElementPatch::default());
        assert_eq!(state.element(&a).unwrap().z_index, 10);
        assert_eq!(state.element(&b).unwrap().z_index, 11);

        // Deleting shrinks the count; the next one still lands on top.
        state.remove_element(&a);
        let d = state.add_element(ElementKind::Text, ElementPatch::default());
        let max_other = state
            .elements()
            .iter()
            .filter(|e| e.id != d)
            .map(|e| e.z_index)
            .max()
            .unwrap();
        assert!(state.element(&d).unwrap().z_index > max_other);

        // So does an explicit z-index far above the count.
        state.update_element(
            &c,
            &ElementPatch {
                z_index: Some(500),
                ..Default::default()
            },
        );
        let e = state.add_element(ElementKind::Shape(ShapeKind::Rect), ElementPatch::default());
        assert_eq!(state.element(&e).unwrap().z_index, 501);
    }

    #[test]
    fn test_paint_order_by_z_index() {
        let mut state = DesignState::new();
        let ids: Vec<String> = [3, 1, 2]
            .into_iter()
            .map(|z| {
                state.add_element(
                    ElementKind::Text,
                    ElementPatch {
                        z_index: Some(z),
                        ..Default::default()
                    },
                )
            })
            .collect();
        let order: Vec<&str> = state.paint_order().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(order, vec![ids[1].as_str(), ids[2].as_str(), ids[0].as_str()]);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut state = DesignState::new();
        state.add_element(ElementKind::Text, ElementPatch::default());
        let rev = state.revision();
        assert!(!state.update_element("missing", &ElementPatch::content("x")));
        assert_eq!(state.revision(), rev);
    }

    #[test]
    fn test_remove_selected_clears_selection() {
        let mut state = DesignState::new();
        let keep = state.add_element(ElementKind::Text, ElementPatch::default());
        let gone = state.add_element(ElementKind::Chip(ChipKind::Gift), ElementPatch::default());
        assert!(state.remove_selected());
        assert!(state.element(&gone).is_none());
        assert!(state.element(&keep).is_some());
        assert_eq!(state.selected_id(), None);
        assert!(!state.remove_element(&gone));
    }

    #[test]
    fn test_nudge_scale_is_clamped() {
        let mut state = DesignState::new();
        state.add_element(ElementKind::Text, ElementPatch::scale(4.95));
        state.nudge_selected_scale(0.1);
        assert_eq!(state.selected_element().unwrap().scale, MAX_SCALE);
        for _ in 0..100 {
            state.nudge_selected_scale(-0.1);
        }
        assert_eq!(state.selected_element().unwrap().scale, MIN_SCALE);
    }

    #[test]
    fn test_project_name_is_uppercased() {
        let mut state = DesignState::new();
        state.set_project_name("Invite for Ana");
        assert_eq!(state.project_name(), "INVITE FOR ANA");
    }

    #[test]
    fn test_replace_with_matches_presets() {
        let mut state = DesignState::new();
        state.add_element(ElementKind::Text, ElementPatch::default());
        let mut project = state.snapshot();
        project.canvas_size = CanvasSize {
            name: "legacy".into(),
            width: 2000,
            height: 1500,
        };
        state.replace_with(project.clone());
        assert_eq!(state.canvas_size(), &CanvasPreset::HorizontalHd.size());
        assert_eq!(state.selected_id(), None);

        project.canvas_size = CanvasSize {
            name: "odd".into(),
            width: 10,
            height: 10,
        };
        state.replace_with(project);
        assert_eq!(state.canvas_size(), &CanvasPreset::HorizontalHd.size());
    }

    #[test]
    fn test_fingerprint_ignores_timestamp() {
        let mut state = DesignState::new();
        state.add_element(ElementKind::Text, ElementPatch::default());
        let mut a = state.snapshot();
        let mut b = a.clone();
        a.updated_at = "2024-01-01T00:00:00.000Z".into();
        b.updated_at = "2025-01-01T00:00:00.000Z".into();
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }

    #[test]
    fn test_record_uses_camel_case_keys() {
        let state = DesignState::new();
        let json = serde_json::to_value(state.snapshot()).unwrap();
        assert!(json.get("projectName").is_some());
        assert!(json.get("canvasSize").is_some());
        assert!(json.get("updatedAt").is_some());
        assert_eq!(json["canvasSize"]["width"], 1080);
    }
}
