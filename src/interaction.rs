// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pointer interaction state machine.
//!
//! A pointer-down on the empty background starts panning and clears the
//! selection; a pointer-down on an element selects it and starts dragging.
//! Every pointer-down on an element may become a drag: there is no
//! movement threshold separating a click from a drag.

use crate::models::{element::ElementPatch, project::DesignState};
use crate::util::{geometry::Point, viewport::Viewport};

/// What the pointer went down on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerTarget {
    Background,
    Element(String),
}

/// Current interaction state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    /// Panning; `last` is the previous pointer position in screen pixels.
    Panning { last: Point },
    /// Dragging an element; `offset` is the grab point inside the element,
    /// in unzoomed pointer space.
    Dragging { id: String, offset: Point },
}

/// Drives selection, dragging and panning from pointer events.
#[derive(Debug, Default)]
pub struct InteractionController {
    state: Interaction,
}

impl InteractionController {
    #[cfg(test)]
    pub fn state(&self) -> &Interaction {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, Interaction::Dragging { .. })
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.state, Interaction::Panning { .. })
    }

    /// Handle a pointer-down at `screen` on `target`.
    pub fn pointer_down(
        &mut self,
        target: PointerTarget,
        screen: Point,
        design: &mut DesignState,
        viewport: &Viewport,
    ) {
        match target {
            PointerTarget::Background => {
                design.clear_selection();
                self.state = Interaction::Panning { last: screen };
            }
            PointerTarget::Element(id) => {
                let Some(element) = design.element(&id) else {
                    log::warn!("Pointer down on unknown element {}", id);
                    self.state = Interaction::Idle;
                    return;
                };
                let offset = viewport.unzoom(screen) - Point::new(element.x, element.y);
                design.select(&id);
                log::debug!("Started dragging {} (grab offset {:?})", id, offset);
                self.state = Interaction::Dragging { id, offset };
            }
        }
    }

    /// Handle a pointer move. Returns whether the design changed.
    pub fn pointer_move(
        &mut self,
        screen: Point,
        design: &mut DesignState,
        viewport: &mut Viewport,
    ) -> bool {
        match &mut self.state {
            Interaction::Idle => false,
            Interaction::Panning { last } => {
                viewport.pan_by(screen - *last);
                *last = screen;
                false
            }
            Interaction::Dragging { id, offset } => {
                let position = viewport.unzoom(screen) - *offset;
                design.update_element(id, &ElementPatch::position(position.x, position.y))
            }
        }
    }

    pub fn pointer_up(&mut self) {
        if let Interaction::Dragging { id, .. } = &self.state {
            log::debug!("Stopped dragging {}", id);
        }
        self.state = Interaction::Idle;
    }

    /// Drop any in-progress gesture without side effects.
    pub fn cancel(&mut self) {
        self.state = Interaction::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::element::ElementKind;
    use crate::models::project::CanvasPreset;

    fn setup() -> (DesignState, Viewport, InteractionController, String) {
        let mut design = DesignState::new();
        design.set_canvas_size(CanvasPreset::Stories.size());
        let id = design.add_element(ElementKind::Text, ElementPatch::default());
        let mut viewport = Viewport::default();
        viewport.set_zoom(0.20);
        (design, viewport, InteractionController::default(), id)
    }

    #[test]
    fn test_drag_moves_by_unzoomed_delta() {
        let (mut design, mut viewport, mut ctl, id) = setup();
        let start = design.element(&id).map(|e| (e.x, e.y)).unwrap();
        assert_eq!(start, (240.0, 885.0));

        ctl.pointer_down(
            PointerTarget::Element(id.clone()),
            Point::new(200.0, 200.0),
            &mut design,
            &viewport,
        );
        assert!(ctl.is_dragging());
        ctl.pointer_move(Point::new(250.0, 260.0), &mut design, &mut viewport);
        ctl.pointer_up();

        let el = design.element(&id).unwrap();
        assert!((el.x - (start.0 + 250.0)).abs() < 1e-9);
        assert!((el.y - (start.1 + 300.0)).abs() < 1e-9);
        assert_eq!(*ctl.state(), Interaction::Idle);
    }

    #[test]
    fn test_drag_result_independent_of_pan() {
        let run = |pan: Point| {
            let (mut design, mut viewport, mut ctl, id) = setup();
            viewport.pan_by(pan);
            ctl.pointer_down(
                PointerTarget::Element(id.clone()),
                Point::new(10.0, 10.0),
                &mut design,
                &viewport,
            );
            ctl.pointer_move(Point::new(40.0, 25.0), &mut design, &mut viewport);
            ctl.pointer_move(Point::new(90.0, -5.0), &mut design, &mut viewport);
            ctl.pointer_up();
            let el = design.element(&id).unwrap();
            (el.x, el.y)
        };
        assert_eq!(run(Point::ZERO), run(Point::new(500.0, -320.0)));
    }

    #[test]
    fn test_background_pans_incrementally_and_deselects() {
        let (mut design, mut viewport, mut ctl, id) = setup();
        let before = design.element(&id).cloned();
        ctl.pointer_down(
            PointerTarget::Background,
            Point::new(100.0, 100.0),
            &mut design,
            &viewport,
        );
        assert_eq!(design.selected_id(), None);
        assert!(ctl.is_panning());

        ctl.pointer_move(Point::new(110.0, 90.0), &mut design, &mut viewport);
        ctl.pointer_move(Point::new(130.0, 95.0), &mut design, &mut viewport);
        assert_eq!(viewport.pan(), Point::new(30.0, -5.0));
        ctl.pointer_up();

        // Panning never moves elements.
        assert_eq!(design.element(&id).cloned(), before);
    }

    #[test]
    fn test_click_without_move_keeps_position() {
        let (mut design, mut viewport, mut ctl, id) = setup();
        design.clear_selection();
        let rev = design.revision();
        ctl.pointer_down(
            PointerTarget::Element(id.clone()),
            Point::new(70.0, 80.0),
            &mut design,
            &viewport,
        );
        assert_eq!(design.selected_id(), Some(id.as_str()));
        // A move back onto the grab point lands exactly where it started.
        assert!(!ctl.pointer_move(Point::new(70.0, 80.0), &mut design, &mut viewport));
        assert_eq!(design.revision(), rev);
    }

    #[test]
    fn test_pointer_down_on_missing_element_stays_idle() {
        let (mut design, viewport, mut ctl, _) = setup();
        ctl.pointer_down(
            PointerTarget::Element("nope".into()),
            Point::ZERO,
            &mut design,
            &viewport,
        );
        assert_eq!(*ctl.state(), Interaction::Idle);
    }
}
