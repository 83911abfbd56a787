// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Viewport zoom and pan.
//!
//! The viewport only affects how the canvas is drawn and how pointer
//! positions are divided back into canvas space. It never touches stored
//! element coordinates and is not persisted.

use super::geometry::Point;
use crate::models::project::CanvasSize;

pub const MIN_ZOOM: f64 = 0.05;
pub const MAX_ZOOM: f64 = 2.0;
pub const ZOOM_STEP: f64 = 0.05;
pub const INITIAL_ZOOM: f64 = 0.20;

/// Zoom factor and pan offset (screen pixels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    zoom: f64,
    pan: Point,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: INITIAL_ZOOM,
            pan: Point::ZERO,
        }
    }
}

impl Viewport {
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(round_step(self.zoom + ZOOM_STEP));
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(round_step(self.zoom - ZOOM_STEP));
    }

    /// Zoom that keeps the whole canvas visible for a given size.
    pub fn default_zoom_for(size: &CanvasSize) -> f64 {
        if size.height >= 1900 {
            0.18
        } else {
            0.25
        }
    }

    pub fn fit_canvas(&mut self, size: &CanvasSize) {
        self.set_zoom(Self::default_zoom_for(size));
    }

    pub fn pan_by(&mut self, delta: Point) {
        self.pan = self.pan + delta;
    }

    pub fn reset_pan(&mut self) {
        self.pan = Point::ZERO;
    }

    /// Divide a pointer position by the zoom. Drags work in this space;
    /// the pan offset cancels out of every drag delta so it is left out.
    pub fn unzoom(&self, screen: Point) -> Point {
        screen / self.zoom
    }

    /// Map a screen position to canvas space given where the unpanned
    /// canvas origin sits on screen.
    pub fn screen_to_canvas(&self, screen: Point, origin: Point) -> Point {
        (screen - origin - self.pan) / self.zoom
    }

    /// Inverse of [`screen_to_canvas`](Self::screen_to_canvas).
    pub fn canvas_to_screen(&self, canvas: Point, origin: Point) -> Point {
        Point::new(
            origin.x + self.pan.x + canvas.x * self.zoom,
            origin.y + self.pan.y + canvas.y * self.zoom,
        )
    }
}

/// Snap to the zoom step grid so repeated steps don't accumulate float drift.
fn round_step(zoom: f64) -> f64 {
    (zoom / ZOOM_STEP).round() * ZOOM_STEP
}
