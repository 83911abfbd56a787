// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the point type shared by the viewport and the
//! interaction controller, element hit testing, and paint ordering.

use crate::models::element::Element;
use std::ops::{Add, Div, Sub};

/// A 2D point or offset, in screen or canvas pixels depending on context.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Div<f64> for Point {
    type Output = Point;

    fn div(self, rhs: f64) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

/// Sort elements by ascending z-index. The sort is stable, so equal
/// z-indices keep their insertion order.
pub fn paint_order(elements: &[Element]) -> Vec<&Element> {
    let mut ordered: Vec<&Element> = elements.iter().collect();
    ordered.sort_by_key(|e| e.z_index);
    ordered
}

/// Center of the element's unscaled box.
pub fn element_center(element: &Element) -> Point {
    Point::new(
        element.x + element.width / 2.0,
        element.y + element.height / 2.0,
    )
}

/// Whether a canvas-space point falls inside the element as rendered.
///
/// Elements scale and rotate about their center, so the point is mapped
/// back into the element's own frame before the box test.
pub fn element_contains(element: &Element, point: Point) -> bool {
    let center = element_center(element);
    let (sin, cos) = (-element.rotation.to_radians()).sin_cos();
    let d = point - center;
    let local = Point::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos);

    let (width, height) = element.scaled_size();
    local.x.abs() <= width / 2.0 && local.y.abs() <= height / 2.0
}
