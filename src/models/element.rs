// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Canvas element data structures.
//!
//! This module defines the primitives that can be placed on the design
//! surface (text, images, shapes, chips and QR codes), their style
//! attributes, and the kind-specific defaults used when a new element is
//! created.

use serde::{Deserialize, Serialize};

use super::project::CanvasSize;

/// Smallest allowed per-element scale multiplier.
pub const MIN_SCALE: f64 = 0.1;
/// Largest allowed per-element scale multiplier.
pub const MAX_SCALE: f64 = 5.0;
/// Scale change applied by the property panel's step buttons.
pub const SCALE_STEP: f64 = 0.1;

pub const MIN_FONT_SIZE: f64 = 8.0;
pub const MAX_FONT_SIZE: f64 = 120.0;
pub const FONT_SIZE_STEP: f64 = 2.0;

/// Offset added to the element count when computing a new z-index.
pub const Z_INDEX_OFFSET: i32 = 10;

/// Font families offered by the property panel as `(label, css value)`.
pub const FONT_FAMILIES: [(&str, &str); 8] = [
    ("Jakarta Sans", "'Inter', sans-serif"),
    ("Montserrat Bold", "'Montserrat', sans-serif"),
    ("Cinzel Master", "'Cinzel', serif"),
    ("Playfair Display", "'Playfair Display', serif"),
    ("Great Vibes", "'Great Vibes', cursive"),
    ("Dancing Script", "'Dancing Script', cursive"),
    ("Alex Brush", "'Alex Brush', cursive"),
    ("Lora Serif", "'Lora', serif"),
];

const DEFAULT_TEXT: &str = "EDIT TEXT";
const HEART_GLYPH: &str = "\u{2764}";
const HEART_COLOR: &str = "#EF4444";
const SHAPE_COLOR: &str = "#F97316";
const INK_COLOR: &str = "#1E293B";
const CIRCLE_RADIUS: f64 = 1000.0;

/// Sub-kind of a shape element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rect,
    Circle,
    Heart,
}

/// Sub-kind of a chip (pre-styled badge) element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChipKind {
    #[serde(rename = "chip-confirmed")]
    Confirmed,
    #[serde(rename = "chip-gift")]
    Gift,
    #[serde(rename = "chip-local")]
    Local,
}

impl ChipKind {
    /// Caption shown on a freshly created chip.
    pub fn default_label(&self) -> &'static str {
        match self {
            Self::Confirmed => "CONFIRM ATTENDANCE",
            Self::Gift => "GIFT LIST",
            Self::Local => "EVENT VENUE",
        }
    }
}

/// Kind of a canvas element, carrying the sub-kind where one exists.
///
/// Serialized as a `type` tag with an optional `subtype` next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "subtype", rename_all = "snake_case")]
pub enum ElementKind {
    Text,
    Image,
    Shape(ShapeKind),
    Chip(ChipKind),
    QrCode,
}

impl ElementKind {
    /// Human-readable label for the kind.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Image => "Image",
            Self::Shape(ShapeKind::Rect) => "Rectangle",
            Self::Shape(ShapeKind::Circle) => "Circle",
            Self::Shape(ShapeKind::Heart) => "Heart",
            Self::Chip(_) => "Chip",
            Self::QrCode => "QR code",
        }
    }

    /// Whether the element renders its `content` as text.
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            Self::Text | Self::Chip(_) | Self::Shape(ShapeKind::Heart)
        )
    }

    /// Whether the element's `content` is an image reference.
    pub fn is_pictorial(&self) -> bool {
        matches!(self, Self::Image | Self::QrCode)
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Case transform applied to text when rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTransform {
    #[default]
    None,
    Uppercase,
    Lowercase,
}

impl TextTransform {
    pub fn apply(&self, text: &str) -> String {
        match self {
            Self::None => text.to_string(),
            Self::Uppercase => text.to_uppercase(),
            Self::Lowercase => text.to_lowercase(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

fn default_scale() -> f64 {
    1.0
}

fn default_opacity() -> f64 {
    1.0
}

fn default_color() -> String {
    INK_COLOR.to_string()
}

fn default_font_size() -> f64 {
    80.0
}

fn default_font_weight() -> String {
    "900".to_string()
}

fn default_font_family() -> String {
    FONT_FAMILIES[0].1.to_string()
}

/// A positioned, styled primitive on the design surface.
///
/// Coordinates are canvas-space pixels with a top-left origin. Paint order
/// is ascending `z_index`; the order of the containing list is irrelevant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: String,
    #[serde(flatten)]
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub content: String,
    /// Fill image for shapes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_content: Option<String>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_font_weight")]
    pub font_weight: String,
    #[serde(default)]
    pub font_style: FontStyle,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default)]
    pub text_align: TextAlign,
    #[serde(default)]
    pub text_transform: TextTransform,
    #[serde(default)]
    pub border_radius: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    pub z_index: i32,
}

/// A partial set of element fields.
///
/// Used both as the caller overrides of an "add element" operation and as
/// the patch of an "update element" operation. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub scale: Option<f64>,
    pub rotation: Option<f64>,
    pub content: Option<String>,
    pub image_content: Option<String>,
    pub color: Option<String>,
    pub font_size: Option<f64>,
    pub font_weight: Option<String>,
    pub font_style: Option<FontStyle>,
    pub font_family: Option<String>,
    pub text_align: Option<TextAlign>,
    pub text_transform: Option<TextTransform>,
    pub border_radius: Option<f64>,
    pub opacity: Option<f64>,
    pub z_index: Option<i32>,
}

impl ElementPatch {
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn scale(scale: f64) -> Self {
        Self {
            scale: Some(scale),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Element {
    /// Build a new element of `kind`, merging kind defaults with `overrides`.
    ///
    /// Unless the overrides place it explicitly, the element is centered on
    /// `canvas`. Heart shapes always get the glyph, its size and its color;
    /// circles always get a full corner radius.
    pub fn new(
        id: String,
        kind: ElementKind,
        overrides: ElementPatch,
        canvas: &CanvasSize,
        z_index: i32,
    ) -> Self {
        let mut overrides = overrides;

        let (default_width, default_height) = match kind {
            ElementKind::Chip(_) => (320.0, 320.0),
            ElementKind::Shape(_) => (500.0, 500.0),
            _ => (600.0, 150.0),
        };
        let width = overrides.width.unwrap_or(default_width);
        let height = overrides.height.unwrap_or(default_height);

        let mut content = overrides.content.take().unwrap_or_default();
        if content.is_empty() {
            match kind {
                ElementKind::Text => content = DEFAULT_TEXT.to_string(),
                ElementKind::Chip(chip) => content = chip.default_label().to_string(),
                _ => {}
            }
        }

        match kind {
            ElementKind::Shape(ShapeKind::Heart) => {
                content = HEART_GLYPH.to_string();
                overrides.font_size = Some(250.0);
                overrides.color = Some(HEART_COLOR.to_string());
            }
            ElementKind::Shape(ShapeKind::Circle) => {
                overrides.border_radius = Some(CIRCLE_RADIUS);
            }
            _ => {}
        }

        let default_color = match kind {
            ElementKind::Shape(_) => SHAPE_COLOR,
            _ => INK_COLOR,
        };
        let default_font_size = match kind {
            ElementKind::Chip(_) => 32.0,
            _ => default_font_size(),
        };

        Self {
            id,
            kind,
            x: overrides
                .x
                .unwrap_or(canvas.width as f64 / 2.0 - width / 2.0),
            y: overrides
                .y
                .unwrap_or(canvas.height as f64 / 2.0 - height / 2.0),
            width,
            height,
            scale: overrides.scale.unwrap_or(1.0),
            rotation: overrides.rotation.unwrap_or(0.0),
            content,
            image_content: overrides.image_content,
            color: overrides.color.unwrap_or_else(|| default_color.to_string()),
            font_size: overrides.font_size.unwrap_or(default_font_size),
            font_weight: overrides.font_weight.unwrap_or_else(default_font_weight),
            font_style: overrides.font_style.unwrap_or_default(),
            font_family: overrides.font_family.unwrap_or_else(default_font_family),
            text_align: overrides.text_align.unwrap_or_default(),
            text_transform: overrides.text_transform.unwrap_or_default(),
            border_radius: overrides.border_radius.unwrap_or(0.0),
            opacity: overrides.opacity.unwrap_or(1.0),
            z_index: overrides.z_index.unwrap_or(z_index),
        }
    }

    /// Shallow-merge `patch` into this element. Returns whether anything
    /// actually changed.
    pub fn apply(&mut self, patch: &ElementPatch) -> bool {
        let before = self.clone();

        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(scale) = patch.scale {
            self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(ref content) = patch.content {
            self.content = content.clone();
        }
        if let Some(ref image) = patch.image_content {
            self.image_content = Some(image.clone());
        }
        if let Some(ref color) = patch.color {
            self.color = color.clone();
        }
        if let Some(font_size) = patch.font_size {
            self.font_size = font_size;
        }
        if let Some(ref weight) = patch.font_weight {
            self.font_weight = weight.clone();
        }
        if let Some(style) = patch.font_style {
            self.font_style = style;
        }
        if let Some(ref family) = patch.font_family {
            self.font_family = family.clone();
        }
        if let Some(align) = patch.text_align {
            self.text_align = align;
        }
        if let Some(transform) = patch.text_transform {
            self.text_transform = transform;
        }
        if let Some(radius) = patch.border_radius {
            self.border_radius = radius;
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(z_index) = patch.z_index {
            self.z_index = z_index;
        }

        *self != before
    }

    /// Text as rendered, after the case transform.
    pub fn display_text(&self) -> String {
        self.text_transform.apply(&self.content)
    }

    /// Size after the scale multiplier.
    pub fn scaled_size(&self) -> (f64, f64) {
        (self.width * self.scale, self.height * self.scale)
    }
}
