//! Label Document - The Declarative Layout Contract
//!
//! Canvas, palette, typography, and positioned elements.
//! Bounds are normalized to the canvas: every field lives in [0, 1].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

pub type ElementId = String;

/// Lowest layering index an element may occupy
pub const Z_MIN: i64 = 0;
/// Highest layering index an element may occupy
pub const Z_MAX: i64 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabelDocument {
    pub canvas: Canvas,
    pub palette: Palette,
    #[serde(default)]
    pub typography: Typography,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl LabelDocument {
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub fn element_ids(&self) -> HashSet<ElementId> {
        self.elements.iter().map(|e| e.id.clone()).collect()
    }

    /// Current font size of an element: its own style, then the document base
    /// size, then `fallback`
    pub fn font_size_of(&self, id: &str, fallback: u32) -> u32 {
        self.element(id)
            .and_then(|e| e.style.font_size)
            .or(self.typography.base_font_size)
            .unwrap_or(fallback)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub unit: CanvasUnit,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CanvasUnit {
    #[default]
    Px,
    Mm,
    In,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_font_size: Option<u32>,
}

fn default_font_family() -> String { "Inter".to_string() }

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_family: default_font_family(),
            base_font_size: None,
        }
    }
}

/// The four named color slots of a label
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ColorRole {
    Primary,
    Secondary,
    Accent,
    Background,
}

impl ColorRole {
    /// Fixed scan order; earlier roles win distance ties
    pub const ALL: [ColorRole; 4] = [
        ColorRole::Primary,
        ColorRole::Secondary,
        ColorRole::Accent,
        ColorRole::Background,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ColorRole::Primary => "primary",
            ColorRole::Secondary => "secondary",
            ColorRole::Accent => "accent",
            ColorRole::Background => "background",
        }
    }
}

impl fmt::Display for ColorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" => Ok(ColorRole::Primary),
            "secondary" => Ok(ColorRole::Secondary),
            "accent" => Ok(ColorRole::Accent),
            "background" => Ok(ColorRole::Background),
            other => Err(format!("unknown color role: {other}")),
        }
    }
}

/// Role -> 6-digit hex color
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Palette {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
}

impl Palette {
    pub fn get(&self, role: ColorRole) -> &str {
        match role {
            ColorRole::Primary => &self.primary,
            ColorRole::Secondary => &self.secondary,
            ColorRole::Accent => &self.accent,
            ColorRole::Background => &self.background,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (ColorRole, &str)> {
        ColorRole::ALL.into_iter().map(move |role| (role, self.get(role)))
    }
}

/// Normalized rectangle, all fields in [0, 1]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn is_normalized(&self) -> bool {
        [self.x, self.y, self.w, self.h]
            .iter()
            .all(|v| (0.0..=1.0).contains(v))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    pub bounds: Bounds,
    #[serde(default)]
    pub z: u32,
    #[serde(default)]
    pub style: ElementStyle,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Text,
    Image,
    Shape,
    Barcode,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementStyle {
    #[serde(default)]
    pub color_role: Option<ColorRole>,
    #[serde(default)]
    pub font_size: Option<u32>,
}
