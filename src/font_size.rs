//! Font-Size Resolver
//!
//! Turns loose hints ("larger", "150%", "18px", 22) into a pixel size in [1, 200].

use serde::{Deserialize, Serialize};

pub const MIN_FONT_SIZE: u32 = 1;
pub const MAX_FONT_SIZE: u32 = 200;

/// A font-size hint as an agent may phrase it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FontSizeHint {
    Number(f64),
    Text(String),
}

impl From<f64> for FontSizeHint {
    fn from(v: f64) -> Self {
        FontSizeHint::Number(v)
    }
}

impl From<u32> for FontSizeHint {
    fn from(v: u32) -> Self {
        FontSizeHint::Number(f64::from(v))
    }
}

impl From<&str> for FontSizeHint {
    fn from(v: &str) -> Self {
        FontSizeHint::Text(v.to_string())
    }
}

/// Relative size keywords and their scale factors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FontSizeMultipliers {
    #[serde(default = "default_larger")]
    pub larger: f64,
    #[serde(default = "default_smaller")]
    pub smaller: f64,
    #[serde(default = "default_normal")]
    pub normal: f64,
    #[serde(default = "default_x_large")]
    pub x_large: f64,
    #[serde(default = "default_xx_large")]
    pub xx_large: f64,
    #[serde(default = "default_x_small")]
    pub x_small: f64,
    #[serde(default = "default_xx_small")]
    pub xx_small: f64,
}

fn default_larger() -> f64 { 1.2 }
fn default_smaller() -> f64 { 0.8 }
fn default_normal() -> f64 { 1.0 }
fn default_x_large() -> f64 { 1.5 }
fn default_xx_large() -> f64 { 2.0 }
fn default_x_small() -> f64 { 0.625 }
fn default_xx_small() -> f64 { 0.5 }

impl Default for FontSizeMultipliers {
    fn default() -> Self {
        Self {
            larger: default_larger(),
            smaller: default_smaller(),
            normal: default_normal(),
            x_large: default_x_large(),
            xx_large: default_xx_large(),
            x_small: default_x_small(),
            xx_small: default_xx_small(),
        }
    }
}

impl FontSizeMultipliers {
    /// Look up a keyword (case-insensitive, trimmed), following aliases
    pub fn lookup(&self, keyword: &str) -> Option<f64> {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "larger" | "big" | "bigger" => Some(self.larger),
            "smaller" | "small" => Some(self.smaller),
            "normal" | "medium" => Some(self.normal),
            "x-large" => Some(self.x_large),
            "xx-large" => Some(self.xx_large),
            "x-small" => Some(self.x_small),
            "xx-small" => Some(self.xx_small),
            _ => None,
        }
    }

    pub fn values(&self) -> [(&'static str, f64); 7] {
        [
            ("larger", self.larger),
            ("smaller", self.smaller),
            ("normal", self.normal),
            ("x-large", self.x_large),
            ("xx-large", self.xx_large),
            ("x-small", self.x_small),
            ("xx-small", self.xx_small),
        ]
    }
}

/// Round and clamp into [MIN_FONT_SIZE, MAX_FONT_SIZE]; `None` for non-finite input
fn clamp_size(value: f64) -> Option<u32> {
    if !value.is_finite() {
        return None;
    }
    let rounded = value.round().clamp(f64::from(MIN_FONT_SIZE), f64::from(MAX_FONT_SIZE));
    Some(rounded as u32)
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Resolve a font-size hint against the element's current size.
///
/// Unrecognized hints return `current_size` unchanged.
pub fn parse_font_size(
    hint: &FontSizeHint,
    current_size: u32,
    multipliers: Option<&FontSizeMultipliers>,
) -> u32 {
    let text = match hint {
        FontSizeHint::Number(n) => return clamp_size(*n).unwrap_or(current_size),
        FontSizeHint::Text(s) => s.trim().to_ascii_lowercase(),
    };
    let current = f64::from(current_size);

    if let Some(px) = text.strip_suffix("px").and_then(parse_number) {
        return clamp_size(px).unwrap_or(current_size);
    }

    if let Some(pct) = text.strip_suffix('%').and_then(parse_number) {
        return clamp_size(current * pct / 100.0).unwrap_or(current_size);
    }

    let defaults = FontSizeMultipliers::default();
    let table = multipliers.unwrap_or(&defaults);
    if let Some(factor) = table.lookup(&text) {
        return clamp_size(current * factor).unwrap_or(current_size);
    }

    parse_number(&text)
        .and_then(clamp_size)
        .unwrap_or(current_size)
}
