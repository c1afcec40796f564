//! Property-Edit Resolver
//!
//! Agents describe intent as "set property P of element E to V".
//! The resolver maps that onto the closed edit vocabulary, or drops it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::color::hex_to_closest_palette_role;
use crate::document::{ColorRole, ElementId, LabelDocument};
use crate::edits::Edit;
use crate::font_size::{parse_font_size, FontSizeHint, FontSizeMultipliers};
use crate::logging::EngineLogger;

const COMPONENT: &str = "resolver";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInstruction {
    pub element_id: ElementId,
    pub property: String,
    pub value: Value,
}

impl PropertyInstruction {
    pub fn new(element_id: impl Into<ElementId>, property: impl Into<String>, value: Value) -> Self {
        Self {
            element_id: element_id.into(),
            property: property.into(),
            value,
        }
    }
}

/// Properties the resolver knows how to express as edits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Color,
    FontSize,
    X,
    Y,
    Width,
    Height,
    ZIndex,
}

impl PropertyKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "color" => Some(Self::Color),
            "fontSize" => Some(Self::FontSize),
            "x" => Some(Self::X),
            "y" => Some(Self::Y),
            "width" | "w" => Some(Self::Width),
            "height" | "h" => Some(Self::Height),
            "zIndex" | "z" => Some(Self::ZIndex),
            _ => None,
        }
    }
}

fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

fn looks_like_hex(s: &str) -> bool {
    let digits = s.trim();
    digits.starts_with('#')
        || (matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit()))
}

fn resolve_one(
    instruction: &PropertyInstruction,
    kind: PropertyKind,
    document: &LabelDocument,
    multipliers: &FontSizeMultipliers,
    default_font_size: u32,
    logger: &dyn EngineLogger,
) -> Option<Edit> {
    let element_id = instruction.element_id.clone();
    let value = &instruction.value;

    match kind {
        PropertyKind::Color => {
            let raw = value.as_str()?;
            let color_role = match raw.parse::<ColorRole>() {
                Ok(role) => role,
                Err(_) if looks_like_hex(raw) => {
                    hex_to_closest_palette_role(raw, &document.palette, logger)
                }
                Err(_) => return None,
            };
            Some(Edit::Recolor { element_id, color_role })
        }
        PropertyKind::FontSize => {
            let font_size = match value {
                Value::Number(n) => {
                    let rounded = n.as_f64().filter(|v| v.is_finite())?.round();
                    if rounded < 1.0 || rounded > f64::from(u32::MAX) {
                        return None;
                    }
                    rounded as u32
                }
                Value::String(s) => parse_font_size(
                    &FontSizeHint::Text(s.clone()),
                    document.font_size_of(&element_id, default_font_size),
                    Some(multipliers),
                ),
                _ => return None,
            };
            Some(Edit::UpdateFontSize { element_id, font_size })
        }
        PropertyKind::X | PropertyKind::Y => {
            let target = as_number(value)?;
            let bounds = document.element(&element_id)?.bounds;
            let (dx, dy) = match kind {
                PropertyKind::X => (target - bounds.x, 0.0),
                _ => (0.0, target - bounds.y),
            };
            Some(Edit::Move { element_id, dx, dy })
        }
        PropertyKind::Width | PropertyKind::Height => {
            let target = as_number(value)?;
            let bounds = document.element(&element_id)?.bounds;
            let (dw, dh) = match kind {
                PropertyKind::Width => (target - bounds.w, 0.0),
                _ => (0.0, target - bounds.h),
            };
            Some(Edit::Resize { element_id, dw, dh })
        }
        PropertyKind::ZIndex => {
            let z = match value {
                Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|v| v.round() as i64))?,
                _ => as_number(value)?.round() as i64,
            };
            Some(Edit::Reorder { element_id, z })
        }
    }
}

/// Turn property instructions into typed edits, preserving order.
///
/// Instructions with no mapping, or whose value cannot be interpreted, are
/// skipped without error. `default_font_size` is the current size assumed for
/// elements when neither they nor the document typography name one.
pub fn resolve_property_edits(
    instructions: &[PropertyInstruction],
    document: &LabelDocument,
    multipliers: &FontSizeMultipliers,
    default_font_size: u32,
    logger: &dyn EngineLogger,
) -> Vec<Edit> {
    instructions
        .iter()
        .filter_map(|instruction| {
            let Some(kind) = PropertyKind::from_name(&instruction.property) else {
                logger.debug(
                    COMPONENT,
                    &format!("no edit for property {:?}; skipped", instruction.property),
                );
                return None;
            };
            let edit =
                resolve_one(instruction, kind, document, multipliers, default_font_size, logger);
            if edit.is_none() {
                logger.debug(
                    COMPONENT,
                    &format!(
                        "could not resolve {:?} on {:?}; skipped",
                        instruction.property, instruction.element_id
                    ),
                );
            }
            edit
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogLevel, MemoryLogger, NullLogger};
    use serde_json::json;

    fn document() -> LabelDocument {
        serde_json::from_value(json!({
            "canvas": {"width": 400, "height": 300},
            "palette": {
                "primary": "#0D47A1", "secondary": "#B0BEC5",
                "accent": "#E53935", "background": "#FAFAFA"
            },
            "typography": {"fontFamily": "Inter", "baseFontSize": 14},
            "elements": [
                {"id": "title", "kind": "text",
                 "bounds": {"x": 0.25, "y": 0.5, "w": 0.5, "h": 0.25},
                 "style": {"fontSize": 20}},
                {"id": "logo", "kind": "image",
                 "bounds": {"x": 0.0, "y": 0.0, "w": 0.25, "h": 0.25}}
            ]
        }))
        .unwrap()
    }

    fn resolve(instructions: &[PropertyInstruction]) -> Vec<Edit> {
        resolve_property_edits(instructions, &document(), &FontSizeMultipliers::default(), 16, &NullLogger)
    }

    #[test]
    fn test_position_and_size_become_deltas() {
        let edits = resolve(&[
            PropertyInstruction::new("title", "x", json!(0.5)),
            PropertyInstruction::new("title", "height", json!("0.5")),
        ]);
        assert_eq!(
            edits,
            vec![
                Edit::Move { element_id: "title".into(), dx: 0.25, dy: 0.0 },
                Edit::Resize { element_id: "title".into(), dw: 0.0, dh: 0.25 },
            ]
        );
    }

    #[test]
    fn test_color_role_passes_through_and_hex_snaps() {
        let edits = resolve(&[
            PropertyInstruction::new("title", "color", json!("secondary")),
            PropertyInstruction::new("title", "color", json!("#F44336")),
            PropertyInstruction::new("title", "color", json!("#e53935")),
        ]);
        let roles: Vec<_> = edits
            .iter()
            .map(|e| match e {
                Edit::Recolor { color_role, .. } => *color_role,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(roles, vec![ColorRole::Secondary, ColorRole::Accent, ColorRole::Accent]);
    }

    #[test]
    fn test_font_size_keyword_uses_element_then_document_size() {
        let edits = resolve(&[
            PropertyInstruction::new("title", "fontSize", json!("larger")),
            PropertyInstruction::new("logo", "fontSize", json!("200%")),
            PropertyInstruction::new("title", "fontSize", json!(17.4)),
        ]);
        assert_eq!(
            edits,
            vec![
                Edit::UpdateFontSize { element_id: "title".into(), font_size: 24 },
                Edit::UpdateFontSize { element_id: "logo".into(), font_size: 28 },
                Edit::UpdateFontSize { element_id: "title".into(), font_size: 17 },
            ]
        );
    }

    #[test]
    fn test_z_index_rounds() {
        let edits = resolve(&[
            PropertyInstruction::new("logo", "zIndex", json!(7)),
            PropertyInstruction::new("logo", "z", json!(2.6)),
        ]);
        assert_eq!(
            edits,
            vec![
                Edit::Reorder { element_id: "logo".into(), z: 7 },
                Edit::Reorder { element_id: "logo".into(), z: 3 },
            ]
        );
    }

    #[test]
    fn test_unmapped_properties_are_silently_dropped_in_order() {
        let logger = MemoryLogger::new();
        let edits = resolve_property_edits(
            &[
                PropertyInstruction::new("title", "opacity", json!(0.5)),
                PropertyInstruction::new("title", "zIndex", json!(4)),
                PropertyInstruction::new("title", "rotation", json!(45)),
                PropertyInstruction::new("logo", "color", json!("accent")),
            ],
            &document(),
            &FontSizeMultipliers::default(),
            16,
            &logger,
        );
        assert_eq!(edits.len(), 2);
        assert_eq!(edits[0].element_id(), "title");
        assert_eq!(edits[1].element_id(), "logo");
        assert_eq!(logger.count_at(LogLevel::Debug), 2);
        assert_eq!(logger.count_at(LogLevel::Warn), 0);
    }

    #[test]
    fn test_geometry_on_missing_element_is_unresolvable() {
        let edits = resolve(&[
            PropertyInstruction::new("ghost", "x", json!(0.1)),
            PropertyInstruction::new("ghost", "color", json!("accent")),
        ]);
        assert_eq!(
            edits,
            vec![Edit::Recolor { element_id: "ghost".into(), color_role: ColorRole::Accent }]
        );
    }
}
