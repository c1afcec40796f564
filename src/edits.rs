//! Edit Model - The Closed Operation Vocabulary
//!
//! Five operations, no more. Adding a sixth is a compile error in every
//! consumer until the resolver, validator, and schema all handle it.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use crate::document::{ColorRole, ElementId};
use crate::schema::{Schema, SchemaViolation};

pub const EDIT_SCHEMA: &str = "edit";

/// One atomic, typed mutation of a single element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Edit {
    Move {
        #[serde(rename = "id", alias = "elementId")]
        element_id: ElementId,
        dx: f64,
        dy: f64,
    },
    Resize {
        #[serde(rename = "id", alias = "elementId")]
        element_id: ElementId,
        dw: f64,
        dh: f64,
    },
    Recolor {
        #[serde(rename = "id", alias = "elementId")]
        element_id: ElementId,
        #[serde(rename = "color", alias = "colorRole")]
        color_role: ColorRole,
    },
    Reorder {
        #[serde(rename = "id", alias = "elementId")]
        element_id: ElementId,
        #[serde(deserialize_with = "saturating_z")]
        z: i64,
    },
    UpdateFontSize {
        #[serde(rename = "id", alias = "elementId")]
        element_id: ElementId,
        #[serde(rename = "fontSize")]
        font_size: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditKind {
    Move,
    Resize,
    Recolor,
    Reorder,
    UpdateFontSize,
}

impl EditKind {
    pub const ALL: [EditKind; 5] = [
        EditKind::Move,
        EditKind::Resize,
        EditKind::Recolor,
        EditKind::Reorder,
        EditKind::UpdateFontSize,
    ];

    pub const fn tag(self) -> &'static str {
        match self {
            EditKind::Move => "move",
            EditKind::Resize => "resize",
            EditKind::Recolor => "recolor",
            EditKind::Reorder => "reorder",
            EditKind::UpdateFontSize => "update_font_size",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Edit {
    pub fn element_id(&self) -> &str {
        match self {
            Edit::Move { element_id, .. }
            | Edit::Resize { element_id, .. }
            | Edit::Recolor { element_id, .. }
            | Edit::Reorder { element_id, .. }
            | Edit::UpdateFontSize { element_id, .. } => element_id,
        }
    }

    pub fn kind(&self) -> EditKind {
        match self {
            Edit::Move { .. } => EditKind::Move,
            Edit::Resize { .. } => EditKind::Resize,
            Edit::Recolor { .. } => EditKind::Recolor,
            Edit::Reorder { .. } => EditKind::Reorder,
            Edit::UpdateFontSize { .. } => EditKind::UpdateFontSize,
        }
    }

    /// Business-independent range checks serde cannot express
    fn check_fields(&self) -> Result<(), String> {
        if self.element_id().trim().is_empty() {
            return Err("element id must be a non-empty string".to_string());
        }
        match self {
            Edit::Move { dx, dy, .. } if !(dx.is_finite() && dy.is_finite()) => {
                Err("move deltas must be finite numbers".to_string())
            }
            Edit::Resize { dw, dh, .. } if !(dw.is_finite() && dh.is_finite()) => {
                Err("resize deltas must be finite numbers".to_string())
            }
            Edit::UpdateFontSize { font_size: 0, .. } => {
                Err("fontSize must be a positive integer".to_string())
            }
            Edit::Move { .. }
            | Edit::Resize { .. }
            | Edit::Recolor { .. }
            | Edit::Reorder { .. }
            | Edit::UpdateFontSize { .. } => Ok(()),
        }
    }
}

/// Accept any JSON integer; magnitudes beyond i64 saturate so clamping can report them
fn saturating_z<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    match (number.as_i64(), number.as_u64()) {
        (Some(z), _) => Ok(z),
        (None, Some(_)) => Ok(i64::MAX),
        (None, None) => Err(D::Error::custom(format!("z must be an integer, got {number}"))),
    }
}

/// Parse an untrusted value into an `Edit`.
///
/// Deserialized data has not been proven to belong to the closed set, so the
/// op tag is checked before the variant fields.
pub fn parse_edit(value: &Value) -> Result<Edit, SchemaViolation> {
    let violation = |message: String| SchemaViolation::new(EDIT_SCHEMA, message);

    let object = value
        .as_object()
        .ok_or_else(|| violation(format!("expected an object, got {}", type_name(value))))?;

    match object.get("op") {
        None => return Err(violation("missing op tag".to_string())),
        Some(Value::String(tag)) if EditKind::from_tag(tag).is_none() => {
            return Err(violation(format!("unrecognized op {tag:?}")));
        }
        Some(Value::String(_)) => {}
        Some(other) => {
            return Err(violation(format!("op must be a string, got {}", type_name(other))));
        }
    }

    let edit = Edit::deserialize(value).map_err(|e| violation(e.to_string()))?;
    edit.check_fields().map_err(violation)?;
    Ok(edit)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `Schema` view of the edit model
#[derive(Debug, Clone, Copy, Default)]
pub struct EditSchema;

impl Schema for EditSchema {
    type Output = Edit;

    fn name(&self) -> &str {
        EDIT_SCHEMA
    }

    fn parse(&self, value: &Value) -> Result<Edit, SchemaViolation> {
        parse_edit(value)
    }
}

/// `Schema` for a whole batch of edits; any malformed entry fails the batch
#[derive(Debug, Clone, Copy, Default)]
pub struct EditListSchema;

impl Schema for EditListSchema {
    type Output = Vec<Edit>;

    fn name(&self) -> &str {
        "edit_list"
    }

    fn parse(&self, value: &Value) -> Result<Vec<Edit>, SchemaViolation> {
        let items = value.as_array().ok_or_else(|| {
            SchemaViolation::new(self.name(), format!("expected an array, got {}", type_name(value)))
        })?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                parse_edit(item).map_err(|v| {
                    SchemaViolation::new(self.name(), format!("[{i}] {}", v.message))
                })
            })
            .collect()
    }
}
