//! Edit Validation - Agents Suggest, Engine Enforces
//!
//! Raw agent output goes in, a complete report comes out.
//! Nothing here fails: truncation, schema failures, unknown targets, and
//! clamping all become structured records.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::config::EngineConfig;
use crate::document::{Bounds, ElementId, Z_MAX, Z_MIN};
use crate::edits::{parse_edit, Edit};
use crate::logging::EngineLogger;

const COMPONENT: &str = "validation";

pub const DEFAULT_MAX_EDITS: usize = 10;
pub const DEFAULT_MAX_DELTA: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOptions {
    #[serde(default = "default_max_edits")]
    pub max_edits: usize,
    #[serde(default = "default_max_delta")]
    pub max_delta: f64,
    #[serde(default)]
    pub existing_element_ids: HashSet<ElementId>,
}

fn default_max_edits() -> usize { DEFAULT_MAX_EDITS }
fn default_max_delta() -> f64 { DEFAULT_MAX_DELTA }

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            max_edits: DEFAULT_MAX_EDITS,
            max_delta: DEFAULT_MAX_DELTA,
            existing_element_ids: HashSet::new(),
        }
    }
}

impl ValidationOptions {
    pub fn new<I, S>(existing_element_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ElementId>,
    {
        Self {
            existing_element_ids: existing_element_ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn from_config(config: &EngineConfig, existing_element_ids: HashSet<ElementId>) -> Self {
        Self {
            max_edits: config.max_edits,
            max_delta: config.max_delta,
            existing_element_ids,
        }
    }

    pub fn with_max_edits(mut self, max_edits: usize) -> Self {
        self.max_edits = max_edits;
        self
    }

    pub fn with_max_delta(mut self, max_delta: f64) -> Self {
        self.max_delta = max_delta;
        self
    }

    /// Delta limit usable as a clamp bound: finite and non-negative
    fn delta_limit(&self) -> f64 {
        if self.max_delta.is_finite() {
            self.max_delta.abs()
        } else {
            DEFAULT_MAX_DELTA
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedEdit {
    pub index: usize,
    pub edit: Value,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClampedEdit {
    pub index: usize,
    pub original: Edit,
    pub clamped: Edit,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid_edits: Vec<Edit>,
    pub rejected_edits: Vec<RejectedEdit>,
    pub clamped_edits: Vec<ClampedEdit>,
}

impl ValidationResult {
    pub fn is_clean(&self) -> bool {
        self.rejected_edits.is_empty() && self.clamped_edits.is_empty()
    }

    pub fn all_rejected(&self) -> bool {
        self.valid_edits.is_empty() && !self.rejected_edits.is_empty()
    }
}

fn clamp_delta(value: f64, limit: f64) -> f64 {
    value.clamp(-limit, limit)
}

/// Clamp an edit's numeric fields. Returns the clamped edit and a reason when anything changed.
fn clamp_edit(edit: &Edit, max_delta: f64) -> Option<(Edit, String)> {
    match edit {
        Edit::Move { element_id, dx, dy } => {
            let (cx, cy) = (clamp_delta(*dx, max_delta), clamp_delta(*dy, max_delta));
            (cx != *dx || cy != *dy).then(|| {
                (
                    Edit::Move { element_id: element_id.clone(), dx: cx, dy: cy },
                    format!("move delta clamped to [-{max_delta}, {max_delta}]"),
                )
            })
        }
        Edit::Resize { element_id, dw, dh } => {
            let (cw, ch) = (clamp_delta(*dw, max_delta), clamp_delta(*dh, max_delta));
            (cw != *dw || ch != *dh).then(|| {
                (
                    Edit::Resize { element_id: element_id.clone(), dw: cw, dh: ch },
                    format!("resize delta clamped to [-{max_delta}, {max_delta}]"),
                )
            })
        }
        Edit::Reorder { element_id, z } => {
            let cz = (*z).clamp(Z_MIN, Z_MAX);
            (cz != *z).then(|| {
                (
                    Edit::Reorder { element_id: element_id.clone(), z: cz },
                    format!("z-index {z} clamped to [{Z_MIN}, {Z_MAX}]"),
                )
            })
        }
        Edit::Recolor { .. } | Edit::UpdateFontSize { .. } => None,
    }
}

/// Validate and clamp a batch of raw, agent-produced edits
pub fn validate_and_clamp_edits(
    raw_edits: &[Value],
    options: &ValidationOptions,
    logger: &dyn EngineLogger,
) -> ValidationResult {
    let mut result = ValidationResult::default();
    let max_delta = options.delta_limit();
    let kept = raw_edits.len().min(options.max_edits);

    for (index, raw) in raw_edits.iter().enumerate().take(kept) {
        let edit = match parse_edit(raw) {
            Ok(edit) => edit,
            Err(violation) => {
                logger.debug(COMPONENT, &format!("edit {index} rejected: {violation}"));
                result.rejected_edits.push(RejectedEdit {
                    index,
                    edit: raw.clone(),
                    reason: format!("schema violation: {}", violation.message),
                });
                continue;
            }
        };

        if !options.existing_element_ids.contains(edit.element_id()) {
            logger.debug(COMPONENT, &format!("edit {index} targets unknown element"));
            result.rejected_edits.push(RejectedEdit {
                index,
                edit: raw.clone(),
                reason: format!("unknown element id {:?}", edit.element_id()),
            });
            continue;
        }

        match clamp_edit(&edit, max_delta) {
            Some((clamped, reason)) => {
                result.valid_edits.push(clamped.clone());
                result.clamped_edits.push(ClampedEdit {
                    index,
                    original: edit,
                    clamped,
                    reason,
                });
            }
            None => result.valid_edits.push(edit),
        }
    }

    if raw_edits.len() > kept {
        logger.warn(
            COMPONENT,
            &format!(
                "{} edits exceed the limit of {}; truncating",
                raw_edits.len(),
                options.max_edits
            ),
        );
        for (index, raw) in raw_edits.iter().enumerate().skip(kept) {
            result.rejected_edits.push(RejectedEdit {
                index,
                edit: raw.clone(),
                reason: format!("exceeded maximum edits limit of {}", options.max_edits),
            });
        }
    }

    if !result.is_clean() {
        logger.info(
            COMPONENT,
            &format!(
                "{} valid, {} rejected, {} clamped",
                result.valid_edits.len(),
                result.rejected_edits.len(),
                result.clamped_edits.len()
            ),
        );
    }

    result
}

fn clamp_unit(value: f64, upper: f64) -> f64 {
    value.max(0.0).min(upper.max(0.0))
}

/// Apply a move/resize to element bounds, keeping the rectangle on the canvas
pub fn apply_edit_to_bounds(bounds: Bounds, edit: &Edit) -> Bounds {
    match edit {
        Edit::Move { dx, dy, .. } => Bounds {
            x: clamp_unit(bounds.x + dx, 1.0 - bounds.w),
            y: clamp_unit(bounds.y + dy, 1.0 - bounds.h),
            ..bounds
        },
        Edit::Resize { dw, dh, .. } => Bounds {
            w: clamp_unit(bounds.w + dw, 1.0 - bounds.x),
            h: clamp_unit(bounds.h + dh, 1.0 - bounds.y),
            ..bounds
        },
        Edit::Recolor { .. } | Edit::Reorder { .. } | Edit::UpdateFontSize { .. } => bounds,
    }
}
