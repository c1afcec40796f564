//! Edit Engine - Single Entry Point for Agent Edits
//!
//! CRITICAL: every edit that reaches a document goes through
//! validate_and_clamp_edits first. No bypass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{ConfigError, EngineConfig};
use crate::document::{LabelDocument, Z_MAX, Z_MIN};
use crate::edits::Edit;
use crate::hashing::compute_batch_hash;
use crate::logging::{EngineLogger, TracingLogger};
use crate::resolver::{resolve_property_edits, PropertyInstruction};
use crate::validation::{apply_edit_to_bounds, validate_and_clamp_edits, ValidationOptions, ValidationResult};
use crate::ENGINE_VERSION;

const COMPONENT: &str = "engine";

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unknown element: {0}")]
    UnknownElement(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Auditable outcome of one validation pass
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditReport {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub engine_version: String,
    pub batch_hash: String,
    pub validation: ValidationResult,
}

pub struct EditEngine {
    config: EngineConfig,
    logger: Arc<dyn EngineLogger>,
}

impl EditEngine {
    pub fn new(config: EngineConfig, logger: Arc<dyn EngineLogger>) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config, logger })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn options_for(&self, document: &LabelDocument) -> ValidationOptions {
        ValidationOptions::from_config(&self.config, document.element_ids())
    }

    /// Resolve property instructions without validating them
    pub fn resolve(&self, instructions: &[PropertyInstruction], document: &LabelDocument) -> Vec<Edit> {
        resolve_property_edits(
            instructions,
            document,
            &self.config.font_size_multipliers,
            self.config.default_font_size,
            self.logger.as_ref(),
        )
    }

    /// Resolve agent instructions and validate the result against the live document
    pub fn propose(
        &self,
        instructions: &[PropertyInstruction],
        document: &LabelDocument,
    ) -> Result<EditReport, EngineError> {
        let edits = self.resolve(instructions, document);
        let raw = edits
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.validate_raw(&raw, document)
    }

    /// Validate raw agent edits against the live document
    pub fn validate_raw(&self, raw_edits: &[Value], document: &LabelDocument) -> Result<EditReport, EngineError> {
        let options = self.options_for(document);
        let validation = validate_and_clamp_edits(raw_edits, &options, self.logger.as_ref());
        let batch_hash = compute_batch_hash(&validation.valid_edits, ENGINE_VERSION)?;

        let report = EditReport {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            engine_version: ENGINE_VERSION.to_string(),
            batch_hash,
            validation,
        };

        self.logger.info(
            COMPONENT,
            &format!(
                "report {}: {} accepted of {} proposed",
                report.id,
                report.validation.valid_edits.len(),
                raw_edits.len()
            ),
        );
        Ok(report)
    }

    /// Apply validated edits to a document.
    ///
    /// The whole batch is checked for unknown targets before anything is written.
    pub fn apply(&self, document: &mut LabelDocument, edits: &[Edit]) -> Result<(), EngineError> {
        if let Some(missing) = edits.iter().find(|e| document.element(e.element_id()).is_none()) {
            return Err(EngineError::UnknownElement(missing.element_id().to_string()));
        }

        for edit in edits {
            let Some(element) = document.element_mut(edit.element_id()) else {
                continue;
            };
            match edit {
                Edit::Move { .. } | Edit::Resize { .. } => {
                    element.bounds = apply_edit_to_bounds(element.bounds, edit);
                }
                Edit::Recolor { color_role, .. } => element.style.color_role = Some(*color_role),
                Edit::Reorder { z, .. } => {
                    element.z = (*z).clamp(Z_MIN, Z_MAX) as u32;
                }
                Edit::UpdateFontSize { font_size, .. } => element.style.font_size = Some(*font_size),
            }
            if !element.bounds.is_normalized() {
                self.logger.warn(
                    COMPONENT,
                    &format!("element {:?} has bounds outside the canvas", element.id),
                );
            }
        }
        Ok(())
    }
}

impl Default for EditEngine {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            logger: Arc::new(TracingLogger),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ColorRole;
    use crate::logging::NullLogger;
    use serde_json::json;

    fn document() -> LabelDocument {
        serde_json::from_value(json!({
            "canvas": {"width": 300, "height": 200, "unit": "mm"},
            "palette": {
                "primary": "#222222", "secondary": "#888888",
                "accent": "#00A86B", "background": "#FFFFFF"
            },
            "elements": [
                {"id": "badge", "kind": "shape",
                 "bounds": {"x": 0.5, "y": 0.5, "w": 0.25, "h": 0.25}, "z": 2}
            ]
        }))
        .unwrap()
    }

    fn engine() -> EditEngine {
        EditEngine::new(EngineConfig::default(), Arc::new(NullLogger)).unwrap()
    }

    #[test]
    fn test_propose_resolves_then_validates() {
        let doc = document();
        let report = engine()
            .propose(
                &[
                    PropertyInstruction::new("badge", "x", json!(0.0)),
                    PropertyInstruction::new("badge", "color", json!("#00a86b")),
                    PropertyInstruction::new("nobody", "zIndex", json!(3)),
                ],
                &doc,
            )
            .unwrap();

        assert_eq!(report.engine_version, ENGINE_VERSION);
        assert_eq!(
            report.validation.valid_edits,
            vec![
                Edit::Move { element_id: "badge".into(), dx: -0.2, dy: 0.0 },
                Edit::Recolor { element_id: "badge".into(), color_role: ColorRole::Accent },
            ]
        );
        assert_eq!(report.validation.clamped_edits.len(), 1);
        assert_eq!(report.validation.rejected_edits.len(), 1);
        assert_eq!(report.validation.rejected_edits[0].index, 2);
    }

    #[test]
    fn test_batch_hash_is_stable_across_reports() {
        let doc = document();
        let raw = [json!({"op": "reorder", "id": "badge", "z": 5})];
        let a = engine().validate_raw(&raw, &doc).unwrap();
        let b = engine().validate_raw(&raw, &doc).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.batch_hash, b.batch_hash);
    }

    #[test]
    fn test_apply_writes_bounds_and_style() {
        let mut doc = document();
        engine()
            .apply(
                &mut doc,
                &[
                    Edit::Move { element_id: "badge".into(), dx: 0.4, dy: 0.0 },
                    Edit::Reorder { element_id: "badge".into(), z: 9 },
                    Edit::UpdateFontSize { element_id: "badge".into(), font_size: 30 },
                ],
            )
            .unwrap();
        let badge = doc.element("badge").unwrap();
        assert_eq!(badge.bounds.x, 0.75);
        assert_eq!(badge.z, 9);
        assert_eq!(badge.style.font_size, Some(30));
    }

    #[test]
    fn test_apply_is_all_or_nothing_on_unknown_target() {
        let mut doc = document();
        let before = doc.clone();
        let err = engine()
            .apply(
                &mut doc,
                &[
                    Edit::Reorder { element_id: "badge".into(), z: 9 },
                    Edit::Reorder { element_id: "ghost".into(), z: 1 },
                ],
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownElement(id) if id == "ghost"));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_configured_default_font_size_seeds_relative_hints() {
        let config = EngineConfig { default_font_size: 40, ..EngineConfig::default() };
        let engine = EditEngine::new(config, Arc::new(NullLogger)).unwrap();
        let edits = engine.resolve(
            &[PropertyInstruction::new("badge", "fontSize", json!("larger"))],
            &document(),
        );
        assert_eq!(edits, vec![Edit::UpdateFontSize { element_id: "badge".into(), font_size: 48 }]);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = EngineConfig { max_delta: f64::NAN, ..EngineConfig::default() };
        assert!(matches!(
            EditEngine::new(config, Arc::new(NullLogger)),
            Err(EngineError::Config(_))
        ));
    }
}
