//! Self-Repair - One Corrective Retry for Generative Steps
//!
//! Validate the candidate. If it fails, hand the validated input and the
//! failure back to the generator exactly once, then validate again.

use serde_json::Value;
use std::future::Future;
use thiserror::Error;

use crate::logging::EngineLogger;
use crate::schema::{Schema, SchemaViolation};

const COMPONENT: &str = "repair";

#[derive(Debug, Error)]
pub enum RepairError {
    #[error("Input rejected by {schema}: {violation}")]
    InvalidInput {
        schema: String,
        violation: SchemaViolation,
    },

    #[error("Repair call failed after output was rejected ({original}): {source}")]
    RepairCallFailed {
        original: SchemaViolation,
        #[source]
        source: anyhow::Error,
    },

    #[error("Repair exhausted: original output invalid ({original}); repaired output invalid ({repaired})")]
    RepairExhausted {
        original: SchemaViolation,
        repaired: SchemaViolation,
    },
}

/// Validate a generative step's output, repairing it at most once.
///
/// `repair_fn` receives the validated input and the violation text. It is
/// `FnOnce`: a second attempt cannot be expressed.
pub async fn validate_and_repair<IS, OS, F, Fut>(
    input: &Value,
    candidate: Value,
    input_schema: &IS,
    output_schema: &OS,
    repair_fn: F,
    logger: &dyn EngineLogger,
) -> Result<OS::Output, RepairError>
where
    IS: Schema,
    OS: Schema,
    F: FnOnce(IS::Output, String) -> Fut,
    Fut: Future<Output = anyhow::Result<Value>>,
{
    let validated_input = input_schema
        .parse(input)
        .map_err(|violation| RepairError::InvalidInput {
            schema: input_schema.name().to_string(),
            violation,
        })?;

    let original = match output_schema.parse(&candidate) {
        Ok(output) => return Ok(output),
        Err(violation) => violation,
    };

    logger.warn(
        COMPONENT,
        &format!("{} output rejected, requesting repair: {}", output_schema.name(), original),
    );

    let repaired = repair_fn(validated_input, original.to_string())
        .await
        .map_err(|source| {
            logger.error(COMPONENT, &format!("repair call failed: {source}"));
            RepairError::RepairCallFailed {
                original: original.clone(),
                source,
            }
        })?;

    match output_schema.parse(&repaired) {
        Ok(output) => {
            logger.info(COMPONENT, &format!("{} output repaired", output_schema.name()));
            Ok(output)
        }
        Err(repaired) => {
            logger.error(
                COMPONENT,
                &format!("{} output still invalid after repair: {}", output_schema.name(), repaired),
            );
            Err(RepairError::RepairExhausted { original, repaired })
        }
    }
}
