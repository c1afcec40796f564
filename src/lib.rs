//! ForgeLabels Core - Label Edit Compiler
//!
//! # The Six Laws (Non-Negotiable)
//! 1. The Document Is Truth
//! 2. Five Operations, No More
//! 3. Clamping Is Protective
//! 4. Every Anomaly Is Reported
//! 5. One Repair, Then Fail
//! 6. Agents Suggest, Engine Enforces

pub mod color;
pub mod config;
pub mod document;
pub mod edits;
pub mod engine;
pub mod font_size;
pub mod hashing;
pub mod logging;
pub mod repair;
pub mod resolver;
pub mod schema;
pub mod validation;

pub use color::{hex_to_closest_palette_role, normalize_hex_color, ColorError};
pub use config::{ConfigError, EngineConfig};
pub use document::{Bounds, ColorRole, Element, LabelDocument, Palette};
pub use edits::{parse_edit, Edit, EditKind, EditSchema};
pub use engine::{EditEngine, EditReport, EngineError};
pub use font_size::{parse_font_size, FontSizeHint, FontSizeMultipliers};
pub use logging::{EngineLogger, MemoryLogger, NullLogger, TracingLogger};
pub use repair::{validate_and_repair, RepairError};
pub use resolver::{resolve_property_edits, PropertyInstruction};
pub use schema::{Schema, SchemaViolation, SerdeSchema};
pub use validation::{apply_edit_to_bounds, validate_and_clamp_edits, ValidationOptions, ValidationResult};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
