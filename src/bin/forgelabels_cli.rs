//! ForgeLabels CLI - Bridge interface for the orchestrator
//!
//! Commands: validate, resolve, match-color, font-size
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 when every proposed edit was rejected

use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use forgelabels_core::{
    hex_to_closest_palette_role, normalize_hex_color, parse_font_size, EditEngine, EngineConfig,
    FontSizeHint, LabelDocument, Palette, PropertyInstruction, TracingLogger,
};

#[derive(Parser)]
#[command(name = "forgelabels-cli")]
#[command(about = "ForgeLabels CLI - Label Edit Compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to engine config JSON
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and clamp raw edits against a document
    Validate {
        /// JSON payload: {"document": ..., "edits": [...]}
        #[arg(short, long)]
        payload: String,
    },

    /// Resolve property instructions, then validate them
    Resolve {
        /// JSON payload: {"document": ..., "instructions": [...]}
        #[arg(short, long)]
        payload: String,
    },

    /// Snap a hex color to the closest palette role
    MatchColor {
        #[arg(long)]
        hex: String,

        /// JSON palette
        #[arg(short, long)]
        palette: String,
    },

    /// Resolve a font-size hint
    FontSize {
        #[arg(long)]
        hint: String,

        #[arg(long)]
        current: u32,
    },
}

#[derive(Deserialize)]
struct ValidatePayload {
    document: LabelDocument,
    edits: Vec<Value>,
}

#[derive(Deserialize)]
struct ResolvePayload {
    document: LabelDocument,
    instructions: Vec<PropertyInstruction>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn emit(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => {
            tracing::error!("failed to serialize output: {e}");
            println!(r#"{{"success": false, "error": "failed to serialize output"}}"#);
        }
    }
}

fn failure(error: impl std::fmt::Display) -> ExitCode {
    emit(&serde_json::json!({"success": false, "error": error.to_string()}));
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match EngineConfig::load_from_file(path) {
            Ok(c) => c,
            Err(e) => return failure(e),
        },
        None => EngineConfig::default(),
    };

    let engine = match EditEngine::new(config, Arc::new(TracingLogger)) {
        Ok(e) => e,
        Err(e) => return failure(e),
    };

    match cli.command {
        Commands::Validate { payload } => {
            let payload: ValidatePayload = match serde_json::from_str(&payload) {
                Ok(p) => p,
                Err(e) => return failure(format!("Invalid payload: {e}")),
            };
            match engine.validate_raw(&payload.edits, &payload.document) {
                Ok(report) => {
                    let all_rejected = report.validation.all_rejected();
                    emit(&serde_json::json!({"success": true, "report": report}));
                    if all_rejected { ExitCode::from(2) } else { ExitCode::SUCCESS }
                }
                Err(e) => failure(e),
            }
        }

        Commands::Resolve { payload } => {
            let payload: ResolvePayload = match serde_json::from_str(&payload) {
                Ok(p) => p,
                Err(e) => return failure(format!("Invalid payload: {e}")),
            };
            match engine.propose(&payload.instructions, &payload.document) {
                Ok(report) => {
                    let all_rejected = report.validation.all_rejected();
                    emit(&serde_json::json!({"success": true, "report": report}));
                    if all_rejected { ExitCode::from(2) } else { ExitCode::SUCCESS }
                }
                Err(e) => failure(e),
            }
        }

        Commands::MatchColor { hex, palette } => {
            let palette: Palette = match serde_json::from_str(&palette) {
                Ok(p) => p,
                Err(e) => return failure(format!("Invalid palette: {e}")),
            };
            let role = hex_to_closest_palette_role(&hex, &palette, &TracingLogger);
            emit(&serde_json::json!({
                "success": true,
                "normalized": normalize_hex_color(&hex).ok(),
                "role": role,
            }));
            ExitCode::SUCCESS
        }

        Commands::FontSize { hint, current } => {
            let hint = match hint.trim().parse::<f64>() {
                Ok(n) => FontSizeHint::Number(n),
                Err(_) => FontSizeHint::Text(hint),
            };
            let size = parse_font_size(&hint, current, Some(&engine.config().font_size_multipliers));
            emit(&serde_json::json!({"success": true, "fontSize": size}));
            ExitCode::SUCCESS
        }
    }
}
