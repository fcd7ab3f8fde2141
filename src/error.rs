//! Error types for the Fitplan engine
//!
//! Data-quality problems (missing quantities, absent timestamps, unknown
//! equipment) are never errors: they are absorbed locally as zero
//! contribution. Only collaborator failures and configuration/IO problems
//! surface here.

use thiserror::Error;

/// Errors that can occur while producing recommendations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Candidate source failed: {0}")]
    Source(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse input: {0}")]
    ParseError(String),
}
