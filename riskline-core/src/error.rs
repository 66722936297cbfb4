//! Structured error types for the risk engine.
//!
//! Collector failures are deliberately absent from this taxonomy: they are
//! recovered locally (the affected factor or category degrades) and never
//! propagate to callers. A run either produces a complete report or fails
//! with one of the variants below.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid configuration, detected before any collection begins.
    #[error("configuration: {field}: {reason}")]
    Configuration { field: String, reason: String },

    /// The assembled report could not be written. The in-memory report is
    /// still valid; callers may retry persistence separately.
    #[error("persistence: {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    pub fn configuration(field: &str, reason: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
