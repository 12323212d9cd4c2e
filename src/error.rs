// src/error.rs
//! Error taxonomy for a pipeline run.
//!
//! Only `MissingSource` is recovered by the orchestrator (the source is
//! skipped with a notice). Everything else is fatal for the source it names
//! and leaves the other sources untouched.

use std::path::PathBuf;
use thiserror::Error;

use crate::role::Role;
use crate::source::Source;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("'{}' not found; skipping {platform} analysis", path.display())]
    MissingSource { platform: Source, path: PathBuf },

    #[error("{platform}: malformed input: {detail}")]
    Malformed { platform: Source, detail: String },

    #[error("{platform}: required column '{column}' is absent")]
    SchemaViolation { platform: Source, column: String },

    #[error("unknown source '{0}' (expected github, kaggle or stackoverflow)")]
    UnknownSource(String),

    #[error("unknown role '{0}' (expected developer, senior-developer or solution-architect)")]
    UnknownRole(String),

    #[error("{platform}/{role}: invalid weights: {detail}")]
    InvalidWeights {
        platform: Source,
        role: Role,
        detail: String,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// True for the one variant the orchestrator turns into a skip.
    pub fn is_missing_source(&self) -> bool {
        matches!(self, PipelineError::MissingSource { .. })
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
