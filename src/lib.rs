// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod error;
pub mod role;
pub mod source;
pub mod telemetry;

// Stages, in pipeline order
pub mod ingest;
pub mod clean;
pub mod aggregate;
pub mod outliers;
pub mod features;
pub mod normalize;
pub mod scoring;
pub mod rank;
pub mod reasons;

pub mod config;
pub mod pipeline;
pub mod report;

// ---- Re-exports for stable public API ----
pub use crate::config::RankerConfig;
pub use crate::error::{PipelineError, Result};
pub use crate::pipeline::{Pipeline, ScoredPopulation};
pub use crate::report::{Shortlist, SourceOutcome, SourceReport};
pub use crate::role::Role;
pub use crate::scoring::{RoleFormula, ScoreSet, ScoringTable};
pub use crate::source::Source;
