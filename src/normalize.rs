// src/normalize.rs
//! Normalizer: min-max scaling fit on the current population.
//!
//! A scaler is fit per source per run and never reused. A constant column
//! (`max == min`) maps every value to 0.0.

use serde::Serialize;

use crate::aggregate::CandidateAggregate;
use crate::error::{PipelineError, Result};
use crate::source::Source;

/// Normalized features for one candidate, in the scaler's column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    entries: Vec<(String, f64)>,
}

impl FeatureVector {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Range {
    min: f64,
    max: f64,
}

impl Range {
    fn scale(&self, x: f64) -> f64 {
        let span = self.max - self.min;
        if !span.is_finite() || span <= 0.0 {
            return 0.0;
        }
        ((x - self.min) / span).clamp(0.0, 1.0)
    }
}

/// Column-wise min-max scaler.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    platform: Source,
    columns: Vec<String>,
    ranges: Vec<Range>,
}

fn feature_value(platform: Source, c: &CandidateAggregate, column: &str) -> Result<f64> {
    c.feature(column)
        .ok_or_else(|| PipelineError::SchemaViolation {
            platform,
            column: column.to_string(),
        })
}

impl MinMaxScaler {
    /// Observe min and max of every column over `candidates`.
    pub fn fit(
        platform: Source,
        candidates: &[CandidateAggregate],
        columns: &[String],
    ) -> Result<Self> {
        let mut ranges = Vec::with_capacity(columns.len());
        for col in columns {
            let mut r = Range {
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
            };
            for c in candidates {
                let v = feature_value(platform, c, col)?;
                r.min = r.min.min(v);
                r.max = r.max.max(v);
            }
            ranges.push(r);
        }
        Ok(Self {
            platform,
            columns: columns.to_vec(),
            ranges,
        })
    }

    /// Scale each candidate's columns into [0, 1].
    pub fn transform(&self, candidates: &[CandidateAggregate]) -> Result<Vec<FeatureVector>> {
        candidates
            .iter()
            .map(|c| {
                let entries = self
                    .columns
                    .iter()
                    .zip(&self.ranges)
                    .map(|(col, range)| {
                        feature_value(self.platform, c, col).map(|v| (col.clone(), range.scale(v)))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(FeatureVector { entries })
            })
            .collect()
    }
}

/// Fit on `candidates` and transform them in one step.
pub fn normalize(
    platform: Source,
    candidates: &[CandidateAggregate],
    columns: &[String],
) -> Result<Vec<FeatureVector>> {
    MinMaxScaler::fit(platform, candidates, columns)?.transform(candidates)
}
