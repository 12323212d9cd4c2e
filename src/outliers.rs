// src/outliers.rs
//! Outlier Mitigator: log compression or percentile capping, per field.
//!
//! Both policies write into `derived` and leave `raw` untouched, so reason
//! text keeps quoting the real figures.

use crate::aggregate::CandidateAggregate;
use crate::error::{PipelineError, Result};
use crate::source::Source;

/// Percentile used by the capping policy unless a source declares otherwise.
pub const DEFAULT_CAP_PERCENTILE: f64 = 95.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutlierPolicy {
    /// `ln(1 + x)`, written to `log_<field>`.
    Log1p,
    /// Winsorize at the given percentile (0–100), written to `<field>`.
    Cap { percentile: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutlierRule {
    pub field: &'static str,
    pub policy: OutlierPolicy,
}

impl OutlierRule {
    pub const fn log(field: &'static str) -> Self {
        Self {
            field,
            policy: OutlierPolicy::Log1p,
        }
    }

    pub const fn cap(field: &'static str) -> Self {
        Self {
            field,
            policy: OutlierPolicy::Cap {
                percentile: DEFAULT_CAP_PERCENTILE,
            },
        }
    }

    /// Name of the derived field this rule writes.
    pub fn output(&self) -> String {
        match self.policy {
            OutlierPolicy::Log1p => format!("log_{}", self.field),
            OutlierPolicy::Cap { .. } => self.field.to_string(),
        }
    }
}

/// Percentile of an ascending-sorted slice, interpolating linearly between
/// the closest ranks.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;

    if upper >= sorted.len() {
        sorted[sorted.len() - 1]
    } else {
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

/// Counts are non-negative; anything below zero compresses to 0.
fn log_compress(x: f64) -> f64 {
    x.max(0.0).ln_1p()
}

fn column(platform: Source, candidates: &[CandidateAggregate], field: &str) -> Result<Vec<f64>> {
    candidates
        .iter()
        .map(|c| {
            c.feature(field).ok_or_else(|| PipelineError::SchemaViolation {
                platform,
                column: field.to_string(),
            })
        })
        .collect()
}

/// Apply each rule in order over the whole population.
pub fn mitigate(
    platform: Source,
    candidates: &[CandidateAggregate],
    rules: &[OutlierRule],
) -> Result<Vec<CandidateAggregate>> {
    let mut out = candidates.to_vec();
    for rule in rules {
        let values = column(platform, &out, rule.field)?;
        let name = rule.output();
        let mitigated: Vec<f64> = match rule.policy {
            OutlierPolicy::Log1p => values.iter().map(|&x| log_compress(x)).collect(),
            OutlierPolicy::Cap { percentile: p } => {
                let mut sorted = values.clone();
                sorted.sort_by(f64::total_cmp);
                let limit = percentile(&sorted, p);
                tracing::debug!(source = platform.slug(), field = rule.field, limit, "cap");
                values.iter().map(|&x| x.min(limit)).collect()
            }
        };
        for (c, v) in out.iter_mut().zip(mitigated) {
            c.derived.insert(name.clone(), v);
        }
    }
    Ok(out)
}
