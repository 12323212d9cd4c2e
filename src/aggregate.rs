// src/aggregate.rs
//! Aggregator: one row per candidate identity.
//!
//! Every declared field is reduced over the group with its `Reducer`. All
//! reducers return the record's own value for a single-record group, so a
//! candidate with one row passes through unchanged.

use std::collections::BTreeMap;

use crate::clean::CleanRecord;
use crate::error::{PipelineError, Result};
use crate::source::Source;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    /// Cumulative counts.
    Sum,
    /// Flags: did any record show the capability.
    Max,
    /// Quality ratings.
    Mean,
    /// Number of records with a non-empty value (text or numeric input).
    Count,
    /// Text: first value in input order.
    First,
    /// Text: values joined with `,` in input order.
    Concat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSpec {
    pub input: &'static str,
    pub output: &'static str,
    pub reducer: Reducer,
}

impl AggregateSpec {
    pub const fn new(input: &'static str, reducer: Reducer) -> Self {
        Self {
            input,
            output: input,
            reducer,
        }
    }

    pub const fn renamed(input: &'static str, output: &'static str, reducer: Reducer) -> Self {
        Self {
            input,
            output,
            reducer,
        }
    }
}

/// One candidate per source. `raw` and `text` come from aggregation; `derived`
/// is filled by the outlier and feature stages, each of which returns a new
/// vector instead of editing in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CandidateAggregate {
    pub identity: String,
    pub raw: BTreeMap<String, f64>,
    pub text: BTreeMap<String, String>,
    pub derived: BTreeMap<String, f64>,
}

impl CandidateAggregate {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            ..Default::default()
        }
    }

    pub fn raw(&self, name: &str) -> Option<f64> {
        self.raw.get(name).copied()
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.text.get(name).map(String::as_str)
    }

    /// Value seen by scaling: derived first (capped/log/engineered), then raw.
    pub fn feature(&self, name: &str) -> Option<f64> {
        self.derived.get(name).or_else(|| self.raw.get(name)).copied()
    }

    /// Value shown to people: raw first, then derived.
    pub fn display(&self, name: &str) -> Option<f64> {
        self.raw.get(name).or_else(|| self.derived.get(name)).copied()
    }

    pub fn with_raw(mut self, name: impl Into<String>, v: f64) -> Self {
        self.raw.insert(name.into(), v);
        self
    }

    pub fn with_text(mut self, name: impl Into<String>, v: impl Into<String>) -> Self {
        self.text.insert(name.into(), v.into());
        self
    }

    pub fn with_derived(mut self, name: impl Into<String>, v: f64) -> Self {
        self.derived.insert(name.into(), v);
        self
    }
}

fn numeric_input(
    platform: Source,
    group: &[&CleanRecord],
    input: &str,
) -> Result<Vec<f64>> {
    group
        .iter()
        .map(|r| {
            r.numeric
                .get(input)
                .copied()
                .ok_or_else(|| PipelineError::SchemaViolation {
                    platform,
                    column: input.to_string(),
                })
        })
        .collect()
}

fn text_input<'a>(
    platform: Source,
    group: &[&'a CleanRecord],
    input: &str,
) -> Result<Vec<&'a str>> {
    group
        .iter()
        .map(|r| {
            r.text
                .get(input)
                .map(String::as_str)
                .ok_or_else(|| PipelineError::SchemaViolation {
                    platform,
                    column: input.to_string(),
                })
        })
        .collect()
}

/// Group by identity and reduce. Output is ordered by identity.
pub fn aggregate(
    platform: Source,
    records: &[CleanRecord],
    specs: &[AggregateSpec],
) -> Result<Vec<CandidateAggregate>> {
    let mut groups: BTreeMap<&str, Vec<&CleanRecord>> = BTreeMap::new();
    for r in records {
        groups.entry(r.identity.as_str()).or_default().push(r);
    }

    let mut out = Vec::with_capacity(groups.len());
    for (identity, group) in groups {
        let mut cand = CandidateAggregate::new(identity);
        for spec in specs {
            match spec.reducer {
                Reducer::Sum => {
                    let v = numeric_input(platform, &group, spec.input)?;
                    cand.raw.insert(spec.output.to_string(), v.iter().sum());
                }
                Reducer::Max => {
                    let v = numeric_input(platform, &group, spec.input)?;
                    let m = v.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                    cand.raw.insert(spec.output.to_string(), m);
                }
                Reducer::Mean => {
                    let v = numeric_input(platform, &group, spec.input)?;
                    let mean = v.iter().sum::<f64>() / v.len() as f64;
                    cand.raw.insert(spec.output.to_string(), mean);
                }
                Reducer::Count => {
                    let n = group
                        .iter()
                        .filter(|r| {
                            r.numeric.contains_key(spec.input)
                                || r.text.get(spec.input).is_some_and(|t| !t.is_empty())
                        })
                        .count();
                    cand.raw.insert(spec.output.to_string(), n as f64);
                }
                Reducer::First => {
                    let v = text_input(platform, &group, spec.input)?;
                    let first = v.first().copied().unwrap_or_default();
                    cand.text.insert(spec.output.to_string(), first.to_string());
                }
                Reducer::Concat => {
                    let v = text_input(platform, &group, spec.input)?;
                    cand.text.insert(spec.output.to_string(), v.join(","));
                }
            }
        }
        out.push(cand);
    }
    Ok(out)
}
