// src/source/mod.rs
//! Candidate data sources and their pipeline profiles.
//!
//! A `SourceProfile` is the immutable, declarative description of how one
//! source moves through the stages: which column is the identity, how each
//! field is cleaned and reduced, which outlier policy applies, what is
//! derived, which columns are normalized, and the default role formulas.
//! Profiles are built once and shared (`Source::profile`).

pub mod github;
pub mod kaggle;
pub mod stackoverflow;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::aggregate::AggregateSpec;
use crate::clean::FieldSpec;
use crate::error::PipelineError;
use crate::features::FeatureRule;
use crate::outliers::OutlierRule;
use crate::scoring::SourceFormulas;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    GitHub,
    Kaggle,
    StackOverflow,
}

static GITHUB: Lazy<SourceProfile> = Lazy::new(github::profile);
static KAGGLE: Lazy<SourceProfile> = Lazy::new(kaggle::profile);
static STACKOVERFLOW: Lazy<SourceProfile> = Lazy::new(stackoverflow::profile);

impl Source {
    /// All sources in report order.
    pub const ALL: [Source; 3] = [Source::GitHub, Source::Kaggle, Source::StackOverflow];

    pub fn label(self) -> &'static str {
        match self {
            Source::GitHub => "GitHub",
            Source::Kaggle => "Kaggle",
            Source::StackOverflow => "StackOverflow",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Source::GitHub => "github",
            Source::Kaggle => "kaggle",
            Source::StackOverflow => "stackoverflow",
        }
    }

    pub fn profile(self) -> &'static SourceProfile {
        match self {
            Source::GitHub => &GITHUB,
            Source::Kaggle => &KAGGLE,
            Source::StackOverflow => &STACKOVERFLOW,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Source {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect();
        match key.as_str() {
            "github" | "gh" => Ok(Source::GitHub),
            "kaggle" => Ok(Source::Kaggle),
            "stackoverflow" | "so" => Ok(Source::StackOverflow),
            _ => Err(PipelineError::UnknownSource(s.to_string())),
        }
    }
}

/// Declarative stage configuration for one source.
#[derive(Debug, Clone)]
pub struct SourceProfile {
    pub source: Source,
    /// File name looked up under the data directory unless overridden.
    pub default_file: &'static str,
    /// Natural key used to group raw rows into one candidate.
    pub identity: &'static str,
    pub fields: Vec<FieldSpec>,
    pub aggregates: Vec<AggregateSpec>,
    pub outliers: Vec<OutlierRule>,
    pub features: Vec<FeatureRule>,
    /// Ordered column set fed to the normalizer (the FeatureVector layout).
    pub normalized: Vec<&'static str>,
    pub formulas: SourceFormulas,
}

impl SourceProfile {
    /// Columns the input table must carry: the identity plus every cleaned field.
    pub fn required_columns(&self) -> Vec<&'static str> {
        let mut cols = Vec::with_capacity(self.fields.len() + 1);
        cols.push(self.identity);
        for f in &self.fields {
            if !cols.contains(&f.column) {
                cols.push(f.column);
            }
        }
        cols
    }

    pub fn normalized_columns(&self) -> Vec<String> {
        self.normalized.iter().map(|c| c.to_string()).collect()
    }
}
