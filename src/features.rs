// src/features.rs
//! Feature Engineer: secondary signals derived from free-text fields.

use crate::aggregate::CandidateAggregate;
use crate::error::{PipelineError, Result};
use crate::source::Source;

/// Tags that point at architecture / platform work.
pub const ARCHITECTURE_VOCABULARY: &[&str] = &[
    "azure",
    "aws",
    "kubernetes",
    "sql-server",
    "database",
    "asynchronous",
    "git-submodules",
];

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureRule {
    /// Number of comma-separated tokens in `column` (minimum 1).
    TokenCount {
        column: &'static str,
        output: &'static str,
    },
    /// Number of distinct `vocabulary` terms found in `column`.
    KeywordCount {
        column: &'static str,
        output: &'static str,
        vocabulary: &'static [&'static str],
    },
}

impl FeatureRule {
    pub fn output(&self) -> &'static str {
        match self {
            FeatureRule::TokenCount { output, .. } | FeatureRule::KeywordCount { output, .. } => {
                *output
            }
        }
    }

    fn column(&self) -> &'static str {
        match self {
            FeatureRule::TokenCount { column, .. } | FeatureRule::KeywordCount { column, .. } => {
                *column
            }
        }
    }
}

/// Breadth of a tag list: non-empty comma-separated tokens, never below 1.
/// Empty tokens from doubled or trailing commas are not counted.
pub fn token_count(text: &str) -> usize {
    text.split(',')
        .filter(|t| !t.trim().is_empty())
        .count()
        .max(1)
}

/// Vocabulary terms occurring anywhere in `text` (case-insensitive substring),
/// each counted once.
pub fn keyword_count(text: &str, vocabulary: &[&str]) -> usize {
    let haystack = text.to_lowercase();
    vocabulary
        .iter()
        .filter(|kw| haystack.contains(&kw.to_lowercase()))
        .count()
}

/// Apply the rules, returning candidates with the derived fields added.
pub fn engineer(
    platform: Source,
    candidates: &[CandidateAggregate],
    rules: &[FeatureRule],
) -> Result<Vec<CandidateAggregate>> {
    candidates
        .iter()
        .map(|c| {
            let mut next = c.clone();
            for rule in rules {
                let text = c
                    .text(rule.column())
                    .ok_or_else(|| PipelineError::SchemaViolation {
                        platform,
                        column: rule.column().to_string(),
                    })?;
                let v = match rule {
                    FeatureRule::TokenCount { .. } => token_count(text),
                    FeatureRule::KeywordCount { vocabulary, .. } => keyword_count(text, vocabulary),
                };
                next.derived.insert(rule.output().to_string(), v as f64);
            }
            Ok(next)
        })
        .collect()
}
