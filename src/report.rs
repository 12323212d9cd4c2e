// src/report.rs
//! Shortlist output: per-source outcome plus console and JSON rendering.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;

use crate::rank::Ranking;
use crate::source::Source;

const BANNER_WIDTH: usize = 60;

/// What happened to one requested source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceOutcome {
    /// One ranking per role, in `Role::ALL` order.
    Ranked { rankings: Vec<Ranking> },
    /// Input file was absent.
    Skipped { notice: String },
    /// Malformed input, schema violation or similar; other sources are unaffected.
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceReport {
    pub source: Source,
    #[serde(flatten)]
    pub outcome: SourceOutcome,
}

impl SourceReport {
    pub fn rankings(&self) -> Option<&[Ranking]> {
        match &self.outcome {
            SourceOutcome::Ranked { rankings } => Some(rankings),
            _ => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, SourceOutcome::Skipped { .. })
    }
}

/// Result of a full run, in request order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shortlist {
    pub generated_at: DateTime<Utc>,
    pub sources: Vec<SourceReport>,
}

impl Shortlist {
    pub fn new(sources: Vec<SourceReport>) -> Self {
        Self {
            generated_at: Utc::now(),
            sources,
        }
    }

    pub fn get(&self, source: Source) -> Option<&SourceReport> {
        self.sources.iter().find(|r| r.source == source)
    }

    /// True when no requested source could be ranked.
    pub fn is_empty(&self) -> bool {
        self.sources.iter().all(|r| r.rankings().is_none())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Console layout: banner per source, then one block per role.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for report in &self.sources {
            render_source(&mut out, report);
        }
        out
    }
}

fn render_source(out: &mut String, report: &SourceReport) {
    let rule = "=".repeat(BANNER_WIDTH);
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(
        out,
        "STARTING {} CANDIDATE ANALYSIS",
        report.source.label().to_uppercase()
    );
    let _ = writeln!(out, "{rule}");

    match &report.outcome {
        SourceOutcome::Skipped { notice } => {
            let _ = writeln!(out, "{notice}\n");
        }
        SourceOutcome::Failed { error } => {
            let _ = writeln!(out, "Error: {error}. Skipping {} analysis.\n", report.source.label());
        }
        SourceOutcome::Ranked { rankings } => {
            for ranking in rankings {
                let _ = writeln!(
                    out,
                    "\n--- TOP {} {} ({}) ---",
                    ranking.entries.len(),
                    ranking.role.label().to_uppercase(),
                    report.source.label()
                );
                for e in &ranking.entries {
                    let _ = writeln!(out, "{}. {}", e.rank, e.identity);
                    let _ = writeln!(out, "   BASIS: {}", e.reason);
                }
            }
            let _ = writeln!(out, "\n");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::{FieldValue, RankedEntry};
    use crate::role::Role;
    use std::collections::BTreeMap;

    fn ranked() -> SourceReport {
        SourceReport {
            source: Source::GitHub,
            outcome: SourceOutcome::Ranked {
                rankings: vec![Ranking {
                    role: Role::SeniorDeveloper,
                    entries: vec![RankedEntry {
                        rank: 1,
                        identity: "octo".into(),
                        score: 0.9,
                        fields: BTreeMap::from([(
                            "total_stars".to_string(),
                            FieldValue::Number(1500.0),
                        )]),
                        reason: "Selected for community authority.".into(),
                    }],
                }],
            },
        }
    }

    #[test]
    fn text_layout_matches_console_format() {
        let s = Shortlist::new(vec![ranked()]);
        let text = s.render_text();
        assert!(text.starts_with(&format!("{}\nSTARTING GITHUB CANDIDATE ANALYSIS\n", "=".repeat(60))));
        assert!(text.contains("--- TOP 1 SENIOR DEVELOPER (GitHub) ---\n1. octo\n   BASIS: Selected for community authority.\n"));
    }

    #[test]
    fn skipped_source_prints_notice() {
        let s = Shortlist::new(vec![SourceReport {
            source: Source::Kaggle,
            outcome: SourceOutcome::Skipped {
                notice: "Error: 'kaggle-preprocessed.csv' not found. Skipping Kaggle analysis.".into(),
            },
        }]);
        assert!(s.render_text().contains("not found. Skipping Kaggle analysis."));
        assert!(s.is_empty());
        assert!(s.get(Source::Kaggle).unwrap().is_skipped());
    }

    #[test]
    fn json_is_tagged_by_status() {
        let s = Shortlist::new(vec![
            ranked(),
            SourceReport {
                source: Source::StackOverflow,
                outcome: SourceOutcome::Failed {
                    error: "boom".into(),
                },
            },
        ]);
        let v: serde_json::Value = serde_json::from_str(&s.to_json().unwrap()).unwrap();
        let first = &v["sources"][0];
        assert_eq!(first["source"], "github");
        assert_eq!(first["status"], "ranked");
        assert_eq!(first["rankings"][0]["role"], "senior-developer");
        assert_eq!(first["rankings"][0]["entries"][0]["fields"]["total_stars"], 1500.0);
        assert_eq!(v["sources"][1]["status"], "failed");
        assert_eq!(v["sources"][1]["error"], "boom");
    }
}
