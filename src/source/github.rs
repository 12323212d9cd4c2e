// src/source/github.rs
//! Code-hosting platform: one row per repository, keyed by `username`.

use super::{Source, SourceProfile};
use crate::aggregate::{AggregateSpec, Reducer};
use crate::clean::{FieldRule, FieldSpec};
use crate::outliers::OutlierRule;
use crate::scoring::{RoleFormula, SourceFormulas};

pub const DEFAULT_FILE: &str = "github_candidates_1.csv";

pub(super) fn profile() -> SourceProfile {
    SourceProfile {
        source: Source::GitHub,
        default_file: DEFAULT_FILE,
        identity: "username",
        fields: vec![
            FieldSpec::new("dominant_language", FieldRule::Text { default: None }),
            FieldSpec::new("public_repos", FieldRule::Numeric),
            FieldSpec::new("total_stars", FieldRule::Numeric),
            FieldSpec::new("total_forks", FieldRule::Numeric),
            FieldSpec::new("commits_12m", FieldRule::Numeric),
            FieldSpec::new("has_cicd", FieldRule::Flag),
        ],
        aggregates: vec![
            AggregateSpec::new("public_repos", Reducer::Sum),
            AggregateSpec::new("total_stars", Reducer::Sum),
            AggregateSpec::new("total_forks", Reducer::Sum),
            AggregateSpec::new("commits_12m", Reducer::Sum),
            AggregateSpec::new("has_cicd", Reducer::Max),
            AggregateSpec::new("dominant_language", Reducer::First),
        ],
        outliers: vec![
            OutlierRule::log("total_stars"),
            OutlierRule::log("total_forks"),
        ],
        features: vec![],
        normalized: vec![
            "public_repos",
            "log_total_stars",
            "log_total_forks",
            "commits_12m",
            "has_cicd",
        ],
        formulas: SourceFormulas {
            developer: RoleFormula::new([("commits_12m", 0.7), ("public_repos", 0.3)]),
            senior_developer: RoleFormula::new([("log_total_stars", 0.6), ("public_repos", 0.4)]),
            solution_architect: RoleFormula::new([
                ("log_total_forks", 0.5),
                ("has_cicd", 0.4),
                ("public_repos", 0.1),
            ]),
        },
    }
}
