// src/source/stackoverflow.rs
//! Q&A platform: one row per user, keyed by `display_name`.

use super::{Source, SourceProfile};
use crate::aggregate::{AggregateSpec, Reducer};
use crate::clean::{FieldRule, FieldSpec};
use crate::features::{FeatureRule, ARCHITECTURE_VOCABULARY};
use crate::outliers::OutlierRule;
use crate::scoring::{RoleFormula, SourceFormulas};

pub const DEFAULT_FILE: &str = "stackoverflow_200.csv";

pub(super) fn profile() -> SourceProfile {
    SourceProfile {
        source: Source::StackOverflow,
        default_file: DEFAULT_FILE,
        identity: "display_name",
        fields: vec![
            FieldSpec::new("reputation", FieldRule::Numeric),
            FieldSpec::new("total_answer_score_fetched", FieldRule::Numeric),
            FieldSpec::new("avg_score_per_answer", FieldRule::Numeric),
            FieldSpec::new("accepted_answer_ratio", FieldRule::Numeric),
            FieldSpec::new(
                "top_tags",
                FieldRule::Text {
                    default: Some("general"),
                },
            ),
        ],
        aggregates: vec![
            AggregateSpec::new("reputation", Reducer::Max),
            AggregateSpec::new("total_answer_score_fetched", Reducer::Sum),
            AggregateSpec::new("avg_score_per_answer", Reducer::Mean),
            AggregateSpec::new("accepted_answer_ratio", Reducer::Mean),
            AggregateSpec::new("top_tags", Reducer::Concat),
        ],
        outliers: vec![
            OutlierRule::cap("reputation"),
            OutlierRule::cap("total_answer_score_fetched"),
            OutlierRule::cap("avg_score_per_answer"),
        ],
        features: vec![
            FeatureRule::TokenCount {
                column: "top_tags",
                output: "tag_breadth",
            },
            FeatureRule::KeywordCount {
                column: "top_tags",
                output: "arch_keywords",
                vocabulary: ARCHITECTURE_VOCABULARY,
            },
        ],
        normalized: vec![
            "reputation",
            "accepted_answer_ratio",
            "avg_score_per_answer",
            "tag_breadth",
            "arch_keywords",
        ],
        formulas: SourceFormulas {
            developer: RoleFormula::new([
                ("accepted_answer_ratio", 0.7),
                ("avg_score_per_answer", 0.3),
            ]),
            senior_developer: RoleFormula::new([("reputation", 0.6), ("avg_score_per_answer", 0.4)]),
            solution_architect: RoleFormula::new([
                ("arch_keywords", 0.5),
                ("tag_breadth", 0.3),
                ("reputation", 0.2),
            ]),
        },
    }
}
