// src/source/kaggle.rs
//! Data-science competition platform: one row per dataset, keyed by `Author_name`.

use super::{Source, SourceProfile};
use crate::aggregate::{AggregateSpec, Reducer};
use crate::clean::{FieldRule, FieldSpec};
use crate::outliers::OutlierRule;
use crate::scoring::{RoleFormula, SourceFormulas};

pub const DEFAULT_FILE: &str = "kaggle-preprocessed.csv";

/// Medal tier → points. Anything else (including missing) scores 0.
pub const MEDAL_POINTS: &[(&str, f64)] = &[
    ("Gold", 5.0),
    ("Silver", 3.0),
    ("Bronze", 1.0),
    ("No Medal", 0.0),
];

pub(super) fn profile() -> SourceProfile {
    SourceProfile {
        source: Source::Kaggle,
        default_file: DEFAULT_FILE,
        identity: "Author_name",
        fields: vec![
            FieldSpec::new("Dataset_name", FieldRule::Text { default: None }),
            FieldSpec::new("No_of_files", FieldRule::Numeric),
            FieldSpec::new("Upvotes", FieldRule::Numeric),
            FieldSpec::new("Usability", FieldRule::Numeric),
            FieldSpec::new(
                "Medals",
                FieldRule::Ordinal {
                    into: "medal_points",
                    table: MEDAL_POINTS,
                },
            ),
            FieldSpec::new("size", FieldRule::SizeMb { into: "size_mb" }),
        ],
        aggregates: vec![
            AggregateSpec::renamed("Dataset_name", "datasets", Reducer::Count),
            AggregateSpec::renamed("No_of_files", "files", Reducer::Sum),
            AggregateSpec::renamed("Upvotes", "upvotes", Reducer::Sum),
            AggregateSpec::renamed("Usability", "usability", Reducer::Mean),
            AggregateSpec::new("medal_points", Reducer::Sum),
            AggregateSpec::new("size_mb", Reducer::Sum),
        ],
        outliers: vec![OutlierRule::log("upvotes"), OutlierRule::log("size_mb")],
        features: vec![],
        normalized: vec![
            "datasets",
            "files",
            "log_upvotes",
            "usability",
            "medal_points",
            "log_size_mb",
        ],
        formulas: SourceFormulas {
            developer: RoleFormula::new([("usability", 0.7), ("datasets", 0.3)]),
            senior_developer: RoleFormula::new([("medal_points", 0.6), ("log_upvotes", 0.4)]),
            solution_architect: RoleFormula::new([
                ("files", 0.4),
                ("log_size_mb", 0.4),
                ("usability", 0.2),
            ]),
        },
    }
}
