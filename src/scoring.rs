// src/scoring.rs
//! Scorer: per-role weighted sums of normalized features.
//!
//! Formulas live in an immutable `ScoringTable` keyed by (source, role) and
//! are passed explicitly into the pipeline. Every formula is validated before
//! use: weights are non-negative, sum to 1.0, and only reference columns the
//! source normalizes.

use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::normalize::FeatureVector;
use crate::role::Role;
use crate::source::Source;

/// Tolerance for the sum-to-one check.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedTerm {
    pub feature: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoleFormula {
    pub terms: Vec<WeightedTerm>,
}

impl RoleFormula {
    pub fn new<S: Into<String>>(terms: impl IntoIterator<Item = (S, f64)>) -> Self {
        Self {
            terms: terms
                .into_iter()
                .map(|(feature, weight)| WeightedTerm {
                    feature: feature.into(),
                    weight,
                })
                .collect(),
        }
    }

    pub fn weight_sum(&self) -> f64 {
        self.terms.iter().map(|t| t.weight).sum()
    }

    /// Weighted sum over the vector. Validation guarantees every feature is present.
    pub fn score(&self, v: &FeatureVector) -> f64 {
        self.terms
            .iter()
            .map(|t| t.weight * v.get(&t.feature).unwrap_or(0.0))
            .sum()
    }

    pub fn validate(&self, platform: Source, role: Role, columns: &[&str]) -> Result<()> {
        let invalid = |detail: String| PipelineError::InvalidWeights {
            platform,
            role,
            detail,
        };
        if self.terms.is_empty() {
            return Err(invalid("formula has no terms".into()));
        }
        for t in &self.terms {
            if !t.weight.is_finite() || t.weight < 0.0 {
                return Err(invalid(format!("weight for '{}' is {}", t.feature, t.weight)));
            }
            if !columns.contains(&t.feature.as_str()) {
                return Err(invalid(format!(
                    "'{}' is not a normalized {platform} feature",
                    t.feature
                )));
            }
        }
        let sum = self.weight_sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(invalid(format!("weights sum to {sum}, expected 1.0")));
        }
        Ok(())
    }
}

/// The three formulas of one source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFormulas {
    pub developer: RoleFormula,
    pub senior_developer: RoleFormula,
    pub solution_architect: RoleFormula,
}

impl SourceFormulas {
    pub fn get(&self, role: Role) -> &RoleFormula {
        match role {
            Role::Developer => &self.developer,
            Role::SeniorDeveloper => &self.senior_developer,
            Role::SolutionArchitect => &self.solution_architect,
        }
    }

    fn get_mut(&mut self, role: Role) -> &mut RoleFormula {
        match role {
            Role::Developer => &mut self.developer,
            Role::SeniorDeveloper => &mut self.senior_developer,
            Role::SolutionArchitect => &mut self.solution_architect,
        }
    }
}

/// Formulas for every (source, role) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringTable {
    github: SourceFormulas,
    kaggle: SourceFormulas,
    stackoverflow: SourceFormulas,
}

impl Default for ScoringTable {
    fn default() -> Self {
        Self {
            github: Source::GitHub.profile().formulas.clone(),
            kaggle: Source::Kaggle.profile().formulas.clone(),
            stackoverflow: Source::StackOverflow.profile().formulas.clone(),
        }
    }
}

impl ScoringTable {
    pub fn for_source(&self, source: Source) -> &SourceFormulas {
        match source {
            Source::GitHub => &self.github,
            Source::Kaggle => &self.kaggle,
            Source::StackOverflow => &self.stackoverflow,
        }
    }

    pub fn formula(&self, source: Source, role: Role) -> &RoleFormula {
        self.for_source(source).get(role)
    }

    /// Replace one formula after validating it against the source's columns.
    pub fn with_formula(mut self, source: Source, role: Role, formula: RoleFormula) -> Result<Self> {
        formula.validate(source, role, &source.profile().normalized)?;
        let slot = match source {
            Source::GitHub => &mut self.github,
            Source::Kaggle => &mut self.kaggle,
            Source::StackOverflow => &mut self.stackoverflow,
        };
        *slot.get_mut(role) = formula;
        Ok(self)
    }

    /// Check every formula in the table.
    pub fn validate(&self) -> Result<()> {
        for source in Source::ALL {
            let cols = &source.profile().normalized;
            for role in Role::ALL {
                self.formula(source, role).validate(source, role, cols)?;
            }
        }
        Ok(())
    }
}

/// One score per role archetype; higher is better.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScoreSet {
    pub developer: f64,
    pub senior_developer: f64,
    pub solution_architect: f64,
}

impl ScoreSet {
    pub fn get(&self, role: Role) -> f64 {
        match role {
            Role::Developer => self.developer,
            Role::SeniorDeveloper => self.senior_developer,
            Role::SolutionArchitect => self.solution_architect,
        }
    }
}

/// Score every candidate of `source` for all three roles.
pub fn score_all(table: &ScoringTable, source: Source, vectors: &[FeatureVector]) -> Vec<ScoreSet> {
    let f = table.for_source(source);
    vectors
        .iter()
        .map(|v| ScoreSet {
            developer: f.developer.score(v),
            senior_developer: f.senior_developer.score(v),
            solution_architect: f.solution_architect.score(v),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::CandidateAggregate;
    use crate::normalize::normalize;

    #[test]
    fn default_weights_sum_to_one_for_every_role() {
        let table = ScoringTable::default();
        for source in Source::ALL {
            for role in Role::ALL {
                let sum = table.formula(source, role).weight_sum();
                assert!(
                    (sum - 1.0).abs() <= WEIGHT_SUM_TOLERANCE,
                    "{source}/{role} sums to {sum}"
                );
            }
        }
        table.validate().unwrap();
    }

    #[test]
    fn override_must_sum_to_one() {
        let bad = RoleFormula::new([("commits_12m", 0.5), ("public_repos", 0.4)]);
        let err = ScoringTable::default()
            .with_formula(Source::GitHub, Role::Developer, bad)
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidWeights { .. }));
    }

    #[test]
    fn override_cannot_cross_sources() {
        // reputation is a StackOverflow feature
        let cross = RoleFormula::new([("reputation", 1.0)]);
        let err = ScoringTable::default()
            .with_formula(Source::GitHub, Role::SeniorDeveloper, cross)
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidWeights { .. }));
    }

    #[test]
    fn negative_weight_is_rejected() {
        let f = RoleFormula::new([("commits_12m", 1.5), ("public_repos", -0.5)]);
        assert!(f
            .validate(Source::GitHub, Role::Developer, &["commits_12m", "public_repos"])
            .is_err());
    }

    #[test]
    fn valid_override_replaces_formula() {
        let f = RoleFormula::new([("commits_12m", 1.0)]);
        let t = ScoringTable::default()
            .with_formula(Source::GitHub, Role::Developer, f.clone())
            .unwrap();
        assert_eq!(t.formula(Source::GitHub, Role::Developer), &f);
        assert_ne!(t.formula(Source::GitHub, Role::SeniorDeveloper), &f);
    }

    #[test]
    fn scores_are_weighted_sums() {
        let pop = vec![
            CandidateAggregate::new("lo")
                .with_raw("commits_12m", 0.0)
                .with_raw("public_repos", 10.0),
            CandidateAggregate::new("hi")
                .with_raw("commits_12m", 100.0)
                .with_raw("public_repos", 0.0),
        ];
        let cols = vec!["commits_12m".to_string(), "public_repos".to_string()];
        let vecs = normalize(Source::GitHub, &pop, &cols).unwrap();
        let table = ScoringTable::default()
            .with_formula(
                Source::GitHub,
                Role::Developer,
                RoleFormula::new([("commits_12m", 0.7), ("public_repos", 0.3)]),
            )
            .unwrap();
        let s = score_all(&table, Source::GitHub, &vecs);
        assert!((s[0].developer - 0.3).abs() < 1e-12);
        assert!((s[1].developer - 0.7).abs() < 1e-12);
    }
}
