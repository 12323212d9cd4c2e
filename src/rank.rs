// src/rank.rs
//! Ranker: stable descending sort per role, truncated to top-K.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::role::Role;
use crate::scoring::ScoreSet;

/// Shortlist size used when nothing else is configured.
pub const DEFAULT_TOP_K: usize = 3;

/// A value quoted in a reason: numbers for counts/ratings, text for tag lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    /// 1-based position.
    pub rank: usize,
    pub identity: String,
    pub score: f64,
    /// Raw (pre-normalization) fields the reason is built from.
    pub fields: BTreeMap<String, FieldValue>,
    pub reason: String,
}

/// Top-K candidates of one source for one role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    pub role: Role,
    pub entries: Vec<RankedEntry>,
}

/// NaN never outranks a real score.
fn sort_key(x: f64) -> f64 {
    if x.is_nan() {
        f64::NEG_INFINITY
    } else {
        x
    }
}

/// Positions of the top `k` candidates for `role`, best first. Ties keep input
/// order (`sort_by` is stable).
pub fn rank_indices(scores: &[ScoreSet], role: Role, k: usize) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..scores.len()).collect();
    idx.sort_by(|&a, &b| {
        let (sa, sb) = (sort_key(scores[a].get(role)), sort_key(scores[b].get(role)));
        sb.partial_cmp(&sa).unwrap_or(Ordering::Equal)
    });
    idx.truncate(k);
    idx
}
