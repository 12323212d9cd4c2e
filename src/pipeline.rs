// src/pipeline.rs
//! Orchestration: runs the stages for one source, and sources one after
//! another (or on blocking tasks) into a `Shortlist`.
//!
//! Sources never share state. A failure in one is reported for that source
//! and does not change what the others produce.

use metrics::{counter, gauge};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::aggregate::{aggregate, CandidateAggregate};
use crate::clean::{clean, CleanStats};
use crate::config::RankerConfig;
use crate::error::{PipelineError, Result};
use crate::features::engineer;
use crate::ingest::{load_table, LoadOutcome, RawTable};
use crate::normalize::{normalize, FeatureVector};
use crate::outliers::mitigate;
use crate::rank::{rank_indices, RankedEntry, Ranking, DEFAULT_TOP_K};
use crate::reasons::{evidence_fields, synthesize};
use crate::report::{Shortlist, SourceOutcome, SourceReport};
use crate::role::Role;
use crate::scoring::{score_all, ScoreSet, ScoringTable};
use crate::source::Source;
use crate::telemetry::{
    ensure_metrics_described, CANDIDATES, LAST_RUN_TS, SIZE_PARSE_FALLBACKS, SOURCES_SKIPPED,
    SOURCE_FAILURES,
};

/// Every candidate of one source with its normalized features and scores.
/// Index `i` of each vector refers to the same candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPopulation {
    pub source: Source,
    pub candidates: Vec<CandidateAggregate>,
    pub vectors: Vec<FeatureVector>,
    pub scores: Vec<ScoreSet>,
    pub stats: CleanStats,
}

impl ScoredPopulation {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    scoring: ScoringTable,
    top_k: usize,
    data_dir: PathBuf,
    files: BTreeMap<Source, PathBuf>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(ScoringTable::default(), DEFAULT_TOP_K)
    }
}

impl Pipeline {
    pub fn new(scoring: ScoringTable, top_k: usize) -> Self {
        Self {
            scoring,
            top_k,
            data_dir: PathBuf::from("."),
            files: BTreeMap::new(),
        }
    }

    /// Validate `cfg` and build a pipeline from it.
    pub fn from_config(cfg: &RankerConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            scoring: cfg.scoring_table()?,
            top_k: cfg.top_k,
            data_dir: cfg.data_dir.clone(),
            files: cfg.file_overrides()?,
        })
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Where `source` is read from: the override if set, else the default file
    /// name, resolved under the data directory.
    pub fn path_for(&self, source: Source) -> PathBuf {
        let file = self
            .files
            .get(&source)
            .cloned()
            .unwrap_or_else(|| PathBuf::from(source.profile().default_file));
        self.data_dir.join(file)
    }

    /// Clean, aggregate, mitigate, engineer, normalize and score a loaded table.
    pub fn score_table(&self, source: Source, table: &RawTable) -> Result<ScoredPopulation> {
        ensure_metrics_described();
        let profile = source.profile();
        table.require_columns(source, &profile.required_columns())?;

        let cleaned = clean(source, table, profile.identity, &profile.fields)?;
        let stats = cleaned.stats;
        if stats.size_fallbacks > 0 {
            warn!(
                source = source.slug(),
                count = stats.size_fallbacks,
                "unparseable size values treated as 0 MB"
            );
            counter!(SIZE_PARSE_FALLBACKS, "source" => source.slug())
                .increment(stats.size_fallbacks as u64);
        }
        debug!(
            source = source.slug(),
            rows = cleaned.records.len(),
            dropped = stats.dropped_rows,
            imputed = stats.imputed,
            "cleaned"
        );

        let candidates = aggregate(source, &cleaned.records, &profile.aggregates)?;
        counter!(CANDIDATES, "source" => source.slug()).increment(candidates.len() as u64);
        debug!(source = source.slug(), candidates = candidates.len(), "aggregated");

        let candidates = mitigate(source, &candidates, &profile.outliers)?;
        let candidates = engineer(source, &candidates, &profile.features)?;
        let vectors = normalize(source, &candidates, &profile.normalized_columns())?;
        let scores = score_all(&self.scoring, source, &vectors);

        Ok(ScoredPopulation {
            source,
            candidates,
            vectors,
            scores,
            stats,
        })
    }

    /// Top-K per role with reasons, in `Role::ALL` order.
    pub fn rank(&self, population: &ScoredPopulation) -> Vec<Ranking> {
        let source = population.source;
        Role::ALL
            .iter()
            .map(|&role| {
                let entries = rank_indices(&population.scores, role, self.top_k)
                    .into_iter()
                    .enumerate()
                    .map(|(pos, i)| {
                        let c = &population.candidates[i];
                        RankedEntry {
                            rank: pos + 1,
                            identity: c.identity.clone(),
                            score: population.scores[i].get(role),
                            fields: evidence_fields(source, role, c),
                            reason: synthesize(source, role, c),
                        }
                    })
                    .collect();
                Ranking { role, entries }
            })
            .collect()
    }

    pub fn run_table(&self, source: Source, table: &RawTable) -> Result<Vec<Ranking>> {
        let population = self.score_table(source, table)?;
        Ok(self.rank(&population))
    }

    /// Load the source's file; an absent file is `MissingSource`.
    pub fn load(&self, source: Source) -> Result<RawTable> {
        let path = self.path_for(source);
        match load_table(source, &path)? {
            LoadOutcome::Loaded(t) => Ok(t),
            LoadOutcome::Missing { path } => Err(PipelineError::MissingSource {
                platform: source,
                path,
            }),
        }
    }

    /// Run one source end to end. Never fails: errors become the outcome.
    pub fn run_source(&self, source: Source) -> SourceReport {
        ensure_metrics_described();
        info!(source = source.slug(), path = %self.path_for(source).display(), "analysing source");

        let outcome = match self.load(source).and_then(|t| self.run_table(source, &t)) {
            Ok(rankings) => SourceOutcome::Ranked { rankings },
            Err(PipelineError::MissingSource { path, .. }) => {
                counter!(SOURCES_SKIPPED, "source" => source.slug()).increment(1);
                SourceOutcome::Skipped {
                    notice: missing_notice(source, &path),
                }
            }
            Err(e) => {
                error!(source = source.slug(), error = %e, "source failed");
                counter!(SOURCE_FAILURES, "source" => source.slug()).increment(1);
                SourceOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        SourceReport { source, outcome }
    }

    /// Sources one after another, in request order.
    pub fn run_all(&self, sources: &[Source]) -> Shortlist {
        let reports = sources.iter().map(|&s| self.run_source(s)).collect();
        finish(reports)
    }

    /// Each source on its own blocking task; results joined in request order.
    pub async fn run_all_concurrent(self: Arc<Self>, sources: &[Source]) -> Shortlist {
        let handles: Vec<_> = sources
            .iter()
            .map(|&s| {
                let me = Arc::clone(&self);
                (s, tokio::task::spawn_blocking(move || me.run_source(s)))
            })
            .collect();

        let mut reports = Vec::with_capacity(handles.len());
        for (source, h) in handles {
            let report = match h.await {
                Ok(r) => r,
                Err(e) => {
                    error!(source = source.slug(), error = %e, "source task panicked");
                    counter!(SOURCE_FAILURES, "source" => source.slug()).increment(1);
                    SourceReport {
                        source,
                        outcome: SourceOutcome::Failed {
                            error: format!("task failed: {e}"),
                        },
                    }
                }
            };
            reports.push(report);
        }
        finish(reports)
    }
}

fn missing_notice(source: Source, path: &std::path::Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    format!("Error: '{name}' not found. Skipping {} analysis.", source.label())
}

fn finish(reports: Vec<SourceReport>) -> Shortlist {
    gauge!(LAST_RUN_TS).set(chrono::Utc::now().timestamp() as f64);
    let ranked = reports.iter().filter(|r| r.rankings().is_some()).count();
    info!(requested = reports.len(), ranked, "run finished");
    Shortlist::new(reports)
}
