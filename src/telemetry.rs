// src/telemetry.rs
//! Metric names and one-time registration.
//!
//! The library only emits through the `metrics` facade; without an installed
//! recorder every call is a no-op.

use metrics::{describe_counter, describe_gauge};
use once_cell::sync::OnceCell;

pub const ROWS_LOADED: &str = "ranker_rows_loaded_total";
pub const CANDIDATES: &str = "ranker_candidates_total";
pub const SOURCES_SKIPPED: &str = "ranker_sources_skipped_total";
pub const SOURCE_FAILURES: &str = "ranker_source_failures_total";
pub const SIZE_PARSE_FALLBACKS: &str = "ranker_size_parse_fallbacks_total";
pub const LAST_RUN_TS: &str = "ranker_last_run_ts";

/// One-time metrics registration (so series carry descriptions).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(ROWS_LOADED, "Raw rows read from source tables.");
        describe_counter!(CANDIDATES, "Candidates produced by aggregation.");
        describe_counter!(
            SOURCES_SKIPPED,
            "Sources skipped because their input was absent."
        );
        describe_counter!(
            SOURCE_FAILURES,
            "Sources aborted by a malformed table or schema violation."
        );
        describe_counter!(
            SIZE_PARSE_FALLBACKS,
            "Size strings that could not be parsed and fell back to 0."
        );
        describe_gauge!(LAST_RUN_TS, "Unix ts when the ranking pipeline last ran.");
    });
}
