// src/clean.rs
//! Cleaner: per-source field normalization.
//!
//! Each source declares a table of `(column, FieldRule)` pairs. The cleaner
//! works column by column over the loaded table (median imputation needs the
//! whole column) and then emits one `CleanRecord` per row that carries a
//! non-empty identity.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use crate::error::{PipelineError, Result};
use crate::ingest::RawTable;
use crate::source::Source;

/// Fixed size (MB) assigned to values expressed in plain bytes.
pub const BYTES_AS_MB: f64 = 0.01;

/// How one input column is cleaned.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRule {
    /// Trimmed text; empty cells take `default` when one is declared.
    Text { default: Option<&'static str> },
    /// Numeric; missing cells are imputed with the column median.
    Numeric,
    /// Boolean flag stored as 1.0 / 0.0; missing cells are median-imputed.
    Flag,
    /// Composite size string converted to megabytes, written to `into`.
    SizeMb { into: &'static str },
    /// Categorical label mapped through `table`, written to `into`; unmapped → 0.
    Ordinal {
        into: &'static str,
        table: &'static [(&'static str, f64)],
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub column: &'static str,
    pub rule: FieldRule,
}

impl FieldSpec {
    pub const fn new(column: &'static str, rule: FieldRule) -> Self {
        Self { column, rule }
    }

    /// Name of the field this spec produces on the cleaned record.
    pub fn output(&self) -> &'static str {
        match self.rule {
            FieldRule::SizeMb { into } | FieldRule::Ordinal { into, .. } => into,
            _ => self.column,
        }
    }
}

/// One row after cleaning.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CleanRecord {
    pub identity: String,
    pub numeric: BTreeMap<String, f64>,
    pub text: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleanStats {
    /// Rows dropped because the identity cell was empty.
    pub dropped_rows: usize,
    /// Numeric/flag cells filled with the column median.
    pub imputed: usize,
    /// Size strings that fell back to 0.0.
    pub size_fallbacks: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cleaned {
    pub records: Vec<CleanRecord>,
    pub stats: CleanStats,
}

/// Outcome of parsing a size string: the value, and whether it is the fallback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeParse {
    pub value_mb: f64,
    pub fell_back: bool,
}

impl SizeParse {
    fn parsed(value_mb: f64) -> Self {
        Self {
            value_mb,
            fell_back: false,
        }
    }

    fn fallback() -> Self {
        Self {
            value_mb: 0.0,
            fell_back: true,
        }
    }
}

// Unit is matched as a whole suffix: "5MB" is 5 MB, not plain bytes, and
// unknown units ("12 TB", "10 bytes") fall back instead of counting as bytes.
static RE_SIZE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]+(?:\.[0-9]*)?|\.[0-9]+)\s*(GB|MB|KB|B)?$").expect("size regex")
});

/// Convert `"2GB"`, `"512 KB"`, `"10B"`, `"7"` … into megabytes.
///
/// GB → ×1024, MB → ×1, KB → ÷1024, B → fixed `BYTES_AS_MB`, bare number → MB.
/// Anything else yields the 0.0 fallback with `fell_back = true`.
pub fn parse_size_mb(raw: &str) -> SizeParse {
    let s = raw.trim().to_ascii_uppercase();
    let Some(caps) = RE_SIZE.captures(&s) else {
        return SizeParse::fallback();
    };
    let Ok(n) = caps[1].parse::<f64>() else {
        return SizeParse::fallback();
    };
    match caps.get(2).map(|m| m.as_str()) {
        Some("GB") => SizeParse::parsed(n * 1024.0),
        Some("KB") => SizeParse::parsed(n / 1024.0),
        Some("B") => SizeParse::parsed(BYTES_AS_MB),
        _ => SizeParse::parsed(n),
    }
}

/// Median of the given values (mean of the two middle values for even counts).
pub fn median(values: &[f64]) -> Option<f64> {
    let mut v: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    if v.is_empty() {
        return None;
    }
    v.sort_by(f64::total_cmp);
    let mid = v.len() / 2;
    if v.len() % 2 == 0 {
        Some((v[mid - 1] + v[mid]) / 2.0)
    } else {
        Some(v[mid])
    }
}

type CellParser = fn(&str) -> std::result::Result<Option<f64>, ()>;

fn is_missing(cell: &str) -> bool {
    matches!(
        cell.to_ascii_lowercase().as_str(),
        "" | "nan" | "na" | "n/a" | "null" | "none"
    )
}

fn parse_numeric(cell: &str) -> std::result::Result<Option<f64>, ()> {
    let c = cell.trim();
    if is_missing(c) {
        return Ok(None);
    }
    match c.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        Ok(_) => Ok(None),
        Err(_) => Err(()),
    }
}

fn parse_flag(cell: &str) -> std::result::Result<Option<f64>, ()> {
    let c = cell.trim();
    if is_missing(c) {
        return Ok(None);
    }
    match c.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "t" => Ok(Some(1.0)),
        "false" | "no" | "n" | "f" => Ok(Some(0.0)),
        _ => parse_numeric(c).map(|v| v.map(|x| if x != 0.0 { 1.0 } else { 0.0 })),
    }
}

fn impute_median(values: Vec<Option<f64>>, imputed: &mut usize) -> Vec<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let fill = median(&present).unwrap_or(0.0);
    values
        .into_iter()
        .map(|v| {
            v.unwrap_or_else(|| {
                *imputed += 1;
                fill
            })
        })
        .collect()
}

/// Apply the declared field rules to a loaded table.
pub fn clean(
    platform: Source,
    table: &RawTable,
    identity: &str,
    specs: &[FieldSpec],
) -> Result<Cleaned> {
    let id_idx = table.require_column(platform, identity)?;
    let mut stats = CleanStats::default();

    let rows: Vec<usize> = (0..table.len())
        .filter(|&r| !table.cell(r, id_idx).trim().is_empty())
        .collect();
    stats.dropped_rows = table.len() - rows.len();

    let mut numeric_cols: Vec<(&'static str, Vec<f64>)> = Vec::new();
    let mut text_cols: Vec<(&'static str, Vec<String>)> = Vec::new();

    for spec in specs {
        let idx = table.require_column(platform, spec.column)?;
        let cells = rows.iter().map(|&r| (r, table.cell(r, idx)));

        match &spec.rule {
            FieldRule::Text { default } => {
                let vals = cells
                    .map(|(_, c)| {
                        let t = c.trim();
                        match default {
                            Some(d) if t.is_empty() => d.to_string(),
                            _ => t.to_string(),
                        }
                    })
                    .collect();
                text_cols.push((spec.column, vals));
            }
            FieldRule::Numeric | FieldRule::Flag => {
                let parse: CellParser = if matches!(spec.rule, FieldRule::Flag) {
                    parse_flag
                } else {
                    parse_numeric
                };
                let mut parsed = Vec::with_capacity(rows.len());
                for (r, c) in cells {
                    let v = parse(c).map_err(|_| PipelineError::Malformed {
                        platform,
                        detail: format!(
                            "row {}: column '{}' holds non-numeric value '{}'",
                            r + 2,
                            spec.column,
                            c.trim()
                        ),
                    })?;
                    parsed.push(v);
                }
                numeric_cols.push((spec.column, impute_median(parsed, &mut stats.imputed)));
            }
            FieldRule::SizeMb { into } => {
                let vals = cells
                    .map(|(_, c)| {
                        let p = parse_size_mb(c);
                        if p.fell_back {
                            stats.size_fallbacks += 1;
                        }
                        p.value_mb
                    })
                    .collect();
                numeric_cols.push((*into, vals));
            }
            FieldRule::Ordinal { into, table: lookup } => {
                let vals = cells
                    .map(|(_, c)| {
                        let label = c.trim();
                        lookup
                            .iter()
                            .find(|(k, _)| *k == label)
                            .map(|(_, v)| *v)
                            .unwrap_or(0.0)
                    })
                    .collect();
                numeric_cols.push((*into, vals));
            }
        }
    }

    let records = rows
        .iter()
        .enumerate()
        .map(|(i, &r)| CleanRecord {
            identity: table.cell(r, id_idx).trim().to_string(),
            numeric: numeric_cols
                .iter()
                .map(|(name, vals)| (name.to_string(), vals[i]))
                .collect(),
            text: text_cols
                .iter()
                .map(|(name, vals)| (name.to_string(), vals[i].clone()))
                .collect(),
        })
        .collect();

    Ok(Cleaned { records, stats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::read_table;

    const MEDALS: &[(&str, f64)] = &[("Gold", 5.0), ("Silver", 3.0)];

    fn table(csv: &str) -> RawTable {
        read_table(Source::Kaggle, csv.as_bytes()).unwrap()
    }

    #[test]
    fn size_strings_convert_to_megabytes() {
        assert_eq!(parse_size_mb("2GB").value_mb, 2048.0);
        assert_eq!(parse_size_mb("512KB").value_mb, 0.5);
        assert_eq!(parse_size_mb("10B").value_mb, 0.01);
        assert_eq!(parse_size_mb("7").value_mb, 7.0);
        assert_eq!(parse_size_mb(" 3 mb ").value_mb, 3.0);
        assert_eq!(parse_size_mb("1.5 GB").value_mb, 1536.0);
        assert_eq!(parse_size_mb("5MB").value_mb, 5.0);
    }

    #[test]
    fn unparseable_size_falls_back_to_zero() {
        for s in ["abc", "", "GB", "12 TB", "10 bytes", "nan", "1.2.3MB"] {
            let p = parse_size_mb(s);
            assert_eq!(p.value_mb, 0.0, "{s}");
            assert!(p.fell_back, "{s}");
        }
        assert!(!parse_size_mb("7").fell_back);
    }

    #[test]
    fn median_handles_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn missing_numeric_is_median_imputed_and_text_defaulted() {
        let t = table("name,score,tags\n a ,1,x\nb,,\nc,5, y \n");
        let specs = [
            FieldSpec::new("score", FieldRule::Numeric),
            FieldSpec::new("tags", FieldRule::Text { default: Some("general") }),
        ];
        let out = clean(Source::Kaggle, &t, "name", &specs).unwrap();
        let r = &out.records;
        assert_eq!(r[0].identity, "a");
        assert_eq!(r[1].numeric["score"], 3.0);
        assert_eq!(r[1].text["tags"], "general");
        assert_eq!(r[2].text["tags"], "y");
        assert_eq!(out.stats.imputed, 1);
    }

    #[test]
    fn ordinal_maps_with_zero_default() {
        let t = table("name,medal\na,Gold\nb,Bronze\nc,\nd, Silver\n");
        let specs = [FieldSpec::new(
            "medal",
            FieldRule::Ordinal {
                into: "points",
                table: MEDALS,
            },
        )];
        let out = clean(Source::Kaggle, &t, "name", &specs).unwrap();
        let pts: Vec<f64> = out.records.iter().map(|r| r.numeric["points"]).collect();
        assert_eq!(pts, vec![5.0, 0.0, 0.0, 3.0]);
    }

    #[test]
    fn flags_accept_booleans_and_digits() {
        let t = table("name,ci\na,True\nb,false\nc,1\nd,0\n");
        let specs = [FieldSpec::new("ci", FieldRule::Flag)];
        let out = clean(Source::Kaggle, &t, "name", &specs).unwrap();
        let v: Vec<f64> = out.records.iter().map(|r| r.numeric["ci"]).collect();
        assert_eq!(v, vec![1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn empty_identity_rows_are_dropped() {
        let t = table("name,score\na,1\n ,2\n");
        let specs = [FieldSpec::new("score", FieldRule::Numeric)];
        let out = clean(Source::Kaggle, &t, "name", &specs).unwrap();
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.stats.dropped_rows, 1);
    }

    #[test]
    fn non_numeric_cell_is_malformed() {
        let t = table("name,score\na,lots\n");
        let specs = [FieldSpec::new("score", FieldRule::Numeric)];
        let err = clean(Source::Kaggle, &t, "name", &specs).unwrap_err();
        assert!(matches!(err, PipelineError::Malformed { .. }));
    }

    #[test]
    fn absent_column_is_schema_violation() {
        let t = table("name,score\na,1\n");
        let specs = [FieldSpec::new("votes", FieldRule::Numeric)];
        let err = clean(Source::Kaggle, &t, "name", &specs).unwrap_err();
        assert!(
            matches!(err, PipelineError::SchemaViolation { ref column, .. } if column == "votes")
        );
    }
}
