// src/ingest/mod.rs
//! Record Loader: reads a source's CSV table into memory.
//!
//! A missing file is not an error here: `load_table` returns
//! `LoadOutcome::Missing` and the orchestrator turns it into a skip.
//! Unreadable content (bad framing, ragged rows, invalid UTF-8) is
//! `PipelineError::Malformed` for that source only; a path that cannot be
//! opened at all is `PipelineError::Io`.

use metrics::counter;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};
use crate::source::Source;
use crate::telemetry::{ensure_metrics_described, ROWS_LOADED};

/// One row of a source table. Cells are addressed through the owning `RawTable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    cells: Vec<String>,
}

impl RawRecord {
    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}

/// Column-named table as read from disk; immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTable {
    headers: Vec<String>,
    records: Vec<RawRecord>,
}

impl RawTable {
    /// Build a table from in-memory rows (callers that already hold the data).
    /// Short rows are padded with empty cells.
    pub fn from_rows<H, R, C>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let width = headers.len();
        let records = rows
            .into_iter()
            .map(|row| {
                let mut cells: Vec<String> = row.into_iter().map(Into::into).collect();
                cells.resize(width.max(cells.len()), String::new());
                RawRecord { cells }
            })
            .collect();
        Self { headers, records }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn require_column(&self, platform: Source, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| PipelineError::SchemaViolation {
                platform,
                column: name.to_string(),
            })
    }

    /// Fail on the first absent column, in the order given.
    pub fn require_columns(&self, platform: Source, names: &[&str]) -> Result<()> {
        for n in names {
            self.require_column(platform, n)?;
        }
        Ok(())
    }

    /// Cell text; out-of-range positions read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.records
            .get(row)
            .and_then(|r| r.cells.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(RawTable),
    /// No backing file: zero records, skip the source.
    Missing { path: PathBuf },
}

/// Parse CSV content with a header row.
pub fn read_table<R: Read>(platform: Source, reader: R) -> Result<RawTable> {
    let malformed = |e: csv::Error| PipelineError::Malformed {
        platform,
        detail: e.to_string(),
    };

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(malformed)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    for rec in rdr.records() {
        let rec = rec.map_err(malformed)?;
        records.push(RawRecord {
            cells: rec.iter().map(str::to_string).collect(),
        });
    }

    Ok(RawTable { headers, records })
}

/// Read a source's backing file.
pub fn load_table(platform: Source, path: &Path) -> Result<LoadOutcome> {
    ensure_metrics_described();

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(source = platform.slug(), path = %path.display(), "source file not found");
            return Ok(LoadOutcome::Missing {
                path: path.to_path_buf(),
            });
        }
        Err(e) => {
            tracing::error!(source = platform.slug(), path = %path.display(), error = %e, "cannot open source file");
            return Err(PipelineError::Io(e));
        }
    };

    let table = read_table(platform, io::BufReader::new(file))?;
    counter!(ROWS_LOADED, "source" => platform.slug()).increment(table.len() as u64);
    tracing::debug!(
        source = platform.slug(),
        rows = table.len(),
        columns = table.headers().len(),
        "loaded table"
    );
    Ok(LoadOutcome::Loaded(table))
}
