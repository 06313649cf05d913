#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Accident table loading and cleaning.
//!
//! Reads the raw accident table once, coerces coordinates, start times and
//! severities, and discards rows without usable coordinates. The result is
//! an immutable [`LoadedDataset`] that every hotspot computation shares.

pub mod csv_reader;
pub mod parsing;
pub mod progress;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hotspot_map_accident_models::AccidentRecord;
use serde::Serialize;

use crate::csv_reader::AccidentCsvReader;
use crate::progress::ProgressCallback;

/// Errors that can occur while loading the accident table.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// I/O error opening or reading the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file could not be parsed as a delimited table.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header row.
    #[error("Missing required column '{column}'")]
    MissingColumn {
        /// Header name that was expected.
        column: String,
    },

    /// No rows survived cleaning.
    #[error("No usable accident rows in {path} ({rows_read} read, {rows_dropped} dropped)")]
    Empty {
        /// Source file path.
        path: String,
        /// Rows read from the table.
        rows_read: u64,
        /// Rows discarded for bad coordinates.
        rows_dropped: u64,
    },
}

/// Row-level diagnostics from a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    /// Data rows read (header excluded).
    pub rows_read: u64,
    /// Rows dropped because latitude or longitude was unusable.
    pub rows_dropped: u64,
    /// Kept rows whose start time could not be parsed.
    pub timestamps_unparsed: u64,
}

impl LoadReport {
    /// Number of records that survived cleaning.
    #[must_use]
    pub const fn rows_kept(&self) -> u64 {
        self.rows_read - self.rows_dropped
    }
}

/// An accident table after cleaning.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    /// File the records were read from.
    pub source: PathBuf,
    /// Cleaned records in file order.
    pub records: Vec<AccidentRecord>,
    /// Load diagnostics.
    pub report: LoadReport,
}

/// Returns `true` if `path` looks gzip-compressed (`.gz` extension).
fn is_gzip_path(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Returns `true` if `path` looks tab-delimited (`.tsv` / `.tsv.gz`).
fn is_tsv_path(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    name.ends_with(".tsv") || name.ends_with(".tsv.gz")
}

/// Loads and cleans the accident table at `path`.
///
/// `.gz` files are decompressed and `.tsv` files are read tab-delimited.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be opened or parsed, a
/// required column is missing, or no row survives cleaning.
pub fn load_accidents(
    path: &Path,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<LoadedDataset, SourceError> {
    log::info!("Loading accidents from {}", path.display());
    progress.set_message(format!("Loading {}", path.display()));

    let file = BufReader::new(File::open(path)?);

    let mut reader = AccidentCsvReader::new().with_gzip(is_gzip_path(path));
    if is_tsv_path(path) {
        reader = reader.with_delimiter(b'\t');
    }

    let (records, report) = reader.read(file, progress)?;

    if records.is_empty() {
        return Err(SourceError::Empty {
            path: path.display().to_string(),
            rows_read: report.rows_read,
            rows_dropped: report.rows_dropped,
        });
    }

    if report.rows_dropped > 0 {
        log::warn!(
            "Dropped {} of {} rows with unusable coordinates",
            report.rows_dropped,
            report.rows_read
        );
    }

    log::info!(
        "Loaded {} accidents from {}",
        records.len(),
        path.display()
    );
    progress.finish(format!("Loaded {} accidents", records.len()));

    Ok(LoadedDataset {
        source: path.to_path_buf(),
        records,
        report,
    })
}
