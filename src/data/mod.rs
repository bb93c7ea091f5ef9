//! Data source adapters.
//!
//! Every source performs exactly one unrestricted bulk read and returns the
//! full record set; filtering never happens in the store.
//!
//! - `sqlite`: the relational store (`SELECT * FROM <table>`)
//! - `csv`: a CSV export of the same table
//! - `sample`: deterministic synthetic records for demos and tests

use thiserror::Error;

use crate::config::SourceConfig;
use crate::domain::Record;

pub mod csv;
pub mod sample;
pub mod schema;
pub mod sqlite;

pub use self::csv::CsvSource;
pub use self::sample::generate_sample;
pub use self::sqlite::SqliteSource;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Data unavailable from {source_name}: {reason}")]
    DataUnavailable { source_name: String, reason: String },

    #[error("{source_name} is missing required column(s): {}", .columns.join(", "))]
    MissingColumns {
        source_name: String,
        columns: Vec<String>,
    },

    #[error("Invalid table name '{0}' (letters, digits and '_' only).")]
    InvalidTable(String),
}

/// A row-level problem encountered during load. The row is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// CSV: 1-based file line (header is line 1). SQLite: 1-based result row.
    pub line: usize,
    pub patient_id: Option<String>,
    pub message: String,
}

/// Output of a bulk read: records in store order plus what was skipped.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub source_name: String,
    pub records: Vec<Record>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl LoadedData {
    pub fn rows_used(&self) -> usize {
        self.records.len()
    }
}

/// One bulk read of every admission record.
pub trait RecordSource {
    /// Human-readable source label for logs and errors.
    fn describe(&self) -> String;

    fn load_all(&self) -> Result<LoadedData, SourceError>;
}

/// Build the adapter for a resolved source configuration.
pub fn open_source(config: &SourceConfig) -> Box<dyn RecordSource> {
    match config {
        SourceConfig::Sqlite { path, table } => Box::new(SqliteSource::new(path.clone(), table.clone())),
        SourceConfig::Csv { path } => Box::new(CsvSource::new(path.clone())),
    }
}

/// Load through any source, logging the outcome.
pub fn load_all(source: &dyn RecordSource) -> Result<LoadedData, SourceError> {
    let loaded = source.load_all()?;

    for err in &loaded.row_errors {
        tracing::warn!(
            line = err.line,
            patient_id = err.patient_id.as_deref().unwrap_or("-"),
            "skipped row: {}",
            err.message
        );
    }
    tracing::info!(
        source = %loaded.source_name,
        rows_read = loaded.rows_read,
        rows_used = loaded.rows_used(),
        skipped = loaded.row_errors.len(),
        "loaded admission records"
    );

    Ok(loaded)
}
