//! Shared load -> filter -> aggregate logic used by every subcommand.
//!
//! The dataset is read once; each run then filters the immutable records and
//! recomputes every view from scratch.

use std::time::Instant;

use crate::aggregate::{Dashboard, build_dashboard};
use crate::config::SourceConfig;
use crate::data::{LoadedData, load_all, open_source};
use crate::domain::{Constraints, Record};
use crate::error::AppError;
use crate::filter::{FilterOptions, apply};

/// The full record set plus the filter candidates it offers.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub loaded: LoadedData,
    pub options: FilterOptions,
}

impl Dataset {
    pub fn from_loaded(loaded: LoadedData) -> Self {
        let options = FilterOptions::observe(&loaded.records);
        Self { loaded, options }
    }

    pub fn records(&self) -> &[Record] {
        &self.loaded.records
    }
}

/// Outputs of one filter + aggregate pass.
#[derive(Debug, Clone)]
pub struct DashboardRun<'a> {
    pub selected: Vec<&'a Record>,
    pub dashboard: Dashboard,
}

/// Read every record from the configured source.
pub fn load_dataset(config: &SourceConfig) -> Result<Dataset, AppError> {
    let source = open_source(config);
    let loaded = load_all(source.as_ref())?;
    Ok(Dataset::from_loaded(loaded))
}

/// Filter `records` and compute every view over the selection.
pub fn run_dashboard<'a>(records: &'a [Record], constraints: &Constraints) -> DashboardRun<'a> {
    let started = Instant::now();
    let selected = apply(records, constraints);
    tracing::debug!(
        total = records.len(),
        selected = selected.len(),
        unrestricted = constraints.is_unrestricted(),
        "filter applied"
    );

    let dashboard = build_dashboard(&selected);
    tracing::info!(
        records = selected.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "dashboard computed"
    );

    DashboardRun { selected, dashboard }
}
