//! Command-line parsing for the hospital insights dashboard.
//!
//! Parsing and dispatch stay separate from loading, filtering and
//! aggregation, so the same pipeline serves every subcommand.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::View;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "hdash", version, about = "Hospital admissions, billing and feedback insights")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print dashboard views as text tables (the default).
    Report(ReportArgs),
    /// Write the dashboard as JSON, and optionally the filtered records as CSV.
    Export(ExportArgs),
    /// List the doctors, diagnoses, bed types and date span available to filter on.
    Options(OptionsArgs),
    /// Write a deterministic synthetic dataset to CSV.
    Demo(DemoArgs),
}

/// Where to read records from. Falls back to `HDASH_DB` / `HDASH_TABLE` / `HDASH_CSV`.
#[derive(Debug, Args, Clone, Default)]
pub struct SourceArgs {
    /// SQLite database file.
    #[arg(long, value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// Table holding the admission records (default: patients_data).
    #[arg(long, value_name = "NAME")]
    pub table: Option<String>,

    /// CSV export of the admissions table.
    #[arg(long, value_name = "FILE", conflicts_with_all = ["db", "table"])]
    pub csv: Option<PathBuf>,
}

/// Record selection. Repeat a set flag to select several values.
#[derive(Debug, Args, Clone, Default)]
pub struct FilterArgs {
    /// First admit date (inclusive), YYYY-MM-DD.
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Last admit date (inclusive), YYYY-MM-DD.
    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,

    #[arg(long = "doctor", value_name = "NAME")]
    pub doctors: Vec<String>,

    #[arg(long = "diagnosis", value_name = "NAME")]
    pub diagnoses: Vec<String>,

    #[arg(long = "bed", value_name = "TYPE")]
    pub beds: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Which view to print.
    #[arg(long, value_enum, default_value_t = View::All)]
    pub view: View,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Dashboard JSON output file.
    #[arg(long, value_name = "JSON")]
    pub out: PathBuf,

    /// Also write the filtered records to this CSV file.
    #[arg(long, value_name = "CSV")]
    pub records: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct OptionsArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    /// CSV output file.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,

    /// Number of admissions to generate.
    #[arg(short = 'n', long, default_value_t = 500)]
    pub count: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// First possible admit date.
    #[arg(long, value_name = "DATE", default_value = "2024-01-01")]
    pub start: NaiveDate,
}
