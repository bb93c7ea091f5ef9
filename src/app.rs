//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - sets up logging
//! - parses CLI arguments
//! - loads the admission records
//! - filters and aggregates them
//! - prints reports and writes optional exports

use std::collections::BTreeSet;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, DemoArgs, ExportArgs, FilterArgs, OptionsArgs, ReportArgs, SourceArgs};
use crate::config::SourceConfig;
use crate::domain::{Constraints, DateRange};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `hdash` binary.
pub fn run() -> Result<(), AppError> {
    init_tracing();

    // `hdash` and `hdash --csv x.csv` behave like `hdash report ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Report(args) => handle_report(args),
        Command::Export(args) => handle_export(args),
        Command::Options(args) => handle_options(args),
        Command::Demo(args) => handle_demo(args),
    }
}

/// Logs go to stderr so stdout carries only report output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(crate::config::default_log_filter()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let constraints = constraints_from_args(&args.filter)?;
    let dataset = pipeline::load_dataset(&source_config(&args.source)?)?;
    let run = pipeline::run_dashboard(dataset.records(), &constraints);

    println!(
        "{}",
        crate::report::format_dashboard(&run.dashboard, &dataset.loaded, args.view)
    );
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    let constraints = constraints_from_args(&args.filter)?;
    let dataset = pipeline::load_dataset(&source_config(&args.source)?)?;
    let run = pipeline::run_dashboard(dataset.records(), &constraints);

    crate::io::write_json(&args.out, &run.dashboard)?;
    tracing::info!(path = %args.out.display(), "dashboard written");

    if let Some(path) = &args.records {
        let n = crate::io::write_records_csv(path, run.selected.iter().copied())?;
        tracing::info!(path = %path.display(), records = n, "records written");
    }
    Ok(())
}

fn handle_options(args: OptionsArgs) -> Result<(), AppError> {
    let dataset = pipeline::load_dataset(&source_config(&args.source)?)?;
    println!("{}", crate::report::format_options(&dataset.options));
    Ok(())
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let records = crate::data::generate_sample(args.count, args.seed, args.start)?;
    let n = crate::io::write_records_csv(&args.out, &records)?;
    println!("Wrote {n} synthetic admissions to {}", args.out.display());
    Ok(())
}

fn source_config(args: &SourceArgs) -> Result<SourceConfig, AppError> {
    SourceConfig::resolve(args.db.clone(), args.table.clone(), args.csv.clone())
}

/// Build filter constraints from CLI flags.
///
/// An absent flag leaves that dimension unrestricted; an open-ended date
/// range is bounded by the representable calendar.
pub fn constraints_from_args(args: &FilterArgs) -> Result<Constraints, AppError> {
    let date_range = match (args.from, args.to) {
        (None, None) => None,
        (from, to) => {
            let start = from.unwrap_or(chrono::NaiveDate::MIN);
            let end = to.unwrap_or(chrono::NaiveDate::MAX);
            Some(DateRange::new(start, end).ok_or_else(|| {
                AppError::usage(format!("Invalid date range: --from {start} is after --to {end}."))
            })?)
        }
    };

    Ok(Constraints {
        date_range,
        doctors: to_set(&args.doctors),
        diagnoses: to_set(&args.diagnoses),
        bed_types: to_set(&args.beds),
    })
}

fn to_set(values: &[String]) -> Option<BTreeSet<String>> {
    (!values.is_empty()).then(|| values.iter().cloned().collect())
}

/// Rewrite argv so `hdash` defaults to `hdash report`.
///
/// Rules:
/// - `hdash`                      -> `hdash report`
/// - `hdash --csv x.csv ...`      -> `hdash report --csv x.csv ...`
/// - `hdash --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("report".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "export" | "options" | "demo");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "report".to_string());
        return argv;
    }

    argv
}
