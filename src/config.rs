//! Environment-backed defaults.
//!
//! `.env` is loaded once (if present) so a local database path does not have
//! to be repeated on every invocation. CLI flags always win over environment.

use std::path::PathBuf;

use crate::error::AppError;

pub const ENV_DB: &str = "HDASH_DB";
pub const ENV_TABLE: &str = "HDASH_TABLE";
pub const ENV_CSV: &str = "HDASH_CSV";

/// Table read by the original dashboard.
pub const DEFAULT_TABLE: &str = "patients_data";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "warn,health_insights=info"
}

/// Where to read the admission records from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Sqlite { path: PathBuf, table: String },
    Csv { path: PathBuf },
}

impl SourceConfig {
    /// Resolve the source from CLI flags, falling back to `HDASH_*` variables.
    pub fn resolve(
        db: Option<PathBuf>,
        table: Option<String>,
        csv: Option<PathBuf>,
    ) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::resolve_with(db, table, csv, |key| std::env::var(key).ok())
    }

    fn resolve_with(
        db: Option<PathBuf>,
        table: Option<String>,
        csv: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        if db.is_some() && csv.is_some() {
            return Err(AppError::usage("Pass either `--db` or `--csv`, not both."));
        }

        let table = table
            .or_else(|| env(ENV_TABLE))
            .unwrap_or_else(|| DEFAULT_TABLE.to_string());

        if let Some(path) = db {
            return Ok(SourceConfig::Sqlite { path, table });
        }
        if let Some(path) = csv {
            return Ok(SourceConfig::Csv { path });
        }
        if let Some(path) = env(ENV_DB).filter(|s| !s.trim().is_empty()) {
            return Ok(SourceConfig::Sqlite {
                path: PathBuf::from(path),
                table,
            });
        }
        if let Some(path) = env(ENV_CSV).filter(|s| !s.trim().is_empty()) {
            return Ok(SourceConfig::Csv {
                path: PathBuf::from(path),
            });
        }

        Err(AppError::usage(format!(
            "No data source. Pass `--db <file> [--table <name>]` or `--csv <file>`, or set {ENV_DB} / {ENV_CSV} (.env is read)."
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn flags_win_over_environment() {
        let cfg = SourceConfig::resolve_with(
            None,
            None,
            Some(PathBuf::from("a.csv")),
            |key| (key == ENV_DB).then(|| "env.db".to_string()),
        )
        .unwrap();
        assert_eq!(cfg, SourceConfig::Csv { path: PathBuf::from("a.csv") });
    }

    #[test]
    fn environment_supplies_db_and_table() {
        let cfg = SourceConfig::resolve_with(None, None, None, |key| match key {
            ENV_DB => Some("health.db".to_string()),
            ENV_TABLE => Some("admissions".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(
            cfg,
            SourceConfig::Sqlite {
                path: PathBuf::from("health.db"),
                table: "admissions".to_string(),
            }
        );
    }

    #[test]
    fn default_table_and_missing_source() {
        let cfg = SourceConfig::resolve_with(Some(PathBuf::from("x.db")), None, None, no_env).unwrap();
        assert_eq!(
            cfg,
            SourceConfig::Sqlite {
                path: PathBuf::from("x.db"),
                table: DEFAULT_TABLE.to_string(),
            }
        );

        let err = SourceConfig::resolve_with(None, None, None, no_env).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = SourceConfig::resolve_with(
            Some(PathBuf::from("x.db")),
            None,
            Some(PathBuf::from("x.csv")),
            no_env,
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
