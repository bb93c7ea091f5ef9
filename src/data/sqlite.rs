//! SQLite record store.
//!
//! The connection lives only for the duration of `load_all`: open, run one
//! `SELECT *`, close. No pool is kept since a session issues a single query.

use std::path::PathBuf;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};

use super::schema::{ColumnMap, parse_record};
use super::{LoadedData, RecordSource, RowError, SourceError};

#[derive(Debug, Clone)]
pub struct SqliteSource {
    path: PathBuf,
    table: String,
}

impl SqliteSource {
    pub fn new(path: PathBuf, table: String) -> Self {
        Self { path, table }
    }

    fn unavailable(&self, reason: impl std::fmt::Display) -> SourceError {
        SourceError::DataUnavailable {
            source_name: self.describe(),
            reason: reason.to_string(),
        }
    }
}

impl RecordSource for SqliteSource {
    fn describe(&self) -> String {
        format!("SQLite '{}' table `{}`", self.path.display(), self.table)
    }

    fn load_all(&self) -> Result<LoadedData, SourceError> {
        validate_table_name(&self.table)?;

        // Read-only: a missing file must fail instead of creating an empty db.
        let conn = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| self.unavailable(e))?;
        tracing::debug!(source = %self.describe(), "opened connection");

        let loaded = read_table(&conn, &self.table, self.describe());

        if let Err((_, e)) = conn.close() {
            tracing::warn!(source = %self.describe(), "failed to close connection: {e}");
        }
        loaded
    }
}

/// Table names are interpolated into SQL, so only identifier characters pass.
pub fn validate_table_name(table: &str) -> Result<(), SourceError> {
    let ok = !table.is_empty()
        && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !table.starts_with(|c: char| c.is_ascii_digit());
    if ok {
        Ok(())
    } else {
        Err(SourceError::InvalidTable(table.to_string()))
    }
}

/// Bulk-read every row of `table` on an open connection.
pub fn read_table(conn: &Connection, table: &str, source_name: String) -> Result<LoadedData, SourceError> {
    validate_table_name(table)?;

    let mut stmt = conn
        .prepare(&format!("SELECT * FROM {table}"))
        .map_err(|e| unavailable(&source_name, e))?;

    let columns = ColumnMap::from_headers(stmt.column_names());
    let missing = columns.missing_required();
    if !missing.is_empty() {
        return Err(SourceError::MissingColumns {
            source_name,
            columns: missing,
        });
    }

    let column_count = stmt.column_count();
    let mut rows = stmt.query([]).map_err(|e| unavailable(&source_name, e))?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    while let Some(row) = rows.next().map_err(|e| unavailable(&source_name, e))? {
        rows_read += 1;
        let line = rows_read;

        let mut cells: Vec<Option<String>> = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            let value = row.get_ref(idx).map_err(|e| unavailable(&source_name, e))?;
            cells.push(cell_text(value));
        }

        match parse_record(&cells, &columns) {
            Ok(record) => records.push(record),
            Err((patient_id, message)) => row_errors.push(RowError {
                line,
                patient_id,
                message,
            }),
        }
    }

    Ok(LoadedData {
        source_name,
        records,
        row_errors,
        rows_read,
    })
}

fn unavailable(source_name: &str, e: rusqlite::Error) -> SourceError {
    SourceError::DataUnavailable {
        source_name: source_name.to_string(),
        reason: e.to_string(),
    }
}

fn cell_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CREATE: &str = "CREATE TABLE patients_data (
        Patient_ID TEXT,
        Admit_Date TEXT,
        Discharge_Date TEXT,
        Doctor TEXT,
        Diagnosis TEXT,
        Bed_Occupancy TEXT,
        Test TEXT,
        \"Billing Amount\" REAL,
        \"Health Insurance Amount\" REAL,
        Feedback INTEGER,
        Length_of_Stay INTEGER
    );";

    fn seeded(conn: &Connection) {
        conn.execute_batch(CREATE).unwrap();
        conn.execute_batch(
            "INSERT INTO patients_data VALUES
                ('P1', '2024-01-03', '2024-01-05', 'Dr. A', 'Cardiology', 'ICU', 'ECG', 1000.0, 800.0, 4, 2);
             INSERT INTO patients_data VALUES
                ('P2', '2024-01-04', NULL, 'Dr. B', 'Neuro', 'General', 'MRI', 2500.5, NULL, NULL, 6);
             INSERT INTO patients_data VALUES
                ('P3', NULL, NULL, 'Dr. B', 'Neuro', 'General', 'MRI', 10.0, NULL, NULL, NULL);",
        )
        .unwrap();
    }

    #[test]
    fn reads_typed_columns() {
        let conn = Connection::open_in_memory().unwrap();
        seeded(&conn);

        let loaded = read_table(&conn, "patients_data", "memory".to_string()).unwrap();
        assert_eq!(loaded.rows_read, 3);
        assert_eq!(loaded.rows_used(), 2);
        assert_eq!(loaded.row_errors[0].line, 3);

        let p2 = &loaded.records[1];
        assert_eq!(p2.billing_amount, Some(2500.5));
        assert_eq!(p2.health_insurance, None);
        assert_eq!(p2.stay_days(), Some(6.0));
        assert_eq!(loaded.records[0].feedback, Some(4.0));
    }

    #[test]
    fn bad_optional_cells_keep_the_admission() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(CREATE).unwrap();
        conn.execute_batch(
            "INSERT INTO patients_data VALUES
                ('P1', '2024-01-03 00:00:00.000', 'N/A', 'Dr. A', 'Neuro', 'ICU', 'MRI', -50.0, 'NULL', 'N/A', 'nan');
             INSERT INTO patients_data VALUES
                ('P2', '2024-01-04', '2024-01-06', 'Dr. A', 'Neuro', 'ICU', 'MRI', 'unknown', 'Yes', 5, 2);",
        )
        .unwrap();

        let loaded = read_table(&conn, "patients_data", "memory".to_string()).unwrap();
        assert_eq!(loaded.rows_used(), 2);
        assert!(loaded.row_errors.is_empty());

        let p1 = &loaded.records[0];
        assert_eq!(p1.admit_date, chrono::NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(p1.billing_amount, None);
        assert_eq!(p1.health_insurance, None);
        assert_eq!(p1.feedback, None);
        assert_eq!(p1.stay_days(), None);
        assert_eq!(loaded.records[1].billing_amount, None);

        let rows: Vec<&crate::domain::Record> = loaded.records.iter().collect();
        let load = crate::aggregate::doctor_patient_load(&rows);
        assert_eq!(load[0].count, 2);
    }

    #[test]
    fn rejects_suspicious_table_names() {
        assert!(validate_table_name("patients_data").is_ok());
        assert!(validate_table_name("x; DROP TABLE y").is_err());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("1abc").is_err());
    }

    #[test]
    fn missing_table_or_columns_is_unavailable() {
        let conn = Connection::open_in_memory().unwrap();
        let err = read_table(&conn, "patients_data", "memory".to_string()).unwrap_err();
        assert!(matches!(err, SourceError::DataUnavailable { .. }));

        conn.execute_batch("CREATE TABLE patients_data (Patient_ID TEXT, Admit_Date TEXT);")
            .unwrap();
        let err = read_table(&conn, "patients_data", "memory".to_string()).unwrap_err();
        assert!(matches!(err, SourceError::MissingColumns { .. }));
    }

    #[test]
    fn load_all_opens_and_closes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("health.db");
        {
            let conn = Connection::open(&path).unwrap();
            seeded(&conn);
        }

        let source = SqliteSource::new(path, "patients_data".to_string());
        let loaded = source.load_all().unwrap();
        assert_eq!(loaded.rows_used(), 2);

        let missing = SqliteSource::new(dir.path().join("nope.db"), "patients_data".to_string());
        assert!(matches!(missing.load_all(), Err(SourceError::DataUnavailable { .. })));
    }
}
