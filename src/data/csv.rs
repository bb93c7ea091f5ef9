//! CSV ingest.
//!
//! Reads a CSV export of the admissions table. Header names are matched the
//! same way as SQL column names, so an export taken straight from the store
//! (`Billing Amount`, `Health Insurance Amount`, ...) loads unchanged.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use super::schema::{ColumnMap, parse_record};
use super::{LoadedData, RecordSource, RowError, SourceError};

#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl RecordSource for CsvSource {
    fn describe(&self) -> String {
        format!("CSV '{}'", self.path.display())
    }

    fn load_all(&self) -> Result<LoadedData, SourceError> {
        let file = File::open(&self.path).map_err(|e| SourceError::DataUnavailable {
            source_name: self.describe(),
            reason: e.to_string(),
        })?;
        read_records(file, self.describe())
    }
}

/// Parse records from any CSV reader.
pub fn read_records<R: Read>(input: R, source_name: String) -> Result<LoadedData, SourceError> {
    let mut reader = ::csv::ReaderBuilder::new()
        .flexible(true)
        .trim(::csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| SourceError::DataUnavailable {
            source_name: source_name.clone(),
            reason: format!("failed to read CSV headers: {e}"),
        })?
        .clone();

    let columns = ColumnMap::from_headers(headers.iter());
    let missing = columns.missing_required();
    if !missing.is_empty() {
        return Err(SourceError::MissingColumns {
            source_name,
            columns: missing,
        });
    }

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header line; lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let row = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    patient_id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_record(&row, &columns) {
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

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const CSV: &str = "\
Patient_ID,Admit_Date,Discharge_Date,Doctor,Diagnosis,Bed_Occupancy,Test,Billing Amount,Health Insurance Amount,Feedback
P1,2024-01-03,2024-01-05,Dr. A,Cardiology,ICU,ECG,1000,800,4
P2,bad-date,2024-01-05,Dr. B,Neuro,General,MRI,2000,0,3
P3,2024-01-04,,Dr. B,Neuro,,MRI,3000,No,
";

    const CSV_WITH_NULLS: &str = "\
Patient_ID,Admit_Date,Discharge_Date,Doctor,Diagnosis,Bed_Occupancy,Test,Billing Amount,Health Insurance Amount,Feedback
P1,2024-01-03,2024-01-05,Dr. A,Cardiology,ICU,ECG,1000,800,4
P2,2024-01-04,2024-01-06,Dr. B,Neuro,General,MRI,2000,0,N/A
P3,2024-01-05,2024-01-06 00:00:00.000,Dr. B,Neuro,General,MRI,-3000,NULL,five
";

    #[test]
    fn rows_without_a_valid_admit_date_are_skipped() {
        let loaded = read_records(CSV.as_bytes(), "inline".to_string()).unwrap();
        assert_eq!(loaded.rows_read, 3);
        assert_eq!(loaded.rows_used(), 2);
        assert_eq!(loaded.records[0].patient_id, "P1");
        assert_eq!(loaded.records[1].patient_id, "P3");
        assert!(loaded.records[1].bed_occupancy.is_none());

        assert_eq!(loaded.row_errors.len(), 1);
        let err = &loaded.row_errors[0];
        assert_eq!(err.line, 3);
        assert_eq!(err.patient_id.as_deref(), Some("P2"));
    }

    #[test]
    fn bad_optional_cells_keep_the_admission() {
        let loaded = read_records(CSV_WITH_NULLS.as_bytes(), "inline".to_string()).unwrap();
        assert_eq!(loaded.rows_used(), 3);
        assert!(loaded.row_errors.is_empty());

        let p3 = &loaded.records[2];
        assert_eq!(p3.billing_amount, None);
        assert_eq!(p3.health_insurance, None);
        assert_eq!(p3.feedback, None);
        assert_eq!(p3.stay_days(), Some(1.0));

        let rows: Vec<&crate::domain::Record> = loaded.records.iter().collect();
        let dash = crate::aggregate::build_dashboard(&rows);
        assert_eq!(dash.admissions.total_admissions, 3);
        assert_eq!(dash.overview.kpis.patients, 3);
        let load: Vec<(&str, usize)> = dash
            .doctors
            .patient_load
            .iter()
            .map(|r| (r.key.as_str(), r.count))
            .collect();
        assert_eq!(load, [("Dr. B", 2), ("Dr. A", 1)]);

        // Excluded only where the field is needed.
        assert_eq!(dash.financials.total_revenue, 3000.0);
        assert_eq!(dash.diagnostics.avg_feedback, Some(4.0));
    }

    #[test]
    fn missing_columns_are_fatal() {
        let err = read_records("Patient_ID,Admit_Date\nP1,2024-01-01\n".as_bytes(), "inline".to_string())
            .unwrap_err();
        match err {
            SourceError::MissingColumns { columns, .. } => assert!(columns.contains(&"doctor".to_string())),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn header_only_file_loads_empty() {
        let header = CSV.lines().next().unwrap();
        let loaded = read_records(header.as_bytes(), "inline".to_string()).unwrap();
        assert!(loaded.records.is_empty());
        assert_eq!(loaded.rows_read, 0);
    }

    #[test]
    fn load_all_from_file_and_missing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();
        let loaded = CsvSource::new(file.path().to_path_buf()).load_all().unwrap();
        assert_eq!(loaded.rows_used(), 2);

        let err = CsvSource::new(PathBuf::from("/nonexistent/admissions.csv"))
            .load_all()
            .unwrap_err();
        assert!(matches!(err, SourceError::DataUnavailable { .. }));
    }
}
