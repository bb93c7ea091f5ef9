//! Export the dashboard to JSON and records to CSV.
//!
//! The record CSV uses the same column names the loader expects, so an export
//! (or `hdash demo` output) can be fed straight back in with `--csv`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::data::schema::{
    ADMIT_DATE, BED_OCCUPANCY, BILLING_AMOUNT, DIAGNOSIS, DISCHARGE_DATE, DOCTOR, FEEDBACK,
    HEALTH_INSURANCE_AMOUNT, LENGTH_OF_STAY, PATIENT_ID, TEST,
};
use crate::domain::Record;
use crate::error::AppError;

const RECORD_HEADER: [&str; 11] = [
    PATIENT_ID,
    ADMIT_DATE,
    DISCHARGE_DATE,
    DOCTOR,
    DIAGNOSIS,
    BED_OCCUPANCY,
    TEST,
    BILLING_AMOUNT,
    HEALTH_INSURANCE_AMOUNT,
    FEEDBACK,
    LENGTH_OF_STAY,
];

/// Write any serializable value as pretty JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create JSON '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| AppError::io(format!("Failed to write JSON '{}': {e}", path.display())))?;
    writeln!(writer)
        .and_then(|_| writer.flush())
        .map_err(|e| AppError::io(format!("Failed to write JSON '{}': {e}", path.display())))
}

/// Write records to a CSV file, one row per admission.
pub fn write_records_csv<'a>(
    path: &Path,
    records: impl IntoIterator<Item = &'a Record>,
) -> Result<usize, AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create CSV '{}': {e}", path.display())))?;
    let n = write_records(file, records)
        .map_err(|e| AppError::io(format!("Failed to write CSV '{}': {e}", path.display())))?;
    Ok(n)
}

fn write_records<'a, W: Write>(
    out: W,
    records: impl IntoIterator<Item = &'a Record>,
) -> Result<usize, ::csv::Error> {
    let mut writer = ::csv::Writer::from_writer(out);
    writer.write_record(RECORD_HEADER)?;

    let mut n = 0usize;
    for r in records {
        writer.write_record([
            r.patient_id.clone(),
            r.admit_date.to_string(),
            opt(r.discharge_date),
            r.doctor.clone().unwrap_or_default(),
            r.diagnosis.clone().unwrap_or_default(),
            r.bed_occupancy.clone().unwrap_or_default(),
            r.test.clone().unwrap_or_default(),
            opt(r.billing_amount),
            opt(r.health_insurance),
            opt(r.feedback),
            opt(r.length_of_stay),
        ])?;
        n += 1;
    }

    writer.flush()?;
    Ok(n)
}

fn opt<T: ToString>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}
