//! Column mapping and row normalization shared by every source.
//!
//! Sources differ only in how they hand us cells; header matching, required
//! column checks and value parsing live here so CSV and SQLite behave the same.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::{Insurance, Record};

pub const PATIENT_ID: &str = "patient_id";
pub const ADMIT_DATE: &str = "admit_date";
pub const DISCHARGE_DATE: &str = "discharge_date";
pub const DOCTOR: &str = "doctor";
pub const DIAGNOSIS: &str = "diagnosis";
pub const BED_OCCUPANCY: &str = "bed_occupancy";
pub const TEST: &str = "test";
pub const BILLING_AMOUNT: &str = "billing_amount";
pub const HEALTH_INSURANCE_AMOUNT: &str = "health_insurance_amount";
pub const FEEDBACK: &str = "feedback";
pub const LENGTH_OF_STAY: &str = "length_of_stay";

/// Columns that must be present in the source schema.
pub const REQUIRED_COLUMNS: [&str; 10] = [
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
];

/// Access to the cells of one source row by position.
pub trait RowCells {
    fn cell(&self, idx: usize) -> Option<&str>;
}

impl RowCells for ::csv::StringRecord {
    fn cell(&self, idx: usize) -> Option<&str> {
        self.get(idx)
    }
}

impl RowCells for Vec<Option<String>> {
    fn cell(&self, idx: usize) -> Option<&str> {
        self.get(idx).and_then(|c| c.as_deref())
    }
}

/// Normalized header name -> column position.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    indices: HashMap<String, usize>,
}

impl ColumnMap {
    pub fn from_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let indices = headers
            .into_iter()
            .enumerate()
            .map(|(idx, name)| (normalize_header_name(name), idx))
            .collect();
        Self { indices }
    }

    /// Required columns absent from the source, in schema order.
    pub fn missing_required(&self) -> Vec<String> {
        REQUIRED_COLUMNS
            .iter()
            .filter(|name| !self.indices.contains_key(**name))
            .map(|name| name.to_string())
            .collect()
    }

    fn get<'a, R: RowCells>(&self, row: &'a R, name: &str) -> Option<&'a str> {
        let idx = self.indices.get(name)?;
        row.cell(*idx)
            .map(str::trim)
            .filter(|s| !s.is_empty() && !is_null_token(s))
    }
}

fn is_null_token(s: &str) -> bool {
    NULL_TOKENS.iter().any(|t| s.eq_ignore_ascii_case(t))
}

/// `Billing Amount`, ` billing_amount` and `BILLING_AMOUNT` all map to
/// `billing_amount`.
pub fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}').trim();
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_ascii_lowercase()
}

/// Cell values treated as missing, compared case-insensitively.
const NULL_TOKENS: [&str; 6] = ["null", "n/a", "na", "nan", "none", "-"];

/// Parse one source row into a `Record`.
///
/// Only `patient_id` and `admit_date` can reject a row; `Err` carries the
/// message and the patient id when one was readable. A malformed optional
/// cell is logged and read as missing, so the admission still counts
/// everywhere that field is not needed.
pub fn parse_record<R: RowCells>(row: &R, columns: &ColumnMap) -> Result<Record, (Option<String>, String)> {
    let patient_id = columns
        .get(row, PATIENT_ID)
        .map(str::to_string)
        .ok_or_else(|| (None, format!("Missing required value: `{PATIENT_ID}`")))?;

    let admit_date = columns
        .get(row, ADMIT_DATE)
        .ok_or_else(|| format!("Missing required value: `{ADMIT_DATE}`"))
        .and_then(parse_date)
        .map_err(|message| (Some(patient_id.clone()), message))?;

    let cell = |column: &str| columns.get(row, column);
    let id = patient_id.as_str();

    let discharge_date = lenient(id, DISCHARGE_DATE, cell(DISCHARGE_DATE), parse_date);
    let billing_amount = lenient(id, BILLING_AMOUNT, cell(BILLING_AMOUNT), |raw| {
        let v = parse_f64(raw, BILLING_AMOUNT)?;
        if v < 0.0 {
            return Err(format!("Negative `{BILLING_AMOUNT}` value '{raw}'."));
        }
        Ok(v)
    });
    let health_insurance = lenient(id, HEALTH_INSURANCE_AMOUNT, cell(HEALTH_INSURANCE_AMOUNT), |raw| {
        Insurance::parse(&strip_number_formatting(raw))
            .ok_or_else(|| format!("Invalid `{HEALTH_INSURANCE_AMOUNT}` value '{raw}'."))
    });
    let feedback = lenient(id, FEEDBACK, cell(FEEDBACK), |raw| parse_f64(raw, FEEDBACK));
    let length_of_stay = lenient(id, LENGTH_OF_STAY, cell(LENGTH_OF_STAY), |raw| {
        parse_f64(raw, LENGTH_OF_STAY)
    });

    Ok(Record {
        admit_date,
        discharge_date,
        doctor: cell(DOCTOR).map(str::to_string),
        diagnosis: cell(DIAGNOSIS).map(str::to_string),
        bed_occupancy: cell(BED_OCCUPANCY).map(str::to_string),
        test: cell(TEST).map(str::to_string),
        billing_amount,
        health_insurance,
        feedback,
        length_of_stay,
        patient_id,
    })
}

/// Accept ISO dates, SQL datetimes, and the common day-first exports.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const DATE_FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    const DATETIME_FMTS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY-MM-DD HH:MM:SS[.fff], DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}

/// Parse an optional cell, logging and dropping a value that does not parse.
fn lenient<T>(
    patient_id: &str,
    column: &str,
    raw: Option<&str>,
    parse: impl FnOnce(&str) -> Result<T, String>,
) -> Option<T> {
    match parse(raw?) {
        Ok(v) => Some(v),
        Err(message) => {
            tracing::warn!(patient_id, column, "ignoring cell: {message}");
            None
        }
    }
}

fn parse_f64(raw: &str, name: &str) -> Result<f64, String> {
    match strip_number_formatting(raw).parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("Invalid `{name}` value '{raw}'.")),
    }
}

/// Drop thousands separators and a leading rupee sign (`₹1,200.50`).
fn strip_number_formatting(raw: &str) -> String {
    raw.trim()
        .trim_start_matches('₹')
        .chars()
        .filter(|c| *c != ',')
        .collect()
}
