//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - used in-memory while filtering and aggregating
//! - exported to JSON/CSV
//! - built directly in tests without a store

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize, Serializer};

/// Which dashboard view(s) to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum View {
    All,
    Admissions,
    Financials,
    Doctors,
    Diagnostics,
    Overview,
}

impl View {
    pub fn includes(self, other: View) -> bool {
        self == View::All || self == other
    }
}

/// The health insurance cell of a record.
///
/// Source data uses the column both as an amount and as a Yes/No category.
/// We keep whichever form the cell actually holds and map between them
/// explicitly:
///
/// - amount view: `Amount(v) -> v`, `Flag(_) ->` missing
/// - category view: `Amount(v) -> Yes if v > 0`, `Flag(b) -> Yes if b`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum Insurance {
    Amount(f64),
    Flag(bool),
}

pub const INSURED_CATEGORY: &str = "Yes";
pub const UNINSURED_CATEGORY: &str = "No";

impl Insurance {
    /// Parse a raw cell. Numbers become amounts, yes/no style tokens become flags.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" => return Some(Insurance::Flag(true)),
            "no" | "n" | "false" => return Some(Insurance::Flag(false)),
            _ => {}
        }
        let v = raw.parse::<f64>().ok()?;
        if v.is_finite() { Some(Insurance::Amount(v)) } else { None }
    }

    /// Numeric amount, if the cell holds one.
    pub fn amount(self) -> Option<f64> {
        match self {
            Insurance::Amount(v) => Some(v),
            Insurance::Flag(_) => None,
        }
    }

    pub fn is_covered(self) -> bool {
        match self {
            Insurance::Amount(v) => v > 0.0,
            Insurance::Flag(b) => b,
        }
    }

    /// Category label used for revenue-share grouping.
    pub fn category(self) -> &'static str {
        if self.is_covered() {
            INSURED_CATEGORY
        } else {
            UNINSURED_CATEGORY
        }
    }
}

impl fmt::Display for Insurance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Insurance::Amount(v) => write!(f, "{v}"),
            Insurance::Flag(true) => f.write_str(INSURED_CATEGORY),
            Insurance::Flag(false) => f.write_str(UNINSURED_CATEGORY),
        }
    }
}

/// Calendar month of an admission (`YYYY-MM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One patient admission row.
///
/// Categorical and numeric fields are optional: a missing value excludes the
/// record from the aggregations (and set filters) that need that field only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub patient_id: String,
    pub admit_date: NaiveDate,
    pub discharge_date: Option<NaiveDate>,
    pub doctor: Option<String>,
    pub diagnosis: Option<String>,
    pub bed_occupancy: Option<String>,
    pub test: Option<String>,
    pub billing_amount: Option<f64>,
    pub health_insurance: Option<Insurance>,
    pub feedback: Option<f64>,
    /// Supplied length of stay, used when no discharge date is present.
    pub length_of_stay: Option<f64>,
}

impl Record {
    /// A record with only the required fields set.
    pub fn new(patient_id: impl Into<String>, admit_date: NaiveDate) -> Self {
        Self {
            patient_id: patient_id.into(),
            admit_date,
            discharge_date: None,
            doctor: None,
            diagnosis: None,
            bed_occupancy: None,
            test: None,
            billing_amount: None,
            health_insurance: None,
            feedback: None,
            length_of_stay: None,
        }
    }

    /// Stay length in days: discharge minus admit when discharged, else the
    /// supplied `length_of_stay`. May be negative for inconsistent rows.
    pub fn stay_days(&self) -> Option<f64> {
        match self.discharge_date {
            Some(discharge) => Some((discharge - self.admit_date).num_days() as f64),
            None => self.length_of_stay,
        }
    }

    /// Stay length usable by aggregations (negative and non-finite excluded).
    pub fn usable_stay_days(&self) -> Option<f64> {
        self.stay_days().filter(|d| d.is_finite() && *d >= 0.0)
    }

    pub fn month(&self) -> MonthKey {
        MonthKey::of(self.admit_date)
    }
}

/// Inclusive admit-date bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Returns `None` when `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// User-selected filter state.
///
/// Every constraint is optional; `None` means "no restriction". The value is
/// built once per filter change and passed by reference to the filter engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraints {
    pub date_range: Option<DateRange>,
    pub doctors: Option<BTreeSet<String>>,
    pub diagnoses: Option<BTreeSet<String>>,
    pub bed_types: Option<BTreeSet<String>>,
}

impl Constraints {
    pub fn is_unrestricted(&self) -> bool {
        self.date_range.is_none()
            && self.doctors.is_none()
            && self.diagnoses.is_none()
            && self.bed_types.is_none()
    }
}
