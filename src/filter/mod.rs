//! Filter engine.
//!
//! `apply` keeps the records satisfying every active constraint (logical AND)
//! and preserves load order. `FilterOptions` derives the candidate values a
//! front-end offers for each constraint.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::domain::{Constraints, DateRange, Record};

/// Candidate constraint values observed in a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    /// Sorted distinct doctors (nulls ignored).
    pub doctors: Vec<String>,
    pub diagnoses: Vec<String>,
    pub bed_types: Vec<String>,
    /// Earliest to latest admit date; `None` for an empty dataset.
    pub date_span: Option<DateRange>,
}

impl FilterOptions {
    pub fn observe(records: &[Record]) -> Self {
        let distinct = |field: fn(&Record) -> Option<&String>| -> Vec<String> {
            records
                .iter()
                .filter_map(field)
                .cloned()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        };

        let date_span = records
            .iter()
            .map(|r| r.admit_date)
            .min()
            .zip(records.iter().map(|r| r.admit_date).max())
            .and_then(|(start, end)| DateRange::new(start, end));

        Self {
            doctors: distinct(|r| r.doctor.as_ref()),
            diagnoses: distinct(|r| r.diagnosis.as_ref()),
            bed_types: distinct(|r| r.bed_occupancy.as_ref()),
            date_span,
        }
    }
}

impl Constraints {
    /// The "everything selected" state: every observed value and the full span.
    ///
    /// Unlike `Constraints::default()`, this excludes records whose doctor,
    /// diagnosis or bed type is missing, since a null never belongs to a set.
    pub fn all_observed(options: &FilterOptions) -> Self {
        Self {
            date_range: options.date_span,
            doctors: Some(options.doctors.iter().cloned().collect()),
            diagnoses: Some(options.diagnoses.iter().cloned().collect()),
            bed_types: Some(options.bed_types.iter().cloned().collect()),
        }
    }

    /// Does `record` satisfy every active constraint?
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(range) = &self.date_range {
            if !range.contains(record.admit_date) {
                return false;
            }
        }
        in_set(self.doctors.as_ref(), record.doctor.as_deref())
            && in_set(self.diagnoses.as_ref(), record.diagnosis.as_deref())
            && in_set(self.bed_types.as_ref(), record.bed_occupancy.as_deref())
    }
}

fn in_set(set: Option<&BTreeSet<String>>, value: Option<&str>) -> bool {
    let Some(set) = set else { return true };
    let Some(value) = value else { return false };
    set.contains(value)
}

/// Records satisfying all constraints, in original order.
pub fn apply<'a>(records: &'a [Record], constraints: &Constraints) -> Vec<&'a Record> {
    records.iter().filter(|r| constraints.matches(r)).collect()
}
