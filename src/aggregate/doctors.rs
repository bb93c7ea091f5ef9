//! Per-doctor load, revenue and ratings.

use serde::Serialize;

use super::group::{CountRow, Leader, ValueRow, count_leader, group_by, rank_desc, value_leader};
use crate::domain::Record;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoctorsView {
    pub patient_load: Vec<CountRow<String>>,
    pub most_consulted: Option<Leader<usize>>,
    pub revenue: Vec<ValueRow<String>>,
    pub top_earning: Option<Leader<f64>>,
    pub feedback: Vec<ValueRow<String>>,
    pub highest_rated: Option<Leader<f64>>,
}

/// Patients seen per doctor, busiest first.
pub fn doctor_patient_load(rows: &[&Record]) -> Vec<CountRow<String>> {
    let mut table = group_by(rows, |r| r.doctor.clone()).counts();
    rank_desc(&mut table, |row| row.count as f64);
    table
}

/// Billing summed per doctor, highest first.
pub fn doctor_revenue(rows: &[&Record]) -> Vec<ValueRow<String>> {
    let mut table = group_by(rows, |r| r.doctor.clone()).sums(|r| r.billing_amount);
    rank_desc(&mut table, |row| row.value);
    table
}

/// Mean feedback rating per doctor, highest first. Unrated doctors are omitted.
pub fn doctor_feedback(rows: &[&Record]) -> Vec<ValueRow<String>> {
    let mut table = group_by(rows, |r| r.doctor.clone()).means(|r| r.feedback);
    rank_desc(&mut table, |row| row.value);
    table
}

pub fn doctors_view(rows: &[&Record]) -> DoctorsView {
    let patient_load = doctor_patient_load(rows);
    let revenue = doctor_revenue(rows);
    let feedback = doctor_feedback(rows);

    DoctorsView {
        most_consulted: count_leader(&patient_load),
        top_earning: value_leader(&revenue),
        highest_rated: value_leader(&feedback),
        patient_load,
        revenue,
        feedback,
    }
}
