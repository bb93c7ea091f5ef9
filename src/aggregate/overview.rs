//! Hospital-wide KPIs and the summary insight.

use std::collections::HashSet;

use serde::Serialize;

use super::admissions::{ScatterSeries, stay_billing_points};
use super::diagnostics::avg_feedback;
use super::group::{Leader, ValueRow, group_by, mean, rank_desc, total_billing, value_leader};
use crate::domain::{INSURED_CATEGORY, Record};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HospitalKpis {
    /// Distinct patient ids.
    pub patients: usize,
    pub total_revenue: f64,
    pub avg_stay_days: Option<f64>,
    pub avg_feedback: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosisScatter {
    pub diagnosis: String,
    #[serde(flatten)]
    pub series: ScatterSeries,
}

/// Headline facts for the filtered selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    #[serde(flatten)]
    pub kpis: HospitalKpis,
    pub top_diagnosis: Option<Leader<f64>>,
    /// Percent of revenue billed to insured patients.
    pub insurance_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewView {
    pub kpis: HospitalKpis,
    pub revenue_by_diagnosis: Vec<ValueRow<String>>,
    pub stay_vs_billing_by_diagnosis: Vec<DiagnosisScatter>,
    pub revenue_by_insurance: Vec<ValueRow<String>>,
    pub summary: Option<Summary>,
}

pub fn hospital_kpis(rows: &[&Record]) -> HospitalKpis {
    let patients = rows
        .iter()
        .map(|r| r.patient_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    HospitalKpis {
        patients,
        total_revenue: total_billing(rows),
        avg_stay_days: mean(rows.iter().filter_map(|r| r.usable_stay_days())),
        avg_feedback: avg_feedback(rows),
    }
}

/// Billing summed per diagnosis, highest first.
pub fn revenue_by_diagnosis(rows: &[&Record]) -> Vec<ValueRow<String>> {
    let mut table = group_by(rows, |r| r.diagnosis.clone()).sums(|r| r.billing_amount);
    rank_desc(&mut table, |row| row.value);
    table
}

/// Stay vs billing samples and trend, one series per diagnosis.
pub fn stay_vs_billing_by_diagnosis(rows: &[&Record]) -> Vec<DiagnosisScatter> {
    group_by(rows, |r| r.diagnosis.clone())
        .summarize(|group| ScatterSeries::from_points(stay_billing_points(group)))
        .into_iter()
        .map(|(diagnosis, series)| DiagnosisScatter { diagnosis, series })
        .collect()
}

/// Billing summed per insurance category (`Yes` / `No`).
pub fn revenue_by_insurance(rows: &[&Record]) -> Vec<ValueRow<String>> {
    group_by(rows, |r| r.health_insurance.map(|i| i.category().to_string()))
        .sums(|r| r.billing_amount)
}

/// Insured revenue as a percentage of `total_revenue`; 0 when there is none.
pub fn insurance_share(by_insurance: &[ValueRow<String>], total_revenue: f64) -> f64 {
    if total_revenue <= 0.0 {
        return 0.0;
    }
    let insured: f64 = by_insurance
        .iter()
        .filter(|row| row.key == INSURED_CATEGORY)
        .map(|row| row.value)
        .sum();
    insured / total_revenue * 100.0
}

/// `None` when nothing is selected.
pub fn summary(rows: &[&Record]) -> Option<Summary> {
    if rows.is_empty() {
        return None;
    }
    let kpis = hospital_kpis(rows);
    let top_diagnosis = value_leader(&revenue_by_diagnosis(rows));
    let insurance_share = insurance_share(&revenue_by_insurance(rows), kpis.total_revenue);
    Some(Summary {
        kpis,
        top_diagnosis,
        insurance_share,
    })
}

pub fn overview_view(rows: &[&Record]) -> OverviewView {
    OverviewView {
        kpis: hospital_kpis(rows),
        revenue_by_diagnosis: revenue_by_diagnosis(rows),
        stay_vs_billing_by_diagnosis: stay_vs_billing_by_diagnosis(rows),
        revenue_by_insurance: revenue_by_insurance(rows),
        summary: summary(rows),
    }
}
