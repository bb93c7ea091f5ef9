//! Billing, coverage and revenue tables.

use serde::Serialize;

use super::group::{Leader, ValueRow, group_by, mean, rank_desc, total_billing};
use crate::domain::{MonthKey, Record};

pub const TOTAL_BILLING_LABEL: &str = "Total Billing";
pub const INSURANCE_COVERAGE_LABEL: &str = "Insurance Coverage";

/// Billed amount against insurance-covered amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BillingCoverage {
    pub total_billing: f64,
    /// Sum of numeric insurance amounts; Yes/No cells contribute nothing.
    pub insurance_coverage: f64,
}

impl BillingCoverage {
    /// Two-row category table, in display order.
    pub fn as_table(&self) -> [ValueRow<&'static str>; 2] {
        [
            ValueRow {
                key: TOTAL_BILLING_LABEL,
                value: self.total_billing,
            },
            ValueRow {
                key: INSURANCE_COVERAGE_LABEL,
                value: self.insurance_coverage,
            },
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosisRevenueRow {
    pub diagnosis: String,
    pub patient_count: usize,
    pub total_revenue: f64,
    /// `None` when no record in the group carries a billing amount.
    pub avg_revenue: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialsView {
    pub avg_billing_by_diagnosis: Vec<ValueRow<String>>,
    pub billing_vs_insurance: BillingCoverage,
    pub diagnosis_revenue: Vec<DiagnosisRevenueRow>,
    pub top_revenue_diagnosis: Option<Leader<f64>>,
    pub monthly_revenue: Vec<ValueRow<MonthKey>>,
    pub total_revenue: f64,
    pub avg_monthly_revenue: f64,
}

/// Mean billing per diagnosis, highest first.
pub fn average_billing_by_diagnosis(rows: &[&Record]) -> Vec<ValueRow<String>> {
    let mut table = group_by(rows, |r| r.diagnosis.clone()).means(|r| r.billing_amount);
    rank_desc(&mut table, |row| row.value);
    table
}

pub fn billing_vs_insurance(rows: &[&Record]) -> BillingCoverage {
    BillingCoverage {
        total_billing: total_billing(rows),
        insurance_coverage: rows
            .iter()
            .filter_map(|r| r.health_insurance.and_then(|i| i.amount()))
            .sum(),
    }
}

/// Patient count, total and mean billing per diagnosis, ranked by total.
pub fn diagnosis_revenue(rows: &[&Record]) -> Vec<DiagnosisRevenueRow> {
    let mut table: Vec<DiagnosisRevenueRow> = group_by(rows, |r| r.diagnosis.clone())
        .summarize(|group| {
            (
                group.len(),
                total_billing(group),
                mean(group.iter().filter_map(|r| r.billing_amount)),
            )
        })
        .into_iter()
        .map(|(diagnosis, (patient_count, total_revenue, avg_revenue))| DiagnosisRevenueRow {
            diagnosis,
            patient_count,
            total_revenue,
            avg_revenue,
        })
        .collect();
    rank_desc(&mut table, |row| row.total_revenue);
    table
}

/// Billing summed per admission month, ascending.
pub fn monthly_revenue(rows: &[&Record]) -> Vec<ValueRow<MonthKey>> {
    let mut table = group_by(rows, |r| Some(r.month())).sums(|r| r.billing_amount);
    table.sort_by_key(|row| row.key);
    table
}

pub fn financials_view(rows: &[&Record]) -> FinancialsView {
    let diagnosis_revenue = diagnosis_revenue(rows);
    let top_revenue_diagnosis = diagnosis_revenue.first().map(|row| Leader {
        name: row.diagnosis.clone(),
        value: row.total_revenue,
    });

    let monthly_revenue = monthly_revenue(rows);
    let avg_monthly_revenue = mean(monthly_revenue.iter().map(|row| row.value)).unwrap_or(0.0);

    FinancialsView {
        avg_billing_by_diagnosis: average_billing_by_diagnosis(rows),
        billing_vs_insurance: billing_vs_insurance(rows),
        top_revenue_diagnosis,
        diagnosis_revenue,
        total_revenue: total_billing(rows),
        avg_monthly_revenue,
        monthly_revenue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Insurance;
    use chrono::NaiveDate;

    fn rec(m: u32, diagnosis: &str, billing: Option<f64>, insurance: Option<Insurance>) -> Record {
        let mut r = Record::new("P", NaiveDate::from_ymd_opt(2024, m, 1).unwrap());
        r.diagnosis = Some(diagnosis.to_string());
        r.billing_amount = billing;
        r.health_insurance = insurance;
        r
    }

    #[test]
    fn average_billing_is_ranked_descending() {
        let data = [
            rec(1, "Flu", Some(100.0), None),
            rec(1, "Fracture", Some(900.0), None),
            rec(1, "Flu", Some(300.0), None),
            rec(1, "Typhoid", None, None),
        ];
        let rows: Vec<&Record> = data.iter().collect();
        let table = average_billing_by_diagnosis(&rows);
        assert_eq!(
            table,
            [
                ValueRow { key: "Fracture".to_string(), value: 900.0 },
                ValueRow { key: "Flu".to_string(), value: 200.0 },
            ]
        );
    }

    #[test]
    fn coverage_sums_only_numeric_insurance() {
        let data = [
            rec(1, "Flu", Some(1000.0), Some(Insurance::Amount(600.0))),
            rec(1, "Flu", Some(500.0), Some(Insurance::Flag(true))),
            rec(1, "Flu", None, Some(Insurance::Amount(50.0))),
        ];
        let rows: Vec<&Record> = data.iter().collect();
        let cov = billing_vs_insurance(&rows);
        assert_eq!(cov.total_billing, 1500.0);
        assert_eq!(cov.insurance_coverage, 650.0);
        let table = cov.as_table();
        assert_eq!(table[0].key, TOTAL_BILLING_LABEL);
        assert_eq!(table[1].value, 650.0);
    }

    #[test]
    fn diagnosis_revenue_ranks_by_total_with_stable_ties() {
        let data = [
            rec(1, "Flu", Some(500.0), None),
            rec(1, "Malaria", Some(2000.0), None),
            rec(1, "Typhoid", Some(500.0), None),
            rec(1, "Malaria", None, None),
        ];
        let rows: Vec<&Record> = data.iter().collect();
        let table = diagnosis_revenue(&rows);
        let names: Vec<&str> = table.iter().map(|r| r.diagnosis.as_str()).collect();
        assert_eq!(names, ["Malaria", "Flu", "Typhoid"]);
        assert_eq!(table[0].patient_count, 2);
        assert_eq!(table[0].avg_revenue, Some(2000.0));
        assert!(table.windows(2).all(|w| w[0].total_revenue >= w[1].total_revenue));
    }

    #[test]
    fn monthly_revenue_ascends_and_feeds_kpis() {
        let data = [
            rec(3, "Flu", Some(300.0), None),
            rec(1, "Flu", Some(100.0), None),
            rec(3, "Flu", Some(200.0), None),
        ];
        let rows: Vec<&Record> = data.iter().collect();
        let view = financials_view(&rows);
        let months: Vec<String> = view.monthly_revenue.iter().map(|r| r.key.to_string()).collect();
        assert_eq!(months, ["2024-01", "2024-03"]);
        assert_eq!(view.monthly_revenue[1].value, 500.0);
        assert_eq!(view.total_revenue, 600.0);
        assert_eq!(view.avg_monthly_revenue, 300.0);
        assert_eq!(
            view.top_revenue_diagnosis,
            Some(Leader { name: "Flu".to_string(), value: 600.0 })
        );
    }

    #[test]
    fn empty_input_gives_zero_kpis() {
        let view = financials_view(&[]);
        assert!(view.avg_billing_by_diagnosis.is_empty());
        assert!(view.diagnosis_revenue.is_empty());
        assert!(view.monthly_revenue.is_empty());
        assert_eq!(view.top_revenue_diagnosis, None);
        assert_eq!(view.total_revenue, 0.0);
        assert_eq!(view.avg_monthly_revenue, 0.0);
        assert_eq!(view.billing_vs_insurance.total_billing, 0.0);
    }
}
