//! Aggregation pipeline.
//!
//! Every function here is a pure function of the filtered rows and never
//! fails: empty input gives empty tables, zero sums and `None` KPIs.

pub mod admissions;
pub mod diagnostics;
pub mod doctors;
pub mod financials;
pub mod group;
pub mod overview;

use std::time::Instant;

use serde::Serialize;

pub use admissions::*;
pub use diagnostics::*;
pub use doctors::*;
pub use financials::*;
pub use group::*;
pub use overview::*;

use crate::domain::{Record, View};

/// Every view computed over one filtered selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub records: usize,
    pub admissions: AdmissionsView,
    pub financials: FinancialsView,
    pub doctors: DoctorsView,
    pub diagnostics: DiagnosticsView,
    pub overview: OverviewView,
}

pub fn build_dashboard(rows: &[&Record]) -> Dashboard {
    Dashboard {
        records: rows.len(),
        admissions: timed(View::Admissions, || admissions_view(rows)),
        financials: timed(View::Financials, || financials_view(rows)),
        doctors: timed(View::Doctors, || doctors_view(rows)),
        diagnostics: timed(View::Diagnostics, || diagnostics_view(rows)),
        overview: timed(View::Overview, || overview_view(rows)),
    }
}

fn timed<T>(view: View, f: impl FnOnce() -> T) -> T {
    let started = Instant::now();
    let out = f();
    tracing::debug!(?view, elapsed_us = started.elapsed().as_micros() as u64, "view computed");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn dashboard_over_sample_data_is_consistent() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let data = crate::data::generate_sample(200, 11, start).unwrap();
        let rows: Vec<&Record> = data.iter().collect();
        let dash = build_dashboard(&rows);

        assert_eq!(dash.records, 200);
        assert_eq!(dash.admissions.total_admissions, 200);
        assert!(dash.admissions.daily.windows(2).all(|w| w[0].key < w[1].key));
        assert!(
            dash.financials
                .monthly_revenue
                .windows(2)
                .all(|w| w[0].key < w[1].key)
        );
        assert!(dash.doctors.revenue.windows(2).all(|w| w[0].value >= w[1].value));

        let by_doctor: f64 = dash.doctors.revenue.iter().map(|r| r.value).sum();
        assert!((by_doctor - dash.financials.total_revenue).abs() < 1e-6);
        assert!((dash.overview.kpis.total_revenue - dash.financials.total_revenue).abs() < 1e-9);

        let summary = dash.overview.summary.as_ref().unwrap();
        assert!((0.0..=100.0).contains(&summary.insurance_share));
        assert_eq!(
            summary.top_diagnosis.as_ref().map(|l| l.name.as_str()),
            dash.financials.top_revenue_diagnosis.as_ref().map(|l| l.name.as_str())
        );
    }

    #[test]
    fn empty_selection_builds_an_empty_dashboard() {
        let dash = build_dashboard(&[]);
        assert_eq!(dash.records, 0);
        assert!(dash.overview.summary.is_none());
        assert_eq!(dash.financials.avg_monthly_revenue, 0.0);
        assert!(serde_json::to_string(&dash).is_ok());
    }
}
