//! Patient and admission trends.

use chrono::NaiveDate;
use serde::Serialize;

use super::group::{CountRow, ValueRow, group_by, mean};
use crate::domain::{MonthKey, Record};
use crate::math::{LinearTrend, fit_linear_trend};

/// Admissions in one (month, bed type) cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BedMonthRow {
    pub month: MonthKey,
    pub bed_type: String,
    pub admissions: usize,
}

/// Paired samples plus an optional least-squares trend line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    /// `(stay_days, billing_amount)` in filtered order.
    pub points: Vec<(f64, f64)>,
    pub trend: Option<LinearTrend>,
}

impl ScatterSeries {
    pub fn from_points(points: Vec<(f64, f64)>) -> Self {
        let trend = fit_linear_trend(&points);
        Self { points, trend }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdmissionsView {
    pub daily: Vec<CountRow<NaiveDate>>,
    pub total_admissions: usize,
    pub avg_daily_admissions: Option<f64>,
    pub bed_occupancy: Vec<BedMonthRow>,
    pub avg_stay_by_bed: Vec<ValueRow<String>>,
    pub stay_vs_billing: ScatterSeries,
}

/// Admissions per admit date, ascending.
pub fn daily_admissions(rows: &[&Record]) -> Vec<CountRow<NaiveDate>> {
    let mut table = group_by(rows, |r| Some(r.admit_date)).counts();
    table.sort_by_key(|row| row.key);
    table
}

/// Admissions per (month, bed type), ascending by month then bed type.
pub fn bed_occupancy_by_month(rows: &[&Record]) -> Vec<BedMonthRow> {
    let mut table: Vec<BedMonthRow> = group_by(rows, |r| {
        r.bed_occupancy.clone().map(|bed| (r.month(), bed))
    })
    .counts()
    .into_iter()
    .map(|row| BedMonthRow {
        month: row.key.0,
        bed_type: row.key.1,
        admissions: row.count,
    })
    .collect();
    table.sort_by(|a, b| (a.month, &a.bed_type).cmp(&(b.month, &b.bed_type)));
    table
}

/// Mean stay length (days) per bed type.
pub fn average_stay_by_bed(rows: &[&Record]) -> Vec<ValueRow<String>> {
    group_by(rows, |r| r.bed_occupancy.clone()).means(Record::usable_stay_days)
}

/// `(stay_days, billing)` samples with a trend line.
pub fn stay_vs_billing(rows: &[&Record]) -> ScatterSeries {
    ScatterSeries::from_points(stay_billing_points(rows))
}

pub(crate) fn stay_billing_points(rows: &[&Record]) -> Vec<(f64, f64)> {
    rows.iter()
        .filter_map(|r| Some((r.usable_stay_days()?, r.billing_amount?)))
        .collect()
}

pub fn admissions_view(rows: &[&Record]) -> AdmissionsView {
    let daily = daily_admissions(rows);
    let total_admissions = daily.iter().map(|row| row.count).sum();
    let avg_daily_admissions = mean(daily.iter().map(|row| row.count as f64));

    AdmissionsView {
        total_admissions,
        avg_daily_admissions,
        daily,
        bed_occupancy: bed_occupancy_by_month(rows),
        avg_stay_by_bed: average_stay_by_bed(rows),
        stay_vs_billing: stay_vs_billing(rows),
    }
}
