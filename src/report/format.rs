//! Plain-text rendering of dashboard views.
//!
//! Formatting lives here so the aggregation code stays presentation-free and
//! output changes are localized.

use std::fmt::Display;

use crate::aggregate::{
    AdmissionsView, CountRow, Dashboard, DiagnosticsView, DoctorsView, FinancialsView, Leader,
    OverviewView, ValueRow,
};
use crate::data::LoadedData;
use crate::domain::View;
use crate::filter::FilterOptions;
use crate::math::LinearTrend;

const NOT_AVAILABLE: &str = "N/A";

/// Render the requested view(s) with a load header.
pub fn format_dashboard(dash: &Dashboard, loaded: &LoadedData, view: View) -> String {
    let mut out = String::new();

    out.push_str("=== hdash - Hospital Insights ===\n");
    out.push_str(&format!("Source: {}\n", loaded.source_name));
    out.push_str(&format!(
        "Rows: read={} used={} skipped={} | selected={}\n",
        loaded.rows_read,
        loaded.rows_used(),
        loaded.row_errors.len(),
        dash.records
    ));
    if dash.records == 0 {
        out.push_str("No data available for selected filters.\n");
    }

    let sections: [(View, fn(&Dashboard) -> String); 5] = [
        (View::Admissions, |d| format_admissions(&d.admissions)),
        (View::Financials, |d| format_financials(&d.financials)),
        (View::Doctors, |d| format_doctors(&d.doctors)),
        (View::Diagnostics, |d| format_diagnostics(&d.diagnostics)),
        (View::Overview, |d| format_overview(&d.overview)),
    ];
    for (section, render) in sections {
        if view.includes(section) {
            out.push('\n');
            out.push_str(&render(dash));
        }
    }

    out.trim_end().to_string()
}

pub fn format_admissions(v: &AdmissionsView) -> String {
    let mut out = String::from("Patient & Admission Trends\n");
    out.push_str(&format!("Total admissions: {}\n", v.total_admissions));
    out.push_str(&format!(
        "Avg daily admissions: {}\n",
        fmt_opt(v.avg_daily_admissions, |x| format!("{x:.1}"))
    ));

    out.push_str("\nDaily admissions:\n");
    out.push_str(&count_table("date", &v.daily));

    out.push_str("\nBed occupancy by month:\n");
    out.push_str(&header(&format!("{:<8} {:<16} {:>10}", "month", "bed_type", "admissions")));
    for r in &v.bed_occupancy {
        push_line(
            &mut out,
            format!("{:<8} {:<16} {:>10}", r.month, truncate(&r.bed_type, 16), r.admissions),
        );
    }

    out.push_str("\nAverage stay by bed type (days):\n");
    out.push_str(&value_table("bed_type", &v.avg_stay_by_bed, |x| format!("{x:.1}")));

    out.push_str(&format!(
        "\nStay vs billing: n={} | trend: {}\n",
        v.stay_vs_billing.points.len(),
        fmt_trend(v.stay_vs_billing.trend.as_ref())
    ));
    out
}

pub fn format_financials(v: &FinancialsView) -> String {
    let mut out = String::from("Financial & Revenue\n");
    out.push_str(&format!("Total revenue: {}\n", fmt_inr(v.total_revenue)));
    out.push_str(&format!("Avg monthly revenue: {}\n", fmt_inr(v.avg_monthly_revenue)));
    out.push_str(&format!(
        "Top revenue diagnosis: {}\n",
        fmt_leader(v.top_revenue_diagnosis.as_ref(), |x| fmt_inr(*x))
    ));

    out.push_str("\nAverage billing by diagnosis:\n");
    out.push_str(&value_table("diagnosis", &v.avg_billing_by_diagnosis, fmt_inr));

    out.push_str("\nBilling vs insurance:\n");
    for row in v.billing_vs_insurance.as_table() {
        push_line(&mut out, format!("{:<24} {:>16}", row.key, fmt_inr(row.value)));
    }

    out.push_str("\nDiagnosis revenue:\n");
    out.push_str(&header(&format!(
        "{:<24} {:>8} {:>16} {:>14}",
        "diagnosis", "patients", "total", "average"
    )));
    for r in &v.diagnosis_revenue {
        push_line(
            &mut out,
            format!(
                "{:<24} {:>8} {:>16} {:>14}",
                truncate(&r.diagnosis, 24),
                r.patient_count,
                fmt_inr(r.total_revenue),
                fmt_opt(r.avg_revenue, fmt_inr),
            ),
        );
    }

    out.push_str("\nMonthly revenue:\n");
    out.push_str(&value_table("month", &v.monthly_revenue, fmt_inr));
    out
}

pub fn format_doctors(v: &DoctorsView) -> String {
    let mut out = String::from("Doctor Performance\n");
    out.push_str(&format!(
        "Most consulted: {}\n",
        fmt_leader(v.most_consulted.as_ref(), |n| format!("{n} patients"))
    ));
    out.push_str(&format!(
        "Top earning: {}\n",
        fmt_leader(v.top_earning.as_ref(), |x| fmt_inr(*x))
    ));
    out.push_str(&format!(
        "Highest rated: {}\n",
        fmt_leader(v.highest_rated.as_ref(), |x| format!("{x:.2}/5"))
    ));

    out.push_str("\nPatient load:\n");
    out.push_str(&count_table("doctor", &v.patient_load));
    out.push_str("\nRevenue:\n");
    out.push_str(&value_table("doctor", &v.revenue, fmt_inr));
    out.push_str("\nAverage feedback:\n");
    out.push_str(&value_table("doctor", &v.feedback, |x| format!("{x:.2}")));
    out
}

pub fn format_diagnostics(v: &DiagnosticsView) -> String {
    let mut out = String::from("Diagnostics & Feedback\n");
    out.push_str(&format!(
        "Most frequent test: {}\n",
        fmt_leader(v.most_frequent_test.as_ref(), |n| format!("{n} orders"))
    ));
    out.push_str(&format!(
        "Costliest test: {}\n",
        fmt_leader(v.costliest_test.as_ref(), |x| fmt_inr(*x))
    ));
    out.push_str(&format!(
        "Overall average feedback: {}\n",
        fmt_opt(v.avg_feedback, |x| format!("{x:.2}/5"))
    ));

    out.push_str("\nTest frequency (top 10):\n");
    out.push_str(&count_table("test", &v.test_frequency));
    out.push_str("\nAverage billing by test (top 10):\n");
    out.push_str(&value_table("test", &v.test_average_billing, fmt_inr));

    out.push_str("\nFeedback distribution:\n");
    out.push_str(&header(&format!("{:<16} {:>8}", "rating", "count")));
    for b in &v.feedback_histogram {
        push_line(
            &mut out,
            format!("{:<16} {:>8}", format!("{:.2}-{:.2}", b.lower, b.upper), b.count),
        );
    }
    out
}

pub fn format_overview(v: &OverviewView) -> String {
    let mut out = String::from("Hospital Overview\n");
    out.push_str(&format!("Total patients: {}\n", v.kpis.patients));
    out.push_str(&format!("Total revenue: {}\n", fmt_inr(v.kpis.total_revenue)));
    out.push_str(&format!(
        "Avg stay: {}\n",
        fmt_opt(v.kpis.avg_stay_days, |x| format!("{x:.1} days"))
    ));
    out.push_str(&format!(
        "Avg feedback: {}\n",
        fmt_opt(v.kpis.avg_feedback, |x| format!("{x:.2}/5"))
    ));

    out.push_str("\nRevenue by diagnosis:\n");
    out.push_str(&value_table("diagnosis", &v.revenue_by_diagnosis, fmt_inr));

    out.push_str("\nStay vs billing by diagnosis:\n");
    out.push_str(&header(&format!("{:<24} {:>6} {}", "diagnosis", "n", "trend")));
    for s in &v.stay_vs_billing_by_diagnosis {
        push_line(
            &mut out,
            format!(
                "{:<24} {:>6} {}",
                truncate(&s.diagnosis, 24),
                s.series.points.len(),
                fmt_trend(s.series.trend.as_ref())
            ),
        );
    }

    out.push_str("\nRevenue by insurance:\n");
    out.push_str(&value_table("insured", &v.revenue_by_insurance, fmt_inr));

    out.push_str("\nSummary:\n");
    match &v.summary {
        Some(s) => {
            out.push_str(&format!(
                "- {} patients generated total revenue of {}.\n",
                s.kpis.patients,
                fmt_inr(s.kpis.total_revenue)
            ));
            out.push_str(&format!(
                "- Average stay is {}, with average feedback of {}.\n",
                fmt_opt(s.kpis.avg_stay_days, |x| format!("{x:.1} days")),
                fmt_opt(s.kpis.avg_feedback, |x| format!("{x:.2}/5"))
            ));
            if let Some(top) = &s.top_diagnosis {
                out.push_str(&format!(
                    "- {} cases contribute the highest revenue ({}).\n",
                    top.name,
                    fmt_inr(top.value)
                ));
            }
            out.push_str(&format!(
                "- Insured patients account for {:.1}% of total billing.\n",
                s.insurance_share
            ));
        }
        None => out.push_str("No data available for selected filters.\n"),
    }
    out
}

/// Candidate filter values for `hdash options`.
pub fn format_options(options: &FilterOptions) -> String {
    let mut out = String::new();
    match &options.date_span {
        Some(span) => out.push_str(&format!("Admit dates: {} to {}\n", span.start, span.end)),
        None => out.push_str(&format!("Admit dates: {NOT_AVAILABLE}\n")),
    }
    for (label, values) in [
        ("Doctors", &options.doctors),
        ("Diagnoses", &options.diagnoses),
        ("Bed types", &options.bed_types),
    ] {
        out.push_str(&format!("\n{label} ({}):\n", values.len()));
        for v in values {
            out.push_str(&format!("  {v}\n"));
        }
    }
    out.trim_end().to_string()
}

fn count_table<K: Display>(key_label: &str, rows: &[CountRow<K>]) -> String {
    let mut out = header(&format!("{:<24} {:>8}", key_label, "count"));
    for r in rows {
        push_line(&mut out, format!("{:<24} {:>8}", truncate(&r.key.to_string(), 24), r.count));
    }
    out
}

fn value_table<K: Display>(
    key_label: &str,
    rows: &[ValueRow<K>],
    fmt_value: impl Fn(f64) -> String,
) -> String {
    let mut out = header(&format!("{:<24} {:>16}", key_label, "value"));
    for r in rows {
        push_line(
            &mut out,
            format!("{:<24} {:>16}", truncate(&r.key.to_string(), 24), fmt_value(r.value)),
        );
    }
    out
}

/// Column header plus a dashed underline matching each column's width.
fn header(line: &str) -> String {
    let underline: String = line
        .chars()
        .map(|c| if c == ' ' { ' ' } else { '-' })
        .collect();
    let mut out = String::new();
    push_line(&mut out, line.to_string());
    push_line(&mut out, underline);
    out
}

fn push_line(out: &mut String, line: String) {
    out.push_str(line.trim_end());
    out.push('\n');
}

fn fmt_opt<T>(v: Option<T>, f: impl Fn(T) -> String) -> String {
    v.map(f).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn fmt_leader<V>(leader: Option<&Leader<V>>, f: impl Fn(&V) -> String) -> String {
    fmt_opt(leader, |l| format!("{} ({})", l.name, f(&l.value)))
}

fn fmt_trend(trend: Option<&LinearTrend>) -> String {
    fmt_opt(trend, |t| {
        format!(
            "billing = {:.2} + {:.2} x stay (r2={:.3})",
            t.intercept, t.slope, t.r_squared
        )
    })
}

/// Whole rupees with comma thousands separators, e.g. `₹1,234,567`.
pub fn fmt_inr(v: f64) -> String {
    if !v.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let rounded = v.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}₹{grouped}")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
