//! Lab test and feedback distribution tables.

use serde::Serialize;

use super::group::{
    CountRow, Leader, ValueRow, count_leader, group_by, mean, rank_desc, top_n, value_leader,
};
use crate::domain::Record;
use crate::math::{DEFAULT_BINS, HistogramBin, histogram};

/// Rows kept in the test rankings.
pub const TOP_TESTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticsView {
    pub test_frequency: Vec<CountRow<String>>,
    pub most_frequent_test: Option<Leader<usize>>,
    pub test_average_billing: Vec<ValueRow<String>>,
    pub costliest_test: Option<Leader<f64>>,
    pub feedback_histogram: Vec<HistogramBin>,
    pub avg_feedback: Option<f64>,
}

/// The ten most frequently ordered tests.
pub fn test_frequency(rows: &[&Record]) -> Vec<CountRow<String>> {
    let mut table = group_by(rows, |r| r.test.clone()).counts();
    rank_desc(&mut table, |row| row.count as f64);
    top_n(table, TOP_TESTS)
}

/// The ten tests with the highest mean billing.
pub fn test_average_billing(rows: &[&Record]) -> Vec<ValueRow<String>> {
    let mut table = group_by(rows, |r| r.test.clone()).means(|r| r.billing_amount);
    rank_desc(&mut table, |row| row.value);
    top_n(table, TOP_TESTS)
}

/// Distribution of feedback ratings over ten equal-width bins.
pub fn feedback_histogram(rows: &[&Record]) -> Vec<HistogramBin> {
    histogram(rows.iter().filter_map(|r| r.feedback), DEFAULT_BINS)
}

pub fn avg_feedback(rows: &[&Record]) -> Option<f64> {
    mean(rows.iter().filter_map(|r| r.feedback))
}

pub fn diagnostics_view(rows: &[&Record]) -> DiagnosticsView {
    let test_frequency = test_frequency(rows);
    let test_average_billing = test_average_billing(rows);

    DiagnosticsView {
        most_frequent_test: count_leader(&test_frequency),
        costliest_test: value_leader(&test_average_billing),
        test_frequency,
        test_average_billing,
        feedback_histogram: feedback_histogram(rows),
        avg_feedback: avg_feedback(rows),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(test: &str, billing: f64, feedback: Option<f64>) -> Record {
        let mut r = Record::new("P", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        r.test = Some(test.to_string());
        r.billing_amount = Some(billing);
        r.feedback = feedback;
        r
    }

    #[test]
    fn test_rankings_keep_top_ten() {
        let mut data = Vec::new();
        for i in 0..12 {
            for _ in 0..=i {
                data.push(rec(&format!("T{i}"), 100.0 * i as f64, None));
            }
        }
        let rows: Vec<&Record> = data.iter().collect();

        let freq = test_frequency(&rows);
        assert_eq!(freq.len(), TOP_TESTS);
        assert_eq!(freq[0], CountRow { key: "T11".to_string(), count: 12 });
        assert!(freq.windows(2).all(|w| w[0].count >= w[1].count));

        let billing = test_average_billing(&rows);
        assert_eq!(billing.len(), TOP_TESTS);
        assert_eq!(billing[0].key, "T11");
        assert_eq!(billing[9].key, "T2");
    }

    #[test]
    fn feedback_kpis_ignore_missing_ratings() {
        let data = [
            rec("X-Ray", 1.0, Some(2.0)),
            rec("X-Ray", 1.0, None),
            rec("CT Scan", 1.0, Some(4.0)),
        ];
        let rows: Vec<&Record> = data.iter().collect();
        let view = diagnostics_view(&rows);
        assert_eq!(view.avg_feedback, Some(3.0));
        assert_eq!(view.feedback_histogram.len(), DEFAULT_BINS);
        assert_eq!(view.feedback_histogram.iter().map(|b| b.count).sum::<usize>(), 2);
        assert_eq!(view.most_frequent_test.map(|l| l.name), Some("X-Ray".to_string()));
    }

    #[test]
    fn empty_input_has_no_bins_or_leaders() {
        let view = diagnostics_view(&[]);
        assert!(view.test_frequency.is_empty());
        assert!(view.test_average_billing.is_empty());
        assert!(view.feedback_histogram.is_empty());
        assert_eq!(view.avg_feedback, None);
        assert_eq!(view.most_frequent_test, None);
        assert_eq!(view.costliest_test, None);
    }
}
