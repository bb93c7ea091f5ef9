//! Grouping and ranking utilities.
//!
//! Groups keep keys in first-encountered order. Rankings use a stable sort,
//! so equal metrics stay in that order too.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;

use crate::domain::Record;

/// A grouped-count table row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountRow<K> {
    pub key: K,
    pub count: usize,
}

/// A grouped numeric summary row (sum, mean, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueRow<K> {
    pub key: K,
    pub value: f64,
}

/// Headline "top" entry of a ranked table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leader<V> {
    pub name: String,
    pub value: V,
}

/// Records partitioned by key, in first-encountered key order.
#[derive(Debug, Clone)]
pub struct Groups<'a, K> {
    entries: Vec<(K, Vec<&'a Record>)>,
}

impl<'a, K> Groups<'a, K> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[&'a Record])> {
        self.entries.iter().map(|(k, rows)| (k, rows.as_slice()))
    }

    /// Reduce each group to a value, keeping key order.
    pub fn summarize<T>(self, mut f: impl FnMut(&[&'a Record]) -> T) -> Vec<(K, T)> {
        self.entries
            .into_iter()
            .map(|(k, rows)| {
                let v = f(&rows);
                (k, v)
            })
            .collect()
    }

    pub fn counts(self) -> Vec<CountRow<K>> {
        self.summarize(|rows| rows.len())
            .into_iter()
            .map(|(key, count)| CountRow { key, count })
            .collect()
    }

    /// Per-group mean of `field`; groups with no values are dropped.
    pub fn means(self, field: impl Fn(&Record) -> Option<f64>) -> Vec<ValueRow<K>> {
        self.summarize(|rows| mean(rows.iter().filter_map(|r| field(*r))))
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| ValueRow { key, value }))
            .collect()
    }

    /// Per-group sum of `field`; missing values contribute nothing.
    pub fn sums(self, field: impl Fn(&Record) -> Option<f64>) -> Vec<ValueRow<K>> {
        self.summarize(|rows| rows.iter().filter_map(|r| field(*r)).sum::<f64>())
            .into_iter()
            .map(|(key, value)| ValueRow { key, value })
            .collect()
    }
}

/// Group rows by `key`. Rows whose key is missing are left out.
pub fn group_by<'a, K, F>(rows: &[&'a Record], key: F) -> Groups<'a, K>
where
    K: Eq + Hash + Clone,
    F: Fn(&Record) -> Option<K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut entries: Vec<(K, Vec<&'a Record>)> = Vec::new();

    for &row in rows {
        let Some(k) = key(row) else { continue };
        match index.get(&k) {
            Some(&slot) => entries[slot].1.push(row),
            None => {
                index.insert(k.clone(), entries.len());
                entries.push((k, vec![row]));
            }
        }
    }

    Groups { entries }
}

/// Stable sort, largest metric first. NaN compares equal (keeps position).
pub fn rank_desc<T>(rows: &mut [T], metric: impl Fn(&T) -> f64) {
    rows.sort_by(|a, b| metric(b).partial_cmp(&metric(a)).unwrap_or(Ordering::Equal));
}

/// Keep the first `n` rows.
pub fn top_n<T>(mut rows: Vec<T>, n: usize) -> Vec<T> {
    rows.truncate(n);
    rows
}

pub fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Sum of billing amounts; rows without one contribute nothing.
pub fn total_billing(rows: &[&Record]) -> f64 {
    rows.iter().filter_map(|r| r.billing_amount).sum()
}

/// Leader of a ranked count table.
pub fn count_leader(table: &[CountRow<String>]) -> Option<Leader<usize>> {
    table.first().map(|row| Leader {
        name: row.key.clone(),
        value: row.count,
    })
}

/// Leader of a ranked value table.
pub fn value_leader(table: &[ValueRow<String>]) -> Option<Leader<f64>> {
    table.first().map(|row| Leader {
        name: row.key.clone(),
        value: row.value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(id: &str, doctor: Option<&str>, billing: Option<f64>) -> Record {
        let mut r = Record::new(id, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        r.doctor = doctor.map(str::to_string);
        r.billing_amount = billing;
        r
    }

    #[test]
    fn groups_keep_first_seen_order_and_skip_missing_keys() {
        let data = [
            rec("1", Some("B"), Some(1.0)),
            rec("2", Some("A"), Some(2.0)),
            rec("3", None, Some(3.0)),
            rec("4", Some("B"), None),
        ];
        let rows: Vec<&Record> = data.iter().collect();
        let groups = group_by(&rows, |r| r.doctor.clone());
        assert_eq!(groups.len(), 2);
        let keys: Vec<&String> = groups.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["B", "A"]);

        let sums = group_by(&rows, |r| r.doctor.clone()).sums(|r| r.billing_amount);
        assert_eq!(sums[0], ValueRow { key: "B".to_string(), value: 1.0 });

        let means = group_by(&rows, |r| r.doctor.clone()).means(|r| r.feedback);
        assert!(means.is_empty());
    }

    #[test]
    fn rank_is_stable_for_ties() {
        let mut rows = vec![
            ValueRow { key: "x", value: 1.0 },
            ValueRow { key: "y", value: 5.0 },
            ValueRow { key: "z", value: 1.0 },
            ValueRow { key: "w", value: 5.0 },
        ];
        rank_desc(&mut rows, |r| r.value);
        let keys: Vec<&str> = rows.iter().map(|r| r.key).collect();
        assert_eq!(keys, ["y", "w", "x", "z"]);
    }

    #[test]
    fn leaders_of_empty_tables_are_not_available() {
        assert!(count_leader(&[]).is_none());
        assert!(value_leader(&[]).is_none());
        assert_eq!(mean(std::iter::empty()), None);
        assert_eq!(top_n(vec![1, 2, 3], 2), vec![1, 2]);
        assert_eq!(total_billing(&[]), 0.0);
    }
}
