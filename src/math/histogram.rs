//! Equal-width histogram binning.

use serde::Serialize;

/// Default bucket count for rating distributions.
pub const DEFAULT_BINS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Bin `values` into `bins` equal-width buckets spanning the observed range.
///
/// Buckets are half-open `[lower, upper)` except the last, which also holds
/// the maximum. A single distinct value gets a unit-wide range centred on it.
/// Non-finite values are ignored; no finite values gives no bins.
pub fn histogram(values: impl IntoIterator<Item = f64>, bins: usize) -> Vec<HistogramBin> {
    let values: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    let bins = bins.max(1);

    let Some(min) = values.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let max = values.iter().copied().fold(min, f64::max);

    let (lower, upper) = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };
    let width = (upper - lower) / bins as f64;

    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: lower + width * i as f64,
            upper: if i + 1 == bins { upper } else { lower + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for v in values {
        let idx = (((v - lower) / width).floor() as usize).min(bins - 1);
        out[idx].count += 1;
    }

    out
}
