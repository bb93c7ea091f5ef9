//! Ordinary least squares trend lines.
//!
//! The dashboard overlays a straight-line fit on stay-length vs billing
//! scatters:
//!
//! ```text
//! minimize Σ (y_i - (a + b x_i))^2
//! ```
//!
//! We build the `[1, x]` design matrix and solve it with SVD, which stays
//! well-behaved for tall matrices and nearly collinear inputs.

use nalgebra::{DMatrix, DVector};
use serde::Serialize;

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fitted line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination; 1.0 when `y` is constant.
    pub r_squared: f64,
    pub n: usize,
}

impl LinearTrend {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fit a trend line through `(x, y)` samples.
///
/// `None` with fewer than two finite samples or when every `x` is equal
/// (the slope is undefined).
pub fn fit_linear_trend(points: &[(f64, f64)]) -> Option<LinearTrend> {
    let points: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    let n = points.len();
    if n < 2 {
        return None;
    }

    let x0 = points[0].0;
    if points.iter().all(|(x, _)| (x - x0).abs() < 1e-12) {
        return None;
    }

    let mut design = DMatrix::zeros(n, 2);
    let mut y = DVector::zeros(n);
    for (i, &(xi, yi)) in points.iter().enumerate() {
        design[(i, 0)] = 1.0;
        design[(i, 1)] = xi;
        y[i] = yi;
    }

    let beta = solve_least_squares(&design, &y)?;
    let (intercept, slope) = (beta[0], beta[1]);

    let y_mean = y.mean();
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for &(xi, yi) in &points {
        let r = yi - (intercept + slope * xi);
        ss_res += r * r;
        ss_tot += (yi - y_mean) * (yi - y_mean);
    }
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 1.0 };

    Some(LinearTrend {
        slope,
        intercept,
        r_squared,
        n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn trend_recovers_exact_line() {
        let pts = [(1.0, 1500.0), (2.0, 2500.0), (4.0, 4500.0)];
        let t = fit_linear_trend(&pts).unwrap();
        assert!((t.slope - 1000.0).abs() < 1e-6);
        assert!((t.intercept - 500.0).abs() < 1e-6);
        assert!((t.r_squared - 1.0).abs() < 1e-9);
        assert_eq!(t.n, 3);
        assert!((t.predict(3.0) - 3500.0).abs() < 1e-6);
    }

    #[test]
    fn trend_on_noisy_points_matches_closed_form() {
        let pts = [(0.0, 1.0), (1.0, 3.0), (2.0, 2.0), (3.0, 5.0)];
        let t = fit_linear_trend(&pts).unwrap();
        // Closed form: slope = cov(x,y)/var(x) = 1.1, intercept = 2.75 - 1.1*1.5
        assert!((t.slope - 1.1).abs() < 1e-9);
        assert!((t.intercept - 1.1).abs() < 1e-9);
        assert!(t.r_squared > 0.0 && t.r_squared < 1.0);
    }

    #[test]
    fn degenerate_inputs_have_no_trend() {
        assert!(fit_linear_trend(&[]).is_none());
        assert!(fit_linear_trend(&[(1.0, 2.0)]).is_none());
        assert!(fit_linear_trend(&[(2.0, 1.0), (2.0, 5.0)]).is_none());
        assert!(fit_linear_trend(&[(f64::NAN, 1.0), (1.0, 1.0)]).is_none());
    }
}
