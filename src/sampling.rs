//! Uniform sampling helpers shared by the orbit and basis modules

use ndarray::Array1;
use std::f64::consts::TAU;

/// `n` mean anomalies covering one full revolution, both ends included
///
/// Including 2π closes the drawn curve, which is how a year is sampled
/// for the analemma (`months * samples_per_month + 1` points).
pub fn mean_anomalies(n: usize) -> Array1<f64> {
    Array1::linspace(0.0, TAU, n)
}

/// `n` points from `start` (included) to `end` (excluded)
pub fn half_open(start: f64, end: f64, n: usize) -> Array1<f64> {
    if n == 0 {
        return Array1::zeros(0);
    }
    let step = (end - start) / n as f64;
    Array1::from_shape_fn(n, |i| start + step * i as f64)
}

/// Numerical derivative of uniformly spaced samples
///
/// Second-order central differences in the interior and first-order
/// one-sided differences at both ends. NaN samples propagate to their
/// neighbours.
pub fn gradient(values: &Array1<f64>, spacing: f64) -> Array1<f64> {
    let n = values.len();
    let mut out = Array1::zeros(n);
    if n < 2 {
        return out;
    }
    out[0] = (values[1] - values[0]) / spacing;
    out[n - 1] = (values[n - 1] - values[n - 2]) / spacing;
    for i in 1..n - 1 {
        out[i] = (values[i + 1] - values[i - 1]) / (2.0 * spacing);
    }
    out
}
