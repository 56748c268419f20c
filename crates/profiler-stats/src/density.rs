//! Gaussian kernel density estimation for smoothing timing distributions.

use std::f64::consts::PI;

use crate::moments::sum;

/// Bandwidth used when callers have no better estimate, in sample units.
pub const DEFAULT_BANDWIDTH: f64 = 2.0;

/// Density of the standard normal distribution at `x`.
///
/// # Examples
///
/// ```
/// use profiler_stats::standard_normal_density;
///
/// let peak = 1.0 / (2.0 * std::f64::consts::PI).sqrt();
/// assert_eq!(standard_normal_density(0.0), peak);
/// ```
pub fn standard_normal_density(x: f64) -> f64 {
    (1.0 / (2.0 * PI).sqrt()) * (-(x * x) / 2.0).exp()
}

/// Gaussian kernel density estimate of `sample` at `x` with bandwidth `h`.
///
/// `(1 / (n * h)) * Σ φ((x - xi) / h)`, where `φ` is the standard normal
/// density. An empty sample yields `NaN`.
pub fn kernel_density_estimate(sample: &[f64], x: f64, h: f64) -> f64 {
    let kernels: Vec<f64> = sample
        .iter()
        .map(|xi| standard_normal_density((x - xi) / h))
        .collect();
    (1.0 / (sample.len() as f64 * h)) * sum(&kernels)
}
