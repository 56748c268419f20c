//! Sums, means and dispersion of timing samples.

/// Sum of all samples, accumulated left to right.
///
/// Returns `0.0` for an empty slice.
///
/// # Examples
///
/// ```
/// use profiler_stats::sum;
///
/// assert_eq!(sum(&[]), 0.0);
/// assert_eq!(sum(&[1.0, 2.0, 3.0]), 6.0);
/// ```
pub fn sum(samples: &[f64]) -> f64 {
    samples.iter().copied().reduce(|a, b| a + b).unwrap_or(0.0)
}

/// Arithmetic mean.
///
/// Returns `NaN` for an empty slice, which keeps "no data" distinct from a
/// non-empty slice summing to zero.
///
/// # Examples
///
/// ```
/// use profiler_stats::mean;
///
/// assert!(mean(&[]).is_nan());
/// assert_eq!(mean(&[0.0, -10.0]), -5.0);
/// ```
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return f64::NAN;
    }
    sum(samples) / samples.len() as f64
}

/// Corrected sample standard deviation (divides by `n - 1`).
///
/// Returns `NaN` for an empty slice. A single sample also yields `NaN`, since
/// its squared deviation sum `0.0` is divided by `0`.
pub fn standard_deviation(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return f64::NAN;
    }
    let m = mean(samples);
    let squared: Vec<f64> = samples.iter().map(|x| (x - m).powi(2)).collect();
    (sum(&squared) / (samples.len() - 1) as f64).sqrt()
}

/// Standard error of the mean: `standard_deviation / sqrt(n)`.
pub fn standard_error(samples: &[f64]) -> f64 {
    standard_deviation(samples) / (samples.len() as f64).sqrt()
}

/// Round to `precision` decimal places.
///
/// Halves round towards positive infinity (`round(-2.5, 0) == -2.0`), and
/// `NaN` passes through unchanged.
///
/// # Examples
///
/// ```
/// use profiler_stats::round;
///
/// assert_eq!(round(0.75, 1), 0.8);
/// assert_eq!(round(1.0 / 6.0, 3), 0.167);
/// assert!(round(f64::NAN, 2).is_nan());
/// ```
pub fn round(value: f64, precision: i32) -> f64 {
    let factor = 10f64.powi(precision);
    round_half_up(value * factor) / factor
}

fn round_half_up(x: f64) -> f64 {
    let floor = x.floor();
    if x - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_empty() {
        assert_eq!(sum(&[]), 0.0);
    }

    #[test]
    fn test_sum() {
        assert_eq!(sum(&[1.0, 2.0, 3.0]), 6.0);
        assert_eq!(sum(&[1.0]), 1.0);
        assert_eq!(sum(&[0.0, -10.0]), -10.0);
    }

    #[test]
    fn test_mean_empty_is_nan() {
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(mean(&[1.0]), 1.0);
        assert_eq!(mean(&[0.0, -10.0]), -5.0);
    }

    #[test]
    fn test_mean_zero_sum_is_not_nan() {
        assert_eq!(mean(&[-1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_standard_deviation() {
        assert_eq!(round(standard_deviation(&[1.0, 2.0, 3.0, 4.0]), 1), 1.3);
        assert_eq!(round(standard_deviation(&[1.0, 2.0, 3.0]), 1), 1.0);
    }

    #[test]
    fn test_standard_deviation_degenerate() {
        assert!(standard_deviation(&[]).is_nan());
        assert!(standard_deviation(&[42.0]).is_nan());
    }

    #[test]
    fn test_standard_deviation_known_values() {
        // Squared deviations sum to 32 over 7 degrees of freedom
        let samples = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let expected = (32.0_f64 / 7.0).sqrt();
        assert!((standard_deviation(&samples) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_standard_error() {
        let samples = vec![1.0, 2.0, 3.0, 4.0];
        let expected = standard_deviation(&samples) / 2.0;
        assert_eq!(standard_error(&samples), expected);
        assert!(standard_error(&[]).is_nan());
    }

    #[test]
    fn test_round_nan() {
        assert!(round(f64::NAN, 0).is_nan());
        assert!(round(f64::NAN, 3).is_nan());
    }

    #[test]
    fn test_round_precision() {
        assert_eq!(round(3.0 / 4.0, 1), 0.8);
        assert_eq!(round(3.0 / 4.0, 2), 0.75);
        assert_eq!(round(1.0 / 6.0, 1), 0.2);
        assert_eq!(round(1.0 / 6.0, 2), 0.17);
        assert_eq!(round(1.0 / 6.0, 3), 0.167);
    }

    #[test]
    fn test_round_halves_towards_positive_infinity() {
        assert_eq!(round(2.5, 0), 3.0);
        assert_eq!(round(-2.5, 0), -2.0);
        assert_eq!(round(-2.6, 0), -3.0);
    }

    #[test]
    fn test_round_infinity_passes_through() {
        assert_eq!(round(f64::INFINITY, 1), f64::INFINITY);
    }
}
