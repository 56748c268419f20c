//! Order statistics for benchmark results.
//!
//! This module provides the minimum, CDF-based percentiles and quartiles, the
//! interquartile mean, and a combined [`Summary`] of a sample.

use std::cmp::Ordering;

use crate::moments::{mean, standard_deviation, standard_error, sum};

/// Tolerance within which `n * p` counts as an integer rank.
const RANK_EPSILON: f64 = 1e-4;

/// Sort a private copy of the samples in ascending order.
fn sorted_copy(samples: &[f64]) -> Vec<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

/// Smallest sample.
///
/// Returns `f64::INFINITY` for an empty slice (the identity of `min`), and
/// `NaN` if any sample is `NaN`.
///
/// # Examples
///
/// ```
/// use profiler_stats::min;
///
/// assert_eq!(min(&[3.0, 1.0, 2.0]), 1.0);
/// assert_eq!(min(&[]), f64::INFINITY);
/// ```
pub fn min(samples: &[f64]) -> f64 {
    samples.iter().fold(f64::INFINITY, |acc, &x| {
        if acc.is_nan() || x.is_nan() {
            f64::NAN
        } else {
            acc.min(x)
        }
    })
}

/// CDF-based percentile (method four in Langford, "Quartiles in Elementary
/// Statistics", JSE 14(3)).
///
/// With `np = n * p`: when `np` is an integer (within `1e-4`), the result is
/// the mean of the 1-based order statistics `ceil(np)` and `floor(np + 1)`;
/// otherwise it is the order statistic `ceil(np)`.
///
/// # Arguments
///
/// * `samples` - Slice of samples (a sorted copy is made internally)
/// * `p` - Percentile as a fraction in `[0, 1]`
///
/// # Returns
///
/// `NaN` for empty input or a `NaN` fraction. A rank that falls outside the
/// sample (rank `0` at `p = 0`, rank `n + 1` at `p = 1`) reads as `NaN` as
/// well.
///
/// # Examples
///
/// ```
/// use profiler_stats::percentile;
///
/// let data = vec![41.0, 7.0, 39.0, 15.0, 40.0, 36.0];
/// assert_eq!(percentile(&data, 0.5), 37.5);
/// assert_eq!(percentile(&data, 0.25), 15.0);
/// ```
pub fn percentile(samples: &[f64], p: f64) -> f64 {
    if samples.is_empty() {
        return f64::NAN;
    }
    let sorted = sorted_copy(samples);
    let np = sorted.len() as f64 * p;
    let at_rank = |rank: f64| -> f64 {
        if rank.is_nan() || rank < 1.0 {
            return f64::NAN;
        }
        sorted.get(rank as usize - 1).copied().unwrap_or(f64::NAN)
    };

    if (np - np.round()).abs() < RANK_EPSILON {
        (at_rank(np.ceil()) + at_rank((np + 1.0).floor())) / 2.0
    } else {
        at_rank(np.ceil())
    }
}

/// One of the three quartile boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quartile {
    /// 25th percentile
    First = 1,
    /// Median
    Second = 2,
    /// 75th percentile
    Third = 3,
}

impl Quartile {
    /// Fraction of the distribution below this quartile.
    pub fn fraction(self) -> f64 {
        0.25 * self as u8 as f64
    }
}

/// Quartile of the samples, `percentile(samples, 0.25 * q)`.
///
/// The result does not depend on the order of the samples, nor does it change
/// when every sample is repeated the same number of times.
///
/// # Examples
///
/// ```
/// use profiler_stats::{quartile, Quartile};
///
/// let data = vec![6.0, 7.0, 15.0, 36.0, 39.0, 40.0, 41.0, 42.0, 43.0, 47.0, 49.0];
/// assert_eq!(quartile(&data, Quartile::First), 15.0);
/// assert_eq!(quartile(&data, Quartile::Second), 40.0);
/// assert_eq!(quartile(&data, Quartile::Third), 43.0);
/// ```
pub fn quartile(samples: &[f64], q: Quartile) -> f64 {
    percentile(samples, q.fraction())
}

/// Interquartile mean: the mean of the middle half of the sorted samples.
///
/// When the length is a multiple of four the lowest and highest quarters are
/// dropped exactly. Otherwise the window is `n / 2` samples wide and the two
/// boundary samples contribute the fraction of themselves that falls inside
/// it. A single sample is its own interquartile mean; an empty slice yields
/// `NaN`.
///
/// The single-sample case is special-cased on purpose: the boundary weighting
/// alone would count that sample 0.75 twice over a window of 0.5 and return
/// three times its value.
///
/// # Examples
///
/// ```
/// use profiler_stats::inter_quartile_mean;
///
/// assert_eq!(inter_quartile_mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0);
/// assert_eq!(inter_quartile_mean(&[0.0, 5.0, 1000.0]), 170.0);
/// ```
pub fn inter_quartile_mean(samples: &[f64]) -> f64 {
    let sorted = sorted_copy(samples);
    let n = sorted.len();
    let q = n / 4;

    if n % 4 == 0 {
        return mean(&sorted[q..n - q]);
    }
    if n == 1 {
        return sorted[0];
    }

    let span = (n as f64 / 4.0) * 2.0;
    let middle = &sorted[q..n - q];
    let full = middle.len() - 2;
    let fraction = (span - full as f64) / 2.0;

    let mut total = sum(&middle[1..middle.len() - 1]);
    total += middle[0] * fraction;
    total += middle[middle.len() - 1] * fraction;
    total / span
}

/// Summary statistics of a sample in one pass.
///
/// Provides min, max, quartiles, mean, interquartile mean, standard deviation
/// and standard error.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
    /// Interquartile mean
    pub iqm: f64,
    pub std_dev: f64,
    pub std_err: f64,
    pub count: usize,
}

impl Summary {
    /// Compute summary statistics from samples.
    ///
    /// # Returns
    ///
    /// * `Some(summary)` - Statistical summary
    /// * `None` - If samples is empty
    ///
    /// # Examples
    ///
    /// ```
    /// use profiler_stats::Summary;
    ///
    /// let data = vec![5.0, 8.0, 4.0, 38.0, 8.0, 6.0, 9.0, 7.0, 7.0, 3.0, 1.0, 6.0];
    /// let summary = Summary::from_samples(&data).unwrap();
    /// assert_eq!(summary.count, 12);
    /// assert_eq!(summary.iqm, 6.5);
    /// assert_eq!(summary.max, 38.0);
    /// ```
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let sorted = sorted_copy(samples);

        Some(Summary {
            min: min(&sorted),
            q1: quartile(&sorted, Quartile::First),
            median: quartile(&sorted, Quartile::Second),
            q3: quartile(&sorted, Quartile::Third),
            max: sorted[sorted.len() - 1],
            mean: mean(&sorted),
            iqm: inter_quartile_mean(&sorted),
            std_dev: standard_deviation(&sorted),
            std_err: standard_error(&sorted),
            count: sorted.len(),
        })
    }

    /// Width of the box between the first and third quartile.
    pub fn interquartile_range(&self) -> f64 {
        self.q3 - self.q1
    }
}
