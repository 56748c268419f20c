//! Statistics over benchmark timing samples
//!
//! Pure functions over `f64` sample slices: order statistics (min, CDF-based
//! percentiles and quartiles, interquartile mean), moments (sum, mean, sample
//! standard deviation, standard error), rounding, and a Gaussian kernel
//! density estimate used to smooth timing distributions for display.
//!
//! None of the functions mutate their input. Functions that need ordered data
//! sort a private copy.
//!
//! Degenerate input is not an error: empty samples yield `NaN` from most
//! reducers, `0.0` from [`sum`] and `+∞` from [`min`].
//!
//! # Examples
//!
//! ```
//! use profiler_stats::{inter_quartile_mean, quartile, round, Quartile};
//!
//! let times = vec![7.0, 15.0, 36.0, 39.0, 40.0, 41.0];
//! assert_eq!(quartile(&times, Quartile::Second), 37.5);
//! assert_eq!(round(inter_quartile_mean(&times), 1), 34.2);
//! ```

pub mod density;
pub mod moments;
pub mod percentiles;

// Re-export main types and functions
pub use density::{kernel_density_estimate, standard_normal_density, DEFAULT_BANDWIDTH};
pub use moments::{mean, round, standard_deviation, standard_error, sum};
pub use percentiles::{inter_quartile_mean, min, percentile, quartile, Quartile, Summary};
