//! Benchmark kinds
//!
//! A benchmark kind decides what is measured around a scenario: plain
//! execution time, sampling-profiler traces, or timings with parts of the
//! host isolated. All kinds share the controller in [`crate::runner`].
//!
//! | id               | outcome  | needs                      |
//! |------------------|----------|----------------------------|
//! | `execution-time` | timing   | -                          |
//! | `self-profile`   | profile  | a [`SamplingProfiler`]     |
//! | `isolation`      | timing   | an [`IsolationSource`]     |
//!
//! [`SamplingProfiler`]: crate::profiling::SamplingProfiler
//! [`IsolationSource`]: isolation::IsolationSource

pub mod execution;
pub mod isolation;
pub mod self_profile;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::control::{AbortSignal, ProgressReporter};
use crate::error::Result;
use crate::host::{Clock, LayoutSignal, MonotonicClock, YieldLayout};
use crate::measurement::Outcome;
use crate::runner::BenchmarkRunner;
use crate::scenario::Scenario;

pub use execution::{ExecutionTimeBenchmark, ExecutionTimeOptions};
pub use isolation::{Grouping, IsolationBenchmark, IsolationOptions, IsolationSource, IsolationTarget};
pub use self_profile::{SelfProfileBenchmark, SelfProfileOptions};

/// Repeats used when options leave them unset or zero.
pub const DEFAULT_REPEATS: usize = 3;

/// Host services shared by every benchmark run.
#[derive(Clone)]
pub struct RunContext {
    pub abort: AbortSignal,
    pub progress: ProgressReporter,
    pub clock: Arc<dyn Clock>,
    pub layout: Arc<dyn LayoutSignal>,
}

impl RunContext {
    pub fn new(clock: Arc<dyn Clock>, layout: Arc<dyn LayoutSignal>) -> Self {
        Self {
            abort: AbortSignal::new(),
            progress: ProgressReporter::new(),
            clock,
            layout,
        }
    }

    pub(crate) fn runner(&self) -> BenchmarkRunner<Arc<dyn Clock>> {
        BenchmarkRunner::with_clock(self.clock.clone())
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new(Arc::new(MonotonicClock::new()), Arc::new(YieldLayout))
    }
}

#[async_trait]
pub trait Benchmark: Send + Sync {
    /// Unique identifier, e.g. `execution-time`.
    fn id(&self) -> &str;

    /// Name displayed to users.
    fn name(&self) -> &str;

    /// Whether the host provides what this benchmark needs.
    fn is_available(&self) -> bool {
        true
    }

    async fn run(&self, scenario: &mut dyn Scenario, options: &Value, context: &RunContext)
        -> Result<Outcome>;
}

/// Deserialize benchmark options; `null` means all defaults.
pub(crate) fn parse_options<T>(options: &Value) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if options.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(options.clone())?)
}

/// Treat a missing or zero repeat count as the default.
pub(crate) fn repeats_or_default(repeats: Option<usize>) -> usize {
    repeats.filter(|&n| n > 0).unwrap_or(DEFAULT_REPEATS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_options_null_is_default() {
        let options: ExecutionTimeOptions = parse_options(&Value::Null).unwrap();
        assert_eq!(options.repeats, None);
    }

    #[test]
    fn test_parse_options_rejects_wrong_types() {
        let result: Result<ExecutionTimeOptions> = parse_options(&json!({"repeats": "many"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_repeats_or_default() {
        assert_eq!(repeats_or_default(None), DEFAULT_REPEATS);
        assert_eq!(repeats_or_default(Some(0)), DEFAULT_REPEATS);
        assert_eq!(repeats_or_default(Some(7)), 7);
    }
}
