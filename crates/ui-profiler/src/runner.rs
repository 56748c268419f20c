//! Repeated, timed execution of a scenario
//!
//! This module drives a [`Scenario`] through its lifecycle `n` times, either
//! timing each `run()` ([`BenchmarkRunner::benchmark`]) or recording it with a
//! sampling profiler ([`BenchmarkRunner::profile`]).
//!
//! # Lifecycle
//!
//! ```text
//! Idle ─► SuiteSetup ─► ┌ RepeatSetup ─► Timing ─► RepeatCleanup ┐ ─► SuiteCleanup ─► Done
//!                       └──────────────── × n ───────────────────┘
//! ```
//!
//! Repeats run strictly one after another. Only failures of `run()` are
//! isolated: they are recorded and the next repeat starts. A failing setup or
//! cleanup hook aborts the whole invocation.
//!
//! # Example
//!
//! ```no_run
//! use ui_profiler::control::AbortSignal;
//! use ui_profiler::runner::BenchmarkRunner;
//! use ui_profiler::scenario::Scenario;
//!
//! # async fn example(scenario: &mut dyn Scenario) -> ui_profiler::Result<()> {
//! let runner = BenchmarkRunner::new();
//! let outcome = runner
//!     .benchmark(scenario, 5, false, &AbortSignal::new(), |_| {})
//!     .await?;
//! println!("{} samples, {} errors", outcome.times.len(), outcome.errors.len());
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::control::AbortSignal;
use crate::error::{LifecycleHook, ProfilerError, Result};
use crate::host::{Clock, MonotonicClock};
use crate::measurement::nan_from_null;
use crate::profiling::{ProfileScale, ProfilerOptions, ProfilerSession, ProfilerTrace, SamplingProfiler};
use crate::scenario::Scenario;

/// A `run()` failure captured during one repeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatError {
    /// Zero-based index of the failing repeat.
    pub repeat: usize,
    /// Error message including its context chain.
    pub message: String,
}

impl RepeatError {
    fn capture(repeat: usize, error: &anyhow::Error) -> Self {
        Self {
            repeat,
            message: format!("{:#}", error),
        }
    }
}

/// Elapsed times of the successful repeats.
///
/// `times.len() + errors.len()` equals the requested repeat count unless the
/// run was interrupted. Times and errors are not positionally aligned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingOutcome {
    /// Milliseconds per successful `run()`.
    pub times: Vec<f64>,
    pub errors: Vec<RepeatError>,
    #[serde(default)]
    pub interrupted: bool,
}

/// Traces recorded while profiling a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilingOutcome {
    pub traces: Vec<ProfilerTrace>,
    pub errors: Vec<RepeatError>,
    /// Sampling interval reported by the profiler (the requested one when no
    /// session was started).
    pub sampling_interval: f64,
    /// Mean distance between consecutive samples over all traces; `NaN`
    /// without at least two samples in some trace.
    #[serde(deserialize_with = "nan_from_null")]
    pub average_sample_interval: f64,
    #[serde(default)]
    pub interrupted: bool,
}

/// Outcome of one repeat, before it is filed as a time or an error.
enum RepeatResult {
    Completed(f64),
    Failed(RepeatError),
}

/// The benchmark runner
///
/// Owns nothing but its clock; each invocation owns its result vectors.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkRunner<C: Clock = MonotonicClock> {
    clock: C,
}

impl BenchmarkRunner<MonotonicClock> {
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }
}

impl<C: Clock> BenchmarkRunner<C> {
    /// Create a runner measuring time with a host-supplied clock.
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Time `n` repeats of the scenario.
    ///
    /// # Arguments
    ///
    /// * `scenario` - The scenario to run; borrowed for the invocation
    /// * `n` - Number of repeats
    /// * `in_suite` - When true, the caller manages `setup_suite`/`cleanup_suite`
    /// * `abort` - Polled after each completed repeat
    /// * `on_step` - Called with the repeat index after each completed repeat
    ///
    /// # Errors
    ///
    /// Returns [`ProfilerError::Lifecycle`] if any hook other than `run` fails.
    #[instrument(skip(self, scenario, abort, on_step), fields(scenario = %scenario.id()))]
    pub async fn benchmark<S, F>(
        &self,
        scenario: &mut S,
        n: usize,
        in_suite: bool,
        abort: &AbortSignal,
        mut on_step: F,
    ) -> Result<TimingOutcome>
    where
        S: Scenario + ?Sized,
        F: FnMut(usize),
    {
        if !in_suite {
            setup_suite(scenario).await?;
        }

        let mut outcome = TimingOutcome::default();
        for i in 0..n {
            scenario
                .setup()
                .await
                .map_err(ProfilerError::lifecycle(LifecycleHook::Setup))?;

            match self.timed_run(scenario, i).await {
                RepeatResult::Completed(elapsed) => outcome.times.push(elapsed),
                RepeatResult::Failed(error) => outcome.errors.push(error),
            }

            scenario
                .cleanup()
                .await
                .map_err(ProfilerError::lifecycle(LifecycleHook::Cleanup))?;

            on_step(i);
            if abort.is_aborted() && i + 1 < n {
                info!("Benchmark interrupted after {} of {} repeats", i + 1, n);
                outcome.interrupted = true;
                break;
            }
        }

        if !in_suite {
            cleanup_suite(scenario).await?;
        }

        debug!(
            "Collected {} times and {} errors",
            outcome.times.len(),
            outcome.errors.len()
        );
        Ok(outcome)
    }

    /// Record `n` repeats of the scenario with a sampling profiler.
    ///
    /// In [`ProfileScale::Micro`] a fresh session wraps each `run()` and one
    /// trace is kept per successful repeat. In [`ProfileScale::Macro`] one
    /// session spans all repeats and yields exactly one trace.
    ///
    /// # Errors
    ///
    /// * [`ProfilerError::ProfilerUnavailable`] if `profiler` is `None`
    /// * [`ProfilerError::Profiler`] if a session fails to start or stop
    /// * [`ProfilerError::Lifecycle`] if any hook other than `run` fails
    #[instrument(skip(self, scenario, profiler, abort, on_step), fields(scenario = %scenario.id()))]
    #[allow(clippy::too_many_arguments)]
    pub async fn profile<S, F>(
        &self,
        scenario: &mut S,
        profiler: Option<&dyn SamplingProfiler>,
        options: &ProfilerOptions,
        scale: ProfileScale,
        n: usize,
        in_suite: bool,
        abort: &AbortSignal,
        mut on_step: F,
    ) -> Result<ProfilingOutcome>
    where
        S: Scenario + ?Sized,
        F: FnMut(usize),
    {
        let profiler = profiler.ok_or(ProfilerError::ProfilerUnavailable)?;

        if !in_suite {
            setup_suite(scenario).await?;
        }

        let mut traces = Vec::new();
        let mut errors = Vec::new();
        let mut interrupted = false;
        let mut sampling_interval = options.sample_interval;

        match scale {
            ProfileScale::Micro => {
                for i in 0..n {
                    scenario
                        .setup()
                        .await
                        .map_err(ProfilerError::lifecycle(LifecycleHook::Setup))?;

                    let mut session = start_session(profiler, options).await?;
                    sampling_interval = session.sample_interval();
                    let result = self.timed_run(scenario, i).await;
                    let trace = stop_session(session.as_mut()).await?;
                    match result {
                        RepeatResult::Completed(_) => traces.push(trace),
                        RepeatResult::Failed(error) => errors.push(error),
                    }

                    scenario
                        .cleanup()
                        .await
                        .map_err(ProfilerError::lifecycle(LifecycleHook::Cleanup))?;

                    on_step(i);
                    if abort.is_aborted() && i + 1 < n {
                        info!("Profiling interrupted after {} of {} repeats", i + 1, n);
                        interrupted = true;
                        break;
                    }
                }
            }
            ProfileScale::Macro => {
                let mut session = start_session(profiler, options).await?;
                sampling_interval = session.sample_interval();
                for i in 0..n {
                    scenario
                        .setup()
                        .await
                        .map_err(ProfilerError::lifecycle(LifecycleHook::Setup))?;

                    if let RepeatResult::Failed(error) = self.timed_run(scenario, i).await {
                        errors.push(error);
                    }

                    scenario
                        .cleanup()
                        .await
                        .map_err(ProfilerError::lifecycle(LifecycleHook::Cleanup))?;

                    on_step(i);
                    if abort.is_aborted() && i + 1 < n {
                        info!("Profiling interrupted after {} of {} repeats", i + 1, n);
                        interrupted = true;
                        break;
                    }
                }
                traces.push(stop_session(session.as_mut()).await?);
            }
        }

        if !in_suite {
            cleanup_suite(scenario).await?;
        }

        let intervals: Vec<f64> = traces
            .iter()
            .flat_map(ProfilerTrace::sample_intervals)
            .collect();
        let average_sample_interval = profiler_stats::mean(&intervals);
        debug!(
            "Collected {} traces, average sample interval {:.3}ms (requested {}ms)",
            traces.len(),
            average_sample_interval,
            sampling_interval
        );

        Ok(ProfilingOutcome {
            traces,
            errors,
            sampling_interval,
            average_sample_interval,
            interrupted,
        })
    }

    /// Run the scenario once, timing it and isolating its failure.
    async fn timed_run<S: Scenario + ?Sized>(&self, scenario: &mut S, repeat: usize) -> RepeatResult {
        let start = self.clock.now();
        match scenario.run().await {
            Ok(()) => {
                let elapsed = self.clock.now() - start;
                debug!("Repeat {} took {:.2}ms", repeat, elapsed);
                RepeatResult::Completed(elapsed)
            }
            Err(e) => {
                warn!("Repeat {} failed: {:#}", repeat, e);
                RepeatResult::Failed(RepeatError::capture(repeat, &e))
            }
        }
    }
}

pub(crate) async fn setup_suite<S: Scenario + ?Sized>(scenario: &mut S) -> Result<()> {
    debug!("Setting up suite for '{}'", scenario.name());
    scenario
        .setup_suite()
        .await
        .map_err(ProfilerError::lifecycle(LifecycleHook::SetupSuite))
}

pub(crate) async fn cleanup_suite<S: Scenario + ?Sized>(scenario: &mut S) -> Result<()> {
    debug!("Cleaning up suite for '{}'", scenario.name());
    scenario
        .cleanup_suite()
        .await
        .map_err(ProfilerError::lifecycle(LifecycleHook::CleanupSuite))
}

async fn start_session(
    profiler: &dyn SamplingProfiler,
    options: &ProfilerOptions,
) -> Result<Box<dyn ProfilerSession>> {
    profiler.start(options).await.map_err(ProfilerError::Profiler)
}

async fn stop_session(session: &mut dyn ProfilerSession) -> Result<ProfilerTrace> {
    session.stop().await.map_err(ProfilerError::Profiler)
}
