//! Self-profiling benchmark built on the host's sampling profiler.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use super::{parse_options, repeats_or_default, Benchmark, RunContext};
use crate::error::{ProfilerError, Result};
use crate::measurement::{Outcome, ProfileMeasurement, ProfileReport};
use crate::profiling::{ProfileScale, ProfilerOptions, SamplingProfiler};
use crate::runner::{cleanup_suite, setup_suite};
use crate::scenario::Scenario;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfProfileOptions {
    /// Number of profiled repeats (default: 3)
    #[serde(default)]
    pub repeats: Option<usize>,
    /// Requested sampling interval in milliseconds (default: 10)
    #[serde(default)]
    pub sample_interval: Option<f64>,
    /// Maximum samples per session (default: 10000)
    #[serde(default)]
    pub max_buffer_size: Option<usize>,
    #[serde(default)]
    pub scale: ProfileScale,
}

impl SelfProfileOptions {
    pub fn profiler_options(&self) -> ProfilerOptions {
        let defaults = ProfilerOptions::default();
        ProfilerOptions {
            sample_interval: self.sample_interval.unwrap_or(defaults.sample_interval),
            max_buffer_size: self.max_buffer_size.unwrap_or(defaults.max_buffer_size),
        }
    }
}

/// Records the scenario with a sampling profiler.
#[derive(Clone, Default)]
pub struct SelfProfileBenchmark {
    profiler: Option<Arc<dyn SamplingProfiler>>,
}

impl SelfProfileBenchmark {
    /// `None` when the host has no sampling profiler; the benchmark then
    /// reports itself unavailable and refuses to run.
    pub fn new(profiler: Option<Arc<dyn SamplingProfiler>>) -> Self {
        Self { profiler }
    }
}

#[async_trait]
impl Benchmark for SelfProfileBenchmark {
    fn id(&self) -> &str {
        "self-profile"
    }

    fn name(&self) -> &str {
        "Profile JavaScript"
    }

    fn is_available(&self) -> bool {
        self.profiler.is_some()
    }

    #[instrument(skip_all, fields(scenario = %scenario.id()))]
    async fn run(
        &self,
        scenario: &mut dyn Scenario,
        options: &Value,
        context: &RunContext,
    ) -> Result<Outcome> {
        let options: SelfProfileOptions = parse_options(options)?;
        let profiler = self
            .profiler
            .as_deref()
            .ok_or(ProfilerError::ProfilerUnavailable)?;
        let n = repeats_or_default(options.repeats);
        let runner = context.runner();
        let start = context.clock.now();

        setup_suite(scenario).await?;
        context.layout.layout_ready().await;
        let outcome = runner
            .profile(
                scenario,
                Some(profiler),
                &options.profiler_options(),
                options.scale,
                n,
                true,
                &context.abort,
                |i| context.progress.step(i + 1, n),
            )
            .await?;
        context.layout.layout_ready().await;
        cleanup_suite(scenario).await?;

        info!(
            "Recorded {} traces of '{}' ({} failed repeats)",
            outcome.traces.len(),
            scenario.name(),
            outcome.errors.len()
        );
        let interrupted = outcome.interrupted;
        Ok(Outcome::Profile(ProfileReport {
            results: vec![ProfileMeasurement::from(outcome)],
            total_time: context.clock.now() - start,
            interrupted,
        }))
    }
}
