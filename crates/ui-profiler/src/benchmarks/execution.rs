//! Plain execution-time benchmark.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use super::{parse_options, repeats_or_default, Benchmark, RunContext};
use crate::error::Result;
use crate::measurement::{Outcome, TimeMeasurement, TimingReport};
use crate::runner::{cleanup_suite, setup_suite};
use crate::scenario::Scenario;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionTimeOptions {
    /// Number of timed repeats (default: 3)
    #[serde(default)]
    pub repeats: Option<usize>,
}

/// Times `n` repeats of the scenario with nothing else changed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionTimeBenchmark;

#[async_trait]
impl Benchmark for ExecutionTimeBenchmark {
    fn id(&self) -> &str {
        "execution-time"
    }

    fn name(&self) -> &str {
        "Execution Time"
    }

    #[instrument(skip_all, fields(scenario = %scenario.id()))]
    async fn run(
        &self,
        scenario: &mut dyn Scenario,
        options: &Value,
        context: &RunContext,
    ) -> Result<Outcome> {
        let options: ExecutionTimeOptions = parse_options(options)?;
        let n = repeats_or_default(options.repeats);
        let runner = context.runner();
        let start = context.clock.now();

        setup_suite(scenario).await?;
        context.layout.layout_ready().await;
        let outcome = runner
            .benchmark(scenario, n, true, &context.abort, |i| {
                context.progress.step(i + 1, n)
            })
            .await?;
        context.layout.layout_ready().await;
        cleanup_suite(scenario).await?;

        info!(
            "Timed {} repeats of '{}' ({} failed)",
            outcome.times.len(),
            scenario.name(),
            outcome.errors.len()
        );
        let interrupted = outcome.interrupted;
        Ok(Outcome::Timing(TimingReport {
            results: vec![TimeMeasurement::from(outcome)],
            reference: None,
            total_time: context.clock.now() - start,
            interrupted,
        }))
    }
}
