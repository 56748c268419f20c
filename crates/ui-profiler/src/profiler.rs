//! Registry of scenarios and benchmarks
//!
//! [`UiProfiler`] is the entry point a host embeds: it registers scenarios,
//! knows which benchmark kinds are available, runs one benchmark on one
//! scenario at a time and wraps the outcome in a [`BenchmarkRecord`].

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, instrument, warn};

use crate::benchmarks::{Benchmark, ExecutionTimeBenchmark, RunContext};
use crate::config::Config;
use crate::control::{AbortSignal, ProgressEvent};
use crate::error::{ProfilerError, Result};
use crate::measurement::Outcome;
use crate::scenario::Scenario;

/// Which scenario or benchmark to use, with its options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    pub id: String,
    #[serde(default)]
    pub options: Value,
}

impl RunRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            options: Value::Null,
        }
    }

    pub fn with_options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }
}

/// Options a record was produced with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordOptions {
    pub scenario: Value,
    pub benchmark: Value,
}

/// A completed benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    /// `<benchmark>_<scenario>_<completed>`
    pub id: String,
    pub benchmark: String,
    pub scenario: String,
    pub options: RecordOptions,
    pub completed: DateTime<Utc>,
    pub result: Outcome,
}

/// Descriptor of a registered scenario or benchmark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub name: String,
}

struct RegisteredScenario {
    id: String,
    name: String,
    scenario: Arc<Mutex<Box<dyn Scenario>>>,
}

pub struct UiProfiler {
    scenarios: Vec<RegisteredScenario>,
    benchmarks: Vec<Arc<dyn Benchmark>>,
    context: RunContext,
    /// Held for the whole of a run; the abort flag and progress channel
    /// belong to one run at a time.
    running: Mutex<()>,
}

impl UiProfiler {
    /// Create a registry with the `execution-time` benchmark.
    pub fn new(context: RunContext) -> Self {
        Self {
            scenarios: Vec::new(),
            benchmarks: vec![Arc::new(ExecutionTimeBenchmark)],
            context,
            running: Mutex::new(()),
        }
    }

    pub fn add_scenario(&mut self, scenario: Box<dyn Scenario>) {
        let id = scenario.id().to_string();
        let name = scenario.name().to_string();
        info!("Registered scenario '{}' ({})", name, id);
        if self.scenarios.iter().any(|s| s.id == id) {
            warn!("Scenario id '{}' is already registered, lookups find the first", id);
        }
        self.scenarios.push(RegisteredScenario {
            id,
            name,
            scenario: Arc::new(Mutex::new(scenario)),
        });
    }

    pub fn add_benchmark(&mut self, benchmark: Arc<dyn Benchmark>) {
        info!("Registered benchmark '{}' ({})", benchmark.name(), benchmark.id());
        self.benchmarks.push(benchmark);
    }

    pub fn scenarios(&self) -> Vec<Entry> {
        self.scenarios
            .iter()
            .map(|s| Entry {
                id: s.id.clone(),
                name: s.name.clone(),
            })
            .collect()
    }

    pub fn benchmarks(&self) -> Vec<Entry> {
        self.benchmarks.iter().map(|b| entry(b.as_ref())).collect()
    }

    /// Benchmarks whose host requirements are met.
    pub fn available_benchmarks(&self) -> Vec<Entry> {
        self.benchmarks
            .iter()
            .filter(|b| b.is_available())
            .map(|b| entry(b.as_ref()))
            .collect()
    }

    pub fn subscribe_progress(&self) -> broadcast::Receiver<ProgressEvent> {
        self.context.progress.subscribe()
    }

    /// Handle for aborting from another task.
    pub fn abort_signal(&self) -> AbortSignal {
        self.context.abort.clone()
    }

    /// Stop the running benchmark after its current repeat.
    pub fn abort_benchmark(&self) {
        info!("Abort requested");
        self.context.abort.abort();
    }

    /// Run one benchmark on one scenario.
    ///
    /// Runs are serialized: a call made while another run is in flight waits
    /// for it to finish. [`abort_benchmark`](Self::abort_benchmark) does not
    /// wait and applies to the run in flight.
    ///
    /// # Errors
    ///
    /// * [`ProfilerError::UnknownScenario`] / [`ProfilerError::UnknownBenchmark`]
    ///   if an id is not registered
    /// * [`ProfilerError::ScenarioOptions`] if the scenario rejects its options
    /// * whatever the benchmark itself fails with
    #[instrument(skip_all, fields(scenario = %scenario.id, benchmark = %benchmark.id))]
    pub async fn run_benchmark(
        &self,
        scenario: RunRequest,
        benchmark: RunRequest,
    ) -> Result<BenchmarkRecord> {
        let registered = self
            .scenarios
            .iter()
            .find(|s| s.id == scenario.id)
            .ok_or_else(|| ProfilerError::UnknownScenario(scenario.id.clone()))?;
        let kind = self
            .benchmarks
            .iter()
            .find(|b| b.id() == benchmark.id)
            .ok_or_else(|| ProfilerError::UnknownBenchmark(benchmark.id.clone()))?;

        let _running = self.running.lock().await;
        let mut target = registered.scenario.lock().await;
        target
            .set_options(&scenario.options)
            .map_err(ProfilerError::ScenarioOptions)?;

        self.context.abort.reset();
        self.context.progress.emit(0.0);
        info!("Running '{}' on '{}'", kind.name(), registered.name);

        let result = kind
            .run(&mut **target, &benchmark.options, &self.context)
            .await?;
        drop(target);

        if result.interrupted() {
            self.context.progress.interrupted();
        } else {
            self.context.progress.complete();
        }

        let completed = Utc::now();
        let id = format!(
            "{}_{}_{}",
            benchmark.id,
            scenario.id,
            completed.to_rfc3339_opts(SecondsFormat::Millis, true)
        );
        info!(
            "Completed '{}' in {:.1}ms ({} failed repeats)",
            id,
            result.total_time(),
            result.error_count()
        );

        Ok(BenchmarkRecord {
            id,
            benchmark: benchmark.id,
            scenario: scenario.id,
            options: RecordOptions {
                scenario: scenario.options,
                benchmark: benchmark.options,
            },
            completed,
            result,
        })
    }

    /// Run the benchmark and scenario selected by a configuration.
    pub async fn run_configured(&self, config: &Config) -> anyhow::Result<BenchmarkRecord> {
        let scenario = RunRequest::new(config.run.scenario.as_str())
            .with_options(config.scenario_options(&config.run.scenario)?);
        let benchmark =
            RunRequest::new(config.run.benchmark.as_str()).with_options(config.benchmark_options());
        Ok(self.run_benchmark(scenario, benchmark).await?)
    }
}

impl Default for UiProfiler {
    fn default() -> Self {
        Self::new(RunContext::default())
    }
}

fn entry(benchmark: &dyn Benchmark) -> Entry {
    Entry {
        id: benchmark.id().to_string(),
        name: benchmark.name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Noop;

    #[async_trait::async_trait]
    impl Scenario for Noop {
        fn id(&self) -> &str {
            "noop"
        }

        fn name(&self) -> &str {
            "No-op"
        }

        async fn run(&mut self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_default_registry_has_execution_time() {
        let profiler = UiProfiler::default();
        assert_eq!(
            profiler.benchmarks(),
            vec![Entry {
                id: "execution-time".to_string(),
                name: "Execution Time".to_string(),
            }]
        );
        assert!(profiler.scenarios().is_empty());
    }

    #[tokio::test]
    async fn test_record_id_contains_both_ids() {
        let mut profiler = UiProfiler::default();
        profiler.add_scenario(Box::new(Noop));

        let record = profiler
            .run_benchmark(
                RunRequest::new("noop"),
                RunRequest::new("execution-time").with_options(json!({"repeats": 2})),
            )
            .await
            .unwrap();

        assert!(record.id.starts_with("execution-time_noop_"));
        assert!(record.id.ends_with('Z'));
        assert_eq!(record.options.benchmark, json!({"repeats": 2}));
        match record.result {
            Outcome::Timing(report) => assert_eq!(report.results[0].times.len(), 2),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_ids_are_rejected() {
        let mut profiler = UiProfiler::default();
        profiler.add_scenario(Box::new(Noop));

        let err = profiler
            .run_benchmark(RunRequest::new("missing"), RunRequest::new("execution-time"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProfilerError::UnknownScenario(id) if id == "missing"));

        let err = profiler
            .run_benchmark(RunRequest::new("noop"), RunRequest::new("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProfilerError::UnknownBenchmark(id) if id == "missing"));
    }
}
