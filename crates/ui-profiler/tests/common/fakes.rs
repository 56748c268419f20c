//! Scripted host doubles shared by the integration tests

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use serde_json::Value;
use ui_profiler::benchmarks::{IsolationSource, IsolationTarget, RunContext};
use ui_profiler::control::AbortSignal;
use ui_profiler::host::{Clock, YieldLayout};
use ui_profiler::profiling::{
    ProfilerFrame, ProfilerOptions, ProfilerSample, ProfilerSession, ProfilerStack, ProfilerTrace,
    SamplingProfiler,
};
use ui_profiler::scenario::Scenario;

/// Ordered record of host calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries().iter().filter(|e| *e == entry).count()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<f64>,
}

impl ManualClock {
    pub fn advance(&self, ms: f64) {
        *self.now.lock().unwrap() += ms;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        *self.now.lock().unwrap()
    }
}

/// Scenario whose behaviour is scripted per run.
pub struct ScriptedScenario {
    pub id: String,
    pub log: CallLog,
    clock: Arc<ManualClock>,
    /// Milliseconds each `run()` advances the clock by.
    run_cost: f64,
    /// Zero-based `run()` calls that fail.
    failing_runs: HashSet<usize>,
    failing_hook: Option<&'static str>,
    /// Abort this signal during the cleanup following the given run.
    abort_after: Option<(usize, AbortSignal)>,
    runs: usize,
}

impl ScriptedScenario {
    pub fn new(id: &str, clock: Arc<ManualClock>) -> Self {
        Self {
            id: id.to_string(),
            log: CallLog::default(),
            clock,
            run_cost: 5.0,
            failing_runs: HashSet::new(),
            failing_hook: None,
            abort_after: None,
            runs: 0,
        }
    }

    pub fn costing(mut self, ms: f64) -> Self {
        self.run_cost = ms;
        self
    }

    pub fn failing_run(mut self, run: usize) -> Self {
        self.failing_runs.insert(run);
        self
    }

    pub fn failing_hook(mut self, hook: &'static str) -> Self {
        self.failing_hook = Some(hook);
        self
    }

    pub fn aborting_after(mut self, run: usize, signal: AbortSignal) -> Self {
        self.abort_after = Some((run, signal));
        self
    }

    fn hook(&self, name: &'static str) -> anyhow::Result<()> {
        self.log.push(name);
        if self.failing_hook == Some(name) {
            bail!("{} exploded", name);
        }
        Ok(())
    }
}

#[async_trait]
impl Scenario for ScriptedScenario {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "Scripted scenario"
    }

    fn set_options(&mut self, options: &Value) -> anyhow::Result<()> {
        self.log.push(format!("options:{}", options));
        if options.get("reject").and_then(Value::as_bool) == Some(true) {
            bail!("unsupported option");
        }
        Ok(())
    }

    async fn setup_suite(&mut self) -> anyhow::Result<()> {
        self.hook("setup_suite")
    }

    async fn cleanup_suite(&mut self) -> anyhow::Result<()> {
        self.hook("cleanup_suite")
    }

    async fn setup(&mut self) -> anyhow::Result<()> {
        self.hook("setup")
    }

    async fn cleanup(&mut self) -> anyhow::Result<()> {
        self.hook("cleanup")?;
        if let Some((run, signal)) = &self.abort_after {
            if self.runs == run + 1 {
                signal.abort();
            }
        }
        Ok(())
    }

    async fn run(&mut self) -> anyhow::Result<()> {
        let run = self.runs;
        self.runs += 1;
        self.log.push("run");
        self.clock.advance(self.run_cost);
        if self.failing_runs.contains(&run) {
            return Err(anyhow!("run {} failed", run));
        }
        Ok(())
    }
}

/// Context running on a manual clock.
pub fn manual_context() -> (RunContext, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let context = RunContext::new(clock.clone(), Arc::new(YieldLayout));
    (context, clock)
}

/// Trace of a single `work` frame sampled every `interval` ms.
pub fn sampled_trace(samples: usize, interval: f64) -> ProfilerTrace {
    ProfilerTrace {
        resources: vec!["app.js".to_string()],
        frames: vec![ProfilerFrame {
            name: "work".to_string(),
            resource_id: Some(0),
            line: Some(3),
            column: Some(7),
        }],
        stacks: vec![ProfilerStack {
            parent_id: None,
            frame_id: 0,
        }],
        samples: (0..samples)
            .map(|i| ProfilerSample {
                timestamp: i as f64 * interval,
                stack_id: if i + 1 < samples { Some(0) } else { None },
            })
            .collect(),
    }
}

/// Profiler whose sessions all report the same trace.
#[derive(Debug, Default)]
pub struct FakeProfiler {
    pub starts: AtomicUsize,
    pub stops: Arc<AtomicUsize>,
    pub fail_start: bool,
}

impl FakeProfiler {
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

struct FakeSession {
    interval: f64,
    stops: Arc<AtomicUsize>,
}

#[async_trait]
impl ProfilerSession for FakeSession {
    fn sample_interval(&self) -> f64 {
        self.interval
    }

    async fn stop(&mut self) -> anyhow::Result<ProfilerTrace> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(sampled_trace(4, self.interval))
    }
}

#[async_trait]
impl SamplingProfiler for FakeProfiler {
    async fn start(&self, options: &ProfilerOptions) -> anyhow::Result<Box<dyn ProfilerSession>> {
        if self.fail_start {
            bail!("profiler buffer could not be allocated");
        }
        self.starts.fetch_add(1, Ordering::SeqCst);
        // Hosts round the requested interval up to their timer resolution
        Ok(Box::new(FakeSession {
            interval: options.sample_interval.max(16.0),
            stops: self.stops.clone(),
        }))
    }
}

/// Removable host part that logs the state changes it completes.
pub struct FakeTarget {
    label: String,
    log: CallLog,
    /// Toggles that fail, e.g. `disable:a.css`.
    failing: Vec<String>,
}

impl FakeTarget {
    fn toggle(&self, action: &str) -> anyhow::Result<()> {
        let entry = format!("{}:{}", action, self.label);
        if self.failing.contains(&entry) {
            bail!("cannot {} {}", action, self.label);
        }
        self.log.push(entry);
        Ok(())
    }
}

#[async_trait]
impl IsolationTarget for FakeTarget {
    fn label(&self) -> String {
        self.label.clone()
    }

    async fn disable(&mut self) -> anyhow::Result<()> {
        self.toggle("disable")
    }

    async fn restore(&mut self) -> anyhow::Result<()> {
        self.toggle("restore")
    }
}

pub struct FakeSource {
    pub labels: Vec<String>,
    pub log: CallLog,
    failing: Vec<String>,
}

impl FakeSource {
    pub fn new(labels: &[&str], log: CallLog) -> Self {
        Self {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            log,
            failing: Vec::new(),
        }
    }

    /// Make one toggle fail, e.g. `failing("disable:a")`.
    pub fn failing(mut self, toggle: &str) -> Self {
        self.failing.push(toggle.to_string());
        self
    }
}

#[async_trait]
impl IsolationSource for FakeSource {
    async fn collect(&self) -> anyhow::Result<Vec<Box<dyn IsolationTarget>>> {
        self.log.push("collect");
        Ok(self
            .labels
            .iter()
            .map(|label| {
                Box::new(FakeTarget {
                    label: label.clone(),
                    log: self.log.clone(),
                    failing: self.failing.clone(),
                }) as Box<dyn IsolationTarget>
            })
            .collect())
    }
}
