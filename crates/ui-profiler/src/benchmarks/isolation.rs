//! Isolation benchmark: attribute cost to removable parts of the host
//!
//! The host exposes pieces that can be switched off and back on (style
//! sheets, style rules, extensions). The scenario is timed once with
//! everything in place as a reference, then again with each piece, or each
//! block of pieces, disabled. A piece whose removal lowers the interquartile
//! mean is contributing to the cost of the scenario.

use std::ops::Range;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::{parse_options, repeats_or_default, Benchmark, RunContext};
use crate::error::{ProfilerError, Result};
use crate::measurement::{Outcome, TimeMeasurement, TimingReport};
use crate::runner::{cleanup_suite, setup_suite};
use crate::scenario::Scenario;

/// One removable piece of the host.
#[async_trait]
pub trait IsolationTarget: Send {
    /// Human-readable description, e.g. a selector or a sheet URL.
    fn label(&self) -> String;

    async fn disable(&mut self) -> anyhow::Result<()>;

    async fn restore(&mut self) -> anyhow::Result<()>;
}

/// Enumerates the removable pieces currently present in the host.
#[async_trait]
pub trait IsolationSource: Send + Sync {
    async fn collect(&self) -> anyhow::Result<Vec<Box<dyn IsolationTarget>>>;
}

/// How targets are disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grouping {
    /// One target at a time
    #[default]
    Each,
    /// Contiguous blocks of targets, for every block count in a range
    Blocks,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsolationOptions {
    /// Number of timed repeats per measurement (default: 3)
    #[serde(default)]
    pub repeats: Option<usize>,
    #[serde(default)]
    pub grouping: Grouping,
    /// Smallest block count (default: 2)
    #[serde(default)]
    pub min_blocks: Option<usize>,
    /// Largest block count (default: 5)
    #[serde(default)]
    pub max_blocks: Option<usize>,
}

/// A set of targets disabled together for one measurement.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Unit {
    targets: Range<usize>,
    /// `(block, divisions)` when grouping in blocks
    block: Option<(usize, usize)>,
}

/// Split `count` targets into measurement units.
///
/// With [`Grouping::Blocks`], for every `divisions` in `min..=max` the
/// targets are cut into contiguous blocks of `ceil(count / divisions)`; the
/// last block may be shorter, and there are fewer blocks than `divisions`
/// when targets run out.
fn plan_units(grouping: Grouping, count: usize, min_blocks: usize, max_blocks: usize) -> Vec<Unit> {
    match grouping {
        Grouping::Each => (0..count)
            .map(|i| Unit {
                targets: i..i + 1,
                block: None,
            })
            .collect(),
        Grouping::Blocks => {
            let mut units = Vec::new();
            if count == 0 {
                return units;
            }
            for divisions in min_blocks.max(1)..=max_blocks {
                let per_block = count.div_ceil(divisions);
                for (block, start) in (0..count).step_by(per_block).enumerate() {
                    units.push(Unit {
                        targets: start..(start + per_block).min(count),
                        block: Some((block, divisions)),
                    });
                }
            }
            units
        }
    }
}

/// Disable a batch back to front, so that index-addressed targets stay valid.
///
/// When one target fails, the targets already disabled are restored before
/// the error is returned.
async fn disable_all(batch: &mut [Box<dyn IsolationTarget>]) -> anyhow::Result<()> {
    for i in (0..batch.len()).rev() {
        if let Err(e) = batch[i].disable().await {
            warn!("Failed to disable '{}': {:#}", batch[i].label(), e);
            // The disable error is the one reported
            let _ = restore_all(&mut batch[i + 1..]).await;
            return Err(e);
        }
    }
    Ok(())
}

/// Restore every target of a batch front to back, returning the first error.
async fn restore_all(batch: &mut [Box<dyn IsolationTarget>]) -> anyhow::Result<()> {
    let mut first_error = None;
    for target in batch.iter_mut() {
        if let Err(e) = target.restore().await {
            warn!("Failed to restore '{}': {:#}", target.label(), e);
            first_error.get_or_insert(e);
        }
    }
    first_error.map_or(Ok(()), Err)
}

/// Times the scenario with parts of the host disabled.
#[derive(Clone)]
pub struct IsolationBenchmark {
    source: Arc<dyn IsolationSource>,
}

impl IsolationBenchmark {
    pub fn new(source: Arc<dyn IsolationSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Benchmark for IsolationBenchmark {
    fn id(&self) -> &str {
        "isolation"
    }

    fn name(&self) -> &str {
        "Isolation Benchmark"
    }

    #[instrument(skip_all, fields(scenario = %scenario.id()))]
    async fn run(
        &self,
        scenario: &mut dyn Scenario,
        options: &Value,
        context: &RunContext,
    ) -> Result<Outcome> {
        let options: IsolationOptions = parse_options(options)?;
        let n = repeats_or_default(options.repeats);
        let runner = context.runner();
        let start = context.clock.now();

        setup_suite(scenario).await?;
        let mut targets = self.source.collect().await.map_err(ProfilerError::Isolation)?;
        let units = plan_units(
            options.grouping,
            targets.len(),
            options.min_blocks.unwrap_or(2),
            options.max_blocks.unwrap_or(5),
        );
        info!(
            "Isolating {} targets in {} measurements",
            targets.len(),
            units.len()
        );

        context.layout.layout_ready().await;
        let reference = runner
            .benchmark(scenario, n, true, &context.abort, |_| {})
            .await?;
        let mut interrupted = reference.interrupted;
        let mut results = Vec::with_capacity(units.len());

        for (k, unit) in units.iter().enumerate() {
            if interrupted || context.abort.is_aborted() {
                interrupted = true;
                break;
            }
            context.progress.step(k, units.len());

            let batch = &mut targets[unit.targets.clone()];
            disable_all(batch).await.map_err(ProfilerError::Isolation)?;
            context.layout.layout_ready().await;
            let outcome = runner
                .benchmark(scenario, n, true, &context.abort, |_| {})
                .await;
            let restored = restore_all(batch).await;
            context.layout.layout_ready().await;
            restored.map_err(ProfilerError::Isolation)?;
            let outcome = outcome?;

            debug!(
                "Measured {:?} with {} times",
                unit.targets,
                outcome.times.len()
            );
            interrupted = outcome.interrupted;
            let mut measurement = TimeMeasurement::from(outcome);
            measurement = match unit.block {
                None => measurement.with("label", batch[0].label()),
                Some((block, divisions)) => {
                    let labels: Vec<String> = batch.iter().map(|t| t.label()).collect();
                    measurement
                        .with("labels", labels)
                        .with("block", block)
                        .with("divisions", divisions)
                }
            };
            results.push(measurement);
        }

        cleanup_suite(scenario).await?;

        Ok(Outcome::Timing(TimingReport {
            results,
            reference: Some(TimeMeasurement::from(reference)),
            total_time: context.clock.now() - start,
            interrupted,
        }))
    }
}
