//! Console reporter for benchmark records
//!
//! Provides human-readable output with ASCII tables.

use anyhow::Result;
use std::fmt::Write;

use crate::measurement::{Outcome, ProfileReport, TimingReport};
use crate::profiler::BenchmarkRecord;
use crate::summary::{profile_hotspots, timing_summary, TimingSummary};

/// Hot functions listed per profile.
const HOTSPOT_ROWS: usize = 15;

/// Console format reporter
pub struct ConsoleReporter;

impl ConsoleReporter {
    /// Format a benchmark record for console output
    pub fn format(record: &BenchmarkRecord) -> Result<String> {
        let mut output = String::new();

        // Header
        writeln!(output)?;
        writeln!(output, "╔══════════════════════════════════════════════════════════════╗")?;
        writeln!(output, "║                    UI PROFILER RESULTS                       ║")?;
        writeln!(output, "╚══════════════════════════════════════════════════════════════╝")?;
        writeln!(output)?;

        writeln!(output, "Benchmark: {}", record.benchmark)?;
        writeln!(output, "Scenario:  {}", record.scenario)?;
        writeln!(output, "Completed: {}", record.completed.to_rfc3339())?;
        writeln!(output, "Duration:  {:.1}ms", record.result.total_time())?;
        writeln!(output)?;

        match &record.result {
            Outcome::Timing(report) => Self::format_timing(&mut output, report)?,
            Outcome::Profile(report) => Self::format_profile(&mut output, report)?,
        }

        writeln!(output, "────────────────────────────────────────────────────────────────")?;
        let errors = record.result.error_count();
        if errors > 0 {
            writeln!(output, "✗ {} repeats failed", errors)?;
        }
        if record.result.interrupted() {
            writeln!(output, "Interrupted before all repeats completed")?;
        }
        writeln!(output)?;
        Ok(output)
    }

    fn format_timing(output: &mut String, report: &TimingReport) -> Result<()> {
        if let Some(reference) = &report.reference {
            let row = TimingSummary::from_measurement("reference", reference);
            writeln!(
                output,
                "Reference: min {:.1}ms, mean {:.1}ms, IQM {:.1}ms ({} repeats)",
                row.min, row.mean, row.iqm, row.repeats
            )?;
            writeln!(output)?;
        }

        writeln!(output, "  ┌──────────────────────────┬─────────┬─────────┬─────────┬─────────┬────────┐")?;
        writeln!(output, "  │ Measurement              │   Min   │  Mean   │   IQM   │    Δ    │ Errors │")?;
        writeln!(output, "  ├──────────────────────────┼─────────┼─────────┼─────────┼─────────┼────────┤")?;
        for row in timing_summary(report) {
            let delta = row
                .delta
                .map(|d| format!("{:+.1}", d))
                .unwrap_or_else(|| "-".to_string());
            writeln!(
                output,
                "  │ {:<24} │ {:>7.1} │ {:>7.1} │ {:>7.1} │ {:>7} │ {:>6} │",
                truncate(&row.label, 24),
                row.min,
                row.mean,
                row.iqm,
                delta,
                row.errors
            )?;
        }
        writeln!(output, "  └──────────────────────────┴─────────┴─────────┴─────────┴─────────┴────────┘")?;
        writeln!(output)?;
        Ok(())
    }

    fn format_profile(output: &mut String, report: &ProfileReport) -> Result<()> {
        for (i, measurement) in report.results.iter().enumerate() {
            let outcome = &measurement.outcome;
            writeln!(
                output,
                "Profile {}: {} traces, sampling {}ms (measured {:.2}ms)",
                i + 1,
                outcome.traces.len(),
                outcome.sampling_interval,
                outcome.average_sample_interval
            )?;
        }
        writeln!(output)?;

        writeln!(output, "  ┌────────────────────────────────────────────────────┬───────────┐")?;
        writeln!(output, "  │ Function                                           │   Time    │")?;
        writeln!(output, "  ├────────────────────────────────────────────────────┼───────────┤")?;
        for timing in profile_hotspots(report).iter().take(HOTSPOT_ROWS) {
            let location = match (&timing.resource, timing.line) {
                (Some(resource), Some(line)) => format!("{} ({}:{})", timing.name, resource, line),
                (Some(resource), None) => format!("{} ({})", timing.name, resource),
                _ => timing.name.clone(),
            };
            writeln!(
                output,
                "  │ {:<50} │ {:>7.1}ms │",
                truncate(&location, 50),
                timing.time
            )?;
        }
        writeln!(output, "  └────────────────────────────────────────────────────┴───────────┘")?;
        writeln!(output)?;
        Ok(())
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut short: String = text.chars().take(width - 1).collect();
    short.push('…');
    short
}
