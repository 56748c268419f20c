//! Tabular summaries of benchmark outcomes

use std::cmp::Ordering;

use profiler_stats::{inter_quartile_mean, mean, min, round};
use serde::{Deserialize, Serialize};

use crate::measurement::{nan_from_null, ProfileReport, TimeMeasurement, TimingReport};
use crate::profiling::frames::{extract_times, FunctionTiming};

/// Decimal places shown for milliseconds.
const PRECISION: i32 = 1;

/// One row of a timing table, values in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingSummary {
    pub label: String,
    #[serde(deserialize_with = "nan_from_null")]
    pub min: f64,
    #[serde(deserialize_with = "nan_from_null")]
    pub mean: f64,
    #[serde(deserialize_with = "nan_from_null")]
    pub iqm: f64,
    /// IQM minus the IQM of the reference measurement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
    pub repeats: usize,
    pub errors: usize,
}

impl TimingSummary {
    pub fn from_measurement(label: impl Into<String>, measurement: &TimeMeasurement) -> Self {
        Self {
            label: label.into(),
            min: round(min(&measurement.times), PRECISION),
            mean: round(mean(&measurement.times), PRECISION),
            iqm: round(inter_quartile_mean(&measurement.times), PRECISION),
            delta: None,
            repeats: measurement.times.len(),
            errors: measurement.errors.len(),
        }
    }
}

/// Label a measurement by its `label`, its `labels`, or its position.
fn measurement_label(index: usize, measurement: &TimeMeasurement) -> String {
    if let Some(label) = measurement.label() {
        return label.to_string();
    }
    if let Some(labels) = measurement.extra.get("labels").and_then(|v| v.as_array()) {
        let joined: Vec<&str> = labels.iter().filter_map(|v| v.as_str()).collect();
        return joined.join(", ");
    }
    format!("#{}", index + 1)
}

/// Summarize every measurement of a timing report, fastest IQM first.
///
/// Rows without a finite IQM sort last. With a reference measurement each
/// row carries its delta against the reference IQM.
pub fn timing_summary(report: &TimingReport) -> Vec<TimingSummary> {
    let reference_iqm = report
        .reference
        .as_ref()
        .map(|m| inter_quartile_mean(&m.times));

    let mut rows: Vec<TimingSummary> = report
        .results
        .iter()
        .enumerate()
        .map(|(i, measurement)| {
            let mut row = TimingSummary::from_measurement(measurement_label(i, measurement), measurement);
            row.delta = reference_iqm
                .map(|reference| round(inter_quartile_mean(&measurement.times) - reference, PRECISION));
            row
        })
        .collect();

    rows.sort_by(|a, b| by_iqm(a.iqm, b.iqm));
    rows
}

fn by_iqm(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.total_cmp(&b),
    }
}

/// Function timings summed over every trace of a profile report, slowest
/// first.
///
/// Functions are matched by name and location.
pub fn profile_hotspots(report: &ProfileReport) -> Vec<FunctionTiming> {
    let mut merged: Vec<FunctionTiming> = Vec::new();

    let timings = report
        .results
        .iter()
        .flat_map(|m| m.outcome.traces.iter())
        .flat_map(extract_times);
    for timing in timings {
        match merged.iter_mut().find(|t| same_function(t, &timing)) {
            Some(existing) => existing.time += timing.time,
            None => merged.push(timing),
        }
    }

    merged.sort_by(|a, b| b.time.total_cmp(&a.time));
    merged
}

fn same_function(a: &FunctionTiming, b: &FunctionTiming) -> bool {
    a.name == b.name && a.resource == b.resource && a.line == b.line && a.column == b.column
}
