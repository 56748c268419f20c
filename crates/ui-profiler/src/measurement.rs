//! Benchmark outcomes as reported to the presentation layer
//!
//! Each benchmark kind produces one [`Outcome`] variant. Measurements carry a
//! fixed core plus an open `extra` map for kind-specific fields such as the
//! label of an isolated target.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::runner::{ProfilingOutcome, RepeatError, TimingOutcome};

/// Read `null` back as `NaN`.
///
/// JSON has no `NaN`; `serde_json` writes it (and infinities) as `null`.
/// Fields that may legitimately hold `NaN` deserialize through this.
pub(crate) fn nan_from_null<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// Result of running one benchmark kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    Timing(TimingReport),
    Profile(ProfileReport),
}

impl Outcome {
    pub fn interrupted(&self) -> bool {
        match self {
            Outcome::Timing(report) => report.interrupted,
            Outcome::Profile(report) => report.interrupted,
        }
    }

    /// Wall-clock duration of the whole benchmark in milliseconds.
    pub fn total_time(&self) -> f64 {
        match self {
            Outcome::Timing(report) => report.total_time,
            Outcome::Profile(report) => report.total_time,
        }
    }

    /// Number of repeats whose `run()` failed, over all measurements.
    pub fn error_count(&self) -> usize {
        match self {
            Outcome::Timing(report) => report
                .reference
                .iter()
                .map(|m| m.errors.len())
                .chain(report.results.iter().map(|m| m.errors.len()))
                .sum(),
            Outcome::Profile(report) => report.results.iter().map(|m| m.outcome.errors.len()).sum(),
        }
    }
}

/// Timed measurements, optionally against an unmodified reference run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingReport {
    pub results: Vec<TimeMeasurement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<TimeMeasurement>,
    pub total_time: f64,
    #[serde(default)]
    pub interrupted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeMeasurement {
    pub times: Vec<f64>,
    #[serde(default)]
    pub errors: Vec<RepeatError>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TimeMeasurement {
    /// Attach a kind-specific field.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.extra.get("label").and_then(Value::as_str)
    }
}

impl From<TimingOutcome> for TimeMeasurement {
    fn from(outcome: TimingOutcome) -> Self {
        Self {
            times: outcome.times,
            errors: outcome.errors,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileReport {
    pub results: Vec<ProfileMeasurement>,
    pub total_time: f64,
    #[serde(default)]
    pub interrupted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileMeasurement {
    #[serde(flatten)]
    pub outcome: ProfilingOutcome,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<ProfilingOutcome> for ProfileMeasurement {
    fn from(outcome: ProfilingOutcome) -> Self {
        Self {
            outcome,
            extra: Map::new(),
        }
    }
}
