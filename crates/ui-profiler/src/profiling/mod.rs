//! Sampling-profiler traces and the host capability that records them
//!
//! Traces follow the shape of the browser's JS Self-Profiling API output:
//! a list of timestamped samples, each pointing into a table of
//! parent-linked stack entries, each pointing at a frame (function).
//!
//! ```text
//! samples[i].stack_id ──► stacks[s] ──parent_id──► stacks[p] ──► … root
//!                           │frame_id                │frame_id
//!                           ▼                        ▼
//!                        frames[f]                frames[g]
//! ```

pub mod frames;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use frames::{extract_times, FrameInterval, FrameIntervals, FunctionTiming};

/// How profiling sessions map onto repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileScale {
    /// One session (and trace) per repeat, wrapping only `run()`.
    #[default]
    Micro,
    /// One session spanning all repeats, lifecycle hooks included.
    Macro,
}

/// Options passed to the sampling profiler when a session starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilerOptions {
    /// Requested interval between samples in milliseconds.
    pub sample_interval: f64,
    /// Maximum number of samples buffered by one session.
    pub max_buffer_size: usize,
}

impl Default for ProfilerOptions {
    fn default() -> Self {
        Self {
            sample_interval: 10.0,
            max_buffer_size: 10_000,
        }
    }
}

/// One continuous profiler recording.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilerTrace {
    /// Script URLs referenced by frames.
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub frames: Vec<ProfilerFrame>,
    #[serde(default)]
    pub stacks: Vec<ProfilerStack>,
    #[serde(default)]
    pub samples: Vec<ProfilerSample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilerFrame {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilerStack {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<usize>,
    pub frame_id: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilerSample {
    /// Milliseconds, on the same origin as the host clock.
    pub timestamp: f64,
    /// `None` when the call stack was empty at this instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_id: Option<usize>,
}

impl ProfilerTrace {
    /// Parse a trace from the browser's JSON serialization.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Differences between consecutive sample timestamps.
    pub fn sample_intervals(&self) -> Vec<f64> {
        self.samples
            .windows(2)
            .map(|pair| pair[1].timestamp - pair[0].timestamp)
            .collect()
    }

    /// Iterate the stack entries from `stack_id` up to the root.
    ///
    /// Stops early at an id that is not in the stack table, and never yields
    /// more entries than the table holds (a malformed, cyclic table ends).
    pub fn stack_chain(&self, stack_id: usize) -> impl Iterator<Item = &ProfilerStack> + '_ {
        let mut next = self.stacks.get(stack_id);
        std::iter::from_fn(move || {
            let current = next?;
            next = current.parent_id.and_then(|parent| self.stacks.get(parent));
            Some(current)
        })
        .take(self.stacks.len())
    }
}

/// A running profiler session. Dropping it without [`stop`](Self::stop)
/// discards the recording.
#[async_trait]
pub trait ProfilerSession: Send {
    /// Sampling interval the profiler actually applied, in milliseconds.
    fn sample_interval(&self) -> f64;

    /// Stop sampling and hand over the recorded trace.
    async fn stop(&mut self) -> Result<ProfilerTrace>;
}

/// Host capability that starts sampling-profiler sessions.
#[async_trait]
pub trait SamplingProfiler: Send + Sync {
    async fn start(&self, options: &ProfilerOptions) -> Result<Box<dyn ProfilerSession>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACE_JSON: &str = r#"{
        "resources": ["https://example.com/app.js"],
        "frames": [
            {"name": "main", "resourceId": 0, "line": 1, "column": 10},
            {"name": "render"}
        ],
        "stacks": [
            {"frameId": 0},
            {"parentId": 0, "frameId": 1}
        ],
        "samples": [
            {"timestamp": 0.0, "stackId": 0},
            {"timestamp": 10.5, "stackId": 1},
            {"timestamp": 20.0}
        ]
    }"#;

    #[test]
    fn test_trace_parses_browser_shape() {
        let trace = ProfilerTrace::from_json(TRACE_JSON).unwrap();

        assert_eq!(trace.resources, vec!["https://example.com/app.js"]);
        assert_eq!(trace.frames[0].resource_id, Some(0));
        assert_eq!(trace.frames[1].line, None);
        assert_eq!(trace.stacks[1].parent_id, Some(0));
        assert_eq!(trace.samples[2].stack_id, None);
    }

    #[test]
    fn test_sample_intervals() {
        let trace = ProfilerTrace::from_json(TRACE_JSON).unwrap();
        assert_eq!(trace.sample_intervals(), vec![10.5, 9.5]);
        assert!(ProfilerTrace::default().sample_intervals().is_empty());
    }

    #[test]
    fn test_stack_chain_walks_to_root() {
        let trace = ProfilerTrace::from_json(TRACE_JSON).unwrap();
        let frames: Vec<usize> = trace.stack_chain(1).map(|s| s.frame_id).collect();
        assert_eq!(frames, vec![1, 0]);
    }

    #[test]
    fn test_stack_chain_stops_at_unknown_id() {
        let trace = ProfilerTrace {
            stacks: vec![ProfilerStack {
                parent_id: Some(7),
                frame_id: 0,
            }],
            ..Default::default()
        };
        assert_eq!(trace.stack_chain(0).count(), 1);
        assert_eq!(trace.stack_chain(3).count(), 0);
    }

    #[test]
    fn test_stack_chain_terminates_on_cycle() {
        let trace = ProfilerTrace {
            stacks: vec![
                ProfilerStack {
                    parent_id: Some(1),
                    frame_id: 0,
                },
                ProfilerStack {
                    parent_id: Some(0),
                    frame_id: 1,
                },
            ],
            ..Default::default()
        };
        assert_eq!(trace.stack_chain(0).count(), 2);
    }

    #[test]
    fn test_profile_scale_serialization() {
        assert_eq!(serde_json::to_string(&ProfileScale::Macro).unwrap(), "\"macro\"");
        assert_eq!(ProfileScale::default(), ProfileScale::Micro);
    }
}
