//! Reconstruction of on-stack intervals from sampled call stacks
//!
//! A sampling profiler only records which stack was active at each sample. A
//! function is considered continuously on stack from the first sample that
//! shows it until the first later sample that does not. Frames are tracked per
//! `(frame, depth)` pair, depth counted from the stack root, so a recursive
//! function yields one interval per recursion level.
//!
//! Intervals still open at the last sample of a trace are never completed and
//! therefore not reported. Functions running when recording stopped are
//! undercounted accordingly.

use std::collections::{HashMap, HashSet, VecDeque};
use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};

use super::{ProfilerSample, ProfilerTrace};

/// A completed span during which one frame stayed on stack at one depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameInterval {
    /// Index into [`ProfilerTrace::frames`].
    pub frame_id: usize,
    /// Distance from the stack root; the root frame has depth 0.
    pub stack_depth: usize,
    pub start: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, Copy)]
struct OpenFrame {
    frame_id: usize,
    stack_depth: usize,
    start: f64,
}

impl OpenFrame {
    fn key(&self) -> (usize, usize) {
        (self.frame_id, self.stack_depth)
    }
}

/// Lazy iterator over the completed [`FrameInterval`]s of a trace, in sample
/// order.
///
/// Single pass: once exhausted it stays exhausted. Intervals completed by the
/// same sample come out leaf first.
#[derive(Debug)]
pub struct FrameIntervals<'a> {
    trace: &'a ProfilerTrace,
    next_sample: usize,
    /// Frames on stack at the previous sample, leaf first.
    running: Vec<OpenFrame>,
    completed: VecDeque<FrameInterval>,
}

impl<'a> FrameIntervals<'a> {
    pub fn new(trace: &'a ProfilerTrace) -> Self {
        Self {
            trace,
            next_sample: 0,
            running: Vec::new(),
            completed: VecDeque::new(),
        }
    }

    fn advance(&mut self, sample: ProfilerSample) {
        let now = sample.timestamp;
        let trace = self.trace;

        let active: Vec<OpenFrame> = match sample.stack_id {
            // Empty stack: everything that was running has finished
            None => Vec::new(),
            Some(stack_id) => {
                let depth = trace.stack_chain(stack_id).count();
                let starts: HashMap<(usize, usize), f64> = self
                    .running
                    .iter()
                    .map(|frame| (frame.key(), frame.start))
                    .collect();
                trace
                    .stack_chain(stack_id)
                    .enumerate()
                    .map(|(i, stack)| {
                        let stack_depth = depth - 1 - i;
                        let start = starts
                            .get(&(stack.frame_id, stack_depth))
                            .copied()
                            .unwrap_or(now);
                        OpenFrame {
                            frame_id: stack.frame_id,
                            stack_depth,
                            start,
                        }
                    })
                    .collect()
            }
        };

        let still_running: HashSet<(usize, usize)> = active.iter().map(OpenFrame::key).collect();
        for frame in self.running.drain(..) {
            if !still_running.contains(&frame.key()) {
                self.completed.push_back(FrameInterval {
                    frame_id: frame.frame_id,
                    stack_depth: frame.stack_depth,
                    start: frame.start,
                    duration: now - frame.start,
                });
            }
        }
        self.running = active;
    }
}

impl Iterator for FrameIntervals<'_> {
    type Item = FrameInterval;

    fn next(&mut self) -> Option<FrameInterval> {
        loop {
            if let Some(interval) = self.completed.pop_front() {
                return Some(interval);
            }
            let sample = *self.trace.samples.get(self.next_sample)?;
            self.next_sample += 1;
            self.advance(sample);
        }
    }
}

impl FusedIterator for FrameIntervals<'_> {}

/// Total on-stack time of one function across a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionTiming {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    /// Summed duration of all completed intervals of the function, in ms.
    pub time: f64,
}

/// Sum interval durations per function.
///
/// Rows come out in order of each function's first completed interval.
/// Recursive calls add up once per recursion level.
pub fn extract_times(trace: &ProfilerTrace) -> Vec<FunctionTiming> {
    let mut order: Vec<usize> = Vec::new();
    let mut totals: HashMap<usize, f64> = HashMap::new();

    for interval in FrameIntervals::new(trace) {
        let total = totals.entry(interval.frame_id).or_insert_with(|| {
            order.push(interval.frame_id);
            0.0
        });
        *total += interval.duration;
    }

    order
        .into_iter()
        .filter_map(|frame_id| {
            let frame = trace.frames.get(frame_id)?;
            Some(FunctionTiming {
                name: frame.name.clone(),
                resource: frame
                    .resource_id
                    .and_then(|id| trace.resources.get(id).cloned()),
                line: frame.line,
                column: frame.column,
                time: totals.get(&frame_id).copied().unwrap_or(0.0),
            })
        })
        .collect()
}
