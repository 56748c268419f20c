//! Cooperative cancellation and progress notification
//!
//! Both are polled or emitted at a single point: after each completed repeat.
//! Nothing here can interrupt a scenario while `run()` is in flight.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::measurement::nan_from_null;

/// Shared abort flag, set from outside a running benchmark.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    aborted: Arc<AtomicBool>,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the running benchmark stops after its current repeat.
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    /// Clear a previous request before starting a new run.
    pub fn reset(&self) {
        self.aborted.store(false, Ordering::SeqCst);
    }
}

/// Progress notification for observers of a running benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Completion in percent; `NaN` once a run was interrupted.
    #[serde(deserialize_with = "nan_from_null")]
    pub percentage: f64,
    #[serde(default)]
    pub interrupted: bool,
}

/// Capacity of the progress channel; slow observers skip stale events.
const PROGRESS_CAPACITY: usize = 64;

/// Fire-and-forget progress broadcaster.
///
/// Emitting never blocks and never fails, with or without subscribers.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    sender: broadcast::Sender<ProgressEvent>,
    /// Bits of the last percentage sent, shared between clones.
    last: Arc<AtomicU64>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(PROGRESS_CAPACITY);
        Self {
            sender,
            last: Arc::new(AtomicU64::new(f64::NAN.to_bits())),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, percentage: f64) {
        self.send(ProgressEvent {
            percentage,
            interrupted: false,
        });
    }

    /// Report `done` of `total` units as a percentage.
    pub fn step(&self, done: usize, total: usize) {
        if total == 0 {
            return;
        }
        self.emit(100.0 * done as f64 / total as f64);
    }

    /// Report 100 %, unless that was already the last event sent.
    pub fn complete(&self) {
        if f64::from_bits(self.last.load(Ordering::SeqCst)) != 100.0 {
            self.emit(100.0);
        }
    }

    pub fn interrupted(&self) {
        self.send(ProgressEvent {
            percentage: f64::NAN,
            interrupted: true,
        });
    }

    fn send(&self, event: ProgressEvent) {
        self.last.store(event.percentage.to_bits(), Ordering::SeqCst);
        if self.sender.send(event).is_err() {
            debug!("No progress subscribers, dropping {:?}", event);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abort_signal_is_shared_between_clones() {
        let signal = AbortSignal::new();
        let observer = signal.clone();
        assert!(!observer.is_aborted());

        signal.abort();
        assert!(observer.is_aborted());

        observer.reset();
        assert!(!signal.is_aborted());
    }

    #[test]
    fn test_emit_without_subscribers_does_not_fail() {
        let progress = ProgressReporter::new();
        progress.emit(50.0);
        progress.interrupted();
    }

    #[tokio::test]
    async fn test_step_reports_percentage() {
        let progress = ProgressReporter::new();
        let mut rx = progress.subscribe();

        progress.step(1, 4);
        progress.step(4, 4);
        progress.step(1, 0);

        assert_eq!(rx.recv().await.unwrap().percentage, 25.0);
        assert_eq!(rx.recv().await.unwrap().percentage, 100.0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_complete_is_sent_once() {
        let progress = ProgressReporter::new();
        let mut rx = progress.subscribe();

        progress.emit(0.0);
        progress.complete();
        progress.step(2, 2);
        progress.complete();

        let percentages: Vec<f64> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.percentage)
            .collect();
        assert_eq!(percentages, vec![0.0, 100.0, 100.0]);
    }

    #[tokio::test]
    async fn test_interrupted_event() {
        let progress = ProgressReporter::new();
        let mut rx = progress.subscribe();

        progress.interrupted();

        let event = rx.recv().await.unwrap();
        assert!(event.interrupted);
        assert!(event.percentage.is_nan());

        let json = serde_json::to_string(&event).unwrap();
        let parsed: ProgressEvent = serde_json::from_str(&json).unwrap();
        assert!(parsed.interrupted);
        assert!(parsed.percentage.is_nan());
    }
}
