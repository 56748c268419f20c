//! Capabilities the embedding host provides to the profiler
//!
//! The controller never reads wall-clock time or waits on rendering directly.
//! It goes through these traits so that hosts (and tests) decide what "now"
//! and "layout settled" mean.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

/// Monotonic, high-resolution clock reporting milliseconds.
pub trait Clock: Send + Sync {
    /// Milliseconds elapsed since an arbitrary fixed origin.
    fn now(&self) -> f64;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

/// [`Clock`] backed by [`std::time::Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Signal that the host finished laying out and painting pending changes.
///
/// Benchmark kinds await it between phases (after suite setup, after
/// disabling an isolation target) so that work queued by one phase is not
/// billed to the next.
#[async_trait]
pub trait LayoutSignal: Send + Sync {
    async fn layout_ready(&self);
}

/// [`LayoutSignal`] for hosts without a render loop: yields to the runtime once.
#[derive(Debug, Clone, Copy, Default)]
pub struct YieldLayout;

#[async_trait]
impl LayoutSignal for YieldLayout {
    async fn layout_ready(&self) {
        tokio::task::yield_now().await;
    }
}
