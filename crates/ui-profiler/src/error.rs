use std::fmt;

use thiserror::Error;

/// Scenario lifecycle hooks other than `run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleHook {
    SetupSuite,
    CleanupSuite,
    Setup,
    Cleanup,
}

impl fmt::Display for LifecycleHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleHook::SetupSuite => "setup_suite",
            LifecycleHook::CleanupSuite => "cleanup_suite",
            LifecycleHook::Setup => "setup",
            LifecycleHook::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum ProfilerError {
    /// A lifecycle hook failed; only `run` failures are isolated per repeat.
    #[error("Scenario hook `{hook}` failed: {source:#}")]
    Lifecycle {
        hook: LifecycleHook,
        #[source]
        source: anyhow::Error,
    },

    #[error("Sampling profiler is not available in this host")]
    ProfilerUnavailable,

    #[error("Sampling profiler failed: {0:#}")]
    Profiler(#[source] anyhow::Error),

    #[error("Host isolation failed: {0:#}")]
    Isolation(#[source] anyhow::Error),

    #[error("Benchmark with id `{0}` not found")]
    UnknownBenchmark(String),

    #[error("Scenario with id `{0}` not found")]
    UnknownScenario(String),

    #[error("Invalid benchmark options: {0}")]
    InvalidOptions(#[from] serde_json::Error),

    #[error("Scenario rejected options: {0:#}")]
    ScenarioOptions(#[source] anyhow::Error),
}

impl ProfilerError {
    pub(crate) fn lifecycle(hook: LifecycleHook) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| ProfilerError::Lifecycle { hook, source }
    }
}

pub type Result<T> = std::result::Result<T, ProfilerError>;
