//! Performance profiler for interactive UI scenarios
//!
//! This crate measures how long host-defined UI scenarios take, and where
//! that time goes. A scenario (opening a menu, switching tabs) is repeated a
//! fixed number of times under one of several benchmark kinds.
//!
//! # Features
//!
//! - **Execution time**: Wall-clock time of each repeat, failures isolated
//! - **Sampling profiles**: Per-repeat or whole-run traces from a host profiler,
//!   reduced to per-function on-stack time
//! - **Isolation**: Timings with host parts disabled, against a reference
//! - **Robust statistics**: Interquartile mean and quartiles from
//!   [`profiler_stats`]
//! - **Cancellation and progress**: Cooperative abort between repeats and a
//!   broadcast progress channel
//!
//! # Example
//!
//! ```no_run
//! use ui_profiler::profiler::{RunRequest, UiProfiler};
//! use ui_profiler::reporter::{OutputFormat, Reporter};
//! use ui_profiler::scenario::Scenario;
//!
//! # async fn example(scenario: Box<dyn Scenario>) -> anyhow::Result<()> {
//! let mut profiler = UiProfiler::default();
//! profiler.add_scenario(scenario);
//!
//! let record = profiler
//!     .run_benchmark(RunRequest::new("menu-open"), RunRequest::new("execution-time"))
//!     .await?;
//!
//! Reporter::new(OutputFormat::Console).report(&record)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! Runs can also be described in TOML and started with
//! [`UiProfiler::run_configured`]:
//!
//! ```toml
//! [run]
//! benchmark = "self-profile"
//! scenario = "menu-open"
//! repeats = 5
//!
//! [profile]
//! sample_interval = 10.0
//! scale = "macro"
//!
//! [scenarios.menu-open]
//! menu = "file"
//! ```

pub mod benchmarks;
pub mod config;
pub mod control;
pub mod error;
pub mod host;
pub mod measurement;
pub mod profiler;
pub mod profiling;
pub mod reporter;
pub mod runner;
pub mod scenario;
pub mod summary;

// Re-export main types for convenience
pub use config::Config;
pub use error::{ProfilerError, Result};
pub use measurement::Outcome;
pub use profiler::{BenchmarkRecord, RunRequest, UiProfiler};
pub use reporter::{OutputFormat, Reporter};
pub use runner::BenchmarkRunner;
pub use scenario::Scenario;
