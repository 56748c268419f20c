//! The unit of UI work being measured
//!
//! A scenario is supplied by the host: opening a menu, switching tabs,
//! scrolling an editor. The profiler only drives its lifecycle:
//!
//! ```text
//! setup_suite
//!   ┌─ setup ─ run (timed) ─ cleanup ─┐  × n
//!   └─────────────────────────────────┘
//! cleanup_suite
//! ```
//!
//! Every hook except [`Scenario::run`] is optional and defaults to a no-op.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait Scenario: Send {
    /// Unique identifier used to look the scenario up in the registry.
    fn id(&self) -> &str;

    /// Name displayed to users.
    fn name(&self) -> &str;

    /// Receive user options before a benchmark starts.
    fn set_options(&mut self, _options: &Value) -> Result<()> {
        Ok(())
    }

    /// Prepare once per benchmark invocation.
    async fn setup_suite(&mut self) -> Result<()> {
        Ok(())
    }

    /// Clean up once per benchmark invocation.
    async fn cleanup_suite(&mut self) -> Result<()> {
        Ok(())
    }

    /// Prepare before each repeat, outside the timed region.
    async fn setup(&mut self) -> Result<()> {
        Ok(())
    }

    /// Clean up after each repeat, outside the timed region. Called even when
    /// `run` failed.
    async fn cleanup(&mut self) -> Result<()> {
        Ok(())
    }

    /// The timed unit of work.
    ///
    /// All asynchronous work started here must be awaited before returning,
    /// otherwise it is not measured and may overlap with `cleanup`.
    async fn run(&mut self) -> Result<()>;
}
