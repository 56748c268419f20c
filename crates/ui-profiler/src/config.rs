//! Configuration parsing for profiler runs
//!
//! This module provides TOML-based configuration selecting which benchmark to
//! run against which scenario, with the options of each benchmark kind and
//! free-form per-scenario options.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::benchmarks::isolation::Grouping;
use crate::profiling::ProfileScale;

/// Main configuration structure loaded from TOML files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Which benchmark to run on which scenario
    pub run: RunConfig,
    /// Sampling profiler settings for the `self-profile` benchmark
    #[serde(default)]
    pub profile: ProfileConfig,
    /// Settings for the `isolation` benchmark
    #[serde(default)]
    pub isolation: IsolationConfig,
    /// Options handed to scenarios, keyed by scenario id
    #[serde(default)]
    pub scenarios: BTreeMap<String, toml::Table>,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML is malformed
    /// - Required fields are missing
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ui_profiler::config::Config;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = Config::from_file("profiler.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Example
    ///
    /// ```
    /// use ui_profiler::config::Config;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let toml = r#"
    ///     [run]
    ///     benchmark = "execution-time"
    ///     scenario = "menu-open"
    /// "#;
    /// let config = Config::from_str(toml)?;
    /// assert_eq!(config.run.repeats, 3);
    /// # Ok(())
    /// # }
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no benchmark can run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.run.repeats == 0 {
            anyhow::bail!("run.repeats must be at least 1");
        }
        if self.profile.sample_interval.is_nan() || self.profile.sample_interval <= 0.0 {
            anyhow::bail!(
                "profile.sample_interval must be positive (got {})",
                self.profile.sample_interval
            );
        }
        if self.isolation.min_blocks == 0 {
            anyhow::bail!("isolation.min_blocks must be at least 1");
        }
        if self.isolation.min_blocks > self.isolation.max_blocks {
            anyhow::bail!(
                "isolation.min_blocks ({}) exceeds isolation.max_blocks ({})",
                self.isolation.min_blocks,
                self.isolation.max_blocks
            );
        }
        Ok(())
    }

    /// Options object for the configured benchmark.
    ///
    /// Carries the keys of every benchmark kind; each kind reads the ones it
    /// understands.
    pub fn benchmark_options(&self) -> Value {
        json!({
            "repeats": self.run.repeats,
            "sampleInterval": self.profile.sample_interval,
            "maxBufferSize": self.profile.max_buffer_size,
            "scale": self.profile.scale,
            "grouping": self.isolation.grouping,
            "minBlocks": self.isolation.min_blocks,
            "maxBlocks": self.isolation.max_blocks,
        })
    }

    /// Options object for a scenario; empty when the scenario has no section.
    pub fn scenario_options(&self, id: &str) -> anyhow::Result<Value> {
        match self.scenarios.get(id) {
            Some(table) => serde_json::to_value(table)
                .with_context(|| format!("Failed to convert options of scenario '{}'", id)),
            None => Ok(Value::Object(Default::default())),
        }
    }
}

/// Benchmark and scenario selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Benchmark id, e.g. `execution-time`
    pub benchmark: String,
    /// Scenario id as registered by the host
    pub scenario: String,
    /// Number of repeats per measurement (default: 3)
    #[serde(default = "default_repeats")]
    pub repeats: usize,
}

fn default_repeats() -> usize {
    3
}

/// Sampling profiler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Requested sampling interval in milliseconds (default: 10)
    #[serde(default = "default_sample_interval")]
    pub sample_interval: f64,
    /// Maximum samples per session (default: 10000)
    #[serde(default = "default_max_buffer_size")]
    pub max_buffer_size: usize,
    /// Session per repeat (`micro`) or per run (`macro`)
    #[serde(default)]
    pub scale: ProfileScale,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            sample_interval: default_sample_interval(),
            max_buffer_size: default_max_buffer_size(),
            scale: ProfileScale::default(),
        }
    }
}

fn default_sample_interval() -> f64 {
    10.0
}

fn default_max_buffer_size() -> usize {
    10_000
}

/// Isolation benchmark configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationConfig {
    /// Disable targets one at a time or in blocks
    #[serde(default)]
    pub grouping: Grouping,
    /// Smallest number of blocks to split targets into (default: 2)
    #[serde(default = "default_min_blocks")]
    pub min_blocks: usize,
    /// Largest number of blocks to split targets into (default: 5)
    #[serde(default = "default_max_blocks")]
    pub max_blocks: usize,
}

impl Default for IsolationConfig {
    fn default() -> Self {
        Self {
            grouping: Grouping::default(),
            min_blocks: default_min_blocks(),
            max_blocks: default_max_blocks(),
        }
    }
}

fn default_min_blocks() -> usize {
    2
}

fn default_max_blocks() -> usize {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
            [run]
            benchmark = "execution-time"
            scenario = "menu-open"
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.run.benchmark, "execution-time");
        assert_eq!(config.run.scenario, "menu-open");
        assert_eq!(config.run.repeats, 3);
        assert_eq!(config.profile.sample_interval, 10.0);
        assert_eq!(config.profile.max_buffer_size, 10_000);
        assert_eq!(config.profile.scale, ProfileScale::Micro);
        assert_eq!(config.isolation.grouping, Grouping::Each);
        assert_eq!(config.isolation.min_blocks, 2);
        assert_eq!(config.isolation.max_blocks, 5);
        assert!(config.scenarios.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [run]
            benchmark = "self-profile"
            scenario = "tabs"
            repeats = 10

            [profile]
            sample_interval = 1.0
            max_buffer_size = 5000
            scale = "macro"

            [isolation]
            grouping = "blocks"
            min_blocks = 3
            max_blocks = 4

            [scenarios.tabs]
            tabs = ["a.ipynb", "b.ipynb"]
            focus = true
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.run.repeats, 10);
        assert_eq!(config.profile.sample_interval, 1.0);
        assert_eq!(config.profile.max_buffer_size, 5000);
        assert_eq!(config.profile.scale, ProfileScale::Macro);
        assert_eq!(config.isolation.grouping, Grouping::Blocks);
        assert_eq!(config.isolation.min_blocks, 3);
        assert_eq!(config.isolation.max_blocks, 4);

        let options = config.scenario_options("tabs").unwrap();
        assert_eq!(options["tabs"][1], "b.ipynb");
        assert_eq!(options["focus"], true);
    }

    #[test]
    fn test_benchmark_options_use_camel_case_keys() {
        let config = Config::from_str(
            r#"
            [run]
            benchmark = "self-profile"
            scenario = "tabs"
            "#,
        )
        .unwrap();

        let options = config.benchmark_options();
        assert_eq!(options["repeats"], 3);
        assert_eq!(options["sampleInterval"], 10.0);
        assert_eq!(options["maxBufferSize"], 10_000);
        assert_eq!(options["scale"], "micro");
        assert_eq!(options["grouping"], "each");
    }

    #[test]
    fn test_missing_scenario_options_are_empty() {
        let config = Config::from_str(
            r#"
            [run]
            benchmark = "execution-time"
            scenario = "menu-open"
            "#,
        )
        .unwrap();
        assert_eq!(config.scenario_options("menu-open").unwrap(), json!({}));
    }

    #[test]
    fn test_rejects_zero_repeats() {
        let toml = r#"
            [run]
            benchmark = "execution-time"
            scenario = "menu-open"
            repeats = 0
        "#;
        assert!(Config::from_str(toml).is_err());
    }

    #[test]
    fn test_rejects_inverted_block_range() {
        let toml = r#"
            [run]
            benchmark = "isolation"
            scenario = "menu-open"

            [isolation]
            min_blocks = 6
            max_blocks = 2
        "#;
        let error = Config::from_str(toml).unwrap_err();
        assert!(error.to_string().contains("min_blocks"));
    }

    #[test]
    fn test_rejects_missing_run_section() {
        assert!(Config::from_str("[profile]\nsample_interval = 2.0\n").is_err());
    }
}
