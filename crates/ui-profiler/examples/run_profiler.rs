//! Profile a synthetic scenario from a TOML config file
//!
//! Usage: cargo run -p ui-profiler --example run_profiler -- [config.toml]
//!
//! Without an argument the bundled `configs/isolation.toml` is used. Set
//! `RUST_LOG=ui_profiler=debug` to follow each repeat.

use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use ui_profiler::benchmarks::{IsolationBenchmark, IsolationSource, IsolationTarget};
use ui_profiler::reporter::{OutputFormat, Reporter};
use ui_profiler::{Config, Scenario, UiProfiler};

/// Work the scenario performs; each feature can be switched off.
#[derive(Debug)]
struct Feature {
    name: &'static str,
    /// Extra sort passes while enabled.
    passes: usize,
    enabled: AtomicBool,
}

/// Sorts a list, once plus once more per enabled feature.
struct SortList {
    size: usize,
    features: Arc<Vec<Feature>>,
    data: Vec<u64>,
}

#[async_trait]
impl Scenario for SortList {
    fn id(&self) -> &str {
        "sort-list"
    }

    fn name(&self) -> &str {
        "Sort a list"
    }

    fn set_options(&mut self, options: &Value) -> Result<()> {
        if let Some(size) = options.get("size").and_then(Value::as_u64) {
            self.size = size as usize;
        }
        Ok(())
    }

    async fn setup(&mut self) -> Result<()> {
        // xorshift keeps the input identical between repeats
        let mut state = 0x2545_f491_4f6c_dd1d_u64;
        self.data = (0..self.size)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                state
            })
            .collect();
        Ok(())
    }

    async fn run(&mut self) -> Result<()> {
        let passes = 1 + self
            .features
            .iter()
            .filter(|f| f.enabled.load(Ordering::SeqCst))
            .map(|f| f.passes)
            .sum::<usize>();
        for _ in 0..passes {
            let mut copy = self.data.clone();
            copy.sort_unstable();
            tokio::task::yield_now().await;
        }
        Ok(())
    }
}

struct FeatureToggle {
    features: Arc<Vec<Feature>>,
    index: usize,
}

#[async_trait]
impl IsolationTarget for FeatureToggle {
    fn label(&self) -> String {
        self.features[self.index].name.to_string()
    }

    async fn disable(&mut self) -> Result<()> {
        self.features[self.index].enabled.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn restore(&mut self) -> Result<()> {
        self.features[self.index].enabled.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct Features(Arc<Vec<Feature>>);

#[async_trait]
impl IsolationSource for Features {
    async fn collect(&self) -> Result<Vec<Box<dyn IsolationTarget>>> {
        Ok((0..self.0.len())
            .map(|index| {
                Box::new(FeatureToggle {
                    features: self.0.clone(),
                    index,
                }) as Box<dyn IsolationTarget>
            })
            .collect())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/configs/isolation.toml")));

    println!("Loading config from: {}", config_path.display());
    let config = Config::from_file(&config_path)?;

    let features = Arc::new(
        [("syntax-highlight", 3), ("minimap", 1), ("spellcheck", 2)]
            .into_iter()
            .map(|(name, passes)| Feature {
                name,
                passes,
                enabled: AtomicBool::new(true),
            })
            .collect::<Vec<_>>(),
    );

    let mut profiler = UiProfiler::default();
    profiler.add_benchmark(Arc::new(IsolationBenchmark::new(Arc::new(Features(
        features.clone(),
    )))));
    profiler.add_scenario(Box::new(SortList {
        size: 10_000,
        features,
        data: Vec::new(),
    }));

    let record = profiler.run_configured(&config).await?;
    Reporter::new(OutputFormat::Console).report(&record)?;

    Ok(())
}
