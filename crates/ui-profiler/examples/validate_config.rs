use std::env;
use std::path::PathBuf;

use ui_profiler::config::Config;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let config_path = if args.len() > 1 {
        PathBuf::from(&args[1])
    } else {
        PathBuf::from("crates/ui-profiler/configs/isolation.toml")
    };

    println!("Validating config file: {}", config_path.display());

    let config = Config::from_file(&config_path)?;

    println!("\n✓ Successfully parsed configuration!");
    println!("\nBenchmark: {}", config.run.benchmark);
    println!("Scenario: {}", config.run.scenario);
    println!("Repeats: {}", config.run.repeats);

    println!("\nProfiling:");
    println!("  Sample interval: {}ms", config.profile.sample_interval);
    println!("  Max buffer size: {}", config.profile.max_buffer_size);
    println!("  Scale: {:?}", config.profile.scale);

    println!("\nIsolation:");
    println!("  Grouping: {:?}", config.isolation.grouping);
    println!(
        "  Blocks: {}..={}",
        config.isolation.min_blocks, config.isolation.max_blocks
    );

    println!("\nScenario options ({}):", config.scenarios.len());
    for (id, options) in &config.scenarios {
        println!("  {}: {}", id, config.scenario_options(id)?);
        if options.is_empty() {
            println!("    (empty)");
        }
    }

    println!("\n✓ All validations passed!");

    Ok(())
}
