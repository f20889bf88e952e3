use anyhow::Context;
use collision_gym::bench::{self, RunStats};
use collision_gym::workload::{Workload, WorkloadConfig};
use collision_gym::{strategies, KeyPolicy, TableConfig, DEFAULT_TABLE_SIZE};
use indexmap::IndexMap;

use std::io::Write;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut strategies = strategies();

    let mut args = pico_args::Arguments::from_env();

    let strategy_name: String = args
        .opt_value_from_str("--strategy")?
        .unwrap_or_else(|| "all".into());
    if strategy_name == "print" {
        for name in strategies.keys() {
            println!("{}", name);
        }
        return Ok(());
    }

    let table_config = TableConfig {
        capacity: args
            .opt_value_from_str("--size")?
            .unwrap_or(DEFAULT_TABLE_SIZE),
        policy: args
            .opt_value_from_str::<_, KeyPolicy>("--policy")?
            .unwrap_or_default(),
    };
    let defaults = WorkloadConfig::default();
    let workload_config = WorkloadConfig {
        inserts: args
            .opt_value_from_str("--inserts")?
            .unwrap_or(defaults.inserts),
        deletes: args
            .opt_value_from_str("--deletes")?
            .unwrap_or(defaults.deletes),
        searches: args
            .opt_value_from_str("--searches")?
            .unwrap_or(defaults.searches),
        hit_ratio: args
            .opt_value_from_str("--hit-ratio")?
            .unwrap_or(defaults.hit_ratio),
        seed: args.opt_value_from_str("--seed")?,
    };
    let parallel = args.contains("--parallel");
    let out_filename: Option<PathBuf> = args.opt_value_from_str("--out")?;

    let rest = args.finish();
    anyhow::ensure!(rest.is_empty(), "Unknown arguments: {:?}", rest);
    anyhow::ensure!(table_config.capacity > 0, "--size must be at least 1");
    anyhow::ensure!(
        (0.0..=1.0).contains(&workload_config.hit_ratio),
        "--hit-ratio must be within [0, 1], got {}",
        workload_config.hit_ratio
    );

    if strategy_name != "all" {
        let (name, detail) = strategies
            .swap_remove_entry(strategy_name.as_str())
            .with_context(|| {
                format!(
                    "Unknown strategy {strategy_name}, expected one of: all, print, {}",
                    strategies.keys().copied().collect::<Vec<_>>().join(", ")
                )
            })?;
        strategies = IndexMap::from([(name, detail)]);
    }

    log::info!(
        "Running {} strategies with {} slots, key policy {}",
        strategies.len(),
        table_config.capacity,
        table_config.policy
    );
    let workload = Workload::generate(&workload_config);
    let results = bench::run_all(&strategies, table_config, &workload, parallel);

    print_report(&workload, &results);

    if let Some(out_filename) = out_filename {
        let mut out_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&out_filename)
            .with_context(|| format!("Failed to open {}", out_filename.display()))?;
        for stats in &results {
            let mut line = stats.to_json();
            line["seed"] = workload.seed.into();
            line["size"] = table_config.capacity.into();
            line["policy"] = table_config.policy.to_string().into();
            writeln!(out_file, "{}", line)
                .with_context(|| format!("Failed to write {}", out_filename.display()))?;
        }
    }

    Ok(())
}

fn print_report(workload: &Workload, results: &[RunStats]) {
    println!(
        "# seed {}, {} distinct of {} inserted ids",
        workload.seed,
        workload.distinct_inserts(),
        workload.inserts.len()
    );
    println!("strategy, collisions, avg collisions, comparisons, avg comparisons, found, failed, time (us)");
    for stats in results {
        println!(
            "{name:14}\t {col:6}\t {avg_col:8.4}\t {cmp:6}\t {avg_cmp:8.4}\t {found:5}\t {failed:5}\t {us:8}",
            name = stats.strategy,
            col = stats.collisions,
            avg_col = stats.avg_collisions(),
            cmp = stats.comparisons,
            avg_cmp = stats.avg_comparisons(),
            found = stats.found,
            failed = stats.failed_ops,
            us = stats.elapsed.as_micros(),
        );
    }
}
