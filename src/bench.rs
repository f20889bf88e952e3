//! Drives table strategies over a workload and aggregates the counters.
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use rayon::prelude::*;

use crate::workload::Workload;
use crate::{CollisionTable, StrategyDetail, TableConfig, TableError};

#[derive(Clone, Debug, PartialEq)]
pub struct RunStats {
    pub strategy: String,
    pub inserts: usize,
    pub deletes: usize,
    pub searches: usize,
    /// Searches that found their identifier.
    pub found: usize,
    /// Deletes that removed something.
    pub removed: usize,
    pub collisions: u64,
    pub comparisons: u64,
    /// Operations rejected with a [`TableError`] and skipped.
    pub failed_ops: usize,
    pub elapsed: Duration,
}

impl RunStats {
    pub fn avg_collisions(&self) -> f64 {
        average(self.collisions, self.inserts)
    }

    pub fn avg_comparisons(&self) -> f64 {
        average(self.comparisons, self.searches)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "strategy": self.strategy,
            "inserts": self.inserts,
            "deletes": self.deletes,
            "searches": self.searches,
            "found": self.found,
            "removed": self.removed,
            "collisions": self.collisions,
            "avg_collisions": self.avg_collisions(),
            "comparisons": self.comparisons,
            "avg_comparisons": self.avg_comparisons(),
            "failed_ops": self.failed_ops,
            "micros": self.elapsed.as_micros() as u64,
        })
    }
}

fn average(total: u64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

/// Inserts, then deletes, then searches. Failed operations are logged and
/// skipped. Counters are read from the table, so pass a fresh one.
pub fn run(name: &str, table: &mut dyn CollisionTable, workload: &Workload) -> RunStats {
    let start = Instant::now();
    let mut failed_ops = 0;
    let mut skip = |op: &str, id: &str, err: TableError| {
        log::warn!("{name}: skipping {op} of {id}: {err}");
        failed_ops += 1;
    };

    for id in &workload.inserts {
        if let Err(err) = table.insert(id) {
            skip("insert", id, err);
        }
    }

    let mut removed = 0;
    for id in &workload.deletes {
        match table.delete(id) {
            Ok(true) => removed += 1,
            Ok(false) => {}
            Err(err) => skip("delete", id, err),
        }
    }

    let mut found = 0;
    for id in &workload.searches {
        match table.search(id) {
            Ok(search) if search.found => found += 1,
            Ok(_) => {}
            Err(err) => skip("search", id, err),
        }
    }

    let elapsed = start.elapsed();
    log::info!(
        "{name}: {} entries in {} slots, {} collisions, {} comparisons in {elapsed:?}",
        table.len(),
        table.capacity(),
        table.total_collisions(),
        table.total_comparisons(),
    );

    RunStats {
        strategy: name.to_owned(),
        inserts: workload.inserts.len(),
        deletes: workload.deletes.len(),
        searches: workload.searches.len(),
        found,
        removed,
        collisions: table.total_collisions(),
        comparisons: table.total_comparisons(),
        failed_ops,
        elapsed,
    }
}

/// Runs every strategy on a fresh table, in registry order.
pub fn run_all(
    strategies: &IndexMap<&'static str, StrategyDetail>,
    config: TableConfig,
    workload: &Workload,
    parallel: bool,
) -> Vec<RunStats> {
    let run_one = |(name, detail): (&&'static str, &StrategyDetail)| {
        let mut table = (detail.build)(config);
        run(name, table.as_mut(), workload)
    };
    if parallel {
        let entries: Vec<_> = strategies.iter().collect();
        entries.into_par_iter().map(run_one).collect()
    } else {
        strategies.iter().map(run_one).collect()
    }
}
