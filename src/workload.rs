//! Synthetic identifier workloads.
use rand::{rngs::StdRng, seq::index, Rng, SeedableRng};
use rustc_hash::FxHashSet;

/// Random identifier in the `AAAAA-FFFFFFF-G` layout.
pub fn random_identifier<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "{:05}-{:07}-{}",
        rng.gen_range(0..100_000u32),
        rng.gen_range(0..10_000_000u32),
        rng.gen_range(0..10u32)
    )
}

#[derive(Clone, Debug, PartialEq)]
pub struct WorkloadConfig {
    pub inserts: usize,
    /// Inserted identifiers removed again before searching.
    pub deletes: usize,
    pub searches: usize,
    /// Probability that a search targets an inserted identifier.
    pub hit_ratio: f64,
    /// `None` draws a seed from the thread rng.
    pub seed: Option<u64>,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        WorkloadConfig {
            inserts: 1000,
            deletes: 0,
            searches: 100,
            hit_ratio: 0.0,
            seed: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Workload {
    pub seed: u64,
    pub inserts: Vec<String>,
    pub deletes: Vec<String>,
    pub searches: Vec<String>,
}

impl Workload {
    pub fn generate(config: &WorkloadConfig) -> Workload {
        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let mut rng = StdRng::seed_from_u64(seed);

        let inserts: Vec<String> = (0..config.inserts)
            .map(|_| random_identifier(&mut rng))
            .collect();

        let deletes = index::sample(&mut rng, inserts.len(), config.deletes.min(inserts.len()))
            .into_iter()
            .map(|i| inserts[i].clone())
            .collect();

        let hit_ratio = config.hit_ratio.clamp(0.0, 1.0);
        let searches = (0..config.searches)
            .map(|_| {
                if !inserts.is_empty() && rng.gen_bool(hit_ratio) {
                    inserts[rng.gen_range(0..inserts.len())].clone()
                } else {
                    random_identifier(&mut rng)
                }
            })
            .collect();

        log::info!(
            "Generated workload (seed={seed}): {} inserts, {} deletes, {} searches",
            config.inserts,
            config.deletes.min(config.inserts),
            config.searches
        );

        Workload {
            seed,
            inserts,
            deletes,
            searches,
        }
    }

    /// Distinct identifiers among the inserts.
    pub fn distinct_inserts(&self) -> usize {
        self.inserts
            .iter()
            .map(String::as_str)
            .collect::<FxHashSet<_>>()
            .len()
    }
}
