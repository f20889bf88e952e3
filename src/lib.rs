pub mod bench;
pub mod key;
pub mod table;
pub mod workload;


use indexmap::IndexMap;
use thiserror::Error;

pub use key::{reduce, KeyDeriver, KeyPolicy};
pub use table::{
    bst_chain::ChainedBstTable, linear_probe::ProbingTable, list_chain::ChainedListTable,
    CollisionTable, Search,
};

/// Capacity used when none is configured.
pub const DEFAULT_TABLE_SIZE: usize = 1000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("malformed identifier {identifier:?}: {reason}")]
    MalformedIdentifier {
        identifier: String,
        reason: &'static str,
    },
    #[error("no free slot left after probing all {capacity} slots")]
    CapacityExhausted { capacity: usize },
}

/// Construction parameters shared by every table variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableConfig {
    pub capacity: usize,
    pub policy: KeyPolicy,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            capacity: DEFAULT_TABLE_SIZE,
            policy: KeyPolicy::default(),
        }
    }
}

impl TableConfig {
    pub fn new(capacity: usize, policy: KeyPolicy) -> Self {
        TableConfig { capacity, policy }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        TableConfig {
            capacity,
            ..Default::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Chaining,
    OpenAddressing,
}

pub struct StrategyDetail {
    pub build: fn(TableConfig) -> Box<dyn CollisionTable>,
    pub resolution: Resolution,
    /// Inserting an identifier twice stores it twice.
    pub keeps_duplicates: bool,
}

pub fn strategies() -> IndexMap<&'static str, StrategyDetail> {
    let strategies: IndexMap<&'static str, StrategyDetail> = [
        (
            "bst-chain",
            StrategyDetail {
                build: |config| ChainedBstTable::new(config).boxed(),
                resolution: Resolution::Chaining,
                keeps_duplicates: false,
            },
        ),
        (
            "list-chain",
            StrategyDetail {
                build: |config| ChainedListTable::new(config).boxed(),
                resolution: Resolution::Chaining,
                keeps_duplicates: true,
            },
        ),
        (
            "linear-probe",
            StrategyDetail {
                build: |config| ProbingTable::new(config).boxed(),
                resolution: Resolution::OpenAddressing,
                keeps_duplicates: false,
            },
        ),
    ]
    .into_iter()
    .collect();
    strategies
}
