pub use crate::*;

pub mod bst_chain;
pub mod linear_probe;
pub mod list_chain;

/// Outcome of a single lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Search {
    pub found: bool,
    /// Stored entries compared against, the deciding one included.
    /// Empty buckets and empty slots are not counted.
    pub comparisons: u64,
}

impl Search {
    pub(crate) fn hit(comparisons: u64) -> Self {
        Search {
            found: true,
            comparisons,
        }
    }

    pub(crate) fn miss(comparisons: u64) -> Self {
        Search {
            found: false,
            comparisons,
        }
    }
}

/// A fixed-capacity table of identifiers with one collision strategy.
///
/// Counters accumulate over the table's lifetime.
pub trait CollisionTable: Send {
    fn insert(&mut self, id: &str) -> Result<(), TableError>;

    /// Looks `id` up and adds the comparisons made to [`total_comparisons`].
    ///
    /// [`total_comparisons`]: CollisionTable::total_comparisons
    fn search(&mut self, id: &str) -> Result<Search, TableError>;

    /// Removes `id`, returning whether it was present.
    fn delete(&mut self, id: &str) -> Result<bool, TableError>;

    /// Inserts that found their bucket or home slot already holding an entry.
    fn total_collisions(&self) -> u64;

    fn total_comparisons(&self) -> u64;

    /// Live entries, duplicates included for variants that keep them.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of buckets or slots, fixed at construction.
    fn capacity(&self) -> usize;

    fn boxed(self) -> Box<dyn CollisionTable>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}

pub(crate) fn check_capacity(config: &TableConfig) {
    assert!(config.capacity > 0, "table capacity must be > 0");
}
