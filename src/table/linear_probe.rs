//! Open addressing with linear probing. Deleted slots become tombstones so
//! probe sequences laid down before the delete stay intact.
use super::*;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Slot {
    #[default]
    Empty,
    Occupied(Box<str>),
    Tombstone,
}

impl Slot {
    fn holds(&self, id: &str) -> bool {
        matches!(self, Slot::Occupied(stored) if **stored == *id)
    }
}

pub struct ProbingTable {
    deriver: KeyDeriver,
    slots: Vec<Slot>,
    len: usize,
    collisions: u64,
    comparisons: u64,
}

/// Where a probe for some identifier ended.
enum Probe {
    /// Live slot holding the identifier.
    Found(usize),
    /// Not present; `free` is the first reusable slot on the sequence, if any.
    Missing { free: Option<usize> },
}

impl ProbingTable {
    pub fn new(config: TableConfig) -> Self {
        check_capacity(&config);
        ProbingTable {
            deriver: KeyDeriver::new(config.policy),
            slots: vec![Slot::Empty; config.capacity],
            len: 0,
            collisions: 0,
            comparisons: 0,
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Walks the probe sequence of `id` starting at `home`. Returns where it
    /// ended and how many non-empty slots were examined.
    fn probe(&self, id: &str, home: usize) -> (Probe, u64) {
        let capacity = self.slots.len();
        let mut first_tombstone = None;
        let mut examined = 0;
        for step in 0..capacity {
            let i = (home + step) % capacity;
            match &self.slots[i] {
                Slot::Empty => {
                    let free = first_tombstone.or(Some(i));
                    return (Probe::Missing { free }, examined);
                }
                Slot::Tombstone => {
                    examined += 1;
                    if first_tombstone.is_none() {
                        first_tombstone = Some(i);
                    }
                }
                slot => {
                    examined += 1;
                    if slot.holds(id) {
                        return (Probe::Found(i), examined);
                    }
                }
            }
        }
        log::debug!("probe for {id} wrapped all {capacity} slots");
        (
            Probe::Missing {
                free: first_tombstone,
            },
            examined,
        )
    }
}

impl CollisionTable for ProbingTable {
    fn insert(&mut self, id: &str) -> Result<(), TableError> {
        let home = self.deriver.slot(id, self.slots.len())?;
        if matches!(self.slots[home], Slot::Occupied(_)) {
            self.collisions += 1;
        }
        match self.probe(id, home).0 {
            Probe::Found(_) => Ok(()),
            Probe::Missing { free: Some(i) } => {
                self.slots[i] = Slot::Occupied(id.into());
                self.len += 1;
                Ok(())
            }
            Probe::Missing { free: None } => Err(TableError::CapacityExhausted {
                capacity: self.slots.len(),
            }),
        }
    }

    fn search(&mut self, id: &str) -> Result<Search, TableError> {
        let home = self.deriver.slot(id, self.slots.len())?;
        let (probe, comparisons) = self.probe(id, home);
        self.comparisons += comparisons;
        Ok(match probe {
            Probe::Found(_) => Search::hit(comparisons),
            Probe::Missing { .. } => Search::miss(comparisons),
        })
    }

    fn delete(&mut self, id: &str) -> Result<bool, TableError> {
        let home = self.deriver.slot(id, self.slots.len())?;
        match self.probe(id, home).0 {
            Probe::Found(i) => {
                self.slots[i] = Slot::Tombstone;
                self.len -= 1;
                Ok(true)
            }
            Probe::Missing { .. } => Ok(false),
        }
    }

    fn total_collisions(&self) -> u64 {
        self.collisions
    }

    fn total_comparisons(&self) -> u64 {
        self.comparisons
    }

    fn len(&self) -> usize {
        self.len
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occupied(id: &str) -> Slot {
        Slot::Occupied(id.into())
    }

    #[test]
    fn colliding_insert_probes_to_next_slot() {
        let mut table = ProbingTable::new(TableConfig::new(4, KeyPolicy::Sum));
        // raw keys 2, 4, 10 -> home slots 2, 0, 2
        table.insert("00001-0000001-1").unwrap();
        table.insert("00002-0000002-2").unwrap();
        table.insert("00005-0000005-5").unwrap();
        assert_eq!(
            table.slots(),
            &[
                occupied("00002-0000002-2"),
                Slot::Empty,
                occupied("00001-0000001-1"),
                occupied("00005-0000005-5"),
            ]
        );
        assert_eq!(table.total_collisions(), 1);
        assert_eq!(table.search("00005-0000005-5").unwrap(), Search::hit(2));
    }

    #[test]
    fn probe_wraps_around_the_end() {
        let mut table = ProbingTable::new(TableConfig::new(4, KeyPolicy::Sum));
        // both home at slot 3
        table.insert("00001-0000002-0").unwrap();
        table.insert("00002-0000001-0").unwrap();
        assert_eq!(table.slots()[0], occupied("00002-0000001-0"));
        assert_eq!(table.search("00002-0000001-0").unwrap(), Search::hit(2));
    }

    #[test]
    fn reinsert_is_idempotent() {
        let mut table = ProbingTable::new(TableConfig::new(8, KeyPolicy::Sum));
        table.insert("00001-0000001-1").unwrap();
        table.insert("00001-0000001-1").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table
                .slots()
                .iter()
                .filter(|s| matches!(s, Slot::Occupied(_)))
                .count(),
            1
        );
    }

    #[test]
    fn reinsert_behind_a_tombstone_does_not_duplicate() {
        let mut table = ProbingTable::new(TableConfig::new(8, KeyPolicy::Sum));
        // all three home at slot 2
        let (a, b, c) = ("00001-0000001-0", "00002-0000000-0", "00000-0000002-0");
        for id in [a, b, c] {
            table.insert(id).unwrap();
        }
        assert!(table.delete(a).unwrap());
        assert_eq!(table.slots()[2], Slot::Tombstone);

        // c is still reachable past the tombstone
        assert_eq!(table.search(c).unwrap(), Search::hit(3));
        table.insert(c).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.slots()[2], Slot::Tombstone);

        // a fresh id reuses the tombstone
        table.insert(a).unwrap();
        assert_eq!(table.slots()[2], occupied(a));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn search_stops_at_empty_and_counts_tombstones() {
        let mut table = ProbingTable::new(TableConfig::new(8, KeyPolicy::Sum));
        let (a, b) = ("00001-0000001-0", "00002-0000000-0");
        table.insert(a).unwrap();
        table.insert(b).unwrap();
        table.delete(a).unwrap();
        assert_eq!(table.search(a).unwrap(), Search::miss(2));
        assert_eq!(table.search(b).unwrap(), Search::hit(2));
        // home slot 5 was never used
        assert_eq!(table.search("00002-0000003-0").unwrap(), Search::miss(0));
        assert_eq!(table.total_comparisons(), 4);
    }

    #[test]
    fn delete_then_search() {
        let mut table = ProbingTable::new(TableConfig::with_capacity(16));
        table.insert("12345-6789012-3").unwrap();
        assert!(table.delete("12345-6789012-3").unwrap());
        assert!(!table.delete("12345-6789012-3").unwrap());
        assert!(!table.search("12345-6789012-3").unwrap().found);
        assert!(table.is_empty());
    }

    #[test]
    fn full_table_reports_capacity_exhausted() {
        let capacity = 4;
        let mut table = ProbingTable::new(TableConfig::new(capacity, KeyPolicy::Sum));
        let ids: Vec<String> = (0..=capacity).map(|i| format!("{i:05}-0000000-0")).collect();
        for id in &ids[..capacity] {
            table.insert(id).unwrap();
        }
        assert_eq!(
            table.insert(&ids[capacity]),
            Err(TableError::CapacityExhausted { capacity })
        );
        assert_eq!(table.len(), capacity);
        // a miss in a full table examines every slot and terminates
        assert_eq!(table.search(&ids[capacity]).unwrap(), Search::miss(4));
        // already present ids are still accepted
        table.insert(&ids[0]).unwrap();
    }

    #[test]
    fn full_table_of_tombstones_is_reusable() {
        let mut table = ProbingTable::new(TableConfig::new(2, KeyPolicy::Sum));
        table.insert("00000-0000000-0").unwrap();
        table.insert("00001-0000000-0").unwrap();
        table.delete("00000-0000000-0").unwrap();
        table.delete("00001-0000000-0").unwrap();
        assert_eq!(table.search("00002-0000000-0").unwrap(), Search::miss(2));
        table.insert("00002-0000000-0").unwrap();
        assert_eq!(table.slots()[0], occupied("00002-0000000-0"));
    }
}
