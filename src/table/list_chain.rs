//! Separate chaining where every bucket is a singly linked list with the most
//! recent insertion at the head. Duplicates are kept.
use super::*;

type Link = Option<Box<ListNode>>;

struct ListNode {
    id: Box<str>,
    next: Link,
}

pub struct ChainedListTable {
    deriver: KeyDeriver,
    buckets: Vec<Link>,
    len: usize,
    collisions: u64,
    comparisons: u64,
}

impl ChainedListTable {
    pub fn new(config: TableConfig) -> Self {
        check_capacity(&config);
        let mut buckets = Vec::with_capacity(config.capacity);
        buckets.resize_with(config.capacity, Default::default);
        ChainedListTable {
            deriver: KeyDeriver::new(config.policy),
            buckets,
            len: 0,
            collisions: 0,
            comparisons: 0,
        }
    }

    /// Identifiers of `id`'s bucket, head first.
    pub fn bucket(&self, id: &str) -> Result<Vec<&str>, TableError> {
        let slot = self.deriver.slot(id, self.buckets.len())?;
        let mut out = vec![];
        let mut cur = self.buckets[slot].as_deref();
        while let Some(node) = cur {
            out.push(&*node.id);
            cur = node.next.as_deref();
        }
        Ok(out)
    }
}

impl CollisionTable for ChainedListTable {
    fn insert(&mut self, id: &str) -> Result<(), TableError> {
        let slot = self.deriver.slot(id, self.buckets.len())?;
        let head = &mut self.buckets[slot];
        if head.is_some() {
            self.collisions += 1;
        }
        *head = Some(Box::new(ListNode {
            id: id.into(),
            next: head.take(),
        }));
        self.len += 1;
        Ok(())
    }

    fn search(&mut self, id: &str) -> Result<Search, TableError> {
        let slot = self.deriver.slot(id, self.buckets.len())?;
        let mut comparisons = 0;
        let mut cur = self.buckets[slot].as_deref();
        while let Some(node) = cur {
            comparisons += 1;
            if *node.id == *id {
                self.comparisons += comparisons;
                return Ok(Search::hit(comparisons));
            }
            cur = node.next.as_deref();
        }
        self.comparisons += comparisons;
        Ok(Search::miss(comparisons))
    }

    fn delete(&mut self, id: &str) -> Result<bool, TableError> {
        let slot = self.deriver.slot(id, self.buckets.len())?;
        let removed = unlink_first(&mut self.buckets[slot], id);
        if removed {
            self.len -= 1;
        }
        Ok(removed)
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
        self.buckets.len()
    }
}

impl Drop for ChainedListTable {
    fn drop(&mut self) {
        // unlink iteratively, the derived drop recurses once per node
        for bucket in &mut self.buckets {
            let mut cur = bucket.take();
            while let Some(mut node) = cur {
                cur = node.next.take();
            }
        }
    }
}

fn unlink_first(link: &mut Link, id: &str) -> bool {
    let mut cur = link;
    loop {
        match cur {
            None => return false,
            Some(node) if *node.id == *id => {
                *cur = node.next.take();
                return true;
            }
            Some(node) => cur = &mut node.next,
        }
    }
}
