//! Separate chaining where every bucket is an unbalanced binary search tree
//! ordered by the raw identifier string.
use super::*;
use std::cmp::Ordering;

type Link = Option<Box<TreeNode>>;

struct TreeNode {
    id: Box<str>,
    left: Link,
    right: Link,
}

impl TreeNode {
    fn new(id: &str) -> Self {
        TreeNode {
            id: id.into(),
            left: None,
            right: None,
        }
    }
}

pub struct ChainedBstTable {
    deriver: KeyDeriver,
    buckets: Vec<Link>,
    len: usize,
    collisions: u64,
    comparisons: u64,
}

impl ChainedBstTable {
    pub fn new(config: TableConfig) -> Self {
        check_capacity(&config);
        let mut buckets = Vec::with_capacity(config.capacity);
        buckets.resize_with(config.capacity, Default::default);
        ChainedBstTable {
            deriver: KeyDeriver::new(config.policy),
            buckets,
            len: 0,
            collisions: 0,
            comparisons: 0,
        }
    }

    /// Height of the tree holding `id`'s bucket, 0 for an empty bucket.
    pub fn bucket_height(&self, id: &str) -> Result<usize, TableError> {
        let slot = self.deriver.slot(id, self.buckets.len())?;
        Ok(height(&self.buckets[slot]))
    }

    /// Identifiers of `id`'s bucket in order.
    pub fn bucket_in_order(&self, id: &str) -> Result<Vec<&str>, TableError> {
        let slot = self.deriver.slot(id, self.buckets.len())?;
        let mut out = vec![];
        in_order(&self.buckets[slot], &mut out);
        Ok(out)
    }
}

impl CollisionTable for ChainedBstTable {
    fn insert(&mut self, id: &str) -> Result<(), TableError> {
        let slot = self.deriver.slot(id, self.buckets.len())?;
        let bucket = &mut self.buckets[slot];
        if bucket.is_some() {
            self.collisions += 1;
        }
        if insert(bucket, id) {
            self.len += 1;
        }
        Ok(())
    }

    fn search(&mut self, id: &str) -> Result<Search, TableError> {
        let slot = self.deriver.slot(id, self.buckets.len())?;
        let mut comparisons = 0;
        let mut cur = self.buckets[slot].as_deref();
        let mut found = false;
        while let Some(node) = cur {
            comparisons += 1;
            cur = match id.cmp(&node.id) {
                Ordering::Equal => {
                    found = true;
                    break;
                }
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            };
        }
        self.comparisons += comparisons;
        Ok(if found {
            Search::hit(comparisons)
        } else {
            Search::miss(comparisons)
        })
    }

    fn delete(&mut self, id: &str) -> Result<bool, TableError> {
        let slot = self.deriver.slot(id, self.buckets.len())?;
        let removed = remove(&mut self.buckets[slot], id);
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

/// Returns false if `id` was already in the tree.
fn insert(link: &mut Link, id: &str) -> bool {
    match link {
        None => {
            *link = Some(Box::new(TreeNode::new(id)));
            true
        }
        Some(node) => match id.cmp(&node.id) {
            Ordering::Less => insert(&mut node.left, id),
            Ordering::Greater => insert(&mut node.right, id),
            Ordering::Equal => false,
        },
    }
}

fn remove(link: &mut Link, id: &str) -> bool {
    let Some(node) = link else {
        return false;
    };
    match id.cmp(&node.id) {
        Ordering::Less => remove(&mut node.left, id),
        Ordering::Greater => remove(&mut node.right, id),
        Ordering::Equal => {
            match (node.left.is_some(), node.right.is_some()) {
                (true, true) => {
                    // replace with the in-order successor and unlink it
                    if let Some(successor) = take_min(&mut node.right) {
                        node.id = successor;
                    }
                }
                (true, false) => *link = node.left.take(),
                (false, _) => *link = node.right.take(),
            }
            true
        }
    }
}

/// Unlinks the leftmost node under `link` and returns its identifier.
fn take_min(link: &mut Link) -> Option<Box<str>> {
    match link {
        None => None,
        Some(node) if node.left.is_some() => take_min(&mut node.left),
        Some(node) => {
            let right = node.right.take();
            std::mem::replace(link, right).map(|min| min.id)
        }
    }
}

fn height(link: &Link) -> usize {
    match link {
        None => 0,
        Some(node) => 1 + height(&node.left).max(height(&node.right)),
    }
}

fn in_order<'a>(link: &'a Link, out: &mut Vec<&'a str>) {
    if let Some(node) = link {
        in_order(&node.left, out);
        out.push(&node.id);
        in_order(&node.right, out);
    }
}
