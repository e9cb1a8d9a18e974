//! Parameter name -> bit index table.
//!
//! Indices are handed out once, in first-seen order, and never reused until
//! `clear()`. The table is safe to share: concurrent callers asking for the
//! same unseen name converge on a single index, because the winning insert
//! holds the shard entry while it reserves.

use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};

use crate::bitset::BITSET_CAPACITY;

#[derive(Debug)]
pub struct ParamIndex {
    map: DashMap<String, usize>,
    next: AtomicUsize,
    capacity: usize,
    overflowed: DashSet<String>,
}

impl Default for ParamIndex {
    fn default() -> Self {
        Self::new(BITSET_CAPACITY)
    }
}

impl ParamIndex {
    /// `capacity` is clamped to the bitset width.
    pub fn new(capacity: usize) -> Self {
        Self {
            map: DashMap::new(),
            next: AtomicUsize::new(0),
            capacity: capacity.min(BITSET_CAPACITY),
            overflowed: DashSet::new(),
        }
    }

    /// Return the index for `name`, assigning the next free one if needed.
    /// `None` when the table is full; the name then stays unindexed and can
    /// never match.
    pub fn get_or_create(&self, name: &str) -> Option<usize> {
        if let Some(i) = self.map.get(name) {
            return Some(*i);
        }

        match self.map.entry(name.to_string()) {
            Entry::Occupied(e) => Some(*e.get()),
            Entry::Vacant(v) => match self.reserve() {
                Some(idx) => {
                    v.insert(idx);
                    Some(idx)
                }
                None => {
                    drop(v);
                    if self.overflowed.insert(name.to_string()) {
                        tracing::warn!(
                            param = %name,
                            capacity = self.capacity,
                            "parameter index full; parameter will never match"
                        );
                    }
                    None
                }
            },
        }
    }

    /// Pure lookup.
    pub fn get(&self, name: &str) -> Option<usize> {
        self.map.get(name).map(|r| *r.value())
    }

    /// Reverse lookup. Linear scan, meant for diagnostics only.
    pub fn name_of(&self, index: usize) -> Option<String> {
        self.map
            .iter()
            .find(|e| *e.value() == index)
            .map(|e| e.key().clone())
    }

    pub fn clear(&self) {
        self.map.clear();
        self.overflowed.clear();
        self.next.store(0, Ordering::Release);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn reserve(&self) -> Option<usize> {
        let cap = self.capacity;
        self.next
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < cap).then_some(n + 1)
            })
            .ok()
    }
}
