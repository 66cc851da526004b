//! Byte-budgeted memory tier

use std::borrow::Borrow;
use std::hash::Hash;

use lru::LruCache;

/// Something whose resident size can be estimated
pub trait ByteSize {
    fn byte_size(&self) -> usize;
}

/// LRU map that evicts by total value size rather than entry count
///
/// An entry larger than the whole budget is still admitted, then evicted as
/// soon as anything else arrives.
#[derive(Debug)]
pub struct ByteLru<K: Hash + Eq, V> {
    entries: LruCache<K, V>,
    bytes: usize,
    budget: usize,
}

impl<K: Hash + Eq, V: ByteSize> ByteLru<K, V> {
    #[must_use]
    pub fn new(budget: usize) -> Self {
        Self {
            entries: LruCache::unbounded(),
            bytes: 0,
            budget,
        }
    }

    /// Look up and mark as most recently used
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    /// Insert, then evict least recently used entries while over budget
    ///
    /// Returns the number of evicted entries.
    pub fn put(&mut self, key: K, value: V) -> usize {
        self.bytes += value.byte_size();
        if let Some(old) = self.entries.put(key, value) {
            self.bytes -= old.byte_size();
        }

        let mut evicted = 0;
        while self.bytes > self.budget && self.entries.len() > 1 {
            match self.entries.pop_lru() {
                Some((_, old)) => {
                    self.bytes -= old.byte_size();
                    evicted += 1;
                }
                None => break,
            }
        }
        evicted
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.bytes = 0;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn bytes(&self) -> usize {
        self.bytes
    }

    #[must_use]
    pub const fn budget(&self) -> usize {
        self.budget
    }
}
