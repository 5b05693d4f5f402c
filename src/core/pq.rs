use crate::error::{Error, Result};

/// Smallest backing capacity the queue will ever shrink to.
pub const MIN_CAPACITY: usize = 10;

/// Binary-heap min-priority queue over any totally ordered key.
///
/// Entries are never removed except through [`MinPq::remove_min`]; stale entries are the
/// caller's business. Backing storage doubles when full and halves once occupancy falls
/// below a quarter of capacity, but never below [`MIN_CAPACITY`].
#[derive(Debug, Clone)]
pub struct MinPq<K: Ord> {
    items: Vec<K>,
}

impl<K: Ord> Default for MinPq<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> MinPq<K> {
    pub fn new() -> Self {
        Self::with_capacity(MIN_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity.max(MIN_CAPACITY)),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Current backing capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// The minimum entry, if any, without removing it.
    #[inline]
    pub fn peek_min(&self) -> Option<&K> {
        self.items.first()
    }

    /// Add an entry in amortised O(log n).
    pub fn insert(&mut self, item: K) {
        let cap = self.items.capacity();
        if self.items.len() == cap {
            self.items.reserve_exact(cap.max(1));
        }
        self.items.push(item);
        self.swim(self.items.len() - 1);
    }

    /// Remove and return the minimum entry in O(log n).
    ///
    /// Errors: `Error::EmptyQueue` when there is nothing to remove.
    pub fn remove_min(&mut self) -> Result<K> {
        if self.items.is_empty() {
            return Err(Error::EmptyQueue);
        }
        let last = self.items.len() - 1;
        self.items.swap(0, last);
        let min = self.items.pop().ok_or(Error::EmptyQueue)?;
        if !self.items.is_empty() {
            self.sink(0);
        }

        let cap = self.items.capacity();
        if self.items.len() < cap / 4 && cap / 2 >= MIN_CAPACITY {
            self.items.shrink_to(cap / 2);
        }
        Ok(min)
    }

    /// Drop every entry, keeping the current allocation.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn swim(&mut self, mut k: usize) {
        while k > 0 {
            let parent = (k - 1) / 2;
            if self.items[k] >= self.items[parent] {
                break;
            }
            self.items.swap(k, parent);
            k = parent;
        }
    }

    fn sink(&mut self, mut k: usize) {
        let n = self.items.len();
        loop {
            let left = 2 * k + 1;
            if left >= n {
                break;
            }
            let right = left + 1;
            let child = if right < n && self.items[right] < self.items[left] {
                right
            } else {
                left
            };
            if self.items[k] <= self.items[child] {
                break;
            }
            self.items.swap(k, child);
            k = child;
        }
    }

    #[cfg(test)]
    fn is_heap(&self) -> bool {
        (1..self.items.len()).all(|k| self.items[(k - 1) / 2] <= self.items[k])
    }
}
