//! Kernel value cache for one binary subproblem
//!
//! Indices are subproblem-local rows. The diagonal K(i, i) is read on every
//! pair step, so it lives in a dense table filled on first use; off-diagonal
//! values go through an LRU keyed on the unordered pair. Each solver owns its
//! cache and never shares it between threads.

use lru::LruCache;
use std::num::NonZeroUsize;

/// Bytes accounted per off-diagonal entry (key, value and list overhead)
const ENTRY_BYTES: usize = 24;

/// Bytes per diagonal slot
const DIAGONAL_BYTES: usize = std::mem::size_of::<Option<f64>>();

/// Unordered row pair, stored low index first
type Pair = (usize, usize);

fn pair(i: usize, j: usize) -> Pair {
    (i.min(j), i.max(j))
}

/// Cached kernel matrix of a subproblem
pub struct KernelCache {
    diagonal: Vec<Option<f64>>,
    off_diagonal: LruCache<Pair, f64>,
    hits: u64,
    misses: u64,
}

impl KernelCache {
    /// Cache for an `n`-row problem within `memory_bytes`.
    ///
    /// The diagonal is always kept. The LRU holds at most every distinct
    /// off-diagonal pair and at least one entry.
    pub fn for_problem(n: usize, memory_bytes: usize) -> Self {
        let pairs = n.saturating_mul(n.saturating_sub(1)) / 2;
        let budget = memory_bytes.saturating_sub(n * DIAGONAL_BYTES) / ENTRY_BYTES;
        let capacity = NonZeroUsize::new(pairs.min(budget)).unwrap_or(NonZeroUsize::MIN);
        Self {
            diagonal: vec![None; n],
            off_diagonal: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Cached K(i, j), computing and storing it on a miss
    pub fn get_or_compute<F: FnOnce() -> f64>(&mut self, i: usize, j: usize, compute: F) -> f64 {
        if i == j && i < self.diagonal.len() {
            return match self.diagonal[i] {
                Some(value) => {
                    self.hits += 1;
                    value
                }
                None => {
                    self.misses += 1;
                    let value = compute();
                    self.diagonal[i] = Some(value);
                    value
                }
            };
        }

        let key = pair(i, j);
        if let Some(&value) = self.off_diagonal.get(&key) {
            self.hits += 1;
            return value;
        }
        self.misses += 1;
        let value = compute();
        self.off_diagonal.put(key, value);
        value
    }

    /// Fraction of lookups served without calling the kernel
    pub fn hit_rate(&self) -> f64 {
        match self.hits + self.misses {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            capacity: self.off_diagonal.cap().get(),
            diagonal_filled: self.diagonal.iter().filter(|v| v.is_some()).count(),
            size: self.off_diagonal.len(),
        }
    }
}

/// Lookup counters and occupancy of a [`KernelCache`]
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Off-diagonal LRU capacity in entries
    pub capacity: usize,
    pub diagonal_filled: usize,
    /// Off-diagonal entries currently held
    pub size: usize,
}
