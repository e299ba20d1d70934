#![forbid(unsafe_code)]

//! Memoized distribution results.
//!
//! A container that is laid out every frame usually asks the same question
//! again and again: same space, same scale, same extents. [`DistributionCache`]
//! keeps the answers.
//!
//! ```
//! use gridfit_layout::{DistributionCache, DistributionRequest, Extent};
//!
//! let mut cache = DistributionCache::new(64);
//! let request = DistributionRequest::new(16.0, [Extent::new(2.0, 5.0), Extent::new(6.0, 14.0)]);
//!
//! let first = cache.solve(&request).unwrap();
//! let second = cache.solve(&request).unwrap();
//! assert_eq!(first, second);
//! assert_eq!(cache.stats().hits, 1);
//! ```
//!
//! # Invalidation
//!
//! Every input of the distribution is part of the key, so a resize or a scale
//! change never needs invalidation. [`DistributionCache::invalidate_all`]
//! exists for callers that key their own computations with
//! [`get_or_compute`](DistributionCache::get_or_compute).
//!
//! # Eviction
//!
//! At capacity the least used entry is evicted.

use std::hash::{Hash, Hasher};

use gridfit_core::trace;
use rustc_hash::{FxHashMap, FxHasher};

use crate::{DistributeError, Distribution, DistributionRequest, Extent, Strategy};

/// Key for cache lookups.
///
/// Floats are compared by bit pattern, so `0.0` and `-0.0` are different keys
/// and a NaN request is cached like any other (as its error).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct DistributionCacheKey {
    /// Bits of the available space.
    pub available_bits: u64,
    /// Bits of the pixel scale.
    pub scale_bits: u64,
    /// Grow or shrink.
    pub strategy: Strategy,
    /// Number of children.
    pub children: usize,
    /// Hash fingerprint of the extents.
    pub extents_hash: u64,
}

impl DistributionCacheKey {
    /// Create a key from distribution parameters.
    pub fn new(available: f64, pixel_scale: f64, extents: &[Extent], strategy: Strategy) -> Self {
        Self {
            available_bits: available.to_bits(),
            scale_bits: pixel_scale.to_bits(),
            strategy,
            children: extents.len(),
            extents_hash: Self::hash_extents(extents),
        }
    }

    /// Key for a request.
    pub fn for_request(request: &DistributionRequest) -> Self {
        Self::new(
            request.available,
            request.pixel_scale,
            &request.extents,
            request.strategy,
        )
    }

    fn hash_extents(extents: &[Extent]) -> u64 {
        let mut hasher = FxHasher::default();
        for e in extents {
            e.min.to_bits().hash(&mut hasher);
            e.max.to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }
}

type CachedResult = Result<Distribution, DistributeError>;

#[derive(Clone, Debug)]
struct CachedEntry {
    result: CachedResult,
    generation: u64,
    access_count: u32,
}

/// Statistics about cache performance.
#[derive(Debug, Clone, Default)]
pub struct DistributionCacheStats {
    /// Number of entries currently in the cache.
    pub entries: usize,
    /// Total cache hits since creation or last reset.
    pub hits: u64,
    /// Total cache misses since creation or last reset.
    pub misses: u64,
    /// Hit rate as a fraction (0.0 to 1.0).
    pub hit_rate: f64,
}

/// Cache of distribution results.
///
/// Each entry is tagged with a generation; [`invalidate_all`] bumps the
/// generation so every existing entry is recomputed on next access.
///
/// [`invalidate_all`]: DistributionCache::invalidate_all
#[derive(Debug)]
pub struct DistributionCache {
    entries: FxHashMap<DistributionCacheKey, CachedEntry>,
    generation: u64,
    max_entries: usize,
    hits: u64,
    misses: u64,
}

impl DistributionCache {
    /// Create a cache holding at most `max_entries` results (at least one).
    #[inline]
    pub fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            entries: FxHashMap::with_capacity_and_hasher(max_entries, Default::default()),
            generation: 0,
            max_entries,
            hits: 0,
            misses: 0,
        }
    }

    /// Solve `request`, reusing a cached result when one exists.
    ///
    /// Precondition failures are cached too.
    pub fn solve(&mut self, request: &DistributionRequest) -> CachedResult {
        let key = DistributionCacheKey::for_request(request);
        self.get_or_compute(key, || request.solve())
    }

    /// Get the cached result for `key` or compute and cache a new one.
    ///
    /// The key does not have to describe every input of `compute`. A caller
    /// that keys on the available space alone, while its extents come from
    /// content that can change, must call [`invalidate_all`] when that
    /// content changes. [`solve`] keys on the whole request and never needs
    /// to.
    ///
    /// [`invalidate_all`]: DistributionCache::invalidate_all
    /// [`solve`]: DistributionCache::solve
    pub fn get_or_compute<F>(&mut self, key: DistributionCacheKey, compute: F) -> CachedResult
    where
        F: FnOnce() -> CachedResult,
    {
        if let Some(entry) = self.entries.get_mut(&key)
            && entry.generation == self.generation
        {
            self.hits += 1;
            entry.access_count = entry.access_count.saturating_add(1);
            return entry.result.clone();
        }

        self.misses += 1;
        let result = compute();

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.evict_lru();
        }

        self.entries.insert(
            key,
            CachedEntry {
                result: result.clone(),
                generation: self.generation,
                access_count: 1,
            },
        );

        result
    }

    /// Invalidate all entries by bumping the generation.
    ///
    /// Only needed when entries were stored through [`get_or_compute`] under
    /// keys that leave out some input of the computation. Entries are not
    /// removed, only recomputed on next access, and stale ones are evicted
    /// first.
    ///
    /// [`get_or_compute`]: DistributionCache::get_or_compute
    #[inline]
    pub fn invalidate_all(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Current statistics.
    pub fn stats(&self) -> DistributionCacheStats {
        let total = self.hits + self.misses;
        DistributionCacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
            hit_rate: if total > 0 {
                self.hits as f64 / total as f64
            } else {
                0.0
            },
        }
    }

    /// Reset hit and miss counters to zero.
    #[inline]
    pub fn reset_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }

    /// Remove every entry.
    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    fn evict_lru(&mut self) {
        let generation = self.generation;
        // Stale entries go first, then the least used.
        if let Some(key) = self
            .entries
            .iter()
            .min_by_key(|(_, e)| (e.generation == generation, e.access_count))
            .map(|(k, _)| *k)
        {
            self.entries.remove(&key);
            trace!(entries = self.entries.len(), "evicted distribution");
        }
    }
}

impl Default for DistributionCache {
    /// Creates a cache with default capacity of 64 entries.
    fn default() -> Self {
        Self::new(64)
    }
}
