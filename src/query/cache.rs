//! Memoization of evaluated expressions.
//!
//! Entries are keyed by the expression's exact token sequence. There is no
//! eviction and no invalidation: a cache is only valid for the source sets it
//! was filled from.

use crate::query::eval::{evaluate, SetAlgebra};
use crate::query::expr::QueryExpression;
use crate::set::{MaskSet, RangeSet};
use rustc_hash::FxHashMap;
use tracing::debug;

/// Hit/miss counters for a cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Lookup-or-evaluate cache for one set representation
#[derive(Debug, Clone)]
pub struct QueryCache<S> {
    entries: FxHashMap<QueryExpression, S>,
    hits: u64,
    misses: u64,
}

/// Cache of interval-list results
pub type RangeSetCache = QueryCache<RangeSet>;

/// Cache of bitmask results
pub type MaskSetCache = QueryCache<MaskSet>;

impl<S> Default for QueryCache<S> {
    fn default() -> Self {
        Self {
            entries: FxHashMap::default(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<S: SetAlgebra> QueryCache<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy of the cached result for `expr`, evaluating and storing
    /// it against `sources` on a miss.
    pub fn get_or_evaluate(&mut self, expr: &QueryExpression, sources: &[S]) -> S {
        if let Some(cached) = self.entries.get(expr) {
            self.hits += 1;
            debug!(expr = %expr, "cache hit");
            return cached.clone();
        }

        self.misses += 1;
        let result = evaluate(expr, sources);
        debug!(expr = %expr, entries = self.entries.len() + 1, "cache miss");
        self.entries.insert(expr.clone(), result.clone());
        result
    }

    /// Cached result for `expr`, without evaluating
    pub fn get(&self, expr: &QueryExpression) -> Option<&S> {
        self.entries.get(expr)
    }

    pub fn contains(&self, expr: &QueryExpression) -> bool {
        self.entries.contains_key(expr)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}
