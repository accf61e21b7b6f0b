//! Query session: text in, frame ranges out.
//!
//! The engine owns a [`TagCatalog`] and one cache per representation. A query
//! is parsed against the catalog's tag names, looked up in (or evaluated into)
//! the cache of the configured representation and handed back as a
//! [`RangeSet`], whichever representation did the work.

use crate::catalog::TagCatalog;
use crate::config::EngineConfig;
use crate::query::{
    evaluate, parse_query, CacheStats, MaskSetCache, ParseError, QueryExpression, RangeSetCache,
};
use crate::set::{mask_set_vectorize, MaskSet, RangeSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Which set representation evaluates queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Representation {
    /// Interval lists
    #[default]
    Ranges,
    /// Packed per-frame bitmasks
    Masks,
}

impl FromStr for Representation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ranges" | "range" | "intervals" => Ok(Self::Ranges),
            "masks" | "mask" | "bits" => Ok(Self::Masks),
            other => Err(format!("unknown representation: {}", other)),
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ranges => write!(f, "ranges"),
            Self::Masks => write!(f, "masks"),
        }
    }
}

/// Result of one [`QueryEngine::query`] call
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    /// Parsed expression, `None` for blank or malformed text
    pub expression: Option<QueryExpression>,
    /// Matching frames; the empty set when there is no expression
    pub result: RangeSet,
    /// Why the text did not parse
    pub error: Option<ParseError>,
    /// Whether the result was served from the cache
    pub cached: bool,
}

impl QueryOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Cache statistics for both representations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub ranges: CacheStats,
    pub masks: CacheStats,
}

pub struct QueryEngine {
    catalog: TagCatalog,
    config: EngineConfig,
    range_cache: RangeSetCache,
    mask_cache: MaskSetCache,
}

impl QueryEngine {
    pub fn new(catalog: TagCatalog, config: EngineConfig) -> Self {
        Self {
            catalog,
            config,
            range_cache: RangeSetCache::new(),
            mask_cache: MaskSetCache::new(),
        }
    }

    pub fn catalog(&self) -> &TagCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn representation(&self) -> Representation {
        self.config.representation
    }

    /// Switch representation; both caches are kept
    pub fn set_representation(&mut self, representation: Representation) {
        self.config.representation = representation;
    }

    /// Parse query text against the catalog's tag names
    pub fn parse(&self, text: &str) -> Result<QueryExpression, ParseError> {
        parse_query(text, &self.catalog)
    }

    /// Evaluate over interval lists
    pub fn evaluate_ranges(&mut self, expr: &QueryExpression) -> RangeSet {
        let sources = self.catalog.range_sets();
        if self.config.cache_enabled {
            self.range_cache.get_or_evaluate(expr, sources)
        } else {
            evaluate(expr, sources)
        }
    }

    /// Evaluate over bitmasks
    pub fn evaluate_masks(&mut self, expr: &QueryExpression) -> MaskSet {
        let sources = self.catalog.mask_sets();
        if self.config.cache_enabled {
            self.mask_cache.get_or_evaluate(expr, sources)
        } else {
            evaluate(expr, sources)
        }
    }

    /// Evaluate with the configured representation, as intervals
    pub fn evaluate(&mut self, expr: &QueryExpression) -> RangeSet {
        match self.config.representation {
            Representation::Ranges => self.evaluate_ranges(expr),
            Representation::Masks => mask_set_vectorize(&self.evaluate_masks(expr)),
        }
    }

    /// Whether `expr` already has a cached result in the active representation
    pub fn is_cached(&self, expr: &QueryExpression) -> bool {
        if !self.config.cache_enabled {
            return false;
        }
        match self.config.representation {
            Representation::Ranges => self.range_cache.contains(expr),
            Representation::Masks => self.mask_cache.contains(expr),
        }
    }

    /// Run one query from text.
    ///
    /// Blank text yields the empty set with no error. Malformed text yields
    /// the empty set together with the parse error.
    pub fn query(&mut self, text: &str) -> QueryOutcome {
        if text.trim().is_empty() {
            return self.fallback(None);
        }

        let expr = match self.parse(text) {
            Ok(expr) => expr,
            Err(e) => {
                warn!(query = text, error = %e, "query failed to parse");
                return self.fallback(Some(e));
            }
        };

        let cached = self.is_cached(&expr);
        let result = self.evaluate(&expr);
        debug!(
            expr = %expr,
            representation = %self.config.representation,
            entities = result.len(),
            intervals = result.interval_count(),
            cached,
            "query evaluated"
        );

        QueryOutcome {
            expression: Some(expr),
            result,
            error: None,
            cached,
        }
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            ranges: self.range_cache.stats(),
            masks: self.mask_cache.stats(),
        }
    }

    fn fallback(&self, error: Option<ParseError>) -> QueryOutcome {
        QueryOutcome {
            expression: None,
            result: self.catalog.empty_set().clone(),
            error,
            cached: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::set::Interval;

    fn engine(representation: Representation) -> QueryEngine {
        let config = EngineConfig {
            representation,
            ..EngineConfig::default()
        };
        QueryEngine::new(TagCatalog::builtin("gait").unwrap(), config)
    }

    #[test]
    fn test_representation_from_str() {
        assert_eq!("ranges".parse(), Ok(Representation::Ranges));
        assert_eq!(" MASKS ".parse(), Ok(Representation::Masks));
        assert!("pixels".parse::<Representation>().is_err());
        assert_eq!(Representation::Masks.to_string(), "masks");
    }

    #[test]
    fn test_blank_query_is_empty_without_error() {
        let mut engine = engine(Representation::Ranges);
        let outcome = engine.query("   ");
        assert!(outcome.is_ok());
        assert!(outcome.expression.is_none());
        assert!(outcome.result.is_empty());
    }

    #[test]
    fn test_parse_error_falls_back_to_empty() {
        let mut engine = engine(Representation::Ranges);
        let outcome = engine.query("Male & ");
        assert_eq!(outcome.error, Some(ParseError::UnexpectedEnd));
        assert!(outcome.expression.is_none());
        assert!(outcome.result.is_empty());
        assert_eq!(engine.stats().ranges.misses, 0);
    }

    #[test]
    fn test_representations_agree() {
        let queries = [
            "Running & Male & (Tired | Limping)",
            "All - Running",
            "(Male - Female) & Running",
            "Walking | Limping",
            "Male & Female",
        ];
        let mut ranges = engine(Representation::Ranges);
        let mut masks = engine(Representation::Masks);
        for q in queries {
            let a = ranges.query(q);
            let b = masks.query(q);
            assert!(a.is_ok(), "{}: {:?}", q, a.error);
            assert_eq!(a.result, b.result, "{}", q);
        }
    }

    #[test]
    fn test_second_query_is_cached() {
        let mut engine = engine(Representation::Masks);
        let first = engine.query("Running - Tired");
        let second = engine.query("Running-Tired");
        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(first.result, second.result);
        assert_eq!(engine.stats().masks.hits, 1);
        assert_eq!(engine.stats().ranges, CacheStats::default());
    }

    #[test]
    fn test_cache_disabled() {
        let config = EngineConfig {
            cache_enabled: false,
            ..EngineConfig::default()
        };
        let mut engine = QueryEngine::new(TagCatalog::builtin("gait").unwrap(), config);
        engine.query("Male");
        let again = engine.query("Male");
        assert!(!again.cached);
        assert_eq!(engine.stats().ranges.entries, 0);
    }

    #[test]
    fn test_universe_query() {
        let mut engine = engine(Representation::Ranges);
        let outcome = engine.query("All");
        assert_eq!(outcome.result.get(0), Some(&[Interval::new(0, 31)][..]));
        assert_eq!(outcome.result.get(1), Some(&[Interval::new(0, 29)][..]));
    }

    #[test]
    fn test_switch_representation() {
        let mut engine = engine(Representation::Ranges);
        let expr = engine.parse("Running").unwrap();
        let as_ranges = engine.evaluate(&expr);
        engine.set_representation(Representation::Masks);
        assert!(!engine.is_cached(&expr));
        assert_eq!(engine.evaluate(&expr), as_ranges);
        assert!(engine.is_cached(&expr));
    }
}
