//! # rangeq - Boolean queries over frame ranges
//!
//! rangeq answers set-algebra queries such as
//! `Running & Male & (Tired | Limping)` against a catalog of named tags, each
//! tag being the set of frames (per entity) where it holds.
//!
//! ## Architecture
//!
//! - [`set`] - interval-list and bitmask set algebra, merge-joined by entity
//! - [`query`] - postfix expressions, evaluation, caching and the text parser
//! - [`catalog`] - named tag sets loaded from text grids
//! - [`engine`] - query session tying parsing, caching and evaluation together
//! - [`config`] - engine configuration (defaults, JSON file, environment)
//! - [`output`] - result formatting for the CLI
//!
//! ## Quick Start
//!
//! ```
//! use rangeq::catalog::TagCatalog;
//! use rangeq::config::EngineConfig;
//! use rangeq::engine::QueryEngine;
//!
//! let catalog = TagCatalog::builtin("gait").unwrap();
//! let mut engine = QueryEngine::new(catalog, EngineConfig::default());
//!
//! let outcome = engine.query("Running & Male & (Tired | Limping)");
//! assert!(outcome.error.is_none());
//! for (entity, intervals) in outcome.result.iter() {
//!     println!("{}: {:?}", entity, intervals);
//! }
//! ```
//!
//! Expressions can also be built directly with the `|`, `&` and `-`
//! operators on [`query::QueryExpression`], which produce exactly the token
//! sequence the parser would.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod output;
pub mod query;
pub mod set;
