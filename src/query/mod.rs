pub mod cache;
pub mod eval;
pub mod expr;
pub mod parser;

pub use cache::{CacheStats, MaskSetCache, QueryCache, RangeSetCache};
pub use eval::{evaluate, evaluate_mask_set, evaluate_range_set, SetAlgebra};
pub use expr::{QueryExpression, Token};
pub use parser::{parse_query, ParseError, TagLookup};
