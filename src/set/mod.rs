//! Interval and bitmask set algebra.
//!
//! Two interchangeable representations of "which frames of which entities":
//!
//! - [`RangeSet`] - sorted, coalesced interval lists per entity
//! - [`MaskSet`] - one packed bit per frame per entity
//!
//! Both support union, intersection and difference through a sorted
//! merge-join on entity id, and convert into each other without loss via
//! [`range_set_rasterize`] and [`mask_set_vectorize`].

pub mod bits;
pub mod convert;
pub mod join;
pub mod mask_set;
pub mod range_set;
pub mod ranges;
pub mod types;

pub use bits::{mask_difference, mask_intersection, mask_union, BitBuf, BitSlice, BitSliceMut};
pub use convert::{mask_set_vectorize, range_set_rasterize, rasterize, vectorize, vectorize_count};
pub use mask_set::{mask_set_difference, mask_set_intersection, mask_set_op, mask_set_union, MaskSet};
pub use range_set::{
    range_set_difference, range_set_intersection, range_set_op, range_set_union, RangeSet,
};
pub use ranges::{ranges_difference, ranges_intersection, ranges_union};
pub use types::{EntityId, Frame, Interval, SetOp, Span};
