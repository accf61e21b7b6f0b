use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Frame index within one entity's timeline
pub type Frame = i32;

/// Identifier of an entity (one timeline, e.g. an animation clip)
pub type EntityId = u32;

/// Half-open span of frames `[start, stop)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Interval {
    pub start: Frame,
    pub stop: Frame,
}

impl Interval {
    pub const fn new(start: Frame, stop: Frame) -> Self {
        Self { start, stop }
    }

    /// Number of frames covered
    pub fn len(&self) -> usize {
        (self.stop - self.start).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.stop <= self.start
    }

    /// Frame range as usize indices, for addressing a bitmask
    pub fn frames(&self) -> Range<usize> {
        debug_assert!(self.start >= 0, "negative interval start {}", self.start);
        self.start as usize..self.stop as usize
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{})", self.start, self.stop)
    }
}

/// Offset/length pair addressing one entity's payload inside a flat buffer.
///
/// The owning set guarantees that spans are laid out back to back in entity
/// order and never reach past the end of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

impl Span {
    pub const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// One past the last element of the span
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }

    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }
}

/// The three binary set operators supported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetOp {
    Union,
    Intersection,
    /// Left operand minus right operand
    Difference,
}

impl SetOp {
    /// Whether an entity present only in the left operand survives
    pub fn keeps_left_only(self) -> bool {
        matches!(self, SetOp::Union | SetOp::Difference)
    }

    /// Whether an entity present only in the right operand survives
    pub fn keeps_right_only(self) -> bool {
        matches!(self, SetOp::Union)
    }

    /// Membership of a frame given its membership in each operand
    #[inline]
    pub fn apply(self, lhs: bool, rhs: bool) -> bool {
        match self {
            SetOp::Union => lhs || rhs,
            SetOp::Intersection => lhs && rhs,
            SetOp::Difference => lhs && !rhs,
        }
    }

    /// Infix symbol used by the query language
    pub fn symbol(self) -> char {
        match self {
            SetOp::Union => '|',
            SetOp::Intersection => '&',
            SetOp::Difference => '-',
        }
    }
}

impl fmt::Display for SetOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_len() {
        assert_eq!(Interval::new(3, 10).len(), 7);
        assert!(Interval::new(4, 4).is_empty());
        assert_eq!(Interval::new(2, 5).frames(), 2..5);
    }

    #[test]
    fn test_span_range() {
        let span = Span::new(4, 3);
        assert_eq!(span.end(), 7);
        assert_eq!(span.range(), 4..7);
    }

    #[test]
    fn test_set_op_truth_tables() {
        let cases = [(false, false), (false, true), (true, false), (true, true)];
        let union: Vec<bool> = cases.iter().map(|&(l, r)| SetOp::Union.apply(l, r)).collect();
        let inter: Vec<bool> = cases.iter().map(|&(l, r)| SetOp::Intersection.apply(l, r)).collect();
        let diff: Vec<bool> = cases.iter().map(|&(l, r)| SetOp::Difference.apply(l, r)).collect();
        assert_eq!(union, vec![false, true, true, true]);
        assert_eq!(inter, vec![false, false, false, true]);
        assert_eq!(diff, vec![false, false, true, false]);
    }

    #[test]
    fn test_one_sided_survival() {
        assert!(SetOp::Union.keeps_left_only());
        assert!(SetOp::Union.keeps_right_only());
        assert!(!SetOp::Intersection.keeps_left_only());
        assert!(!SetOp::Intersection.keeps_right_only());
        assert!(SetOp::Difference.keeps_left_only());
        assert!(!SetOp::Difference.keeps_right_only());
    }
}
