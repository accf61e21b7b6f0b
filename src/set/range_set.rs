//! Sparse per-entity interval lists backed by one flat interval buffer.

use super::join::{is_strictly_ascending, merge_join, JoinStep};
use super::ranges::{is_canonical, ranges_apply};
use super::types::{EntityId, Interval, SetOp, Span};

/// Mapping from entity id to that entity's interval list.
///
/// Entities are kept in strictly ascending id order and their interval lists
/// are stored back to back in one shared buffer. Entities that are absent are
/// implicitly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSet {
    entities: Vec<EntityId>,
    spans: Vec<Span>,
    ranges: Vec<Interval>,
}

impl RangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(entity, intervals)` entries, which must be in ascending entity order
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (EntityId, &'a [Interval])>,
    {
        let mut set = Self::new();
        for (entity, intervals) in entries {
            set.push(entity, intervals);
        }
        set
    }

    /// Append an entity after every entity already in the set
    pub fn push(&mut self, entity: EntityId, intervals: &[Interval]) {
        if let Some(&last) = self.entities.last() {
            assert!(
                entity > last,
                "entity {} pushed after entity {}; ids must be strictly ascending",
                entity,
                last
            );
        }
        self.spans.push(Span::new(self.ranges.len(), intervals.len()));
        self.entities.push(entity);
        self.ranges.extend_from_slice(intervals);
    }

    /// Number of entities in the set
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entity ids in ascending order
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Every interval of every entity, in entity order
    pub fn all_intervals(&self) -> &[Interval] {
        &self.ranges
    }

    /// Total number of intervals across all entities
    pub fn interval_count(&self) -> usize {
        self.ranges.len()
    }

    /// Intervals of the entity at position `i` in [`entities`](Self::entities)
    pub fn intervals_at(&self, i: usize) -> &[Interval] {
        &self.ranges[self.spans[i].range()]
    }

    /// Intervals of `entity`, or `None` if it is absent
    pub fn get(&self, entity: EntityId) -> Option<&[Interval]> {
        let i = self.entities.binary_search(&entity).ok()?;
        Some(self.intervals_at(i))
    }

    pub fn contains_entity(&self, entity: EntityId) -> bool {
        self.entities.binary_search(&entity).is_ok()
    }

    /// Iterate over `(entity, intervals)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &[Interval])> + '_ {
        self.entities
            .iter()
            .zip(&self.spans)
            .map(move |(&entity, span)| (entity, &self.ranges[span.range()]))
    }

    /// Total number of frames covered
    pub fn frame_count(&self) -> usize {
        self.ranges.iter().map(Interval::len).sum()
    }

    /// Check the layout invariants: ascending ids, spans partitioning the
    /// buffer without gaps, canonical interval lists.
    pub fn is_well_formed(&self) -> bool {
        if self.entities.len() != self.spans.len() || !is_strictly_ascending(&self.entities) {
            return false;
        }
        let mut next = 0;
        for span in &self.spans {
            if span.offset != next {
                return false;
            }
            next = span.end();
        }
        next == self.ranges.len() && self.iter().all(|(_, r)| is_canonical(r))
    }

    /// Approximate heap usage in bytes
    pub fn memory_usage(&self) -> usize {
        self.entities.capacity() * std::mem::size_of::<EntityId>()
            + self.spans.capacity() * std::mem::size_of::<Span>()
            + self.ranges.capacity() * std::mem::size_of::<Interval>()
    }
}

fn range_set_apply(lhs: &RangeSet, rhs: &RangeSet, op: SetOp) -> RangeSet {
    // Worst case: every entity from both sides, every interval from both sides
    let max_entities = lhs.len() + rhs.len();
    let mut out = RangeSet {
        entities: Vec::with_capacity(max_entities),
        spans: Vec::with_capacity(max_entities),
        ranges: vec![Interval::default(); lhs.interval_count() + rhs.interval_count()],
    };
    let mut ranges_i = 0;

    merge_join(&lhs.entities, &rhs.entities, op, |step| {
        let (entity, n) = match step {
            JoinStep::Left(i) => {
                let src = lhs.intervals_at(i);
                out.ranges[ranges_i..ranges_i + src.len()].copy_from_slice(src);
                (lhs.entities[i], src.len())
            }
            JoinStep::Right(j) => {
                let src = rhs.intervals_at(j);
                out.ranges[ranges_i..ranges_i + src.len()].copy_from_slice(src);
                (rhs.entities[j], src.len())
            }
            JoinStep::Both(i, j) => {
                let n = ranges_apply(
                    op,
                    &mut out.ranges[ranges_i..],
                    lhs.intervals_at(i),
                    rhs.intervals_at(j),
                );
                (lhs.entities[i], n)
            }
        };

        // Empty results are not kept, so entity lists stay sparse
        if n > 0 {
            out.entities.push(entity);
            out.spans.push(Span::new(ranges_i, n));
            ranges_i += n;
        }
    });

    out.ranges.truncate(ranges_i);
    out
}

/// Entity-wise union
pub fn range_set_union(lhs: &RangeSet, rhs: &RangeSet) -> RangeSet {
    range_set_apply(lhs, rhs, SetOp::Union)
}

/// Entity-wise intersection
pub fn range_set_intersection(lhs: &RangeSet, rhs: &RangeSet) -> RangeSet {
    range_set_apply(lhs, rhs, SetOp::Intersection)
}

/// Entity-wise difference (`lhs` minus `rhs`)
pub fn range_set_difference(lhs: &RangeSet, rhs: &RangeSet) -> RangeSet {
    range_set_apply(lhs, rhs, SetOp::Difference)
}

/// Dispatch to the set-wide operator matching `op`
pub fn range_set_op(op: SetOp, lhs: &RangeSet, rhs: &RangeSet) -> RangeSet {
    range_set_apply(lhs, rhs, op)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(entries: &[(EntityId, &[(i32, i32)])]) -> RangeSet {
        let mut out = RangeSet::new();
        for &(entity, pairs) in entries {
            let intervals: Vec<Interval> =
                pairs.iter().map(|&(s, e)| Interval::new(s, e)).collect();
            out.push(entity, &intervals);
        }
        out
    }

    #[test]
    fn test_push_and_lookup() {
        let s = set(&[(0, &[(0, 4)]), (3, &[(1, 2), (5, 9)])]);
        assert_eq!(s.len(), 2);
        assert_eq!(s.entities(), &[0, 3]);
        assert_eq!(s.get(3), Some(&[Interval::new(1, 2), Interval::new(5, 9)][..]));
        assert_eq!(s.get(1), None);
        assert_eq!(s.frame_count(), 4 + 1 + 4);
        assert!(s.is_well_formed());
    }

    #[test]
    #[should_panic(expected = "strictly ascending")]
    fn test_push_out_of_order_panics() {
        let mut s = RangeSet::new();
        s.push(2, &[Interval::new(0, 1)]);
        s.push(1, &[Interval::new(0, 1)]);
    }

    #[test]
    fn test_union_copies_one_sided_entities() {
        let a = set(&[(0, &[(0, 10), (20, 30)]), (2, &[(4, 6)])]);
        let b = set(&[(0, &[(5, 25)]), (1, &[(1, 3)])]);
        let u = range_set_union(&a, &b);
        assert_eq!(u, set(&[(0, &[(0, 30)]), (1, &[(1, 3)]), (2, &[(4, 6)])]));
        assert!(u.is_well_formed());
    }

    #[test]
    fn test_intersection_drops_unmatched_and_empty() {
        let a = set(&[(0, &[(0, 10)]), (1, &[(0, 5)]), (4, &[(0, 64)])]);
        let b = set(&[(0, &[(10, 20)]), (1, &[(3, 8)]), (5, &[(0, 64)])]);
        let i = range_set_intersection(&a, &b);
        // Entity 0 touches but does not overlap, so it disappears entirely
        assert_eq!(i, set(&[(1, &[(3, 5)])]));
        assert!(i.is_well_formed());
    }

    #[test]
    fn test_difference_keeps_left_only() {
        let a = set(&[(0, &[(0, 40)]), (1, &[(0, 8)]), (3, &[(2, 4)])]);
        let b = set(&[(0, &[(20, 64)]), (1, &[(0, 8)]), (2, &[(0, 1)])]);
        let d = range_set_difference(&a, &b);
        assert_eq!(d, set(&[(0, &[(0, 20)]), (3, &[(2, 4)])]));
    }

    #[test]
    fn test_self_difference_is_empty() {
        let a = set(&[(0, &[(0, 10), (20, 30)]), (7, &[(3, 9)])]);
        assert!(range_set_difference(&a, &a).is_empty());
    }

    #[test]
    fn test_identities_with_empty() {
        let a = set(&[(0, &[(0, 10), (20, 30)]), (7, &[(3, 9)])]);
        let empty = RangeSet::new();
        assert_eq!(range_set_union(&a, &empty), a);
        assert_eq!(range_set_difference(&a, &empty), a);
        assert!(range_set_intersection(&a, &empty).is_empty());
    }

    #[test]
    fn test_output_buffer_trimmed() {
        let a = set(&[(0, &[(0, 10), (20, 30), (40, 50)])]);
        let b = set(&[(0, &[(0, 64)])]);
        let u = range_set_union(&a, &b);
        assert_eq!(u.interval_count(), 1);
        assert_eq!(u.all_intervals(), &[Interval::new(0, 64)]);
    }

    #[test]
    fn test_explicit_empty_entity_not_copied_through() {
        let a = set(&[(0, &[]), (1, &[(0, 2)])]);
        let u = range_set_union(&a, &RangeSet::new());
        assert_eq!(u.entities(), &[1]);
    }
}
