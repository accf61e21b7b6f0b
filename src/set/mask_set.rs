//! Sparse per-entity bitmasks backed by one flat bit buffer.

use super::bits::{masks_apply, BitBuf, BitSlice};
use super::join::{is_strictly_ascending, merge_join, JoinStep};
use super::types::{EntityId, SetOp, Span};

/// Mapping from entity id to a bitmask with one bit per frame of that entity.
///
/// Same layout as [`RangeSet`](super::RangeSet): ascending entity ids, each
/// entity's mask a contiguous bit range of one shared buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaskSet {
    entities: Vec<EntityId>,
    spans: Vec<Span>,
    masks: BitBuf,
}

impl MaskSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble from parts produced by a conversion pass
    pub(crate) fn from_parts(entities: Vec<EntityId>, spans: Vec<Span>, masks: BitBuf) -> Self {
        let set = Self {
            entities,
            spans,
            masks,
        };
        assert!(set.is_well_formed(), "mask set layout is inconsistent");
        set
    }

    /// Append an entity after every entity already in the set
    pub fn push(&mut self, entity: EntityId, mask: BitSlice<'_>) {
        if let Some(&last) = self.entities.last() {
            assert!(
                entity > last,
                "entity {} pushed after entity {}; ids must be strictly ascending",
                entity,
                last
            );
        }
        let span = Span::new(self.masks.len(), mask.len());
        self.masks.resize(span.end());
        self.masks.slice_mut(span).copy_from(mask);
        self.entities.push(entity);
        self.spans.push(span);
    }

    /// Number of entities in the set
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Total number of bits across all entities
    pub fn bit_count(&self) -> usize {
        self.masks.len()
    }

    /// Mask of the entity at position `i` in [`entities`](Self::entities)
    pub fn mask_at(&self, i: usize) -> BitSlice<'_> {
        self.masks.slice(self.spans[i])
    }

    /// Mask of `entity`, or `None` if it is absent
    pub fn get(&self, entity: EntityId) -> Option<BitSlice<'_>> {
        let i = self.entities.binary_search(&entity).ok()?;
        Some(self.mask_at(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, BitSlice<'_>)> + '_ {
        self.entities
            .iter()
            .zip(&self.spans)
            .map(move |(&entity, &span)| (entity, self.masks.slice(span)))
    }

    /// Total number of frames set
    pub fn frame_count(&self) -> usize {
        self.masks.count_ones()
    }

    /// Check the layout invariants: ascending ids and spans partitioning the bit buffer
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
        next == self.masks.len()
    }

    pub fn memory_usage(&self) -> usize {
        self.entities.capacity() * std::mem::size_of::<EntityId>()
            + self.spans.capacity() * std::mem::size_of::<Span>()
            + self.masks.memory_usage()
    }
}

fn mask_set_apply(lhs: &MaskSet, rhs: &MaskSet, op: SetOp) -> MaskSet {
    let max_entities = lhs.len() + rhs.len();
    let mut out = MaskSet {
        entities: Vec::with_capacity(max_entities),
        spans: Vec::with_capacity(max_entities),
        masks: BitBuf::zeros(lhs.bit_count() + rhs.bit_count()),
    };
    let mut masks_i = 0;

    merge_join(&lhs.entities, &rhs.entities, op, |step| {
        let (entity, span) = match step {
            JoinStep::Left(i) => {
                let src = lhs.mask_at(i);
                let span = Span::new(masks_i, src.len());
                out.masks.slice_mut(span).copy_from(src);
                (lhs.entities[i], span)
            }
            JoinStep::Right(j) => {
                let src = rhs.mask_at(j);
                let span = Span::new(masks_i, src.len());
                out.masks.slice_mut(span).copy_from(src);
                (rhs.entities[j], span)
            }
            JoinStep::Both(i, j) => {
                let span = Span::new(masks_i, lhs.mask_at(i).len());
                masks_apply(op, &mut out.masks.slice_mut(span), lhs.mask_at(i), rhs.mask_at(j));
                (lhs.entities[i], span)
            }
        };

        // An entity with no frames set is dropped, matching the interval form
        if out.masks.slice(span).any() {
            out.entities.push(entity);
            out.spans.push(span);
            masks_i = span.end();
        }
    });

    out.masks.truncate(masks_i);
    out
}

/// Entity-wise union
pub fn mask_set_union(lhs: &MaskSet, rhs: &MaskSet) -> MaskSet {
    mask_set_apply(lhs, rhs, SetOp::Union)
}

/// Entity-wise intersection
pub fn mask_set_intersection(lhs: &MaskSet, rhs: &MaskSet) -> MaskSet {
    mask_set_apply(lhs, rhs, SetOp::Intersection)
}

/// Entity-wise difference (`lhs` minus `rhs`)
pub fn mask_set_difference(lhs: &MaskSet, rhs: &MaskSet) -> MaskSet {
    mask_set_apply(lhs, rhs, SetOp::Difference)
}

/// Dispatch to the set-wide operator matching `op`
pub fn mask_set_op(op: SetOp, lhs: &MaskSet, rhs: &MaskSet) -> MaskSet {
    mask_set_apply(lhs, rhs, op)
}
