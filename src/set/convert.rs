//! Conversion between interval lists and bitmasks.

use super::bits::{BitBuf, BitSlice, BitSliceMut};
use super::mask_set::MaskSet;
use super::range_set::RangeSet;
use super::types::{EntityId, Interval, Span};

/// Write `ranges` into `out` as set bits; every other bit is cleared
pub fn rasterize(out: &mut BitSliceMut<'_>, ranges: &[Interval]) {
    out.fill(false);
    for range in ranges {
        let frames = range.frames();
        out.fill_range(frames.start, frames.end, true);
    }
}

/// Write one interval per maximal run of set bits in `mask` into `out`.
///
/// `out` must hold at least [`vectorize_count`] intervals. Returns the number
/// of intervals written.
pub fn vectorize(out: &mut [Interval], mask: BitSlice<'_>) -> usize {
    let mut active = false;
    let mut n = 0;

    for (i, bit) in mask.iter().enumerate() {
        if !active && bit {
            out[n].start = i as i32;
            active = true;
        } else if active && !bit {
            out[n].stop = i as i32;
            active = false;
            n += 1;
        }
    }

    // Run reaching the end of the mask
    if active {
        out[n].stop = mask.len() as i32;
        n += 1;
    }

    n
}

/// Number of intervals [`vectorize`] will produce for `mask`
pub fn vectorize_count(mask: BitSlice<'_>) -> usize {
    let mut active = false;
    let mut n = 0;

    for bit in mask.iter() {
        if !active && bit {
            active = true;
        } else if active && !bit {
            active = false;
            n += 1;
        }
    }

    if active {
        n += 1;
    }

    n
}

/// Frame count of `entity`, taken from the stop of its last interval in the universe set
fn entity_length(universe: &RangeSet, entity: EntityId) -> usize {
    match universe.get(entity).and_then(|r| r.last()) {
        Some(range) => range.stop.max(0) as usize,
        None => panic!("entity {} is not part of the universe set", entity),
    }
}

/// Convert every entity of `set` to a bitmask sized from `universe`
pub fn range_set_rasterize(set: &RangeSet, universe: &RangeSet) -> MaskSet {
    let entities: Vec<EntityId> = set.entities().to_vec();

    // Size every mask first so the bit buffer is allocated once
    let mut spans = Vec::with_capacity(entities.len());
    let mut masks_i = 0;
    for &entity in &entities {
        let len = entity_length(universe, entity);
        spans.push(Span::new(masks_i, len));
        masks_i += len;
    }

    let mut masks = BitBuf::zeros(masks_i);
    for (i, &span) in spans.iter().enumerate() {
        rasterize(&mut masks.slice_mut(span), set.intervals_at(i));
    }

    MaskSet::from_parts(entities, spans, masks)
}

/// Convert every entity of `set` back to an interval list
pub fn mask_set_vectorize(set: &MaskSet) -> RangeSet {
    // Count first so the interval buffer is allocated once
    let counts: Vec<usize> = set.iter().map(|(_, mask)| vectorize_count(mask)).collect();
    let mut ranges = vec![Interval::default(); counts.iter().sum()];

    let mut ranges_i = 0;
    let mut spans = Vec::with_capacity(counts.len());
    for ((_, mask), &count) in set.iter().zip(&counts) {
        let written = vectorize(&mut ranges[ranges_i..ranges_i + count], mask);
        assert_eq!(written, count, "vectorize and vectorize_count disagree");
        spans.push(Span::new(ranges_i, count));
        ranges_i += count;
    }

    RangeSet::from_entries(
        set.entities()
            .iter()
            .zip(&spans)
            .map(|(&entity, span)| (entity, &ranges[span.range()])),
    )
}
