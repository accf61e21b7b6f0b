//! Per-entity interval list operators.
//!
//! Each operator sweeps the time-ordered boundary events of both inputs at
//! once (an interval contributes an activation event at `start` and a
//! deactivation event at `stop`). Events that land on the same frame are
//! applied together before the output state is re-evaluated, so touching
//! intervals never leave a zero-length gap in the output.
//!
//! Inputs must be sorted by `start`. The output is always canonical: sorted,
//! non-overlapping and non-touching.
//!
//! `out` must be pre-sized by the caller; `lhs.len() + rhs.len()` is always
//! enough. The return value is the number of intervals written.

use super::types::{Frame, Interval, SetOp};

/// Cursor over the boundary events of one interval list
struct Events<'a> {
    ranges: &'a [Interval],
    /// Event index: even = start of `ranges[i / 2]`, odd = its stop
    i: usize,
    active: bool,
}

impl<'a> Events<'a> {
    fn new(ranges: &'a [Interval]) -> Self {
        Self {
            ranges,
            i: 0,
            active: false,
        }
    }

    #[inline]
    fn is_done(&self) -> bool {
        self.i >= self.ranges.len() * 2
    }

    /// Time of the next event, if any
    #[inline]
    fn peek(&self) -> Option<Frame> {
        let range = self.ranges.get(self.i / 2)?;
        Some(if self.i % 2 == 0 { range.start } else { range.stop })
    }

    /// Apply every event at time `t`, leaving the cursor on the first later event
    #[inline]
    fn advance_to(&mut self, t: Frame) {
        while self.peek() == Some(t) {
            self.active = self.i % 2 == 0;
            self.i += 1;
        }
    }
}

/// Output writer tracking the activation state of the result
struct Output<'a> {
    out: &'a mut [Interval],
    n: usize,
    active: bool,
}

impl Output<'_> {
    #[inline]
    fn update(&mut self, t: Frame, active: bool) {
        if !self.active && active {
            self.out[self.n].start = t;
            self.active = true;
        } else if self.active && !active {
            self.out[self.n].stop = t;
            self.active = false;
            self.n += 1;
        }
    }
}

fn sweep(out: &mut [Interval], lhs: &[Interval], rhs: &[Interval], op: SetOp) -> usize {
    let mut lhs = Events::new(lhs);
    let mut rhs = Events::new(rhs);
    let mut out = Output {
        out,
        n: 0,
        active: false,
    };

    loop {
        // Once an input is exhausted only the other one can change the output,
        // and for some operators not even that.
        match op {
            SetOp::Intersection if lhs.is_done() || rhs.is_done() => break,
            SetOp::Difference if lhs.is_done() => break,
            _ => {}
        }

        let t = match (lhs.peek(), rhs.peek()) {
            (Some(l), Some(r)) => l.min(r),
            (Some(l), None) => l,
            (None, Some(r)) => r,
            (None, None) => break,
        };

        lhs.advance_to(t);
        rhs.advance_to(t);
        out.update(t, op.apply(lhs.active, rhs.active));
    }

    debug_assert!(!out.active, "sweep finished with an open output interval");
    out.n
}

/// Union of two interval lists
pub fn ranges_union(out: &mut [Interval], lhs: &[Interval], rhs: &[Interval]) -> usize {
    sweep(out, lhs, rhs, SetOp::Union)
}

/// Intersection of two interval lists
pub fn ranges_intersection(out: &mut [Interval], lhs: &[Interval], rhs: &[Interval]) -> usize {
    sweep(out, lhs, rhs, SetOp::Intersection)
}

/// Frames of `lhs` not covered by `rhs`
pub fn ranges_difference(out: &mut [Interval], lhs: &[Interval], rhs: &[Interval]) -> usize {
    sweep(out, lhs, rhs, SetOp::Difference)
}

/// Dispatch to the operator matching `op`
pub fn ranges_apply(
    op: SetOp,
    out: &mut [Interval],
    lhs: &[Interval],
    rhs: &[Interval],
) -> usize {
    sweep(out, lhs, rhs, op)
}

/// Whether a list is sorted, non-overlapping, non-touching and free of empty intervals
pub fn is_canonical(ranges: &[Interval]) -> bool {
    ranges.iter().all(|r| r.start >= 0 && r.start < r.stop)
        && ranges.windows(2).all(|w| w[0].stop < w[1].start)
}
