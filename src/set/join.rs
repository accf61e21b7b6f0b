//! Sorted merge-join over the entity lists of two sets.

use super::types::{EntityId, SetOp};

/// One step of a merge-join, as positions into the two entity lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStep {
    /// Entity only present in the left set
    Left(usize),
    /// Entity only present in the right set
    Right(usize),
    /// Entity present in both
    Both(usize, usize),
}

/// Walk two ascending entity lists in lockstep, calling `visit` for each
/// step that can contribute to the result of `op`. Steps for entities that
/// `op` drops outright are skipped.
pub fn merge_join(
    lhs: &[EntityId],
    rhs: &[EntityId],
    op: SetOp,
    mut visit: impl FnMut(JoinStep),
) {
    let mut lhs_i = 0;
    let mut rhs_i = 0;

    while lhs_i < lhs.len() && rhs_i < rhs.len() {
        if lhs[lhs_i] < rhs[rhs_i] {
            if op.keeps_left_only() {
                visit(JoinStep::Left(lhs_i));
            }
            lhs_i += 1;
        } else if rhs[rhs_i] < lhs[lhs_i] {
            if op.keeps_right_only() {
                visit(JoinStep::Right(rhs_i));
            }
            rhs_i += 1;
        } else {
            visit(JoinStep::Both(lhs_i, rhs_i));
            lhs_i += 1;
            rhs_i += 1;
        }
    }

    if op.keeps_left_only() {
        (lhs_i..lhs.len()).for_each(|i| visit(JoinStep::Left(i)));
    }
    if op.keeps_right_only() {
        (rhs_i..rhs.len()).for_each(|i| visit(JoinStep::Right(i)));
    }
}

/// Whether an entity list is strictly ascending
pub fn is_strictly_ascending(entities: &[EntityId]) -> bool {
    entities.windows(2).all(|w| w[0] < w[1])
}
