//! Evaluation of postfix expressions against atomic source sets.

use crate::query::expr::{QueryExpression, Token};
use crate::set::{mask_set_op, range_set_op, MaskSet, RangeSet, SetOp};

/// A set representation the evaluator can combine
pub trait SetAlgebra: Clone + Default {
    fn combine(op: SetOp, lhs: &Self, rhs: &Self) -> Self;
}

impl SetAlgebra for RangeSet {
    fn combine(op: SetOp, lhs: &Self, rhs: &Self) -> Self {
        range_set_op(op, lhs, rhs)
    }
}

impl SetAlgebra for MaskSet {
    fn combine(op: SetOp, lhs: &Self, rhs: &Self) -> Self {
        mask_set_op(op, lhs, rhs)
    }
}

/// Evaluate the sub-expression rooted at the last token of `tokens`.
/// Returns the result and the number of tokens it consumed.
fn evaluate_from<S: SetAlgebra>(tokens: &[Token], sources: &[S]) -> (S, usize) {
    let Some((&top, below)) = tokens.split_last() else {
        panic!("malformed postfix expression: operator is missing an operand");
    };

    match top {
        Token::Op(op) => {
            let (lhs, lhs_n) = evaluate_from(below, sources);
            let (rhs, rhs_n) = evaluate_from(&below[..below.len() - lhs_n], sources);
            (S::combine(op, &lhs, &rhs), 1 + lhs_n + rhs_n)
        }
        Token::Set(index) => match sources.get(index as usize) {
            Some(set) => (set.clone(), 1),
            None => panic!(
                "set index {} out of range for {} source sets",
                index,
                sources.len()
            ),
        },
    }
}

/// Evaluate `expr` against `sources`, indexed by the expression's set tokens.
///
/// An empty expression evaluates to the empty set. Panics if the expression
/// is not a well-formed postfix sequence.
pub fn evaluate<S: SetAlgebra>(expr: &QueryExpression, sources: &[S]) -> S {
    let tokens = expr.tokens();
    if tokens.is_empty() {
        return S::default();
    }

    let (result, consumed) = evaluate_from(tokens, sources);
    assert_eq!(
        consumed,
        tokens.len(),
        "malformed postfix expression {}: {} of {} tokens consumed",
        expr,
        consumed,
        tokens.len()
    );
    result
}

/// Evaluate against interval-list sources
pub fn evaluate_range_set(expr: &QueryExpression, sources: &[RangeSet]) -> RangeSet {
    evaluate(expr, sources)
}

/// Evaluate against bitmask sources
pub fn evaluate_mask_set(expr: &QueryExpression, sources: &[MaskSet]) -> MaskSet {
    evaluate(expr, sources)
}
