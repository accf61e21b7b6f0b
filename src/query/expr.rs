//! Postfix encoding of boolean formulas over atomic sets.

use crate::set::SetOp;
use smallvec::SmallVec;
use std::fmt;
use std::ops::{BitAnd, BitOr, Sub};

/// Numeric code of the union operator in the flat token encoding
pub const OP_UNION: i32 = -1;
/// Numeric code of the intersection operator in the flat token encoding
pub const OP_INTERSECTION: i32 = -2;
/// Numeric code of the difference operator in the flat token encoding
pub const OP_DIFFERENCE: i32 = -3;

/// Number of tokens stored inline before spilling to the heap
pub const INLINE_TOKENS: usize = 16;

/// One element of a postfix expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// Reference to the atomic set at this index
    Set(u32),
    /// Operator combining the two operands below it
    Op(SetOp),
}

impl Token {
    /// Flat integer code: set indices are non-negative, operators negative
    pub fn code(self) -> i32 {
        match self {
            Token::Set(index) => index as i32,
            Token::Op(SetOp::Union) => OP_UNION,
            Token::Op(SetOp::Intersection) => OP_INTERSECTION,
            Token::Op(SetOp::Difference) => OP_DIFFERENCE,
        }
    }

    /// Decode a flat integer code; `None` for unknown negative codes
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            OP_UNION => Some(Token::Op(SetOp::Union)),
            OP_INTERSECTION => Some(Token::Op(SetOp::Intersection)),
            OP_DIFFERENCE => Some(Token::Op(SetOp::Difference)),
            n if n >= 0 => Some(Token::Set(n as u32)),
            _ => None,
        }
    }
}

/// Immutable postfix expression.
///
/// Combining `lhs op rhs` lays out `[rhs.., lhs.., op]`: the root operator is
/// always last and its left operand sits directly beneath it. Equality and
/// hashing compare the token sequence exactly, so differently shaped but
/// equivalent formulas are distinct values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QueryExpression {
    tokens: SmallVec<[Token; INLINE_TOKENS]>,
}

impl QueryExpression {
    /// Expression with no tokens; evaluates to the empty set
    pub fn empty() -> Self {
        Self::default()
    }

    /// Reference to the atomic set at `index`.
    ///
    /// Panics if `index` does not fit the non-negative half of the flat code space.
    pub fn atom(index: usize) -> Self {
        let code = i32::try_from(index).unwrap_or_else(|_| panic!("set index {} too large", index));
        let mut tokens = SmallVec::new();
        tokens.push(Token::Set(code as u32));
        Self { tokens }
    }

    /// Combine two expressions under `op`
    pub fn combine(lhs: &QueryExpression, rhs: &QueryExpression, op: SetOp) -> Self {
        let mut tokens = SmallVec::with_capacity(lhs.len() + rhs.len() + 1);
        tokens.extend_from_slice(&rhs.tokens);
        tokens.extend_from_slice(&lhs.tokens);
        tokens.push(Token::Op(op));
        Self { tokens }
    }

    /// Rebuild from flat integer codes, rejecting unknown operator codes
    pub fn from_codes(codes: &[i32]) -> Option<Self> {
        let tokens = codes
            .iter()
            .map(|&c| Token::from_code(c))
            .collect::<Option<SmallVec<[Token; INLINE_TOKENS]>>>()?;
        Some(Self { tokens })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Flat integer codes of the token sequence
    pub fn codes(&self) -> Vec<i32> {
        self.tokens.iter().map(|t| t.code()).collect()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Whether the tokens still fit in the inline buffer
    pub fn is_inline(&self) -> bool {
        !self.tokens.spilled()
    }

    /// Whether every operator has exactly two operands and exactly one value remains
    pub fn is_well_formed(&self) -> bool {
        let mut depth = 0usize;
        for token in &self.tokens {
            match token {
                Token::Set(_) => depth += 1,
                Token::Op(_) => {
                    if depth < 2 {
                        return false;
                    }
                    depth -= 1;
                }
            }
        }
        depth == 1 || self.tokens.is_empty()
    }

    /// Render as an infix formula using `names` for set indices
    pub fn to_infix<S: AsRef<str>>(&self, names: &[S]) -> String {
        if self.tokens.is_empty() {
            return String::new();
        }
        let (text, _) = infix_from(&self.tokens, names, true);
        text
    }
}

/// Render the expression whose root is the last token of `tokens`.
/// Returns the text and the number of tokens consumed.
fn infix_from<S: AsRef<str>>(tokens: &[Token], names: &[S], top: bool) -> (String, usize) {
    match tokens.last() {
        Some(&Token::Op(op)) => {
            let below = &tokens[..tokens.len() - 1];
            let (lhs, lhs_n) = infix_from(below, names, false);
            let (rhs, rhs_n) = infix_from(&below[..below.len() - lhs_n], names, false);
            let text = if top {
                format!("{} {} {}", lhs, op, rhs)
            } else {
                format!("({} {} {})", lhs, op, rhs)
            };
            (text, 1 + lhs_n + rhs_n)
        }
        Some(&Token::Set(index)) => {
            let name = names
                .get(index as usize)
                .map(|n| n.as_ref().to_string())
                .unwrap_or_else(|| format!("#{}", index));
            (name, 1)
        }
        None => panic!("malformed postfix expression: operator is missing an operand"),
    }
}

impl fmt::Display for QueryExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<String> = self.tokens.iter().map(|t| t.code().to_string()).collect();
        write!(f, "[{}]", codes.join(" "))
    }
}

macro_rules! impl_combinator {
    ($trait:ident, $method:ident, $op:expr) => {
        impl $trait for QueryExpression {
            type Output = QueryExpression;

            fn $method(self, rhs: QueryExpression) -> QueryExpression {
                QueryExpression::combine(&self, &rhs, $op)
            }
        }

        impl<'a> $trait<&'a QueryExpression> for &'a QueryExpression {
            type Output = QueryExpression;

            fn $method(self, rhs: &'a QueryExpression) -> QueryExpression {
                QueryExpression::combine(self, rhs, $op)
            }
        }
    };
}

impl_combinator!(BitOr, bitor, SetOp::Union);
impl_combinator!(BitAnd, bitand, SetOp::Intersection);
impl_combinator!(Sub, sub, SetOp::Difference);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atom() {
        let e = QueryExpression::atom(4);
        assert_eq!(e.tokens(), &[Token::Set(4)]);
        assert_eq!(e.codes(), vec![4]);
    }

    #[test]
    fn test_combine_layout() {
        let a = QueryExpression::atom(2);
        let b = QueryExpression::atom(3);
        let e = &a - &b;
        // rhs tokens first, then lhs tokens, then the operator
        assert_eq!(e.codes(), vec![3, 2, OP_DIFFERENCE]);
    }

    #[test]
    fn test_nested_layout() {
        let running = QueryExpression::atom(4);
        let male = QueryExpression::atom(2);
        let tired = QueryExpression::atom(6);
        let limping = QueryExpression::atom(7);
        let e = running & male & (tired | limping);
        assert_eq!(
            e.codes(),
            vec![7, 6, OP_UNION, 2, 4, OP_INTERSECTION, OP_INTERSECTION]
        );
        assert!(e.is_well_formed());
    }

    #[test]
    fn test_structural_equality_is_shape_sensitive() {
        let a = QueryExpression::atom(2);
        let b = QueryExpression::atom(3);
        assert_eq!(&a | &b, &a | &b);
        // Same set, different shape
        assert_ne!(&a | &b, &b | &a);
    }

    #[test]
    fn test_largest_atom_keeps_non_negative_code() {
        let e = QueryExpression::atom(i32::MAX as usize);
        assert_eq!(e.codes(), vec![i32::MAX]);
        assert_eq!(QueryExpression::from_codes(&e.codes()), Some(e));
    }

    #[test]
    #[should_panic(expected = "too large")]
    fn test_atom_beyond_code_space_panics() {
        QueryExpression::atom(i32::MAX as usize + 1);
    }

    #[test]
    fn test_codes_round_trip() {
        let e = (QueryExpression::atom(1) | QueryExpression::atom(5)) - QueryExpression::atom(0);
        assert_eq!(QueryExpression::from_codes(&e.codes()), Some(e));
        assert_eq!(QueryExpression::from_codes(&[1, -7]), None);
    }

    #[test]
    fn test_inline_storage_spills() {
        let mut e = QueryExpression::atom(0);
        for i in 1..8 {
            e = e | QueryExpression::atom(i);
        }
        assert_eq!(e.len(), 15);
        assert!(e.is_inline());
        e = e & QueryExpression::atom(9);
        assert_eq!(e.len(), 17);
        assert!(!e.is_inline());
        assert!(e.is_well_formed());
    }

    #[test]
    fn test_is_well_formed() {
        assert!(QueryExpression::empty().is_well_formed());
        assert!(!QueryExpression::from_codes(&[1, OP_UNION]).unwrap().is_well_formed());
        assert!(!QueryExpression::from_codes(&[1, 2]).unwrap().is_well_formed());
    }

    #[test]
    fn test_to_infix() {
        let names = ["All", "None", "Male", "Female", "Running"];
        let e = (QueryExpression::atom(2) - QueryExpression::atom(3)) & QueryExpression::atom(4);
        assert_eq!(e.to_infix(&names), "(Male - Female) & Running");
        assert_eq!(QueryExpression::atom(9).to_infix(&names), "#9");
    }

    #[test]
    fn test_display() {
        let e = QueryExpression::atom(2) | QueryExpression::atom(3);
        assert_eq!(e.to_string(), "[3 2 -1]");
    }
}
