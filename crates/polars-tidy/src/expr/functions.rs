use super::node::{Node, Operand};
use super::op::Op;
use crate::literal::Literal;
use crate::series::SeriesRef;

/// A literal value as an expression.
pub fn lit<L: Into<Literal>>(value: L) -> Node {
    Node::literal(value.into())
}

/// An engine series as an expression.
pub fn series(s: SeriesRef) -> Node {
    Node::series(s)
}

/// Horizontally concatenates the string representation of `exprs`.
pub fn concat_str<E, I>(exprs: I, separator: &str) -> Node
where
    E: Into<Operand>,
    I: IntoIterator<Item = E>,
{
    Node::new(
        Op::ConcatStr {
            separator: separator.to_string(),
        },
        exprs.into_iter().map(Into::into).collect(),
    )
}

/// Joins expressions and literal fragments into one string column.
///
/// ```ignore
/// format([name.into(), " is ".into(), age.into()])
/// ```
pub fn format<I: IntoIterator<Item = Operand>>(parts: I) -> Node {
    concat_str(parts, "")
}

/// First non-missing value across `exprs`, row by row.
pub fn coalesce<E, I>(exprs: I) -> Node
where
    E: Into<Operand>,
    I: IntoIterator<Item = E>,
{
    Node::new(Op::Coalesce, exprs.into_iter().map(Into::into).collect())
}

pub fn covariance(a: impl Into<Operand>, b: impl Into<Operand>, ddof: u8) -> Node {
    Node::new(Op::Covariance { ddof }, vec![a.into(), b.into()])
}

pub fn correlation(a: impl Into<Operand>, b: impl Into<Operand>) -> Node {
    Node::new(Op::Correlation, vec![a.into(), b.into()])
}
