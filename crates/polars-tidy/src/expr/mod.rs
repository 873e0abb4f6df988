//! The lazily recorded expression graph.
//!
//! Builder calls return new [`Node`]s and never touch data. A tree is only
//! lowered to engine expressions when a frame verb runs it.
mod builder;
pub mod functions;
mod node;
mod op;

use crate::dtype::Dtype;
use crate::error::TidyResult;
use crate::literal::Literal;
use crate::tidy_bail;

pub use functions::*;
pub use node::{Node, Operand};
pub use op::{CumulativeKind, FillStrategy, Op, RankMethod, WindowKind, WindowOptions};

/// What a verb callback may hand back.
#[derive(Clone, Debug)]
pub enum ClosureValue {
    Node(Node),
    Literal(Literal),
    /// Named expressions, or `(direction, expression)` for `arrange`.
    Pairs(Vec<(String, Node)>),
    Nodes(Vec<Node>),
}

impl ClosureValue {
    fn describe(&self) -> String {
        match self {
            ClosureValue::Node(node) => format!("expression {node} of dtype {}", node.dtype()),
            ClosureValue::Literal(lit) => format!("value {lit}"),
            ClosureValue::Pairs(_) => "a list of pairs".to_string(),
            ClosureValue::Nodes(_) => "a list of expressions".to_string(),
        }
    }

    /// Validates a filter predicate.
    pub(crate) fn into_predicate(self) -> TidyResult<Node> {
        match self {
            ClosureValue::Node(node) if node.dtype() == &Dtype::Boolean => Ok(node),
            other => tidy_bail!(
                InvalidReturnType: "expecting the function to return a boolean expression, got {}",
                other.describe()
            ),
        }
    }

    /// Validates the named expressions of `mutate` and `summarise`.
    pub(crate) fn into_pairs(self) -> TidyResult<Vec<(String, Node)>> {
        match self {
            ClosureValue::Pairs(pairs) => Ok(pairs),
            other => tidy_bail!(
                InvalidReturnType: "expecting the function to return a list of (name, expression) pairs, got {}",
                other.describe()
            ),
        }
    }

    /// Validates sort keys, returning `(descending, expression)` per key.
    pub(crate) fn into_sort_keys(self) -> TidyResult<Vec<(bool, Node)>> {
        match self {
            ClosureValue::Node(node) => Ok(vec![(false, node)]),
            ClosureValue::Nodes(nodes) => Ok(nodes.into_iter().map(|n| (false, n)).collect()),
            ClosureValue::Pairs(pairs) => pairs
                .into_iter()
                .map(|(direction, node)| match direction.as_str() {
                    "asc" => Ok((false, node)),
                    "desc" => Ok((true, node)),
                    _ => tidy_bail!(InvalidDirection: "{:?}", direction),
                })
                .collect(),
            other => tidy_bail!(
                InvalidReturnType: "expecting the function to return sort keys, got {}",
                other.describe()
            ),
        }
    }
}

impl From<Node> for ClosureValue {
    fn from(node: Node) -> Self {
        ClosureValue::Node(node)
    }
}

impl From<Literal> for ClosureValue {
    fn from(lit: Literal) -> Self {
        ClosureValue::Literal(lit)
    }
}

impl From<Vec<Node>> for ClosureValue {
    fn from(nodes: Vec<Node>) -> Self {
        ClosureValue::Nodes(nodes)
    }
}

impl<S: Into<String>> From<Vec<(S, Node)>> for ClosureValue {
    fn from(pairs: Vec<(S, Node)>) -> Self {
        ClosureValue::Pairs(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
