use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::op::{Op, RankMethod, WindowKind};
use crate::dtype::{Dtype, FloatWidth, Precision};
use crate::literal::Literal;
use crate::series::SeriesRef;

/// An argument of a [`Node`].
#[derive(Clone, Debug)]
pub enum Operand {
    Node(Node),
    Literal(Literal),
    Series(SeriesRef),
}

impl Operand {
    /// The dtype known without asking the engine.
    ///
    /// `None` for `nil` literals and for series of a dtype we cannot
    /// represent.
    pub fn dtype(&self) -> Option<Dtype> {
        match self {
            Operand::Node(node) => Some(node.dtype().clone()),
            Operand::Literal(lit) => lit.dtype(),
            Operand::Series(s) => Dtype::try_from(s.as_series().dtype()).ok(),
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Operand::Node(node) => Some(node),
            _ => None,
        }
    }

    fn has_aggregation(&self) -> bool {
        self.as_node().is_some_and(Node::has_aggregation)
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Node(node) => write!(f, "{node}"),
            Operand::Literal(lit) => write!(f, "{lit}"),
            Operand::Series(s) => write!(f, "series({:?})", s.name()),
        }
    }
}

impl From<Node> for Operand {
    fn from(node: Node) -> Self {
        Operand::Node(node)
    }
}

impl From<&Node> for Operand {
    fn from(node: &Node) -> Self {
        Operand::Node(node.clone())
    }
}

impl From<Literal> for Operand {
    fn from(lit: Literal) -> Self {
        Operand::Literal(lit)
    }
}

impl From<SeriesRef> for Operand {
    fn from(s: SeriesRef) -> Self {
        Operand::Series(s)
    }
}

macro_rules! impl_operand_from_literal {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Operand {
            fn from(v: $ty) -> Self {
                Operand::Literal(Literal::from(v))
            }
        })*
    };
}

impl_operand_from_literal!(
    i32,
    i64,
    u32,
    f32,
    f64,
    bool,
    &str,
    String,
    NaiveDate,
    NaiveTime,
    NaiveDateTime
);

struct NodeInner {
    op: Op,
    args: Vec<Operand>,
    dtype: Dtype,
}

/// A lazily recorded computation.
///
/// Nodes are immutable. Cloning only bumps a reference count, so subtrees are
/// freely shared between expressions.
#[derive(Clone)]
pub struct Node(Arc<NodeInner>);

impl Node {
    /// Records `op` over `args`, inferring the result dtype from the operands.
    pub fn new(op: Op, args: Vec<Operand>) -> Self {
        let dtype = infer_dtype(&op, &args);
        Self::with_dtype(op, args, dtype)
    }

    pub(crate) fn with_dtype(op: Op, args: Vec<Operand>, dtype: Dtype) -> Self {
        Node(Arc::new(NodeInner { op, args, dtype }))
    }

    pub(crate) fn column(name: &str, dtype: Dtype) -> Self {
        Self::with_dtype(Op::Column(name.to_string()), vec![], dtype)
    }

    pub fn literal(lit: Literal) -> Self {
        // An untyped nil reads as a float, like an empty literal list.
        let dtype = lit.dtype().unwrap_or(Dtype::F64);
        Self::with_dtype(Op::Literal(lit), vec![], dtype)
    }

    /// Wraps an engine series as an expression.
    pub fn series(s: SeriesRef) -> Self {
        let operand = Operand::Series(s);
        let dtype = operand.dtype().unwrap_or(Dtype::F64);
        Self::with_dtype(Op::Series, vec![operand], dtype)
    }

    pub fn op(&self) -> &Op {
        &self.0.op
    }

    pub fn args(&self) -> &[Operand] {
        &self.0.args
    }

    pub fn dtype(&self) -> &Dtype {
        &self.0.dtype
    }

    /// Whether this node or any node below it is an aggregation.
    pub fn has_aggregation(&self) -> bool {
        self.op().is_aggregation() || self.args().iter().any(Operand::has_aggregation)
    }

    /// Names of the columns referenced anywhere in the tree, in first
    /// appearance order.
    pub fn column_names(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns(&self, out: &mut Vec<String>) {
        if let Op::Column(name) = self.op() {
            if !out.contains(name) {
                out.push(name.clone());
            }
        }
        for arg in self.args() {
            if let Operand::Node(node) = arg {
                node.collect_columns(out);
            }
        }
    }

    /// Whether both handles point at the same recorded node.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.op() {
            Op::Column(name) => write!(f, "col({name:?})"),
            Op::Literal(lit) => write!(f, "{lit}"),
            op => {
                write!(f, "{op}(")?;
                for (i, arg) in self.args().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            },
        }
    }
}

impl Debug for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Node({self} :: {})", self.dtype())
    }
}

/// Numeric widening used for arithmetic. Untyped operands defer to the other
/// side.
fn widen(left: Option<Dtype>, right: Option<Dtype>) -> Dtype {
    match (left, right) {
        (None, None) => Dtype::F64,
        (Some(dt), None) | (None, Some(dt)) => dt,
        (Some(Dtype::Float(a)), Some(Dtype::Float(b))) => {
            if a == FloatWidth::F64 || b == FloatWidth::F64 {
                Dtype::F64
            } else {
                Dtype::F32
            }
        },
        (Some(Dtype::Integer), Some(Dtype::Float(w)))
        | (Some(Dtype::Float(w)), Some(Dtype::Integer)) => Dtype::Float(w),
        (Some(l), Some(_)) => l,
    }
}

fn float_if_integer(dtype: Option<Dtype>) -> Dtype {
    match dtype {
        Some(Dtype::Integer | Dtype::Boolean) | None => Dtype::F64,
        Some(dt) => dt,
    }
}

fn infer_dtype(op: &Op, args: &[Operand]) -> Dtype {
    use Op::*;

    let arg = |i: usize| args.get(i).and_then(Operand::dtype);
    let (left, right) = (arg(0), arg(1));

    match op {
        Column(_) | Series => left.unwrap_or(Dtype::F64),
        Literal(lit) => lit.dtype().unwrap_or(Dtype::F64),

        Equal | NotEqual | Greater | GreaterEqual | Less | LessEqual => Dtype::Boolean,
        And | Or | Not => Dtype::Boolean,
        IsNil | IsNotNil | IsNan | IsInfinite | IsFinite | Contains(_) | ReContains(_) => {
            Dtype::Boolean
        },
        All | Any => Dtype::Boolean,

        Add => match (left, right) {
            (Some(dt @ (Dtype::Date | Dtype::Datetime(_))), Some(Dtype::Duration(_)))
            | (Some(Dtype::Duration(_)), Some(dt @ (Dtype::Date | Dtype::Datetime(_)))) => dt,
            (l, r) => widen(l, r),
        },
        Subtract => match (left, right) {
            (Some(Dtype::Date), Some(Dtype::Date)) => Dtype::Duration(Precision::Millisecond),
            (Some(Dtype::Datetime(p)), Some(Dtype::Datetime(_) | Dtype::Date)) => {
                Dtype::Duration(p)
            },
            (l, r) => widen(l, r),
        },
        Multiply => match (left, right) {
            (Some(dt @ Dtype::Duration(_)), Some(other))
            | (Some(other), Some(dt @ Dtype::Duration(_)))
                if other.is_numeric() =>
            {
                dt
            },
            (l, r) => widen(l, r),
        },
        Divide => match (left, right) {
            (Some(dt @ Dtype::Duration(_)), Some(other)) if other.is_numeric() => dt,
            _ => Dtype::F64,
        },
        Pow | Remainder | Quotient => widen(left, right),
        Abs | Round(_) | Floor | Ceil | Clip => left.unwrap_or(Dtype::F64),
        Log(_) | Exp => Dtype::F64,

        Upcase | Downcase | Strip | Lstrip | Rstrip | Substring { .. } => Dtype::String,
        Replace { .. } | ReReplace { .. } | Strftime(_) => Dtype::String,
        ConcatStr { .. } => Dtype::String,
        Split(_) => Dtype::list(Dtype::String),
        Lengths => Dtype::Integer,

        DayOfWeek | DayOfYear | WeekOfYear | Month | Year | Hour | Minute | Second => {
            Dtype::Integer
        },

        Sum => match left {
            Some(Dtype::Boolean) => Dtype::Integer,
            l => l.unwrap_or(Dtype::F64),
        },
        Mean | Median | StandardDeviation { .. } | Variance { .. } | Skew { .. } => Dtype::F64,
        Covariance { .. } | Correlation => Dtype::F64,
        Quantile(_) => float_if_integer(left),
        Count | NilCount | NDistinct | Argsort { .. } | ArgMax | ArgMin => Dtype::Integer,
        Min | Max | First | Last | Product => left.unwrap_or(Dtype::F64),

        Window { kind, .. } => match kind {
            WindowKind::Mean | WindowKind::Median | WindowKind::StandardDeviation => {
                float_if_integer(left)
            },
            WindowKind::Max | WindowKind::Min | WindowKind::Sum => left.unwrap_or(Dtype::F64),
        },
        Cumulative { .. } => match left {
            Some(Dtype::Boolean) => Dtype::Integer,
            l => l.unwrap_or(Dtype::F64),
        },

        Rank { method, .. } => match method {
            RankMethod::Average => Dtype::F64,
            _ => Dtype::Integer,
        },
        Sort { .. } | Reverse | Slice { .. } | Head(_) | Tail(_) | Shift(_) => {
            left.unwrap_or(Dtype::F64)
        },
        FillMissing(_) => left.unwrap_or(Dtype::F64),
        FillMissingWith => widen(left, right),
        Coalesce => args
            .iter()
            .map(Operand::dtype)
            .fold(None, |acc, dt| match (acc, dt) {
                (None, dt) => dt,
                (acc, None) => acc,
                (acc, dt) => Some(widen(acc, dt)),
            })
            .unwrap_or(Dtype::F64),

        Cast(dtype) => dtype.clone(),
    }
}
