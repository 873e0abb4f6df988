use std::fmt::{Display, Formatter};

use crate::dtype::Dtype;
use crate::literal::Literal;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WindowKind {
    Max,
    Mean,
    Median,
    Min,
    Sum,
    StandardDeviation,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WindowOptions {
    pub size: usize,
    /// Multiplied element-wise with the values of each window.
    pub weights: Option<Vec<f64>>,
    /// Label each window at its center instead of its right edge.
    pub center: bool,
}

impl WindowOptions {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            weights: None,
            center: false,
        }
    }

    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn with_center(mut self, center: bool) -> Self {
        self.center = center;
        self
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CumulativeKind {
    Max,
    Min,
    Sum,
    Product,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum RankMethod {
    #[default]
    Average,
    Min,
    Max,
    Dense,
    Ordinal,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FillStrategy {
    Forward,
    Backward,
    Max,
    Min,
    Mean,
}

/// The operation recorded by a [`Node`](super::Node).
///
/// Parameters that are not expressions live in the variant, expression
/// operands live in the node's arguments.
#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    Column(String),
    Literal(Literal),
    /// A series owned by the engine, as the single argument.
    Series,

    // comparison
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Pow,
    Remainder,
    Quotient,

    // elementwise numeric
    Abs,
    Round(u32),
    Floor,
    Ceil,
    /// Bounds the first argument by the second (lower) and third (upper).
    Clip,
    Log(f64),
    Exp,

    // boolean algebra
    And,
    Or,
    Not,

    IsNil,
    IsNotNil,
    IsNan,
    IsInfinite,
    IsFinite,

    // strings
    Contains(String),
    /// Regular expression match.
    ReContains(String),
    Upcase,
    Downcase,
    Strip,
    Lstrip,
    Rstrip,
    Substring { offset: i64, length: Option<u64> },
    Replace { pattern: String, replacement: String },
    ReReplace { pattern: String, replacement: String },
    Split(String),
    Lengths,

    // date and time components
    DayOfWeek,
    DayOfYear,
    WeekOfYear,
    Month,
    Year,
    Hour,
    Minute,
    Second,
    Strftime(String),

    // aggregations
    Sum,
    Mean,
    Median,
    Quantile(f64),
    Min,
    Max,
    First,
    Last,
    Count,
    NilCount,
    NDistinct,
    StandardDeviation { ddof: u8 },
    Variance { ddof: u8 },
    Skew { bias: bool },
    Product,
    Covariance { ddof: u8 },
    Correlation,
    ArgMax,
    ArgMin,
    All,
    Any,

    // windows
    Window { kind: WindowKind, options: WindowOptions },
    Cumulative { kind: CumulativeKind, reverse: bool },

    // ordering
    Sort { descending: bool },
    Argsort { descending: bool },
    Rank { method: RankMethod, descending: bool },
    Reverse,

    Cast(Dtype),
    FillMissing(FillStrategy),
    /// Fill missing values of the first argument with the second.
    FillMissingWith,
    Slice { offset: i64, length: usize },
    Head(usize),
    Tail(usize),
    Shift(i64),
    Coalesce,
    ConcatStr { separator: String },
}

impl Op {
    /// Whether the operation reduces its input to a single value.
    pub fn is_aggregation(&self) -> bool {
        use Op::*;
        matches!(
            self,
            Sum | Mean
                | Median
                | Quantile(_)
                | Min
                | Max
                | First
                | Last
                | Count
                | NilCount
                | NDistinct
                | StandardDeviation { .. }
                | Variance { .. }
                | Skew { .. }
                | Product
                | Covariance { .. }
                | Correlation
                | ArgMax
                | ArgMin
                | All
                | Any
        )
    }

    pub fn is_comparison(&self) -> bool {
        use Op::*;
        matches!(
            self,
            Equal | NotEqual | Greater | GreaterEqual | Less | LessEqual
        )
    }

    pub fn name(&self) -> &'static str {
        use Op::*;
        match self {
            Column(_) => "column",
            Literal(_) => "literal",
            Series => "series",
            Equal => "equal",
            NotEqual => "not_equal",
            Greater => "greater",
            GreaterEqual => "greater_equal",
            Less => "less",
            LessEqual => "less_equal",
            Add => "add",
            Subtract => "subtract",
            Multiply => "multiply",
            Divide => "divide",
            Pow => "pow",
            Remainder => "remainder",
            Quotient => "quotient",
            Abs => "abs",
            Round(_) => "round",
            Floor => "floor",
            Ceil => "ceil",
            Clip => "clip",
            Log(_) => "log",
            Exp => "exp",
            And => "and",
            Or => "or",
            Not => "not",
            IsNil => "is_nil",
            IsNotNil => "is_not_nil",
            IsNan => "is_nan",
            IsInfinite => "is_infinite",
            IsFinite => "is_finite",
            Contains(_) => "contains",
            ReContains(_) => "re_contains",
            Upcase => "upcase",
            Downcase => "downcase",
            Strip => "strip",
            Lstrip => "lstrip",
            Rstrip => "rstrip",
            Substring { .. } => "substring",
            Replace { .. } => "replace",
            ReReplace { .. } => "re_replace",
            Split(_) => "split",
            Lengths => "lengths",
            DayOfWeek => "day_of_week",
            DayOfYear => "day_of_year",
            WeekOfYear => "week_of_year",
            Month => "month",
            Year => "year",
            Hour => "hour",
            Minute => "minute",
            Second => "second",
            Strftime(_) => "strftime",
            Sum => "sum",
            Mean => "mean",
            Median => "median",
            Quantile(_) => "quantile",
            Min => "min",
            Max => "max",
            First => "first",
            Last => "last",
            Count => "count",
            NilCount => "nil_count",
            NDistinct => "n_distinct",
            StandardDeviation { .. } => "standard_deviation",
            Variance { .. } => "variance",
            Skew { .. } => "skew",
            Product => "product",
            Covariance { .. } => "covariance",
            Correlation => "correlation",
            ArgMax => "argmax",
            ArgMin => "argmin",
            All => "all",
            Any => "any",
            Window { kind, .. } => match kind {
                WindowKind::Max => "window_max",
                WindowKind::Mean => "window_mean",
                WindowKind::Median => "window_median",
                WindowKind::Min => "window_min",
                WindowKind::Sum => "window_sum",
                WindowKind::StandardDeviation => "window_standard_deviation",
            },
            Cumulative { kind, .. } => match kind {
                CumulativeKind::Max => "cumulative_max",
                CumulativeKind::Min => "cumulative_min",
                CumulativeKind::Sum => "cumulative_sum",
                CumulativeKind::Product => "cumulative_product",
            },
            Sort { .. } => "sort",
            Argsort { .. } => "argsort",
            Rank { .. } => "rank",
            Reverse => "reverse",
            Cast(_) => "cast",
            FillMissing(_) => "fill_missing",
            FillMissingWith => "fill_missing",
            Slice { .. } => "slice",
            Head(_) => "head",
            Tail(_) => "tail",
            Shift(_) => "shift",
            Coalesce => "coalesce",
            ConcatStr { .. } => "concat",
        }
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
