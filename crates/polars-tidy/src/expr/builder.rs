use std::ops;

use super::node::{Node, Operand};
use super::op::{CumulativeKind, FillStrategy, Op, RankMethod, WindowKind, WindowOptions};
use crate::dtype::Dtype;

macro_rules! unary {
    ($($(#[$meta:meta])* $name:ident => $op:expr),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $name(&self) -> Node {
                self.unary($op)
            }
        )*
    };
}

macro_rules! binary {
    ($($(#[$meta:meta])* $name:ident => $op:expr),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $name(&self, other: impl Into<Operand>) -> Node {
                self.binary($op, other)
            }
        )*
    };
}

impl Node {
    fn unary(&self, op: Op) -> Node {
        Node::new(op, vec![self.into()])
    }

    fn binary(&self, op: Op, other: impl Into<Operand>) -> Node {
        Node::new(op, vec![self.into(), other.into()])
    }

    binary! {
        equal => Op::Equal,
        not_equal => Op::NotEqual,
        greater => Op::Greater,
        greater_equal => Op::GreaterEqual,
        less => Op::Less,
        less_equal => Op::LessEqual,

        add => Op::Add,
        subtract => Op::Subtract,
        multiply => Op::Multiply,
        /// True division. The result is a float unless a duration is divided
        /// by a number.
        divide => Op::Divide,
        pow => Op::Pow,
        remainder => Op::Remainder,
        /// Floor division.
        quotient => Op::Quotient,

        and => Op::And,
        or => Op::Or,
    }

    unary! {
        not => Op::Not,
        is_nil => Op::IsNil,
        is_not_nil => Op::IsNotNil,
        is_nan => Op::IsNan,
        is_infinite => Op::IsInfinite,
        is_finite => Op::IsFinite,

        upcase => Op::Upcase,
        downcase => Op::Downcase,
        strip => Op::Strip,
        lstrip => Op::Lstrip,
        rstrip => Op::Rstrip,
        /// Number of characters of each string.
        lengths => Op::Lengths,

        /// Monday is 1, Sunday is 7.
        day_of_week => Op::DayOfWeek,
        day_of_year => Op::DayOfYear,
        /// ISO week number.
        week_of_year => Op::WeekOfYear,
        month => Op::Month,
        year => Op::Year,
        hour => Op::Hour,
        minute => Op::Minute,
        second => Op::Second,

        sum => Op::Sum,
        mean => Op::Mean,
        median => Op::Median,
        min => Op::Min,
        max => Op::Max,
        first => Op::First,
        last => Op::Last,
        /// Number of non-missing values.
        count => Op::Count,
        nil_count => Op::NilCount,
        n_distinct => Op::NDistinct,
        product => Op::Product,

        reverse => Op::Reverse,

        abs => Op::Abs,
        floor => Op::Floor,
        ceil => Op::Ceil,
        exp => Op::Exp,
        /// Position of the largest value.
        argmax => Op::ArgMax,
        argmin => Op::ArgMin,
        /// Whether every value is true. Missing values are skipped.
        all => Op::All,
        any => Op::Any,
    }

    /// Rounds to `decimals` decimal places.
    pub fn round(&self, decimals: u32) -> Node {
        self.unary(Op::Round(decimals))
    }

    /// Bounds values to `[min, max]`.
    pub fn clip(&self, min: impl Into<Operand>, max: impl Into<Operand>) -> Node {
        Node::new(Op::Clip, vec![self.into(), min.into(), max.into()])
    }

    pub fn log(&self, base: f64) -> Node {
        self.unary(Op::Log(base))
    }

    pub fn contains(&self, pattern: &str) -> Node {
        self.unary(Op::Contains(pattern.to_string()))
    }

    /// Characters from `offset` on. A negative offset counts from the end.
    pub fn substring(&self, offset: i64, length: Option<u64>) -> Node {
        self.unary(Op::Substring { offset, length })
    }

    /// Whether the regular expression `pattern` matches.
    pub fn re_contains(&self, pattern: &str) -> Node {
        self.unary(Op::ReContains(pattern.to_string()))
    }

    pub fn re_replace(&self, pattern: &str, replacement: &str) -> Node {
        self.unary(Op::ReReplace {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
        })
    }

    /// Formats dates and datetimes with a chrono format string.
    pub fn strftime(&self, format: &str) -> Node {
        self.unary(Op::Strftime(format.to_string()))
    }

    /// Replaces every literal occurrence of `pattern`.
    pub fn replace(&self, pattern: &str, replacement: &str) -> Node {
        self.unary(Op::Replace {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
        })
    }

    pub fn split(&self, separator: &str) -> Node {
        self.unary(Op::Split(separator.to_string()))
    }

    pub fn quantile(&self, quantile: f64) -> Node {
        self.unary(Op::Quantile(quantile))
    }

    pub fn standard_deviation(&self, ddof: u8) -> Node {
        self.unary(Op::StandardDeviation { ddof })
    }

    pub fn variance(&self, ddof: u8) -> Node {
        self.unary(Op::Variance { ddof })
    }

    pub fn skew(&self, bias: bool) -> Node {
        self.unary(Op::Skew { bias })
    }

    pub fn covariance(&self, other: impl Into<Operand>, ddof: u8) -> Node {
        self.binary(Op::Covariance { ddof }, other)
    }

    /// Pearson correlation.
    pub fn correlation(&self, other: impl Into<Operand>) -> Node {
        self.binary(Op::Correlation, other)
    }

    fn window(&self, kind: WindowKind, options: WindowOptions) -> Node {
        self.unary(Op::Window { kind, options })
    }

    pub fn window_max(&self, options: WindowOptions) -> Node {
        self.window(WindowKind::Max, options)
    }

    pub fn window_mean(&self, options: WindowOptions) -> Node {
        self.window(WindowKind::Mean, options)
    }

    pub fn window_median(&self, options: WindowOptions) -> Node {
        self.window(WindowKind::Median, options)
    }

    pub fn window_min(&self, options: WindowOptions) -> Node {
        self.window(WindowKind::Min, options)
    }

    pub fn window_sum(&self, options: WindowOptions) -> Node {
        self.window(WindowKind::Sum, options)
    }

    pub fn window_standard_deviation(&self, options: WindowOptions) -> Node {
        self.window(WindowKind::StandardDeviation, options)
    }

    fn cumulative(&self, kind: CumulativeKind, reverse: bool) -> Node {
        self.unary(Op::Cumulative { kind, reverse })
    }

    pub fn cumulative_max(&self, reverse: bool) -> Node {
        self.cumulative(CumulativeKind::Max, reverse)
    }

    pub fn cumulative_min(&self, reverse: bool) -> Node {
        self.cumulative(CumulativeKind::Min, reverse)
    }

    pub fn cumulative_sum(&self, reverse: bool) -> Node {
        self.cumulative(CumulativeKind::Sum, reverse)
    }

    pub fn cumulative_product(&self, reverse: bool) -> Node {
        self.cumulative(CumulativeKind::Product, reverse)
    }

    pub fn sort(&self, descending: bool) -> Node {
        self.unary(Op::Sort { descending })
    }

    pub fn argsort(&self, descending: bool) -> Node {
        self.unary(Op::Argsort { descending })
    }

    pub fn rank(&self, method: RankMethod, descending: bool) -> Node {
        self.unary(Op::Rank { method, descending })
    }

    pub fn cast(&self, dtype: Dtype) -> Node {
        self.unary(Op::Cast(dtype))
    }

    pub fn fill_missing(&self, strategy: FillStrategy) -> Node {
        self.unary(Op::FillMissing(strategy))
    }

    pub fn fill_missing_with(&self, value: impl Into<Operand>) -> Node {
        self.binary(Op::FillMissingWith, value)
    }

    pub fn slice(&self, offset: i64, length: usize) -> Node {
        self.unary(Op::Slice { offset, length })
    }

    pub fn head(&self, length: usize) -> Node {
        self.unary(Op::Head(length))
    }

    pub fn tail(&self, length: usize) -> Node {
        self.unary(Op::Tail(length))
    }

    pub fn shift(&self, periods: i64) -> Node {
        self.unary(Op::Shift(periods))
    }
}

macro_rules! impl_std_op {
    ($($trait:ident, $method:ident, $builder:ident);* $(;)?) => {
        $(
            impl<T: Into<Operand>> ops::$trait<T> for Node {
                type Output = Node;

                fn $method(self, rhs: T) -> Node {
                    Node::$builder(&self, rhs)
                }
            }

            impl<T: Into<Operand>> ops::$trait<T> for &Node {
                type Output = Node;

                fn $method(self, rhs: T) -> Node {
                    Node::$builder(self, rhs)
                }
            }
        )*
    };
}

impl_std_op! {
    Add, add, add;
    Sub, sub, subtract;
    Mul, mul, multiply;
    Div, div, divide;
    Rem, rem, remainder;
    BitAnd, bitand, and;
    BitOr, bitor, or;
}

impl ops::Not for Node {
    type Output = Node;

    fn not(self) -> Node {
        Node::not(&self)
    }
}

impl ops::Not for &Node {
    type Output = Node;

    fn not(self) -> Node {
        Node::not(self)
    }
}
