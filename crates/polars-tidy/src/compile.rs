//! Lowering of expression trees into Polars expressions.
use polars::prelude::{
    self as pl, col, concat_str, cov, lit, pearson_corr, DataType, Expr, FillNullStrategy,
    QuantileMethod, RankOptions, RollingOptionsFixedWindow, SortOptions, NULL,
};

use crate::dtype::{engine_dtype, Dtype};
use crate::error::TidyResult;
use crate::expr::{CumulativeKind, FillStrategy, Node, Op, Operand, RankMethod, WindowKind};
use crate::literal::{days_since_epoch, nanos_since_midnight, timestamp_micros, Literal};
use crate::series::{self, SeriesRef};

/// Lowers `node`, reading series dtypes from the series themselves.
pub fn compile(node: &Node) -> TidyResult<Expr> {
    compile_with(node, &SeriesRef::dtype)
}

/// Lowers `node`, asking `series_dtype` for the dtype of embedded series.
///
/// A failing dtype query aborts the whole compilation.
pub fn compile_with<F>(node: &Node, series_dtype: &F) -> TidyResult<Expr>
where
    F: Fn(&SeriesRef) -> TidyResult<Dtype>,
{
    ExprCompiler { series_dtype }.node(node)
}

struct ExprCompiler<'a, F> {
    series_dtype: &'a F,
}

impl<F> ExprCompiler<'_, F>
where
    F: Fn(&SeriesRef) -> TidyResult<Dtype>,
{
    fn operand_dtype(&self, operand: &Operand) -> TidyResult<Option<Dtype>> {
        match operand {
            Operand::Node(node) => Ok(Some(node.dtype().clone())),
            Operand::Literal(lit) => Ok(lit.dtype()),
            Operand::Series(s) => (self.series_dtype)(s).map(Some),
        }
    }

    fn operand(&self, operand: &Operand) -> TidyResult<Expr> {
        match operand {
            Operand::Node(node) => self.node(node),
            Operand::Literal(value) => literal(value),
            Operand::Series(s) => Ok(lit(s.as_series().clone())),
        }
    }

    fn args(&self, args: &[Operand]) -> TidyResult<Vec<Expr>> {
        args.iter().map(|arg| self.operand(arg)).collect()
    }

    fn node(&self, node: &Node) -> TidyResult<Expr> {
        let args = node.args();
        let expr = match node.op() {
            Op::Column(name) => col(name.as_str()),
            Op::Literal(value) => literal(value)?,
            Op::Series => match args {
                [operand] => self.operand(operand)?,
                _ => crate::tidy_bail!(InvalidOperation: "series node without a series"),
            },
            Op::Add => {
                let (l, r) = self.pair(args)?;
                let swap = matches!(
                    (self.operand_dtype(&args[0])?, self.operand_dtype(&args[1])?),
                    (
                        Some(Dtype::Duration(_)),
                        Some(Dtype::Date | Dtype::Datetime(_))
                    )
                );
                if swap {
                    r + l
                } else {
                    l + r
                }
            },
            Op::Subtract => {
                let (l, r) = self.pair(args)?;
                l - r
            },
            Op::Multiply => {
                let (l, r) = self.pair(args)?;
                let duration = match (self.operand_dtype(&args[0])?, self.operand_dtype(&args[1])?)
                {
                    (Some(dt @ Dtype::Duration(_)), Some(other))
                    | (Some(other), Some(dt @ Dtype::Duration(_)))
                        if other.is_numeric() =>
                    {
                        Some(dt)
                    },
                    _ => None,
                };
                match duration {
                    Some(dt) => (l * r).cast(cast_dtype(&dt)?),
                    None => l * r,
                }
            },
            Op::Divide => {
                let (l, r) = self.pair(args)?;
                match (self.operand_dtype(&args[0])?, self.operand_dtype(&args[1])?) {
                    (Some(dt @ Dtype::Duration(_)), Some(other)) if other.is_numeric() => {
                        (l / r).cast(cast_dtype(&dt)?)
                    },
                    _ => l.cast(DataType::Float64) / r.cast(DataType::Float64),
                }
            },
            Op::Pow => {
                let (l, r) = self.pair(args)?;
                l.pow(r)
            },
            Op::Remainder => {
                let (l, r) = self.pair(args)?;
                l % r
            },
            Op::Quotient => {
                let (l, r) = self.pair(args)?;
                l.floor_div(r)
            },

            Op::Abs => self.first(args)?.abs(),
            Op::Round(decimals) => self.first(args)?.round(*decimals),
            Op::Floor => self.first(args)?.floor(),
            Op::Ceil => self.first(args)?.ceil(),
            Op::Clip => match args {
                [input, min, max] => self
                    .operand(input)?
                    .clip(self.operand(min)?, self.operand(max)?),
                _ => crate::tidy_bail!(
                    InvalidOperation: "clip expects 3 operands, got {}",
                    args.len()
                ),
            },
            Op::Log(base) => self.first(args)?.log(*base),
            Op::Exp => self.first(args)?.exp(),

            Op::Equal => self.map_pair(args, Expr::eq)?,
            Op::NotEqual => self.map_pair(args, Expr::neq)?,
            Op::Greater => self.map_pair(args, Expr::gt)?,
            Op::GreaterEqual => self.map_pair(args, Expr::gt_eq)?,
            Op::Less => self.map_pair(args, Expr::lt)?,
            Op::LessEqual => self.map_pair(args, Expr::lt_eq)?,
            Op::And => self.map_pair(args, Expr::and)?,
            Op::Or => self.map_pair(args, Expr::or)?,
            Op::Not => self.first(args)?.not(),

            Op::IsNil => self.first(args)?.is_null(),
            Op::IsNotNil => self.first(args)?.is_not_null(),
            Op::IsNan => self.first(args)?.is_nan(),
            Op::IsInfinite => self.first(args)?.is_infinite(),
            Op::IsFinite => self.first(args)?.is_finite(),

            Op::Contains(pattern) => self
                .first(args)?
                .str()
                .contains_literal(lit(pattern.as_str())),
            Op::ReContains(pattern) => self
                .first(args)?
                .str()
                .contains(lit(pattern.as_str()), true),
            Op::Upcase => self.first(args)?.str().to_uppercase(),
            Op::Downcase => self.first(args)?.str().to_lowercase(),
            Op::Strip => self.first(args)?.str().strip_chars(lit(NULL)),
            Op::Lstrip => self.first(args)?.str().strip_chars_start(lit(NULL)),
            Op::Rstrip => self.first(args)?.str().strip_chars_end(lit(NULL)),
            Op::Substring { offset, length } => {
                let length = match length {
                    Some(length) => lit(*length),
                    None => lit(NULL),
                };
                self.first(args)?.str().slice(lit(*offset), length)
            },
            Op::Replace {
                pattern,
                replacement,
            } => self.first(args)?.str().replace_all(
                lit(pattern.as_str()),
                lit(replacement.as_str()),
                true,
            ),
            Op::ReReplace {
                pattern,
                replacement,
            } => self.first(args)?.str().replace_all(
                lit(pattern.as_str()),
                lit(replacement.as_str()),
                false,
            ),
            Op::Split(separator) => self.first(args)?.str().split(lit(separator.as_str())),
            Op::Lengths => self.first(args)?.str().len_chars().cast(DataType::Int64),

            Op::DayOfWeek => self.first(args)?.dt().weekday().cast(DataType::Int64),
            Op::DayOfYear => self.first(args)?.dt().ordinal_day().cast(DataType::Int64),
            Op::WeekOfYear => self.first(args)?.dt().week().cast(DataType::Int64),
            Op::Month => self.first(args)?.dt().month().cast(DataType::Int64),
            Op::Year => self.first(args)?.dt().year().cast(DataType::Int64),
            Op::Hour => self.first(args)?.dt().hour().cast(DataType::Int64),
            Op::Minute => self.first(args)?.dt().minute().cast(DataType::Int64),
            Op::Second => self.first(args)?.dt().second().cast(DataType::Int64),
            Op::Strftime(format) => self.first(args)?.dt().to_string(format),

            Op::Sum => self.first(args)?.sum(),
            Op::Mean => self.first(args)?.mean(),
            Op::Median => self.first(args)?.median(),
            Op::Quantile(q) => self
                .first(args)?
                .quantile(lit(*q), QuantileMethod::Nearest),
            Op::Min => self.first(args)?.min(),
            Op::Max => self.first(args)?.max(),
            Op::First => self.first(args)?.first(),
            Op::Last => self.first(args)?.last(),
            Op::Count => self.first(args)?.count().cast(DataType::Int64),
            Op::NilCount => self.first(args)?.null_count().cast(DataType::Int64),
            Op::NDistinct => self.first(args)?.n_unique().cast(DataType::Int64),
            Op::StandardDeviation { ddof } => self.first(args)?.std(*ddof),
            Op::Variance { ddof } => self.first(args)?.var(*ddof),
            Op::Skew { bias } => self.first(args)?.skew(*bias),
            Op::Product => self.first(args)?.product(),
            Op::Covariance { ddof } => {
                let (l, r) = self.pair(args)?;
                cov(l, r, *ddof)
            },
            Op::Correlation => {
                let (l, r) = self.pair(args)?;
                pearson_corr(l, r)
            },
            Op::ArgMax => self.first(args)?.arg_max().cast(DataType::Int64),
            Op::ArgMin => self.first(args)?.arg_min().cast(DataType::Int64),
            Op::All => self.first(args)?.all(true),
            Op::Any => self.first(args)?.any(true),

            Op::Window { kind, options } => {
                let options = RollingOptionsFixedWindow {
                    window_size: options.size,
                    weights: options.weights.clone(),
                    center: options.center,
                    ..Default::default()
                };
                let input = self.first(args)?;
                match kind {
                    WindowKind::Max => input.rolling_max(options),
                    WindowKind::Mean => input.rolling_mean(options),
                    WindowKind::Median => input.rolling_median(options),
                    WindowKind::Min => input.rolling_min(options),
                    WindowKind::Sum => input.rolling_sum(options),
                    WindowKind::StandardDeviation => input.rolling_std(options),
                }
            },
            Op::Cumulative { kind, reverse } => {
                let input = self.first(args)?;
                match kind {
                    CumulativeKind::Max => input.cum_max(*reverse),
                    CumulativeKind::Min => input.cum_min(*reverse),
                    CumulativeKind::Sum => input.cum_sum(*reverse),
                    CumulativeKind::Product => input.cum_prod(*reverse),
                }
            },

            Op::Sort { descending } => self
                .first(args)?
                .sort(SortOptions::default().with_order_descending(*descending)),
            Op::Argsort { descending } => self
                .first(args)?
                .arg_sort(SortOptions::default().with_order_descending(*descending))
                .cast(DataType::Int64),
            Op::Rank { method, descending } => {
                let options = RankOptions {
                    method: rank_method(*method),
                    descending: *descending,
                };
                let ranked = self.first(args)?.rank(options, None);
                match method {
                    RankMethod::Average => ranked,
                    _ => ranked.cast(DataType::Int64),
                }
            },
            Op::Reverse => self.first(args)?.reverse(),

            Op::Cast(dtype) => self.first(args)?.cast(cast_dtype(dtype)?),
            Op::FillMissing(strategy) => {
                let input = self.first(args)?;
                match strategy {
                    FillStrategy::Forward => {
                        input.fill_null_with_strategy(FillNullStrategy::Forward(None))
                    },
                    FillStrategy::Backward => {
                        input.fill_null_with_strategy(FillNullStrategy::Backward(None))
                    },
                    FillStrategy::Max => input.clone().fill_null(input.max()),
                    FillStrategy::Min => input.clone().fill_null(input.min()),
                    FillStrategy::Mean => input.clone().fill_null(input.mean()),
                }
            },
            Op::FillMissingWith => self.map_pair(args, Expr::fill_null)?,
            Op::Slice { offset, length } => self
                .first(args)?
                .slice(lit(*offset), lit(*length as u64)),
            Op::Head(length) => self.first(args)?.head(Some(*length)),
            Op::Tail(length) => self.first(args)?.tail(Some(*length)),
            Op::Shift(periods) => self.first(args)?.shift(lit(*periods)),
            Op::Coalesce => pl::coalesce(&self.args(args)?),
            Op::ConcatStr { separator } => concat_str(self.args(args)?, separator, false),
        };
        Ok(expr)
    }

    fn first(&self, args: &[Operand]) -> TidyResult<Expr> {
        match args.first() {
            Some(arg) => self.operand(arg),
            None => crate::tidy_bail!(InvalidOperation: "missing operand"),
        }
    }

    fn pair(&self, args: &[Operand]) -> TidyResult<(Expr, Expr)> {
        match args {
            [l, r] => Ok((self.operand(l)?, self.operand(r)?)),
            _ => crate::tidy_bail!(
                InvalidOperation: "expected 2 operands, got {}",
                args.len()
            ),
        }
    }

    fn map_pair<G: FnOnce(Expr, Expr) -> Expr>(&self, args: &[Operand], f: G) -> TidyResult<Expr> {
        let (l, r) = self.pair(args)?;
        Ok(f(l, r))
    }
}

/// Engine dtype for a cast, going through the textual dtype grammar.
fn cast_dtype(dtype: &Dtype) -> TidyResult<DataType> {
    engine_dtype(&dtype.to_string())
}

fn rank_method(method: RankMethod) -> pl::RankMethod {
    match method {
        RankMethod::Average => pl::RankMethod::Average,
        RankMethod::Min => pl::RankMethod::Min,
        RankMethod::Max => pl::RankMethod::Max,
        RankMethod::Dense => pl::RankMethod::Dense,
        RankMethod::Ordinal => pl::RankMethod::Ordinal,
    }
}

fn literal(value: &Literal) -> TidyResult<Expr> {
    let expr = match value {
        Literal::Nil => lit(NULL),
        Literal::Boolean(v) => lit(*v),
        Literal::Integer(v) => lit(*v),
        Literal::Float(v) => lit(*v),
        Literal::NaN => lit(f64::NAN),
        Literal::Infinity => lit(f64::INFINITY),
        Literal::NegInfinity => lit(f64::NEG_INFINITY),
        Literal::String(v) => lit(v.as_str()),
        Literal::Binary(v) => lit(v.clone()),
        Literal::Date(v) => lit(days_since_epoch(v)).cast(DataType::Date),
        Literal::Time(v) => lit(nanos_since_midnight(v)).cast(DataType::Time),
        Literal::NaiveDateTime(v) => lit(timestamp_micros(v)).cast(cast_dtype(
            &Dtype::Datetime(crate::dtype::Precision::Microsecond),
        )?),
        Literal::Duration { value, precision } => {
            lit(*value).cast(cast_dtype(&Dtype::Duration(*precision))?)
        },
        Literal::List(_) => {
            // A one row list column, reduced to its single value.
            let s = series::from_literals("literal", std::slice::from_ref(value), None)?;
            lit(s.into_series()).first()
        },
    };
    Ok(expr)
}
