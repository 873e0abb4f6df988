use polars::prelude::*;

use super::{Backend, JoinHow};
use crate::compile;
use crate::dtype::Dtype;
use crate::error::TidyResult;
use crate::expr::Node;
use crate::series::SeriesRef;
use crate::tidy_bail;

/// A Polars frame, either materialized or a query plan.
#[derive(Clone)]
pub enum PolarsFrame {
    Eager(DataFrame),
    Lazy(LazyFrame),
}

impl PolarsFrame {
    pub fn is_lazy(&self) -> bool {
        matches!(self, PolarsFrame::Lazy(_))
    }

    fn to_lazy(&self) -> LazyFrame {
        match self {
            PolarsFrame::Eager(df) => df.clone().lazy(),
            PolarsFrame::Lazy(lf) => lf.clone(),
        }
    }

    fn to_eager(&self) -> TidyResult<DataFrame> {
        match self {
            PolarsFrame::Eager(df) => Ok(df.clone()),
            PolarsFrame::Lazy(lf) => Ok(lf.clone().collect()?),
        }
    }

    /// Wraps the result of a lazy query so that it has the same kind as
    /// `self`.
    fn finish(&self, lf: LazyFrame) -> TidyResult<PolarsFrame> {
        match self {
            PolarsFrame::Eager(_) => Ok(PolarsFrame::Eager(lf.collect()?)),
            PolarsFrame::Lazy(_) => Ok(PolarsFrame::Lazy(lf)),
        }
    }

    /// The materialized frame. Lazy frames are executed.
    pub fn into_df(self) -> TidyResult<DataFrame> {
        match self {
            PolarsFrame::Eager(df) => Ok(df),
            PolarsFrame::Lazy(lf) => Ok(lf.collect()?),
        }
    }
}

impl From<DataFrame> for PolarsFrame {
    fn from(df: DataFrame) -> Self {
        PolarsFrame::Eager(df)
    }
}

impl From<LazyFrame> for PolarsFrame {
    fn from(lf: LazyFrame) -> Self {
        PolarsFrame::Lazy(lf)
    }
}

fn columns<S: AsRef<str>>(names: &[S]) -> Vec<Expr> {
    names.iter().map(|name| col(name.as_ref())).collect()
}

fn aliased(exprs: Vec<(String, Expr)>) -> Vec<Expr> {
    exprs
        .into_iter()
        .map(|(name, expr)| expr.alias(name.as_str()))
        .collect()
}

#[derive(Copy, Clone, Debug, Default)]
pub struct PolarsBackend;

impl Backend for PolarsBackend {
    type Frame = PolarsFrame;
    type Expr = Expr;

    fn compile(&self, node: &Node) -> TidyResult<Expr> {
        compile::compile_with(node, &|s: &SeriesRef| self.series_dtype(s))
    }

    fn series_dtype(&self, s: &SeriesRef) -> TidyResult<Dtype> {
        Dtype::try_from(s.as_series().dtype())
    }

    fn schema(&self, df: &PolarsFrame) -> TidyResult<Vec<(String, Dtype)>> {
        match df {
            PolarsFrame::Eager(df) => df
                .get_columns()
                .iter()
                .map(|c| Ok((c.name().to_string(), Dtype::try_from(c.dtype())?)))
                .collect(),
            PolarsFrame::Lazy(lf) => {
                let schema = lf.clone().collect_schema()?;
                schema
                    .iter()
                    .map(|(name, dtype)| Ok((name.to_string(), Dtype::try_from(dtype)?)))
                    .collect()
            },
        }
    }

    fn n_rows(&self, df: &PolarsFrame) -> TidyResult<usize> {
        match df {
            PolarsFrame::Eager(df) => Ok(df.height()),
            PolarsFrame::Lazy(lf) => Ok(lf.clone().collect()?.height()),
        }
    }

    fn is_lazy(&self, df: &PolarsFrame) -> bool {
        df.is_lazy()
    }

    fn indices_by_group(&self, df: &PolarsFrame, groups: &[String]) -> TidyResult<Vec<Vec<usize>>> {
        let index_name = crate::config::row_index_name();
        let grouped = df
            .to_lazy()
            .with_row_index(index_name.as_str(), None)
            .group_by_stable(columns(groups))
            .agg([col(index_name.as_str())])
            .collect()?;

        let lists = grouped
            .column(index_name.as_str())?
            .as_materialized_series()
            .list()?;
        let mut out = Vec::with_capacity(lists.len());
        for indices in lists.into_iter().flatten() {
            let indices = indices.idx()?;
            out.push(
                indices
                    .into_no_null_iter()
                    .map(|i| i as usize)
                    .collect::<Vec<_>>(),
            );
        }
        Ok(out)
    }

    fn concat(&self, frames: Vec<PolarsFrame>) -> TidyResult<PolarsFrame> {
        if frames.iter().any(PolarsFrame::is_lazy) {
            let lfs = frames.iter().map(PolarsFrame::to_lazy).collect::<Vec<_>>();
            return Ok(PolarsFrame::Lazy(polars::prelude::concat(
                lfs,
                UnionArgs::default(),
            )?));
        }
        let mut frames = frames.into_iter();
        let Some(first) = frames.next() else {
            tidy_bail!(InvalidOperation: "cannot concatenate zero frames");
        };
        let mut acc = first.to_eager()?;
        for df in frames {
            acc.vstack_mut(&df.to_eager()?)?;
        }
        Ok(PolarsFrame::Eager(acc))
    }

    fn take(&self, df: &PolarsFrame, indices: &[usize]) -> TidyResult<PolarsFrame> {
        let idx = IdxCa::from_vec(
            PlSmallStr::EMPTY,
            indices.iter().map(|&i| i as IdxSize).collect(),
        );
        let taken = df.to_eager()?.take(&idx)?;
        match df {
            PolarsFrame::Eager(_) => Ok(PolarsFrame::Eager(taken)),
            PolarsFrame::Lazy(_) => Ok(PolarsFrame::Lazy(taken.lazy())),
        }
    }

    fn sort_by(
        &self,
        df: &PolarsFrame,
        by: &[String],
        descending: &[bool],
        stable: bool,
    ) -> TidyResult<PolarsFrame> {
        let options = SortMultipleOptions::default()
            .with_order_descending_multi(descending.to_vec())
            .with_maintain_order(stable);
        df.finish(df.to_lazy().sort_by_exprs(columns(by), options))
    }

    fn with_columns(
        &self,
        df: &PolarsFrame,
        exprs: Vec<(String, Expr)>,
    ) -> TidyResult<PolarsFrame> {
        df.finish(df.to_lazy().with_columns(aliased(exprs)))
    }

    fn put_indices(
        &self,
        df: &PolarsFrame,
        name: &str,
        indices: &[usize],
    ) -> TidyResult<PolarsFrame> {
        let values = indices.iter().map(|&i| i as i64).collect::<Vec<_>>();
        let s = Series::new(PlSmallStr::from_str(name), values);
        let mut out = df.to_eager()?;
        out.with_column(s)?;
        match df {
            PolarsFrame::Eager(_) => Ok(PolarsFrame::Eager(out)),
            PolarsFrame::Lazy(_) => Ok(PolarsFrame::Lazy(out.lazy())),
        }
    }

    fn select(&self, df: &PolarsFrame, names: &[String]) -> TidyResult<PolarsFrame> {
        df.finish(df.to_lazy().select(columns(names)))
    }

    fn filter(&self, df: &PolarsFrame, predicate: Expr) -> TidyResult<PolarsFrame> {
        df.finish(df.to_lazy().filter(predicate))
    }

    fn summarise(
        &self,
        df: &PolarsFrame,
        groups: &[String],
        aggs: Vec<(String, Expr)>,
    ) -> TidyResult<PolarsFrame> {
        let lf = df.to_lazy();
        let lf = if groups.is_empty() {
            lf.select(aliased(aggs))
        } else {
            lf.group_by_stable(columns(groups)).agg(aliased(aggs))
        };
        df.finish(lf)
    }

    fn arrange(&self, df: &PolarsFrame, keys: Vec<(bool, Expr)>) -> TidyResult<PolarsFrame> {
        let (descending, exprs): (Vec<_>, Vec<_>) = keys.into_iter().unzip();
        let options = SortMultipleOptions::default()
            .with_order_descending_multi(descending)
            .with_maintain_order(true);
        df.finish(df.to_lazy().sort_by_exprs(exprs, options))
    }

    fn over(&self, expr: Expr, groups: &[String]) -> Expr {
        expr.over(columns(groups))
    }

    fn rename(&self, df: &PolarsFrame, pairs: &[(String, String)]) -> TidyResult<PolarsFrame> {
        let (existing, new): (Vec<_>, Vec<_>) = pairs.iter().cloned().unzip();
        df.finish(df.to_lazy().rename(existing, new, true))
    }

    fn head(&self, df: &PolarsFrame, length: usize) -> TidyResult<PolarsFrame> {
        df.finish(df.to_lazy().limit(length as IdxSize))
    }

    fn tail(&self, df: &PolarsFrame, length: usize) -> TidyResult<PolarsFrame> {
        df.finish(df.to_lazy().tail(length as IdxSize))
    }

    fn slice(&self, df: &PolarsFrame, offset: i64, length: usize) -> TidyResult<PolarsFrame> {
        df.finish(df.to_lazy().slice(offset, length as IdxSize))
    }

    fn distinct(&self, df: &PolarsFrame, subset: &[String]) -> TidyResult<PolarsFrame> {
        let subset = (!subset.is_empty()).then(|| columns(subset));
        df.finish(
            df.to_lazy()
                .unique_stable_generic(subset, UniqueKeepStrategy::First),
        )
    }

    fn drop_nils(&self, df: &PolarsFrame, subset: &[String]) -> TidyResult<PolarsFrame> {
        let subset = (!subset.is_empty()).then(|| columns(subset));
        df.finish(df.to_lazy().drop_nulls(subset))
    }

    fn pull(&self, df: &PolarsFrame, name: &str) -> TidyResult<SeriesRef> {
        let s = match df {
            PolarsFrame::Eager(df) => df.column(name)?.as_materialized_series().clone(),
            PolarsFrame::Lazy(lf) => {
                let df = lf.clone().select([col(name)]).collect()?;
                df.column(name)?.as_materialized_series().clone()
            },
        };
        Ok(SeriesRef::new(s))
    }

    fn join(
        &self,
        left: &PolarsFrame,
        right: &PolarsFrame,
        left_on: &[String],
        right_on: &[String],
        how: JoinHow,
    ) -> TidyResult<PolarsFrame> {
        let how = match how {
            JoinHow::Inner => JoinType::Inner,
            JoinHow::Left => JoinType::Left,
            JoinHow::Outer => JoinType::Full,
            JoinHow::Cross => JoinType::Cross,
        };
        let lf = left
            .to_lazy()
            .join_builder()
            .with(right.to_lazy())
            .left_on(columns(left_on))
            .right_on(columns(right_on))
            .how(how)
            .coalesce(JoinCoalesce::CoalesceColumns)
            .maintain_order(MaintainOrderJoin::LeftRight)
            .finish();
        if left.is_lazy() || right.is_lazy() {
            Ok(PolarsFrame::Lazy(lf))
        } else {
            Ok(PolarsFrame::Eager(lf.collect()?))
        }
    }

    fn pivot_longer(
        &self,
        df: &PolarsFrame,
        id_columns: &[String],
        value_columns: &[String],
        names_to: &str,
        values_to: &str,
    ) -> TidyResult<PolarsFrame> {
        let args = UnpivotArgsDSL {
            on: columns(value_columns).into_iter().map(Into::into).collect(),
            index: columns(id_columns).into_iter().map(Into::into).collect(),
            variable_name: Some(names_to.into()),
            value_name: Some(values_to.into()),
        };
        df.finish(df.to_lazy().unpivot(args))
    }

    fn lazy(&self, df: &PolarsFrame) -> PolarsFrame {
        PolarsFrame::Lazy(df.to_lazy())
    }

    fn collect(&self, df: &PolarsFrame) -> TidyResult<PolarsFrame> {
        Ok(PolarsFrame::Eager(df.to_eager()?))
    }

    fn describe_plan(&self, df: &PolarsFrame) -> TidyResult<String> {
        match df {
            PolarsFrame::Lazy(lf) => Ok(lf.describe_plan()?),
            PolarsFrame::Eager(_) => {
                tidy_bail!(InvalidOperation: "an eager frame has no query plan")
            },
        }
    }
}
