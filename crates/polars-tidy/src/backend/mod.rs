//! The engine boundary.
//!
//! Frame verbs only talk to the engine through [`Backend`]. The trait's
//! provided methods implement the group-partition executor on top of the
//! engine primitives, so an engine only has to supply the primitives.
mod polars;

pub use self::polars::{PolarsBackend, PolarsFrame};
use crate::config::{row_index_name, verbose_print};
use crate::dtype::Dtype;
use crate::error::TidyResult;
use crate::expr::Node;
use crate::literal::Literal;
use crate::series::SeriesRef;
use crate::tidy_bail;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum JoinHow {
    Inner,
    Left,
    Outer,
    /// Every pairing of rows. Takes no keys.
    Cross,
}

pub trait Backend {
    type Frame: Clone;
    type Expr: Clone;

    /// Lowers a recorded expression into an engine expression.
    fn compile(&self, node: &Node) -> TidyResult<Self::Expr>;

    /// Infers one dtype for `items`.
    fn unify(&self, items: &[Literal], preferred: Option<&Dtype>) -> TidyResult<Dtype> {
        crate::unify::unify(items, preferred)
    }

    fn series_dtype(&self, s: &SeriesRef) -> TidyResult<Dtype>;

    /// Column names and dtypes, without executing a lazy frame.
    fn schema(&self, df: &Self::Frame) -> TidyResult<Vec<(String, Dtype)>>;

    fn n_rows(&self, df: &Self::Frame) -> TidyResult<usize>;

    fn is_lazy(&self, df: &Self::Frame) -> bool;

    /// Row indices of every group of `groups`.
    ///
    /// Groups come in order of first occurrence and the indices of a group
    /// are ascending.
    fn indices_by_group(&self, df: &Self::Frame, groups: &[String]) -> TidyResult<Vec<Vec<usize>>>;

    /// Stacks frames with identical schemas.
    fn concat(&self, frames: Vec<Self::Frame>) -> TidyResult<Self::Frame>;

    /// The rows at `indices`, in that order.
    fn take(&self, df: &Self::Frame, indices: &[usize]) -> TidyResult<Self::Frame>;

    /// Sorts by columns. A stable sort keeps the order of equal rows.
    fn sort_by(
        &self,
        df: &Self::Frame,
        by: &[String],
        descending: &[bool],
        stable: bool,
    ) -> TidyResult<Self::Frame>;

    /// Adds or replaces the named columns.
    fn with_columns(
        &self,
        df: &Self::Frame,
        exprs: Vec<(String, Self::Expr)>,
    ) -> TidyResult<Self::Frame>;

    /// Adds or replaces a single column.
    fn apply_expr(&self, df: &Self::Frame, name: &str, expr: Self::Expr) -> TidyResult<Self::Frame> {
        self.with_columns(df, vec![(name.to_string(), expr)])
    }

    /// Adds (or replaces) an integer column holding `indices`.
    fn put_indices(&self, df: &Self::Frame, name: &str, indices: &[usize]) -> TidyResult<Self::Frame>;

    fn select(&self, df: &Self::Frame, names: &[String]) -> TidyResult<Self::Frame>;

    fn drop(&self, df: &Self::Frame, names: &[String]) -> TidyResult<Self::Frame> {
        let keep = self
            .schema(df)?
            .into_iter()
            .map(|(name, _)| name)
            .filter(|name| !names.contains(name))
            .collect::<Vec<_>>();
        self.select(df, &keep)
    }

    fn filter(&self, df: &Self::Frame, predicate: Self::Expr) -> TidyResult<Self::Frame>;

    /// One row per group of `groups`, in order of first occurrence, or a
    /// single row when `groups` is empty.
    fn summarise(
        &self,
        df: &Self::Frame,
        groups: &[String],
        aggs: Vec<(String, Self::Expr)>,
    ) -> TidyResult<Self::Frame>;

    /// Stable sort by expressions, `(descending, expr)` per key.
    fn arrange(&self, df: &Self::Frame, keys: Vec<(bool, Self::Expr)>) -> TidyResult<Self::Frame>;

    /// Evaluates `expr` within each group of `groups`.
    fn over(&self, expr: Self::Expr, groups: &[String]) -> Self::Expr;

    fn rename(&self, df: &Self::Frame, pairs: &[(String, String)]) -> TidyResult<Self::Frame>;

    fn head(&self, df: &Self::Frame, length: usize) -> TidyResult<Self::Frame>;

    fn tail(&self, df: &Self::Frame, length: usize) -> TidyResult<Self::Frame>;

    /// `length` rows from `offset`. A negative offset counts from the end.
    fn slice(&self, df: &Self::Frame, offset: i64, length: usize) -> TidyResult<Self::Frame>;

    /// Keeps the first row of every distinct combination of `subset`.
    fn distinct(&self, df: &Self::Frame, subset: &[String]) -> TidyResult<Self::Frame>;

    /// Drops rows with a missing value in any of `subset`.
    fn drop_nils(&self, df: &Self::Frame, subset: &[String]) -> TidyResult<Self::Frame>;

    fn pull(&self, df: &Self::Frame, name: &str) -> TidyResult<SeriesRef>;

    /// Joins `left_on` of `left` with `right_on` of `right`. Keys are
    /// compared pairwise.
    fn join(
        &self,
        left: &Self::Frame,
        right: &Self::Frame,
        left_on: &[String],
        right_on: &[String],
        how: JoinHow,
    ) -> TidyResult<Self::Frame>;

    /// Stacks `value_columns` into a name column and a value column,
    /// repeating `id_columns` for every stacked value.
    fn pivot_longer(
        &self,
        df: &Self::Frame,
        id_columns: &[String],
        value_columns: &[String],
        names_to: &str,
        values_to: &str,
    ) -> TidyResult<Self::Frame>;

    fn lazy(&self, df: &Self::Frame) -> Self::Frame;

    fn collect(&self, df: &Self::Frame) -> TidyResult<Self::Frame>;

    /// The engine's query plan of a lazy frame.
    fn describe_plan(&self, df: &Self::Frame) -> TidyResult<String>;

    /// Runs `transform` on every group of `groups` and reassembles the
    /// results in the original row order.
    ///
    /// Each group is handed over with an extra column holding the original
    /// row positions. Rows the transform collapses (and which therefore lose
    /// that column) are placed at the first row of their group. The output
    /// is stably sorted on the positions, so row-preserving transforms give
    /// back the input order exactly. All transformed groups must share one
    /// schema.
    fn apply_on_groups<F>(
        &self,
        df: &Self::Frame,
        groups: &[String],
        mut transform: F,
    ) -> TidyResult<Self::Frame>
    where
        F: FnMut(&Self::Frame) -> TidyResult<Self::Frame>,
    {
        if self.is_lazy(df) {
            tidy_bail!(NotSupportedForLazyGroups: "cannot partition a lazy frame by groups");
        }
        let index_name = row_index_name();
        if self.schema(df)?.iter().any(|(name, _)| name == &index_name) {
            tidy_bail!(
                InvalidOperation: "column {:?} is reserved for the row index",
                index_name
            );
        }

        let mut partitions = self.indices_by_group(df, groups)?;
        verbose_print(|| {
            format!(
                "group partition: {} groups by {:?}",
                partitions.len(),
                groups
            )
        });
        // An empty frame still runs the transform once, so that the output
        // schema is the transformed one.
        if partitions.is_empty() {
            partitions.push(vec![]);
        }

        let mut outputs = Vec::with_capacity(partitions.len());
        for indices in &partitions {
            let part = self.take(df, indices)?;
            let part = self.put_indices(&part, &index_name, indices)?;
            let out = transform(&part)?;

            let has_index = self
                .schema(&out)?
                .iter()
                .any(|(name, _)| name == &index_name);
            let out = if has_index {
                out
            } else {
                let n_rows = self.n_rows(&out)?;
                let first = indices.first().copied().unwrap_or(0);
                self.put_indices(&out, &index_name, &vec![first; n_rows])?
            };
            outputs.push(out);
        }

        // Parts are stacked as returned, so diverging schemas are reported
        // by the engine.
        let stacked = self.concat(outputs)?;
        verbose_print(|| "group partition: restoring original row order".to_string());
        let sorted = self.sort_by(&stacked, &[index_name.clone()], &[false], true)?;
        self.drop(&sorted, &[index_name])
    }
}
