//! Verb-style operations on frames.
//!
//! Every verb takes a callback over a [`VirtualFrame`], records what it
//! returns, lowers it through the backend and returns a new [`TidyFrame`]
//! whose schema is read back from the engine.
mod groups;
mod schema;
mod virtual_frame;

use std::fmt::{Debug, Formatter};

use polars::prelude::{DataFrame, LazyFrame};
pub use schema::FrameSchema;
pub use virtual_frame::VirtualFrame;

pub use crate::backend::JoinHow;
use crate::backend::{Backend, PolarsBackend, PolarsFrame};
use crate::config::verbose_print;
use crate::dtype::Dtype;
use crate::error::TidyResult;
use crate::expr::{ClosureValue, Node};
use crate::series::SeriesRef;
use crate::{tidy_bail, tidy_ensure};

/// A frame together with its schema and active groups.
#[derive(Clone)]
pub struct TidyFrame<B: Backend = PolarsBackend> {
    backend: B,
    df: B::Frame,
    schema: FrameSchema,
}

impl<B: Backend> Debug for TidyFrame<B> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TidyFrame")
            .field("schema", &self.schema)
            .field("lazy", &self.backend.is_lazy(&self.df))
            .finish()
    }
}

impl TidyFrame<PolarsBackend> {
    pub fn new(df: DataFrame) -> TidyResult<Self> {
        Self::with_backend(PolarsBackend, PolarsFrame::Eager(df))
    }

    pub fn from_lazy(lf: LazyFrame) -> TidyResult<Self> {
        Self::with_backend(PolarsBackend, PolarsFrame::Lazy(lf))
    }

    /// The materialized frame. Lazy frames are executed.
    pub fn to_df(&self) -> TidyResult<DataFrame> {
        self.df.clone().into_df()
    }
}

impl<B: Backend + Clone> TidyFrame<B> {
    pub fn with_backend(backend: B, df: B::Frame) -> TidyResult<Self> {
        let schema = FrameSchema::new(backend.schema(&df)?, vec![])?;
        Ok(TidyFrame {
            backend,
            df,
            schema,
        })
    }

    /// A frame over `df` keeping those of our groups that survived.
    fn derive(&self, df: B::Frame) -> TidyResult<Self> {
        let columns = self.backend.schema(&df)?;
        let groups = self
            .groups()
            .iter()
            .filter(|g| columns.iter().any(|(name, _)| &name == g))
            .cloned()
            .collect();
        self.derive_with_groups(df, columns, groups)
    }

    fn derive_with_groups(
        &self,
        df: B::Frame,
        columns: Vec<(String, Dtype)>,
        groups: Vec<String>,
    ) -> TidyResult<Self> {
        Ok(TidyFrame {
            backend: self.backend.clone(),
            df,
            schema: FrameSchema::new(columns, groups)?,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn frame(&self) -> &B::Frame {
        &self.df
    }

    pub fn into_frame(self) -> B::Frame {
        self.df
    }

    pub fn schema(&self) -> &FrameSchema {
        &self.schema
    }

    pub fn names(&self) -> Vec<String> {
        self.schema.names()
    }

    pub fn dtypes(&self) -> Vec<Dtype> {
        self.schema.dtypes()
    }

    pub fn groups(&self) -> &[String] {
        self.schema.groups()
    }

    pub fn is_grouped(&self) -> bool {
        self.schema.is_grouped()
    }

    pub fn is_lazy(&self) -> bool {
        self.backend.is_lazy(&self.df)
    }

    pub fn n_rows(&self) -> TidyResult<usize> {
        self.backend.n_rows(&self.df)
    }

    pub fn virtual_frame(&self) -> VirtualFrame {
        VirtualFrame::new(self.schema.clone())
    }

    pub fn group_by(&self, groups: &[&str]) -> TidyResult<Self> {
        let groups = groups.iter().map(|g| g.to_string()).collect();
        Ok(TidyFrame {
            backend: self.backend.clone(),
            df: self.df.clone(),
            schema: self.schema.clone().with_groups(groups)?,
        })
    }

    pub fn ungroup(&self) -> Self {
        TidyFrame {
            backend: self.backend.clone(),
            df: self.df.clone(),
            schema: self.schema.ungrouped(),
        }
    }

    fn record<F, R>(&self, f: F) -> TidyResult<ClosureValue>
    where
        F: FnOnce(&VirtualFrame) -> TidyResult<R>,
        R: Into<ClosureValue>,
    {
        f(&self.virtual_frame()).map(Into::into)
    }

    /// `names` as owned strings, after checking that every one is a column.
    fn existing(&self, names: &[&str]) -> TidyResult<Vec<String>> {
        names
            .iter()
            .map(|name| self.schema.dtype(name).map(|_| name.to_string()))
            .collect()
    }

    fn compile_pairs(&self, pairs: &[(String, Node)]) -> TidyResult<Vec<(String, B::Expr)>> {
        pairs
            .iter()
            .map(|(name, node)| Ok((name.clone(), self.backend.compile(node)?)))
            .collect()
    }

    /// Evaluates `expr` within each of our groups. Expressions without a
    /// column do not depend on the groups and are left as they are.
    fn within_groups(&self, node: &Node, expr: B::Expr) -> B::Expr {
        if node.column_names().is_empty() {
            expr
        } else {
            self.backend.over(expr, self.groups())
        }
    }

    /// Keeps the rows for which the predicate returned by `f` holds.
    ///
    /// On a grouped frame the predicate is evaluated per group. Lazy grouped
    /// frames are filtered through windows, which cannot hold aggregations.
    pub fn filter_with<F, R>(&self, f: F) -> TidyResult<Self>
    where
        F: FnOnce(&VirtualFrame) -> TidyResult<R>,
        R: Into<ClosureValue>,
    {
        let predicate = self.record(f)?.into_predicate()?;
        let expr = self.backend.compile(&predicate)?;

        let df = if self.is_grouped() {
            if self.is_lazy() {
                tidy_ensure!(
                    !predicate.has_aggregation(),
                    NotSupportedForLazyGroups: "filter with an aggregation: {}",
                    predicate
                );
                verbose_print(|| {
                    format!("filter: lazy groups {:?} lowered to windows", self.groups())
                });
                self.backend.filter(&self.df, self.within_groups(&predicate, expr))?
            } else {
                self.per_group("filter", |part| self.backend.filter(part, expr.clone()))?
            }
        } else {
            self.backend.filter(&self.df, expr)?
        };
        self.derive(df)
    }

    /// Adds or replaces the columns returned by `f` as `(name, expression)`
    /// pairs.
    pub fn mutate_with<F, R>(&self, f: F) -> TidyResult<Self>
    where
        F: FnOnce(&VirtualFrame) -> TidyResult<R>,
        R: Into<ClosureValue>,
    {
        let pairs = self.record(f)?.into_pairs()?;
        let exprs = self.compile_pairs(&pairs)?;

        let df = if self.is_grouped() {
            if self.is_lazy() {
                verbose_print(|| {
                    format!("mutate: lazy groups {:?} lowered to windows", self.groups())
                });
                let exprs = pairs
                    .iter()
                    .zip(exprs)
                    .map(|((_, node), (name, expr))| (name, self.within_groups(node, expr)))
                    .collect();
                self.backend.with_columns(&self.df, exprs)?
            } else {
                self.per_group("mutate", |part| {
                    self.backend.with_columns(part, exprs.clone())
                })?
            }
        } else {
            self.backend.with_columns(&self.df, exprs)?
        };
        self.derive(df)
    }

    /// One row per group (or a single row) holding the aggregations returned
    /// by `f`. The result is not grouped.
    pub fn summarise_with<F, R>(&self, f: F) -> TidyResult<Self>
    where
        F: FnOnce(&VirtualFrame) -> TidyResult<R>,
        R: Into<ClosureValue>,
    {
        let pairs = self.record(f)?.into_pairs()?;
        for (name, node) in &pairs {
            tidy_ensure!(
                node.has_aggregation(),
                InvalidReturnType: "expecting {:?} to be an aggregation, got {}",
                name,
                node
            );
        }
        let aggs = self.compile_pairs(&pairs)?;
        let df = self.backend.summarise(&self.df, self.groups(), aggs)?;
        let columns = self.backend.schema(&df)?;
        self.derive_with_groups(df, columns, vec![])
    }

    /// Sorts by the keys returned by `f`. A grouped frame is sorted by its
    /// groups first. Ties keep their order.
    pub fn arrange_with<F, R>(&self, f: F) -> TidyResult<Self>
    where
        F: FnOnce(&VirtualFrame) -> TidyResult<R>,
        R: Into<ClosureValue>,
    {
        let vf = self.virtual_frame();
        let keys = self.record(f)?.into_sort_keys()?;

        let mut compiled = Vec::with_capacity(self.groups().len() + keys.len());
        for group in self.groups() {
            compiled.push((false, self.backend.compile(&vf.col(group)?)?));
        }
        for (descending, node) in &keys {
            compiled.push((*descending, self.backend.compile(node)?));
        }
        if compiled.is_empty() {
            return Ok(self.clone());
        }
        let df = self.backend.arrange(&self.df, compiled)?;
        self.derive(df)
    }

    /// Keeps `names` in that order. Group columns are always kept.
    pub fn select(&self, names: &[&str]) -> TidyResult<Self> {
        let mut selection: Vec<String> = self
            .groups()
            .iter()
            .filter(|g| !names.contains(&g.as_str()))
            .cloned()
            .collect();
        for name in names {
            self.schema.dtype(name)?;
            selection.push(name.to_string());
        }
        let df = self.backend.select(&self.df, &selection)?;
        self.derive(df)
    }

    /// Removes `names`. Dropped group columns are no longer groups.
    pub fn drop(&self, names: &[&str]) -> TidyResult<Self> {
        let names = self.existing(names)?;
        let df = self.backend.drop(&self.df, &names)?;
        self.derive(df)
    }

    /// Renames columns, given as `(old, new)` pairs. Groups follow.
    pub fn rename(&self, pairs: &[(&str, &str)]) -> TidyResult<Self> {
        let pairs = pairs
            .iter()
            .map(|(old, new)| self.schema.dtype(old).map(|_| (old.to_string(), new.to_string())))
            .collect::<TidyResult<Vec<_>>>()?;
        let df = self.backend.rename(&self.df, &pairs)?;
        let groups = self
            .groups()
            .iter()
            .map(|g| match pairs.iter().find(|(old, _)| old == g) {
                Some((_, new)) => new.clone(),
                None => g.clone(),
            })
            .collect();
        let columns = self.backend.schema(&df)?;
        self.derive_with_groups(df, columns, groups)
    }

    /// Keeps the first row of each distinct combination of `subset` (all
    /// columns when empty), in order.
    pub fn distinct(&self, subset: &[&str]) -> TidyResult<Self> {
        let mut subset = self.existing(subset)?;
        if !subset.is_empty() {
            for group in self.groups().iter().rev() {
                if !subset.contains(group) {
                    subset.insert(0, group.clone());
                }
            }
        }
        let df = self.backend.distinct(&self.df, &subset)?;
        self.derive(df)
    }

    /// Drops rows with a missing value in `subset` (any column when empty).
    pub fn drop_nils(&self, subset: &[&str]) -> TidyResult<Self> {
        let subset = self.existing(subset)?;
        let df = self.backend.drop_nils(&self.df, &subset)?;
        self.derive(df)
    }

    pub fn pull(&self, name: &str) -> TidyResult<SeriesRef> {
        self.schema.dtype(name)?;
        self.backend.pull(&self.df, name)
    }

    /// Joins on columns present in both frames. The result keeps our groups.
    pub fn join(&self, other: &Self, on: &[&str], how: JoinHow) -> TidyResult<Self> {
        self.join_on(other, on, on, how)
    }

    /// Joins `left_on` of this frame with `right_on` of `other`. A cross join
    /// takes no keys.
    pub fn join_on(
        &self,
        other: &Self,
        left_on: &[&str],
        right_on: &[&str],
        how: JoinHow,
    ) -> TidyResult<Self> {
        if how == JoinHow::Cross {
            tidy_ensure!(
                left_on.is_empty() && right_on.is_empty(),
                InvalidOperation: "a cross join takes no keys"
            );
        } else {
            tidy_ensure!(!left_on.is_empty(), InvalidOperation: "join needs at least one key");
            tidy_ensure!(
                left_on.len() == right_on.len(),
                InvalidOperation: "join got {} left keys and {} right keys",
                left_on.len(),
                right_on.len()
            );
        }
        let left_on = self.existing(left_on)?;
        let right_on = other.existing(right_on)?;
        let df = self
            .backend
            .join(&self.df, &other.df, &left_on, &right_on, how)?;
        self.derive(df)
    }

    /// Stacks the rows of `others` below ours. All frames must have the same
    /// columns.
    pub fn concat_rows(&self, others: &[Self]) -> TidyResult<Self> {
        let mut frames = Vec::with_capacity(others.len() + 1);
        frames.push(self.df.clone());
        frames.extend(others.iter().map(|other| other.df.clone()));
        let df = self.backend.concat(frames)?;
        self.derive(df)
    }

    /// Turns `value_columns` into rows: their names go to `names_to` and
    /// their values to `values_to`. `id_columns` are repeated for each of
    /// them.
    pub fn pivot_longer(
        &self,
        id_columns: &[&str],
        value_columns: &[&str],
        names_to: &str,
        values_to: &str,
    ) -> TidyResult<Self> {
        tidy_ensure!(
            !value_columns.is_empty(),
            InvalidOperation: "pivot_longer needs at least one value column"
        );
        let id_columns = self.existing(id_columns)?;
        let value_columns = self.existing(value_columns)?;
        let df = self.backend.pivot_longer(
            &self.df,
            &id_columns,
            &value_columns,
            names_to,
            values_to,
        )?;
        self.derive(df)
    }

    pub fn lazy(&self) -> Self {
        TidyFrame {
            backend: self.backend.clone(),
            df: self.backend.lazy(&self.df),
            schema: self.schema.clone(),
        }
    }

    /// Executes a lazy frame. Eager frames are returned as they are.
    pub fn collect(&self) -> TidyResult<Self> {
        if !self.is_lazy() {
            return Ok(self.clone());
        }
        let df = self.backend.collect(&self.df)?;
        self.derive(df)
    }

    /// Executes the query for its first `n_rows` rows only.
    pub fn fetch(&self, n_rows: usize) -> TidyResult<Self> {
        let df = self.backend.head(&self.df, n_rows)?;
        let df = self.backend.collect(&df)?;
        self.derive(df)
    }

    pub fn describe_plan(&self) -> TidyResult<String> {
        if !self.is_lazy() {
            tidy_bail!(InvalidOperation: "describe_plan needs a lazy frame");
        }
        self.backend.describe_plan(&self.df)
    }
}
