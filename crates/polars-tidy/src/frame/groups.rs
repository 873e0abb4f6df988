//! Verbs that run once per group through the partition executor.
use super::TidyFrame;
use crate::backend::Backend;
use crate::config::verbose_print;
use crate::error::TidyResult;
use crate::tidy_bail;

impl<B: Backend + Clone> TidyFrame<B> {
    /// Runs `transform` on every group and reassembles the parts in the
    /// original row order.
    pub(super) fn per_group<F>(&self, verb: &str, transform: F) -> TidyResult<B::Frame>
    where
        F: FnMut(&B::Frame) -> TidyResult<B::Frame>,
    {
        if self.is_lazy() {
            tidy_bail!(
                NotSupportedForLazyGroups: "{} on a lazy frame grouped by {:?}",
                verb,
                self.groups()
            );
        }
        verbose_print(|| format!("{verb}: partitioning by {:?}", self.groups()));
        self.backend.apply_on_groups(&self.df, self.groups(), transform)
    }

    /// The first `length` rows, per group when grouped.
    pub fn head(&self, length: usize) -> TidyResult<Self> {
        let df = if self.is_grouped() {
            self.per_group("head", |part| self.backend.head(part, length))?
        } else {
            self.backend.head(&self.df, length)?
        };
        self.derive(df)
    }

    /// The last `length` rows, per group when grouped.
    pub fn tail(&self, length: usize) -> TidyResult<Self> {
        let df = if self.is_grouped() {
            self.per_group("tail", |part| self.backend.tail(part, length))?
        } else {
            self.backend.tail(&self.df, length)?
        };
        self.derive(df)
    }

    /// `length` rows starting at `offset`, per group when grouped. A
    /// negative offset counts from the end.
    pub fn slice(&self, offset: i64, length: usize) -> TidyResult<Self> {
        let df = if self.is_grouped() {
            self.per_group("slice", |part| self.backend.slice(part, offset, length))?
        } else {
            self.backend.slice(&self.df, offset, length)?
        };
        self.derive(df)
    }

    /// Applies `f` to every group as an ungrouped frame.
    ///
    /// The parts handed to `f` carry an extra row index column. Keep it to
    /// have rows put back at their original position. Rows without it are
    /// placed at the first row of their group. An ungrouped frame is passed
    /// to `f` as a whole.
    pub fn map_groups<F>(&self, mut f: F) -> TidyResult<Self>
    where
        F: FnMut(TidyFrame<B>) -> TidyResult<TidyFrame<B>>,
    {
        if !self.is_grouped() {
            let out = f(self.ungroup())?;
            return self.derive(out.df);
        }
        let df = self.per_group("map_groups", |part| {
            let part = TidyFrame::with_backend(self.backend.clone(), part.clone())?;
            Ok(f(part)?.df)
        })?;
        self.derive(df)
    }
}
