use crate::dtype::Dtype;
use crate::error::TidyResult;
use crate::{tidy_bail, tidy_ensure};

/// Column names and dtypes of a frame, in order, plus its active groups.
///
/// A schema is never edited in place: every verb returns a frame with a new
/// one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameSchema {
    columns: Vec<(String, Dtype)>,
    groups: Vec<String>,
}

impl FrameSchema {
    pub fn new(columns: Vec<(String, Dtype)>, groups: Vec<String>) -> TidyResult<Self> {
        for (i, (name, _)) in columns.iter().enumerate() {
            tidy_ensure!(
                !columns[..i].iter().any(|(other, _)| other == name),
                InvalidOperation: "duplicate column name {:?}",
                name
            );
        }
        let schema = FrameSchema {
            columns,
            groups: vec![],
        };
        schema.with_groups(groups)
    }

    /// The same columns grouped by `groups`.
    pub fn with_groups(mut self, groups: Vec<String>) -> TidyResult<Self> {
        for (i, group) in groups.iter().enumerate() {
            if !self.contains(group) {
                tidy_bail!(ColumnNotFound: "group {:?}", group);
            }
            tidy_ensure!(
                !groups[..i].contains(group),
                InvalidOperation: "duplicate group {:?}",
                group
            );
        }
        self.groups = groups;
        Ok(self)
    }

    pub fn ungrouped(&self) -> Self {
        FrameSchema {
            columns: self.columns.clone(),
            groups: vec![],
        }
    }

    pub fn columns(&self) -> &[(String, Dtype)] {
        &self.columns
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn dtypes(&self) -> Vec<Dtype> {
        self.columns.iter().map(|(_, dtype)| dtype.clone()).collect()
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn is_grouped(&self) -> bool {
        !self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    pub fn dtype(&self, name: &str) -> TidyResult<&Dtype> {
        match self.columns.iter().find(|(n, _)| n == name) {
            Some((_, dtype)) => Ok(dtype),
            None => tidy_bail!(ColumnNotFound: "{:?}", name),
        }
    }
}
