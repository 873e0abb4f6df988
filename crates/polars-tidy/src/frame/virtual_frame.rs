use super::schema::FrameSchema;
use crate::dtype::Dtype;
use crate::error::TidyResult;
use crate::expr::Node;

/// The frame handed to verb callbacks.
///
/// It holds no data, only the schema, so every column it gives out is a
/// recorded reference whose dtype is known up front.
#[derive(Clone, Debug)]
pub struct VirtualFrame {
    schema: FrameSchema,
}

impl VirtualFrame {
    pub(crate) fn new(schema: FrameSchema) -> Self {
        VirtualFrame { schema }
    }

    /// A reference to column `name`.
    pub fn col(&self, name: &str) -> TidyResult<Node> {
        let dtype = self.schema.dtype(name)?;
        Ok(Node::column(name, dtype.clone()))
    }

    /// References to every column, in frame order.
    pub fn columns(&self) -> Vec<Node> {
        self.schema
            .columns()
            .iter()
            .map(|(name, dtype)| Node::column(name, dtype.clone()))
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.schema.names()
    }

    pub fn dtype(&self, name: &str) -> TidyResult<&Dtype> {
        self.schema.dtype(name)
    }

    pub fn groups(&self) -> &[String] {
        self.schema.groups()
    }

    pub fn schema(&self) -> &FrameSchema {
        &self.schema
    }
}
