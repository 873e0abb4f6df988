//! Tidy, verb-style frame operations on top of Polars.
//!
//! Callbacks receive a [`VirtualFrame`](frame::VirtualFrame) and return
//! expressions built from its columns. Those expressions are only recorded.
//! They are lowered to Polars expressions when the verb runs:
//!
//! ```ignore
//! use polars::prelude::*;
//! use polars_tidy::prelude::TidyFrame;
//!
//! let df = df!["year" => [2020i64, 2021, 2020], "v" => [1.0, 2.0, 3.0]]?;
//! let out = TidyFrame::new(df)?
//!     .group_by(&["year"])?
//!     .summarise_with(|vf| Ok(vec![("total", vf.col("v")?.sum())]))?;
//! ```
//!
//! Grouped verbs that must see one group at a time are executed by
//! partitioning the frame, running the verb per group and reassembling the
//! result in the original row order.
pub mod backend;
pub mod compile;
pub mod config;
pub mod dtype;
pub mod error;
pub mod expr;
pub mod frame;
pub mod literal;
pub mod series;
pub mod unify;

pub mod prelude {
    pub use crate::backend::{Backend, JoinHow, PolarsBackend, PolarsFrame};
    pub use crate::dtype::{Dtype, FloatWidth, Precision};
    pub use crate::error::{TidyError, TidyResult};
    pub use crate::expr::{
        coalesce, concat_str, correlation, covariance, format, lit, series, ClosureValue,
        CumulativeKind, FillStrategy, Node, Op, Operand, RankMethod, WindowKind, WindowOptions,
    };
    pub use crate::frame::{FrameSchema, TidyFrame, VirtualFrame};
    pub use crate::literal::Literal;
    pub use crate::series::{from_literals, SeriesRef};
    pub use crate::unify::{unify, unify_with_literals};
}
