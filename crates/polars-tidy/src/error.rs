use std::borrow::Cow;
use std::fmt::{Display, Formatter};

use polars::prelude::PolarsError;

/// An owned or static error message.
#[derive(Debug, Clone)]
pub struct ErrString(Cow<'static, str>);

impl<T> From<T> for ErrString
where
    T: Into<Cow<'static, str>>,
{
    fn from(msg: T) -> Self {
        ErrString(msg.into())
    }
}

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TidyError {
    /// A literal could not be unified with the dtype inferred so far.
    #[error("the value {value} does not match the inferred dtype {dtype}")]
    TypeMismatch { value: ErrString, dtype: ErrString },
    #[error("unsupported dtype: {0}")]
    UnsupportedDtype(ErrString),
    #[error("invalid return type: {0}")]
    InvalidReturnType(ErrString),
    #[error("invalid direction {0}, expected one of: asc, desc")]
    InvalidDirection(ErrString),
    #[error("not supported for lazy groups: {0}")]
    NotSupportedForLazyGroups(ErrString),
    #[error("column not found: {0}")]
    ColumnNotFound(ErrString),
    #[error("invalid operation: {0}")]
    InvalidOperation(ErrString),
    /// Errors raised by the engine. The message is kept verbatim.
    #[error("{0}")]
    Engine(#[from] PolarsError),
}

pub type TidyResult<T> = Result<T, TidyError>;

impl TidyError {
    /// Returns the engine error if this error originated from the engine.
    pub fn as_engine(&self) -> Option<&PolarsError> {
        match self {
            TidyError::Engine(err) => Some(err),
            _ => None,
        }
    }
}

#[macro_export]
macro_rules! tidy_err {
    (TypeMismatch: $value:expr, $dtype:expr) => {
        $crate::error::TidyError::TypeMismatch {
            value: format!("{}", $value).into(),
            dtype: format!("{}", $dtype).into(),
        }
    };
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::error::TidyError::$variant(format!($fmt $(, $arg)*).into())
    };
    ($variant:ident: $msg:expr) => {
        $crate::error::TidyError::$variant(format!("{}", $msg).into())
    };
}

#[macro_export]
macro_rules! tidy_bail {
    ($($tt:tt)+) => {
        return Err($crate::tidy_err!($($tt)+))
    };
}

#[macro_export]
macro_rules! tidy_ensure {
    ($cond:expr, $($tt:tt)+) => {
        if !$cond {
            $crate::tidy_bail!($($tt)+);
        }
    };
}
