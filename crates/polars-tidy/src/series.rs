//! Engine series built from literal values.
use polars::prelude::*;

use crate::dtype::{Dtype, FloatWidth, Precision};
use crate::error::TidyResult;
use crate::literal::{days_since_epoch, nanos_since_midnight, timestamp_micros, Literal};
use crate::tidy_err;
use crate::unify::unify_with_literals;

/// An engine column that can be embedded in an expression tree.
#[derive(Clone, Debug)]
pub struct SeriesRef(Series);

impl SeriesRef {
    pub fn new(s: Series) -> Self {
        SeriesRef(s)
    }

    pub fn name(&self) -> &str {
        self.0.name().as_str()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_series(&self) -> &Series {
        &self.0
    }

    pub fn into_series(self) -> Series {
        self.0
    }

    pub fn dtype(&self) -> TidyResult<Dtype> {
        Dtype::try_from(self.0.dtype())
    }
}

impl From<Series> for SeriesRef {
    fn from(s: Series) -> Self {
        SeriesRef(s)
    }
}

impl PartialEq for SeriesRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.equals_missing(&other.0)
    }
}

/// Builds a series from `items`.
///
/// The dtype is inferred with [`unify`](crate::unify::unify), integers are
/// turned into floats where the column ends up floating point.
pub fn from_literals(
    name: &str,
    items: &[Literal],
    preferred: Option<&Dtype>,
) -> TidyResult<SeriesRef> {
    let (dtype, items) = unify_with_literals(items, preferred)?;
    build(name, &items, &dtype).map(SeriesRef)
}

fn build(name: &str, items: &[Literal], dtype: &Dtype) -> TidyResult<Series> {
    let mismatch = |lit: &Literal| tidy_err!(TypeMismatch: lit, dtype);
    let name = PlSmallStr::from_str(name);

    let s = match dtype {
        Dtype::Boolean => {
            let values = items
                .iter()
                .map(|lit| match lit {
                    Literal::Nil => Ok(None),
                    Literal::Boolean(v) => Ok(Some(*v)),
                    lit => Err(mismatch(lit)),
                })
                .collect::<TidyResult<Vec<_>>>()?;
            Series::new(name, values)
        },
        Dtype::Integer => {
            let values = items
                .iter()
                .map(|lit| match lit {
                    Literal::Nil => Ok(None),
                    Literal::Integer(v) => Ok(Some(*v)),
                    lit => Err(mismatch(lit)),
                })
                .collect::<TidyResult<Vec<_>>>()?;
            Series::new(name, values)
        },
        Dtype::Float(width) => {
            let values = items
                .iter()
                .map(|lit| match lit {
                    Literal::Nil => Ok(None),
                    lit => lit.as_f64().map(Some).ok_or_else(|| mismatch(lit)),
                })
                .collect::<TidyResult<Vec<_>>>()?;
            match width {
                FloatWidth::F64 => Series::new(name, values),
                FloatWidth::F32 => Series::new(
                    name,
                    values
                        .into_iter()
                        .map(|v| v.map(|v| v as f32))
                        .collect::<Vec<_>>(),
                ),
            }
        },
        Dtype::String | Dtype::Category => {
            let values = items
                .iter()
                .map(|lit| match lit {
                    Literal::Nil => Ok(None),
                    Literal::String(v) => Ok(Some(v.as_str())),
                    lit => Err(mismatch(lit)),
                })
                .collect::<TidyResult<Vec<_>>>()?;
            let s = Series::new(name, values);
            if dtype == &Dtype::Category {
                s.cast(&dtype.to_engine()?)?
            } else {
                s
            }
        },
        Dtype::Binary => {
            let values = items
                .iter()
                .map(|lit| match lit {
                    Literal::Nil => Ok(None),
                    Literal::Binary(v) => Ok(Some(v.as_slice())),
                    Literal::String(v) => Ok(Some(v.as_bytes())),
                    lit => Err(mismatch(lit)),
                })
                .collect::<TidyResult<Vec<_>>>()?;
            Series::new(name, values)
        },
        Dtype::Date => {
            let values = items
                .iter()
                .map(|lit| match lit {
                    Literal::Nil => Ok(None),
                    Literal::Date(v) => Ok(Some(days_since_epoch(v))),
                    lit => Err(mismatch(lit)),
                })
                .collect::<TidyResult<Vec<_>>>()?;
            Series::new(name, values).cast(&DataType::Date)?
        },
        Dtype::Time => {
            let values = items
                .iter()
                .map(|lit| match lit {
                    Literal::Nil => Ok(None),
                    Literal::Time(v) => Ok(Some(nanos_since_midnight(v))),
                    lit => Err(mismatch(lit)),
                })
                .collect::<TidyResult<Vec<_>>>()?;
            Series::new(name, values).cast(&DataType::Time)?
        },
        Dtype::Datetime(precision) => {
            let values = items
                .iter()
                .map(|lit| match lit {
                    Literal::Nil => Ok(None),
                    Literal::NaiveDateTime(v) => {
                        Ok(Some(rescale_micros(timestamp_micros(v), *precision)))
                    },
                    lit => Err(mismatch(lit)),
                })
                .collect::<TidyResult<Vec<_>>>()?;
            Series::new(name, values).cast(&dtype.to_engine()?)?
        },
        Dtype::Duration(precision) => {
            let values = items
                .iter()
                .map(|lit| match lit {
                    Literal::Nil => Ok(None),
                    Literal::Duration { value, precision: p } if p == precision => Ok(Some(*value)),
                    lit => Err(mismatch(lit)),
                })
                .collect::<TidyResult<Vec<_>>>()?;
            Series::new(name, values).cast(&dtype.to_engine()?)?
        },
        Dtype::List(inner) => {
            let values = items
                .iter()
                .map(|lit| match lit {
                    Literal::Nil => Ok(None),
                    Literal::List(children) => build("", children, inner).map(Some),
                    lit => Err(mismatch(lit)),
                })
                .collect::<TidyResult<Vec<_>>>()?;
            let mut ca: ListChunked = values.into_iter().collect();
            ca.rename(name);
            // All-missing columns come back without an inner dtype.
            ca.into_series().cast(&dtype.to_engine()?)?
        },
    };
    Ok(s)
}

fn rescale_micros(micros: i64, precision: Precision) -> i64 {
    match precision {
        Precision::Millisecond => micros.div_euclid(1_000),
        Precision::Microsecond => micros,
        Precision::Nanosecond => micros * 1_000,
    }
}
