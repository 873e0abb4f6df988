use std::fmt::{Display, Formatter};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::dtype::{Dtype, Precision};

/// A scalar (or nested list) value that can appear in an expression or be
/// turned into a series.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Nil,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    NaN,
    Infinity,
    NegInfinity,
    String(String),
    Binary(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    NaiveDateTime(NaiveDateTime),
    Duration { value: i64, precision: Precision },
    List(Vec<Literal>),
}

impl Literal {
    pub fn duration(value: i64, precision: Precision) -> Self {
        Literal::Duration { value, precision }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Literal::Nil)
    }

    /// The dtype this literal has on its own, `None` for values that carry no
    /// type information (`nil` and lists without any typed leaf).
    pub fn dtype(&self) -> Option<Dtype> {
        match self {
            Literal::Nil => None,
            Literal::List(_) => crate::unify::unify_opt(std::slice::from_ref(self), None)
                .ok()
                .flatten(),
            _ => crate::unify::unify(std::slice::from_ref(self), None).ok(),
        }
    }

    /// Float value of a numeric literal, mapping the sentinels to their IEEE
    /// counterparts.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Integer(v) => Some(*v as f64),
            Literal::Float(v) => Some(*v),
            Literal::NaN => Some(f64::NAN),
            Literal::Infinity => Some(f64::INFINITY),
            Literal::NegInfinity => Some(f64::NEG_INFINITY),
            _ => None,
        }
    }
}

pub(crate) fn days_since_epoch(date: &NaiveDate) -> i32 {
    date.signed_duration_since(NaiveDateTime::UNIX_EPOCH.date())
        .num_days() as i32
}

pub(crate) fn nanos_since_midnight(time: &NaiveTime) -> i64 {
    (time.num_seconds_from_midnight() as i64) * 1_000_000_000 + time.nanosecond() as i64
}

/// Microseconds since the unix epoch.
///
/// Falls back to millisecond resolution for values that do not fit.
pub(crate) fn timestamp_micros(dt: &NaiveDateTime) -> i64 {
    let delta = *dt - NaiveDateTime::UNIX_EPOCH;
    match delta.num_microseconds() {
        Some(us) => us,
        None => delta.num_milliseconds() * 1_000,
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Nil => write!(f, "nil"),
            Literal::Boolean(v) => write!(f, "{v}"),
            Literal::Integer(v) => write!(f, "{v}"),
            Literal::Float(v) => write!(f, "{v:?}"),
            Literal::NaN => write!(f, "NaN"),
            Literal::Infinity => write!(f, "Infinity"),
            Literal::NegInfinity => write!(f, "-Infinity"),
            Literal::String(v) => write!(f, "{v:?}"),
            Literal::Binary(v) => write!(f, "<<{} bytes>>", v.len()),
            Literal::Date(v) => write!(f, "{v}"),
            Literal::Time(v) => write!(f, "{v}"),
            Literal::NaiveDateTime(v) => write!(f, "{v}"),
            Literal::Duration { value, precision } => write!(f, "{value}{}", precision.as_str()),
            Literal::List(values) => {
                write!(f, "[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            },
        }
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Literal {
            fn from(v: $ty) -> Self {
                Literal::Integer(v as i64)
            }
        })*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        if v.is_nan() {
            Literal::NaN
        } else if v == f64::INFINITY {
            Literal::Infinity
        } else if v == f64::NEG_INFINITY {
            Literal::NegInfinity
        } else {
            Literal::Float(v)
        }
    }
}

impl From<f32> for Literal {
    fn from(v: f32) -> Self {
        Literal::from(v as f64)
    }
}

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Literal::Boolean(v)
    }
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::String(v.to_string())
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Literal::String(v)
    }
}

impl From<&[u8]> for Literal {
    fn from(v: &[u8]) -> Self {
        Literal::Binary(v.to_vec())
    }
}

impl From<NaiveDate> for Literal {
    fn from(v: NaiveDate) -> Self {
        Literal::Date(v)
    }
}

impl From<NaiveTime> for Literal {
    fn from(v: NaiveTime) -> Self {
        Literal::Time(v)
    }
}

impl From<NaiveDateTime> for Literal {
    fn from(v: NaiveDateTime) -> Self {
        Literal::NaiveDateTime(v)
    }
}

impl<T: Into<Literal>> From<Option<T>> for Literal {
    fn from(v: Option<T>) -> Self {
        v.map_or(Literal::Nil, Into::into)
    }
}

impl<T: Into<Literal>> From<Vec<T>> for Literal {
    fn from(v: Vec<T>) -> Self {
        Literal::List(v.into_iter().map(Into::into).collect())
    }
}
