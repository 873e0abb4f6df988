use std::fmt::{Display, Formatter};
use std::str::FromStr;

use polars::prelude::{DataType, TimeUnit};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{TidyError, TidyResult};
use crate::tidy_bail;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FloatWidth {
    F32,
    F64,
}

impl FloatWidth {
    pub fn bits(self) -> u8 {
        match self {
            FloatWidth::F32 => 32,
            FloatWidth::F64 => 64,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Precision {
    Millisecond,
    Microsecond,
    Nanosecond,
}

impl Precision {
    pub fn as_str(self) -> &'static str {
        match self {
            Precision::Millisecond => "ms",
            Precision::Microsecond => "µs",
            Precision::Nanosecond => "ns",
        }
    }

    /// Number of units of this precision in one second.
    pub fn per_second(self) -> i64 {
        match self {
            Precision::Millisecond => 1_000,
            Precision::Microsecond => 1_000_000,
            Precision::Nanosecond => 1_000_000_000,
        }
    }
}

impl FromStr for Precision {
    type Err = TidyError;

    fn from_str(s: &str) -> TidyResult<Self> {
        let precision = match s {
            "ms" => Precision::Millisecond,
            // Micro sign, Greek small mu and the ascii fallback.
            "µs" | "μs" | "us" => Precision::Microsecond,
            "ns" => Precision::Nanosecond,
            _ => tidy_bail!(UnsupportedDtype: "unknown time precision {:?}", s),
        };
        Ok(precision)
    }
}

impl From<TimeUnit> for Precision {
    fn from(tu: TimeUnit) -> Self {
        match tu {
            TimeUnit::Milliseconds => Precision::Millisecond,
            TimeUnit::Microseconds => Precision::Microsecond,
            TimeUnit::Nanoseconds => Precision::Nanosecond,
        }
    }
}

impl From<Precision> for TimeUnit {
    fn from(p: Precision) -> Self {
        match p {
            Precision::Millisecond => TimeUnit::Milliseconds,
            Precision::Microsecond => TimeUnit::Microseconds,
            Precision::Nanosecond => TimeUnit::Nanoseconds,
        }
    }
}

/// The canonical column and value type.
///
/// In memory this is always a tagged value. It is only turned into its textual
/// form (see the [`Display`] impl) when crossing into the engine.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Dtype {
    Boolean,
    Integer,
    Float(FloatWidth),
    String,
    Binary,
    Category,
    Date,
    Time,
    Datetime(Precision),
    Duration(Precision),
    List(Box<Dtype>),
}

impl Dtype {
    pub const F64: Dtype = Dtype::Float(FloatWidth::F64);
    pub const F32: Dtype = Dtype::Float(FloatWidth::F32);

    pub fn list(inner: Dtype) -> Dtype {
        Dtype::List(Box::new(inner))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Dtype::Integer | Dtype::Float(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Dtype::Float(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Dtype::Integer)
    }

    pub fn is_duration(&self) -> bool {
        matches!(self, Dtype::Duration(_))
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            Dtype::Date | Dtype::Time | Dtype::Datetime(_) | Dtype::Duration(_)
        )
    }

    /// Innermost non-list dtype.
    pub fn leaf(&self) -> &Dtype {
        match self {
            Dtype::List(inner) => inner.leaf(),
            dt => dt,
        }
    }

    /// Converts into the engine dtype by way of the textual grammar.
    pub fn to_engine(&self) -> TidyResult<DataType> {
        engine_dtype(&self.to_string())
    }
}

impl Display for Dtype {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Dtype::Boolean => write!(f, "boolean"),
            Dtype::Integer => write!(f, "integer"),
            Dtype::Float(w) => write!(f, "f{}", w.bits()),
            Dtype::String => write!(f, "string"),
            Dtype::Binary => write!(f, "binary"),
            Dtype::Category => write!(f, "category"),
            Dtype::Date => write!(f, "date"),
            Dtype::Time => write!(f, "time"),
            Dtype::Datetime(p) => write!(f, "datetime[{}]", p.as_str()),
            Dtype::Duration(p) => write!(f, "duration[{}]", p.as_str()),
            Dtype::List(inner) => write!(f, "list[{inner}]"),
        }
    }
}

fn bracketed<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    s.strip_prefix(prefix)?
        .strip_prefix('[')?
        .strip_suffix(']')
}

impl FromStr for Dtype {
    type Err = TidyError;

    fn from_str(s: &str) -> TidyResult<Self> {
        let dtype = match s {
            "boolean" => Dtype::Boolean,
            "integer" => Dtype::Integer,
            "f32" => Dtype::F32,
            "f64" => Dtype::F64,
            "string" => Dtype::String,
            "binary" => Dtype::Binary,
            "category" => Dtype::Category,
            "date" => Dtype::Date,
            "time" => Dtype::Time,
            _ => {
                if let Some(p) = bracketed(s, "datetime") {
                    Dtype::Datetime(p.parse()?)
                } else if let Some(p) = bracketed(s, "duration") {
                    Dtype::Duration(p.parse()?)
                } else if let Some(inner) = bracketed(s, "list") {
                    Dtype::list(inner.parse()?)
                } else {
                    tidy_bail!(UnsupportedDtype: "cannot parse dtype {:?}", s)
                }
            },
        };
        Ok(dtype)
    }
}

/// Engine side of the dtype grammar.
pub(crate) fn engine_dtype(s: &str) -> TidyResult<DataType> {
    let dtype = match s {
        "boolean" => DataType::Boolean,
        "integer" => DataType::Int64,
        "f32" => DataType::Float32,
        "f64" => DataType::Float64,
        "string" => DataType::String,
        "binary" => DataType::Binary,
        "category" => DataType::Categorical(None, Default::default()),
        "date" => DataType::Date,
        "time" => DataType::Time,
        _ => {
            if let Some(p) = bracketed(s, "datetime") {
                DataType::Datetime(p.parse::<Precision>()?.into(), None)
            } else if let Some(p) = bracketed(s, "duration") {
                DataType::Duration(p.parse::<Precision>()?.into())
            } else if let Some(inner) = bracketed(s, "list") {
                DataType::List(Box::new(engine_dtype(inner)?))
            } else {
                tidy_bail!(UnsupportedDtype: "cannot parse dtype {:?}", s)
            }
        },
    };
    Ok(dtype)
}

impl TryFrom<&DataType> for Dtype {
    type Error = TidyError;

    fn try_from(dt: &DataType) -> TidyResult<Self> {
        use DataType::*;
        let dtype = match dt {
            Boolean => Dtype::Boolean,
            Int8 | Int16 | Int32 | Int64 | UInt8 | UInt16 | UInt32 | UInt64 => Dtype::Integer,
            Float32 => Dtype::F32,
            Float64 => Dtype::F64,
            String => Dtype::String,
            Binary => Dtype::Binary,
            Categorical(_, _) => Dtype::Category,
            Date => Dtype::Date,
            Time => Dtype::Time,
            // Time zones are dropped: the column is read as naive wall time.
            Datetime(tu, _) => Dtype::Datetime((*tu).into()),
            Duration(tu) => Dtype::Duration((*tu).into()),
            List(inner) => Dtype::list(Dtype::try_from(inner.as_ref())?),
            dt => tidy_bail!(UnsupportedDtype: "{}", dt),
        };
        Ok(dtype)
    }
}

impl TryFrom<DataType> for Dtype {
    type Error = TidyError;

    fn try_from(dt: DataType) -> TidyResult<Self> {
        Dtype::try_from(&dt)
    }
}
