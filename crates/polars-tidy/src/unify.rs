//! Inference of a single dtype for a sequence of heterogeneous literals.
//!
//! Values are folded left to right into a running [`Inferred`] type. Integers
//! and floats promote to a generic numeric type, which is resolved to a
//! concrete float width at the end. Every other kind of value commits the
//! running type, after which any other kind of value is a type mismatch.
use crate::dtype::{Dtype, FloatWidth, Precision};
use crate::error::TidyResult;
use crate::literal::Literal;
use crate::tidy_err;

#[derive(Clone, Debug, PartialEq)]
enum Inferred {
    Unset,
    Integer,
    Float(FloatWidth),
    /// Integers and floats were mixed. The width is the one of the floats
    /// seen, if any carried one.
    Numeric(Option<FloatWidth>),
    Fixed(Dtype),
    List,
}

impl Inferred {
    fn seed(preferred: Option<&Dtype>) -> Self {
        match preferred {
            Some(Dtype::Integer) => Inferred::Integer,
            Some(Dtype::Float(w)) => Inferred::Float(*w),
            Some(dt @ (Dtype::Binary | Dtype::Category)) => Inferred::Fixed(dt.clone()),
            _ => Inferred::Unset,
        }
    }

    fn describe(&self) -> String {
        match self {
            Inferred::Unset => "unknown".to_string(),
            Inferred::Integer => Dtype::Integer.to_string(),
            Inferred::Float(w) => Dtype::Float(*w).to_string(),
            Inferred::Numeric(_) => "numeric".to_string(),
            Inferred::Fixed(dt) => dt.to_string(),
            Inferred::List => "list".to_string(),
        }
    }
}

struct Unifier<'a> {
    current: Inferred,
    /// Children of all sublists seen at this level, flattened by one level.
    children: Vec<&'a Literal>,
}

impl<'a> Unifier<'a> {
    fn new(preferred: Option<&Dtype>) -> Self {
        Self {
            current: Inferred::seed(preferred),
            children: vec![],
        }
    }

    fn push(&mut self, item: &'a Literal) -> TidyResult<()> {
        use Inferred::*;

        let current = self.current.clone();
        let next = match (item, &current) {
            (Literal::Nil, _) => return Ok(()),
            (Literal::List(values), Unset | List) => {
                self.children.extend(values.iter().filter(|v| !v.is_nil()));
                List
            },
            // Empty sublists contribute no constraint, whatever the context.
            (Literal::List(values), _) if values.is_empty() => return Ok(()),

            (Literal::Integer(_), Unset | Integer) => Integer,
            (Literal::Integer(_), Float(w)) => Numeric(Some(*w)),
            (Literal::Integer(_), Numeric(w)) => Numeric(*w),

            (Literal::Float(_) | Literal::NaN | Literal::Infinity | Literal::NegInfinity, cur) => {
                match cur {
                    Unset => Float(FloatWidth::F64),
                    Float(w) => Float(*w),
                    Integer => Numeric(None),
                    Numeric(w) => Numeric(*w),
                    _ => return Err(self.mismatch(item)),
                }
            },

            (Literal::String(_), Fixed(Dtype::Binary | Dtype::Category)) => {
                return Ok(());
            },
            (Literal::Binary(_), Fixed(Dtype::Binary)) => return Ok(()),

            (Literal::Boolean(_), _) => return self.commit(item, Dtype::Boolean),
            (Literal::String(_), _) => return self.commit(item, Dtype::String),
            (Literal::Binary(_), _) => return self.commit(item, Dtype::Binary),
            (Literal::Date(_), _) => return self.commit(item, Dtype::Date),
            (Literal::Time(_), _) => return self.commit(item, Dtype::Time),
            (Literal::NaiveDateTime(_), _) => {
                return self.commit(item, Dtype::Datetime(Precision::Microsecond));
            },
            (Literal::Duration { precision, .. }, _) => {
                return self.commit(item, Dtype::Duration(*precision));
            },
            (Literal::Integer(_) | Literal::List(_), _) => return Err(self.mismatch(item)),
        };
        self.current = next;
        Ok(())
    }

    fn commit(&mut self, item: &Literal, dtype: Dtype) -> TidyResult<()> {
        match &self.current {
            Inferred::Unset => {
                self.current = Inferred::Fixed(dtype);
                Ok(())
            },
            Inferred::Fixed(established) if *established == dtype => Ok(()),
            _ => Err(self.mismatch(item)),
        }
    }

    fn mismatch(&self, item: &Literal) -> crate::error::TidyError {
        tidy_err!(TypeMismatch: item, self.current.describe())
    }

    fn finish(self, preferred: Option<&Dtype>) -> TidyResult<Option<Dtype>> {
        let dtype = match self.current {
            Inferred::Unset => None,
            Inferred::Integer => Some(Dtype::Integer),
            Inferred::Float(w) => Some(Dtype::Float(w)),
            Inferred::Numeric(w) => Some(Dtype::Float(w.unwrap_or(FloatWidth::F64))),
            Inferred::Fixed(dt) => Some(dt),
            Inferred::List => {
                let inner_preferred = match preferred {
                    Some(Dtype::List(inner)) => Some(inner.as_ref()),
                    _ => None,
                };
                let inner = unify_refs(self.children, inner_preferred)?;
                Some(Dtype::list(
                    inner.unwrap_or_else(|| default_dtype(inner_preferred)),
                ))
            },
        };
        Ok(dtype)
    }
}

fn default_dtype(preferred: Option<&Dtype>) -> Dtype {
    preferred.cloned().unwrap_or(Dtype::F64)
}

fn unify_refs<'a, I>(items: I, preferred: Option<&Dtype>) -> TidyResult<Option<Dtype>>
where
    I: IntoIterator<Item = &'a Literal>,
{
    let mut unifier = Unifier::new(preferred);
    for item in items {
        unifier.push(item)?;
    }
    unifier.finish(preferred)
}

/// Like [`unify`], but returns `None` when no item constrains the dtype.
pub(crate) fn unify_opt(items: &[Literal], preferred: Option<&Dtype>) -> TidyResult<Option<Dtype>> {
    unify_refs(items, preferred)
}

/// Infers the dtype shared by all `items`.
///
/// `preferred` seeds the inference when it is `integer`, a float, `binary` or
/// `category`, and is the result when nothing constrains the dtype. Without a
/// preference, unconstrained input is `f64`.
pub fn unify(items: &[Literal], preferred: Option<&Dtype>) -> TidyResult<Dtype> {
    Ok(unify_opt(items, preferred)?.unwrap_or_else(|| default_dtype(preferred)))
}

/// Infers the dtype shared by all `items` and returns the items converted to
/// it: integers become floats wherever the dtype resolved to a float.
pub fn unify_with_literals(
    items: &[Literal],
    preferred: Option<&Dtype>,
) -> TidyResult<(Dtype, Vec<Literal>)> {
    let dtype = unify(items, preferred)?;
    let literals = downcast(items, &dtype);
    Ok((dtype, literals))
}

/// Converts integer literals to floats in lockstep with a float `dtype`,
/// recursing through nested lists.
pub fn downcast(items: &[Literal], dtype: &Dtype) -> Vec<Literal> {
    items.iter().map(|item| downcast_one(item, dtype)).collect()
}

fn downcast_one(item: &Literal, dtype: &Dtype) -> Literal {
    match (item, dtype) {
        (Literal::Integer(v), Dtype::Float(_)) => Literal::Float(*v as f64),
        (Literal::List(values), Dtype::List(inner)) => Literal::List(downcast(values, inner)),
        (item, _) => item.clone(),
    }
}
