use std::fmt::Display;

use serde_json::Value;

use super::Filter;
use crate::document::Record;
use crate::error::StoreError;

/// Types that can be used as filter arguments.
///
/// Conversion is fallible so that dynamically shaped input (a JSON value, a
/// negative integer) is rejected with `InvalidArgument` rather than guessed at.
pub trait IntoFilter {
    fn into_filter(self) -> Result<Filter, StoreError>;
}

impl IntoFilter for Filter {
    fn into_filter(self) -> Result<Filter, StoreError> {
        Ok(self)
    }
}

impl IntoFilter for &Filter {
    fn into_filter(self) -> Result<Filter, StoreError> {
        Ok(self.clone())
    }
}

// Predicate mapping
impl IntoFilter for Record {
    fn into_filter(self) -> Result<Filter, StoreError> {
        Ok(Filter::ByPredicate(self))
    }
}

impl IntoFilter for &Record {
    fn into_filter(self) -> Result<Filter, StoreError> {
        Ok(Filter::ByPredicate(self.clone()))
    }
}

// Untyped JSON: number, array of numbers, or object
impl IntoFilter for Value {
    fn into_filter(self) -> Result<Filter, StoreError> {
        match self {
            Value::Object(predicate) => Ok(Filter::ByPredicate(predicate)),
            Value::Array(items) => items
                .iter()
                .map(json_id)
                .collect::<Result<Vec<_>, _>>()
                .map(Filter::ByIds),
            number @ Value::Number(_) => json_id(&number).map(Filter::ById),
            other => Err(unsupported(&other)),
        }
    }
}

impl IntoFilter for &Value {
    fn into_filter(self) -> Result<Filter, StoreError> {
        self.clone().into_filter()
    }
}

fn json_id(value: &Value) -> Result<u64, StoreError> {
    value.as_u64().ok_or_else(|| {
        StoreError::InvalidArgument(format!(
            "id must be a non-negative integer, got {}",
            value
        ))
    })
}

fn unsupported(value: &Value) -> StoreError {
    StoreError::InvalidArgument(format!(
        "filter must be an id, a list of ids or a field mapping, got {}",
        value
    ))
}

fn to_id<T>(value: T) -> Result<u64, StoreError>
where
    T: Copy + Display,
    u64: TryFrom<T>,
{
    u64::try_from(value).map_err(|_| {
        StoreError::InvalidArgument(format!(
            "id must be a non-negative integer, got {}",
            value
        ))
    })
}

fn to_ids<T, I>(values: I) -> Result<Filter, StoreError>
where
    T: Copy + Display,
    u64: TryFrom<T>,
    I: IntoIterator<Item = T>,
{
    values
        .into_iter()
        .map(to_id)
        .collect::<Result<Vec<_>, _>>()
        .map(Filter::ByIds)
}

macro_rules! impl_id_filters {
    ($($ty:ty),* $(,)?) => {$(
        // Single id
        impl IntoFilter for $ty {
            fn into_filter(self) -> Result<Filter, StoreError> {
                to_id(self).map(Filter::ById)
            }
        }

        // Vec of ids
        impl IntoFilter for Vec<$ty> {
            fn into_filter(self) -> Result<Filter, StoreError> {
                to_ids(self)
            }
        }

        impl IntoFilter for &Vec<$ty> {
            fn into_filter(self) -> Result<Filter, StoreError> {
                to_ids(self.iter().copied())
            }
        }

        // Slice of ids
        impl IntoFilter for &[$ty] {
            fn into_filter(self) -> Result<Filter, StoreError> {
                to_ids(self.iter().copied())
            }
        }

        // Fixed-size arrays
        impl<const N: usize> IntoFilter for [$ty; N] {
            fn into_filter(self) -> Result<Filter, StoreError> {
                to_ids(self)
            }
        }

        impl<const N: usize> IntoFilter for &[$ty; N] {
            fn into_filter(self) -> Result<Filter, StoreError> {
                to_ids(self.iter().copied())
            }
        }
    )*};
}

impl_id_filters!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);
