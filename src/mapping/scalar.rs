//! Rust carriers for the scalar kinds.

use chrono::{DateTime, Utc};

use crate::model::{ScalarKind, Value};
use crate::{Error, Result};

/// A Rust type that can back a mapped property.
pub trait Scalar: Sized {
    const KIND: ScalarKind;

    fn to_value(&self) -> Value;

    /// Coerce `value` to [`Self::KIND`] and unwrap it.
    fn from_value(value: Value, property: &str) -> Result<Self>;
}

fn mismatch(property: &str, expected: ScalarKind, got: &Value) -> Error {
    Error::Conversion {
        property: property.to_string(),
        expected,
        got: got.type_name().to_string(),
    }
}

macro_rules! impl_scalar {
    ($ty:ty, $kind:ident, $variant:ident, |$v:ident| $to:expr, |$x:ident| $from:expr) => {
        impl Scalar for $ty {
            const KIND: ScalarKind = ScalarKind::$kind;

            fn to_value(&self) -> Value {
                let $v = self;
                $to
            }

            fn from_value(value: Value, property: &str) -> Result<Self> {
                match value.coerce(ScalarKind::$kind, property)? {
                    Value::$variant($x) => $from,
                    other => Err(mismatch(property, ScalarKind::$kind, &other)),
                }
            }
        }
    };
}

impl_scalar!(bool, Bool, Bool, |v| Value::Bool(*v), |x| Ok(x));
impl_scalar!(u8, Byte, Byte, |v| Value::Byte(*v), |x| Ok(x));
impl_scalar!(char, Char, Char, |v| Value::Char(*v), |x| Ok(x));
impl_scalar!(i64, Integer, Int, |v| Value::Int(*v), |x| Ok(x));
impl_scalar!(f64, Float, Float, |v| Value::Float(*v), |x| Ok(x));
impl_scalar!(String, String, String, |v| Value::String(v.clone()), |x| Ok(x));
impl_scalar!(DateTime<Utc>, Timestamp, Timestamp, |v| Value::Timestamp(*v), |x| Ok(x));

impl Scalar for i32 {
    const KIND: ScalarKind = ScalarKind::Integer;

    fn to_value(&self) -> Value {
        Value::Int(i64::from(*self))
    }

    fn from_value(value: Value, property: &str) -> Result<Self> {
        let wide = i64::from_value(value, property)?;
        i32::try_from(wide).map_err(|_| Error::Conversion {
            property: property.to_string(),
            expected: ScalarKind::Integer,
            got: format!("INTEGER {wide} (out of 32-bit range)"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_value() {
        assert_eq!(u8::from_value(255u8.to_value(), "b").unwrap(), 255);
        assert_eq!(char::from_value('A'.to_value(), "c").unwrap(), 'A');
        assert_eq!(f64::from_value((-5.678f64).to_value(), "d").unwrap(), -5.678);
    }

    #[test]
    fn test_from_string_literal() {
        assert_eq!(i32::from_value(Value::from("2"), "n").unwrap(), 2);
        assert!(bool::from_value(Value::from("true"), "b").unwrap());
    }

    #[test]
    fn test_i32_range_checked() {
        let err = i32::from_value(Value::Int(i64::MAX), "n").unwrap_err();
        match err {
            Error::Conversion { property, expected, got } => {
                assert_eq!(property, "n");
                assert_eq!(expected, ScalarKind::Integer);
                assert!(got.contains(&i64::MAX.to_string()), "got: {got}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(i32::from_value(Value::Int(i64::from(i32::MIN)), "n").unwrap(), i32::MIN);
    }
}
