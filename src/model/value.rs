//! Universal scalar value type for vertex and edge properties.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The scalar kinds a mapped property can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
    Bool,
    Byte,
    Char,
    Integer,
    Float,
    String,
    Timestamp,
}

impl ScalarKind {
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "BOOLEAN",
            ScalarKind::Byte => "BYTE",
            ScalarKind::Char => "CHAR",
            ScalarKind::Integer => "INTEGER",
            ScalarKind::Float => "FLOAT",
            ScalarKind::String => "STRING",
            ScalarKind::Timestamp => "TIMESTAMP",
        }
    }

    /// The value a property of this kind holds when the store has none.
    pub fn zero(&self) -> Value {
        match self {
            ScalarKind::Bool => Value::Bool(false),
            ScalarKind::Byte => Value::Byte(0),
            ScalarKind::Char => Value::Char('\0'),
            ScalarKind::Integer => Value::Int(0),
            ScalarKind::Float => Value::Float(0.0),
            ScalarKind::String => Value::String(String::new()),
            ScalarKind::Timestamp => Value::Timestamp(DateTime::<Utc>::UNIX_EPOCH),
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A dynamically typed property value, tagged with its scalar kind.
///
/// This is what raw graph elements carry before conversion. Every variant
/// except `Null` corresponds to exactly one [`ScalarKind`].
///
/// Deserialising never guesses a kind from text: JSON strings arrive as
/// `String`, integers as `Int`, other numbers as `Float`. The declared kind
/// is applied later by [`Value::coerce`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Byte(u8),
    Char(char),
    Int(i64),
    Float(f64),
    Timestamp(DateTime<Utc>),
    String(String),
}

// ============================================================================
// Type checking
// ============================================================================

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOLEAN",
            Value::Byte(_) => "BYTE",
            Value::Char(_) => "CHAR",
            Value::Int(_) => "INTEGER",
            Value::Float(_) => "FLOAT",
            Value::Timestamp(_) => "TIMESTAMP",
            Value::String(_) => "STRING",
        }
    }

    /// Text form used inside query literals.
    ///
    /// Floats use the shortest representation that parses back to the same
    /// `f64`; timestamps are RFC 3339 in UTC with a `Z` suffix.
    pub fn to_literal(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Byte(b) => b.to_string(),
            Value::Char(c) => c.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            Value::String(s) => s.clone(),
        }
    }
}

// ============================================================================
// Coercion
// ============================================================================

impl Value {
    /// Decode this value into `target`.
    ///
    /// Total over (source tag, target kind): every pair either yields a value
    /// tagged with `target` or a [`Error::Conversion`]. The permitted
    /// conversions are:
    ///
    /// | source | target |
    /// |--------|--------|
    /// | any tag | the same kind |
    /// | `Null` | the kind's zero value |
    /// | `String` | any kind, by parsing |
    /// | `Byte` | `Integer`, `Float` |
    /// | `Int` | `Byte` (range checked), `Float` |
    /// | any non-null | `String` (literal text) |
    pub fn coerce(self, target: ScalarKind, property: &str) -> Result<Value> {
        let fail = |got: &Value| Error::Conversion {
            property: property.to_string(),
            expected: target,
            got: got.type_name().to_string(),
        };

        match (self, target) {
            (Value::Null, kind) => Ok(kind.zero()),

            (v @ Value::Bool(_), ScalarKind::Bool)
            | (v @ Value::Byte(_), ScalarKind::Byte)
            | (v @ Value::Char(_), ScalarKind::Char)
            | (v @ Value::Int(_), ScalarKind::Integer)
            | (v @ Value::Float(_), ScalarKind::Float)
            | (v @ Value::Timestamp(_), ScalarKind::Timestamp)
            | (v @ Value::String(_), ScalarKind::String) => Ok(v),

            (Value::Byte(b), ScalarKind::Integer) => Ok(Value::Int(i64::from(b))),
            (Value::Byte(b), ScalarKind::Float) => Ok(Value::Float(f64::from(b))),
            (Value::Int(i), ScalarKind::Float) => Ok(Value::Float(i as f64)),
            (Value::Int(i), ScalarKind::Byte) => {
                u8::try_from(i).map(Value::Byte).map_err(|_| fail(&Value::Int(i)))
            }

            (Value::String(s), kind) => parse_literal(&s, kind).ok_or_else(|| Error::Conversion {
                property: property.to_string(),
                expected: kind,
                got: format!("STRING '{s}'"),
            }),

            (Value::Char(c), kind) => {
                parse_literal(c.encode_utf8(&mut [0; 4]), kind).ok_or_else(|| fail(&Value::Char(c)))
            }

            (v, ScalarKind::String) => Ok(Value::String(v.to_literal())),

            (v, _) => Err(fail(&v)),
        }
    }
}

/// Parse literal text into a value of `kind`. The inverse of [`Value::to_literal`].
fn parse_literal(text: &str, kind: ScalarKind) -> Option<Value> {
    match kind {
        ScalarKind::Bool => match text {
            "true" | "True" => Some(Value::Bool(true)),
            "false" | "False" => Some(Value::Bool(false)),
            _ => None,
        },
        ScalarKind::Byte => text.parse::<u8>().ok().map(Value::Byte),
        ScalarKind::Char => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(Value::Char(c)),
                _ => None,
            }
        }
        ScalarKind::Integer => text.parse::<i64>().ok().map(Value::Int),
        ScalarKind::Float => text.parse::<f64>().ok().map(Value::Float),
        ScalarKind::String => Some(Value::String(text.to_string())),
        ScalarKind::Timestamp => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|ts| Value::Timestamp(ts.with_timezone(&Utc))),
    }
}

// ============================================================================
// Conversions (From impls)
// ============================================================================

impl From<bool> for Value { fn from(v: bool) -> Self { Value::Bool(v) } }
impl From<u8> for Value { fn from(v: u8) -> Self { Value::Byte(v) } }
impl From<char> for Value { fn from(v: char) -> Self { Value::Char(v) } }
impl From<i32> for Value { fn from(v: i32) -> Self { Value::Int(v as i64) } }
impl From<i64> for Value { fn from(v: i64) -> Self { Value::Int(v) } }
impl From<f64> for Value { fn from(v: f64) -> Self { Value::Float(v) } }
impl From<DateTime<Utc>> for Value { fn from(v: DateTime<Utc>) -> Self { Value::Timestamp(v) } }
impl From<String> for Value { fn from(v: String) -> Self { Value::String(v) } }
impl From<&str> for Value { fn from(v: &str) -> Self { Value::String(v.to_owned()) } }
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self { v.map(Into::into).unwrap_or(Value::Null) }
}

// ============================================================================
// Deserialization
// ============================================================================

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar property value")
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> std::result::Result<Value, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Value, E> {
        Ok(Value::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Value, E> {
        Ok(i64::try_from(v).map(Value::Int).unwrap_or(Value::Float(v as f64)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Value, E> {
        Ok(Value::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Value, E> {
        Ok(Value::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Value, E> {
        Ok(Value::String(v))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        d.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_value_from() {
        assert_eq!(Value::from("hello"), Value::String("hello".into()));
        assert_eq!(Value::from(42), Value::Int(42));
        assert_eq!(Value::from(255u8), Value::Byte(255));
        assert_eq!(Value::from('A'), Value::Char('A'));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }

    #[test]
    fn test_literal_text() {
        let ts = Utc.with_ymd_and_hms(2017, 9, 19, 10, 45, 52).unwrap();
        assert_eq!(Value::Timestamp(ts).to_literal(), "2017-09-19T10:45:52Z");
        assert_eq!(Value::Float(-5.678).to_literal(), "-5.678");
        assert_eq!(Value::Bool(false).to_literal(), "false");
        assert_eq!(Value::Null.to_literal(), "");
    }

    #[test]
    fn test_coerce_identity() {
        assert_eq!(Value::Int(7).coerce(ScalarKind::Integer, "n").unwrap(), Value::Int(7));
        assert_eq!(Value::Char('x').coerce(ScalarKind::Char, "c").unwrap(), Value::Char('x'));
    }

    #[test]
    fn test_coerce_from_string_literals() {
        assert_eq!(Value::from("255").coerce(ScalarKind::Byte, "b").unwrap(), Value::Byte(255));
        assert_eq!(Value::from("true").coerce(ScalarKind::Bool, "b").unwrap(), Value::Bool(true));
        assert_eq!(Value::from("A").coerce(ScalarKind::Char, "c").unwrap(), Value::Char('A'));
        assert_eq!(Value::from("-5.678").coerce(ScalarKind::Float, "d").unwrap(), Value::Float(-5.678));
        let ts = Utc.with_ymd_and_hms(2017, 9, 19, 10, 45, 52).unwrap();
        assert_eq!(
            Value::from("2017-09-19T10:45:52Z").coerce(ScalarKind::Timestamp, "t").unwrap(),
            Value::Timestamp(ts),
        );
    }

    #[test]
    fn test_coerce_widening() {
        assert_eq!(Value::Byte(3).coerce(ScalarKind::Integer, "n").unwrap(), Value::Int(3));
        assert_eq!(Value::Int(3).coerce(ScalarKind::Float, "n").unwrap(), Value::Float(3.0));
        assert_eq!(Value::Int(200).coerce(ScalarKind::Byte, "n").unwrap(), Value::Byte(200));
        assert_eq!(Value::Int(2).coerce(ScalarKind::String, "n").unwrap(), Value::from("2"));
    }

    #[test]
    fn test_coerce_null_is_zero() {
        assert_eq!(Value::Null.coerce(ScalarKind::Integer, "n").unwrap(), Value::Int(0));
        assert_eq!(Value::Null.coerce(ScalarKind::String, "s").unwrap(), Value::from(""));
    }

    #[test]
    fn test_coerce_rejects_narrowing() {
        assert!(matches!(
            Value::Float(1.5).coerce(ScalarKind::Integer, "n"),
            Err(Error::Conversion { .. })
        ));
        assert!(matches!(
            Value::Int(256).coerce(ScalarKind::Byte, "n"),
            Err(Error::Conversion { .. })
        ));
        assert!(matches!(
            Value::Int(1).coerce(ScalarKind::Bool, "n"),
            Err(Error::Conversion { .. })
        ));
        assert!(matches!(
            Value::from("AB").coerce(ScalarKind::Char, "c"),
            Err(Error::Conversion { .. })
        ));
    }

    #[test]
    fn test_json_never_guesses_kind_from_text() {
        let parse = |json: &str| serde_json::from_str::<Value>(json).unwrap();
        assert_eq!(parse(r#""7""#), Value::from("7"));
        assert_eq!(parse(r#""2017-09-19T10:45:52Z""#), Value::from("2017-09-19T10:45:52Z"));
        assert_eq!(parse("255"), Value::Int(255));
        assert_eq!(parse("-5.678"), Value::Float(-5.678));
        assert_eq!(parse("true"), Value::Bool(true));
        assert_eq!(parse("null"), Value::Null);
        assert!(serde_json::from_str::<Value>("[1]").is_err());

        assert_eq!(parse(r#""7""#).coerce(ScalarKind::Integer, "n").unwrap(), Value::Int(7));
    }

    #[test]
    fn test_conversion_error_names_property() {
        let err = Value::from("nope").coerce(ScalarKind::Integer, "age").unwrap_err();
        match err {
            Error::Conversion { property, expected, .. } => {
                assert_eq!(property, "age");
                assert_eq!(expected, ScalarKind::Integer);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
