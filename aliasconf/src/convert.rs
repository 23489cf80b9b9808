//! Coercion of resolved values to requested types.
//!
//! Configuration files are loose about types: a timeout may be written as
//! `30` or `"30"`, a flag as `true`, `"yes"` or `"on"`. The rules here decide
//! which of those are acceptable for each target type. A null value never
//! converts to anything; callers that want a fallback supply it themselves.

use std::fmt;
use std::str::FromStr;

use serde_yaml::{Mapping, Value};

use crate::builder::kind_of;
use crate::error::{Error, Result};

/// Target types understood by [`convert`].
///
/// # Examples
///
/// ```
/// use aliasconf::convert::{convert, ValueType};
/// use serde_yaml::Value;
///
/// let ty: ValueType = "int".parse().unwrap();
/// assert_eq!(convert(&Value::from("42"), ty).unwrap(), Value::from(42));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Text.
    String,
    /// Signed 64-bit integer.
    Integer,
    /// `true` or `false`.
    Boolean,
    /// 64-bit float.
    Float,
    /// A sequence.
    List,
    /// A map.
    Map,
}

impl ValueType {
    /// Every target type, in display order.
    pub const ALL: [Self; 6] = [
        Self::String,
        Self::Integer,
        Self::Boolean,
        Self::Float,
        Self::List,
        Self::Map,
    ];

    /// Parse a type name such as `"int"` or `"bool"`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for unknown names.
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "str" | "string" => Ok(Self::String),
            "int" | "integer" => Ok(Self::Integer),
            "bool" | "boolean" => Ok(Self::Boolean),
            "float" | "number" => Ok(Self::Float),
            "list" | "seq" | "sequence" => Ok(Self::List),
            "map" | "dict" | "mapping" => Ok(Self::Map),
            _ => Err(Error::validation(
                "type",
                format!("unknown type '{name}', expected one of: str, int, bool, float, list, map"),
            )),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "str",
            Self::Integer => "int",
            Self::Boolean => "bool",
            Self::Float => "float",
            Self::List => "list",
            Self::Map => "map",
        };
        f.write_str(name)
    }
}

impl FromStr for ValueType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Convert `value` to `target`, returning the converted value.
///
/// # Errors
///
/// Returns a validation error when the value is null or cannot be
/// represented as `target`.
pub fn convert(value: &Value, target: ValueType) -> Result<Value> {
    Ok(match target {
        ValueType::String => Value::String(to_string(value)?),
        ValueType::Integer => Value::from(to_i64(value)?),
        ValueType::Boolean => Value::Bool(to_bool(value)?),
        ValueType::Float => Value::from(to_f64(value)?),
        ValueType::List => Value::Sequence(to_list(value)?.to_vec()),
        ValueType::Map => Value::Mapping(to_map(value)?.clone()),
    })
}

/// Render a value as plain text, the way it would read in a template.
///
/// Strings are returned verbatim, scalars via their natural display and
/// collections as compact JSON. Null renders as the empty string.
#[must_use]
pub fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(_) | Value::Mapping(_) => {
            serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"))
        }
        Value::Tagged(tagged) => render(&tagged.value),
    }
}

fn untagged(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untagged(&tagged.value),
        other => other,
    }
}

fn mismatch(value: &Value, target: ValueType) -> Error {
    let value = untagged(value);
    let shown = match value {
        Value::Sequence(_) | Value::Mapping(_) => String::new(),
        scalar => format!(" '{}'", render(scalar)),
    };
    Error::validation(
        target.to_string(),
        format!("cannot convert {}{shown} to {target}", kind_of(value)),
    )
}

fn reject_null(value: &Value, target: ValueType) -> Result<&Value> {
    match untagged(value) {
        Value::Null => Err(Error::validation(
            target.to_string(),
            "cannot convert null without a default value",
        )),
        other => Ok(other),
    }
}

fn to_string(value: &Value) -> Result<String> {
    reject_null(value, ValueType::String).map(render)
}

fn to_i64(value: &Value) -> Result<i64> {
    let target = ValueType::Integer;
    match reject_null(value, target)? {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                #[allow(clippy::cast_possible_truncation)]
                Some(f) if f.is_finite() && f.trunc().abs() < 9.2e18 => Ok(f.trunc() as i64),
                _ => Err(mismatch(value, target)),
            }
        }
        Value::String(s) => s.trim().parse().map_err(|_| mismatch(value, target)),
        _ => Err(mismatch(value, target)),
    }
}

fn to_bool(value: &Value) -> Result<bool> {
    let target = ValueType::Boolean;
    match reject_null(value, target)? {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(mismatch(value, target)),
        },
        _ => Err(mismatch(value, target)),
    }
}

fn to_f64(value: &Value) -> Result<f64> {
    let target = ValueType::Float;
    match reject_null(value, target)? {
        Value::Number(n) => n.as_f64().ok_or_else(|| mismatch(value, target)),
        Value::String(s) => s.trim().parse().map_err(|_| mismatch(value, target)),
        _ => Err(mismatch(value, target)),
    }
}

fn to_list(value: &Value) -> Result<&[Value]> {
    match reject_null(value, ValueType::List)? {
        Value::Sequence(items) => Ok(items),
        _ => Err(mismatch(value, ValueType::List)),
    }
}

fn to_map(value: &Value) -> Result<&Mapping> {
    match reject_null(value, ValueType::Map)? {
        Value::Mapping(map) => Ok(map),
        _ => Err(mismatch(value, ValueType::Map)),
    }
}

/// Types that can be produced from a resolved configuration value.
///
/// # Examples
///
/// ```
/// use aliasconf::convert::FromValue;
/// use serde_yaml::Value;
///
/// assert!(bool::from_value(&Value::from("yes")).unwrap());
/// assert_eq!(i64::from_value(&Value::from("30")).unwrap(), 30);
/// assert!(i64::from_value(&Value::from("not_a_number")).is_err());
/// ```
pub trait FromValue: Sized {
    /// Convert `value` into `Self`.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the value does not fit.
    fn from_value(value: &Value) -> Result<Self>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        to_string(value)
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self> {
        to_i64(value)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self> {
        to_bool(value)
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self> {
        to_f64(value)
    }
}

impl FromValue for Mapping {
    fn from_value(value: &Value) -> Result<Self> {
        to_map(value).cloned()
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self> {
        to_list(value)?.iter().map(T::from_value).collect()
    }
}

macro_rules! narrow_integer {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self> {
                    let wide = to_i64(value)?;
                    <$ty>::try_from(wide).map_err(|_| {
                        Error::validation(
                            stringify!($ty),
                            format!("{wide} is out of range for {}", stringify!($ty)),
                        )
                    })
                }
            }
        )*
    };
}

narrow_integer!(i32, u16, u32, u64, usize);
