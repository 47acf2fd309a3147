// Author: Dustin Pilgrim
// License: MIT

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ArborError;

/// The kind of a setting. Fixed when the setting is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    None,
    Group,
    Int32,
    Int64,
    Float64,
    String,
    Bool,
    Array,
    List,
}

impl ValueKind {
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            ValueKind::Int32 | ValueKind::Int64 | ValueKind::Float64 | ValueKind::String | ValueKind::Bool
        )
    }

    pub fn is_container(self) -> bool {
        matches!(self, ValueKind::Group | ValueKind::Array | ValueKind::List)
    }

    /// Containers whose children are addressed by position only.
    pub fn is_positional(self) -> bool {
        matches!(self, ValueKind::Array | ValueKind::List)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::None => "none",
            ValueKind::Group => "group",
            ValueKind::Int32 => "int",
            ValueKind::Int64 => "int64",
            ValueKind::Float64 => "float",
            ValueKind::String => "string",
            ValueKind::Bool => "bool",
            ValueKind::Array => "array",
            ValueKind::List => "list",
        };
        f.write_str(name)
    }
}

/// Output format for integer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Format {
    #[default]
    Default,
    Hex,
}

/// A scalar payload. Its variant always matches the owning setting's kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int32(i32),
    Int64(i64),
    Float64(f64),
    Bool(bool),
    String(String),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int32(_) => ValueKind::Int32,
            Value::Int64(_) => ValueKind::Int64,
            Value::Float64(_) => ValueKind::Float64,
            Value::Bool(_) => ValueKind::Bool,
            Value::String(_) => ValueKind::String,
        }
    }

    /// Relaxed numeric conversion used when auto-conversion is enabled.
    ///
    /// Integers widen to 64 bits and to floats; floats truncate toward zero
    /// into integers. Narrowing only succeeds when the value fits. Booleans
    /// and strings never convert.
    pub fn convert(&self, kind: ValueKind) -> Option<Value> {
        if self.kind() == kind {
            return Some(self.clone());
        }

        match (self, kind) {
            (Value::Int32(n), ValueKind::Int64) => Some(Value::Int64(i64::from(*n))),
            (Value::Int32(n), ValueKind::Float64) => Some(Value::Float64(f64::from(*n))),
            (Value::Int64(n), ValueKind::Int32) => i32::try_from(*n).ok().map(Value::Int32),
            (Value::Int64(n), ValueKind::Float64) => Some(Value::Float64(*n as f64)),
            (Value::Float64(f), ValueKind::Int32) => {
                let t = f.trunc();
                if t.is_finite() && t >= f64::from(i32::MIN) && t <= f64::from(i32::MAX) {
                    Some(Value::Int32(t as i32))
                } else {
                    None
                }
            }
            (Value::Float64(f), ValueKind::Int64) => {
                let t = f.trunc();
                // i64::MAX is not representable; 2^63 is the first value past it.
                if t.is_finite() && t >= -9_223_372_036_854_775_808.0 && t < 9_223_372_036_854_775_808.0 {
                    Some(Value::Int64(t as i64))
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int32(n) => write!(f, "{}", n),
            Value::Int64(n) => write!(f, "{}L", n),
            Value::Float64(x) => write!(f, "{:?}", x),
            Value::Bool(b) => write!(f, "{}", b),
            Value::String(s) => write!(f, "{:?}", s),
        }
    }
}

/// Rust types that map one-to-one onto a scalar [`ValueKind`].
pub trait ScalarType: TryFrom<Value, Error = ArborError> + Into<Value> {
    const KIND: ValueKind;
}

macro_rules! scalar_type {
    ($ty:ty, $variant:ident) => {
        impl ScalarType for $ty {
            const KIND: ValueKind = ValueKind::$variant;
        }

        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }

        impl TryFrom<Value> for $ty {
            type Error = ArborError;

            fn try_from(value: Value) -> Result<Self, Self::Error> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(ArborError::mismatch(ValueKind::$variant, other.kind())),
                }
            }
        }
    };
}

scalar_type!(i32, Int32);
scalar_type!(i64, Int64);
scalar_type!(f64, Float64);
scalar_type!(bool, Bool);
scalar_type!(String, String);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_conversion_rejects_narrowing() {
        let result: Result<i32, ArborError> = Value::Int64(5).try_into();
        assert_eq!(
            result,
            Err(ArborError::TypeMismatch {
                expected: ValueKind::Int32,
                found: ValueKind::Int64
            })
        );
    }

    #[test]
    fn test_bool_is_not_an_integer() {
        let result: Result<i32, ArborError> = Value::Bool(true).try_into();
        assert!(result.is_err());
        assert_eq!(Value::Bool(true).convert(ValueKind::Int32), None);
    }

    #[test]
    fn test_relaxed_conversion() {
        assert_eq!(Value::Int32(7).convert(ValueKind::Int64), Some(Value::Int64(7)));
        assert_eq!(Value::Int32(2).convert(ValueKind::Float64), Some(Value::Float64(2.0)));
        assert_eq!(Value::Float64(-3.9).convert(ValueKind::Int32), Some(Value::Int32(-3)));
        assert_eq!(Value::Int64(1 << 40).convert(ValueKind::Int32), None);
        assert_eq!(Value::Float64(f64::NAN).convert(ValueKind::Int64), None);
        assert_eq!(Value::String("1".into()).convert(ValueKind::Int32), None);
    }

    #[test]
    fn test_kind_categories() {
        assert!(ValueKind::Bool.is_scalar());
        assert!(!ValueKind::None.is_scalar());
        assert!(!ValueKind::None.is_container());
        assert!(ValueKind::Group.is_container());
        assert!(!ValueKind::Group.is_positional());
        assert!(ValueKind::List.is_positional());
    }
}
