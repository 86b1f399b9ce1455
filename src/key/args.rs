//! Call arguments and the argument value model.

use crate::{Error, ErrorContext, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Reserved keyword argument that requests bypass-and-invalidate for one call.
pub const BYPASS_KEYWORD: &str = "no_cache";

/// An argument value with a defined canonical encoding.
///
/// Maps are key-sorted (`BTreeMap`), so two maps with the same entries are
/// equal and encode identically regardless of insertion order.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<ArgValue>),
    Map(BTreeMap<String, ArgValue>),
}

impl ArgValue {
    /// Convert any serde-serializable value through its JSON data model.
    ///
    /// Non-finite floats become `Null`, as `serde_json` renders them.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let json = serde_json::to_value(value).map_err(|e| {
            Error::serialization_with_context(
                e.to_string(),
                ErrorContext::new().with_source("call_args"),
            )
        })?;
        Ok(Self::from(json))
    }

    pub fn bytes(v: impl Into<Vec<u8>>) -> Self {
        ArgValue::Bytes(v.into())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ArgValue::Int(i) => Some(*i),
            ArgValue::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArgValue::Float(f) => Some(*f),
            ArgValue::Int(i) => Some(*i as f64),
            ArgValue::UInt(u) => Some(*u as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for ArgValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => ArgValue::Null,
            Value::Bool(b) => ArgValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    ArgValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    ArgValue::UInt(u)
                } else {
                    n.as_f64().map(ArgValue::Float).unwrap_or(ArgValue::Null)
                }
            }
            Value::String(s) => ArgValue::Str(s),
            Value::Array(items) => ArgValue::List(items.into_iter().map(ArgValue::from).collect()),
            Value::Object(map) => {
                ArgValue::Map(map.into_iter().map(|(k, v)| (k, ArgValue::from(v))).collect())
            }
        }
    }
}

// Every integer type that fits in i64 without loss.
macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for ArgValue {
            fn from(v: $t) -> Self {
                ArgValue::Int(i64::from(v))
            }
        })*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for ArgValue {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(i) => ArgValue::Int(i),
            Err(_) => ArgValue::UInt(v),
        }
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        ArgValue::Bool(v)
    }
}

impl From<f32> for ArgValue {
    fn from(v: f32) -> Self {
        ArgValue::Float(v as f64)
    }
}

impl From<f64> for ArgValue {
    fn from(v: f64) -> Self {
        ArgValue::Float(v)
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::Str(v.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        ArgValue::Str(v)
    }
}

impl<T: Into<ArgValue>> From<Option<T>> for ArgValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(ArgValue::Null)
    }
}

impl<T: Into<ArgValue>> From<Vec<T>> for ArgValue {
    fn from(v: Vec<T>) -> Self {
        ArgValue::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ArgValue>> From<BTreeMap<String, T>> for ArgValue {
    fn from(v: BTreeMap<String, T>) -> Self {
        ArgValue::Map(v.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

/// Positional and keyword arguments of one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    positional: Vec<ArgValue>,
    keyword: BTreeMap<String, ArgValue>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<ArgValue>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a keyword argument, replacing any previous value for `name`.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    /// Append a positional argument of any serializable type.
    pub fn try_arg<T: Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        let value = ArgValue::from_serialize(value)?;
        Ok(self.arg(value))
    }

    /// Set a keyword argument of any serializable type.
    pub fn try_kwarg<T: Serialize + ?Sized>(self, name: impl Into<String>, value: &T) -> Result<Self> {
        let value = ArgValue::from_serialize(value)?;
        Ok(self.kwarg(name, value))
    }

    /// Request (or cancel) bypass-and-invalidate for this call.
    pub fn bypass(self, enabled: bool) -> Self {
        self.kwarg(BYPASS_KEYWORD, enabled)
    }

    pub fn is_bypass(&self) -> bool {
        matches!(self.keyword.get(BYPASS_KEYWORD), Some(ArgValue::Bool(true)))
    }

    pub fn positional(&self) -> &[ArgValue] {
        &self.positional
    }

    pub fn keyword(&self) -> &BTreeMap<String, ArgValue> {
        &self.keyword
    }

    pub fn get(&self, index: usize) -> Option<&ArgValue> {
        self.positional.get(index)
    }

    pub fn get_kwarg(&self, name: &str) -> Option<&ArgValue> {
        self.keyword.get(name)
    }
}
