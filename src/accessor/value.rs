use std::any::Any;
use std::pin::Pin;
use std::sync::Arc;

use futures::Stream;

use crate::PayloadType;
use crate::Result;
use crate::ScalarKind;

/// A dynamically typed value crossing the dispatch boundary.
///
/// Scalar arms take the store's native fast path; `Object` payloads are
/// marshalled through the converter registry. Objects are shared behind an
/// `Arc` so watch streams can re-emit a default without cloning the
/// underlying domain value.
#[derive(Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Object(PayloadType, Arc<dyn Any + Send + Sync>),
}

impl Value {
    pub fn object<T: Any + Send + Sync>(value: T) -> Self {
        Value::Object(PayloadType::of::<T>(), Arc::new(value))
    }

    pub(crate) fn from_shared(
        payload: PayloadType,
        value: Arc<dyn Any + Send + Sync>,
    ) -> Self {
        Value::Object(payload, value)
    }

    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Value::Int(_) => Some(ScalarKind::Int),
            Value::Float(_) => Some(ScalarKind::Float),
            Value::Bool(_) => Some(ScalarKind::Bool),
            Value::Text(_) => Some(ScalarKind::Text),
            Value::Object(..) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Shared handle to an object payload, downcast to `T`
    pub fn as_object<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            Value::Object(_, value) => Arc::clone(value).downcast::<T>().ok(),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Value {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Value::Int(v) => write!(f, "Int({v})"),
            Value::Float(v) => write!(f, "Float({v})"),
            Value::Bool(v) => write!(f, "Bool({v})"),
            Value::Text(v) => write!(f, "Text({v:?})"),
            Value::Object(payload, _) => write!(f, "Object({})", payload.name),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

/// Live stream of dynamically typed emissions for a watch-style read
pub type ValueStream = Pin<Box<dyn Stream<Item = Result<Value>> + Send>>;

/// Result of executing one classified operation
pub enum Outcome {
    /// Immediate result of a scalar or object read
    Value(Value),
    /// The operation completed without producing a value
    Done,
    /// A replay-first live stream for a watch-style read
    Watch(ValueStream),
}

impl std::fmt::Debug for Outcome {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Outcome::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Outcome::Done => write!(f, "Done"),
            Outcome::Watch(_) => write!(f, "Watch(..)"),
        }
    }
}

/// A store-native scalar: integer, float, boolean or string.
///
/// Scalars bypass the converter registry entirely; their stored form is
/// their canonical text representation.
pub trait Scalar: Clone + Send + Sync + 'static {
    const KIND: ScalarKind;

    fn to_stored(&self) -> String;

    /// Parse the stored form; `None` falls back to the caller's default
    fn from_stored(raw: &str) -> Option<Self>;

    fn into_value(self) -> Value;

    fn from_value(value: &Value) -> Option<Self>;
}

impl Scalar for i64 {
    const KIND: ScalarKind = ScalarKind::Int;

    fn to_stored(&self) -> String {
        self.to_string()
    }

    fn from_stored(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_int()
    }
}

impl Scalar for f64 {
    const KIND: ScalarKind = ScalarKind::Float;

    fn to_stored(&self) -> String {
        self.to_string()
    }

    fn from_stored(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_float()
    }
}

impl Scalar for bool {
    const KIND: ScalarKind = ScalarKind::Bool;

    fn to_stored(&self) -> String {
        self.to_string()
    }

    fn from_stored(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl Scalar for String {
    const KIND: ScalarKind = ScalarKind::Text;

    fn to_stored(&self) -> String {
        self.clone()
    }

    fn from_stored(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }

    fn into_value(self) -> Value {
        Value::Text(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_text().map(str::to_string)
    }
}
