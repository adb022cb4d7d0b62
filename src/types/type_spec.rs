use std::any::type_name;
use std::any::Any;
use std::any::TypeId;

use crate::ConvertError;
use crate::Result;

/// Identity of a converter-backed payload type.
///
/// Carries the runtime [`TypeId`] for registry lookups plus the type name
/// for actionable error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PayloadType {
    pub id: TypeId,
    pub name: &'static str,
}

impl PayloadType {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }
}

/// The store's native scalar categories. Values of these kinds take the
/// fast path and never touch the converter registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Int,
    Float,
    Bool,
    Text,
}

impl ScalarKind {
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::Int => "i64",
            ScalarKind::Float => "f64",
            ScalarKind::Bool => "bool",
            ScalarKind::Text => "String",
        }
    }
}

/// Declared semantic type of a method's payload.
///
/// `Stream` marks a watch-style result: the accessor returns a live
/// sequence whose emissions decode into the wrapped type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSpec {
    /// No payload (setters return unit; remove/clear have none)
    Unit,
    Scalar(ScalarKind),
    Object(PayloadType),
    Stream(Box<TypeSpec>),
}

/// Nominal (erasure) kind of a [`TypeSpec`], generic parameters stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawType {
    Unit,
    Scalar(ScalarKind),
    Object,
    Stream,
}

impl TypeSpec {
    /// Object payload spec for a domain type `T`
    pub fn object<T: Any>() -> Self {
        TypeSpec::Object(PayloadType::of::<T>())
    }

    /// Watch-style wrapper around `inner`
    pub fn stream_of(inner: TypeSpec) -> Self {
        TypeSpec::Stream(Box::new(inner))
    }

    /// Strips generic parameters to the nominal kind.
    pub fn raw_type(&self) -> RawType {
        match self {
            TypeSpec::Unit => RawType::Unit,
            TypeSpec::Scalar(kind) => RawType::Scalar(*kind),
            TypeSpec::Object(_) => RawType::Object,
            TypeSpec::Stream(_) => RawType::Stream,
        }
    }

    /// Returns the sole type argument of a stream wrapper.
    ///
    /// # Errors
    /// [`ConvertError::UnsupportedType`] if the type is not a recognized
    /// generic form carrying a type argument.
    pub fn stream_payload(&self) -> Result<&TypeSpec> {
        match self {
            TypeSpec::Stream(inner) => Ok(inner),
            other => Err(ConvertError::UnsupportedType {
                type_name: format!("{} is not a stream type", other.describe()),
            }
            .into()),
        }
    }

    /// Resolves the payload type a converter must receive: unwraps one
    /// stream wrapper, then requires a converter-backed object payload.
    ///
    /// # Errors
    /// [`ConvertError::UnsupportedType`] for unit, scalar and nested
    /// stream shapes, which have no converter payload.
    pub fn converter_target(&self) -> Result<PayloadType> {
        let resolved = match self {
            TypeSpec::Stream(inner) => inner.as_ref(),
            other => other,
        };
        match resolved {
            TypeSpec::Object(payload) => Ok(*payload),
            other => Err(ConvertError::UnsupportedType {
                type_name: other.describe(),
            }
            .into()),
        }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, TypeSpec::Unit)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, TypeSpec::Scalar(ScalarKind::Bool))
    }

    /// Human-readable form used in diagnostics
    pub fn describe(&self) -> String {
        match self {
            TypeSpec::Unit => "()".to_string(),
            TypeSpec::Scalar(kind) => kind.name().to_string(),
            TypeSpec::Object(payload) => payload.name.to_string(),
            TypeSpec::Stream(inner) => format!("Stream<{}>", inner.describe()),
        }
    }
}
