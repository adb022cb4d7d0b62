use std::any::Any;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Converter;
use super::ConverterFactory;
use crate::ConvertError;
use crate::PayloadType;
use crate::Result;

/// Default converter registry.
///
/// Recognizes two capability categories: structurally serializable payloads
/// (serde, persisted as base64-armored bincode) and text-marshalled
/// payloads (`Display`/`FromStr` round-trip). Each supported type is
/// registered explicitly; any other type fails lazily at encode/decode
/// lookup with an unsupported-type error.
#[derive(Default)]
pub struct BincodeConverterFactory {
    converters: HashMap<TypeId, Arc<dyn Converter>>,
}

impl BincodeConverterFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a structurally serializable payload type
    pub fn with_structural<T>(mut self) -> Self
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.converters
            .insert(TypeId::of::<T>(), Arc::new(StructuralConverter::<T>::new()));
        self
    }

    /// Register a text-marshalled payload type
    pub fn with_text<T>(mut self) -> Self
    where
        T: Display + FromStr + Send + Sync + 'static,
        <T as FromStr>::Err: Display,
    {
        self.converters
            .insert(TypeId::of::<T>(), Arc::new(TextConverter::<T>::new()));
        self
    }

    /// Register a hand-rolled converter for one payload type
    pub fn with_converter(
        mut self,
        payload: PayloadType,
        converter: Arc<dyn Converter>,
    ) -> Self {
        self.converters.insert(payload.id, converter);
        self
    }

    fn lookup(
        &self,
        payload: &PayloadType,
    ) -> Result<Arc<dyn Converter>> {
        self.converters.get(&payload.id).cloned().ok_or_else(|| {
            ConvertError::UnsupportedType {
                type_name: payload.name.to_string(),
            }
            .into()
        })
    }
}

impl ConverterFactory for BincodeConverterFactory {
    fn converter_from(
        &self,
        payload: &PayloadType,
    ) -> Result<Arc<dyn Converter>> {
        self.lookup(payload)
    }

    fn converter_to(
        &self,
        payload: &PayloadType,
    ) -> Result<Arc<dyn Converter>> {
        self.lookup(payload)
    }
}

/// serde payloads persisted as base64-armored bincode
struct StructuralConverter<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> StructuralConverter<T> {
    fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Converter for StructuralConverter<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn encode(
        &self,
        value: &dyn Any,
    ) -> Result<Option<String>> {
        let value = downcast::<T>(value)?;
        let bytes = bincode::serialize(value).map_err(ConvertError::Bincode)?;
        Ok(Some(STANDARD.encode(bytes)))
    }

    fn decode(
        &self,
        raw: &str,
    ) -> Result<Box<dyn Any + Send + Sync>> {
        let bytes = STANDARD.decode(raw).map_err(ConvertError::Base64)?;
        let value: T = bincode::deserialize(&bytes).map_err(ConvertError::Bincode)?;
        Ok(Box::new(value))
    }
}

/// `Display`/`FromStr` payloads persisted as their text form
struct TextConverter<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> TextConverter<T> {
    fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Converter for TextConverter<T>
where
    T: Display + FromStr + Send + Sync + 'static,
    <T as FromStr>::Err: Display,
{
    fn encode(
        &self,
        value: &dyn Any,
    ) -> Result<Option<String>> {
        let value = downcast::<T>(value)?;
        Ok(Some(value.to_string()))
    }

    fn decode(
        &self,
        raw: &str,
    ) -> Result<Box<dyn Any + Send + Sync>> {
        let value = T::from_str(raw).map_err(|e| ConvertError::TextDecode {
            type_name: std::any::type_name::<T>().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Box::new(value))
    }
}

pub(super) fn downcast<T: Any>(value: &dyn Any) -> Result<&T> {
    value.downcast_ref::<T>().ok_or_else(|| {
        ConvertError::PayloadMismatch {
            expected: std::any::type_name::<T>().to_string(),
        }
        .into()
    })
}
