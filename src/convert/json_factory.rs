use std::any::Any;
use std::any::TypeId;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::bincode_factory::downcast;
use super::Converter;
use super::ConverterFactory;
use crate::ConvertError;
use crate::PayloadType;
use crate::Result;

/// JSON-backed converter registry, a drop-in replacement for the binary
/// default when persisted values should stay human-readable.
#[derive(Default)]
pub struct JsonConverterFactory {
    converters: HashMap<TypeId, Arc<dyn Converter>>,
}

impl JsonConverterFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type<T>(mut self) -> Self
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.converters
            .insert(TypeId::of::<T>(), Arc::new(JsonConverter::<T>::new()));
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

impl ConverterFactory for JsonConverterFactory {
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

struct JsonConverter<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonConverter<T> {
    fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Converter for JsonConverter<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn encode(
        &self,
        value: &dyn Any,
    ) -> Result<Option<String>> {
        let value = downcast::<T>(value)?;
        let encoded = serde_json::to_string(value).map_err(ConvertError::Json)?;
        Ok(Some(encoded))
    }

    fn decode(
        &self,
        raw: &str,
    ) -> Result<Box<dyn Any + Send + Sync>> {
        let value: T = serde_json::from_str(raw).map_err(ConvertError::Json)?;
        Ok(Box::new(value))
    }
}
