use std::any::Any;
use std::sync::Arc;

use crate::PayloadType;
use crate::Result;

/// Bidirectional codec between a typed value and its string-encoded
/// persisted form.
///
/// `encode` may return `None` to signal "no value": the accessor treats a
/// `None` or blank result as a documented no-op and writes nothing. This is
/// intentional policy, not an error path.
pub trait Converter: Send + Sync {
    fn encode(
        &self,
        value: &dyn Any,
    ) -> Result<Option<String>>;

    fn decode(
        &self,
        raw: &str,
    ) -> Result<Box<dyn Any + Send + Sync>>;
}

impl std::fmt::Debug for dyn Converter {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str("dyn Converter")
    }
}

/// Resolves converters per payload type. Swappable at accessor
/// construction so applications can replace the binary default with e.g. a
/// JSON-backed registry.
pub trait ConverterFactory: Send + Sync {
    /// Converter used when persisting a value of `payload`
    ///
    /// # Errors
    /// [`crate::ConvertError::UnsupportedType`] if the registry does not
    /// support `payload`.
    fn converter_from(
        &self,
        payload: &PayloadType,
    ) -> Result<Arc<dyn Converter>>;

    /// Converter used when reading a value back as `payload`
    ///
    /// # Errors
    /// [`crate::ConvertError::UnsupportedType`] if the registry does not
    /// support `payload`.
    fn converter_to(
        &self,
        payload: &PayloadType,
    ) -> Result<Arc<dyn Converter>>;
}
