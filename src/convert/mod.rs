//! Pluggable value conversion.
//!
//! Domain objects cross the store boundary as opaque strings. A
//! [`Converter`] is a bidirectional codec for one payload type; a
//! [`ConverterFactory`] resolves one per requested [`PayloadType`] at call
//! time. Unknown types fail with an unsupported-type error only when a call
//! actually needs them, never at registration time.
//!
//! Two factories ship with the crate:
//! - [`BincodeConverterFactory`] (default): registered serde types encoded
//!   with bincode and base64-armored into a string, plus a text-marshalled
//!   category for `Display`/`FromStr` types.
//! - [`JsonConverterFactory`]: registered serde types encoded as JSON.

mod bincode_factory;
mod converter;
mod json_factory;

pub use bincode_factory::*;
pub use converter::*;
pub use json_factory::*;
