use std::any::Any;
use std::sync::Arc;

use tracing::debug;
use tracing::warn;

use super::KeyWatch;
use super::Outcome;
use super::Scalar;
use super::Value;
use crate::ActionKind;
use crate::BincodeConverterFactory;
use crate::ConvertError;
use crate::ConverterFactory;
use crate::Error;
use crate::KeyChangeBus;
use crate::MemoryStoreEngine;
use crate::MethodDescriptor;
use crate::PayloadType;
use crate::RawType;
use crate::Result;
use crate::ScalarKind;
use crate::StoreEngine;
use crate::TypeSpec;

struct PreferenceInner {
    namespace: String,
    engine: Arc<dyn StoreEngine>,
    factory: Arc<dyn ConverterFactory>,
    bus: KeyChangeBus,
}

/// Typed accessor over one namespace of the backing store.
///
/// Cheap to clone; clones share the engine, converter registry and change
/// bus. Multiple accessors over the same namespace stay consistent because
/// they all delegate to the same underlying store.
///
/// ```
/// use pref_engine::Preference;
///
/// let prefs = Preference::builder("UserStore").build();
/// prefs.put_scalar("user", "alice".to_string()).unwrap();
/// let user: String = prefs.get_scalar("user", "nobody".to_string()).unwrap();
/// assert_eq!(user, "alice");
/// ```
#[derive(Clone)]
pub struct Preference {
    inner: Arc<PreferenceInner>,
}

impl Preference {
    pub fn builder(namespace: impl Into<String>) -> PreferenceBuilder {
        PreferenceBuilder {
            namespace: namespace.into(),
            engine: None,
            factory: None,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.inner.namespace
    }

    pub(crate) fn bus(&self) -> &KeyChangeBus {
        &self.inner.bus
    }

    // ---------------- scalar fast path ----------------

    /// Read a native scalar, falling back to `default` when the key is
    /// absent or its stored form does not parse.
    pub fn get_scalar<S: Scalar>(
        &self,
        key: &str,
        default: S,
    ) -> Result<S> {
        match self.inner.engine.get(key)? {
            Some(raw) => Ok(S::from_stored(&raw).unwrap_or_else(|| {
                warn!("stored value for `{key}` is not a valid {:?}", S::KIND);
                default
            })),
            None => Ok(default),
        }
    }

    /// Write a native scalar without touching the converter registry
    pub fn put_scalar<S: Scalar>(
        &self,
        key: &str,
        value: S,
    ) -> Result<()> {
        self.inner.engine.put(key, &value.to_stored())
    }

    // ---------------- converter-backed objects ----------------

    /// Persist a domain object through the converter registry.
    ///
    /// A converter returning `None` or a blank string is a documented
    /// no-op: nothing is written and no error is raised.
    pub fn put_object<T: Any + Send + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<()> {
        let payload = PayloadType::of::<T>();
        let converter = self.inner.factory.converter_from(&payload)?;
        match converter.encode(value)? {
            Some(encoded) if !encoded.trim().is_empty() => self.inner.engine.put(key, &encoded),
            _ => {
                debug!("converter produced no value for `{key}`, dropping put");
                Ok(())
            }
        }
    }

    /// Read a domain object, short-circuiting to `default` when no stored
    /// string exists — the converter is never invoked for a missing value.
    pub fn get_object<T: Any + Send + Sync>(
        &self,
        key: &str,
        default: T,
    ) -> Result<T> {
        match self.stored_string(key)? {
            Some(raw) => self.decode_object::<T>(&raw),
            None => Ok(default),
        }
    }

    /// Read a domain object without a default; absent keys yield `None`
    pub fn try_get_object<T: Any + Send + Sync>(
        &self,
        key: &str,
    ) -> Result<Option<T>> {
        match self.stored_string(key)? {
            Some(raw) => Ok(Some(self.decode_object::<T>(&raw)?)),
            None => Ok(None),
        }
    }

    // ---------------- watch-style reads ----------------

    /// Replay-first live stream of a scalar key.
    ///
    /// Emits the current value (or `default`) immediately on first poll,
    /// then re-reads on every matching change within the same
    /// subscription.
    pub fn watch_scalar<S: Scalar>(
        &self,
        key: &str,
        default: S,
    ) -> KeyWatch<S> {
        let subscription = self.inner.bus.subscribe();
        let accessor = self.clone();
        let owned_key = key.to_string();
        let read = Box::new(move || accessor.get_scalar(&owned_key, default.clone()));
        KeyWatch::new(key.to_string(), subscription, read)
    }

    /// Replay-first live stream of a converter-backed key
    pub fn watch_object<T: Any + Send + Sync + Clone>(
        &self,
        key: &str,
        default: T,
    ) -> KeyWatch<T> {
        let subscription = self.inner.bus.subscribe();
        let accessor = self.clone();
        let owned_key = key.to_string();
        let read = Box::new(move || accessor.get_object(&owned_key, default.clone()));
        KeyWatch::new(key.to_string(), subscription, read)
    }

    // ---------------- removal ----------------

    pub fn remove(
        &self,
        key: &str,
    ) -> Result<()> {
        self.inner.engine.remove(key)
    }

    /// Clear the whole namespace.
    ///
    /// Snapshots the key set first, clears, then publishes one synthetic
    /// change event per previously-present key so per-key watchers observe
    /// the clear as a value-removed transition. An empty namespace emits
    /// nothing, so clearing twice is a silent no-op.
    pub fn clear(&self) -> Result<()> {
        let keys = self.inner.engine.all_keys()?;
        self.inner.engine.clear()?;
        for key in &keys {
            self.inner.bus.publish(key);
        }
        Ok(())
    }

    // ---------------- dynamic dispatch path ----------------

    /// Execute one classified operation with dynamically typed arguments.
    ///
    /// This is the dispatch target for bound contracts; typed callers
    /// normally use the scalar/object methods directly.
    pub fn execute(
        &self,
        descriptor: &MethodDescriptor,
        mut args: Vec<Value>,
    ) -> Result<Outcome> {
        match descriptor.action {
            ActionKind::Get => {
                let default = if args.is_empty() {
                    None
                } else {
                    Some(args.remove(0))
                };
                self.execute_get(descriptor, default)
            }
            ActionKind::Put => {
                if args.is_empty() {
                    return Err(Error::InvalidArgument(format!(
                        "put on `{}` requires a value argument",
                        descriptor.key
                    )));
                }
                // Arguments map onto declared parameters positionally; when
                // the optional default slot is omitted at call time only the
                // value remains, so the declared position is clamped.
                let index = descriptor.value_index.min(args.len() - 1);
                let value = args.remove(index);
                self.put_value(&descriptor.key, value)?;
                Ok(Outcome::Done)
            }
            ActionKind::Remove => {
                self.remove(&descriptor.key)?;
                Ok(Outcome::Done)
            }
            ActionKind::Clear => {
                self.clear()?;
                Ok(Outcome::Done)
            }
        }
    }

    fn execute_get(
        &self,
        descriptor: &MethodDescriptor,
        default: Option<Value>,
    ) -> Result<Outcome> {
        match descriptor.value_type.raw_type() {
            RawType::Scalar(kind) => {
                let default = scalar_default(kind, default)?;
                let value = self.read_scalar_value(&descriptor.key, kind, &default)?;
                Ok(Outcome::Value(value))
            }
            RawType::Object => {
                let payload = descriptor.value_type.converter_target()?;
                let default = default
                    .map(|value| object_default(&payload, value))
                    .transpose()?;
                let value = self.read_object_value(&descriptor.key, payload, default.as_ref())?;
                Ok(Outcome::Value(value))
            }
            RawType::Stream => {
                // The stream must seed immediately, so a default is mandatory
                let default = default.ok_or_else(|| {
                    Error::InvalidArgument(format!(
                        "watch on `{}` requires a non-null default value",
                        descriptor.key
                    ))
                })?;
                let inner = descriptor.value_type.stream_payload()?.clone();
                let stream = self.watch_value(&descriptor.key, &inner, default)?;
                Ok(Outcome::Watch(stream))
            }
            RawType::Unit => Err(Error::InvalidArgument(format!(
                "get on `{}` declares no result type",
                descriptor.key
            ))),
        }
    }

    fn put_value(
        &self,
        key: &str,
        value: Value,
    ) -> Result<()> {
        match value {
            Value::Int(v) => self.put_scalar(key, v),
            Value::Float(v) => self.put_scalar(key, v),
            Value::Bool(v) => self.put_scalar(key, v),
            Value::Text(v) => self.put_scalar(key, v),
            Value::Object(payload, boxed) => {
                let converter = self.inner.factory.converter_from(&payload)?;
                match converter.encode(boxed.as_ref())? {
                    Some(encoded) if !encoded.trim().is_empty() => {
                        self.inner.engine.put(key, &encoded)
                    }
                    _ => {
                        debug!("converter produced no value for `{key}`, dropping put");
                        Ok(())
                    }
                }
            }
        }
    }

    fn read_scalar_value(
        &self,
        key: &str,
        kind: ScalarKind,
        default: &Value,
    ) -> Result<Value> {
        let raw = self.inner.engine.get(key)?;
        let Some(raw) = raw else {
            return Ok(default.clone());
        };
        let parsed = match kind {
            ScalarKind::Int => i64::from_stored(&raw).map(Value::Int),
            ScalarKind::Float => f64::from_stored(&raw).map(Value::Float),
            ScalarKind::Bool => bool::from_stored(&raw).map(Value::Bool),
            ScalarKind::Text => Some(Value::Text(raw.clone())),
        };
        Ok(parsed.unwrap_or_else(|| {
            warn!("stored value for `{key}` is not a valid {}", kind.name());
            default.clone()
        }))
    }

    fn read_object_value(
        &self,
        key: &str,
        payload: PayloadType,
        default: Option<&Value>,
    ) -> Result<Value> {
        match self.stored_string(key)? {
            Some(raw) => {
                let converter = self.inner.factory.converter_to(&payload)?;
                let decoded = converter.decode(&raw)?;
                Ok(Value::from_shared(payload, Arc::from(decoded)))
            }
            None => match default {
                Some(value) => Ok(value.clone()),
                None => Err(Error::InvalidArgument(format!(
                    "no stored value for `{key}` and no default supplied"
                ))),
            },
        }
    }

    fn watch_value(
        &self,
        key: &str,
        inner: &TypeSpec,
        default: Value,
    ) -> Result<super::ValueStream> {
        let subscription = self.inner.bus.subscribe();
        let accessor = self.clone();
        let owned_key = key.to_string();

        let read: Box<dyn Fn() -> Result<Value> + Send + Sync> = match inner.raw_type() {
            RawType::Scalar(kind) => {
                let default = scalar_default(kind, Some(default))?;
                Box::new(move || accessor.read_scalar_value(&owned_key, kind, &default))
            }
            RawType::Object => {
                let payload = inner.converter_target()?;
                let default = object_default(&payload, default)?;
                Box::new(move || {
                    accessor.read_object_value(&owned_key, payload, Some(&default))
                })
            }
            RawType::Unit | RawType::Stream => {
                return Err(ConvertError::UnsupportedType {
                    type_name: inner.describe(),
                }
                .into());
            }
        };

        Ok(Box::pin(KeyWatch::new(key.to_string(), subscription, read)))
    }

    /// Raw stored string; empty strings count as missing, matching the
    /// default-shortcircuit policy for object reads
    fn stored_string(
        &self,
        key: &str,
    ) -> Result<Option<String>> {
        Ok(self.inner.engine.get(key)?.filter(|raw| !raw.is_empty()))
    }

    fn decode_object<T: Any + Send + Sync>(
        &self,
        raw: &str,
    ) -> Result<T> {
        let payload = PayloadType::of::<T>();
        let converter = self.inner.factory.converter_to(&payload)?;
        let decoded = converter.decode(raw)?;
        decoded.downcast::<T>().map(|boxed| *boxed).map_err(|_| {
            ConvertError::PayloadMismatch {
                expected: payload.name.to_string(),
            }
            .into()
        })
    }
}

impl std::fmt::Debug for Preference {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Preference")
            .field("namespace", &self.inner.namespace)
            .finish()
    }
}

/// Validate the default's type against the declared scalar kind, or fill
/// in the store's native default when none was supplied.
fn scalar_default(
    kind: ScalarKind,
    default: Option<Value>,
) -> Result<Value> {
    match default {
        None => Ok(match kind {
            ScalarKind::Int => Value::Int(0),
            ScalarKind::Float => Value::Float(0.0),
            ScalarKind::Bool => Value::Bool(false),
            ScalarKind::Text => Value::Text(String::new()),
        }),
        Some(value) if value.scalar_kind() == Some(kind) => Ok(value),
        Some(value) => Err(Error::InvalidArgument(format!(
            "default value {value:?} does not match declared type {}",
            kind.name()
        ))),
    }
}

/// Validate an object default against the declared payload type, so a
/// missing-value read never re-emits a default of the wrong variant.
fn object_default(
    payload: &PayloadType,
    default: Value,
) -> Result<Value> {
    match default {
        Value::Object(actual, inner) if actual == *payload => Ok(Value::Object(actual, inner)),
        other => Err(Error::InvalidArgument(format!(
            "default value {other:?} does not match declared type {}",
            payload.name
        ))),
    }
}

/// Configurable construction of a [`Preference`]
pub struct PreferenceBuilder {
    namespace: String,
    engine: Option<Arc<dyn StoreEngine>>,
    factory: Option<Arc<dyn ConverterFactory>>,
}

impl PreferenceBuilder {
    /// Use a specific backing engine (default: a fresh in-memory engine)
    pub fn engine(
        mut self,
        engine: Arc<dyn StoreEngine>,
    ) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Use a specific converter registry (default: an empty binary
    /// registry — object calls fail with an unsupported-type error until
    /// types are registered)
    pub fn converter_factory(
        mut self,
        factory: Arc<dyn ConverterFactory>,
    ) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn build(self) -> Preference {
        let engine = self
            .engine
            .unwrap_or_else(|| Arc::new(MemoryStoreEngine::new()));
        let factory = self
            .factory
            .unwrap_or_else(|| Arc::new(BincodeConverterFactory::new()));
        let bus = KeyChangeBus::new(engine.clone());
        Preference {
            inner: Arc::new(PreferenceInner {
                namespace: self.namespace,
                engine,
                factory,
                bus,
            }),
        }
    }
}
