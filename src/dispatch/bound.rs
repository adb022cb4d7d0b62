use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;
use tracing::warn;

use crate::ActionKind;
use crate::BincodeConverterFactory;
use crate::ContractError;
use crate::ContractSpec;
use crate::ConverterFactory;
use crate::MemoryStoreEngine;
use crate::MethodDescriptor;
use crate::Outcome;
use crate::Preference;
use crate::Result;
use crate::StoreEngine;
use crate::TypeSpec;
use crate::Value;

/// Identity of one declared method inside a bound contract.
///
/// Dispatch is keyed by identity rather than name so lookups stay stable
/// even when contracts are interpreted through renaming layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId(usize);

/// Call-time arguments for a dynamic invocation
#[derive(Debug, Default)]
pub struct CallArgs {
    values: Vec<Value>,
}

impl CallArgs {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn one(value: impl Into<Value>) -> Self {
        Self {
            values: vec![value.into()],
        }
    }

    pub fn of(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Builds live implementations of declared contracts.
///
/// The binder owns the converter registry and an engine provider mapping a
/// namespace to a backing engine; each bound contract gets its own
/// accessor over the namespace the contract resolves to.
pub struct ContractBinder {
    factory: Arc<dyn ConverterFactory>,
    engine_provider: Box<dyn Fn(&str) -> Result<Arc<dyn StoreEngine>> + Send + Sync>,
}

impl Default for ContractBinder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContractBinder {
    /// Binder with in-memory engines and an empty binary converter
    /// registry
    pub fn new() -> Self {
        Self {
            factory: Arc::new(BincodeConverterFactory::new()),
            engine_provider: Box::new(|_| Ok(Arc::new(MemoryStoreEngine::new()))),
        }
    }

    /// Replace the converter registry
    pub fn converter_factory(
        mut self,
        factory: Arc<dyn ConverterFactory>,
    ) -> Self {
        self.factory = factory;
        self
    }

    /// Replace the namespace-to-engine mapping, e.g. to open one sled
    /// tree per contract
    pub fn engine_provider(
        mut self,
        provider: impl Fn(&str) -> Result<Arc<dyn StoreEngine>> + Send + Sync + 'static,
    ) -> Self {
        self.engine_provider = Box::new(provider);
        self
    }

    /// Validate `contract` and bind it to a live accessor.
    ///
    /// Validation is eager: duplicate names, illegal signatures and
    /// conflicting key metadata all fail here, before any call is made.
    ///
    /// # Errors
    /// [`ContractError`] describing the offending contract and method.
    pub fn bind(
        &self,
        contract: ContractSpec,
    ) -> Result<BoundContract> {
        let namespace = contract.resolved_namespace().to_string();
        let engine = (self.engine_provider)(&namespace)?;
        let preference = Preference::builder(namespace)
            .engine(engine)
            .converter_factory(self.factory.clone())
            .build();
        BoundContract::bind(contract, preference)
    }
}

/// A live, validated implementation of one declared contract.
///
/// Thread-safe: descriptors live in a concurrent table and the accessor
/// may be invoked from arbitrary call threads.
pub struct BoundContract {
    contract: Arc<ContractSpec>,
    preference: Preference,
    descriptors: DashMap<MethodId, Arc<MethodDescriptor>>,
    ids_by_name: HashMap<String, MethodId>,
}

impl BoundContract {
    /// Bind a contract to an existing accessor.
    pub fn bind(
        contract: ContractSpec,
        preference: Preference,
    ) -> Result<Self> {
        let descriptors = DashMap::new();
        let mut ids_by_name = HashMap::new();
        let mut value_types_by_key: HashMap<String, TypeSpec> = HashMap::new();

        for (index, method) in contract.methods().iter().enumerate() {
            if method.name().trim().is_empty() {
                return Err(ContractError::InvalidContract {
                    contract: contract.name().to_string(),
                    reason: "method with empty name".to_string(),
                }
                .into());
            }
            if ids_by_name
                .insert(method.name().to_string(), MethodId(index))
                .is_some()
            {
                return Err(ContractError::InvalidContract {
                    contract: contract.name().to_string(),
                    reason: format!("duplicate method `{}`", method.name()),
                }
                .into());
            }

            let descriptor = MethodDescriptor::build(contract.name(), method)?;

            if descriptor.action == ActionKind::Clear && method.key_override().is_some() {
                warn!(
                    "{}.{}: key override on a clear method is ignored",
                    contract.name(),
                    method.name()
                );
            }

            // One key, one payload type: a getter/setter pair disagreeing
            // on what lives under a key is a contract bug, caught here.
            if matches!(descriptor.action, ActionKind::Get | ActionKind::Put) {
                let canonical = canonical_value_type(&descriptor.value_type);
                match value_types_by_key.get(&descriptor.key) {
                    Some(existing) if *existing != canonical => {
                        return Err(ContractError::InvalidContract {
                            contract: contract.name().to_string(),
                            reason: format!(
                                "key `{}` declared with conflicting value types {} vs {}",
                                descriptor.key,
                                existing.describe(),
                                canonical.describe()
                            ),
                        }
                        .into());
                    }
                    Some(_) => {}
                    None => {
                        value_types_by_key.insert(descriptor.key.clone(), canonical);
                    }
                }
            }

            descriptors.insert(MethodId(index), Arc::new(descriptor));
        }

        debug!(
            "bound contract `{}` with {} method(s)",
            contract.name(),
            contract.methods().len()
        );

        Ok(Self {
            contract: Arc::new(contract),
            preference,
            descriptors,
            ids_by_name,
        })
    }

    /// Resolve a declared method's identity by name.
    ///
    /// # Errors
    /// [`ContractError::UnknownMethod`] — undeclared names are rejected
    /// rather than misrouted into the key-value dispatch path.
    pub fn method_id(
        &self,
        name: &str,
    ) -> Result<MethodId> {
        self.ids_by_name.get(name).copied().ok_or_else(|| {
            ContractError::UnknownMethod {
                contract: self.contract.name().to_string(),
                method: name.to_string(),
            }
            .into()
        })
    }

    /// Invoke one declared method.
    ///
    /// Resolves the cached descriptor, validates the call-time argument
    /// count against the declared signature, then forwards to the
    /// accessor per the method's action kind.
    pub fn invoke(
        &self,
        id: MethodId,
        args: CallArgs,
    ) -> Result<Outcome> {
        let method = self.contract.methods().get(id.0).ok_or_else(|| {
            ContractError::UnknownMethod {
                contract: self.contract.name().to_string(),
                method: format!("#{}", id.0),
            }
        })?;

        let min = method.required_params();
        let max = method.params().len();
        let received = args.len();
        if received < min || received > max {
            return Err(ContractError::ArityMismatch {
                contract: self.contract.name().to_string(),
                method: method.name().to_string(),
                expected: if min == max {
                    min.to_string()
                } else {
                    format!("{min}..={max}")
                },
                received,
            }
            .into());
        }

        // Descriptors were computed at bind time; this is a plain lookup.
        let descriptor = self
            .descriptors
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ContractError::UnknownMethod {
                contract: self.contract.name().to_string(),
                method: method.name().to_string(),
            })?;

        self.preference.execute(&descriptor, args.values)
    }

    /// Name-based convenience wrapper around [`BoundContract::invoke`]
    pub fn invoke_by_name(
        &self,
        name: &str,
        args: CallArgs,
    ) -> Result<Outcome> {
        let id = self.method_id(name)?;
        self.invoke(id, args)
    }

    pub fn contract(&self) -> &ContractSpec {
        &self.contract
    }

    pub fn namespace(&self) -> &str {
        self.preference.namespace()
    }

    /// The underlying accessor, for typed access alongside dispatch
    pub fn preference(&self) -> &Preference {
        &self.preference
    }
}

impl std::fmt::Debug for BoundContract {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("BoundContract")
            .field("contract", &self.contract.name())
            .field("namespace", &self.preference.namespace())
            .field("methods", &self.contract.methods().len())
            .finish()
    }
}

/// Stream wrappers compare equal to their payload for conflict detection
fn canonical_value_type(spec: &TypeSpec) -> TypeSpec {
    match spec {
        TypeSpec::Stream(inner) => inner.as_ref().clone(),
        other => other.clone(),
    }
}
