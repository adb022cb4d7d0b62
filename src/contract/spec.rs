use crate::TypeSpec;

/// Explicit action marker overriding signature-based classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Remove,
    Clear,
}

/// One declared parameter slot.
///
/// `default_slot` marks the single slot reserved for a default value: it is
/// excluded from arity accounting and its call-time value seeds reads.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub ty: TypeSpec,
    pub default_slot: bool,
}

/// A single accessor method declaration: name, signature and metadata.
///
/// ```
/// use pref_engine::{MethodSpec, ScalarKind, TypeSpec};
///
/// let put = MethodSpec::new("set_name").param(TypeSpec::Scalar(ScalarKind::Text));
/// let get = MethodSpec::new("get_name")
///     .returns(TypeSpec::Scalar(ScalarKind::Text))
///     .default_param(TypeSpec::Scalar(ScalarKind::Text));
/// ```
#[derive(Debug, Clone)]
pub struct MethodSpec {
    name: String,
    params: Vec<ParamSpec>,
    return_type: TypeSpec,
    marker: Option<Marker>,
    key_override: Option<String>,
}

impl MethodSpec {
    /// New declaration with unit return type and no parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            return_type: TypeSpec::Unit,
            marker: None,
            key_override: None,
        }
    }

    /// Declare the return type (unit by default)
    pub fn returns(
        mut self,
        ty: TypeSpec,
    ) -> Self {
        self.return_type = ty;
        self
    }

    /// Declare a value parameter
    pub fn param(
        mut self,
        ty: TypeSpec,
    ) -> Self {
        self.params.push(ParamSpec {
            ty,
            default_slot: false,
        });
        self
    }

    /// Declare the default-value slot
    pub fn default_param(
        mut self,
        ty: TypeSpec,
    ) -> Self {
        self.params.push(ParamSpec {
            ty,
            default_slot: true,
        });
        self
    }

    /// Explicit store key, overriding name-based derivation
    pub fn key(
        mut self,
        key: impl Into<String>,
    ) -> Self {
        self.key_override = Some(key.into());
        self
    }

    /// Mark as a remove operation regardless of signature shape
    pub fn remove_marker(mut self) -> Self {
        self.marker = Some(Marker::Remove);
        self
    }

    /// Mark as a whole-namespace clear operation
    pub fn clear_marker(mut self) -> Self {
        self.marker = Some(Marker::Clear);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub fn return_type(&self) -> &TypeSpec {
        &self.return_type
    }

    pub fn marker(&self) -> Option<Marker> {
        self.marker
    }

    pub fn key_override(&self) -> Option<&str> {
        self.key_override.as_deref()
    }

    /// Number of declared parameters excluding the default-value slot
    pub fn required_params(&self) -> usize {
        self.params.iter().filter(|p| !p.default_slot).count()
    }
}

/// The full set of method signatures a client declares. Immutable once
/// defined; the engine only interprets it.
#[derive(Debug, Clone)]
pub struct ContractSpec {
    name: String,
    namespace: Option<String>,
    methods: Vec<MethodSpec>,
}

impl ContractSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            methods: Vec::new(),
        }
    }

    /// Override the store namespace (defaults to the contract name)
    pub fn namespace(
        mut self,
        namespace: impl Into<String>,
    ) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn method(
        mut self,
        method: MethodSpec,
    ) -> Self {
        self.methods.push(method);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn methods(&self) -> &[MethodSpec] {
        &self.methods
    }

    /// Namespace holding all of this contract's keys, fixed at bind time
    pub fn resolved_namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or(&self.name)
    }
}
