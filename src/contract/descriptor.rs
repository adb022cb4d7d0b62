use crate::ContractError;
use crate::Marker;
use crate::MethodSpec;
use crate::Result;
use crate::TypeSpec;

/// Classification of a method's intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Get,
    Put,
    Remove,
    Clear,
}

/// Derived, cached interpretation of one declared method.
///
/// A descriptor is a pure function of the declared signature plus metadata
/// and is built once per distinct method for the lifetime of the bound
/// contract. Call-time argument values never influence it.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDescriptor {
    pub action: ActionKind,
    pub key: String,
    /// Resolved semantic type of the read/write payload
    pub value_type: TypeSpec,
    /// Position of the value slot among the declared parameters. Setters
    /// may declare the default slot on either side of the value, so the
    /// written argument is selected by declared position, never by
    /// call-time order alone.
    pub value_index: usize,
}

impl MethodDescriptor {
    /// Classify one declared method.
    ///
    /// Order-sensitive: an explicit remove/clear marker wins, then the
    /// signature decides between getter and setter.
    ///
    /// # Errors
    /// [`ContractError::InvalidMethod`] for excess parameters, a
    /// setter-with-return ambiguity, or a setter without a value slot.
    pub fn build(
        contract: &str,
        method: &MethodSpec,
    ) -> Result<Self> {
        let action = classify(contract, method)?;
        let key = resolve_key(method);
        let value_type = match action {
            ActionKind::Get => method.return_type().clone(),
            ActionKind::Put => value_param_type(method),
            ActionKind::Remove | ActionKind::Clear => TypeSpec::Unit,
        };
        let value_index = method
            .params()
            .iter()
            .position(|p| !p.default_slot)
            .unwrap_or(0);
        Ok(Self {
            action,
            key,
            value_type,
            value_index,
        })
    }
}

fn classify(
    contract: &str,
    method: &MethodSpec,
) -> Result<ActionKind> {
    match method.marker() {
        Some(Marker::Remove) => return Ok(ActionKind::Remove),
        Some(Marker::Clear) => return Ok(ActionKind::Clear),
        None => {}
    }

    let default_slots = method
        .params()
        .iter()
        .filter(|p| p.default_slot)
        .count();
    if default_slots > 1 {
        return Err(method_error(contract, method, "more than one default-value slot"));
    }
    if method.required_params() > 1 {
        return Err(method_error(contract, method, "method has more than one parameter"));
    }

    let has_return = !method.return_type().is_unit();
    if has_return && method.required_params() == 1 {
        return Err(method_error(
            contract,
            method,
            "setter method should not declare a return value",
        ));
    }

    if has_return {
        Ok(ActionKind::Get)
    } else if method.required_params() == 1 {
        Ok(ActionKind::Put)
    } else {
        Err(method_error(contract, method, "setter method requires a value parameter"))
    }
}

/// Store-key resolution: an explicit override wins; otherwise derive from
/// the method name by stripping one recognized verb prefix. Deterministic
/// and part of the public contract.
fn resolve_key(method: &MethodSpec) -> String {
    if let Some(key) = method.key_override() {
        let key = key.trim();
        if !key.is_empty() {
            return key.to_string();
        }
    }
    derive_key(method.name(), method.return_type())
}

fn derive_key(
    name: &str,
    return_type: &TypeSpec,
) -> String {
    let lowered = name.to_lowercase();
    // `is` only counts as a verb prefix on boolean getters
    let stripped = if lowered.starts_with("is") && return_type.is_bool() {
        &lowered[2..]
    } else if lowered.starts_with("get") || lowered.starts_with("put") || lowered.starts_with("set")
    {
        &lowered[3..]
    } else if lowered.starts_with("remove") {
        &lowered[6..]
    } else {
        &lowered
    };

    let key = stripped.trim_start_matches('_');
    if key.is_empty() {
        lowered
    } else {
        key.to_string()
    }
}

fn value_param_type(method: &MethodSpec) -> TypeSpec {
    method
        .params()
        .iter()
        .find(|p| !p.default_slot)
        .map(|p| p.ty.clone())
        // classification guarantees a value slot for PUT
        .unwrap_or(TypeSpec::Unit)
}

fn method_error(
    contract: &str,
    method: &MethodSpec,
    reason: &str,
) -> crate::Error {
    ContractError::InvalidMethod {
        contract: contract.to_string(),
        method: method.name().to_string(),
        reason: reason.to_string(),
    }
    .into()
}
