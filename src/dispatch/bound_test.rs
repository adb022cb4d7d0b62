use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use super::*;
use crate::ContractError;
use crate::ContractSpec;
use crate::Error;
use crate::MethodSpec;
use crate::Outcome;
use crate::ScalarKind;
use crate::TypeSpec;
use crate::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct User {
    name: String,
    avatar: String,
}

fn text() -> TypeSpec {
    TypeSpec::Scalar(ScalarKind::Text)
}

fn user_contract() -> ContractSpec {
    ContractSpec::new("UserStore")
        .method(MethodSpec::new("put_user").param(text()))
        .method(
            MethodSpec::new("get_user")
                .returns(text())
                .default_param(text()),
        )
        .method(MethodSpec::new("remove_user").remove_marker())
        .method(MethodSpec::new("clear_all").clear_marker())
}

fn contract_error(err: Error) -> ContractError {
    match err {
        Error::Contract(inner) => inner,
        other => panic!("expected a contract error, got {other:?}"),
    }
}

#[test]
fn test_bind_rejects_empty_method_name() {
    let contract = ContractSpec::new("Broken").method(MethodSpec::new("  "));
    let err = contract_error(ContractBinder::new().bind(contract).unwrap_err());
    assert!(matches!(err, ContractError::InvalidContract { .. }), "unexpected: {err:?}");
}

#[test]
fn test_bind_rejects_duplicate_method_names() {
    let contract = ContractSpec::new("Broken")
        .method(MethodSpec::new("put_user").param(text()))
        .method(MethodSpec::new("put_user").param(text()));
    let err = contract_error(ContractBinder::new().bind(contract).unwrap_err());
    assert!(matches!(err, ContractError::InvalidContract { .. }), "unexpected: {err:?}");
}

#[test]
fn test_bind_rejects_setter_with_return_value() {
    let contract = ContractSpec::new("Broken")
        .method(MethodSpec::new("set_user").param(text()).returns(text()));
    let err = contract_error(ContractBinder::new().bind(contract).unwrap_err());
    assert!(matches!(err, ContractError::InvalidMethod { .. }), "unexpected: {err:?}");
}

#[test]
fn test_bind_rejects_conflicting_value_types_for_one_key() {
    // Both methods resolve to key `user` but disagree on the payload type
    let contract = ContractSpec::new("Broken")
        .method(MethodSpec::new("put_user").param(text()))
        .method(
            MethodSpec::new("get_user")
                .returns(TypeSpec::Scalar(ScalarKind::Int))
                .default_param(TypeSpec::Scalar(ScalarKind::Int)),
        );
    let err = contract_error(ContractBinder::new().bind(contract).unwrap_err());
    assert!(matches!(err, ContractError::InvalidContract { .. }), "unexpected: {err:?}");
}

#[test]
fn test_watch_and_plain_getter_share_a_key_without_conflict() {
    let contract = ContractSpec::new("UserStore")
        .method(
            MethodSpec::new("get_user")
                .returns(text())
                .default_param(text()),
        )
        .method(
            MethodSpec::new("watch_user")
                .key("user")
                .returns(TypeSpec::stream_of(text()))
                .default_param(text()),
        );
    assert!(ContractBinder::new().bind(contract).is_ok());
}

#[test]
fn test_unknown_method_is_rejected() {
    let store = ContractBinder::new().bind(user_contract()).unwrap();
    let err = contract_error(store.method_id("frobnicate").unwrap_err());
    assert!(matches!(err, ContractError::UnknownMethod { .. }), "unexpected: {err:?}");
}

#[test]
fn test_arity_mismatch_is_rejected() {
    let store = ContractBinder::new().bind(user_contract()).unwrap();

    let err = contract_error(store.invoke_by_name("put_user", CallArgs::none()).unwrap_err());
    assert!(matches!(err, ContractError::ArityMismatch { received: 0, .. }), "unexpected: {err:?}");

    let err = contract_error(
        store
            .invoke_by_name("remove_user", CallArgs::one("extra"))
            .unwrap_err(),
    );
    assert!(matches!(err, ContractError::ArityMismatch { received: 1, .. }), "unexpected: {err:?}");
}

#[test]
fn test_setter_with_default_slot_writes_the_value_argument() {
    // A setter may declare a default slot alongside its value slot; the
    // value written must be the one in the declared value position, not
    // whichever argument happens to come last.
    let contract = ContractSpec::new("UserStore")
        .method(MethodSpec::new("put_user").param(text()).default_param(text()))
        .method(
            MethodSpec::new("get_user")
                .returns(text())
                .default_param(text()),
        );
    let store = ContractBinder::new().bind(contract).unwrap();

    store
        .invoke_by_name(
            "put_user",
            CallArgs::of(vec![Value::from("alice"), Value::from("fallback")]),
        )
        .unwrap();

    match store
        .invoke_by_name("get_user", CallArgs::one("nobody"))
        .unwrap()
    {
        Outcome::Value(value) => assert_eq!(value.as_text(), Some("alice")),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn test_setter_value_slot_declared_after_default_slot() {
    let contract = ContractSpec::new("UserStore")
        .method(MethodSpec::new("put_user").default_param(text()).param(text()))
        .method(
            MethodSpec::new("get_user")
                .returns(text())
                .default_param(text()),
        );
    let store = ContractBinder::new().bind(contract).unwrap();

    // Both slots supplied: the value sits in its declared second position
    store
        .invoke_by_name(
            "put_user",
            CallArgs::of(vec![Value::from("fallback"), Value::from("alice")]),
        )
        .unwrap();
    match store
        .invoke_by_name("get_user", CallArgs::one("nobody"))
        .unwrap()
    {
        Outcome::Value(value) => assert_eq!(value.as_text(), Some("alice")),
        other => panic!("unexpected outcome: {other:?}"),
    }

    // Default slot omitted: the lone argument is the value
    store
        .invoke_by_name("put_user", CallArgs::one("bob"))
        .unwrap();
    match store
        .invoke_by_name("get_user", CallArgs::one("nobody"))
        .unwrap()
    {
        Outcome::Value(value) => assert_eq!(value.as_text(), Some("bob")),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn test_getter_default_slot_is_optional_at_call_time() {
    let store = ContractBinder::new().bind(user_contract()).unwrap();

    // Default omitted: the text scalar's native default applies
    match store.invoke_by_name("get_user", CallArgs::none()).unwrap() {
        Outcome::Value(value) => assert_eq!(value.as_text(), Some("")),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn test_put_remove_get_flow() {
    let store = ContractBinder::new().bind(user_contract()).unwrap();

    store
        .invoke_by_name("put_user", CallArgs::one("alice"))
        .unwrap();
    store
        .invoke_by_name("remove_user", CallArgs::none())
        .unwrap();

    match store
        .invoke_by_name("get_user", CallArgs::one("ethanhua"))
        .unwrap()
    {
        Outcome::Value(value) => assert_eq!(value.as_text(), Some("ethanhua")),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn test_clear_empties_the_namespace() {
    let store = ContractBinder::new().bind(user_contract()).unwrap();

    store
        .invoke_by_name("put_user", CallArgs::one("alice"))
        .unwrap();
    store.invoke_by_name("clear_all", CallArgs::none()).unwrap();

    match store
        .invoke_by_name("get_user", CallArgs::one("nobody"))
        .unwrap()
    {
        Outcome::Value(value) => assert_eq!(value.as_text(), Some("nobody")),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn test_key_override_routes_methods_to_one_entry() {
    let contract = ContractSpec::new("UserStore")
        .method(MethodSpec::new("store_principal").key("user").param(text()))
        .method(
            MethodSpec::new("get_user")
                .returns(text())
                .default_param(text()),
        );
    let store = ContractBinder::new().bind(contract).unwrap();

    store
        .invoke_by_name("store_principal", CallArgs::one("alice"))
        .unwrap();
    match store
        .invoke_by_name("get_user", CallArgs::one("nobody"))
        .unwrap()
    {
        Outcome::Value(value) => assert_eq!(value.as_text(), Some("alice")),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn test_object_payloads_flow_through_the_binder_factory() {
    let factory = crate::BincodeConverterFactory::new().with_structural::<User>();
    let contract = ContractSpec::new("UserStore")
        .method(MethodSpec::new("put_user").param(TypeSpec::object::<User>()))
        .method(
            MethodSpec::new("get_user")
                .returns(TypeSpec::object::<User>())
                .default_param(TypeSpec::object::<User>()),
        );
    let store = ContractBinder::new()
        .converter_factory(Arc::new(factory))
        .bind(contract)
        .unwrap();

    let user = User {
        name: "alice".to_string(),
        avatar: "a.png".to_string(),
    };
    store
        .invoke_by_name("put_user", CallArgs::one(Value::object(user.clone())))
        .unwrap();

    let fallback = User {
        name: "nobody".to_string(),
        avatar: String::new(),
    };
    match store
        .invoke_by_name("get_user", CallArgs::one(Value::object(fallback)))
        .unwrap()
    {
        Outcome::Value(value) => {
            assert_eq!(value.as_object::<User>().as_deref(), Some(&user));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn test_watch_invocation_returns_a_live_stream() {
    use futures::StreamExt;

    let contract = ContractSpec::new("UserStore")
        .method(MethodSpec::new("put_user").param(text()))
        .method(
            MethodSpec::new("watch_user")
                .key("user")
                .returns(TypeSpec::stream_of(text()))
                .default_param(text()),
        );
    let store = ContractBinder::new().bind(contract).unwrap();

    let outcome = store
        .invoke_by_name("watch_user", CallArgs::one("nobody"))
        .unwrap();
    let mut stream = match outcome {
        Outcome::Watch(stream) => stream,
        other => panic!("unexpected outcome: {other:?}"),
    };

    let seeded = stream.next().await.unwrap().unwrap();
    assert_eq!(seeded.as_text(), Some("nobody"));

    store
        .invoke_by_name("put_user", CallArgs::one("alice"))
        .unwrap();
    let live = stream.next().await.unwrap().unwrap();
    assert_eq!(live.as_text(), Some("alice"));
}

#[test]
fn test_watch_invocation_without_default_is_rejected() {
    let contract = ContractSpec::new("UserStore").method(
        MethodSpec::new("watch_user")
            .key("user")
            .returns(TypeSpec::stream_of(text()))
            .default_param(text()),
    );
    let store = ContractBinder::new().bind(contract).unwrap();

    let err = store
        .invoke_by_name("watch_user", CallArgs::none())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)), "unexpected: {err:?}");
}

#[test]
fn test_namespace_defaults_to_contract_name_with_override() {
    let store = ContractBinder::new().bind(user_contract()).unwrap();
    assert_eq!(store.namespace(), "UserStore");

    let contract = user_contract().namespace("users_v2");
    let store = ContractBinder::new().bind(contract).unwrap();
    assert_eq!(store.namespace(), "users_v2");
}

#[test]
fn test_bound_contract_exposes_typed_accessor() {
    let store = ContractBinder::new().bind(user_contract()).unwrap();

    store
        .invoke_by_name("put_user", CallArgs::one("alice"))
        .unwrap();
    let direct = store
        .preference()
        .get_scalar("user", "nobody".to_string())
        .unwrap();
    assert_eq!(direct, "alice");
}
