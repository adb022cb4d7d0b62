use super::*;
use crate::Error;

#[derive(Debug)]
struct Profile;

#[test]
fn test_raw_type_strips_wrappers() {
    assert_eq!(TypeSpec::Unit.raw_type(), RawType::Unit);
    assert_eq!(
        TypeSpec::Scalar(ScalarKind::Int).raw_type(),
        RawType::Scalar(ScalarKind::Int)
    );
    assert_eq!(TypeSpec::object::<Profile>().raw_type(), RawType::Object);
    assert_eq!(
        TypeSpec::stream_of(TypeSpec::object::<Profile>()).raw_type(),
        RawType::Stream
    );
}

#[test]
fn test_stream_payload_unwraps_sole_argument() {
    let spec = TypeSpec::stream_of(TypeSpec::Scalar(ScalarKind::Text));
    assert_eq!(
        spec.stream_payload().unwrap(),
        &TypeSpec::Scalar(ScalarKind::Text)
    );
}

#[test]
fn test_stream_payload_rejects_non_generic_shapes() {
    for spec in [
        TypeSpec::Unit,
        TypeSpec::Scalar(ScalarKind::Bool),
        TypeSpec::object::<Profile>(),
    ] {
        let err = spec.stream_payload().unwrap_err();
        assert!(matches!(err, Error::Convert(_)), "unexpected: {err:?}");
    }
}

#[test]
fn test_converter_target_resolves_through_stream() {
    let direct = TypeSpec::object::<Profile>().converter_target().unwrap();
    let wrapped = TypeSpec::stream_of(TypeSpec::object::<Profile>())
        .converter_target()
        .unwrap();
    assert_eq!(direct, wrapped);
    assert_eq!(direct, PayloadType::of::<Profile>());
}

#[test]
fn test_converter_target_rejects_scalar_and_nested_stream() {
    assert!(TypeSpec::Scalar(ScalarKind::Int).converter_target().is_err());
    assert!(TypeSpec::Unit.converter_target().is_err());

    let nested = TypeSpec::stream_of(TypeSpec::stream_of(TypeSpec::object::<Profile>()));
    assert!(nested.converter_target().is_err());
}

#[test]
fn test_describe_is_stable() {
    let spec = TypeSpec::stream_of(TypeSpec::Scalar(ScalarKind::Bool));
    assert_eq!(spec.describe(), "Stream<bool>");
}
