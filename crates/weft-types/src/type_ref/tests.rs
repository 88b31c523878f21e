use weft_identity::Identifier;

use super::*;
use crate::value::Value;

fn id(name: &str) -> Identifier {
    Identifier::new(name).unwrap()
}

fn ctor(name: &str) -> TypeConstructorId {
    TypeConstructorId(id(name))
}

fn type_var(index: i64, level: i64) -> TypeRef {
    TypeRef::constructed(
        ctor("TypeVar"),
        [],
        [Value::Int(index).into(), Value::Int(level).into()],
    )
}

fn ids() -> SubstitutionIds {
    SubstitutionIds {
        generic: ctor("Generic"),
        type_var: ctor("TypeVar"),
    }
}

#[test]
fn canonical_text_round_trip() {
    for text in [
        "String",
        "Int[0, 10, 0]",
        "Array<Int[0, 10, 0]>[0, 8, 2]",
        "Record<Int[0, 10, 0], String>[((#a, 0), (#b, 1))]",
        "Sum<Rational[-1/2, 1/2, 0/1], FilePath>[0]",
        "Tuple<>",
        "Enum[(#red'1, #green'2), 0]",
        r#"Labels["a \"quoted\" name", @"dir/file.txt"]"#,
    ] {
        let parsed: TypeRef = text.parse().unwrap();
        assert_eq!(parsed.serialize_to_string(), text);
    }
}

#[test]
fn whitespace_is_insignificant() {
    let loose: TypeRef = " Array < Int [ 0 ,10, 0 ] > [0, 8,2] ".parse().unwrap();
    let tight: TypeRef = "Array<Int[0,10,0]>[0,8,2]".parse().unwrap();
    assert_eq!(loose, tight);
}

#[test]
fn bare_name_is_primitive() {
    let primitive: TypeRef = "Int".parse().unwrap();
    assert!(matches!(primitive, TypeRef::Primitive(_)));
    let constructed: TypeRef = "Int<>".parse().unwrap();
    assert!(constructed.is_constructed_by(&ctor("Int")));
    assert_ne!(primitive, constructed);
}

#[test]
fn value_arguments_keep_their_kinds() {
    let parsed: TypeRef = "X[-3, 3/4, #id'2, (1, (2))]".parse().unwrap();
    let args = parsed.value_args();
    assert_eq!(*args[0], Value::Int(-3));
    assert!(matches!(*args[1], Value::Rational(_)));
    assert_eq!(args[2].as_identifier().unwrap().discriminator().get(), 2);
    assert_eq!(args[3].as_tuple().unwrap().0.len(), 2);
}

#[test]
fn parse_errors_name_the_offset() {
    let err = "Array<Int".parse::<TypeRef>().unwrap_err();
    assert!(matches!(err, TypeSystemError::Parse { offset: 9, .. }));

    let err = "Int[0, 1/0]".parse::<TypeRef>().unwrap_err();
    assert!(matches!(err, TypeSystemError::Parse { .. }));

    let err = "Int[0] junk".parse::<TypeRef>().unwrap_err();
    assert!(matches!(err, TypeSystemError::Parse { offset: 7, .. }));
}

#[test]
fn nesting_beyond_limit_is_rejected() {
    let deep = "A<".repeat(5) + "B" + &">".repeat(5);
    assert!(TypeRef::deserialize_from_string(&deep, 6).is_ok());
    let err = TypeRef::deserialize_from_string(&deep, 5).unwrap_err();
    assert!(matches!(err, TypeSystemError::Parse { .. }));
}

#[test]
fn serde_uses_text_form() {
    let parsed: TypeRef = "Array<String>[0, -1, 0]".parse().unwrap();
    let json = serde_json::to_string(&parsed).unwrap();
    assert_eq!(json, r#""Array<String>[0, -1, 0]""#);
    assert_eq!(serde_json::from_str::<TypeRef>(&json).unwrap(), parsed);
}

#[test]
fn substitution_replaces_matching_level() {
    let wrapped = TypeRef::constructed(ctor("Tuple"), [type_var(0, 0), type_var(1, 0)], []);
    let int: TypeRef = "Int".parse().unwrap();
    let result = wrapped.substitute_type_variables(&ids(), 0, &[Some(int.clone()), None]);
    assert_eq!(result.type_args()[0], int);
    assert_eq!(result.type_args()[1], type_var(1, 0));
}

#[test]
fn substitution_tracks_nested_generics() {
    // Inside the nested generic, level 1 refers to the outer one.
    let inner = TypeRef::constructed(
        ctor("Generic"),
        [TypeRef::constructed(ctor("Tuple"), [type_var(0, 1), type_var(0, 0)], [])],
        [Value::Int(1).into()],
    );
    let wrapped = TypeRef::constructed(ctor("Tuple"), [type_var(0, 0), inner], []);
    let string: TypeRef = "String".parse().unwrap();
    let result = wrapped.substitute_type_variables(&ids(), 0, &[Some(string.clone())]);

    assert_eq!(result.type_args()[0], string);
    let nested_tuple = &result.type_args()[1].type_args()[0];
    assert_eq!(nested_tuple.type_args()[0], string);
    assert_eq!(nested_tuple.type_args()[1], type_var(0, 0));
}

#[test]
fn unchanged_substitution_shares_arguments() {
    let wrapped = TypeRef::constructed(ctor("Tuple"), [type_var(3, 0)], []);
    let result =
        wrapped.substitute_type_variables(&ids(), 0, &[Some("Int".parse().unwrap())]);
    assert!(std::sync::Arc::ptr_eq(
        result.args().unwrap(),
        wrapped.args().unwrap()
    ));
}

#[test]
fn visit_identifiers_covers_names_and_values() {
    let mut parsed: TypeRef = "Enum[(#a, #b), 0]".parse().unwrap();
    let mut names = Vec::new();
    parsed.visit_identifiers(&mut |ident| names.push(ident.name().to_string()));
    assert_eq!(names, ["Enum", "a", "b"]);
}
