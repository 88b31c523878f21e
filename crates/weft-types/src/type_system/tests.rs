use std::sync::Arc;

use weft_identity::{Identifier, IdentifierRegistry};

use super::*;
use crate::config::TypeSystemConfig;
use crate::types::{FallbackKind, Optionality};
use crate::value::{MapEntry, MapValue, Rational, Value, ValueHolder};

use SubtypeOrder::*;

fn id(name: &str) -> Identifier {
    Identifier::new(name).unwrap()
}

fn new_ts() -> TypeSystem {
    let mut registry = IdentifierRegistry::new();
    TypeSystem::new(&mut registry, TypeSystemConfig::default()).unwrap()
}

fn colors(names: &[&str]) -> TypeRef {
    let ts = new_ts();
    ts.builtins().enum_of(names.iter().map(|n| id(n)), 0)
}

fn parse(ts: &TypeSystem, text: &str) -> TypeRef {
    ts.parse_type_ref(text).unwrap()
}

// ============================================================================
// Resolution and caching
// ============================================================================

#[test]
fn builtin_primitives_resolve() {
    let ts = new_ts();
    let b = ts.builtins();
    assert_eq!(ts.resolve(&b.string()).unwrap().kind_name(), "String");
    assert_eq!(ts.resolve(&b.file_path()).unwrap().kind_name(), "FilePath");
    let int = ts.resolve(&TypeRef::Primitive(b.int_primitive_id.clone())).unwrap();
    assert_eq!(int.kind_name(), "Int");
}

#[test]
fn resolving_twice_returns_the_same_type() {
    let ts = new_ts();
    let array = parse(&ts, "Array<Int[0, 10, 3]>[0, 4, 2]");
    let first = ts.resolve(&array).unwrap();
    let second = ts.resolve(&array.clone()).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    // The array and its entry type.
    assert_eq!(ts.cached_type_count(), 2);
}

#[test]
fn concurrent_resolution_shares_one_type() {
    let ts = new_ts();
    let record = parse(
        &ts,
        "Record<Int[0, 10, 0], Array<String>[0, -1, 1]>[((#a, 0), (#b, 1))]",
    );

    let resolved: Vec<Arc<Type>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| ts.resolve(&record).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for ty in &resolved[1..] {
        assert!(Arc::ptr_eq(&resolved[0], ty));
    }
}

#[test]
fn unknown_names_are_errors() {
    let ts = new_ts();
    let err = ts.resolve(&TypeRef::primitive(id("Missing"))).unwrap_err();
    assert_eq!(
        err,
        TypeSystemError::UnknownPrimitive {
            id: "Missing".to_string()
        }
    );

    let err = ts.resolve(&parse(&ts, "Missing<>")).unwrap_err();
    assert!(matches!(err, TypeSystemError::UnknownConstructor { .. }));
    assert!(ts.try_resolve(&parse(&ts, "Missing<>")).is_none());
}

#[test]
fn wrong_argument_kind_names_index_and_actual_kind() {
    let ts = new_ts();
    let bad = parse(&ts, "AddBlankToEnum<Int[0, 1, 0]>");
    let err = ts.resolve(&bad).unwrap_err();
    assert_eq!(
        err,
        TypeSystemError::WrongTypeArgKind {
            constructor: "AddBlankToEnum".to_string(),
            index: 0,
            expected: "Enum".to_string(),
            actual: "Int".to_string(),
        }
    );
}

#[test]
fn wrong_argument_counts_are_errors() {
    let ts = new_ts();
    let err = ts.resolve(&parse(&ts, "Int[0, 1]")).unwrap_err();
    assert_eq!(
        err,
        TypeSystemError::WrongValueArgCount {
            constructor: "Int".to_string(),
            expected: "3".to_string(),
            found: 2,
        }
    );

    let err = ts.resolve(&parse(&ts, "Sum<>")).unwrap_err();
    assert!(matches!(
        err,
        TypeSystemError::WrongTypeArgCount { found: 0, .. }
    ));

    // One field declared, two type arguments given.
    let err = ts
        .resolve(&parse(&ts, "Record<String, String>[((#a, 0))]"))
        .unwrap_err();
    assert!(matches!(
        err,
        TypeSystemError::WrongTypeArgCount { found: 2, .. }
    ));
}

#[test]
fn wrong_value_argument_kind_is_an_error() {
    let ts = new_ts();
    let err = ts.resolve(&parse(&ts, r#"Int["low", 1, 0]"#)).unwrap_err();
    assert_eq!(
        err,
        TypeSystemError::WrongValueArgKind {
            constructor: "Int".to_string(),
            index: 0,
            expected: "int".to_string(),
            actual: "string".to_string(),
        }
    );
}

#[test]
fn invalid_bounds_and_defaults_are_rejected() {
    let ts = new_ts();
    assert!(matches!(
        ts.resolve(&parse(&ts, "Int[5, 1, 3]")).unwrap_err(),
        TypeSystemError::InvalidRange { .. }
    ));
    assert!(matches!(
        ts.resolve(&parse(&ts, "Int[0, 10, 11]")).unwrap_err(),
        TypeSystemError::InvalidDefault { .. }
    ));
    assert!(matches!(
        ts.resolve(&parse(&ts, "Enum[(#a, #a), 0]")).unwrap_err(),
        TypeSystemError::DuplicateEnumValue { .. }
    ));
    assert!(matches!(
        ts.resolve(&parse(&ts, "Array<String>[3, 1, 2]")).unwrap_err(),
        TypeSystemError::InvalidRange { .. }
    ));
}

#[test]
fn failed_construction_is_not_cached() {
    let ts = new_ts();
    assert!(ts.resolve(&parse(&ts, "Int[0, 10, 11]")).is_err());
    assert_eq!(ts.cached_type_count(), 0);
}

#[test]
fn failed_constructions_leave_no_slots_behind() {
    let ts = new_ts();
    let entry = ts.constructor_entry(&ts.builtins().int_id).unwrap();
    for default in 11..20 {
        let bad = ts.builtins().int(0, 10, default);
        assert!(ts.resolve(&bad).is_err());
        assert!(ts.resolve(&bad).is_err());
    }
    assert_eq!(entry.slot_count(), 0);

    ts.resolve(&ts.builtins().int(0, 10, 3)).unwrap();
    assert_eq!(entry.slot_count(), 1);
}

#[test]
fn duplicate_registration_is_rejected() {
    let mut ts = new_ts();
    let string_id = ts.builtins().string_id.clone();
    let err = ts
        .add_primitive_type(string_id, TypeKind::String(Default::default()))
        .unwrap_err();
    assert!(matches!(err, TypeSystemError::DuplicateRegistration { .. }));

    let int_id = ts.builtins().int_id.clone();
    let err = ts
        .add_type_constructor(int_id, Box::new(PercentConstructor))
        .unwrap_err();
    assert!(matches!(err, TypeSystemError::DuplicateRegistration { .. }));
}

struct PercentConstructor;

impl TypeConstructor for PercentConstructor {
    fn construct_type(
        &self,
        _ts: &TypeSystem,
        type_ref: &TypeRef,
        _type_args: &[Arc<Type>],
        _value_args: &[ValueHolder],
    ) -> Result<Type, TypeSystemError> {
        let percent = IntType::new(0, 100, 0)?;
        Ok(Type::new(type_ref.clone(), TypeKind::Int(percent)))
    }
}

#[test]
fn custom_constructors_take_part_in_comparison() {
    let mut registry = IdentifierRegistry::new();
    let mut ts = TypeSystem::new(&mut registry, TypeSystemConfig::default()).unwrap();
    let percent_id = TypeConstructorId(registry.intern("Percent").unwrap());
    ts.add_type_constructor(percent_id.clone(), Box::new(PercentConstructor))
        .unwrap();

    let percent = TypeRef::constructed(percent_id, [], []);
    assert_eq!(percent.to_string(), "Percent<>");
    let half = ts.builtins().int(0, 50, 0);
    assert_eq!(ts.compare_subtype(&percent, &half), Supertype);
    assert_eq!(ts.compare_subtype(&half, &percent), Subtype);
}

#[test]
fn custom_primitives_resolve() {
    let mut registry = IdentifierRegistry::new();
    let mut ts = TypeSystem::new(&mut registry, TypeSystemConfig::default()).unwrap();
    let byte_id = RegisteredTypeId(registry.intern("Byte").unwrap());
    let byte = ts
        .add_primitive_type(byte_id, TypeKind::Int(IntType::new(0, 255, 0).unwrap()))
        .unwrap();
    let ty = ts.resolve(&byte).unwrap();
    assert!(ty.is_valid_value(&ts, &Value::Int(200)));
    assert!(!ty.is_valid_value(&ts, &Value::Int(256)));
}

#[test]
fn parse_depth_follows_config() {
    let mut registry = IdentifierRegistry::new();
    let config = TypeSystemConfig {
        max_type_ref_depth: 2,
        ..TypeSystemConfig::default()
    };
    let ts = TypeSystem::new(&mut registry, config).unwrap();
    assert!(ts.parse_type_ref("Array<String>[0, 1, 0]").is_ok());
    assert!(matches!(
        ts.parse_type_ref("Array<Array<String>[0, 1, 0]>[0, 1, 0]"),
        Err(TypeSystemError::Parse { .. })
    ));
}

// ============================================================================
// Subtyping
// ============================================================================

#[test]
fn equal_refs_are_equivalent() {
    let ts = new_ts();
    let bogus = TypeRef::primitive(id("Missing"));
    assert_eq!(ts.compare_subtype(&bogus, &bogus), Equivalent);
}

#[test]
fn unresolvable_refs_are_unrelated() {
    let ts = new_ts();
    let bogus = TypeRef::primitive(id("Missing"));
    assert_eq!(ts.compare_subtype(&bogus, &ts.builtins().string()), Unrelated);
    assert!(!ts.is_related_type(&bogus, &ts.builtins().string()));
}

#[test]
fn malformed_arguments_are_unrelated() {
    let ts = new_ts();
    let b = ts.builtins();
    let inverted = parse(&ts, "Int[5, 1, 3]");
    assert!(ts.resolve(&inverted).is_err());
    assert_eq!(ts.compare_subtype(&inverted, &b.int(0, 10, 0)), Unrelated);
    assert_eq!(ts.compare_subtype(&b.int(0, 10, 0), &inverted), Unrelated);
    assert!(!ts.is_subtype(&inverted, &b.int(0, 10, 0)));

    let bad_default = parse(&ts, "Rational[0/1, 1/1, 2/1]");
    assert_eq!(ts.compare_subtype(&bad_default, &parse(&ts, "Rational[0/1, 4/1, 0/1]")), Unrelated);

    let inverted_sizes = parse(&ts, "Array<Int[0, 10, 0]>[4, 2, 3]");
    let sizes = parse(&ts, "Array<Int[0, 10, 0]>[0, 8, 0]");
    assert!(ts.resolve(&inverted_sizes).is_err());
    assert_eq!(ts.compare_subtype(&inverted_sizes, &sizes), Unrelated);

    let bad_entry = parse(&ts, "Array<Missing>[0, 8, 0]");
    assert_eq!(ts.compare_subtype(&bad_entry, &sizes), Unrelated);

    let blank_with_args = parse(&ts, "AddBlankToEnum<Enum[(#red), 0]>[1]");
    let inner = parse(&ts, "Enum[(#red), 0]");
    assert_eq!(ts.compare_subtype(&blank_with_args, &inner), Unrelated);
}

#[test]
fn int_ranges_compare_by_containment() {
    let ts = new_ts();
    let b = ts.builtins();
    assert_eq!(ts.compare_subtype(&b.int(0, 5, 0), &b.int(0, 10, 0)), Subtype);
    assert_eq!(ts.compare_subtype(&b.int(0, 10, 0), &b.int(0, 5, 0)), Supertype);
    assert_eq!(ts.compare_subtype(&b.int(0, 10, 0), &b.int(0, 10, 7)), Equivalent);
    assert_eq!(ts.compare_subtype(&b.int(0, 10, 0), &b.int(5, 20, 5)), Intersecting);
    assert_eq!(ts.compare_subtype(&b.int(0, 4, 0), &b.int(5, 9, 5)), Disjoint);
}

#[test]
fn ints_compare_with_rationals() {
    let ts = new_ts();
    let b = ts.builtins();
    let r = |n| Rational::from_int(n);
    let ints = b.int(0, 4, 0);
    assert_eq!(ts.compare_subtype(&ints, &b.rational(r(0), r(4), r(0))), Equivalent);
    assert_eq!(ts.compare_subtype(&ints, &b.rational(r(0), r(8), r(0))), Subtype);

    let half = Rational::new(1, 2).unwrap();
    assert_eq!(ts.compare_subtype(&b.rational(r(0), half, r(0)), &ints), Subtype);
}

#[test]
fn strings_and_file_paths_only_match_themselves() {
    let ts = new_ts();
    let b = ts.builtins();
    assert!(ts.is_subtype(&b.string(), &b.string()));
    assert_eq!(ts.compare_subtype(&b.string(), &b.file_path()), Unrelated);
    assert!(!ts.is_related_type(&b.string(), &b.int(0, 1, 0)));
}

#[test]
fn enums_compare_by_value_sets() {
    let ts = new_ts();
    let rg = colors(&["red", "green"]);
    let rgb = colors(&["red", "green", "blue"]);
    let gb = colors(&["blue", "green"]);
    let cmy = colors(&["cyan", "magenta"]);
    assert_eq!(ts.compare_subtype(&rg, &rgb), Subtype);
    assert_eq!(ts.compare_subtype(&rgb, &rg), Supertype);
    assert_eq!(ts.compare_subtype(&rg, &gb), Intersecting);
    assert_eq!(ts.compare_subtype(&rg, &cmy), Disjoint);
    assert_eq!(ts.compare_subtype(&rg, &colors(&["green", "red"])), Equivalent);
}

#[test]
fn enum_union_and_blank() {
    let ts = new_ts();
    let b = ts.builtins();
    let rg = colors(&["red", "green"]);
    let union = b.enum_union([rg.clone(), colors(&["green", "blue"])]);
    let ty = ts.resolve(&union).unwrap();
    let names: Vec<_> = ty.as_enum().unwrap().values().iter().map(|v| v.name()).collect();
    assert_eq!(names, ["red", "green", "blue"]);

    let with_blank = b.add_blank_to_enum(rg.clone());
    let ty = ts.resolve(&with_blank).unwrap();
    let enum_type = ty.as_enum().unwrap();
    assert_eq!(enum_type.default_identifier(), &b.blank);
    assert_eq!(enum_type.len(), 3);

    assert_eq!(ts.compare_subtype(&with_blank, &rg), Supertype);
    assert_eq!(ts.compare_subtype(&rg, &with_blank), Subtype);

    let already_blank = colors(&["_", "red"]);
    assert_eq!(
        ts.compare_subtype(&b.add_blank_to_enum(already_blank.clone()), &already_blank),
        Equivalent
    );
}

#[test]
fn union_rejects_conflicting_meanings() {
    let ts = new_ts();
    let err = ts
        .resolve(&parse(&ts, "EnumUnion<Enum[(#mode'1), 0], Enum[(#mode'2), 0]>"))
        .unwrap_err();
    assert!(matches!(err, TypeSystemError::DiscriminatorMismatch { .. }));
}

#[test]
fn records_with_more_fields_are_subtypes() {
    let ts = new_ts();
    let b = ts.builtins();
    let narrow = b.record([(id("x"), b.int(0, 10, 0), Optionality::AlwaysActive)]);
    let wide = b.record([
        (id("x"), b.int(0, 10, 0), Optionality::AlwaysActive),
        (id("label"), b.string(), Optionality::AlwaysActive),
    ]);
    assert_eq!(ts.compare_subtype(&wide, &narrow), Subtype);
    assert_eq!(ts.compare_subtype(&narrow, &wide), Supertype);

    let narrower_field = b.record([
        (id("x"), b.int(0, 5, 0), Optionality::AlwaysActive),
        (id("label"), b.string(), Optionality::AlwaysActive),
    ]);
    assert_eq!(ts.compare_subtype(&narrower_field, &narrow), Subtype);

    let optional = b.record([(id("x"), b.int(0, 10, 0), Optionality::OptionalDefaultActive)]);
    assert_eq!(ts.compare_subtype(&narrow, &optional), Subtype);

    let other_x = b.record([(id("x"), b.string(), Optionality::AlwaysActive)]);
    assert_eq!(ts.compare_subtype(&narrow, &other_x), Unrelated);
}

#[test]
fn variant_records_need_matching_tags() {
    let ts = new_ts();
    let b = ts.builtins();
    let tags = |names: &[&str]| names.iter().map(|n| id(n)).collect::<Vec<_>>();
    let a = b.record_with_variants(
        tags(&["circle", "square"]),
        0,
        [(id("radius"), b.int(0, 10, 1), tags(&["circle"]))],
    );
    let same = b.record_with_variants(
        tags(&["square", "circle"]),
        1,
        [(id("radius"), b.int(0, 20, 1), tags(&["circle"]))],
    );
    let more_tags = b.record_with_variants(
        tags(&["circle", "square", "star"]),
        0,
        [(id("radius"), b.int(0, 10, 1), tags(&["circle"]))],
    );
    assert_eq!(ts.compare_subtype(&a, &same), Subtype);
    assert_eq!(ts.compare_subtype(&a, &more_tags), Intersecting);
}

#[test]
fn arrays_combine_entry_and_size_orders() {
    let ts = new_ts();
    let b = ts.builtins();
    let small = b.array(b.int(0, 10, 0), 0, Some(5), 0);
    let large = b.array(b.int(0, 20, 0), 0, Some(10), 0);
    let unbounded = b.array(b.int(0, 20, 0), 0, None, 0);
    assert_eq!(ts.compare_subtype(&small, &large), Subtype);
    assert_eq!(ts.compare_subtype(&unbounded, &large), Supertype);

    let mixed = b.array(b.int(0, 5, 0), 0, Some(20), 0);
    assert_eq!(ts.compare_subtype(&mixed, &large), Intersecting);

    let strings = b.array(b.string(), 0, Some(5), 0);
    assert_eq!(ts.compare_subtype(&strings, &small), Intersecting);
    let nonempty_strings = b.array(b.string(), 1, Some(5), 1);
    assert_eq!(ts.compare_subtype(&nonempty_strings, &small), Disjoint);
}

#[test]
fn tuples_compare_elementwise() {
    let ts = new_ts();
    let b = ts.builtins();
    let a = b.tuple([b.int(0, 5, 0), b.string()]);
    let c = b.tuple([b.int(0, 10, 0), b.string()]);
    assert_eq!(ts.compare_subtype(&a, &c), Subtype);
    assert_eq!(ts.compare_subtype(&a, &b.tuple([b.int(0, 5, 0)])), Disjoint);
    assert_eq!(ts.compare_subtype(&a, &b.tuple([b.string(), b.string()])), Unrelated);
}

#[test]
fn sums_compare_by_summand_coverage() {
    let ts = new_ts();
    let b = ts.builtins();
    let narrow = b.sum([b.int(0, 5, 0), b.string()], 0);
    let wide = b.sum([b.int(0, 10, 0), b.string(), b.file_path()], 0);
    assert_eq!(ts.compare_subtype(&narrow, &wide), Subtype);
    assert_eq!(ts.compare_subtype(&wide, &narrow), Supertype);
    assert_eq!(
        ts.compare_subtype(&narrow, &b.sum([b.string(), b.int(0, 5, 0)], 1)),
        Equivalent
    );

    let plain = b.int(0, 3, 0);
    assert_eq!(ts.compare_subtype(&plain, &narrow), Subtype);
    assert_eq!(ts.compare_subtype(&narrow, &plain), Supertype);
}

#[test]
fn generics_compare_wrapped_types() {
    let ts = new_ts();
    let b = ts.builtins();
    let one = b.generic(b.array(b.type_variable(0, 0), 0, None, 0), 1);
    let two = b.generic(b.array(b.type_variable(0, 0), 0, None, 0), 2);
    assert_eq!(ts.compare_subtype(&one, &two), Disjoint);

    let bounded = b.generic(b.array(b.type_variable(0, 0), 0, Some(4), 0), 1);
    assert_eq!(ts.compare_subtype(&bounded, &one), Subtype);
}

#[test]
fn maps_are_contravariant_in_source() {
    let ts = new_ts();
    let b = ts.builtins();
    let broad_source = b.map(b.int(0, 10, 0), b.int(0, 10, 0), FallbackKind::AllToOne);
    let narrow_source = b.map(b.int(0, 5, 0), b.int(0, 20, 0), FallbackKind::AllToOne);
    assert_eq!(ts.compare_subtype(&broad_source, &narrow_source), Subtype);
    assert_eq!(ts.compare_subtype(&narrow_source, &broad_source), Supertype);
}

#[test]
fn identity_fallback_needs_equivalent_types() {
    let ts = new_ts();
    let b = ts.builtins();
    let ok = b.map(b.int(0, 10, 0), b.int(0, 10, 5), FallbackKind::AllToSame);
    assert!(ts.resolve(&ok).is_ok());

    let bad = b.map(b.int(0, 10, 0), b.int(0, 20, 0), FallbackKind::AllToSame);
    assert!(matches!(
        ts.resolve(&bad).unwrap_err(),
        TypeSystemError::IncompatibleFallback { .. }
    ));
}

// ============================================================================
// Map values
// ============================================================================

#[test]
fn map_default_is_a_single_fallback() {
    let ts = new_ts();
    let b = ts.builtins();
    let map_type = b.map(b.string(), b.int(0, 10, 4), FallbackKind::AllToOne);
    let value = ts.resolve(&map_type).unwrap().create_value(&ts).unwrap();
    let Value::Map(map) = &*value else {
        panic!("expected a map value");
    };
    assert!(map.validate(&ts).is_valid());
    let mapped = map.resolve(&ValueHolder::new(Value::from("anything"))).unwrap();
    assert_eq!(mapped.as_int(), Some(4));
}

#[test]
fn misplaced_fallback_is_reported_not_raised() {
    let ts = new_ts();
    let b = ts.builtins();
    let map_type = b.map(b.string(), b.int(0, 10, 0), FallbackKind::AllToOne);
    let entries = vec![
        MapEntry::AllToOne {
            target: ValueHolder::new(Value::Int(1)),
        },
        MapEntry::OneToOne {
            source: ValueHolder::new(Value::from("a")),
            target: ValueHolder::new(Value::Int(2)),
        },
    ];
    let map = MapValue::new(b.string(), b.int(0, 10, 0), entries);

    let result = map.validate(&ts);
    assert!(!result.is_valid());
    assert_eq!(result.message(), Some("the last entry must be a fallback"));

    // Still a storable value of the map type.
    let ty = ts.resolve(&map_type).unwrap();
    assert!(ty.is_valid_value(&ts, &Value::Map(map)));
}

#[test]
fn badly_typed_map_entries_are_invalid() {
    let ts = new_ts();
    let b = ts.builtins();
    let map_type = b.map(b.string(), b.int(0, 10, 0), FallbackKind::AllToOne);
    let map = MapValue::new(
        b.string(),
        b.int(0, 10, 0),
        vec![
            MapEntry::OneToOne {
                source: ValueHolder::new(Value::from("a")),
                target: ValueHolder::new(Value::Int(99)),
            },
            MapEntry::AllToOne {
                target: ValueHolder::new(Value::Int(0)),
            },
        ],
    );
    assert!(!map.validate(&ts).is_valid());
    let ty = ts.resolve(&map_type).unwrap();
    assert!(!ty.is_valid_value(&ts, &Value::Map(map)));
}
