//! Integration tests for struct mapping through the public entry points
//!
//! Covers argument validation, identical-type assignment, cross-type field
//! matching, loose and strict mode, embedded promotion and fault handling.


use serde_json::json;
use structmap_core::{
    map, must_map, Error, ErrorKind, FieldDef, Kind, MapOptions, Mapper, TypeId, Types, Value,
};
use test_support::{common, sample_x, target, to_json};

// ============================================================================
// PRECONDITIONS
// ============================================================================

#[test]
fn test_source_must_not_be_nil() {
    let mut fixture = common();
    let dest = target(&mut fixture.types, fixture.x);
    let nil_x = fixture.types.zero(fixture.x_ptr).unwrap();

    assert_eq!(
        map(&fixture.types, Some(&nil_x), Some(&dest), &[]),
        Err(Error::NilSource)
    );
    assert_eq!(map(&fixture.types, None, Some(&dest), &[]), Err(Error::NilSource));
}

#[test]
fn test_destination_must_not_be_nil() {
    let fixture = common();
    let source = fixture.types.zero(fixture.x).unwrap();
    let nil_x = fixture.types.zero(fixture.x_ptr).unwrap();

    assert_eq!(
        map(&fixture.types, Some(&source), Some(&nil_x), &[]),
        Err(Error::NilDestination)
    );
    assert_eq!(
        map(&fixture.types, Some(&source), None, &[]),
        Err(Error::NilDestination)
    );
}

#[test]
#[should_panic(expected = "Destination must not be nil")]
fn test_must_map_panics_on_nil_pointer_destination() {
    let fixture = common();
    let source = fixture.types.zero(fixture.x).unwrap();
    let nil_x = fixture.types.zero(fixture.x_ptr).unwrap();
    must_map(&fixture.types, Some(&source), Some(&nil_x), &[]);
}

#[test]
#[should_panic(expected = "Destination must not be nil")]
fn test_must_map_panics_on_missing_destination() {
    let fixture = common();
    let source = fixture.types.zero(fixture.x).unwrap();
    must_map(&fixture.types, Some(&source), None, &[]);
}

#[test]
fn test_destination_must_be_pointer() {
    let fixture = common();
    let source = fixture.types.zero(fixture.x).unwrap();
    let dest = fixture.types.zero(fixture.x).unwrap();

    let err = map(&fixture.types, Some(&source), Some(&dest), &[]).unwrap_err();
    assert_eq!(
        err,
        Error::DestinationNotPointer {
            type_name: "X".to_string()
        }
    );
    assert_eq!(err.kind(), ErrorKind::Precondition);
}

#[test]
fn test_only_one_options_value_is_accepted() {
    let mut fixture = common();
    let dest = target(&mut fixture.types, fixture.x);
    let source = sample_x(&fixture);

    let err = map(
        &fixture.types,
        Some(&source),
        Some(&dest),
        &[MapOptions::loose(), MapOptions::loose()],
    )
    .unwrap_err();
    assert_eq!(err, Error::TooManyOptions { count: 2 });
}

#[test]
fn test_rejected_call_leaves_destination_untouched() {
    let mut fixture = common();
    let dest = target(&mut fixture.types, fixture.x);
    fixture
        .types
        .set(&mut dest.pointee_mut().unwrap(), "Ui64", Value::uint64(9))
        .unwrap();
    let before = to_json(&fixture.types, &dest);

    let nil_x = fixture.types.zero(fixture.x_ptr).unwrap();
    assert!(map(&fixture.types, Some(&nil_x), Some(&dest), &[]).is_err());
    assert!(map(&fixture.types, None, Some(&dest), &[MapOptions::strict()]).is_err());

    assert_eq!(to_json(&fixture.types, &dest), before);
}

// ============================================================================
// IDENTICAL AND CROSS-TYPE MAPPING
// ============================================================================

#[test]
fn test_x_to_x_copies_private_fields_and_shares_references() {
    let mut fixture = common();
    let dest = target(&mut fixture.types, fixture.x);
    let source = sample_x(&fixture);
    let types = &fixture.types;

    map(types, Some(&source), Some(&dest), &[]).unwrap();

    assert_eq!(types.get(&dest, "Ui64").unwrap().as_uint(), Some(123));
    assert_eq!(types.get(&dest, "i64").unwrap().as_int(), Some(321));

    let source_a = types.get(&source, "A").unwrap();
    let dest_a = types.get(&dest, "A").unwrap();
    assert_eq!(types.get(&dest_a, "Name").unwrap().as_str(), Some("Abc"));

    let source_zone = types.get(&source_a, "zone").unwrap();
    let dest_zone = types.get(&dest_a, "zone").unwrap();
    assert!(dest_zone.shares_reference_with(&source_zone));

    types.push(&source_zone, Value::string("e")).unwrap();
    assert_eq!(dest_zone.len(), 5);
}

#[test]
fn test_x_to_pointer_field_in_loose_mode() {
    let mut fixture = common();
    let dest = target(&mut fixture.types, fixture.x_pointer_field);
    let source = sample_x(&fixture);
    let types = &fixture.types;

    map(types, Some(&source), Some(&dest), &[MapOptions::loose()]).unwrap();

    assert_eq!(types.get(&dest, "Ui64").unwrap().as_uint(), Some(123));
    // Private fields do not cross distinct types.
    assert_eq!(types.get(&dest, "i64").unwrap().as_int(), Some(0));

    let dest_a = types.get(&dest, "A").unwrap();
    assert!(!dest_a.is_nil());
    assert_eq!(types.get(&dest_a, "Name").unwrap().as_str(), Some("Abc"));
    let zone = types.get(&dest_a, "zone").unwrap();
    assert_eq!(zone.len(), 4);

    assert_eq!(
        to_json(types, &dest),
        json!({ "Ui64": 123, "A": { "Name": "Abc" } })
    );
}

#[test]
fn test_x_to_pointer_field_in_strict_mode_fails() {
    let mut fixture = common();
    let dest = target(&mut fixture.types, fixture.x_pointer_field);
    let source = sample_x(&fixture);

    let err = map(&fixture.types, Some(&source), Some(&dest), &[MapOptions::strict()]).unwrap_err();
    assert_eq!(
        err,
        Error::UnsettableField {
            field: "i64".to_string(),
            source_type: "X".to_string(),
            dest_type: "XPointerField".to_string(),
        }
    );
    assert_eq!(err.kind(), ErrorKind::OptionalField);
}

#[test]
fn test_y_to_z_allocates_nested_pointers() {
    let mut fixture = common();
    let dest = target(&mut fixture.types, fixture.z);
    let types = &fixture.types;

    let address = types
        .new_struct(fixture.c, [("address", Value::string("istanbul"))])
        .unwrap();
    let b = types.new_struct(fixture.b, [("C", address)]).unwrap();
    let source = types.new_struct(fixture.y, [("In", b)]).unwrap();

    map(types, Some(&source), Some(&dest), &[]).unwrap();

    let inner = types.get(&dest, "In").unwrap();
    let c = types.get(&inner, "C").unwrap();
    assert_eq!(types.get(&c, "address").unwrap().as_str(), Some("istanbul"));
}

#[test]
fn test_string_field_into_struct_field_fails() {
    let mut fixture = common();
    let dest = target(&mut fixture.types, fixture.e);
    let zones = fixture.types.lookup("[]string").unwrap();
    let types = &fixture.types;

    let source = types
        .new_struct(
            fixture.a,
            [
                ("Name", Value::string("istanbul")),
                ("zone", types.new_sequence(zones, Vec::new()).unwrap()),
            ],
        )
        .unwrap();

    let err = map(types, Some(&source), Some(&dest), &[]).unwrap_err();
    assert_eq!(
        err,
        Error::ShapeMismatch {
            expected: Kind::Struct,
            source_type: "string".to_string(),
            dest_type: "Z".to_string(),
        }
    );
}

#[test]
fn test_nil_string_pointer_into_struct_field_fails() {
    let mut fixture = common();
    let dest = target(&mut fixture.types, fixture.e);
    let source = fixture.types.zero(fixture.f).unwrap();

    let err = map(&fixture.types, Some(&source), Some(&dest), &[]).unwrap_err();
    assert!(matches!(
        err,
        Error::ShapeMismatch {
            expected: Kind::Struct,
            ..
        }
    ));
    assert!(!err.is_skippable());
}

// ============================================================================
// LOOSE VERSUS STRICT
// ============================================================================

fn profile_types() -> (Types, TypeId, TypeId) {
    let mut types = Types::new();
    let profile = types
        .structure(
            "Profile",
            [
                FieldDef::public("Email", TypeId::STRING),
                FieldDef::public("Age", TypeId::INT),
            ],
        )
        .unwrap();
    let profile_dto = types
        .structure(
            "ProfileDto",
            [
                FieldDef::public("Email", TypeId::STRING),
                FieldDef::public("Age", TypeId::INT),
                FieldDef::public("Nickname", TypeId::STRING),
            ],
        )
        .unwrap();
    (types, profile, profile_dto)
}

#[test]
fn test_missing_field_diverges_between_modes() {
    let (mut types, profile, profile_dto) = profile_types();
    let loose_dest = target(&mut types, profile_dto);
    let strict_dest = target(&mut types, profile_dto);
    let source = types
        .new_struct(
            profile,
            [("Email", Value::string("a@b.c")), ("Age", Value::int(30))],
        )
        .unwrap();

    map(&types, Some(&source), Some(&loose_dest), &[]).unwrap();
    assert_eq!(
        to_json(&types, &loose_dest),
        json!({ "Email": "a@b.c", "Age": 30, "Nickname": "" })
    );

    let err = map(&types, Some(&source), Some(&strict_dest), &[MapOptions::strict()]).unwrap_err();
    assert_eq!(
        err,
        Error::FieldNotFound {
            field: "Nickname".to_string(),
            source_type: "Profile".to_string(),
            dest_type: "ProfileDto".to_string(),
        }
    );
}

#[test]
fn test_private_source_field_does_not_cross_types() {
    let mut types = Types::new();
    let account = types
        .structure(
            "Account",
            [
                FieldDef::public("Id", TypeId::INT),
                FieldDef::private("Secret", TypeId::STRING),
            ],
        )
        .unwrap();
    let account_dto = types
        .structure(
            "AccountDto",
            [
                FieldDef::public("Id", TypeId::INT),
                FieldDef::public("Secret", TypeId::STRING),
            ],
        )
        .unwrap();
    let loose_dest = target(&mut types, account_dto);
    let strict_dest = target(&mut types, account_dto);
    let source = types
        .new_struct(
            account,
            [("Id", Value::int(7)), ("Secret", Value::string("hunter2"))],
        )
        .unwrap();

    map(&types, Some(&source), Some(&loose_dest), &[]).unwrap();
    assert_eq!(
        to_json(&types, &loose_dest),
        json!({ "Id": 7, "Secret": "" })
    );

    let err = map(&types, Some(&source), Some(&strict_dest), &[MapOptions::strict()]).unwrap_err();
    assert_eq!(
        err,
        Error::FieldNotFound {
            field: "Secret".to_string(),
            source_type: "Account".to_string(),
            dest_type: "AccountDto".to_string(),
        }
    );
    assert_eq!(types.get(&strict_dest, "Secret").unwrap().as_str(), Some(""));

    // The same source still copies whole onto its own type.
    let same = target(&mut types, account);
    map(&types, Some(&source), Some(&same), &[MapOptions::strict()]).unwrap();
    assert_eq!(types.get(&same, "Secret").unwrap().as_str(), Some("hunter2"));
}

#[test]
fn test_mapper_handle_is_reusable() {
    let (mut types, profile, profile_dto) = profile_types();
    let targets: Vec<Value> = (0..3).map(|_| target(&mut types, profile)).collect();
    let mapper = Mapper::new(&types, MapOptions::strict());

    for (age, dest) in targets.iter().enumerate() {
        let source = types
            .new_struct(
                profile_dto,
                [
                    ("Email", Value::string(format!("user{}@example.com", age))),
                    ("Age", Value::int(age as i64)),
                ],
            )
            .unwrap();
        mapper.map(Some(&source), Some(dest)).unwrap();
    }

    assert_eq!(
        to_json(&types, &targets[2]),
        json!({ "Email": "user2@example.com", "Age": 2 })
    );
}

// ============================================================================
// EMBEDDED PROMOTION
// ============================================================================

struct Audited {
    types: Types,
    audit: TypeId,
    customer: TypeId,
    customer_dto: TypeId,
}

fn audited() -> Audited {
    let mut types = Types::new();
    let audit = types
        .structure("Audit", [FieldDef::public("CreatedBy", TypeId::STRING)])
        .unwrap();
    let audit_ptr = types.pointer(audit);
    let customer = types
        .structure(
            "Customer",
            [
                FieldDef::embedded(audit_ptr),
                FieldDef::public("Name", TypeId::STRING),
            ],
        )
        .unwrap();
    let customer_dto = types
        .structure(
            "CustomerDto",
            [
                FieldDef::public("CreatedBy", TypeId::STRING),
                FieldDef::public("Name", TypeId::STRING),
            ],
        )
        .unwrap();
    Audited {
        types,
        audit,
        customer,
        customer_dto,
    }
}

#[test]
fn test_promoted_field_is_read_through_embedded_pointer() {
    let mut fixture = audited();
    let dest = target(&mut fixture.types, fixture.customer_dto);
    let types = &fixture.types;

    let audit_ptr = types.lookup("*Audit").unwrap();
    let audit = types
        .new_struct(fixture.audit, [("CreatedBy", Value::string("ops"))])
        .unwrap();
    let source = types
        .new_struct(
            fixture.customer,
            [
                ("Audit", types.new_pointer(audit_ptr, audit).unwrap()),
                ("Name", Value::string("Acme")),
            ],
        )
        .unwrap();

    map(types, Some(&source), Some(&dest), &[MapOptions::strict()]).unwrap();
    assert_eq!(
        to_json(types, &dest),
        json!({ "CreatedBy": "ops", "Name": "Acme" })
    );
}

#[test]
fn test_field_behind_nil_embedded_pointer_is_skipped_in_both_modes() {
    let mut fixture = audited();
    let source = fixture
        .types
        .new_struct(fixture.customer, [("Name", Value::string("Acme"))])
        .unwrap();

    for options in [MapOptions::loose(), MapOptions::strict()] {
        let dest = target(&mut fixture.types, fixture.customer_dto);
        map(&fixture.types, Some(&source), Some(&dest), &[options]).unwrap();
        assert_eq!(
            to_json(&fixture.types, &dest),
            json!({ "CreatedBy": "", "Name": "Acme" })
        );
    }
}

#[test]
fn test_embedded_destination_is_filled_from_flat_source() {
    let mut fixture = audited();
    let dest = target(&mut fixture.types, fixture.customer);
    let types = &fixture.types;

    let source = types
        .new_struct(
            fixture.customer_dto,
            [
                ("CreatedBy", Value::string("ops")),
                ("Name", Value::string("Acme")),
            ],
        )
        .unwrap();

    map(types, Some(&source), Some(&dest), &[MapOptions::strict()]).unwrap();
    assert_eq!(types.get(&dest, "CreatedBy").unwrap().as_str(), Some("ops"));
    assert_eq!(
        to_json(types, &dest),
        json!({ "Audit": { "CreatedBy": "ops" }, "Name": "Acme" })
    );
}

// ============================================================================
// FAULT BOUNDARY
// ============================================================================

#[test]
fn test_fault_beneath_a_field_is_reported_with_its_name() {
    let mut types = Types::new();
    let mirror = types
        .structure("Mirror", [FieldDef::public("Name", TypeId::STRING)])
        .unwrap();
    let mirror_ptr = types.pointer(mirror);
    let node = types
        .structure(
            "Node",
            [
                FieldDef::public("Name", TypeId::STRING),
                FieldDef::public("Mirror", mirror_ptr),
            ],
        )
        .unwrap();
    let node_ptr = types.pointer(node);
    let envelope = types
        .structure(
            "Envelope",
            [
                FieldDef::public("Name", TypeId::STRING),
                FieldDef::public("Mirror", node_ptr),
            ],
        )
        .unwrap();

    let dest = target(&mut types, node);
    // The source reaches back into the cell being written.
    let source = types
        .new_struct(
            envelope,
            [("Name", Value::string("outer")), ("Mirror", dest.clone())],
        )
        .unwrap();

    let err = map(&types, Some(&source), Some(&dest), &[]).unwrap_err();
    match &err {
        Error::Fault {
            field,
            source_type,
            dest_type,
            message,
        } => {
            assert_eq!(field.as_deref(), Some("Mirror"));
            assert_eq!(source_type, "Envelope");
            assert_eq!(dest_type, "Node");
            assert!(!message.is_empty());
        }
        other => panic!("expected a fault, got {:?}", other),
    }
    assert_eq!(err.kind(), ErrorKind::Fault);

    // Fields before the faulting one were written and the cell is released.
    assert_eq!(types.get(&dest, "Name").unwrap().as_str(), Some("outer"));
}
