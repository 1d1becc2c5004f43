//! Integration test: construction modes, commitment round trips and the
//! disclosure contract, against the sample registry under `registry/` and
//! small inline registries.

use std::path::PathBuf;

use proptest::prelude::*;
use serde_json::json;
use uca_attribute::{
    collect_attestable_values, parse_commitment, verify_commitment, AttestableValue,
    AttributeFactory, AttributeInstance, ConstructionInput,
};
use uca_core::{LeafType, PrimitiveValue, UcaError};
use uca_schema::DefinitionRegistry;

fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

fn sample_registry() -> DefinitionRegistry {
    DefinitionRegistry::load(&repo_root().join("registry").join("identity.yaml"))
        .expect("sample registry loads")
}

fn commitment_of(instance: &AttributeInstance) -> ConstructionInput {
    ConstructionInput::Commitment(instance.attestable_value())
}

/// Rebuilds `a` from its commitment and checks every round-trip property.
fn assert_round_trip(registry: &DefinitionRegistry, a: &AttributeInstance) -> AttributeInstance {
    let b = AttributeFactory::new(registry)
        .construct(a.identifier().as_str(), commitment_of(a), Some(a.version()))
        .unwrap();
    assert_eq!(b.value_json(), a.value_json());
    assert_eq!(b.salt(), a.salt());
    assert_eq!(b.attestable_value(), a.attestable_value());
    assert_eq!(b.id(), a.id());
    assert!(b.timestamp().is_none());
    b
}

trait ValueJson {
    fn value_json(&self) -> serde_json::Value;
}

impl ValueJson for AttributeInstance {
    /// Value tree without timestamps, which reconstruction drops.
    fn value_json(&self) -> serde_json::Value {
        match self.children() {
            Some(children) => children
                .iter()
                .map(|(k, c)| (k.clone(), json!({"salt": c.salt(), "value": c.value_json()})))
                .collect::<serde_json::Map<_, _>>()
                .into(),
            None => self.primitive().map(PrimitiveValue::to_json).unwrap_or_default(),
        }
    }
}

// -- Scenario: ns:Person:age ------------------------------------------------

#[test]
fn age_scenario() {
    let registry = sample_registry();
    let factory = AttributeFactory::new(&registry);

    let age = factory.construct_json("ns:Person:age", &json!(42), None).unwrap();
    assert_eq!(age.leaf_type(), LeafType::Number);
    assert_eq!(age.primitive(), Some(&PrimitiveValue::Number(42.0)));
    assert_eq!(
        age.attestable_value(),
        format!("urn:age:{}:00000042", age.salt())
    );

    for bad in [json!(-1), json!(200)] {
        let err = factory.construct_json("ns:Person:age", &bad, None).unwrap_err();
        assert!(matches!(err, UcaError::InvalidValue { .. }), "{bad}");
    }
}

#[test]
fn age_round_trip() {
    let registry = sample_registry();
    let age = AttributeFactory::new(&registry)
        .construct_json("ns:Person:age", &json!(42), None)
        .unwrap();
    assert!(age.timestamp().is_some());
    assert_round_trip(&registry, &age);
}

// -- Scenario: ns:Person:name -----------------------------------------------

#[test]
fn name_scenario() {
    let registry = sample_registry();
    let name = AttributeFactory::new(&registry)
        .construct_json("ns:Person:name", &json!({"first": "Ann", "last": "Lee"}), None)
        .unwrap();
    let s1 = name.child("first").unwrap().salt();
    let s2 = name.child("last").unwrap().salt();
    let expected = format!("urn:first:{s1}:Ann|urn:last:{s2}:Lee|");
    assert_eq!(name.attestable_value(), expected);
    assert_eq!(
        collect_attestable_values(&name),
        vec![AttestableValue {
            identifier: "ns:Person:name".into(),
            value: expected.clone(),
        }]
    );
    assert!(verify_commitment(&name, &expected));
    assert!(!verify_commitment(&name, "urn:first:x:Ann|urn:last:y:Lee|"));
    assert_round_trip(&registry, &name);
}

// -- Required fields and unknown identifiers --------------------------------

#[test]
fn required_fields_enforced() {
    let registry = sample_registry();
    let factory = AttributeFactory::new(&registry);

    let err = factory
        .construct_json("ns:Person:name", &json!({"first": "Ann"}), None)
        .unwrap_err();
    assert_eq!(
        err,
        UcaError::MissingRequiredField {
            identifier: "ns:Person:name".into(),
            field: "last".into()
        }
    );

    // All required plus one optional.
    let name = factory
        .construct_json(
            "ns:Identity:name",
            &json!({"givenNames": "Ann", "familyNames": "Lee", "otherNames": "Marie"}),
            None,
        )
        .unwrap();
    assert_eq!(name.children().unwrap().len(), 3);
}

#[test]
fn unknown_identifier() {
    let registry = sample_registry();
    let err = AttributeFactory::new(&registry)
        .construct_json("nonexistent:id", &json!("anything"), None)
        .unwrap_err();
    assert_eq!(
        err,
        UcaError::UnknownIdentifier {
            identifier: "nonexistent:id".into(),
            version: None
        }
    );
}

#[test]
fn explicit_version_selects_definition() {
    let registry = sample_registry();
    let factory = AttributeFactory::new(&registry);
    // Version 1 does not require a dotted domain; version 2 does.
    let v1 = factory
        .construct_json("ns:Contact:email", &json!("ann@example"), Some("1"))
        .unwrap();
    assert!(v1.id().starts_with("1:ns:Contact:email:"));
    let err = factory
        .construct_json("ns:Contact:email", &json!("ann@example"), Some("2"))
        .unwrap_err();
    assert!(matches!(err, UcaError::InvalidValue { .. }));
    let err = factory
        .construct_json("ns:Contact:email", &json!("ann@example.org"), Some("3"))
        .unwrap_err();
    assert!(matches!(err, UcaError::UnknownIdentifier { version: Some(_), .. }));
}

#[test]
fn separator_in_string_is_rejected() {
    let registry = sample_registry();
    let err = AttributeFactory::new(&registry)
        .construct_json("ns:Name:otherNames", &json!("a|b"), None)
        .unwrap_err();
    assert!(matches!(err, UcaError::InvalidValue { .. }));
}

// -- Salts ------------------------------------------------------------------

#[test]
fn independent_constructions_differ() {
    let registry = sample_registry();
    let factory = AttributeFactory::new(&registry);
    let a = factory.construct_json("ns:Person:age", &json!(42), None).unwrap();
    let b = factory.construct_json("ns:Person:age", &json!(42), None).unwrap();
    assert_ne!(a.salt(), b.salt());
    assert_ne!(a.attestable_value(), b.attestable_value());
    assert_ne!(a.id(), b.id());
}

// -- Nested objects ---------------------------------------------------------

#[test]
fn deep_composite_round_trip() {
    let registry = sample_registry();
    let person = AttributeFactory::new(&registry)
        .construct_json(
            "ns:Identity:person",
            &json!({
                "name": {"givenNames": "Ann", "familyNames": "Lee"},
                "dateOfBirth": {"day": 1, "month": 2, "year": 1990},
                "verified": true
            }),
            None,
        )
        .unwrap();

    let commitment = person.attestable_value();
    // Nested commitments are flattened: no empty interior segments.
    assert!(!commitment.contains("||"));
    let names: Vec<String> = parse_commitment(&commitment)
        .unwrap()
        .into_iter()
        .map(|c| c.property_name)
        .collect();
    assert_eq!(
        names,
        vec!["day", "month", "year", "familyNames", "givenNames", "verified"]
    );
    assert!(commitment.contains(":00001990|"));

    let rebuilt = assert_round_trip(&registry, &person);
    let dob = rebuilt.child("dateOfBirth").unwrap();
    assert_eq!(dob.identifier().as_str(), "ns:Identity:dateOfBirth");
    assert_eq!(
        dob.child("year").unwrap().primitive(),
        Some(&PrimitiveValue::Number(1990.0))
    );
    assert_eq!(rebuilt.child("verified").unwrap().identifier().as_str(), "ns:Identity:person.verified");
}

#[test]
fn unknown_segment_in_composite() {
    let registry = sample_registry();
    let err = AttributeFactory::new(&registry)
        .construct(
            "ns:Person:name",
            ConstructionInput::Commitment("urn:first:a:Ann|urn:last:b:Lee|urn:nick:c:Al|".into()),
            None,
        )
        .unwrap_err();
    assert_eq!(
        err,
        UcaError::UnknownChildProperty {
            identifier: "ns:Person:name".into(),
            property: "nick".into()
        }
    );
}

#[test]
fn malformed_commitments_rejected() {
    let registry = sample_registry();
    let factory = AttributeFactory::new(&registry);
    for bad in ["", "urn:age:salt", "urn:age:s:notanumber", "age:s:00000001"] {
        let err = factory
            .construct("ns:Person:age", ConstructionInput::Commitment(bad.into()), None)
            .unwrap_err();
        assert!(matches!(err, UcaError::MalformedCommitment(_)), "{bad:?}");
    }
}

// -- Sibling objects sharing leaf names ---------------------------------------

fn document_registry() -> DefinitionRegistry {
    DefinitionRegistry::from_json_str(
        &json!([
            {"identifier": "ns:Type:day", "type": "Number", "minimum": 1, "maximum": 31},
            {"identifier": "ns:Type:year", "type": "Number"},
            {"identifier": "ns:Type:date", "type": {"properties": [
                {"name": "day", "type": "ns:Type:day"},
                {"name": "year", "type": "ns:Type:year"}
            ]}},
            {"identifier": "ns:Document:doc", "type": {"properties": [
                {"name": "dateOfBirth", "type": "ns:Type:date"},
                {"name": "dateOfExpiry", "type": "ns:Type:date"}
            ]}},
            {"identifier": "ns:Document:stamp", "type": {"properties": [
                {"name": "a", "type": "ns:Type:date"},
                {"name": "z", "type": "ns:Type:day"}
            ], "required": ["z"]}}
        ])
        .to_string(),
    )
    .unwrap()
}

#[test]
fn sibling_objects_of_same_type_round_trip() {
    let registry = document_registry();
    let doc = AttributeFactory::new(&registry)
        .construct_json(
            "ns:Document:doc",
            &json!({
                "dateOfBirth": {"day": 1, "year": 1990},
                "dateOfExpiry": {"day": 2, "year": 2030}
            }),
            None,
        )
        .unwrap();
    let rebuilt = assert_round_trip(&registry, &doc);
    let year = |key: &str| rebuilt.child(key).unwrap().child("year").unwrap().primitive().cloned();
    assert_eq!(year("dateOfBirth"), Some(PrimitiveValue::Number(1990.0)));
    assert_eq!(year("dateOfExpiry"), Some(PrimitiveValue::Number(2030.0)));
}

#[test]
fn leaf_name_shared_with_nested_object() {
    let registry = document_registry();
    let stamp = AttributeFactory::new(&registry)
        .construct_json(
            "ns:Document:stamp",
            &json!({"a": {"day": 1, "year": 1990}, "z": 9}),
            None,
        )
        .unwrap();
    let rebuilt = assert_round_trip(&registry, &stamp);
    assert_eq!(
        rebuilt.child("z").unwrap().primitive(),
        Some(&PrimitiveValue::Number(9.0))
    );
    assert_eq!(
        rebuilt.child("z").unwrap().salt(),
        stamp.child("z").unwrap().salt()
    );
}

#[test]
fn absent_optional_object_does_not_claim_leaf() {
    let registry = document_registry();
    let stamp = AttributeFactory::new(&registry)
        .construct_json("ns:Document:stamp", &json!({"z": 9}), None)
        .unwrap();
    let rebuilt = assert_round_trip(&registry, &stamp);
    assert!(rebuilt.child("a").is_none());
}

// -- Pathological registries -------------------------------------------------

#[test]
fn self_referencing_object_hits_depth_limit() {
    let registry = DefinitionRegistry::from_json_str(
        &json!([
            {"identifier": "ns:Tree:node", "type": {"properties": [
                {"name": "child", "type": "ns:Tree:node"},
                {"name": "label", "type": "String"}
            ]}}
        ])
        .to_string(),
    )
    .unwrap();
    assert!(registry.check_integrity().is_err());

    let mut input = json!({"label": "leaf"});
    for _ in 0..20 {
        input = json!({"child": input, "label": "x"});
    }
    let err = AttributeFactory::new(&registry)
        .construct_json("ns:Tree:node", &input, None)
        .unwrap_err();
    assert!(matches!(err, UcaError::DepthExceeded { .. }));
}

#[test]
fn cyclic_type_reference_fails_construction() {
    let registry = DefinitionRegistry::from_json_str(
        &json!([
            {"identifier": "ns:Loop:a", "type": "ns:Loop:b"},
            {"identifier": "ns:Loop:b", "type": "ns:Loop:a"}
        ])
        .to_string(),
    )
    .unwrap();
    let err = AttributeFactory::new(&registry)
        .construct_json("ns:Loop:a", &json!("x"), None)
        .unwrap_err();
    assert!(matches!(err, UcaError::DepthExceeded { .. }));
}

// -- Properties --------------------------------------------------------------

fn pair_registry() -> DefinitionRegistry {
    DefinitionRegistry::from_json_str(
        &json!([
            {"identifier": "ns:Pair:value", "type": {"properties": [
                {"name": "a", "type": "Number"},
                {"name": "b", "type": "String"},
                {"name": "c", "type": "Boolean"}
            ]}}
        ])
        .to_string(),
    )
    .unwrap()
}

proptest! {
    #[test]
    fn raw_leaves_round_trip(n in -9_999_999i64..99_999_999) {
        let registry = DefinitionRegistry::from_json_str(
            &json!([{"identifier": "ns:Any:count", "type": "Number"}]).to_string(),
        )
        .unwrap();
        let a = AttributeFactory::new(&registry)
            .construct("ns:Any:count", PrimitiveValue::from(n).into(), None)
            .unwrap();
        let b = AttributeFactory::new(&registry)
            .construct("ns:Any:count", commitment_of(&a), None)
            .unwrap();
        prop_assert_eq!(b.primitive(), Some(&PrimitiveValue::Number(n as f64)));
        prop_assert_eq!(b.id(), a.id());
    }

    #[test]
    fn commitment_independent_of_input_order(a in 0i64..1000, b in "[a-z]{1,8}", c in any::<bool>()) {
        let registry = pair_registry();
        let factory = AttributeFactory::new(&registry);
        let original = factory
            .construct_json("ns:Pair:value", &json!({"a": a, "b": b, "c": c}), None)
            .unwrap();

        // Reuse the original salts by passing each child as a commitment,
        // spelled once in ascending and once in descending key order.
        let field = |key: &str| {
            let commitment = original.child(key).unwrap().attestable_value();
            format!("{key:?}: {{\"attestableValue\": {}}}", serde_json::to_string(&commitment).unwrap())
        };
        let forward = format!("{{{}, {}, {}}}", field("a"), field("b"), field("c"));
        let backward = format!("{{{}, {}, {}}}", field("c"), field("b"), field("a"));
        let forward: serde_json::Value = serde_json::from_str(&forward).unwrap();
        let backward: serde_json::Value = serde_json::from_str(&backward).unwrap();

        let x = factory.construct_json("ns:Pair:value", &forward, None).unwrap();
        let y = factory.construct_json("ns:Pair:value", &backward, None).unwrap();
        prop_assert_eq!(x.attestable_value(), original.attestable_value());
        prop_assert_eq!(y.attestable_value(), original.attestable_value());
        prop_assert_eq!(y.id(), original.id());
    }
}
