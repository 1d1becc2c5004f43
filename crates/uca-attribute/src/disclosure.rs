//! # Disclosure and Flattening
//!
//! [`collect_attestable_values`] hands a verifier the commitments of the
//! attributes flagged disclosable (`attestable` or `credentialItem`).
//! Only an emitted node descends into its children, so an unflagged
//! composite hides its whole subtree.
//!
//! [`plain_value`] turns an instance back into the JSON shape it was built
//! from.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::attribute::{AttributeInstance, AttributeValue};

/// A disclosed commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttestableValue {
    /// Identifier of the disclosed attribute.
    pub identifier: String,
    /// Its canonical commitment.
    pub value: String,
}

/// Commitments of every disclosable node reachable through disclosable
/// ancestors, in pre-order with children in key order.
pub fn collect_attestable_values(instance: &AttributeInstance) -> Vec<AttestableValue> {
    let mut out = Vec::new();
    collect_into(instance, &mut out);
    out
}

fn collect_into(instance: &AttributeInstance, out: &mut Vec<AttestableValue>) {
    if !instance.is_disclosable() {
        return;
    }
    out.push(AttestableValue {
        identifier: instance.identifier().to_string(),
        value: instance.attestable_value(),
    });
    if let Some(children) = instance.children() {
        for child in children.values() {
            collect_into(child, out);
        }
    }
}

/// Plain JSON value of `instance`.
///
/// A leaf under a `hint` becomes `{hint: value}`; without one, a credential
/// item becomes `{identifier: value}` and anything else the bare value. A
/// composite merges its children, each keyed by its property name, and is
/// wrapped under `hint` when one is given.
pub fn plain_value(instance: &AttributeInstance, hint: Option<&str>) -> Value {
    match instance.value() {
        AttributeValue::Primitive(value) => {
            let value = value.to_json();
            match hint {
                Some(key) => single(key, value),
                None if instance.is_credential_item() => {
                    single(instance.identifier().as_str(), value)
                }
                None => value,
            }
        }
        AttributeValue::Composite(children) => {
            let mut merged = Map::new();
            for (key, child) in children {
                if let Value::Object(fields) = plain_value(child, Some(key.as_str())) {
                    merged.extend(fields);
                }
            }
            match hint {
                Some(key) => single(key, Value::Object(merged)),
                None => Value::Object(merged),
            }
        }
    }
}

fn single(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}
