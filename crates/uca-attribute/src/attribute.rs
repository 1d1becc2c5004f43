//! # Attribute Instances
//!
//! An [`AttributeInstance`] is a typed, salted value (leaf or composite) with
//! a derived content identifier. Instances are built only through
//! [`AttributeFactory`], in one of three modes selected by the
//! [`ConstructionInput`] variant:
//!
//! - **Commitment**: rebuild from a previously issued commitment. Salts and
//!   values are copied from the wire; no randomness is drawn and no
//!   timestamp is set.
//! - **Raw**: a primitive value is type-checked, validated against the
//!   definition's constraints, given a fresh salt and the current time.
//! - **Nested**: a mapping of property name to input; every child is built
//!   recursively from its property's definition.
//!
//! Any failure aborts the whole tree. The content identifier is computed
//! last, after every descendant is final.
//!
//! ## Child Matching in Commitments
//!
//! A segment carries only the attestable name of its leaf, and a composite
//! serializes its children in ascending key order. Rebuilding walks the
//! declared properties in that same order: a primitive property takes one
//! segment with exactly its name, a nested-object property takes a run of
//! segments named after its descendant leaves. When more than one split is
//! possible the longest share is tried first, and a share is kept only if
//! the child rebuilds from it and every required property ends up filled.
//!
//! A composite always has at least one child, so its commitment is never
//! empty.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use uca_core::{
    generate_salt, sha256_hex, Identifier, LeafType, PrimitiveValue, Timestamp, UcaError,
    UcaResult,
};
use uca_schema::{
    check_value, descendant_leaf_names, resolve_concrete_type, resolve_property, ConcreteType,
    Definition, DefinitionRegistry, ObjectSchema, Resolved, MAX_RESOLUTION_DEPTH,
};

use crate::commitment::{
    self, decode_value, parse_commitment, CommitmentComponent, SEGMENT_SEPARATOR,
};

/// Input to [`AttributeFactory::construct`]; the variant selects the mode.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstructionInput {
    /// A previously issued commitment string.
    Commitment(String),
    /// A raw primitive value.
    Raw(PrimitiveValue),
    /// Child inputs keyed by property name.
    Nested(BTreeMap<String, ConstructionInput>),
}

impl ConstructionInput {
    /// JSON key that marks an object as a commitment.
    pub const COMMITMENT_KEY: &'static str = "attestableValue";

    /// Classify a JSON value.
    ///
    /// An object whose only key is `attestableValue` with a string value is
    /// a commitment; strings, numbers and booleans are raw values; any other
    /// object is nested input. `null` and arrays are rejected.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, String> {
        use serde_json::Value;
        match value {
            Value::Object(map) => {
                if map.len() == 1 {
                    if let Some(Value::String(s)) = map.get(Self::COMMITMENT_KEY) {
                        return Ok(Self::Commitment(s.clone()));
                    }
                }
                map.iter()
                    .map(|(k, v)| {
                        Self::from_json(v)
                            .map(|input| (k.clone(), input))
                            .map_err(|reason| format!("{k}: {reason}"))
                    })
                    .collect::<Result<BTreeMap<_, _>, _>>()
                    .map(Self::Nested)
            }
            Value::Null => Err("null is not a valid attribute value".to_string()),
            Value::Array(_) => Err("arrays are not valid attribute values".to_string()),
            scalar => PrimitiveValue::from_json(scalar)
                .map(Self::Raw)
                .ok_or_else(|| format!("unsupported value {scalar}")),
        }
    }

    fn mode(&self) -> &'static str {
        match self {
            Self::Commitment(_) => "commitment",
            Self::Raw(_) => "raw",
            Self::Nested(_) => "nested",
        }
    }
}

impl From<PrimitiveValue> for ConstructionInput {
    fn from(value: PrimitiveValue) -> Self {
        Self::Raw(value)
    }
}

/// Value of an instance: a primitive, or owned children keyed by property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Leaf value.
    Primitive(PrimitiveValue),
    /// Children, iterated in ascending key order.
    Composite(BTreeMap<String, AttributeInstance>),
}

/// A constructed attribute. Immutable; built only by [`AttributeFactory`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeInstance {
    identifier: Identifier,
    version: String,
    #[serde(rename = "type")]
    leaf_type: LeafType,
    value: AttributeValue,
    salt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<Timestamp>,
    credential_item: bool,
    attestable: bool,
    id: String,
}

impl AttributeInstance {
    /// Shorthand for [`AttributeFactory::construct`].
    pub fn construct(
        registry: &DefinitionRegistry,
        identifier: &str,
        input: ConstructionInput,
        version: Option<&str>,
    ) -> UcaResult<Self> {
        AttributeFactory::new(registry).construct(identifier, input, version)
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Resolved leaf type.
    pub fn leaf_type(&self) -> LeafType {
        self.leaf_type
    }

    pub fn value(&self) -> &AttributeValue {
        &self.value
    }

    /// The primitive value, for leaves.
    pub fn primitive(&self) -> Option<&PrimitiveValue> {
        match &self.value {
            AttributeValue::Primitive(v) => Some(v),
            AttributeValue::Composite(_) => None,
        }
    }

    /// Children keyed by property name, for composites.
    pub fn children(&self) -> Option<&BTreeMap<String, AttributeInstance>> {
        match &self.value {
            AttributeValue::Composite(children) => Some(children),
            AttributeValue::Primitive(_) => None,
        }
    }

    /// Child by property name.
    pub fn child(&self, property: &str) -> Option<&AttributeInstance> {
        self.children().and_then(|c| c.get(property))
    }

    /// Leaf salt. For composites, the hex digest of the composite's own
    /// commitment; it never appears on the wire.
    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// Set only for leaves built from a raw value.
    pub fn timestamp(&self) -> Option<Timestamp> {
        self.timestamp
    }

    /// `"{version}:{identifier}:{hex(sha256(commitment))}"`.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_credential_item(&self) -> bool {
        self.credential_item
    }

    pub fn is_attestable(&self) -> bool {
        self.attestable
    }

    /// True when the commitment is handed out on disclosure.
    pub fn is_disclosable(&self) -> bool {
        self.credential_item || self.attestable
    }

    /// Canonical commitment; see [`commitment::canonical_attestable_value`].
    pub fn attestable_value(&self) -> String {
        commitment::canonical_attestable_value(self)
    }
}

/// Builds [`AttributeInstance`]s against a borrowed registry.
#[derive(Debug, Clone, Copy)]
pub struct AttributeFactory<'r> {
    registry: &'r DefinitionRegistry,
}

impl<'r> AttributeFactory<'r> {
    pub fn new(registry: &'r DefinitionRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r DefinitionRegistry {
        self.registry
    }

    /// Build an instance of `identifier` (at `version`, else the first
    /// registered version) from `input`.
    ///
    /// # Errors
    ///
    /// Any [`UcaError`]; nothing is constructed on failure.
    pub fn construct(
        &self,
        identifier: &str,
        input: ConstructionInput,
        version: Option<&str>,
    ) -> UcaResult<AttributeInstance> {
        let definition = self.registry.lookup(identifier, version)?;
        self.build(definition, input, 0)
    }

    /// [`construct`](Self::construct) from JSON input, classified by
    /// [`ConstructionInput::from_json`].
    pub fn construct_json(
        &self,
        identifier: &str,
        input: &serde_json::Value,
        version: Option<&str>,
    ) -> UcaResult<AttributeInstance> {
        let input = ConstructionInput::from_json(input)
            .map_err(|reason| UcaError::invalid_value(identifier, reason))?;
        self.construct(identifier, input, version)
    }

    fn build(
        &self,
        definition: &Definition,
        input: ConstructionInput,
        depth: usize,
    ) -> UcaResult<AttributeInstance> {
        if depth >= MAX_RESOLUTION_DEPTH {
            return Err(UcaError::DepthExceeded {
                identifier: definition.identifier.to_string(),
                limit: MAX_RESOLUTION_DEPTH,
            });
        }
        let resolved = resolve_concrete_type(self.registry, definition)?;
        tracing::debug!(
            identifier = %definition.identifier,
            version = %definition.version,
            mode = input.mode(),
            depth,
            "constructing attribute"
        );

        match (input, resolved.concrete) {
            (ConstructionInput::Commitment(s), _) => {
                self.rebuild(definition, &resolved, &s, depth)
            }
            (ConstructionInput::Raw(value), ConcreteType::Primitive(leaf)) => {
                self.build_raw(definition, &resolved, leaf, value)
            }
            (ConstructionInput::Nested(inputs), ConcreteType::Object(schema)) => {
                self.build_nested(definition, schema, inputs, depth)
            }
            (ConstructionInput::Raw(value), ConcreteType::Object(_)) => Err(UcaError::invalid_value(
                definition.identifier.as_str(),
                format!("expected an object, got {}", value.leaf_type()),
            )),
            (ConstructionInput::Nested(_), ConcreteType::Primitive(leaf)) => {
                Err(UcaError::invalid_value(
                    definition.identifier.as_str(),
                    format!("expected {leaf}, got an object"),
                ))
            }
        }
    }

    fn build_raw(
        &self,
        definition: &Definition,
        resolved: &Resolved<'_>,
        leaf: LeafType,
        value: PrimitiveValue,
    ) -> UcaResult<AttributeInstance> {
        check_value(&value, leaf, resolved.constraints_for(definition))
            .map_err(|reason| UcaError::invalid_value(definition.identifier.as_str(), reason))?;
        Ok(assemble(
            definition,
            leaf,
            AttributeValue::Primitive(value),
            Some(generate_salt()),
            Some(Timestamp::now()),
        ))
    }

    fn build_nested(
        &self,
        definition: &Definition,
        schema: &ObjectSchema,
        inputs: BTreeMap<String, ConstructionInput>,
        depth: usize,
    ) -> UcaResult<AttributeInstance> {
        ensure_required(definition, schema, |name| inputs.contains_key(name))?;
        // An empty composite has an empty commitment, which cannot be parsed back.
        if inputs.is_empty() {
            return Err(UcaError::invalid_value(
                definition.identifier.as_str(),
                "an object needs at least one property value",
            ));
        }

        let mut children = BTreeMap::new();
        for (name, input) in inputs {
            let property = schema
                .property(&name)
                .ok_or_else(|| UcaError::UnknownChildProperty {
                    identifier: definition.identifier.to_string(),
                    property: name.clone(),
                })?;
            let child_definition = resolve_property(self.registry, definition, property)?;
            let child = self.build(&child_definition, input, depth + 1)?;
            children.insert(name, child);
        }
        Ok(assemble(
            definition,
            LeafType::Object,
            AttributeValue::Composite(children),
            None,
            None,
        ))
    }

    fn rebuild(
        &self,
        definition: &Definition,
        resolved: &Resolved<'_>,
        commitment: &str,
        depth: usize,
    ) -> UcaResult<AttributeInstance> {
        let components = parse_commitment(commitment)?;
        match resolved.concrete {
            ConcreteType::Primitive(leaf) => {
                let [component] = components.as_slice() else {
                    return Err(UcaError::malformed(format!(
                        "'{}' is a {leaf} leaf but the commitment has {} segments",
                        definition.identifier,
                        components.len()
                    )));
                };
                let expected = definition.identifier.attestable_name();
                if component.property_name != expected {
                    return Err(UcaError::malformed(format!(
                        "segment names '{}' but '{}' expects '{expected}'",
                        component.property_name, definition.identifier
                    )));
                }
                let value = decode_value(&component.value, leaf)?;
                Ok(assemble(
                    definition,
                    leaf,
                    AttributeValue::Primitive(value),
                    Some(component.salt.clone()),
                    None,
                ))
            }
            ConcreteType::Object(schema) => {
                let children = self.reconstruct_children(definition, schema, &components, depth)?;
                Ok(assemble(
                    definition,
                    LeafType::Object,
                    AttributeValue::Composite(children),
                    None,
                    None,
                ))
            }
        }
    }

    /// Distribute parsed segments over the declared properties and rebuild
    /// each child from its share.
    fn reconstruct_children(
        &self,
        definition: &Definition,
        schema: &ObjectSchema,
        components: &[CommitmentComponent],
        depth: usize,
    ) -> UcaResult<BTreeMap<String, AttributeInstance>> {
        let mut slots = Vec::with_capacity(schema.properties.len());
        for property in &schema.properties {
            let child = resolve_property(self.registry, definition, property)?;
            let leaf = matches!(
                resolve_concrete_type(self.registry, &child)?.concrete,
                ConcreteType::Primitive(_)
            );
            let names = descendant_leaf_names(self.registry, &child)?;
            slots.push(ChildSlot {
                property: property.name.as_str(),
                definition: child,
                names,
                leaf,
            });
        }
        // Children are serialized in ascending key order.
        slots.sort_by(|a, b| a.property.cmp(b.property));

        if let Some(stray) = components
            .iter()
            .find(|c| !slots.iter().any(|slot| slot.names.contains(&c.property_name)))
        {
            return Err(UcaError::UnknownChildProperty {
                identifier: definition.identifier.to_string(),
                property: stray.property_name.clone(),
            });
        }

        let mut placement = SharePlacement {
            factory: self,
            slots: &slots,
            components,
            required: &schema.required,
            depth,
            children: BTreeMap::new(),
            incomplete: None,
            failure: None,
        };
        if placement.place(0, 0)? {
            return Ok(placement.children);
        }
        if let Some(children) = &placement.incomplete {
            ensure_required(definition, schema, |name| children.contains_key(name))?;
        }
        Err(placement.failure.unwrap_or_else(|| {
            UcaError::malformed(format!(
                "segments do not map onto the properties of '{}' in key order",
                definition.identifier
            ))
        }))
    }
}

/// A declared property, ready to claim commitment segments.
struct ChildSlot<'a> {
    property: &'a str,
    definition: Cow<'a, Definition>,
    /// Attestable names of every leaf under the property.
    names: BTreeSet<String>,
    /// A primitive child claims exactly one segment.
    leaf: bool,
}

/// Backtracking assignment of segments to properties.
///
/// Slots are visited in key order. Each one either takes the next run of
/// segments (longest first, and only if the child rebuilds from it) or is
/// left absent.
struct SharePlacement<'f, 'a> {
    factory: &'f AttributeFactory<'a>,
    slots: &'f [ChildSlot<'f>],
    components: &'f [CommitmentComponent],
    required: &'f [String],
    depth: usize,
    children: BTreeMap<String, AttributeInstance>,
    /// First placement that used every segment but missed a required property.
    incomplete: Option<BTreeMap<String, AttributeInstance>>,
    /// First error raised by a child share.
    failure: Option<UcaError>,
}

impl SharePlacement<'_, '_> {
    fn place(&mut self, slot: usize, pos: usize) -> UcaResult<bool> {
        if pos == self.components.len() {
            if self.required.iter().all(|name| self.children.contains_key(name)) {
                return Ok(true);
            }
            if self.incomplete.is_none() {
                self.incomplete = Some(self.children.clone());
            }
            return Ok(false);
        }
        let slots = self.slots;
        let Some(current) = slots.get(slot) else {
            return Ok(false);
        };

        for len in (1..=share_limit(current, &self.components[pos..])).rev() {
            let share: String = self.components[pos..pos + len]
                .iter()
                .map(|c| format!("{}{SEGMENT_SEPARATOR}", c.raw_segment))
                .collect();
            let child = match self.factory.build(
                &current.definition,
                ConstructionInput::Commitment(share),
                self.depth + 1,
            ) {
                Ok(child) => child,
                Err(e @ (UcaError::DepthExceeded { .. } | UcaError::UnknownIdentifier { .. })) => {
                    return Err(e)
                }
                Err(e) => {
                    self.failure.get_or_insert(e);
                    continue;
                }
            };
            self.children.insert(current.property.to_string(), child);
            if self.place(slot + 1, pos + len)? {
                return Ok(true);
            }
            self.children.remove(current.property);
        }
        self.place(slot + 1, pos)
    }
}

/// Longest run of leading `components` that `slot` could claim.
fn share_limit(slot: &ChildSlot<'_>, components: &[CommitmentComponent]) -> usize {
    let run = components
        .iter()
        .take_while(|c| slot.names.contains(&c.property_name))
        .count();
    if slot.leaf {
        run.min(1)
    } else {
        run
    }
}

fn ensure_required(
    definition: &Definition,
    schema: &ObjectSchema,
    present: impl Fn(&str) -> bool,
) -> UcaResult<()> {
    match schema.required.iter().find(|name| !present(name.as_str())) {
        Some(missing) => Err(UcaError::MissingRequiredField {
            identifier: definition.identifier.to_string(),
            field: missing.clone(),
        }),
        None => Ok(()),
    }
}

/// Final step of every mode: fix the salt and derive the content id.
fn assemble(
    definition: &Definition,
    leaf_type: LeafType,
    value: AttributeValue,
    salt: Option<String>,
    timestamp: Option<Timestamp>,
) -> AttributeInstance {
    let mut instance = AttributeInstance {
        identifier: definition.identifier.clone(),
        version: definition.version.clone(),
        leaf_type,
        value,
        salt: salt.unwrap_or_default(),
        timestamp,
        credential_item: definition.credential_item,
        attestable: definition.attestable,
        id: String::new(),
    };
    let commitment = instance.attestable_value();
    if instance.salt.is_empty() {
        instance.salt = sha256_hex(&commitment);
    }
    instance.id = commitment::content_id(&instance.version, instance.identifier.as_str(), &commitment);
    instance
}
