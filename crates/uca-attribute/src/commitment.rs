//! # Commitment Codec
//!
//! Serializes an attribute instance into its canonical "attestable value"
//! and parses such a string back into components.
//!
//! ## Wire Grammar
//!
//! ```text
//! commitment   := segment ("|" segment)* ["|"]
//! segment      := "urn:" propertyName ":" salt ":" value
//! propertyName := \w+
//! salt         := \w+
//! value        := any run of non-'|' characters
//! ```
//!
//! A leaf renders as one segment. A composite renders each child in
//! ascending key order, each terminated by `|`; a composite child already
//! ends in `|` and is not terminated twice. Numbers are zero-padded to
//! [`NUMBER_WIDTH`] characters.
//!
//! ## Security Invariant
//!
//! The content identifier hashes the commitment, which embeds every leaf
//! salt. Without the salts the identifier reveals nothing about the values.

use std::sync::LazyLock;

use regex::Regex;
use uca_core::{sha256_hex, LeafType, PrimitiveValue, UcaError, UcaResult};

use crate::attribute::{AttributeInstance, AttributeValue};

/// Separator between segments.
pub const SEGMENT_SEPARATOR: char = '|';

/// Width numbers are zero-padded to, sign included.
pub const NUMBER_WIDTH: usize = 8;

const URN_PREFIX: &str = "urn:";

/// One segment of the wire grammar. `(?s)` lets a value span lines.
static SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^urn:(\w+):(\w+):(.*)$").expect("segment grammar is a valid regex")
});

/// One parsed segment of a commitment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitmentComponent {
    /// Name derived from the attribute's identifier.
    pub property_name: String,
    /// The leaf's salt.
    pub salt: String,
    /// The rendered value, undecoded.
    pub value: String,
    /// The segment as it appeared on the wire.
    pub raw_segment: String,
}

/// Canonical commitment of `instance`.
pub fn canonical_attestable_value(instance: &AttributeInstance) -> String {
    match instance.value() {
        AttributeValue::Primitive(value) => format!(
            "{URN_PREFIX}{}:{}:{}",
            instance.identifier().attestable_name(),
            instance.salt(),
            render_value(value)
        ),
        AttributeValue::Composite(children) => {
            let mut out = String::new();
            // BTreeMap iteration is ascending by key.
            for child in children.values() {
                let rendered = canonical_attestable_value(child);
                let terminated = rendered.ends_with(SEGMENT_SEPARATOR);
                out.push_str(&rendered);
                if !terminated {
                    out.push(SEGMENT_SEPARATOR);
                }
            }
            out
        }
    }
}

/// Wire rendering of a primitive value.
pub fn render_value(value: &PrimitiveValue) -> String {
    match value {
        PrimitiveValue::String(s) => s.clone(),
        PrimitiveValue::Boolean(b) => b.to_string(),
        PrimitiveValue::Number(n) => format!("{n:0width$}", width = NUMBER_WIDTH),
    }
}

/// Decode a rendered value as `leaf_type`.
///
/// # Errors
///
/// [`UcaError::MalformedCommitment`] when `raw` is not a rendering of a
/// `leaf_type` value.
pub fn decode_value(raw: &str, leaf_type: LeafType) -> UcaResult<PrimitiveValue> {
    match leaf_type {
        LeafType::String => Ok(PrimitiveValue::String(raw.to_string())),
        LeafType::Boolean => match raw {
            "true" => Ok(PrimitiveValue::Boolean(true)),
            "false" => Ok(PrimitiveValue::Boolean(false)),
            _ => Err(UcaError::malformed(format!("{raw:?} is not a Boolean"))),
        },
        LeafType::Number => raw
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(PrimitiveValue::Number)
            .ok_or_else(|| UcaError::malformed(format!("{raw:?} is not a Number"))),
        LeafType::Object => Err(UcaError::malformed(
            "an object cannot be decoded from a single segment",
        )),
    }
}

/// Split a commitment into components.
///
/// A single trailing empty segment (left by a composite's final `|`) is
/// tolerated; the parsed count must equal the split count or the split
/// count minus one.
///
/// # Errors
///
/// [`UcaError::MalformedCommitment`] for empty input, a segment that fails
/// the grammar, or an inconsistent segment count.
pub fn parse_commitment(commitment: &str) -> UcaResult<Vec<CommitmentComponent>> {
    if commitment.is_empty() {
        return Err(UcaError::malformed("empty commitment"));
    }
    let segments: Vec<&str> = commitment.split(SEGMENT_SEPARATOR).collect();
    let components = segments
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| parse_segment(s))
        .collect::<UcaResult<Vec<_>>>()?;

    let split = segments.len();
    if components.len() != split && components.len() + 1 != split {
        return Err(UcaError::malformed(format!(
            "{} segments parsed out of {split}",
            components.len()
        )));
    }
    Ok(components)
}

fn parse_segment(segment: &str) -> UcaResult<CommitmentComponent> {
    let captures = SEGMENT_RE.captures(segment).ok_or_else(|| {
        UcaError::malformed(format!("segment {segment:?} is not urn:name:salt:value"))
    })?;
    Ok(CommitmentComponent {
        property_name: captures[1].to_string(),
        salt: captures[2].to_string(),
        value: captures[3].to_string(),
        raw_segment: segment.to_string(),
    })
}

/// `"{version}:{identifier}:{hex(sha256(commitment))}"`.
pub fn content_id(version: &str, identifier: &str, commitment: &str) -> String {
    format!("{version}:{identifier}:{}", sha256_hex(commitment))
}

/// True when `commitment` is exactly the canonical commitment of `instance`.
pub fn verify_commitment(instance: &AttributeInstance, commitment: &str) -> bool {
    canonical_attestable_value(instance) == commitment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_zero_padded() {
        assert_eq!(render_value(&PrimitiveValue::from(42i64)), "00000042");
        assert_eq!(render_value(&PrimitiveValue::from(0i64)), "00000000");
        assert_eq!(render_value(&PrimitiveValue::from(-5i64)), "-0000005");
        assert_eq!(render_value(&PrimitiveValue::from(1.5)), "000001.5");
        assert_eq!(render_value(&PrimitiveValue::from(123456789i64)), "123456789");
    }

    #[test]
    fn strings_and_booleans_render_verbatim() {
        assert_eq!(render_value(&PrimitiveValue::from("Ann")), "Ann");
        assert_eq!(render_value(&PrimitiveValue::from(true)), "true");
    }

    #[test]
    fn decode_inverts_render() {
        for v in [
            PrimitiveValue::from(42i64),
            PrimitiveValue::from(-5i64),
            PrimitiveValue::from(1.5),
            PrimitiveValue::from(false),
            PrimitiveValue::from("Lee"),
        ] {
            let decoded = decode_value(&render_value(&v), v.leaf_type()).unwrap();
            assert_eq!(decoded, v);
        }
    }

    #[test]
    fn decode_rejects_bad_values() {
        assert!(matches!(
            decode_value("yes", LeafType::Boolean),
            Err(UcaError::MalformedCommitment(_))
        ));
        assert!(decode_value("0000abc", LeafType::Number).is_err());
        assert!(decode_value("inf", LeafType::Number).is_err());
        assert!(decode_value("x", LeafType::Object).is_err());
    }

    #[test]
    fn parse_single_segment() {
        let parsed = parse_commitment("urn:age:abc123:00000042").unwrap();
        assert_eq!(
            parsed,
            vec![CommitmentComponent {
                property_name: "age".into(),
                salt: "abc123".into(),
                value: "00000042".into(),
                raw_segment: "urn:age:abc123:00000042".into(),
            }]
        );
    }

    #[test]
    fn parse_composite_with_trailing_separator() {
        let parsed = parse_commitment("urn:first:s1:Ann|urn:last:s2:Lee|").unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].property_name, "first");
        assert_eq!(parsed[1].value, "Lee");
    }

    #[test]
    fn value_may_contain_colons() {
        let parsed = parse_commitment("urn:time:s1:12:30").unwrap();
        assert_eq!(parsed[0].salt, "s1");
        assert_eq!(parsed[0].value, "12:30");
    }

    #[test]
    fn value_may_span_lines() {
        let parsed = parse_commitment("urn:note:s1:line one\nline two|").unwrap();
        assert_eq!(parsed[0].value, "line one\nline two");
    }

    #[test]
    fn empty_value_is_allowed() {
        let parsed = parse_commitment("urn:note:s1:").unwrap();
        assert_eq!(parsed[0].value, "");
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in [
            "",
            "|",
            "not-a-urn",
            "urn:age:00000042",
            "urn::salt:1",
            "urn:a-b:salt:1",
            "urn:a:s:1||urn:b:s:2||",
        ] {
            assert!(
                matches!(parse_commitment(bad), Err(UcaError::MalformedCommitment(_))),
                "{bad:?} should be malformed"
            );
        }
    }

    #[test]
    fn content_id_format() {
        let id = content_id("1", "ns:Person:age", "");
        assert_eq!(
            id,
            "1:ns:Person:age:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
