//! # Value Validation
//!
//! Checks a raw primitive against its resolved leaf type and the
//! definition's constraints. No coercion: `"42"` is not a Number.
//!
//! String lengths are counted in Unicode scalar values. Strings may not
//! contain `|`, which delimits segments on the commitment wire format.

use uca_core::{LeafType, PrimitiveValue};

use crate::definition::Constraints;

/// Segment separator of the commitment wire format.
const FORBIDDEN_SEPARATOR: char = '|';

/// True when `value` inhabits `leaf_type` exactly. Never true for `Object`.
pub fn type_matches(value: &PrimitiveValue, leaf_type: LeafType) -> bool {
    value.leaf_type() == leaf_type
}

/// True when `value` has type `leaf_type` and satisfies every constraint.
pub fn satisfies_constraints(
    value: &PrimitiveValue,
    leaf_type: LeafType,
    constraints: &Constraints,
) -> bool {
    check_value(value, leaf_type, constraints).is_ok()
}

/// Like [`satisfies_constraints`], but reports the first violated rule.
pub fn check_value(
    value: &PrimitiveValue,
    leaf_type: LeafType,
    constraints: &Constraints,
) -> Result<(), String> {
    if !type_matches(value, leaf_type) {
        return Err(format!(
            "expected {leaf_type}, got {}",
            value.leaf_type()
        ));
    }
    match value {
        PrimitiveValue::String(s) => check_string(s, constraints),
        PrimitiveValue::Number(n) => check_number(*n, constraints),
        PrimitiveValue::Boolean(_) => Ok(()),
    }
}

fn check_string(s: &str, constraints: &Constraints) -> Result<(), String> {
    if s.contains(FORBIDDEN_SEPARATOR) {
        return Err(format!("string contains reserved character '{FORBIDDEN_SEPARATOR}'"));
    }
    if let Some(pattern) = &constraints.pattern {
        let re = pattern
            .regex()
            .map_err(|e| format!("invalid pattern {:?}: {e}", pattern.as_str()))?;
        if !re.is_match(s) {
            return Err(format!("does not match pattern {:?}", pattern.as_str()));
        }
    }
    let length = s.chars().count();
    if let Some(min) = constraints.minimum_length {
        if length < min {
            return Err(format!("length {length} is below minimumLength {min}"));
        }
    }
    if let Some(max) = constraints.maximum_length {
        if length > max {
            return Err(format!("length {length} exceeds maximumLength {max}"));
        }
    }
    Ok(())
}

fn check_number(n: f64, constraints: &Constraints) -> Result<(), String> {
    if !n.is_finite() {
        return Err(format!("{n} is not a finite number"));
    }
    if let Some(min) = constraints.minimum {
        if constraints.exclusive_minimum && n <= min {
            return Err(format!("{n} is not above exclusive minimum {min}"));
        }
        if n < min {
            return Err(format!("{n} is below minimum {min}"));
        }
    }
    if let Some(max) = constraints.maximum {
        if constraints.exclusive_maximum && n >= max {
            return Err(format!("{n} is not below exclusive maximum {max}"));
        }
        if n > max {
            return Err(format!("{n} is above maximum {max}"));
        }
    }
    Ok(())
}
