//! Parser for the reserved constraint-tag namespace.
//!
//! Front-ends hand tags over pre-split into raw `key=value` segments; this
//! module turns them into typed entries exactly once, so key validation
//! lives in one place instead of being re-derived per call site.
//!
//! Policy split: an unrecognized *key* is a hard error for the whole
//! conversion, while an unparseable *value* for a recognized key is
//! dropped (the encoder logs it).

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use ordered_float::OrderedFloat;

use crate::error::{Error, FieldContext, Result};

/// The tag namespace scanned for schema constraints.
pub const CONSTRAINT_NAMESPACE: &str = "jsonschema";

/// Every key the constraint namespace knows about, across all kinds.
/// Which of them apply to a given node is the encoder's decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKey {
    MultipleOf,
    Minimum,
    Maximum,
    ExclusiveMinimum,
    ExclusiveMaximum,
    Pattern,
    MaxLength,
    MinLength,
    Format,
    Default,
    Example,
    Enum,
}

impl ConstraintKey {
    pub fn as_str(self) -> &'static str {
        use ConstraintKey::*;
        match self {
            MultipleOf => "multipleOf",
            Minimum => "minimum",
            Maximum => "maximum",
            ExclusiveMinimum => "exclusiveMinimum",
            ExclusiveMaximum => "exclusiveMaximum",
            Pattern => "pattern",
            MaxLength => "maxLength",
            MinLength => "minLength",
            Format => "format",
            Default => "default",
            Example => "example",
            Enum => "enum",
        }
    }
}

static KEYS: Lazy<BTreeMap<&'static str, ConstraintKey>> = Lazy::new(|| {
    use ConstraintKey::*;
    BTreeMap::from([
        ("multipleOf", MultipleOf),
        ("minimum", Minimum),
        ("maximum", Maximum),
        ("exclusiveMinimum", ExclusiveMinimum),
        ("exclusiveMaximum", ExclusiveMaximum),
        ("pattern", Pattern),
        ("maxLength", MaxLength),
        ("minLength", MinLength),
        ("format", Format),
        ("default", Default),
        ("example", Example),
        ("enum", Enum),
    ])
});

/// One parsed `key=value` segment. The value stays raw here; parsing it
/// against the node's kind happens in the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintEntry {
    pub key: ConstraintKey,
    pub value: String,
}

/// Parse the raw segments of a constraint tag. Segment order is kept so
/// list-valued keys (`example`, `enum`) accumulate deterministically.
pub fn parse_constraints(
    segments: &[String],
    context: &FieldContext,
) -> Result<Vec<ConstraintEntry>> {
    let mut entries = Vec::with_capacity(segments.len());
    for segment in segments {
        // A segment without `=` is a bare key with an empty value; it
        // still has to name a known key.
        let (key, value) = segment
            .split_once('=')
            .unwrap_or((segment.as_str(), ""));
        let key = KEYS
            .get(key)
            .copied()
            .ok_or_else(|| Error::MalformedConstraintTag {
                key: key.to_string(),
                context: context.clone(),
            })?;
        entries.push(ConstraintEntry {
            key,
            value: value.to_string(),
        });
    }
    Ok(entries)
}

// ————————————————————————————————————————————————————————————————————————————
// TAG VALUE NUMBERS
// ————————————————————————————————————————————————————————————————————————————

/// A numeric tag value: parsed as an integer first, falling back to
/// floating point. `OrderedFloat` keeps the type `Eq`, so entries compare
/// and dedup cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagNumber {
    Int(i64),
    Float(OrderedFloat<f64>),
}

impl TagNumber {
    pub fn parse(raw: &str) -> Option<Self> {
        if let Ok(i) = raw.parse::<i64>() {
            return Some(TagNumber::Int(i));
        }
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| TagNumber::Float(OrderedFloat(f)))
    }

    /// Integer view; `None` for float values (no silent truncation).
    pub fn as_i64(self) -> Option<i64> {
        match self {
            TagNumber::Int(i) => Some(i),
            TagNumber::Float(_) => None,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            TagNumber::Int(i) => i as f64,
            TagNumber::Float(f) => f.0,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> FieldContext {
        FieldContext::new("ns", "T", "f")
    }

    fn seg(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn recognized_pairs_parse_in_order() {
        let entries =
            parse_constraints(&seg(&["minimum=0", "maximum=10"]), &ctx()).unwrap();
        assert_eq!(
            entries,
            vec![
                ConstraintEntry {
                    key: ConstraintKey::Minimum,
                    value: "0".into()
                },
                ConstraintEntry {
                    key: ConstraintKey::Maximum,
                    value: "10".into()
                },
            ]
        );
    }

    #[test]
    fn unknown_key_is_a_hard_error() {
        let err = parse_constraints(&seg(&["bogus=1"]), &ctx()).unwrap_err();
        match err {
            Error::MalformedConstraintTag { key, .. } => assert_eq!(key, "bogus"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bare_known_key_yields_empty_value() {
        let entries = parse_constraints(&seg(&["minimum"]), &ctx()).unwrap();
        assert_eq!(entries[0].key, ConstraintKey::Minimum);
        assert_eq!(entries[0].value, "");
    }

    #[test]
    fn numbers_prefer_integers() {
        assert_eq!(TagNumber::parse("10"), Some(TagNumber::Int(10)));
        assert_eq!(
            TagNumber::parse("0.5"),
            Some(TagNumber::Float(OrderedFloat(0.5)))
        );
        assert_eq!(TagNumber::parse("ten"), None);
        assert_eq!(TagNumber::parse("inf"), None);
    }
}
