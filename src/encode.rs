//! Per-node schema encoding: one `TypeNode` in, one fragment out.
//!
//! Only primitives are encoded here. Composite nodes are either reference
//! links (resolved by the definition builder, which owns the naming and
//! draft context) or definition roots built by the builder itself.
//!
//! Constraint policy, per the tag parser's split: recognized key with a
//! value that fails to parse for the node's kind is dropped with a
//! warning; a key that does not apply to the node's kind at all is a hard
//! error.

use regex::Regex;
use tracing::warn;

use crate::config::Config;
use crate::error::{Error, FieldContext, Result};
use crate::graph::{TypeKind, TypeNode};
use crate::schema::Schema;
use crate::tags::{self, ConstraintEntry, ConstraintKey, TagNumber};

/// Resolve a field's property name: the first configured tag namespace
/// present on the node wins with its first segment; empty or missing
/// segments fall back to the raw field name.
pub fn property_name<'a>(config: &Config, node: &'a TypeNode) -> &'a str {
    for namespace in &config.field_name_tag {
        if let Some(segments) = node.tag_segments(namespace) {
            match segments.first() {
                Some(first) if !first.is_empty() => return first,
                _ => break,
            }
        }
    }
    &node.field_name
}

/// Encode a non-composite, non-reference node into its fragment.
pub fn encode_primitive(node: &TypeNode, context: &FieldContext) -> Result<Schema> {
    let entries = match node.tag_segments(tags::CONSTRAINT_NAMESPACE) {
        Some(segments) => tags::parse_constraints(segments, context)?,
        None => Vec::new(),
    };

    let kind = node.kind;
    let mut fragment = match kind {
        TypeKind::String => Schema::string(),
        TypeKind::Bool => Schema::boolean(),
        k if k.is_integer() => Schema::integer(),
        k if k.is_float() => Schema::number(),
        // Struct and reference nodes never reach this function; sequence
        // kinds and anything unresolved cannot be mapped to a variant.
        _ => {
            return Err(Error::UnsupportedType {
                type_name: node.name.clone(),
                kind: kind.to_string(),
                context: context.clone(),
            });
        }
    };

    match &mut fragment {
        Schema::Integer(frag) => {
            for entry in &entries {
                apply_integer(frag, entry, context)?;
            }
        }
        Schema::Number(frag) => {
            for entry in &entries {
                apply_number(frag, entry, context)?;
            }
        }
        Schema::String(frag) => {
            for entry in &entries {
                apply_string(frag, entry, context)?;
            }
        }
        Schema::Boolean(frag) => {
            for entry in &entries {
                apply_boolean(frag, entry, context)?;
            }
        }
        _ => unreachable!("dispatch above only builds leaf fragments"),
    }

    Ok(fragment)
}

// ————————————————————————————————————————————————————————————————————————————
// CONSTRAINT APPLICATION
// ————————————————————————————————————————————————————————————————————————————

fn apply_integer(
    frag: &mut crate::schema::NumericSchema<i64>,
    entry: &ConstraintEntry,
    context: &FieldContext,
) -> Result<()> {
    use ConstraintKey::*;

    match entry.key {
        MultipleOf | Minimum | Maximum | ExclusiveMinimum | ExclusiveMaximum
        | Default | Example | Enum => {}
        _ => return Err(inapplicable(entry, context)),
    }

    // Integer fields take integer-parsable values only; a float here is
    // as unparseable as a word.
    let parsed = TagNumber::parse(&entry.value).and_then(TagNumber::as_i64);
    let Some(value) = parsed else {
        drop_value(entry, context);
        return Ok(());
    };
    match entry.key {
        MultipleOf => frag.multiple_of = Some(value),
        Minimum => frag.minimum = Some(value),
        Maximum => frag.maximum = Some(value),
        ExclusiveMinimum => frag.exclusive_minimum = Some(value),
        ExclusiveMaximum => frag.exclusive_maximum = Some(value),
        Default => frag.default = Some(value),
        Example => frag.examples.push(value),
        Enum => frag.enum_values.push(value),
        _ => unreachable!(),
    }
    Ok(())
}

fn apply_number(
    frag: &mut crate::schema::NumericSchema<f64>,
    entry: &ConstraintEntry,
    context: &FieldContext,
) -> Result<()> {
    use ConstraintKey::*;

    match entry.key {
        MultipleOf | Minimum | Maximum | ExclusiveMinimum | ExclusiveMaximum
        | Default | Example | Enum => {}
        _ => return Err(inapplicable(entry, context)),
    }

    let Some(value) = TagNumber::parse(&entry.value).map(TagNumber::as_f64) else {
        drop_value(entry, context);
        return Ok(());
    };
    match entry.key {
        MultipleOf => frag.multiple_of = Some(value),
        Minimum => frag.minimum = Some(value),
        Maximum => frag.maximum = Some(value),
        ExclusiveMinimum => frag.exclusive_minimum = Some(value),
        ExclusiveMaximum => frag.exclusive_maximum = Some(value),
        Default => frag.default = Some(value),
        Example => frag.examples.push(value),
        Enum => frag.enum_values.push(value),
        _ => unreachable!(),
    }
    Ok(())
}

fn apply_string(
    frag: &mut crate::schema::StringSchema,
    entry: &ConstraintEntry,
    context: &FieldContext,
) -> Result<()> {
    use ConstraintKey::*;

    match entry.key {
        Pattern => {
            // A pattern that does not compile would poison every consumer
            // of the document; drop it like any other bad value.
            if Regex::new(&entry.value).is_ok() {
                frag.pattern = Some(entry.value.clone());
            } else {
                drop_value(entry, context);
            }
        }
        MinLength => match entry.value.parse::<u64>() {
            Ok(v) => frag.min_length = Some(v),
            Err(_) => drop_value(entry, context),
        },
        MaxLength => match entry.value.parse::<u64>() {
            Ok(v) => frag.max_length = Some(v),
            Err(_) => drop_value(entry, context),
        },
        Format => frag.format = Some(entry.value.clone()),
        Default => frag.default = Some(entry.value.clone()),
        Example => frag.examples.push(entry.value.clone()),
        Enum => frag.enum_values.push(entry.value.clone()),
        _ => return Err(inapplicable(entry, context)),
    }
    Ok(())
}

fn apply_boolean(
    frag: &mut crate::schema::BooleanSchema,
    entry: &ConstraintEntry,
    context: &FieldContext,
) -> Result<()> {
    use ConstraintKey::*;

    let parsed = entry.value.parse::<bool>();
    match entry.key {
        Default | Example | Enum => {}
        _ => return Err(inapplicable(entry, context)),
    }
    let Ok(value) = parsed else {
        drop_value(entry, context);
        return Ok(());
    };
    match entry.key {
        Default => frag.default = Some(value),
        Example => frag.examples.push(value),
        Enum => frag.enum_values.push(value),
        _ => unreachable!(),
    }
    Ok(())
}

fn inapplicable(entry: &ConstraintEntry, context: &FieldContext) -> Error {
    Error::MalformedConstraintTag {
        key: entry.key.as_str().to_string(),
        context: context.clone(),
    }
}

fn drop_value(entry: &ConstraintEntry, context: &FieldContext) {
    warn!(
        key = entry.key.as_str(),
        value = %entry.value,
        %context,
        "dropping unparseable constraint value"
    );
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
