//! The output side: a typed JSON Schema document model.
//!
//! One `Schema` value per fragment; the document root is just an `Object`
//! fragment that also carries `$schema`, the id, and the definitions map.
//! Everything serializes straight through serde, with key order fixed by
//! field declaration order and `IndexMap` for the nested maps, so the same
//! input always produces byte-identical output.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ————————————————————————————————————————————————————————————————————————————
// DRAFT VERSIONS
// ————————————————————————————————————————————————————————————————————————————

/// Supported JSON Schema draft versions, serialized as their meta-schema
/// URIs. Field placement differs per draft: draft-04 still uses `id`, and
/// `$defs` only exists from 2019-09 on (earlier drafts say `definitions`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DraftVersion {
    #[serde(rename = "http://json-schema.org/draft-04/schema#")]
    Draft04,
    #[serde(rename = "http://json-schema.org/draft-06/schema#")]
    Draft06,
    #[serde(rename = "http://json-schema.org/draft-07/schema#")]
    Draft07,
    #[serde(rename = "https://json-schema.org/draft/2019-09/schema")]
    Draft201909,
    #[default]
    #[serde(rename = "https://json-schema.org/draft/2020-12/schema")]
    Draft202012,
}

impl DraftVersion {
    pub fn uri(self) -> &'static str {
        match self {
            DraftVersion::Draft04 => "http://json-schema.org/draft-04/schema#",
            DraftVersion::Draft06 => "http://json-schema.org/draft-06/schema#",
            DraftVersion::Draft07 => "http://json-schema.org/draft-07/schema#",
            DraftVersion::Draft201909 => "https://json-schema.org/draft/2019-09/schema",
            DraftVersion::Draft202012 => "https://json-schema.org/draft/2020-12/schema",
        }
    }

    /// Draft-04 predates `$id`.
    pub fn uses_legacy_id(self) -> bool {
        matches!(self, DraftVersion::Draft04)
    }

    /// Where shared definitions live in a document of this draft.
    pub fn definitions_keyword(self) -> &'static str {
        match self {
            DraftVersion::Draft04 | DraftVersion::Draft06 | DraftVersion::Draft07 => {
                "definitions"
            }
            DraftVersion::Draft201909 | DraftVersion::Draft202012 => "$defs",
        }
    }

    /// Pointer prefix for refs into the definitions map.
    pub fn ref_prefix(self) -> &'static str {
        match self {
            DraftVersion::Draft04 | DraftVersion::Draft06 | DraftVersion::Draft07 => {
                "#/definitions/"
            }
            DraftVersion::Draft201909 | DraftVersion::Draft202012 => "#/$defs/",
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// FRAGMENTS
// ————————————————————————————————————————————————————————————————————————————

/// A schema value for a single field, type, or whole document.
///
/// Built once per conversion, immutable afterward, safe to serialize
/// independently of the graph it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Schema {
    Object(Box<ObjectSchema>),
    Array(Box<ArraySchema>),
    String(Box<StringSchema>),
    Integer(NumericSchema<i64>),
    Number(NumericSchema<f64>),
    Boolean(BooleanSchema),
    Null(NullSchema),
    Ref(RefSchema),
    /// The no-constraints schema, serialized as `{}`.
    Empty {},
}

impl Schema {
    pub fn object() -> Self {
        Schema::Object(Box::new(ObjectSchema::new()))
    }

    pub fn string() -> Self {
        Schema::String(Box::new(StringSchema::new()))
    }

    pub fn integer() -> Self {
        Schema::Integer(NumericSchema::new("integer"))
    }

    pub fn number() -> Self {
        Schema::Number(NumericSchema::new("number"))
    }

    pub fn boolean() -> Self {
        Schema::Boolean(BooleanSchema::default())
    }

    pub fn null() -> Self {
        Schema::Null(NullSchema::default())
    }

    pub fn reference(target: impl Into<String>) -> Self {
        Schema::Ref(RefSchema {
            reference: target.into(),
        })
    }

    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match self {
            Schema::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut ObjectSchema> {
        match self {
            Schema::Object(o) => Some(o),
            _ => None,
        }
    }
}

/// An `object` fragment. Document-level fields (`$schema`, id, defs) stay
/// `None` on every fragment except the assembled root.
///
/// Field declaration order is serialization order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ObjectSchema {
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<DraftVersion>,

    #[serde(rename = "$id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Draft-04 spelling of the document id.
    #[serde(rename = "id", skip_serializing_if = "Option::is_none")]
    pub legacy_id: Option<String>,

    #[serde(rename = "type")]
    schema_type: SchemaTypeName,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,

    /// Property names of non-optional fields, in declaration order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(rename = "$defs", skip_serializing_if = "Option::is_none")]
    pub defs: Option<IndexMap<String, Schema>>,

    /// Pre-2019-09 spelling of the definitions map.
    #[serde(rename = "definitions", skip_serializing_if = "Option::is_none")]
    pub legacy_defs: Option<IndexMap<String, Schema>>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self {
            schema_type: SchemaTypeName("object"),
            ..Self::default()
        }
    }

    pub fn add_property(&mut self, name: impl Into<String>, fragment: Schema) {
        self.properties.insert(name.into(), fragment);
    }

    pub fn add_required(&mut self, name: impl Into<String>) {
        self.required.push(name.into());
    }
}

/// An `array` fragment. The type classifier recognizes sequence kinds, but
/// no encoder branch produces this yet; it exists so hand-assembled and
/// future documents have somewhere to go.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArraySchema {
    #[serde(rename = "type")]
    schema_type: SchemaTypeName,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    #[serde(rename = "minItems", skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,

    #[serde(rename = "maxItems", skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,

    #[serde(rename = "uniqueItems", skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
}

impl Default for ArraySchema {
    fn default() -> Self {
        Self {
            schema_type: SchemaTypeName("array"),
            items: None,
            min_items: None,
            max_items: None,
            unique_items: None,
        }
    }
}

/// A `string` fragment with its draft-wide constraint fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringSchema {
    #[serde(rename = "type")]
    schema_type: SchemaTypeName,

    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,

    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
}

impl StringSchema {
    pub fn new() -> Self {
        Self {
            schema_type: SchemaTypeName("string"),
            min_length: None,
            max_length: None,
            pattern: None,
            format: None,
            default: None,
            examples: Vec::new(),
            enum_values: Vec::new(),
        }
    }
}

impl Default for StringSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared shape of `integer` (`T = i64`) and `number` (`T = f64`)
/// fragments; mirrors how the constraint keywords apply to both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSchema<T> {
    #[serde(rename = "type")]
    schema_type: SchemaTypeName,

    #[serde(rename = "multipleOf", skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<T>,

    #[serde(rename = "exclusiveMinimum", skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<T>,

    #[serde(rename = "exclusiveMaximum", skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<T>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<T>,

    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<T>,
}

impl<T> NumericSchema<T> {
    fn new(type_name: &'static str) -> Self {
        Self {
            schema_type: SchemaTypeName(type_name),
            multiple_of: None,
            minimum: None,
            maximum: None,
            exclusive_minimum: None,
            exclusive_maximum: None,
            default: None,
            examples: Vec::new(),
            enum_values: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BooleanSchema {
    #[serde(rename = "type")]
    schema_type: BooleanTypeName,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<bool>,

    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NullSchema {
    #[serde(rename = "type")]
    schema_type: NullTypeName,
}

/// A `$ref` fragment; the target is a pointer into the document's
/// definitions map, or `#` for the document root itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefSchema {
    #[serde(rename = "$ref")]
    pub reference: String,
}

// The `type` keyword as a fixed string per variant. Wrapped so `Default`
// can pick the right constant where derives want one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
struct SchemaTypeName(&'static str);

impl Default for SchemaTypeName {
    fn default() -> Self {
        SchemaTypeName("object")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
struct BooleanTypeName(&'static str);

impl Default for BooleanTypeName {
    fn default() -> Self {
        BooleanTypeName("boolean")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
struct NullTypeName(&'static str);

impl Default for NullTypeName {
    fn default() -> Self {
        NullTypeName("null")
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integer_fragment_serializes_constraints_only_when_set() {
        let mut frag = NumericSchema::<i64>::new("integer");
        frag.minimum = Some(0);
        frag.maximum = Some(10);
        let value = serde_json::to_value(Schema::Integer(frag)).unwrap();
        assert_eq!(value, json!({"type": "integer", "minimum": 0, "maximum": 10}));
    }

    #[test]
    fn ref_and_empty_fragments() {
        assert_eq!(
            serde_json::to_value(Schema::reference("#/$defs/Inner")).unwrap(),
            json!({"$ref": "#/$defs/Inner"})
        );
        assert_eq!(serde_json::to_value(Schema::Empty {}).unwrap(), json!({}));
        assert_eq!(
            serde_json::to_value(Schema::null()).unwrap(),
            json!({"type": "null"})
        );
    }

    #[test]
    fn array_fragment_carries_items() {
        let mut arr = ArraySchema::default();
        arr.items = Some(Box::new(Schema::string()));
        arr.min_items = Some(1);
        assert_eq!(
            serde_json::to_value(Schema::Array(Box::new(arr))).unwrap(),
            json!({"type": "array", "items": {"type": "string"}, "minItems": 1})
        );
    }

    #[test]
    fn document_key_order_is_stable() {
        let mut root = ObjectSchema::new();
        root.schema = Some(DraftVersion::Draft202012);
        root.id = Some("https://ns/Root".into());
        root.add_property("a", Schema::string());
        root.add_required("a");
        root.defs = Some(IndexMap::new());
        let text = serde_json::to_string(&Schema::Object(Box::new(root))).unwrap();
        let schema_pos = text.find("$schema").unwrap();
        let id_pos = text.find("$id").unwrap();
        let type_pos = text.find("\"type\"").unwrap();
        let props_pos = text.find("properties").unwrap();
        assert!(schema_pos < id_pos && id_pos < type_pos && type_pos < props_pos);
    }

    #[test]
    fn draft_field_placement_table() {
        assert!(DraftVersion::Draft04.uses_legacy_id());
        assert!(!DraftVersion::Draft06.uses_legacy_id());
        assert_eq!(DraftVersion::Draft07.definitions_keyword(), "definitions");
        assert_eq!(DraftVersion::Draft202012.definitions_keyword(), "$defs");
        assert_eq!(DraftVersion::Draft201909.ref_prefix(), "#/$defs/");
        assert_eq!(
            serde_json::to_value(DraftVersion::Draft07).unwrap(),
            json!("http://json-schema.org/draft-07/schema#")
        );
    }
}
