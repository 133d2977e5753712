//! Canonical in-memory representation of a discovered type graph.
//!
//! The graph is an arena: every composite type lives exactly once in
//! `TypeGraph::definitions`, keyed by its canonical identity, and repeat
//! occurrences are `reference` links carrying only that identity. This is
//! what keeps walks over cyclic type graphs (A contains B contains A)
//! finite: the second occurrence of an identity never re-populates
//! `children`.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Raw declarative annotations, pre-split by the front-end:
/// tag namespace to ordered raw segments, e.g. `json` to
/// `["fieldName", "omitempty"]`.
pub type TagMap = BTreeMap<String, Vec<String>>;

// ————————————————————————————————————————————————————————————————————————————
// CANONICAL IDENTITY
// ————————————————————————————————————————————————————————————————————————————

/// The `(namespace, type name)` pair that makes two nodes denote the same
/// composite type. Serialized as the single string `namespace#name`.
///
/// Deduplication and `$defs` naming rely solely on this pair, never on
/// node address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId {
    pub namespace: String,
    pub name: String,
}

impl TypeId {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Parse the `namespace#name` wire form. A bare string with no `#`
    /// is a name in the empty namespace.
    pub fn parse(s: &str) -> Self {
        match s.split_once('#') {
            Some((ns, name)) => Self::new(ns, name),
            None => Self::new("", s),
        }
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.namespace, self.name)
    }
}

impl Serialize for TypeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(TypeId::parse(&s))
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TYPE KINDS
// ————————————————————————————————————————————————————————————————————————————

/// Closed enumeration of the kind strings a front-end may hand over.
///
/// `Slice`, `Array` and `Map` are recognized by classifiers but have no
/// encoder branch; they fail conversion as unsupported. Anything outside
/// the recognized set deserializes to `Unresolved` so the conversion, not
/// the parse, reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    String,
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Slice,
    Array,
    Map,
    Struct,
    #[default]
    #[serde(other)]
    Unresolved,
}

impl TypeKind {
    pub fn is_integer(self) -> bool {
        use TypeKind::*;
        matches!(
            self,
            Int | Int8 | Int16 | Int32 | Int64 | Uint | Uint8 | Uint16 | Uint32 | Uint64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, TypeKind::Float32 | TypeKind::Float64)
    }

    pub fn is_composite(self) -> bool {
        matches!(self, TypeKind::Struct)
    }

    /// The wire name, used in error messages.
    pub fn as_str(self) -> &'static str {
        use TypeKind::*;
        match self {
            String => "string",
            Bool => "bool",
            Int => "int",
            Int8 => "int8",
            Int16 => "int16",
            Int32 => "int32",
            Int64 => "int64",
            Uint => "uint",
            Uint8 => "uint8",
            Uint16 => "uint16",
            Uint32 => "uint32",
            Uint64 => "uint64",
            Float32 => "float32",
            Float64 => "float64",
            Slice => "slice",
            Array => "array",
            Map => "map",
            Struct => "struct",
            Unresolved => "unresolved",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// NODES
// ————————————————————————————————————————————————————————————————————————————

/// One node in the type graph: a composite root, a struct field, or a
/// reference to a composite defined elsewhere in the arena.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TypeNode {
    /// Origin module/package of the type; empty for primitives.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    /// Declared type name; for primitives, the kind's canonical name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "is_unresolved")]
    pub kind: TypeKind,

    /// Empty for the root and for nodes that are not struct fields.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub field_name: String,

    /// Struct fields in declaration order; empty for primitives.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TypeNode>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: TagMap,

    /// True if the field's storage slot is optional/nullable.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,

    /// Weak link to a composite already present in the arena, set instead
    /// of `children` for repeat occurrences.
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<TypeId>,
}

fn is_unresolved(kind: &TypeKind) -> bool {
    *kind == TypeKind::Unresolved
}

impl TypeNode {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        kind: TypeKind,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    /// A primitive node: empty namespace, name equal to the kind string.
    pub fn primitive(kind: TypeKind) -> Self {
        Self::new("", kind.as_str(), kind)
    }

    /// A reference node pointing at an arena entry.
    pub fn reference(target: TypeId) -> Self {
        Self {
            reference: Some(target),
            ..Self::default()
        }
    }

    pub fn with_field_name(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = field_name.into();
        self
    }

    pub fn with_tag(
        mut self,
        namespace: impl Into<String>,
        segments: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.tags.insert(
            namespace.into(),
            segments.into_iter().map(Into::into).collect(),
        );
        self
    }

    pub fn with_child(mut self, child: TypeNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn into_optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn id(&self) -> TypeId {
        TypeId::new(self.namespace.clone(), self.name.clone())
    }

    /// Raw segments of a tag namespace, if the front-end attached one.
    pub fn tag_segments(&self, namespace: &str) -> Option<&[String]> {
        self.tags.get(namespace).map(Vec::as_slice)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// GRAPH
// ————————————————————————————————————————————————————————————————————————————

/// The parse result a front-end hands to the conversion core.
///
/// `definitions` holds every composite encountered, each exactly once,
/// keyed by canonical identity; insertion order is the front-end's walk
/// order and is preserved all the way into the emitted document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TypeGraph {
    pub root: TypeNode,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub definitions: IndexMap<TypeId, TypeNode>,
}

impl TypeGraph {
    pub fn new(root: TypeNode) -> Self {
        Self {
            root,
            definitions: IndexMap::new(),
        }
    }

    /// Idempotent arena insertion: re-encountering an identity keeps the
    /// existing node. Returns the node's identity either way.
    pub fn define(&mut self, node: TypeNode) -> TypeId {
        let id = node.id();
        self.definitions.entry(id.clone()).or_insert(node);
        id
    }

    pub fn get(&self, id: &TypeId) -> Option<&TypeNode> {
        self.definitions.get(id)
    }

    pub fn contains(&self, id: &TypeId) -> bool {
        self.definitions.contains_key(id)
    }

    pub fn root_id(&self) -> TypeId {
        self.root.id()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
