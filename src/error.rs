//! Conversion error taxonomy.
//!
//! Every failure carries enough context (namespace, type name, field name)
//! to locate the offending declaration. The first error anywhere in the
//! walk aborts the whole conversion; no partial document is ever returned.

use crate::graph::TypeId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A node's kind cannot be mapped to any schema variant.
    #[error("unsupported type `{type_name}` (kind `{kind}`) in {context}")]
    UnsupportedType {
        type_name: String,
        kind: String,
        context: FieldContext,
    },

    /// An unrecognized key inside the reserved constraint-tag namespace.
    /// Unparseable *values* for recognized keys are not errors; they are
    /// dropped with a warning instead.
    #[error("unrecognized constraint tag key `{key}` in {context}")]
    MalformedConstraintTag { key: String, context: FieldContext },

    /// A reference link whose target identity is absent from the graph's
    /// definitions map. Front-end contract violation.
    #[error("reference to undefined type `{target}` in {context}")]
    UnresolvedReference {
        target: TypeId,
        context: FieldContext,
    },

    /// Generator was run without a front-end attached.
    #[error("no front-end configured")]
    MissingFrontEnd,

    /// Generator was run without an encoder attached.
    #[error("no encoder configured")]
    MissingEncoder,

    /// A serialized type graph failed to deserialize.
    #[error("invalid type graph at JSON path {path}: {detail}")]
    InvalidGraph { path: String, detail: String },

    /// Nothing was generated yet; `to_json` called before `generate`.
    #[error("no document generated")]
    NoDocument,
}

/// Where in the graph an error was found: the enclosing composite plus the
/// field under inspection (empty for the composite itself).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldContext {
    pub namespace: String,
    pub type_name: String,
    pub field_name: String,
}

impl FieldContext {
    pub fn new(
        namespace: impl Into<String>,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            type_name: type_name.into(),
            field_name: field_name.into(),
        }
    }
}

impl std::fmt::Display for FieldContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.field_name.is_empty() {
            write!(f, "type `{}#{}`", self.namespace, self.type_name)
        } else {
            write!(
                f,
                "field `{}` of `{}#{}`",
                self.field_name, self.namespace, self.type_name
            )
        }
    }
}
