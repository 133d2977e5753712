//! Convert structural type definitions into JSON Schema documents.
//!
//! The pipeline is one-way and synchronous: a front-end hands over a
//! [`graph::TypeGraph`] (an identity-keyed arena of composite types plus a
//! root), the definition builder collapses every composite into exactly
//! one shared definition, the per-node encoder maps fields to fragments
//! with tag-driven constraints, and the assembler wraps it all into a
//! single document with `$defs`/`$ref` indirection.
//!
//! ```
//! use jsonschema_gen::graph::{TypeGraph, TypeKind, TypeNode};
//!
//! let root = TypeNode::new("acme.dev/models", "Settings", TypeKind::Struct)
//!     .with_child(
//!         TypeNode::primitive(TypeKind::Int)
//!             .with_field_name("Retries")
//!             .with_tag("json", ["retries"])
//!             .with_tag("jsonschema", ["minimum=0"]),
//!     );
//! let mut graph = TypeGraph::new(root.clone());
//! graph.define(root);
//!
//! let document = jsonschema_gen::generator::from_graph(graph).unwrap();
//! let text = serde_json::to_string_pretty(&document).unwrap();
//! assert!(text.contains("\"minimum\": 0"));
//! ```

pub mod cli;
pub mod config;
pub mod convert;
pub mod encode;
pub mod error;
pub mod frontend;
pub mod generator;
pub mod graph;
pub mod prefilter;
pub mod schema;
pub mod tags;

pub use config::Config;
pub use error::{Error, Result};
pub use generator::{from_graph, DocumentEncoder, Encoder, FrontEnd, Generator};
pub use graph::{TypeGraph, TypeId, TypeKind, TypeNode};
pub use schema::{DraftVersion, Schema};
