//! The serialized-graph front-end: loads a `TypeGraph` that an external
//! introspector already wrote out as JSON.
//!
//! This is the one front-end the crate ships; it satisfies the
//! introspection contract by construction, since the wire shape *is* the
//! graph model. Failures point at the offending JSON path rather than a
//! bare line/column, which is what you want when a graph dump is a few
//! thousand nodes deep.

use crate::error::{Error, Result};
use crate::generator::FrontEnd;
use crate::graph::TypeGraph;

/// Deserialize a graph from JSON text.
pub fn graph_from_str(src: &str) -> Result<TypeGraph> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, TypeGraph>(de).map_err(invalid_graph)
}

/// Deserialize a graph from an already-parsed JSON value (e.g. the output
/// of a pre-filter).
pub fn graph_from_value(value: serde_json::Value) -> Result<TypeGraph> {
    serde_path_to_error::deserialize::<_, TypeGraph>(value).map_err(invalid_graph)
}

fn invalid_graph(err: serde_path_to_error::Error<serde_json::Error>) -> Error {
    Error::InvalidGraph {
        path: err.path().to_string(),
        detail: err.into_inner().to_string(),
    }
}

/// `FrontEnd` over a JSON source held in memory.
pub struct JsonFrontEnd {
    source: String,
}

impl JsonFrontEnd {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl FrontEnd for JsonFrontEnd {
    fn parse(&mut self) -> Result<TypeGraph> {
        graph_from_str(&self.source)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{TypeId, TypeKind};

    const SETTINGS_GRAPH: &str = r##"{
        "root": {
            "namespace": "acme.dev/models/base",
            "name": "Settings",
            "kind": "struct",
            "children": [
                {"field_name": "ValInnerSettings", "ref": "acme.dev/models/additional#InnerSettings", "tags": {"json": ["valInnerSettings"]}},
                {"field_name": "FloatValue", "name": "float32", "kind": "float32", "tags": {"json": ["floatValue"]}}
            ]
        },
        "definitions": {
            "acme.dev/models/base#Settings": {
                "namespace": "acme.dev/models/base", "name": "Settings", "kind": "struct"
            },
            "acme.dev/models/additional#InnerSettings": {
                "namespace": "acme.dev/models/additional", "name": "InnerSettings", "kind": "struct",
                "children": [
                    {"field_name": "IntValue", "name": "int", "kind": "int", "tags": {"jsonschema": ["minimum=0"]}}
                ]
            }
        }
    }"##;

    #[test]
    fn wire_graph_loads() {
        let graph = graph_from_str(SETTINGS_GRAPH).unwrap();
        assert_eq!(graph.root.name, "Settings");
        assert_eq!(graph.definitions.len(), 2);
        assert_eq!(
            graph.root.children[0].reference,
            Some(TypeId::new("acme.dev/models/additional", "InnerSettings"))
        );
        assert_eq!(graph.root.children[1].kind, TypeKind::Float32);
    }

    #[test]
    fn load_failure_names_the_json_path() {
        let src = r#"{"root": {"name": "X", "kind": "struct", "children": 7}}"#;
        let err = graph_from_str(src).unwrap_err();
        match err {
            Error::InvalidGraph { path, .. } => assert!(path.contains("children"), "{path}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn front_end_feeds_the_generator() {
        let mut generator = crate::generator::Generator::default()
            .with_front_end(JsonFrontEnd::new(SETTINGS_GRAPH));
        let document = generator.generate().unwrap();
        let value = serde_json::to_value(document).unwrap();
        assert_eq!(
            value["properties"]["valInnerSettings"]["$ref"],
            "#/$defs/InnerSettings"
        );
    }
}
