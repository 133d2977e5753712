//! Definition builder and document assembler.
//!
//! One conversion call owns one builder; the definitions map is mutated in
//! place while children are still being filled in, so nothing here is
//! shared across conversions.
//!
//! Cycle safety hangs on one move: an empty `object` fragment is inserted
//! under a definition's name *before* its children are encoded. A child
//! that leads back to the same identity finds the reservation and emits a
//! `$ref` instead of recursing, so walks over cyclic graphs terminate.

use indexmap::IndexMap;

use crate::config::Config;
use crate::encode;
use crate::error::{Error, FieldContext, Result};
use crate::graph::{TypeGraph, TypeId, TypeNode};
use crate::schema::{ObjectSchema, Schema};

/// Convert a whole graph into a single document under the given config.
pub fn build_document(config: &Config, graph: &TypeGraph) -> Result<Schema> {
    DocumentBuilder::new(config, graph).assemble()
}

struct DocumentBuilder<'a> {
    config: &'a Config,
    graph: &'a TypeGraph,
    root_id: TypeId,
    /// Identity to emitted definition name, assigned up front so `$ref`
    /// targets and definition keys agree.
    names: IndexMap<TypeId, String>,
    /// Definition name to schema, in build order.
    defs: IndexMap<String, Schema>,
}

impl<'a> DocumentBuilder<'a> {
    fn new(config: &'a Config, graph: &'a TypeGraph) -> Self {
        Self {
            config,
            graph,
            root_id: graph.root_id(),
            names: IndexMap::new(),
            defs: IndexMap::new(),
        }
    }

    fn assemble(mut self) -> Result<Schema> {
        if !self.graph.root.kind.is_composite() {
            return Err(Error::UnsupportedType {
                type_name: self.graph.root.name.clone(),
                kind: self.graph.root.kind.to_string(),
                context: FieldContext::new(
                    self.graph.root.namespace.clone(),
                    self.graph.root.name.clone(),
                    "",
                ),
            });
        }

        self.assign_names();
        self.build_definitions()?;

        // The root is built exactly like a definition but never reserved
        // under the output map; it is represented once, at top level.
        let mut root = self.build_object(&self.graph.root)?;

        let draft = self.config.schema_version;
        root.schema = Some(draft);
        let id_uri = format!(
            "https://{}/{}",
            self.graph.root.namespace, self.graph.root.name
        );
        if draft.uses_legacy_id() {
            root.legacy_id = Some(id_uri);
        } else {
            root.id = Some(id_uri);
        }
        if !self.defs.is_empty() {
            if draft.definitions_keyword() == "$defs" {
                root.defs = Some(self.defs);
            } else {
                root.legacy_defs = Some(self.defs);
            }
        }
        Ok(Schema::Object(Box::new(root)))
    }

    /// Definition names in arena insertion order: bare type name wins
    /// first-come; a collision falls back to the last namespace segment,
    /// then to the full namespace with `/` flattened to `.`.
    fn assign_names(&mut self) {
        for id in self.graph.definitions.keys() {
            if *id == self.root_id {
                continue;
            }
            let mut candidate = id.name.clone();
            if self.name_taken(&candidate) {
                if let Some(segment) = id.namespace.rsplit('/').next().filter(|s| !s.is_empty())
                {
                    candidate = format!("{segment}.{}", id.name);
                }
            }
            if self.name_taken(&candidate) {
                candidate = format!("{}.{}", id.namespace.replace('/', "."), id.name);
            }
            self.names.insert(id.clone(), candidate);
        }
    }

    fn name_taken(&self, candidate: &str) -> bool {
        self.names.values().any(|name| name == candidate)
    }

    fn def_name(&self, id: &TypeId) -> String {
        self.names
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.name.clone())
    }

    /// Walk every composite in the arena once. Iteration order only
    /// affects output ordering; the identity-keyed map guarantees each
    /// composite is processed a single time.
    fn build_definitions(&mut self) -> Result<()> {
        let ids: Vec<TypeId> = self.graph.definitions.keys().cloned().collect();
        for id in ids {
            if id == self.root_id {
                continue;
            }
            self.build_definition(&id)?;
        }
        Ok(())
    }

    fn build_definition(&mut self, id: &TypeId) -> Result<()> {
        let name = self.def_name(id);
        // Already built, or reserved further up the current walk.
        if self.defs.contains_key(&name) {
            return Ok(());
        }
        // Reserve before recursing into children; this is what breaks
        // cycles back to this identity.
        self.defs.insert(name.clone(), Schema::object());

        let Some(node) = self.graph.get(id) else {
            return Err(Error::UnresolvedReference {
                target: id.clone(),
                context: FieldContext::new(id.namespace.clone(), id.name.clone(), ""),
            });
        };
        let object = self.build_object(node)?;
        self.defs.insert(name, Schema::Object(Box::new(object)));
        Ok(())
    }

    /// Property and required sets for one composite, fields in
    /// declaration order.
    fn build_object(&mut self, node: &TypeNode) -> Result<ObjectSchema> {
        let mut object = ObjectSchema::new();
        for child in &node.children {
            let context = FieldContext::new(
                node.namespace.clone(),
                node.name.clone(),
                child.field_name.clone(),
            );
            let property = encode::property_name(self.config, child).to_string();
            let fragment = self.encode_child(child, &context)?;
            object.add_property(property.clone(), fragment);
            if !child.optional {
                object.add_required(property);
            }
        }
        Ok(object)
    }

    fn encode_child(&mut self, child: &TypeNode, context: &FieldContext) -> Result<Schema> {
        if let Some(target) = &child.reference {
            return self.reference_fragment(target.clone(), context);
        }
        if child.kind.is_composite() {
            // A front-end that inlined a first occurrence instead of
            // linking it; resolve through the arena all the same.
            return self.reference_fragment(child.id(), context);
        }
        encode::encode_primitive(child, context)
    }

    fn reference_fragment(&mut self, target: TypeId, context: &FieldContext) -> Result<Schema> {
        if target == self.root_id {
            return Ok(Schema::reference("#"));
        }
        if !self.graph.contains(&target) {
            return Err(Error::UnresolvedReference {
                target,
                context: context.clone(),
            });
        }
        self.build_definition(&target)?;
        Ok(Schema::reference(format!(
            "{}{}",
            self.config.schema_version.ref_prefix(),
            self.def_name(&target)
        )))
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TypeKind;
    use crate::schema::DraftVersion;
    use serde_json::json;

    fn inner_settings(ns: &str) -> TypeNode {
        TypeNode::new(ns, "InnerSettings", TypeKind::Struct)
            .with_child(
                TypeNode::primitive(TypeKind::String)
                    .with_field_name("StringValue")
                    .with_tag("json", ["stringValue"]),
            )
            .with_child(
                TypeNode::primitive(TypeKind::Int)
                    .with_field_name("IntValue")
                    .with_tag("json", ["intValue"])
                    .with_tag("jsonschema", ["minimum=0", "maximum=10"]),
            )
            .with_child(
                TypeNode::primitive(TypeKind::Bool)
                    .with_field_name("BoolValue")
                    .with_tag("json", ["boolValue"]),
            )
    }

    fn settings_graph() -> TypeGraph {
        let inner = inner_settings("acme.dev/models/additional");
        let inner_id = inner.id();
        let root = TypeNode::new("acme.dev/models/base", "Settings", TypeKind::Struct)
            .with_child(
                TypeNode::reference(inner_id.clone())
                    .with_field_name("ValInnerSettings")
                    .with_tag("json", ["valInnerSettings"]),
            )
            .with_child(
                TypeNode::reference(inner_id.clone())
                    .with_field_name("RefInnerSettings")
                    .with_tag("json", ["refInnerSettings", "omitempty"])
                    .into_optional(),
            )
            .with_child(
                TypeNode::primitive(TypeKind::Float32)
                    .with_field_name("FloatValue")
                    .with_tag("json", ["floatValue"]),
            );
        let mut graph = TypeGraph::new(root.clone());
        graph.define(root);
        graph.define(inner);
        graph
    }

    #[test]
    fn settings_scenario_matches_expected_document() {
        let document = build_document(&Config::default(), &settings_graph()).unwrap();
        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(
            value,
            json!({
                "$schema": "https://json-schema.org/draft/2020-12/schema",
                "$id": "https://acme.dev/models/base/Settings",
                "type": "object",
                "properties": {
                    "valInnerSettings": {"$ref": "#/$defs/InnerSettings"},
                    "refInnerSettings": {"$ref": "#/$defs/InnerSettings"},
                    "floatValue": {"type": "number"}
                },
                "required": ["valInnerSettings", "floatValue"],
                "$defs": {
                    "InnerSettings": {
                        "type": "object",
                        "properties": {
                            "stringValue": {"type": "string"},
                            "intValue": {"type": "integer", "minimum": 0, "maximum": 10},
                            "boolValue": {"type": "boolean"}
                        },
                        "required": ["stringValue", "intValue", "boolValue"]
                    }
                }
            })
        );
    }

    #[test]
    fn repeated_references_share_one_definition() {
        let value =
            serde_json::to_value(build_document(&Config::default(), &settings_graph()).unwrap())
                .unwrap();
        let defs = value["$defs"].as_object().unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(
            value["properties"]["valInnerSettings"],
            value["properties"]["refInnerSettings"]
        );
    }

    #[test]
    fn mutually_recursive_composites_terminate() {
        let a_id = TypeId::new("ns/pkg", "A");
        let b_id = TypeId::new("ns/pkg", "B");
        let a = TypeNode::new("ns/pkg", "A", TypeKind::Struct)
            .with_child(TypeNode::reference(b_id.clone()).with_field_name("B"));
        let b = TypeNode::new("ns/pkg", "B", TypeKind::Struct)
            .with_child(TypeNode::reference(a_id.clone()).with_field_name("A"));
        let root = TypeNode::new("ns/pkg", "Root", TypeKind::Struct)
            .with_child(TypeNode::reference(a_id).with_field_name("A"));
        let mut graph = TypeGraph::new(root.clone());
        graph.define(root);
        graph.define(a);
        graph.define(b);

        let value =
            serde_json::to_value(build_document(&Config::default(), &graph).unwrap()).unwrap();
        assert_eq!(value["$defs"]["A"]["properties"]["B"]["$ref"], "#/$defs/B");
        assert_eq!(value["$defs"]["B"]["properties"]["A"]["$ref"], "#/$defs/A");
    }

    #[test]
    fn root_self_reference_points_at_document_root() {
        let root_id = TypeId::new("ns/pkg", "Tree");
        let root = TypeNode::new("ns/pkg", "Tree", TypeKind::Struct)
            .with_child(
                TypeNode::reference(root_id)
                    .with_field_name("Parent")
                    .into_optional(),
            )
            .with_child(TypeNode::primitive(TypeKind::String).with_field_name("Label"));
        let mut graph = TypeGraph::new(root.clone());
        graph.define(root);

        let value =
            serde_json::to_value(build_document(&Config::default(), &graph).unwrap()).unwrap();
        assert_eq!(value["properties"]["Parent"]["$ref"], "#");
        // Represented once, at top level; never duplicated in the defs map.
        assert!(value.get("$defs").is_none());
        assert_eq!(value["required"], json!(["Label"]));
    }

    #[test]
    fn colliding_definition_names_are_qualified() {
        let first = TypeNode::new("ns/alpha", "Config", TypeKind::Struct)
            .with_child(TypeNode::primitive(TypeKind::Int).with_field_name("A"));
        let second = TypeNode::new("ns/beta", "Config", TypeKind::Struct)
            .with_child(TypeNode::primitive(TypeKind::Bool).with_field_name("B"));
        let root = TypeNode::new("ns", "Root", TypeKind::Struct)
            .with_child(TypeNode::reference(first.id()).with_field_name("First"))
            .with_child(TypeNode::reference(second.id()).with_field_name("Second"));
        let mut graph = TypeGraph::new(root.clone());
        graph.define(root);
        graph.define(first);
        graph.define(second);

        let value =
            serde_json::to_value(build_document(&Config::default(), &graph).unwrap()).unwrap();
        assert_eq!(value["properties"]["First"]["$ref"], "#/$defs/Config");
        assert_eq!(
            value["properties"]["Second"]["$ref"],
            "#/$defs/beta.Config"
        );
        let defs = value["$defs"].as_object().unwrap();
        assert!(defs.contains_key("Config") && defs.contains_key("beta.Config"));
    }

    #[test]
    fn dangling_reference_fails_loudly() {
        let root = TypeNode::new("ns", "Root", TypeKind::Struct).with_child(
            TypeNode::reference(TypeId::new("ns", "Ghost")).with_field_name("Ghost"),
        );
        let mut graph = TypeGraph::new(root.clone());
        graph.define(root);
        let err = build_document(&Config::default(), &graph).unwrap_err();
        assert!(matches!(err, Error::UnresolvedReference { .. }));
    }

    #[test]
    fn unresolved_child_kind_aborts_whole_conversion() {
        let root = TypeNode::new("ns", "Root", TypeKind::Struct)
            .with_child(TypeNode::new("", "chan int", TypeKind::Unresolved).with_field_name("C"));
        let mut graph = TypeGraph::new(root.clone());
        graph.define(root);
        let err = build_document(&Config::default(), &graph).unwrap_err();
        match err {
            Error::UnsupportedType { context, .. } => {
                assert_eq!(context.field_name, "C");
                assert_eq!(context.type_name, "Root");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn legacy_drafts_place_id_and_definitions_differently() {
        let graph = settings_graph();
        let d7 = serde_json::to_value(
            build_document(&Config::default().with_draft(DraftVersion::Draft07), &graph)
                .unwrap(),
        )
        .unwrap();
        assert!(d7.get("$defs").is_none());
        assert_eq!(
            d7["properties"]["valInnerSettings"]["$ref"],
            "#/definitions/InnerSettings"
        );
        assert!(d7["definitions"]["InnerSettings"].is_object());
        assert_eq!(d7["$id"], "https://acme.dev/models/base/Settings");

        let d4 = serde_json::to_value(
            build_document(&Config::default().with_draft(DraftVersion::Draft04), &graph)
                .unwrap(),
        )
        .unwrap();
        assert!(d4.get("$id").is_none());
        assert_eq!(d4["id"], "https://acme.dev/models/base/Settings");
    }

    #[test]
    fn conversion_is_deterministic() {
        let graph = settings_graph();
        let config = Config::default();
        let first = serde_json::to_string(&build_document(&config, &graph).unwrap()).unwrap();
        let second = serde_json::to_string(&build_document(&config, &graph).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
