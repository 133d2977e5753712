//! Orchestration: front-end in, document out.
//!
//! The two seams are traits. A `FrontEnd` is anything that can produce a
//! conforming `TypeGraph` (live-object introspection, static analysis, or
//! the serialized loader this crate ships); an `Encoder` turns the graph
//! into a document. Hooks run between the stages for callers that want to
//! massage the graph or the finished document.

use crate::config::Config;
use crate::convert;
use crate::error::{Error, Result};
use crate::graph::TypeGraph;
use crate::schema::Schema;

/// The introspection contract: hand over a root node plus the identity-
/// keyed definitions arena described in the graph module.
pub trait FrontEnd {
    fn parse(&mut self) -> Result<TypeGraph>;
}

/// Graph-to-document encoding seam.
pub trait Encoder {
    fn encode(&self, config: &Config, graph: &TypeGraph) -> Result<Schema>;
}

/// The default encoder: definition building, per-node encoding and
/// document assembly as one deterministic pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentEncoder;

impl Encoder for DocumentEncoder {
    fn encode(&self, config: &Config, graph: &TypeGraph) -> Result<Schema> {
        convert::build_document(config, graph)
    }
}

type GraphHook = Box<dyn FnMut(&mut TypeGraph) -> Result<()>>;
type DocumentHook = Box<dyn FnMut(&mut Schema) -> Result<()>>;

/// Drives one conversion pipeline and keeps the last document around for
/// serialization. Pure and deterministic: the same input graph either
/// succeeds identically or fails identically.
pub struct Generator {
    front_end: Option<Box<dyn FrontEnd>>,
    encoder: Option<Box<dyn Encoder>>,
    after_parse: Option<GraphHook>,
    after_encode: Option<DocumentHook>,
    pub config: Config,
    document: Option<Schema>,
}

impl Default for Generator {
    fn default() -> Self {
        Self {
            front_end: None,
            encoder: Some(Box::new(DocumentEncoder)),
            after_parse: None,
            after_encode: None,
            config: Config::default(),
            document: None,
        }
    }
}

impl Generator {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// A generator with no collaborators attached at all; `generate`
    /// reports what is missing.
    pub fn empty() -> Self {
        Self {
            encoder: None,
            ..Self::default()
        }
    }

    pub fn with_front_end(mut self, front_end: impl FrontEnd + 'static) -> Self {
        self.front_end = Some(Box::new(front_end));
        self
    }

    pub fn with_encoder(mut self, encoder: impl Encoder + 'static) -> Self {
        self.encoder = Some(Box::new(encoder));
        self
    }

    pub fn after_parse(
        mut self,
        hook: impl FnMut(&mut TypeGraph) -> Result<()> + 'static,
    ) -> Self {
        self.after_parse = Some(Box::new(hook));
        self
    }

    pub fn after_encode(
        mut self,
        hook: impl FnMut(&mut Schema) -> Result<()> + 'static,
    ) -> Self {
        self.after_encode = Some(Box::new(hook));
        self
    }

    /// Run the pipeline: parse, hook, encode, hook, store.
    pub fn generate(&mut self) -> Result<&Schema> {
        let front_end = self.front_end.as_mut().ok_or(Error::MissingFrontEnd)?;
        let mut graph = front_end.parse()?;
        if let Some(hook) = self.after_parse.as_mut() {
            hook(&mut graph)?;
        }

        let encoder = self.encoder.as_ref().ok_or(Error::MissingEncoder)?;
        let mut document = encoder.encode(&self.config, &graph)?;
        if let Some(hook) = self.after_encode.as_mut() {
            hook(&mut document)?;
        }

        Ok(self.document.insert(document))
    }

    pub fn document(&self) -> Option<&Schema> {
        self.document.as_ref()
    }

    pub fn to_json(&self) -> Result<String> {
        let document = self.document.as_ref().ok_or(Error::NoDocument)?;
        Ok(serde_json::to_string(document).expect("schema documents always serialize"))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        let document = self.document.as_ref().ok_or(Error::NoDocument)?;
        Ok(serde_json::to_string_pretty(document).expect("schema documents always serialize"))
    }
}

/// One-shot conversion of an already-built graph under the default config.
pub fn from_graph(graph: TypeGraph) -> Result<Schema> {
    convert::build_document(&Config::default(), &graph)
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
