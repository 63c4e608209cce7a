//! The shared node library and the compose entry point tying resolution,
//! root-node synthesis, and compilation together. A library is built once
//! from declarative records and never mutated afterwards; every compose pass
//! works on a private working copy with the synthetic output node appended,
//! so builds can run repeatedly or concurrently against one library.
//!
//! Types:
//!
//! - `NodeLibrary` owns the immutable node collection and rejects duplicate
//!   effect providers at construction.
//! - `BuildRequest` names one composition target: requested features, output
//!   basename, final render-target slots, and the output wiring map.
//! - `Composition` carries the two GLSL sources, the interface metadata, and
//!   a `GraphReport` for the debug-diagram collaborator.
//! - `GraphReport` lists library nodes, dependency edges, and the resolved
//!   order by name, which is all a DOT renderer needs.

use std::collections::{BTreeMap, HashMap};

use tracing::info;

use crate::compiler;
use crate::error::ComposeError;
use crate::metadata::ShaderMetadata;
use crate::node::{Node, Stage};
use crate::output;
use crate::resolver::{self, Resolution};
use crate::schema::NodeRecord;

#[derive(Debug, Clone)]
pub struct NodeLibrary {
    nodes: Vec<Node>,
}

/// One composition target: the features the program must provide and the
/// render-target wiring that closes it.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// Effects the composed program must provide.
    pub features: Vec<String>,
    /// Basename for the generated artifacts.
    pub name: String,
    /// Final render-target slots as ordered `(name, typeString)` pairs; list
    /// position fixes the fragment output location.
    pub outputs: Vec<(String, String)>,
    /// Ordered wiring from a render-target name to the dependency output it
    /// is assigned from.
    pub output_map: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct Composition {
    pub vertex: String,
    pub fragment: String,
    pub metadata: ShaderMetadata,
    pub graph: GraphReport,
}

#[derive(Debug, Clone)]
pub struct GraphReport {
    /// Every node of the working library as `(name, stage)`.
    pub nodes: Vec<(String, Stage)>,
    /// Resolved dependency edges as `(dependent, dependency)` name pairs.
    pub edges: Vec<(String, String)>,
    /// Names along the resolved build order, dependencies first.
    pub order: Vec<String>,
}

impl GraphReport {
    fn describe(nodes: &[Node], resolution: &Resolution) -> Self {
        Self {
            nodes: nodes
                .iter()
                .map(|node| (node.name().to_string(), node.stage()))
                .collect(),
            edges: resolution
                .deps
                .iter()
                .enumerate()
                .flat_map(|(from, edges)| {
                    edges.iter().map(move |&to| {
                        (nodes[from].name().to_string(), nodes[to].name().to_string())
                    })
                })
                .collect(),
            order: resolution
                .order
                .iter()
                .map(|&idx| nodes[idx].name().to_string())
                .collect(),
        }
    }
}

impl NodeLibrary {
    /// Builds the library from declarative records keyed by node name.
    pub fn from_records(records: BTreeMap<String, NodeRecord>) -> Result<Self, ComposeError> {
        Self::new(
            records
                .into_iter()
                .map(|(name, record)| record.into_node(name))
                .collect(),
        )
    }

    /// Wraps an already-built node collection. Two nodes providing the same
    /// effect make provider lookup ambiguous, so that is a hard error here
    /// rather than a silent first-match at resolve time.
    pub fn new(nodes: Vec<Node>) -> Result<Self, ComposeError> {
        let mut providers: HashMap<&str, &str> = HashMap::new();
        for node in &nodes {
            for effect in node.provides() {
                if let Some(first) = providers.insert(effect, node.name()) {
                    return Err(ComposeError::DuplicateProvider {
                        effect: effect.clone(),
                        first: first.to_string(),
                        second: node.name().to_string(),
                    });
                }
            }
        }
        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Runs one resolve + synthesize + compile cycle for the request.
    pub fn compose(&self, request: &BuildRequest) -> Result<Composition, ComposeError> {
        let mut working = self.nodes.clone();
        working.push(output::output_node(request));
        let root = working.len() - 1;

        let resolution = resolver::resolve(&working, root)?;
        let body = output::synthesize_body(root, &working, &resolution.deps, &request.output_map)?;
        working[root].body = body;

        let compiled = compiler::compile(&working, &resolution.order)?;
        info!(
            target_name = %request.name,
            features = ?request.features,
            nodes = resolution.order.len(),
            "composed shader program"
        );
        Ok(Composition {
            vertex: compiled.vertex,
            fragment: compiled.fragment,
            metadata: compiled.metadata,
            graph: GraphReport::describe(&working, &resolution),
        })
    }
}
