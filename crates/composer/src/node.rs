//! Shader fragments with a capability contract: the effects a node provides,
//! the effects it requires from the rest of the library, and the typed slots
//! it reads and writes. Nodes are immutable once built; resolved dependency
//! edges live in a per-build side table inside `resolver`, never on the node
//! itself, so a shared library can serve many builds.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::slot::Slot;

/// Pipeline stage a node's GLSL body belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Vertex,
    Fragment,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Vertex => f.write_str("vertex"),
            Stage::Fragment => f.write_str("fragment"),
        }
    }
}

/// One shader fragment in the library (or the synthetic output node).
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) stage: Stage,
    pub(crate) requires: Vec<String>,
    pub(crate) provides: Vec<String>,
    pub(crate) inputs: HashMap<String, Slot>,
    pub(crate) outputs: Vec<Slot>,
    pub(crate) attributes: Vec<Slot>,
    pub(crate) uniforms: Vec<Slot>,
    pub(crate) body: String,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn requires(&self) -> &[String] {
        &self.requires
    }

    pub fn provides(&self) -> &[String] {
        &self.provides
    }

    pub fn provides_effect(&self, effect: &str) -> bool {
        self.provides.iter().any(|p| p == effect)
    }

    pub fn inputs(&self) -> &HashMap<String, Slot> {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Slot] {
        &self.outputs
    }

    pub fn attributes(&self) -> &[Slot] {
        &self.attributes
    }

    pub fn uniforms(&self) -> &[Slot] {
        &self.uniforms
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn output_by_name(&self, name: &str) -> Option<&Slot> {
        self.outputs.iter().find(|slot| slot.name() == name)
    }
}
