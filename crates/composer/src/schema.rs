//! Defines the declarative record schema a shader library is written in,
//! letting the loading collaborator deserialize any serde format (the CLI
//! uses YAML) into in-memory `Node`s without the core touching disk.
//!
//! Types:
//!
//! - `NodeRecord` mirrors one library entry: stage, capability contract,
//!   slot declarations, and the raw GLSL body.
//! - `InputBlock` groups the `in.attributes` / `in.uniforms` / `in.vars`
//!   lists with serde defaults that tolerate sparse records.
//! - `DeclList` is the single-key `{name: typeString}` entry list shape the
//!   library format uses for every slot group.
//!
//! Functions:
//!
//! - `NodeRecord::into_node` eagerly parses every declaration into `Slot`s
//!   and trims each GLSL line on ingestion.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::node::{Node, Stage};
use crate::slot::Slot;

/// Ordered list of single-key `{name: typeString}` entries.
pub type DeclList = Vec<BTreeMap<String, String>>;

#[derive(Debug, Clone, Deserialize)]
pub struct NodeRecord {
    pub stage: Stage,
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub provides: Vec<String>,
    #[serde(default, rename = "in")]
    pub inputs: InputBlock,
    #[serde(default)]
    pub out: DeclList,
    #[serde(default)]
    pub glsl: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputBlock {
    #[serde(default)]
    pub attributes: DeclList,
    #[serde(default)]
    pub uniforms: DeclList,
    #[serde(default)]
    pub vars: DeclList,
}

impl NodeRecord {
    pub fn into_node(self, name: impl Into<String>) -> Node {
        Node {
            name: name.into(),
            stage: self.stage,
            requires: self.requires,
            provides: self.provides,
            inputs: slots(&self.inputs.vars)
                .map(|slot| (slot.name().to_string(), slot))
                .collect(),
            outputs: slots(&self.out).collect(),
            attributes: slots(&self.inputs.attributes).collect(),
            uniforms: slots(&self.inputs.uniforms).collect(),
            body: trim_lines(&self.glsl),
        }
    }
}

fn slots(decls: &DeclList) -> impl Iterator<Item = Slot> + '_ {
    decls
        .iter()
        .flat_map(|entry| entry.iter())
        .map(|(name, ty)| Slot::parse(name.clone(), ty))
}

fn trim_lines(glsl: &str) -> String {
    glsl.lines().map(str::trim).collect::<Vec<_>>().join("\n")
}
