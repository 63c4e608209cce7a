//! Serializable description of a composed program's binding interface, in
//! the same deduplicated, sorted order the GLSL declarations are rendered.
//! Downstream renderer code reads this to wire vertex buffers and uniform
//! uploads without re-parsing the generated source.

use serde::{Deserialize, Serialize};

use crate::compiler::AttributeBinding;
use crate::slot::Slot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderMetadata {
    pub attributes: Vec<InterfaceVar>,
    pub uniforms: Vec<InterfaceVar>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceVar {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl InterfaceVar {
    fn describe(slot: &Slot) -> Self {
        Self {
            name: slot.name().to_string(),
            ty: slot.ty().to_string(),
        }
    }
}

impl ShaderMetadata {
    pub(crate) fn describe(attributes: &[AttributeBinding], uniforms: &[Slot]) -> Self {
        Self {
            attributes: attributes
                .iter()
                .map(|binding| InterfaceVar::describe(&binding.slot))
                .collect(),
            uniforms: uniforms.iter().map(InterfaceVar::describe).collect(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
