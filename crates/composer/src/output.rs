//! The synthetic output node closing a build: a fragment-stage node whose
//! requirements are the requested feature list and whose GLSL body is
//! synthesized after resolution by wiring each final render target to the
//! dependency output it is mapped to.

use std::collections::HashMap;

use crate::error::ComposeError;
use crate::library::BuildRequest;
use crate::node::{Node, Stage};
use crate::slot::Slot;

pub(crate) const OUTPUT_NODE_NAME: &str = "output";

/// Builds the root node for one compose pass. The body starts empty and is
/// filled in by `synthesize_body` once dependencies are known.
pub(crate) fn output_node(request: &BuildRequest) -> Node {
    Node {
        name: OUTPUT_NODE_NAME.to_string(),
        stage: Stage::Fragment,
        requires: request.features.clone(),
        provides: Vec::new(),
        inputs: HashMap::new(),
        outputs: request
            .outputs
            .iter()
            .map(|(name, ty)| Slot::parse(name.clone(), ty))
            .collect(),
        attributes: Vec::new(),
        uniforms: Vec::new(),
        body: String::new(),
    }
}

/// Emits one assignment per output-map entry, in map order. A `vec4` source
/// is assigned directly, a `vec3` is widened with an opaque alpha; anything
/// else has no defined widening rule and fails the build.
pub(crate) fn synthesize_body(
    root: usize,
    nodes: &[Node],
    deps: &[Vec<usize>],
    output_map: &[(String, String)],
) -> Result<String, ComposeError> {
    let mut lines = Vec::with_capacity(output_map.len());
    for (target, source) in output_map {
        let slot = deps[root]
            .iter()
            .find_map(|&dep| nodes[dep].output_by_name(source))
            .ok_or_else(|| ComposeError::MissingOutputSource {
                output: target.clone(),
                source: source.clone(),
            })?;
        let line = match slot.ty() {
            "vec4" => format!("{target} = {};", slot.name()),
            "vec3" => format!("{target} = vec4({}, 1.0);", slot.name()),
            other => {
                return Err(ComposeError::UnsupportedOutputType {
                    output: target.clone(),
                    source: source.clone(),
                    ty: other.to_string(),
                })
            }
        };
        lines.push(line);
    }
    Ok(lines.join("\n"))
}
