//! Turns a resolved node order into the two GLSL-300-es program texts and
//! the interface metadata. The merge pass deduplicates slot declarations
//! across nodes and assigns attribute binding locations; rendering goes
//! through a small per-stage intermediate form so the output layout lives in
//! one place and stays byte-for-byte deterministic.
//!
//! Types:
//!
//! - `Compiled` bundles the vertex source, fragment source, and metadata for
//!   one build.
//! - `AttributeBinding` pairs a merged attribute slot with the location the
//!   fixed priority table assigns it.
//! - `StageIr` holds the declaration lists and body blocks of one stage and
//!   renders them in a single pass.
//!
//! Functions:
//!
//! - `compile` merges slots across the resolved order, binds attributes, and
//!   renders both stages.

use tracing::debug;

use crate::error::ComposeError;
use crate::metadata::ShaderMetadata;
use crate::node::{Node, Stage};
use crate::slot::Slot;

/// Fixed attribute binding table. An attribute's location is its index in
/// this table, not its position in the rendered declaration list, so a
/// program using only `position` and `uv` still binds them at 0 and 3.
const ATTRIBUTE_BINDINGS: [&str; 4] = ["position", "color", "normal", "uv"];

pub(crate) struct Compiled {
    pub vertex: String,
    pub fragment: String,
    pub metadata: ShaderMetadata,
}

#[derive(Debug, Clone)]
pub(crate) struct AttributeBinding {
    pub location: usize,
    pub slot: Slot,
}

pub(crate) fn compile(nodes: &[Node], order: &[usize]) -> Result<Compiled, ComposeError> {
    let mut attributes: Vec<Slot> = Vec::new();
    let mut uniforms: Vec<Slot> = Vec::new();
    let mut varyings: Vec<Slot> = Vec::new();
    for &idx in order {
        let node = &nodes[idx];
        merge_slots(&mut attributes, node.attributes());
        merge_slots(&mut uniforms, node.uniforms());
        if node.stage() == Stage::Vertex {
            merge_slots(&mut varyings, node.outputs());
        }
    }

    // The last node in the order is the synthetic output node; its outputs
    // become the program's render targets.
    let mut targets: Vec<Slot> = Vec::new();
    if let Some(&last) = order.last() {
        merge_slots(&mut targets, nodes[last].outputs());
    }

    let attributes = bind_attributes(attributes)?;
    debug!(
        attributes = ?attributes.iter().map(|b| (b.slot.name(), b.location)).collect::<Vec<_>>(),
        uniforms = uniforms.len(),
        varyings = varyings.len(),
        targets = targets.len(),
        "merged shader interface"
    );

    let verts: Vec<&Node> = order
        .iter()
        .map(|&i| &nodes[i])
        .filter(|n| n.stage() == Stage::Vertex)
        .collect();
    let frags: Vec<&Node> = order
        .iter()
        .map(|&i| &nodes[i])
        .filter(|n| n.stage() == Stage::Fragment)
        .collect();

    let metadata = ShaderMetadata::describe(&attributes, &uniforms);
    let vertex = StageIr::build(Stage::Vertex, &verts, &attributes, &uniforms, &varyings, &targets)
        .render();
    let fragment = StageIr::build(
        Stage::Fragment,
        &frags,
        &attributes,
        &uniforms,
        &varyings,
        &targets,
    )
    .render();

    Ok(Compiled {
        vertex,
        fragment,
        metadata,
    })
}

/// First-seen-order merge keyed on slot name + type.
fn merge_slots(into: &mut Vec<Slot>, extra: &[Slot]) {
    for slot in extra {
        if !into.contains(slot) {
            into.push(slot.clone());
        }
    }
}

/// Assigns each merged attribute its fixed location and sorts the list by
/// location (stable, so first-seen order breaks ties). Names outside the
/// table are a configuration error rather than an invalid `location = -1`.
fn bind_attributes(attributes: Vec<Slot>) -> Result<Vec<AttributeBinding>, ComposeError> {
    let mut bound = Vec::with_capacity(attributes.len());
    for slot in attributes {
        let location = ATTRIBUTE_BINDINGS
            .iter()
            .position(|&known| known == slot.name())
            .ok_or_else(|| ComposeError::UnboundAttribute {
                name: slot.name().to_string(),
            })?;
        bound.push(AttributeBinding { location, slot });
    }
    bound.sort_by_key(|binding| binding.location);
    Ok(bound)
}

struct StageIr<'a> {
    stage: Stage,
    attributes: &'a [AttributeBinding],
    uniforms: &'a [Slot],
    varyings: &'a [Slot],
    targets: &'a [Slot],
    /// Node outputs of this stage not covered by a varying or render target;
    /// declared at the top of `main`.
    locals: Vec<Slot>,
    blocks: Vec<(String, String)>,
}

impl<'a> StageIr<'a> {
    fn build(
        stage: Stage,
        stage_nodes: &[&Node],
        attributes: &'a [AttributeBinding],
        uniforms: &'a [Slot],
        varyings: &'a [Slot],
        targets: &'a [Slot],
    ) -> Self {
        let mut covered: Vec<&str> = varyings
            .iter()
            .chain(targets.iter())
            .map(Slot::name)
            .collect();
        let mut locals = Vec::new();
        let mut blocks = Vec::new();
        for node in stage_nodes {
            for out in node.outputs() {
                // Builtins like gl_Position need no declaration.
                if out.name().starts_with("gl_") {
                    continue;
                }
                if !covered.contains(&out.name()) {
                    covered.push(out.name());
                    locals.push(out.clone());
                }
            }
            blocks.push((node.name().to_string(), node.body().to_string()));
        }

        Self {
            stage,
            attributes,
            uniforms,
            varyings,
            targets,
            locals,
            blocks,
        }
    }

    fn render(&self) -> String {
        let mut sections: Vec<String> = Vec::new();
        sections.push("#version 300 es\nprecision mediump float;".to_string());

        if self.stage == Stage::Vertex {
            let attrs: Vec<String> = self
                .attributes
                .iter()
                .map(|binding| {
                    format!(
                        "layout(location = {}) in {};",
                        binding.location,
                        binding.slot.declaration()
                    )
                })
                .collect();
            if !attrs.is_empty() {
                sections.push(attrs.join("\n"));
            }
        }

        let uniforms: Vec<String> = self
            .uniforms
            .iter()
            .map(|slot| format!("uniform {};", slot.declaration()))
            .collect();
        if !uniforms.is_empty() {
            sections.push(uniforms.join("\n"));
        }

        let mut stage_io: Vec<String> = Vec::new();
        for slot in self.varyings {
            if slot.name().starts_with("gl_") {
                continue;
            }
            let direction = match self.stage {
                Stage::Vertex => "out",
                Stage::Fragment => "in",
            };
            stage_io.push(format!("{direction} {};", slot.declaration()));
        }
        if self.stage == Stage::Fragment {
            for (index, slot) in self.targets.iter().enumerate() {
                stage_io.push(format!(
                    "layout(location = {index}) out {};",
                    slot.declaration()
                ));
            }
        }
        if !stage_io.is_empty() {
            sections.push(stage_io.join("\n"));
        }

        let mut body: Vec<String> = Vec::new();
        for slot in &self.locals {
            body.push(format!("\t{};", slot.declaration()));
        }
        if !self.locals.is_empty() {
            body.push(String::new());
        }
        for (name, source) in &self.blocks {
            body.push(format!("//\t***********{name}**********"));
            for line in source.lines() {
                body.push(format!("\t{}", line.trim()));
            }
        }
        sections.push(format!("void main()\n{{\n{}\n}}", body.join("\n")));

        sections.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::NodeRecord;

    fn node(name: &str, yaml: &str) -> Node {
        let record: NodeRecord = serde_yaml::from_str(yaml).expect("node record");
        record.into_node(name)
    }

    fn transform() -> Node {
        node(
            "transform",
            r#"
            stage: vertex
            provides: [transform]
            in:
              attributes:
                - position: vec3
              uniforms:
                - model: mat4
            out:
              - pPosition: vec3
            glsl: "pPosition = (model * vec4(position, 1.0)).xyz;"
            "#,
        )
    }

    fn material() -> Node {
        node(
            "material",
            r#"
            stage: fragment
            requires: [transform]
            provides: [color]
            in:
              uniforms:
                - materialDiffuse: vec3
            out:
              - color: vec3
            glsl: "color = materialDiffuse;"
            "#,
        )
    }

    fn output() -> Node {
        node(
            "output",
            r#"
            stage: fragment
            requires: [color]
            out:
              - gColor: vec4
            glsl: "gColor = vec4(color, 1.0);"
            "#,
        )
    }

    #[test]
    fn attribute_binding_follows_priority_table() {
        let attrs = vec![
            Slot::parse("uv", "vec2"),
            Slot::parse("position", "vec3"),
            Slot::parse("color", "vec4"),
        ];

        let bound = bind_attributes(attrs).expect("bind");
        let summary: Vec<(&str, usize)> = bound
            .iter()
            .map(|b| (b.slot.name(), b.location))
            .collect();
        assert_eq!(summary, [("position", 0), ("color", 1), ("uv", 3)]);
    }

    #[test]
    fn unknown_attribute_is_a_configuration_error() {
        let err = bind_attributes(vec![Slot::parse("tangent", "vec3")]).unwrap_err();
        assert!(matches!(
            err,
            ComposeError::UnboundAttribute { name } if name == "tangent"
        ));
    }

    #[test]
    fn partitions_stages_and_declares_interface() {
        let nodes = vec![transform(), material(), output()];
        let compiled = compile(&nodes, &[0, 1, 2]).expect("compile");

        assert!(compiled
            .vertex
            .contains("layout(location = 0) in vec3 position;"));
        assert!(compiled.vertex.contains("out vec3 pPosition;"));
        assert!(compiled.vertex.contains("***********transform**********"));
        assert!(!compiled.vertex.contains("***********material**********"));

        assert!(compiled.fragment.contains("in vec3 pPosition;"));
        assert!(compiled
            .fragment
            .contains("layout(location = 0) out vec4 gColor;"));
        assert!(compiled.fragment.contains("***********material**********"));
        assert!(compiled.fragment.contains("***********output**********"));
        // All merged uniforms are declared in both stages.
        assert!(compiled.vertex.contains("uniform vec3 materialDiffuse;"));
        assert!(compiled.fragment.contains("uniform mat4 model;"));
    }

    #[test]
    fn fragment_outputs_outside_interface_become_locals() {
        let nodes = vec![transform(), material(), output()];
        let compiled = compile(&nodes, &[0, 1, 2]).expect("compile");

        // `color` is neither a varying nor a render target, so the fragment
        // main declares it locally, exactly once.
        assert_eq!(compiled.fragment.matches("vec3 color;").count(), 1);
        assert!(!compiled.vertex.contains("vec3 color;"));
    }

    #[test]
    fn shared_outputs_are_deduplicated() {
        let first = node(
            "first",
            r#"
            stage: vertex
            provides: [a]
            out:
              - pPosition: vec3
            "#,
        );
        let second = node(
            "second",
            r#"
            stage: vertex
            requires: [a]
            provides: [b]
            out:
              - pPosition: vec3
            "#,
        );
        let nodes = vec![first, second, output()];
        let compiled = compile(&nodes, &[0, 1, 2]).expect("compile");

        assert_eq!(compiled.vertex.matches("out vec3 pPosition;").count(), 1);
        assert_eq!(compiled.fragment.matches("in vec3 pPosition;").count(), 1);
    }

    #[test]
    fn compilation_is_deterministic() {
        let nodes = vec![transform(), material(), output()];
        let once = compile(&nodes, &[0, 1, 2]).expect("compile");
        let twice = compile(&nodes, &[0, 1, 2]).expect("compile");

        assert_eq!(once.vertex, twice.vertex);
        assert_eq!(once.fragment, twice.fragment);
        assert_eq!(once.metadata, twice.metadata);
    }

    #[test]
    fn metadata_matches_rendered_order() {
        let nodes = vec![transform(), material(), output()];
        let compiled = compile(&nodes, &[0, 1, 2]).expect("compile");

        let attrs: Vec<&str> = compiled
            .metadata
            .attributes
            .iter()
            .map(|v| v.name.as_str())
            .collect();
        assert_eq!(attrs, ["position"]);
        let uniforms: Vec<&str> = compiled
            .metadata
            .uniforms
            .iter()
            .map(|v| v.name.as_str())
            .collect();
        assert_eq!(uniforms, ["model", "materialDiffuse"]);
    }
}
