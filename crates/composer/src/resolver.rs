//! Capability-based dependency resolution: links every required effect to
//! the library node providing it, rejects cycles, and linearizes the graph
//! into a dependencies-first build order for the compiler.
//!
//! Dependency edges are held in a side table indexed like the working node
//! slice, so resolution never mutates the nodes it walks and repeated builds
//! against one library stay independent.

use std::collections::VecDeque;

use tracing::debug;

use crate::error::ComposeError;
use crate::node::Node;

#[derive(Debug)]
pub(crate) struct Resolution {
    /// Indices into the working node slice, dependencies first, root last.
    pub order: Vec<usize>,
    /// Direct dependency edges per node, in `requires` order.
    pub deps: Vec<Vec<usize>>,
}

pub(crate) fn resolve(nodes: &[Node], root: usize) -> Result<Resolution, ComposeError> {
    let deps = link_dependencies(nodes)?;
    check_cycles(nodes, &deps, root)?;
    let order = linearize(&deps, root);
    debug!(
        root = nodes[root].name(),
        order = ?order.iter().map(|&i| nodes[i].name()).collect::<Vec<_>>(),
        "resolved shader node order"
    );
    Ok(Resolution { order, deps })
}

/// Maps each node's `requires` list onto the providing nodes. A node never
/// satisfies its own requirement.
fn link_dependencies(nodes: &[Node]) -> Result<Vec<Vec<usize>>, ComposeError> {
    let mut deps = Vec::with_capacity(nodes.len());
    for (idx, node) in nodes.iter().enumerate() {
        let mut edges = Vec::with_capacity(node.requires().len());
        for effect in node.requires() {
            let provider = nodes
                .iter()
                .enumerate()
                .find(|(cand, n)| *cand != idx && n.provides_effect(effect))
                .map(|(cand, _)| cand)
                .ok_or_else(|| ComposeError::MissingProvider {
                    node: node.name().to_string(),
                    effect: effect.clone(),
                })?;
            edges.push(provider);
        }
        deps.push(edges);
    }
    Ok(deps)
}

/// Depth-first walk from the root; a back edge means the requires/provides
/// graph is cyclic and would otherwise make the traversal below loop forever.
fn check_cycles(nodes: &[Node], deps: &[Vec<usize>], root: usize) -> Result<(), ComposeError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        Visiting,
        Done,
    }

    fn visit(
        idx: usize,
        deps: &[Vec<usize>],
        marks: &mut [Mark],
        trail: &mut Vec<usize>,
    ) -> Result<(), Vec<usize>> {
        marks[idx] = Mark::Visiting;
        trail.push(idx);
        for &dep in &deps[idx] {
            match marks[dep] {
                Mark::Visiting => {
                    let start = trail.iter().position(|&n| n == dep).unwrap_or(0);
                    let mut cycle = trail[start..].to_vec();
                    cycle.push(dep);
                    return Err(cycle);
                }
                Mark::Unvisited => visit(dep, deps, marks, trail)?,
                Mark::Done => {}
            }
        }
        trail.pop();
        marks[idx] = Mark::Done;
        Ok(())
    }

    let mut marks = vec![Mark::Unvisited; deps.len()];
    let mut trail = Vec::new();
    visit(root, deps, &mut marks, &mut trail).map_err(|cycle| ComposeError::CyclicRequirement {
        path: cycle
            .into_iter()
            .map(|i| nodes[i].name().to_string())
            .collect(),
    })
}

/// Breadth-first requeue-and-dedupe traversal. Every time a node is reached
/// again it moves to the most dependency-deep position, so after reversing
/// the path each node sits strictly after everything it depends on, exactly
/// once.
fn linearize(deps: &[Vec<usize>], root: usize) -> Vec<usize> {
    let mut path: Vec<usize> = Vec::new();
    let mut queue: VecDeque<usize> = VecDeque::from([root]);
    while let Some(node) = queue.pop_front() {
        if let Some(seen) = path.iter().position(|&n| n == node) {
            path.remove(seen);
        }
        path.push(node);
        for &dep in &deps[node] {
            if let Some(seen) = path.iter().position(|&n| n == dep) {
                path.remove(seen);
            }
            queue.push_back(dep);
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Stage;
    use crate::schema::NodeRecord;

    fn node(name: &str, stage: Stage, requires: &[&str], provides: &[&str]) -> Node {
        let record: NodeRecord = serde_yaml::from_str(&format!(
            "stage: {stage}\nrequires: [{}]\nprovides: [{}]\n",
            requires.join(", "),
            provides.join(", "),
        ))
        .expect("node record");
        record.into_node(name)
    }

    fn names(nodes: &[Node], order: &[usize]) -> Vec<String> {
        order.iter().map(|&i| nodes[i].name().to_string()).collect()
    }

    #[test]
    fn orders_dependencies_first() {
        let nodes = vec![
            node("transform", Stage::Vertex, &[], &["transform"]),
            node("color", Stage::Fragment, &["transform"], &["color"]),
            node("output", Stage::Fragment, &["color"], &[]),
        ];

        let resolution = resolve(&nodes, 2).expect("resolve");
        assert_eq!(names(&nodes, &resolution.order), ["transform", "color", "output"]);
    }

    #[test]
    fn diamond_dependency_appears_once_before_both_dependents() {
        let nodes = vec![
            node("shared", Stage::Vertex, &[], &["shared"]),
            node("left", Stage::Fragment, &["shared"], &["left"]),
            node("right", Stage::Fragment, &["shared"], &["right"]),
            node("output", Stage::Fragment, &["left", "right"], &[]),
        ];

        let resolution = resolve(&nodes, 3).expect("resolve");
        let order = names(&nodes, &resolution.order);
        assert_eq!(order.iter().filter(|n| *n == "shared").count(), 1);
        let at = |name: &str| order.iter().position(|n| n == name).unwrap();
        assert!(at("shared") < at("left"));
        assert!(at("shared") < at("right"));
        assert_eq!(at("output"), order.len() - 1);
    }

    #[test]
    fn every_node_follows_its_dependencies() {
        let nodes = vec![
            node("a", Stage::Vertex, &[], &["a"]),
            node("b", Stage::Vertex, &["a"], &["b"]),
            node("c", Stage::Fragment, &["a", "b"], &["c"]),
            node("d", Stage::Fragment, &["c", "a"], &["d"]),
            node("output", Stage::Fragment, &["d", "b"], &[]),
        ];

        let resolution = resolve(&nodes, 4).expect("resolve");
        let position: Vec<usize> = (0..nodes.len())
            .map(|i| resolution.order.iter().position(|&n| n == i).unwrap())
            .collect();
        for (idx, edges) in resolution.deps.iter().enumerate() {
            for &dep in edges {
                assert!(
                    position[dep] < position[idx],
                    "{} must precede {}",
                    nodes[dep].name(),
                    nodes[idx].name()
                );
            }
        }
    }

    #[test]
    fn missing_provider_is_an_error() {
        let nodes = vec![node("output", Stage::Fragment, &["doesNotExist"], &[])];

        let err = resolve(&nodes, 0).unwrap_err();
        assert!(matches!(
            err,
            ComposeError::MissingProvider { node, effect }
                if node == "output" && effect == "doesNotExist"
        ));
    }

    #[test]
    fn node_cannot_satisfy_its_own_requirement() {
        let nodes = vec![node("selfish", Stage::Fragment, &["glow"], &["glow"])];

        assert!(matches!(
            resolve(&nodes, 0).unwrap_err(),
            ComposeError::MissingProvider { .. }
        ));
    }

    #[test]
    fn cyclic_requirements_are_rejected() {
        let nodes = vec![
            node("a", Stage::Fragment, &["b"], &["a"]),
            node("b", Stage::Fragment, &["a"], &["b"]),
            node("output", Stage::Fragment, &["a"], &[]),
        ];

        let err = resolve(&nodes, 2).unwrap_err();
        match err {
            ComposeError::CyclicRequirement { path } => {
                assert!(path.len() >= 3);
                assert_eq!(path.first(), path.last());
            }
            other => panic!("expected cycle error, got {other:?}"),
        }
    }
}
