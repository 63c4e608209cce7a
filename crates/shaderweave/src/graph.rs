//! Renders the resolved dependency graph as Graphviz DOT text so a failed or
//! surprising composition can be inspected with `dot -Tpng`. Nodes on the
//! resolved build path are drawn red, dependency edges dashed blue.

use composer::GraphReport;

pub fn render_dot(report: &GraphReport) -> String {
    let mut out = String::from("digraph shaderweave {\n\tnode [shape=record];\n");
    for (name, stage) in &report.nodes {
        let color = if report.order.iter().any(|n| n == name) {
            "red"
        } else {
            "black"
        };
        out.push_str(&format!(
            "\t\"{name}\" [label=\"{{{name}|{stage}}}\", color={color}];\n"
        ));
    }
    for (from, to) in &report.edges {
        out.push_str(&format!(
            "\t\"{from}\" -> \"{to}\" [color=blue, style=dashed];\n"
        ));
    }
    out.push_str("}\n");
    out
}
