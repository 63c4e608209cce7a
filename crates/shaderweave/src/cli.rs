use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "shaderweave",
    author,
    version,
    about = "Composes GLSL programs from a YAML library of shader fragments"
)]
pub struct Args {
    /// YAML shader library: a mapping of node name to fragment record.
    #[arg(value_name = "LIBRARY")]
    pub library: PathBuf,

    /// Basename for the generated `.vert`/`.frag`/`.json` files.
    #[arg(long, value_name = "NAME")]
    pub target: String,

    /// Effect the composed program must provide; repeat for several.
    #[arg(long = "feature", value_name = "EFFECT", required = true)]
    pub features: Vec<String>,

    /// Final render target as `name:type` (e.g. `gColor:vec4`); repeat to
    /// add more, list order fixes the fragment output locations.
    #[arg(
        long = "render-target",
        value_name = "NAME:TYPE",
        value_parser = parse_render_target,
        required = true
    )]
    pub render_targets: Vec<(String, String)>,

    /// Wiring from a render target to a dependency output, as `final=source`.
    #[arg(
        long = "map",
        value_name = "FINAL=SOURCE",
        value_parser = parse_map_entry,
        required = true
    )]
    pub map: Vec<(String, String)>,

    /// Directory the generated files are written to.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Also write `<NAME>.gv`, a Graphviz dump of the resolved dependency graph.
    #[arg(long)]
    pub graph: bool,
}

fn parse_render_target(raw: &str) -> Result<(String, String), String> {
    split_pair(raw, ':').ok_or_else(|| format!("expected NAME:TYPE, got '{raw}'"))
}

fn parse_map_entry(raw: &str) -> Result<(String, String), String> {
    split_pair(raw, '=').ok_or_else(|| format!("expected FINAL=SOURCE, got '{raw}'"))
}

fn split_pair(raw: &str, separator: char) -> Option<(String, String)> {
    let (left, right) = raw.split_once(separator)?;
    let (left, right) = (left.trim(), right.trim());
    if left.is_empty() || right.is_empty() {
        return None;
    }
    Some((left.to_string(), right.to_string()))
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_invocation() {
        let args = Args::try_parse_from([
            "shaderweave",
            "library.yaml",
            "--target",
            "basic.color",
            "--feature",
            "transform",
            "--feature",
            "materialColor",
            "--render-target",
            "gColor:vec4",
            "--map",
            "gColor=color",
            "--graph",
        ])
        .expect("parse args");

        assert_eq!(args.target, "basic.color");
        assert_eq!(args.features, ["transform", "materialColor"]);
        assert_eq!(args.render_targets, [("gColor".into(), "vec4".into())]);
        assert_eq!(args.map, [("gColor".into(), "color".into())]);
        assert!(args.graph);
    }

    #[test]
    fn rejects_malformed_render_target() {
        assert!(parse_render_target("gColor").is_err());
        assert!(parse_render_target("gColor:").is_err());
        assert!(parse_map_entry("=color").is_err());
    }
}
