use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use composer::{BuildRequest, Composition, NodeLibrary, NodeRecord};
use tracing_subscriber::EnvFilter;

use crate::cli::Args;
use crate::graph;

pub fn run(args: Args) -> Result<()> {
    initialise_tracing();

    let library = load_library(&args.library)?;
    let request = BuildRequest {
        features: args.features.clone(),
        name: args.target.clone(),
        outputs: args.render_targets.clone(),
        output_map: args.map.clone(),
    };
    tracing::info!(
        library = %args.library.display(),
        target = %request.name,
        nodes = library.len(),
        "composing shader program"
    );

    let composition = library
        .compose(&request)
        .with_context(|| format!("failed to compose target '{}'", request.name))?;
    write_artifacts(&args.out_dir, &request.name, &composition, args.graph)
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub(crate) fn load_library(path: &Path) -> Result<NodeLibrary> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read shader library '{}'", path.display()))?;
    let records: BTreeMap<String, NodeRecord> = serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse shader library '{}'", path.display()))?;
    NodeLibrary::from_records(records)
        .with_context(|| format!("invalid shader library '{}'", path.display()))
}

pub(crate) fn write_artifacts(
    out_dir: &Path,
    name: &str,
    composition: &Composition,
    with_graph: bool,
) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory '{}'", out_dir.display()))?;

    let vert = out_dir.join(format!("{name}.vert"));
    fs::write(&vert, &composition.vertex)
        .with_context(|| format!("failed to write '{}'", vert.display()))?;

    let frag = out_dir.join(format!("{name}.frag"));
    fs::write(&frag, &composition.fragment)
        .with_context(|| format!("failed to write '{}'", frag.display()))?;

    let meta = composition
        .metadata
        .to_json_pretty()
        .context("failed to serialize shader metadata")?;
    let json = out_dir.join(format!("{name}.json"));
    fs::write(&json, meta).with_context(|| format!("failed to write '{}'", json.display()))?;

    if with_graph {
        let gv = out_dir.join(format!("{name}.gv"));
        fs::write(&gv, graph::render_dot(&composition.graph))
            .with_context(|| format!("failed to write '{}'", gv.display()))?;
    }

    tracing::info!(
        out_dir = %out_dir.display(),
        target = name,
        graph = with_graph,
        "wrote shader artifacts"
    );
    Ok(())
}
