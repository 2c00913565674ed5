//! Builds a graph from line segments stored in a CSV file and reports how well the network is connected.
//!
//! Usage: `cargo run --example connectivity -- [path/to/lines.csv] [tolerance]`

use std::path::PathBuf;

use anyhow::Context;
use geograph::analysis::{connected_components, count_orphans};
use geograph::{BuilderConfig, LineGraphBuilder};
use geo_types::line_string;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Line {
    id: u32,
    name: String,
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let path = args.next().map(PathBuf::from).unwrap_or_else(|| {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("examples/data/lines.csv")
    });
    let tolerance = match args.next() {
        Some(value) => value.parse().context("tolerance must be a number")?,
        None => 0.1,
    };

    let mut reader = csv::Reader::from_path(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let config = BuilderConfig::default().with_tolerance(tolerance);
    let mut builder = LineGraphBuilder::with_config(config);
    let mut names = vec![];
    for record in reader.deserialize() {
        let line: Line = record?;
        let geometry = line_string![(x: line.x1, y: line.y1), (x: line.x2, y: line.y2)];
        match builder.add(&geometry, names.len()) {
            Ok(edges) if edges.is_empty() => {
                log::warn!("Line {} ({}) is shorter than the snap tolerance", line.id, line.name);
                builder.add_point(&geometry.0[0])?;
            }
            Ok(_) => {}
            Err(err) => log::warn!("Line {} ({}) is skipped: {err}", line.id, line.name),
        }
        names.push(line.name);
    }

    let graph = builder.into_graph();
    log::info!(
        "Read {} lines into a graph with {} nodes and {} edges",
        names.len(),
        graph.node_count(),
        graph.edge_count()
    );

    let components = connected_components(&graph)?;
    println!("Connected components: {}", components.len());
    for (index, component) in components.iter().enumerate() {
        let mut streets: Vec<&str> = component
            .iter()
            .flat_map(|node| graph.incident(*node).into_iter().flatten())
            .filter_map(|(edge, _)| graph.edge(edge).ok())
            .map(|edge| names[*edge.payload()].as_str())
            .collect();
        streets.sort();
        streets.dedup();

        println!(
            "  #{index}: {} nodes, streets: {}",
            component.len(),
            streets.join(", ")
        );
    }

    println!("Orphan nodes: {}", count_orphans(&graph)?);
    if let Some(bbox) = graph.bounding_rect() {
        println!(
            "Extent: ({}, {}) - ({}, {})",
            bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max
        );
    }

    Ok(())
}
