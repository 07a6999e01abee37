//! CLI command implementations.
//!
//! Every command returns `Ok(true)` on success and `Ok(false)` when it ran
//! but found a problem worth a non-zero exit code.

use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::Path;
use strata_graph::{GraphBuilder, LayoutConfig, RelativeLayoutGraph, Vertex};
use tracing::{debug, info};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Reads the layout config, or returns the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<LayoutConfig> {
    match path {
        Some(path) => {
            let config = LayoutConfig::load(path)?;
            debug!(?config, "loaded config from {}", path.display());
            Ok(config)
        }
        None => Ok(LayoutConfig::default()),
    }
}

/// Builds a graph from a description file.
fn load_graph(file: &Path, config: &LayoutConfig) -> Result<GraphBuilder> {
    let text = fs::read_to_string(file)
        .map_err(|e| format!("cannot read {}: {}", file.display(), e))?;

    let mut builder = GraphBuilder::with_config(config.clone());
    builder.parse(&text)?;

    let stats = builder.graph().stats();
    info!(
        vertices = stats.vertex_count,
        edges = stats.edge_count,
        layers = stats.layer_count,
        "loaded {}",
        file.display()
    );
    Ok(builder)
}

fn names(vertices: &[&Vertex]) -> Vec<String> {
    vertices.iter().map(|v| v.name.clone()).collect()
}

fn styled(vertex: &Vertex) -> String {
    if vertex.is_dummy() {
        vertex.name.dimmed().to_string()
    } else {
        vertex.name.cyan().to_string()
    }
}

/// Print every vertex with its rank and primary parent.
pub fn ranks(file: &Path, config: &LayoutConfig, json: bool) -> Result<bool> {
    let graph = load_graph(file, config)?.build();
    let snapshot = graph.snapshot();

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot.vertices)?);
        return Ok(true);
    }

    for vertex in &snapshot.vertices {
        let parent = vertex.primary_parent.as_deref().unwrap_or("-");
        println!(
            "  {:>3}  {} {} {}",
            vertex.rank.to_string().yellow(),
            vertex.name.cyan(),
            "<-".dimmed(),
            parent
        );
    }
    Ok(true)
}

/// Layout neighbourhood of one vertex.
#[derive(Debug, Serialize)]
struct InspectReport {
    name: String,
    kind: String,
    priority: i32,
    rank: usize,
    parents: Vec<String>,
    children: Vec<String>,
    primary_parent: Option<String>,
    primary_children: Vec<String>,
    primary_siblings: Vec<String>,
}

fn inspect_report(graph: &RelativeLayoutGraph, name: &str) -> Result<InspectReport> {
    let vertex = graph
        .find_by_name(name)
        .into_iter()
        .next()
        .ok_or_else(|| format!("no vertex named \"{}\"", name))?;
    let id = vertex.id;

    Ok(InspectReport {
        name: vertex.name.clone(),
        kind: vertex.kind.to_string(),
        priority: vertex.priority,
        rank: graph.get_rank(id)?,
        parents: names(&graph.parents(id)?),
        children: names(&graph.children(id)?),
        primary_parent: graph.get_primary_parent(id)?.map(|p| p.name.clone()),
        primary_children: names(&graph.get_primary_children(id)?),
        primary_siblings: names(&graph.get_primary_siblings(id)?),
    })
}

/// Show rank, parents and primary relations of one vertex.
pub fn inspect(file: &Path, config: &LayoutConfig, name: &str, json: bool) -> Result<bool> {
    let graph = load_graph(file, config)?.build();
    let report = inspect_report(&graph, name)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(true);
    }

    let list = |items: &[String]| {
        if items.is_empty() {
            "-".dimmed().to_string()
        } else {
            items.join(", ")
        }
    };

    println!("{} ({}, priority {})", report.name.cyan().bold(), report.kind, report.priority);
    println!("  rank:             {}", report.rank.to_string().yellow());
    println!("  parents:          {}", list(&report.parents));
    println!("  children:         {}", list(&report.children));
    println!(
        "  primary parent:   {}",
        report.primary_parent.as_deref().unwrap_or("-")
    );
    println!("  primary children: {}", list(&report.primary_children));
    println!("  primary siblings: {}", list(&report.primary_siblings));
    Ok(true)
}

/// Report properness and list rank-skipping edges.
pub fn check(file: &Path, config: &LayoutConfig) -> Result<bool> {
    let graph = load_graph(file, config)?.build();

    if graph.is_proper() {
        println!("{} Graph is proper", "✓".green());
        return Ok(true);
    }

    let long = graph.improper_edges();
    println!("{} {} edges skip ranks:", "⚠".yellow(), long.len());
    for edge in long {
        let (Some(parent), Some(child)) = (graph.vertex(edge.parent), graph.vertex(edge.child))
        else {
            continue;
        };
        let span = graph.get_rank(edge.child)? - graph.get_rank(edge.parent)?;
        println!(
            "  {} {} {} (spans {} ranks)",
            styled(parent),
            "->".dimmed(),
            styled(child),
            span
        );
    }
    println!("  Run {} to insert dummy vertices", "strata normalize".cyan());
    Ok(false)
}

fn print_layers(graph: &RelativeLayoutGraph) {
    for (rank, layer) in graph.layers().iter().enumerate() {
        let members: Vec<String> = layer.iter().map(|v| styled(v)).collect();
        println!("  {:>3}  {}", rank.to_string().yellow(), members.join("  "));
    }
}

/// Print vertices grouped by rank.
pub fn layers(file: &Path, config: &LayoutConfig) -> Result<bool> {
    let graph = load_graph(file, config)?.build();
    print_layers(&graph);
    Ok(true)
}

/// Insert dummy vertices until every edge spans one rank.
pub fn normalize(file: &Path, config: &LayoutConfig, output: Option<&Path>) -> Result<bool> {
    let mut graph = load_graph(file, config)?.build();

    let dummies = graph.make_proper()?;
    println!(
        "{} Inserted {} dummy vertices",
        "✓".green(),
        dummies.len().to_string().cyan()
    );
    print_layers(&graph);

    if let Some(path) = output {
        write_snapshot(&graph, path)?;
    }
    Ok(true)
}

/// Export the graph to JSON.
pub fn export(file: &Path, config: &LayoutConfig, output: &Path) -> Result<bool> {
    let graph = load_graph(file, config)?.build();
    write_snapshot(&graph, output)?;
    Ok(true)
}

fn write_snapshot(graph: &RelativeLayoutGraph, path: &Path) -> Result<()> {
    fs::write(path, graph.snapshot().to_json_pretty()?)?;
    println!("{} Exported to {}", "✓".green(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = "\
# scenario
priority P1 2
P1<-C1
P1<-C2
P2<-C2
P2<-C3
";

    fn write_sample(dir: &Path, text: &str) -> std::path::PathBuf {
        let path = dir.join("graph.strata");
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_inspect_report() {
        let dir = tempdir().unwrap();
        let file = write_sample(dir.path(), SAMPLE);
        let graph = load_graph(&file, &LayoutConfig::default()).unwrap().build();

        let report = inspect_report(&graph, "C2").unwrap();
        assert_eq!(report.rank, 1);
        assert_eq!(report.parents, vec!["P1", "P2"]);
        assert_eq!(report.primary_parent.as_deref(), Some("P1"));
        assert_eq!(report.primary_siblings, vec!["C1"]);

        assert!(inspect_report(&graph, "missing").is_err());
    }

    #[test]
    fn test_check_reports_improper_graph() {
        let dir = tempdir().unwrap();
        let proper = write_sample(dir.path(), "P1<-C1<-C2\nP1<-C3<-C2\n");
        assert!(check(&proper, &LayoutConfig::default()).unwrap());

        let improper = write_sample(dir.path(), "P1<-C1<-C2\nP1<-C2\n");
        assert!(!check(&improper, &LayoutConfig::default()).unwrap());
    }

    #[test]
    fn test_export_writes_snapshot() {
        let dir = tempdir().unwrap();
        let file = write_sample(dir.path(), SAMPLE);
        let output = dir.path().join("out.json");

        assert!(export(&file, &LayoutConfig::default(), &output).unwrap());

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(value["vertices"].as_array().unwrap().len(), 5);
        assert_eq!(value["proper"], true);
    }

    #[test]
    fn test_normalize_output_is_proper() {
        let dir = tempdir().unwrap();
        let file = write_sample(dir.path(), "A<-B<-C\nA<-C\n");
        let output = dir.path().join("normal.json");

        normalize(&file, &LayoutConfig::default(), Some(&output)).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(value["proper"], true);
        assert_eq!(value["vertices"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.strata");
        assert!(load_graph(&missing, &LayoutConfig::default()).is_err());

        let cyclic = write_sample(dir.path(), "A<-B\nB<-A\n");
        let err = load_graph(&cyclic, &LayoutConfig::default()).err().unwrap();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_load_config() {
        let dir = tempdir().unwrap();
        assert_eq!(load_config(None).unwrap(), LayoutConfig::default());

        let path = dir.path().join("strata.json");
        fs::write(&path, r#"{ "default_priority": 4 }"#).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap().default_priority, 4);
    }
}
