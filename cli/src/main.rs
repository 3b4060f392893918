//! Brewgraph CLI: build the brewing knowledge graph from a CSV log and
//! explore it from the command line.

use anyhow::{bail, Context, Result};
use brewgraph::record::missing_columns;
use brewgraph::{
    build_with_config, BrewRecord, BuildOutcome, Condition, Config, Direction, EdgeKind,
    QueryEngine, Rating,
};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "brewgraph", version, about = "Coffee brewing knowledge graph CLI")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, env = "BREWGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Node and edge counts of the built graph
    Stats {
        /// Brew log CSV
        csv: PathBuf,
    },
    /// Write the full graph as JSON for rendering
    Export {
        csv: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Brews most similar to a reference brew
    Similar {
        csv: PathBuf,
        brew_id: String,

        /// Number of results (configured default if omitted)
        #[arg(short)]
        k: Option<usize>,
    },
    /// Nodes adjacent to a brew session
    Neighbors {
        csv: PathBuf,
        brew_id: String,

        /// Only follow edges of this kind, e.g. BREWED_WITH
        #[arg(long)]
        edge: Option<EdgeKind>,

        /// out, in or both
        #[arg(long, default_value = "both")]
        direction: Direction,
    },
    /// Rating summary grouped by a brewing condition
    Outcomes {
        csv: PathBuf,

        /// brewer, grinder, roast, method, or session:/brewed_with:/grinder:<attr>
        #[arg(long)]
        by: Condition,

        #[arg(long, default_value = "overall")]
        rating: Rating,
    },
}

fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Stats { csv } => run_stats(&load_graph(&csv, &config)?, cli.format),
        Commands::Export { csv, out } => run_export(&load_graph(&csv, &config)?, out.as_deref()),
        Commands::Similar { csv, brew_id, k } => {
            let k = k.unwrap_or(config.similarity.k);
            run_similar(&load_graph(&csv, &config)?, &config, &brew_id, k, cli.format)
        }
        Commands::Neighbors {
            csv,
            brew_id,
            edge,
            direction,
        } => run_neighbors(&load_graph(&csv, &config)?, &brew_id, edge, direction, cli.format),
        Commands::Outcomes { csv, by, rating } => {
            run_outcomes(&load_graph(&csv, &config)?, &by, rating, cli.format)
        }
    }
}

/// Read every row of a brew log; the header row names the columns
fn read_records(path: &Path) -> Result<Vec<BrewRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let headers = reader.headers()?.clone();

    let missing = missing_columns(headers.iter());
    if !missing.is_empty() {
        bail!("{} is missing required columns: {}", path.display(), missing.join(", "));
    }

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("reading row {}", line + 1))?;
        records.push(headers.iter().zip(row.iter()).collect::<BrewRecord>());
    }
    info!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}

fn load_graph(path: &Path, config: &Config) -> Result<BuildOutcome> {
    let records = read_records(path)?;
    let outcome = build_with_config(&records, &config.build)?;
    for warning in &outcome.report.warnings {
        eprintln!("warning: {}", warning);
    }
    Ok(outcome)
}

fn new_table<I, S>(header: I) -> Table
where
    I: IntoIterator<Item = S>,
    S: Into<comfy_table::Cell>,
{
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

fn run_stats(outcome: &BuildOutcome, format: OutputFormat) -> Result<()> {
    let stats = outcome.graph.statistics();

    match format {
        OutputFormat::Json => {
            let value = json!({
                "statistics": stats,
                "report": outcome.report.summary(),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Table => {
            let mut table = new_table(["Kind", "Count"]);
            for (kind, count) in &stats.nodes_by_kind {
                table.add_row(vec![kind.to_string(), count.to_string()]);
            }
            for (kind, count) in &stats.edges_by_kind {
                table.add_row(vec![kind.to_string(), count.to_string()]);
            }
            println!("{}", table);
            println!("Nodes:   {}", stats.node_count);
            println!("Edges:   {}", stats.edge_count);
            println!(
                "Records: {} built, {} skipped",
                outcome.report.records_built,
                outcome.report.records_skipped()
            );
        }
    }
    Ok(())
}

fn run_export(outcome: &BuildOutcome, out: Option<&Path>) -> Result<()> {
    let json = outcome.graph.snapshot().to_json_pretty()?;
    match out {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!("Wrote graph snapshot to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn run_similar(
    outcome: &BuildOutcome,
    config: &Config,
    brew_id: &str,
    k: usize,
    format: OutputFormat,
) -> Result<()> {
    let engine = QueryEngine::new(&outcome.graph);
    let results = engine.similar_brews(brew_id, k, &config.similarity.weights)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Table => {
            if results.is_empty() {
                println!("(no results)");
                return Ok(());
            }
            let mut table = new_table(["Rank", "Brew", "Distance"]);
            for (rank, result) in results.iter().enumerate() {
                table.add_row(vec![
                    (rank + 1).to_string(),
                    result.brew_id.clone(),
                    format!("{:.4}", result.distance),
                ]);
            }
            println!("{}", table);
        }
    }
    Ok(())
}

fn run_neighbors(
    outcome: &BuildOutcome,
    brew_id: &str,
    edge: Option<EdgeKind>,
    direction: Direction,
    format: OutputFormat,
) -> Result<()> {
    let engine = QueryEngine::new(&outcome.graph);
    let session = engine.session(brew_id)?;
    let mut nodes = Vec::new();
    for id in engine.neighbors(session.id, edge, direction)? {
        nodes.push(outcome.graph.node(id)?);
    }

    match format {
        OutputFormat::Json => {
            let value: Vec<_> = nodes
                .iter()
                .map(|n| {
                    json!({
                        "id": n.id.as_u64(),
                        "kind": n.kind,
                        "key": n.key,
                        "label": n.display_label(),
                        "properties": n.properties,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Table => {
            let mut table = new_table(["Id", "Kind", "Label", "Key"]);
            for node in &nodes {
                table.add_row(vec![
                    node.id.as_u64().to_string(),
                    node.kind.to_string(),
                    node.display_label(),
                    node.key.clone(),
                ]);
            }
            println!("{}", table);
            println!("{} neighbor(s)", nodes.len());
        }
    }
    Ok(())
}

fn run_outcomes(
    outcome: &BuildOutcome,
    condition: &Condition,
    rating: Rating,
    format: OutputFormat,
) -> Result<()> {
    let engine = QueryEngine::new(&outcome.graph);
    let groups = engine.outcomes_by(condition, rating);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&groups)?),
        OutputFormat::Table => {
            let mut table = new_table([
                condition.to_string(),
                "Brews".to_string(),
                format!("Mean {}", rating),
                "Min".to_string(),
                "Max".to_string(),
            ]);
            for group in &groups {
                table.add_row(vec![
                    group.value.clone(),
                    group.count.to_string(),
                    format!("{:.2}", group.mean),
                    format!("{:.1}", group.min),
                    format!("{:.1}", group.max),
                ]);
            }
            println!("{}", table);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use brewgraph::NodeKind;

    const HEADER: &str = "brew_id,barista,brew_date,roaster,coffee_name,roast_level,brew_method,\
brewer_brand,brewer_model,dose_g,total_brew_time_sec,notes_intensities,sweetness_0_10,\
acidity_0_10,bitterness_0_10,body_0_10,overall_0_10,water_temp_c";

    fn write_csv(rows: &[&str]) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut text = HEADER.to_string();
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        std::fs::write(file.path(), text).unwrap();
        file
    }

    #[test]
    fn test_read_and_build() {
        let file = write_csv(&[
            "B1,Sam,2024-03-10,Onyx,Geometry,Light,pourover,Hario,V60,15,180,chocolate:4;fruit:3,7,6,2,5,8,93",
            "B2,Ana,2024-03-11,Onyx,Geometry,Light,pourover,Hario,V60,15,170,chocolate:3,6,6,3,5,7,",
        ]);
        let outcome = load_graph(file.path(), &Config::default()).unwrap();

        assert_eq!(outcome.graph.count_nodes(NodeKind::BrewSession), 2);
        assert_eq!(outcome.graph.count_nodes(NodeKind::Brewer), 1);
        let with_temp = outcome
            .graph
            .edges()
            .filter(|e| e.kind == EdgeKind::BrewedWith && e.has_property("water_temp_c"))
            .count();
        assert_eq!(with_temp, 1);
    }

    #[test]
    fn test_missing_columns_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "brew_id,barista\nB1,Sam\n").unwrap();

        let err = read_records(file.path()).unwrap_err();
        assert!(err.to_string().contains("coffee_name"));
    }

    #[test]
    fn test_cli_parses_query_arguments() {
        let cli = Cli::try_parse_from([
            "brewgraph",
            "--format",
            "json",
            "outcomes",
            "log.csv",
            "--by",
            "brewed_with:water_temp_c",
        ])
        .unwrap();
        match cli.command {
            Commands::Outcomes { by, rating, .. } => {
                assert_eq!(by, Condition::BrewedWith("water_temp_c".to_string()));
                assert_eq!(rating, Rating::Overall);
            }
            _ => panic!("expected outcomes command"),
        }

        let cli = Cli::try_parse_from([
            "brewgraph",
            "neighbors",
            "log.csv",
            "B1",
            "--edge",
            "brewed_with",
            "--direction",
            "out",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Neighbors {
                edge: Some(EdgeKind::BrewedWith),
                direction: Direction::Outgoing,
                ..
            }
        ));
    }
}
