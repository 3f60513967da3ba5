//! morph: evaluate template AST nodes against JSON sources
//!
//! A flat driver over the operator engine. Nodes are evaluated in
//! declaration order and share one tag table, so a node can read values
//! tagged by the nodes before it.

use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand};
use morph_config::{ConfigLoader, EngineConfig};
use morph_core::path::{self, JsonPathQuery, PathQuery};
use morph_core::{
    apply_all, AstNode, Context, Environment, FunctionRegistry, Sources, TagTable,
};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "morph")]
#[command(about = "Evaluate morph template nodes against JSON sources", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate AST nodes through the stage pipeline
    Eval {
        /// JSON file holding one node or an array of nodes
        #[arg(long)]
        nodes: PathBuf,

        /// Named source document, as name=file (repeatable)
        #[arg(long = "source", value_parser = parse_source)]
        sources: Vec<(String, PathBuf)>,

        /// Engine configuration file (toml, json or yaml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Template path the nodes live under
        #[arg(long, default_value = "$")]
        context: String,
    },

    /// Print every match of a path in a JSON document
    Query {
        /// JSON document
        #[arg(long)]
        source: PathBuf,

        /// Path expression, bare or root-qualified
        path: String,
    },

    /// Print the root-qualified form of a path
    Normalize {
        /// Path expression
        path: String,
    },
}

fn parse_source(arg: &str) -> Result<(String, PathBuf), String> {
    match arg.split_once('=') {
        Some((name, file)) if !name.trim().is_empty() && !file.is_empty() => {
            Ok((name.trim().to_string(), PathBuf::from(file)))
        }
        _ => Err(format!("expected name=file, got '{}'", arg)),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Eval {
            nodes,
            sources,
            config,
            context,
        } => eval(&nodes, &sources, config.as_deref(), &context),
        Commands::Query { source, path } => query(&source, &path),
        Commands::Normalize { path } => {
            println!("{}", path::normalize(&path));
            Ok(())
        }
    }
}

fn read_json(file: &Path) -> Result<Value> {
    let contents =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Invalid JSON in {}", file.display()))
}

fn load_nodes(file: &Path) -> Result<Vec<AstNode>> {
    let nodes = match read_json(file)? {
        Value::Array(items) => items,
        node @ Value::Object(_) => vec![node],
        other => bail!(
            "{} must hold a node object or an array of nodes, found {}",
            file.display(),
            morph_core::value::type_name(&other)
        ),
    };

    nodes
        .into_iter()
        .enumerate()
        .map(|(index, node)| {
            serde_json::from_value(node).with_context(|| format!("Invalid node at index {}", index))
        })
        .collect()
}

fn eval(
    nodes: &Path,
    source_files: &[(String, PathBuf)],
    config: Option<&Path>,
    context: &str,
) -> Result<()> {
    let config = match config {
        Some(file) => ConfigLoader::load_from_file(file)
            .with_context(|| format!("Failed to load config from {}", file.display()))?,
        None => EngineConfig::default(),
    };

    let mut sources = Sources::new();
    for (name, file) in source_files {
        debug!(source = %name, file = %file.display(), "loading source");
        sources.insert(name.clone(), read_json(file)?);
    }

    let nodes = load_nodes(nodes)?;
    let base = Context::at(path::segments(context).context("Invalid --context path")?);
    let env = Environment::new(sources)
        .with_functions(FunctionRegistry::with_builtins())
        .with_config(config);
    let composer = apply_all(&env);

    let mut tags = TagTable::new();
    let mut values = Vec::with_capacity(nodes.len());
    for (index, node) in nodes.iter().enumerate() {
        let evaluated = composer
            .apply(node, &mut tags, &base.child(index))
            .with_context(|| format!("Failed to evaluate node {} ({})", index, node.path))?;
        values.push(evaluated.value.unwrap_or(Value::Null));
    }
    info!(nodes = values.len(), tags = tags.len(), "evaluation pass complete");

    let output = json!({
        "values": values,
        "tags": Value::Object(tags.to_map()),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn query(source: &Path, path_expr: &str) -> Result<()> {
    let document = read_json(source)?;
    let normalized = path::normalize(path_expr);
    let matches = JsonPathQuery
        .query(&document, &normalized)
        .with_context(|| format!("Failed to query {}", normalized))?;
    println!("{}", serde_json::to_string_pretty(&Value::Array(matches))?);
    Ok(())
}
