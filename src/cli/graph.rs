//! Display the dependency graph of a document.
//!
//! # Output Formats
//!
//! ## Text (default)
//! ```text
//! build
//! test   <- build
//! deploy <- test, build
//! ```
//!
//! ## Tree (`--tree deploy`)
//! ```text
//! deploy
//! ├── test
//! │   └── build
//! └── build
//! ```
//!
//! ## JSON (`--format json`)
//! Dependency order plus every node with its line and direct dependencies.

use anyhow::{Result, bail};
use clap::Args;
use serde::Serialize;

use super::LoadArgs;
use crate::config::LoadOptions;
use crate::constants::DEFAULT_DEPENDENCY_FIELD;
use crate::graph::{DependencyGraph, check_dependencies};

/// Print the dependency graph of a document.
#[derive(Args, Debug)]
pub struct GraphCommand {
    #[command(flatten)]
    pub(crate) load: LoadArgs,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    format: String,

    /// Print the dependency tree below this anchor instead of the order
    #[arg(long, value_name = "ID")]
    tree: Option<String>,
}

#[derive(Debug, Serialize)]
struct GraphReport<'a> {
    field: &'a str,
    order: Vec<&'a str>,
    nodes: Vec<NodeReport<'a>>,
}

#[derive(Debug, Serialize)]
struct NodeReport<'a> {
    id: &'a str,
    line: usize,
    dependencies: &'a [String],
}

impl GraphCommand {
    /// Build the graph and print it in the requested format.
    pub fn execute(self, settings: Option<LoadOptions>) -> Result<()> {
        if !matches!(self.format.as_str(), "text" | "json") {
            bail!("Invalid format '{}'. Valid formats are: text, json", self.format);
        }

        let options = self.load.options(settings);
        let field = options.dependency_field.as_deref().unwrap_or(DEFAULT_DEPENDENCY_FIELD);
        let doc = self.load.load(&options)?;
        let graph = check_dependencies(&doc, field)?;

        if let Some(root) = &self.tree {
            let Some(tree) = graph.to_tree_string(root) else {
                bail!("No anchor named '{}' in {}", root, self.load.file.display());
            };
            print!("{tree}");
            return Ok(());
        }

        match self.format.as_str() {
            "json" => println!("{}", render_json(&graph, field)?),
            _ => print!("{}", render_text(&graph)?),
        }
        Ok(())
    }
}

fn render_text(graph: &DependencyGraph<'_>) -> Result<String> {
    let order = graph.topological_order()?;
    let width = order.iter().map(|node| node.id.len()).max().unwrap_or(0);

    let mut output = String::new();
    for node in order {
        if node.dependencies.is_empty() {
            output.push_str(&format!("{}\n", node.id));
        } else {
            let deps = node.dependencies.join(", ");
            output.push_str(&format!("{:<width$} <- {}\n", node.id, deps));
        }
    }
    Ok(output)
}

fn render_json(graph: &DependencyGraph<'_>, field: &str) -> Result<String> {
    let order = graph.topological_order()?;
    let report = GraphReport {
        field,
        order: order.iter().map(|node| node.id.as_str()).collect(),
        nodes: graph
            .nodes()
            .map(|node| NodeReport {
                id: &node.id,
                line: node.node.mark.line,
                dependencies: &node.dependencies,
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
