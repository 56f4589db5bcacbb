//! Validate a document end to end.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::LoadArgs;
use crate::config::LoadOptions;
use crate::graph::check_dependencies;

/// Load, expand and validate a document.
///
/// Succeeds when the document parses, every include resolves safely, every
/// dependency alias names an anchor and the dependency graph is acyclic.
#[derive(Args, Debug)]
pub struct CheckCommand {
    #[command(flatten)]
    pub(crate) load: LoadArgs,
}

impl CheckCommand {
    /// Run the check and print a one-line summary.
    pub fn execute(self, settings: Option<LoadOptions>) -> Result<()> {
        let options = self.load.options(settings);
        let doc = self.load.load(&options)?;
        let file = self.load.file.display();

        match options.dependency_field.as_deref() {
            Some(field) => {
                let graph = check_dependencies(&doc, field)?;
                println!(
                    "{} {}: {} anchor(s), {} dependency edge(s), no cycles",
                    "✓".green(),
                    file,
                    graph.node_count(),
                    graph.edge_count()
                );
            }
            None => {
                println!("{} {}: {} anchor(s)", "✓".green(), file, doc.anchors().len());
            }
        }

        Ok(())
    }
}
