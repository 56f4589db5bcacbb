//! Print a resolved document.

use anyhow::{Context, Result};
use clap::Args;

use super::LoadArgs;
use crate::config::LoadOptions;

/// Print the document with includes expanded, aliases replaced by their
/// anchored content and merge keys applied.
#[derive(Args, Debug)]
pub struct RenderCommand {
    #[command(flatten)]
    pub(crate) load: LoadArgs,
}

impl RenderCommand {
    /// Resolve the document and write it to stdout as YAML.
    pub fn execute(self, settings: Option<LoadOptions>) -> Result<()> {
        let options = self.load.options(settings);
        let doc = self.load.load(&options)?;

        let value = doc.to_value()?;
        let yaml = serde_yaml::to_string(&value)
            .with_context(|| format!("Failed to serialize {}", self.load.file.display()))?;
        print!("{yaml}");
        Ok(())
    }
}
