//! Command-line interface for anchorage.
//!
//! # Commands
//!
//! - `check` - Load a document, expand includes and validate its dependency graph
//! - `graph` - Print the dependency order, a dependency tree or a JSON report
//! - `render` - Print the fully resolved document as YAML
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug logging
//! - `--quiet` - Only log errors
//! - `--config <FILE>` - Read settings from this file instead of `./anchorage.toml`
//!
//! # Settings precedence
//!
//! 1. Command-line flags (`--include-tag`, `--no-includes`, `--base-path`,
//!    `--policy`, `--depends-on`)
//! 2. The settings file (`--config` or `anchorage.toml` in the working directory)
//! 3. Built-in defaults: `!include` directives relative to the input file, and
//!    dependencies listed under `depends_on`
//!
//! # Examples
//!
//! ```bash
//! anchorage check pipeline.yml
//! anchorage --verbose graph pipeline.yml --tree deploy
//! anchorage graph pipeline.yml --format json --depends-on needs
//! anchorage render pipeline.yml --no-includes
//! ```

mod check;
mod graph;
mod render;


use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::config::LoadOptions;
use crate::constants::{DEFAULT_DEPENDENCY_FIELD, DEFAULT_INCLUDE_TAG};
use crate::document::Document;
use crate::include::InclusionPolicy;
use crate::loader::load_file;

/// Runtime configuration derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive; `None` defers to `RUST_LOG`, then `warn`.
    pub log_level: Option<String>,

    /// Settings file given with `--config`.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber, writing to stderr.
    ///
    /// Calling it more than once is harmless; later calls are ignored.
    pub fn init_logging(&self) {
        let filter = match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Settings from `--config`, or from `anchorage.toml` in the working
    /// directory when present.
    pub fn settings(&self) -> Result<Option<LoadOptions>> {
        match &self.config_path {
            Some(path) => {
                if !path.is_file() {
                    bail!("Settings file not found: {}", path.display());
                }
                Ok(Some(LoadOptions::from_file(path)?))
            }
            None => Ok(LoadOptions::discover(Path::new("."))?),
        }
    }
}

/// Top-level command-line parser.
#[derive(Parser, Debug)]
#[command(
    name = "anchorage",
    about = "Resolve anchors, expand includes and validate job dependencies in YAML documents",
    version
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging on stderr.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a settings file (defaults to ./anchorage.toml when present).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a document and validate includes, aliases and dependencies.
    Check(check::CheckCommand),

    /// Show the dependency graph of a document.
    Graph(graph::GraphCommand),

    /// Print the resolved document as YAML.
    Render(render::RenderCommand),
}

impl Cli {
    /// Execute the parsed command.
    pub fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(&config)
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Execute with an explicit configuration, without touching logging.
    pub fn execute_with_config(self, config: &CliConfig) -> Result<()> {
        let settings = config.settings()?;

        match self.command {
            Commands::Check(cmd) => cmd.execute(settings),
            Commands::Graph(cmd) => cmd.execute(settings),
            Commands::Render(cmd) => cmd.execute(settings),
        }
    }
}

/// Repeated-inclusion policy as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Include every file at most once
    RejectRepeats,
    /// Only reject files including themselves
    ActiveChain,
}

impl From<PolicyArg> for InclusionPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::RejectRepeats => Self::RejectRepeats,
            PolicyArg::ActiveChain => Self::ActiveChain,
        }
    }
}

/// Input file and load options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct LoadArgs {
    /// Document to load.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Tag marking include directives.
    #[arg(long, value_name = "TAG")]
    pub include_tag: Option<String>,

    /// Leave include directives unexpanded.
    #[arg(long, conflicts_with = "include_tag")]
    pub no_includes: bool,

    /// Directory include paths resolve against (defaults to the file's directory).
    #[arg(long, value_name = "DIR")]
    pub base_path: Option<PathBuf>,

    /// Treatment of files included more than once.
    #[arg(long, value_enum, value_name = "POLICY")]
    pub policy: Option<PolicyArg>,

    /// Mapping key listing dependency aliases.
    #[arg(long, value_name = "FIELD")]
    pub depends_on: Option<String>,
}

impl LoadArgs {
    /// Merge flags over `settings`, falling back to built-in defaults.
    #[must_use]
    pub fn options(&self, settings: Option<LoadOptions>) -> LoadOptions {
        let mut options = settings.unwrap_or_else(|| {
            LoadOptions::new()
                .with_include_tag(DEFAULT_INCLUDE_TAG)
                .with_dependency_field(DEFAULT_DEPENDENCY_FIELD)
        });

        if let Some(tag) = &self.include_tag {
            options.include_tag = Some(tag.clone());
        }
        if self.no_includes {
            options.include_tag = None;
        }
        if let Some(base) = &self.base_path {
            options.base_path = Some(base.clone());
        }
        if let Some(policy) = self.policy {
            options.include_policy = policy.into();
        }
        if let Some(field) = &self.depends_on {
            options.dependency_field = Some(field.clone());
        }

        options
    }

    /// Load the input file with the merged options.
    pub fn load(&self, options: &LoadOptions) -> Result<Document> {
        if !self.file.is_file() {
            bail!("Input file not found: {}", self.file.display());
        }
        tracing::debug!("Loading {} with {:?}", self.file.display(), options);
        Ok(load_file(&self.file, options)?)
    }
}
