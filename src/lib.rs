//! anchorage - anchor-aware YAML preprocessing
//!
//! A preprocessing stage for YAML configuration trees such as CI pipelines. It
//! sits between the YAML parser and typed decoding and takes care of the parts
//! of a configuration that refer to other parts:
//!
//! - **Anchors and aliases** are indexed so any alias can be resolved to the
//!   node declaring its anchor.
//! - **Include directives** (`!include path.yml`) are replaced by the content of
//!   the named file, recursively and without letting paths escape their base
//!   directory.
//! - **Dependencies** between anchored jobs, declared as aliases under a field
//!   like `depends_on`, form a graph that is checked for cycles.
//!
//! # Pipeline
//!
//! ```text
//! text ─► parser ─► Document (anchor index) ─► IncludeExpander ─► re-index
//!                                                                    │
//!                        typed values ◄─ decode ◄─ DependencyGraph ◄─┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use anchorage::config::LoadOptions;
//! use anchorage::graph::check_dependencies;
//! use anchorage::loader::load_file;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let options = LoadOptions::new().with_include_tag("!include");
//! let doc = load_file(Path::new("pipeline.yml"), &options)?;
//!
//! let graph = check_dependencies(&doc, "depends_on")?;
//! for job in graph.topological_order()? {
//!     println!("{job}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`document`] - Node tree, anchor index, alias resolution and decoding
//! - [`include`] - Include directive expansion
//! - [`graph`] - Dependency graph and cycle detection
//! - [`loader`] - Parse/expand/re-index pipelines
//! - [`config`] - Load options and the `anchorage.toml` settings file
//! - [`core`] - Error types and user-facing error reports
//! - [`utils`] - Path normalization and containment checks
//! - [`cli`] - Command-line front end

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod document;
pub mod graph;
pub mod include;
pub mod loader;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
