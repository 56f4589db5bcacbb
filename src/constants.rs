//! Default values used across the pipeline.

/// Type tag marking include directive nodes.
pub const DEFAULT_INCLUDE_TAG: &str = "!include";

/// Mapping key conventionally used to declare dependencies between jobs.
pub const DEFAULT_DEPENDENCY_FIELD: &str = "depends_on";

/// Name of the optional settings file read by the command-line front end.
pub const SETTINGS_FILE_NAME: &str = "anchorage.toml";

/// Maximum nesting of alias expansions when converting a tree to a value.
pub const MAX_ALIAS_DEPTH: usize = 64;

/// Nodes a tree may expand into through aliases, per node of the tree.
pub const ALIAS_EXPANSION_FACTOR: usize = 100;

/// Lower bound of the alias expansion budget for small trees.
pub const MIN_EXPANSION_BUDGET: usize = 10_000;

/// Origin label used for documents that are not read from a file.
pub const INLINE_ORIGIN: &str = "<input>";
