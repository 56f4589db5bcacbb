//! Load options and the `anchorage.toml` settings file.
//!
//! Every setting is optional. A settings file looks like:
//!
//! ```toml
//! include-tag = "!include"
//! base-path = "pipelines"        # relative to this file
//! include-policy = "active-chain" # or "reject-repeats" (default)
//! dependency-field = "depends_on"
//! ```
//!
//! Command-line flags override values read from the file.

mod parser;

pub use parser::parse_config;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_INCLUDE_TAG, SETTINGS_FILE_NAME};
use crate::core::{AnchorageError, Result};
use crate::include::InclusionPolicy;

/// Options controlling the load pipeline.
///
/// ```rust
/// use anchorage::config::LoadOptions;
/// use anchorage::include::InclusionPolicy;
///
/// let options = LoadOptions::with_includes("pipelines")
///     .with_policy(InclusionPolicy::ActiveChain)
///     .with_dependency_field("depends_on");
/// assert_eq!(options.include_tag.as_deref(), Some("!include"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct LoadOptions {
    /// Tag marking include directives; `None` disables expansion
    pub include_tag: Option<String>,
    /// Directory relative include paths resolve against
    pub base_path: Option<PathBuf>,
    /// Treatment of repeated inclusion
    pub include_policy: InclusionPolicy,
    /// Mapping key listing dependency aliases
    pub dependency_field: Option<String>,
}

impl LoadOptions {
    /// Options with includes disabled and no dependency field.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options expanding `!include` directives relative to `base_path`.
    pub fn with_includes(base_path: impl Into<PathBuf>) -> Self {
        Self {
            include_tag: Some(DEFAULT_INCLUDE_TAG.to_string()),
            base_path: Some(base_path.into()),
            ..Self::default()
        }
    }

    /// Set the include tag.
    #[must_use]
    pub fn with_include_tag(mut self, tag: impl Into<String>) -> Self {
        self.include_tag = Some(tag.into());
        self
    }

    /// Set the base directory for include paths.
    #[must_use]
    pub fn with_base_path(mut self, base_path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    /// Set the repeated-inclusion policy.
    #[must_use]
    pub fn with_policy(mut self, policy: InclusionPolicy) -> Self {
        self.include_policy = policy;
        self
    }

    /// Set the dependency field.
    #[must_use]
    pub fn with_dependency_field(mut self, field: impl Into<String>) -> Self {
        self.dependency_field = Some(field.into());
        self
    }

    /// Whether include expansion is enabled.
    #[must_use]
    pub const fn includes_enabled(&self) -> bool {
        self.include_tag.is_some()
    }

    /// Read options from a settings file.
    ///
    /// A relative `base-path` is resolved against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut options: Self = parse_config(path).map_err(|e| AnchorageError::ConfigError {
            path: path.display().to_string(),
            reason: format!("{e:#}"),
        })?;

        if let Some(base) = &options.base_path
            && base.is_relative()
        {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            options.base_path = Some(dir.join(base));
        }

        tracing::debug!("Loaded settings from {}: {:?}", path.display(), options);
        Ok(options)
    }

    /// Read `anchorage.toml` from `dir` if it exists.
    pub fn discover(dir: &Path) -> Result<Option<Self>> {
        let candidate = dir.join(SETTINGS_FILE_NAME);
        if candidate.is_file() {
            Self::from_file(&candidate).map(Some)
        } else {
            Ok(None)
        }
    }
}
