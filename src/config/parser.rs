//! Generic TOML settings parsing.
//!
//! Errors carry the file path as context:
//!
//! ```text
//! Failed to parse config file: /path/to/anchorage.toml
//! Caused by:
//!     unknown field `include_tag`, expected one of `include-tag`, ...
//! ```

use anyhow::{Context, Result};
use std::path::Path;

/// Parse a TOML file into `T`.
///
/// ```rust,no_run
/// use anchorage::config::{LoadOptions, parse_config};
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let options: LoadOptions = parse_config(Path::new("anchorage.toml"))?;
/// println!("include tag: {:?}", options.include_tag);
/// # Ok(())
/// # }
/// ```
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}
