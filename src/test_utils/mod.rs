//! Test utilities for anchorage
//!
//! Helpers shared by unit and integration tests: once-only logging setup and
//! a writer for fixture trees of YAML files.
//!
//! # Example
//!
//! ```rust,ignore
//! use anchorage::test_utils::{init_test_logging, write_tree};
//!
//! let temp = tempfile::TempDir::new().unwrap();
//! init_test_logging(None);
//! write_tree(temp.path(), &[("main.yml", "tasks: !include tasks.yml\n"), ("tasks.yml", "- lint\n")])
//!     .unwrap();
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Once;

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. With `None`, logging is enabled only if
/// `RUST_LOG` is set:
///
/// ```bash
/// RUST_LOG=anchorage=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// Write `content` to `root/relative`, creating parent directories.
pub fn write_fixture(root: &Path, relative: &str, content: &str) -> io::Result<PathBuf> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, content)?;
    Ok(path)
}

/// Write several `(relative path, content)` fixtures below `root`.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) -> io::Result<()> {
    for (relative, content) in files {
        write_fixture(root, relative, content)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_tree_creates_directories() {
        let temp = TempDir::new().unwrap();
        write_tree(temp.path(), &[("a.yml", "a: 1\n"), ("nested/deep/b.yml", "b: 2\n")]).unwrap();

        assert_eq!(fs::read_to_string(temp.path().join("a.yml")).unwrap(), "a: 1\n");
        assert!(temp.path().join("nested/deep/b.yml").is_file());
    }

    #[test]
    fn test_init_test_logging_is_idempotent() {
        init_test_logging(Some(Level::DEBUG));
        init_test_logging(None);
    }
}
