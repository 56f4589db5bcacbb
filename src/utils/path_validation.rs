//! Path validation for include directives.
//!
//! Include paths come from document content, so they are treated as untrusted
//! input. Resolution goes through three gates:
//!
//! 1. The raw text may not contain `..` anywhere ([`validate_no_traversal`]).
//!    This is a purely syntactic check made before any joining.
//! 2. The lexically normalized, absolute target must lie inside the absolute
//!    base directory ([`is_within`], component-wise).
//! 3. When the target exists, the same containment must hold for the
//!    canonical (symlink-resolved) forms of both paths.

use std::path::{Component, Path, PathBuf};

use crate::core::{AnchorageError, Result};

/// Reject include paths containing a parent-directory marker.
///
/// The check is textual: `a/../a/x.yml` and `notes..yml` are both rejected,
/// even though the first stays inside its directory.
pub fn validate_no_traversal(raw: &str) -> Result<()> {
    if raw.contains("..") {
        return Err(AnchorageError::ParentTraversalForbidden {
            path: raw.to_string(),
        });
    }
    Ok(())
}

/// Resolve `.` and `..` components without touching the filesystem.
///
/// # Examples
///
/// ```rust
/// use anchorage::utils::normalize_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(normalize_path(Path::new("/foo/./bar/../baz")), PathBuf::from("/foo/baz"));
/// ```
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                components.pop();
            }
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// Absolute, lexically normalized form of `path`.
pub fn absolute_path(path: &Path) -> std::io::Result<PathBuf> {
    Ok(normalize_path(&std::path::absolute(path)?))
}

/// Whether `path` equals `base` or lies below it, comparing whole components.
///
/// `/work/base-extra` is not within `/work/base`.
#[must_use]
pub fn is_within(path: &Path, base: &Path) -> bool {
    path.starts_with(base)
}

/// Resolve an include path against `base_dir` and enforce containment.
///
/// Returns the canonical path of the target when it exists, otherwise its
/// absolute normalized path (reading it will then fail with a read error).
pub fn resolve_include_path(raw: &str, base_dir: &Path) -> Result<PathBuf> {
    validate_no_traversal(raw)?;

    let joined = normalize_path(&base_dir.join(raw));
    let read_error = |path: &Path, source: std::io::Error| AnchorageError::IncludeReadError {
        path: path.display().to_string(),
        source,
    };

    let absolute_base = absolute_path(base_dir).map_err(|e| read_error(base_dir, e))?;
    let absolute_target = absolute_path(&joined).map_err(|e| read_error(&joined, e))?;

    if !is_within(&absolute_target, &absolute_base) {
        return Err(AnchorageError::PathEscape {
            path: raw.to_string(),
        });
    }

    if !absolute_target.exists() {
        return Ok(absolute_target);
    }

    let canonical_base =
        absolute_base.canonicalize().map_err(|e| read_error(&absolute_base, e))?;
    let canonical_target =
        absolute_target.canonicalize().map_err(|e| read_error(&absolute_target, e))?;

    if !is_within(&canonical_target, &canonical_base) {
        return Err(AnchorageError::PathEscape {
            path: raw.to_string(),
        });
    }

    Ok(canonical_target)
}
