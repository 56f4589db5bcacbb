//! Load pipelines: text to an indexed, expanded document.
//!
//! ```rust,no_run
//! use anchorage::config::LoadOptions;
//! use anchorage::loader::load_file;
//! use std::path::Path;
//!
//! let options = LoadOptions::new()
//!     .with_include_tag("!include")
//!     .with_dependency_field("depends_on");
//! let loaded = load_file(Path::new("pipeline.yml"), &options)?;
//! println!("{} anchor(s)", loaded.anchors().len());
//! # Ok::<(), anchorage::core::AnchorageError>(())
//! ```

use std::fs;
use std::io::Read;
use std::path::Path;

use crate::config::LoadOptions;
use crate::constants::INLINE_ORIGIN;
use crate::core::{AnchorageError, Result};
use crate::document::{Document, YamlParser};
use crate::include::IncludeExpander;

/// Parse and index a document read from `reader`. Includes are not expanded.
pub fn load<R: Read>(mut reader: R) -> Result<Document> {
    let mut source = String::new();
    reader.read_to_string(&mut source)?;
    load_str(&source)
}

/// Parse and index a document held in memory. Includes are not expanded.
pub fn load_str(source: &str) -> Result<Document> {
    Document::parse(source)
}

/// Parse, index and, when an include tag is configured, expand includes
/// against `options.base_path` and re-index.
pub fn load_with_options<R: Read>(mut reader: R, options: &LoadOptions) -> Result<Document> {
    let mut source = String::new();
    reader.read_to_string(&mut source)?;
    load_source(&source, INLINE_ORIGIN, options)
}

/// Like [`load_with_options`] for a file on disk.
///
/// The base path defaults to the file's directory.
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<Document> {
    let source = fs::read_to_string(path)?;

    let mut options = options.clone();
    if options.base_path.is_none() {
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
        options.base_path = Some(dir.to_path_buf());
    }

    load_source(&source, &path.display().to_string(), &options)
}

fn load_source(source: &str, origin: &str, options: &LoadOptions) -> Result<Document> {
    let doc = Document::parse_with(&YamlParser, source, origin)?;
    tracing::debug!("Parsed {}: {} anchor(s)", origin, doc.anchors().len());

    let Some(tag) = &options.include_tag else {
        return Ok(doc);
    };
    let base = options.base_path.as_deref().ok_or(AnchorageError::MissingBasePath)?;

    let mut expander = IncludeExpander::new(tag.as_str()).with_policy(options.include_policy);
    doc.expand_includes(&mut expander, base)
}
