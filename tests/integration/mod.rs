//! Integration test suite for anchorage
//!
//! End-to-end tests of the load pipeline and the command-line front end.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **pipeline**: Loading, include expansion, re-indexing and dependency graphs
//! - **includes**: Include security and repeated inclusion policies
//! - **cli**: The `anchorage` binary (`check`, `graph`, `render`)
//!
//! YAML fixtures live in `tests/fixtures/`.

use std::path::PathBuf;

mod cli;
mod includes;
mod pipeline;

/// Path of a fixture below `tests/fixtures`.
pub fn fixture(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(relative)
}
