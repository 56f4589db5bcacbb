//! Filesystem helpers shared by the include expander and the loader.

pub mod path_validation;

pub use path_validation::{
    absolute_path, is_within, normalize_path, resolve_include_path, validate_no_traversal,
};
