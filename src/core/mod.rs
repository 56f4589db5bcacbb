//! Core types shared by every pipeline stage.
//!
//! Currently this is the error system: [`AnchorageError`] for typed failures and
//! [`ErrorContext`] for the user-facing rendering used by the binary.

pub mod error;

pub use error::{AnchorageError, ErrorContext, user_friendly_error};

/// Result alias used throughout the library.
pub type Result<T, E = AnchorageError> = std::result::Result<T, E>;
