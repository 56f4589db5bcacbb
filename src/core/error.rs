//! Error handling for anchorage
//!
//! Every stage of the preprocessing pipeline (parsing, anchor indexing, include
//! expansion, dependency graph construction and cycle detection) reports failures
//! through [`AnchorageError`]. None of these errors are transient: they describe
//! structural or configuration problems in the input, so the pipeline aborts on
//! the first one and surfaces it unchanged.
//!
//! # Error Categories
//!
//! - **Parsing**: [`AnchorageError::ParseFailure`]
//! - **Aliases**: [`AnchorageError::NotAnAlias`], [`AnchorageError::UnresolvedAlias`],
//!   [`AnchorageError::RecursiveAlias`]
//! - **Includes**: [`AnchorageError::ParentTraversalForbidden`], [`AnchorageError::PathEscape`],
//!   [`AnchorageError::RecursiveInclusion`], [`AnchorageError::IncludeReadError`],
//!   [`AnchorageError::IncludeParseError`], [`AnchorageError::InvalidIncludeDirective`]
//! - **Dependencies**: [`AnchorageError::UnresolvedDagNode`], [`AnchorageError::CycleDetected`]
//! - **Configuration**: [`AnchorageError::MissingBasePath`], [`AnchorageError::ConfigError`]
//! - **Other**: [`AnchorageError::DecodeError`], [`AnchorageError::IoError`], [`AnchorageError::Other`]
//!
//! The binary converts errors into an [`ErrorContext`] via [`user_friendly_error`],
//! which adds details and an actionable suggestion.
//!
//! # Examples
//!
//! ```rust,no_run
//! use anchorage::core::{AnchorageError, user_friendly_error};
//!
//! let error = AnchorageError::UnresolvedAlias {
//!     name: "defaults".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::constants::SETTINGS_FILE_NAME;

/// The main error type for anchorage operations.
#[derive(Error, Debug)]
pub enum AnchorageError {
    /// The YAML parser rejected the input document.
    #[error("Failed to parse {origin}: {reason}")]
    ParseFailure {
        /// Where the text came from (file path or `<input>`)
        origin: String,
        /// Parser diagnostic, including position
        reason: String,
    },

    /// A node handed to the alias resolver is not an alias.
    #[error("Node is not an alias ({kind} at line {line}, column {column})")]
    NotAnAlias {
        /// Kind of the offending node
        kind: String,
        /// Line of the offending node
        line: usize,
        /// Column of the offending node
        column: usize,
    },

    /// An alias names an anchor that is not in the anchor index.
    #[error("Unresolved alias: *{name}")]
    UnresolvedAlias {
        /// The anchor identifier the alias refers to
        name: String,
    },

    /// An alias expands (directly or transitively) into itself.
    #[error("Alias *{name} expands into itself")]
    RecursiveAlias {
        /// The alias that was re-entered
        name: String,
    },

    /// An include path literally contains a `..` segment.
    #[error("Parent traversal forbidden in include: {path}")]
    ParentTraversalForbidden {
        /// The raw include path as written in the document
        path: String,
    },

    /// An include path resolves outside of its base directory.
    #[error("Included file escapes base directory: {path}")]
    PathEscape {
        /// The raw include path as written in the document
        path: String,
    },

    /// A file was included more than once during one expansion.
    #[error("Recursive inclusion detected: {path}")]
    RecursiveInclusion {
        /// Canonical path of the repeated file
        path: String,
    },

    /// An include target could not be read.
    #[error("Failed to read included file {path}")]
    IncludeReadError {
        /// Path that was read
        path: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// An include target was read but is not a valid document.
    #[error("Failed to parse included file {path}: {reason}")]
    IncludeParseError {
        /// Path that was parsed
        path: String,
        /// Parser diagnostic
        reason: String,
    },

    /// A node carries the include tag but is not a scalar path.
    #[error("Include directive at line {line}, column {column} must be a scalar path, found {kind}")]
    InvalidIncludeDirective {
        /// Kind of the tagged node
        kind: String,
        /// Line of the tagged node
        line: usize,
        /// Column of the tagged node
        column: usize,
    },

    /// Include expansion was requested without a base directory.
    #[error("Base path must be set when an include tag is configured")]
    MissingBasePath,

    /// A dependency reference does not name a node of the dependency graph.
    #[error("'{owner}': unresolved dependency node '{id}'")]
    UnresolvedDagNode {
        /// Identifier of the node declaring the dependency
        owner: String,
        /// The identifier that could not be found
        id: String,
    },

    /// The dependency graph contains a cycle.
    ///
    /// `id` is the node at which the cycle was re-entered. `chain` lists the
    /// active traversal path that closed the cycle, ending with `id`.
    #[error("Cycle detected at node: {id}")]
    CycleDetected {
        /// Node at which the cycle was re-entered
        id: String,
        /// Traversal path that closed the cycle
        chain: Vec<String>,
    },

    /// The resolved tree could not be decoded into the requested type.
    #[error("Failed to decode document: {reason}")]
    DecodeError {
        /// serde diagnostic
        reason: String,
    },

    /// A settings file could not be read or is invalid.
    #[error("Configuration error in {path}: {reason}")]
    ConfigError {
        /// Settings file path
        path: String,
        /// What went wrong
        reason: String,
    },

    /// Standard I/O failure outside of include expansion.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Any other failure, reported with its message only.
    #[error("{message}")]
    Other {
        /// Rendered error message, including its causes
        message: String,
    },
}

impl AnchorageError {
    /// Clone an I/O error by kind and message; `std::io::Error` is not `Clone`.
    fn clone_io(error: &std::io::Error) -> std::io::Error {
        std::io::Error::new(error.kind(), error.to_string())
    }
}

impl Clone for AnchorageError {
    fn clone(&self) -> Self {
        match self {
            Self::ParseFailure {
                origin,
                reason,
            } => Self::ParseFailure {
                origin: origin.clone(),
                reason: reason.clone(),
            },
            Self::NotAnAlias {
                kind,
                line,
                column,
            } => Self::NotAnAlias {
                kind: kind.clone(),
                line: *line,
                column: *column,
            },
            Self::UnresolvedAlias {
                name,
            } => Self::UnresolvedAlias {
                name: name.clone(),
            },
            Self::RecursiveAlias {
                name,
            } => Self::RecursiveAlias {
                name: name.clone(),
            },
            Self::ParentTraversalForbidden {
                path,
            } => Self::ParentTraversalForbidden {
                path: path.clone(),
            },
            Self::PathEscape {
                path,
            } => Self::PathEscape {
                path: path.clone(),
            },
            Self::RecursiveInclusion {
                path,
            } => Self::RecursiveInclusion {
                path: path.clone(),
            },
            Self::IncludeReadError {
                path,
                source,
            } => Self::IncludeReadError {
                path: path.clone(),
                source: Self::clone_io(source),
            },
            Self::IncludeParseError {
                path,
                reason,
            } => Self::IncludeParseError {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::InvalidIncludeDirective {
                kind,
                line,
                column,
            } => Self::InvalidIncludeDirective {
                kind: kind.clone(),
                line: *line,
                column: *column,
            },
            Self::MissingBasePath => Self::MissingBasePath,
            Self::UnresolvedDagNode {
                owner,
                id,
            } => Self::UnresolvedDagNode {
                owner: owner.clone(),
                id: id.clone(),
            },
            Self::CycleDetected {
                id,
                chain,
            } => Self::CycleDetected {
                id: id.clone(),
                chain: chain.clone(),
            },
            Self::DecodeError {
                reason,
            } => Self::DecodeError {
                reason: reason.clone(),
            },
            Self::ConfigError {
                path,
                reason,
            } => Self::ConfigError {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::IoError(e) => Self::IoError(Self::clone_io(e)),
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error wrapper carrying user-facing details and a suggestion.
///
/// Displayed by the binary on stderr with terminal colors.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: AnchorageError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context with no details or suggestion.
    #[must_use]
    pub const fn new(error: AnchorageError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr: error in red, details in yellow, suggestion in green.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with helpful suggestions.
///
/// Known [`AnchorageError`] values get tailored advice. Anything else keeps its
/// full cause chain in the message.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(anchorage_error) = error.downcast_ref::<AnchorageError>() {
        return create_error_context(anchorage_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(AnchorageError::IoError(AnchorageError::clone_io(io_error)))
                    .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(AnchorageError::IoError(AnchorageError::clone_io(io_error)))
                    .with_suggestion("Check the file permissions and ownership");
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(AnchorageError::ConfigError {
            path: SETTINGS_FILE_NAME.to_string(),
            reason: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax and key names of the settings file");
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(AnchorageError::Other {
        message,
    })
}

fn create_error_context(error: AnchorageError) -> ErrorContext {
    match &error {
        AnchorageError::ParseFailure {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check the YAML syntax near the reported line and column"),
        AnchorageError::UnresolvedAlias {
            name,
        } => {
            let suggestion = format!("Declare the anchor with '&{name}' before it is referenced");
            ErrorContext::new(error)
                .with_suggestion(suggestion)
                .with_details("Aliases can only refer to anchors indexed in the same document, including included files")
        }
        AnchorageError::ParentTraversalForbidden {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Move the included file below the including file's directory and reference it without '..'")
            .with_details("Include paths may not contain '..' anywhere, even when the result would stay inside the base directory"),
        AnchorageError::PathEscape {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Use a relative path that stays inside the base directory")
            .with_details("Absolute paths and symlinks leading outside the base directory are rejected"),
        AnchorageError::RecursiveInclusion {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Remove the include cycle, or use the 'active-chain' include policy if the file is legitimately included from several places")
            .with_details("With the default 'reject-repeats' policy every file may be included only once per expansion"),
        AnchorageError::IncludeReadError {
            source,
            ..
        } => {
            let details = format!("The operating system reported: {source}");
            ErrorContext::new(error)
                .with_suggestion("Check that the included file exists and is readable")
                .with_details(details)
        }
        AnchorageError::MissingBasePath => ErrorContext::new(error)
            .with_suggestion("Pass --base-path or set 'base-path' in anchorage.toml, or disable includes with --no-includes"),
        AnchorageError::UnresolvedDagNode {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Make sure every dependency entry is an alias to an anchored node"),
        AnchorageError::CycleDetected {
            chain,
            ..
        } => {
            let details = format!("Dependency chain: {}", chain.join(" → "));
            ErrorContext::new(error)
                .with_suggestion("Remove one of the dependency edges to break the cycle")
                .with_details(details)
        }
        _ => ErrorContext::new(error),
    }
}
