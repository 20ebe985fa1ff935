//! Error types for xmlpipes-core.

use std::path::{Path, PathBuf};

/// Result type alias for XMLPipes operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while declaring indexes, casting values,
/// exporting document-sets, or talking to the search daemon.
///
/// All error variants are marked with `#[non_exhaustive]` to allow
/// adding new error types without breaking changes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Unrecognized attribute type, or integer `bits` outside `1..=32`.
    #[error("Invalid attribute '{name}': {reason}")]
    InvalidAttribute {
        /// Attribute being declared
        name: String,
        /// What made the declaration invalid
        reason: String,
    },

    /// Integer value does not fit the attribute's configured bit width.
    #[error("Value {value} does not fit into {bits} bits")]
    Range {
        /// Offending value
        value: i64,
        /// Configured width
        bits: u32,
    },

    /// A value cannot be coerced to an attribute type.
    #[error("Cannot cast {value} to {kind}")]
    Cast {
        /// Target attribute type
        kind: &'static str,
        /// Debug rendering of the input value
        value: String,
    },

    /// An application type has not supplied a document-resolution hook.
    #[error("{type_name} does not implement from_document_id")]
    NotImplemented {
        /// Name of the application type
        type_name: String,
    },

    /// A hit carried a class tag that no registered type owns.
    #[error("No registered type for class tag {0}")]
    UnknownClassTag(u32),

    /// Search daemon transport failure (connection refused, protocol error).
    #[error("Client error: {message}")]
    Client {
        /// Human-readable error message
        message: String,
        /// Source error if available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An external indexer command exited unsuccessfully.
    #[error("Command `{command}` exited with status {status}")]
    CommandFailed {
        /// Rendered command line
        command: String,
        /// Exit status (-1 when terminated by a signal)
        status: i32,
    },

    /// I/O error with the path involved.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Document-set rendering error.
    #[error("XML error: {0}")]
    Xml(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns whether this error is retryable.
    ///
    /// Only transport and filesystem failures are considered transient;
    /// nothing in XMLPipes retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Client { .. } | Error::Io { .. })
    }

    /// Creates an invalid attribute error.
    pub fn invalid_attribute(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidAttribute {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates a cast error for the given target kind.
    pub fn cast(kind: &'static str, value: impl std::fmt::Debug) -> Self {
        Error::Cast {
            kind,
            value: format!("{value:?}"),
        }
    }

    /// Creates a not-implemented error for an application type.
    pub fn not_implemented(type_name: impl Into<String>) -> Self {
        Error::NotImplemented {
            type_name: type_name.into(),
        }
    }

    /// Creates a client error with a message.
    pub fn client(message: impl Into<String>) -> Self {
        Error::Client {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a client error with a message and source error.
    pub fn client_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Client {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an I/O error carrying the path involved.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates an XML rendering error.
    pub fn xml(message: impl std::fmt::Display) -> Self {
        Error::Xml(message.to_string())
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }
}

// ============================================================================
// Tests
// ============================================================================
