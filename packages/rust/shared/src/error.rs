//! Error types for ContentHub.
//!
//! Library crates use [`ContentHubError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all ContentHub operations.
#[derive(Debug, thiserror::Error)]
pub enum ContentHubError {
    /// Missing or invalid input, caught before any network call.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// The referenced project, article or news item no longer exists.
    #[error("not found: {0}")]
    NotFound(String),

    /// Backend or AI-provider failure during ingestion or generation.
    #[error("generation failed: {0}")]
    Generation(String),

    /// The request could not complete (connect, timeout, body read).
    #[error("network error: {0}")]
    Network(String),

    /// Any other non-success response from a CRUD endpoint.
    #[error("backend returned {status}: {detail}")]
    Backend { status: u16, detail: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Response body or config file could not be decoded.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ContentHubError>;

impl ContentHubError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means the resource is already gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
