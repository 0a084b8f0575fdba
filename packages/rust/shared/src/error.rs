//! Error types for wikiharvest.
//!
//! Library crates use [`HarvestError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level error type for all wikiharvest operations.
#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    /// Request failed, was refused, or returned a non-success status.
    #[error("network error: {0}")]
    Network(String),

    /// Response body was not valid UTF-8 text.
    #[error("decode error: {0}")]
    Decode(String),

    /// The page has no main content container.
    #[error("malformed page: {message}")]
    MalformedPage { message: String },

    /// A location string does not carry a valid (group, sub-key) pair.
    #[error("invalid identifier: {location}")]
    InvalidIdentifier { location: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON serialization of the corpus or report failed.
    #[error("serialize error: {0}")]
    Serialize(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, HarvestError>;

impl HarvestError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a malformed-page error from any displayable message.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedPage {
            message: msg.into(),
        }
    }

    /// Create an invalid-identifier error for the offending location.
    pub fn invalid_identifier(location: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            location: location.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The per-item failure kind, or `None` for run-level errors.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Network(_) => Some(FailureKind::NetworkError),
            Self::Decode(_) => Some(FailureKind::DecodeError),
            Self::MalformedPage { .. } => Some(FailureKind::MalformedPage),
            Self::InvalidIdentifier { .. } => Some(FailureKind::InvalidIdentifier),
            Self::Config { .. } | Self::Io { .. } | Self::Serialize(_) => None,
        }
    }
}

/// Why a single item could not be harvested.
///
/// Every kind is local to its item: the run records it and carries on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    NetworkError,
    DecodeError,
    MalformedPage,
    InvalidIdentifier,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NetworkError => "NetworkError",
            Self::DecodeError => "DecodeError",
            Self::MalformedPage => "MalformedPage",
            Self::InvalidIdentifier => "InvalidIdentifier",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = HarvestError::config("concurrency must be at least 1");
        assert_eq!(err.to_string(), "config error: concurrency must be at least 1");

        let err = HarvestError::invalid_identifier("/wiki/index.php/Main_Page");
        assert!(err.to_string().contains("Main_Page"));
    }

    #[test]
    fn per_item_errors_map_to_failure_kinds() {
        assert_eq!(
            HarvestError::Network("refused".into()).failure_kind(),
            Some(FailureKind::NetworkError)
        );
        assert_eq!(
            HarvestError::Decode("bad utf-8".into()).failure_kind(),
            Some(FailureKind::DecodeError)
        );
        assert_eq!(
            HarvestError::malformed("no container").failure_kind(),
            Some(FailureKind::MalformedPage)
        );
        assert_eq!(
            HarvestError::invalid_identifier("x").failure_kind(),
            Some(FailureKind::InvalidIdentifier)
        );
    }

    #[test]
    fn run_level_errors_have_no_failure_kind() {
        assert_eq!(HarvestError::config("x").failure_kind(), None);
        assert_eq!(HarvestError::Serialize("x".into()).failure_kind(), None);
    }

    #[test]
    fn failure_kind_serializes_by_name() {
        let json = serde_json::to_string(&FailureKind::MalformedPage).expect("serialize");
        assert_eq!(json, "\"MalformedPage\"");
        assert_eq!(FailureKind::DecodeError.to_string(), "DecodeError");
    }
}
