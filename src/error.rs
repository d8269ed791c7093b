//! Error types for artifact loading and recommendation calls.
//!
//! Two layers are kept distinct on purpose: an absent name or id is a
//! recoverable non-match and surfaces as `Option::None` or an empty result,
//! never as an error. Errors are reserved for backend problems a caller
//! must be able to tell apart from "no recommendation available": missing
//! or malformed artifacts and a user flow invoked on a service built
//! without the user domain.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while loading external artifacts (CSV tables, JSON
/// weight matrices and codecs).
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The artifact file does not exist at the configured path.
    #[error("artifact not found: {path}")]
    NotFound {
        /// Configured location that was probed
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact exists but could not be read.
    #[error("failed to read artifact {path}: {source}")]
    Io {
        /// Location of the unreadable artifact
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV artifact could not be parsed.
    #[error("failed to parse CSV artifact {path}: {source}")]
    Csv {
        /// Location of the malformed artifact
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A JSON artifact could not be deserialized.
    #[error("failed to parse JSON artifact {path}: {source}")]
    Json {
        /// Location of the malformed artifact
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The artifact deserialized but violates a structural invariant
    /// (ragged embedding rows, non-bijective codec, empty table, missing
    /// column).
    #[error("corrupt artifact {path}: {reason}")]
    Corrupt {
        /// Location of the offending artifact
        path: PathBuf,
        /// Which invariant was violated
        reason: String,
    },
}

impl ArtifactError {
    /// Classify an io::Error against a path, mapping `NotFound` kinds to
    /// the dedicated variant.
    pub fn from_io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path: path.to_path_buf(), source }
        } else {
            Self::Io { path: path.to_path_buf(), source }
        }
    }

    /// Create a Csv error.
    pub fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv { path: path.to_path_buf(), source }
    }

    /// Create a Json error.
    pub fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json { path: path.to_path_buf(), source }
    }

    /// Create a Corrupt error.
    pub fn corrupt(path: &Path, reason: impl Into<String>) -> Self {
        Self::Corrupt { path: path.to_path_buf(), reason: reason.into() }
    }
}

/// Errors surfaced by the recommendation service.
#[derive(Debug, Error)]
pub enum RecError {
    /// An external artifact failed to load.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// The user-based flow was invoked on a service assembled without the
    /// user embedding domain (weights, codec, ratings).
    #[error("user recommendation domain is not configured")]
    UserDomainUnavailable,
}

/// Convenience alias used throughout the service layer.
pub type Result<T> = std::result::Result<T, RecError>;
