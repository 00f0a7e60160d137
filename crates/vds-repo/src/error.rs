use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use vds_types::ObjectId;

/// Errors surfaced by repository reads and writes.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("not found: {path}")]
    NotFound { path: String },

    #[error("unknown commit: {0}")]
    UnknownCommit(ObjectId),

    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("conflict at {path}: {reason}")]
    Conflict { path: String, reason: String },

    #[error("{path} no longer exists (expected {expected})")]
    Gone { path: String, expected: ObjectId },

    #[error("not a repository: {}", .0.display())]
    NotARepository(PathBuf),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] vds_store::StoreError),

    #[error("ref error: {0}")]
    Ref(#[from] vds_refs::RefError),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// The coarse outcome categories a transport maps onto its own status codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidPath,
    Conflict,
    Gone,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotFound => "not_found",
            Self::InvalidPath => "invalid_path",
            Self::Conflict => "conflict",
            Self::Gone => "gone",
            Self::Io => "io",
        };
        f.write_str(s)
    }
}

impl RepoError {
    /// Collapse this error onto one of the five outcome kinds.
    ///
    /// Anything the store or ref backend reports, including a dangling or
    /// corrupt object referenced from a reachable commit, is [`ErrorKind::Io`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } | Self::UnknownCommit(_) => ErrorKind::NotFound,
            Self::InvalidPath { .. } => ErrorKind::InvalidPath,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Gone { .. } => ErrorKind::Gone,
            Self::NotARepository(_) | Self::Config(_) | Self::Store(_) | Self::Ref(_) => {
                ErrorKind::Io
            }
        }
    }

    pub(crate) fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn conflict(path: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::Conflict {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(path: impl fmt::Display) -> Self {
        Self::NotFound {
            path: path.to_string(),
        }
    }
}
