use std::io;
use std::path::{Path, PathBuf};
use std::result::Result as StdResult;

use thiserror::Error;

/// Errors that can occur while saving a sketch session
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to {op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Rename left {} asset(s) under the old name", remaining.len())]
    PartialRename { remaining: Vec<PathBuf> },
}

/// Coarse classification of [`SessionError`], used by callers that only
/// care about which class of failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidArgument,
    IoFailure,
    Conversion,
}

impl SessionError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match *self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Io { .. } | Self::PartialRename { .. } => ErrorKind::IoFailure,
            Self::Conversion(_) => ErrorKind::Conversion,
        }
    }

    /// Wraps an `io::Error` raised by `op` on `path`.
    ///
    /// `NotFound` and `AlreadyExists` io errors keep their meaning so the
    /// caller can tolerate them selectively.
    pub fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::AlreadyExists => Self::AlreadyExists(path.to_path_buf()),
            _ => Self::Io { op, path: path.to_path_buf(), source },
        }
    }
}

pub type Result<T> = StdResult<T, SessionError>;
