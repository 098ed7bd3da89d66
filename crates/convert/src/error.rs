use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tiltsave_core::SessionError;
use zip::result::ZipError;

/// Errors raised while converting a `.tilt` sketch
#[derive(Error, Debug)]
pub enum TiltError {
    #[error("{} doesn't exist", .0.display())]
    Missing(PathBuf),

    #[error("Remove {} first", .0.display())]
    TargetExists(PathBuf),

    #[error("Bad header: {0}")]
    Header(String),

    #[error("Cannot validate metadata.json: {0}")]
    Metadata(String),

    #[error("Unknown file {0}; this is probably not a .tilt")]
    UnknownMember(String),

    #[error("Unexpected directory {} in expanded sketch", .0.display())]
    UnexpectedDirectory(PathBuf),

    #[error("Archive member {0:?} escapes the sketch directory")]
    UnsafeMember(String),

    #[error("Zip error: {0}")]
    Zip(#[from] ZipError),

    #[error("Failed to {op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TiltError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { op, path, source }
    }
}

impl From<TiltError> for SessionError {
    fn from(err: TiltError) -> Self {
        match err {
            TiltError::Missing(path) => Self::NotFound(path),
            TiltError::TargetExists(path) => Self::AlreadyExists(path),
            TiltError::Io { op, path, source } => Self::io(op, &path, source),
            other => Self::Conversion(other.to_string()),
        }
    }
}
