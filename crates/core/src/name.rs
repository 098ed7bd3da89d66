//! Validated session names supplied by the operator.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Result, SessionError};

/// A name that is safe to use as a file stem and as a directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionName(String);

impl SessionName {
    /// Trims surrounding whitespace, then rejects empty names, `.`/`..`,
    /// path separators and NUL.
    pub fn parse(raw: &str) -> Result<Self> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(SessionError::InvalidArgument("session name is empty".to_owned()));
        }
        if name == "." || name == ".." {
            return Err(SessionError::InvalidArgument(format!(
                "session name {name:?} is reserved"
            )));
        }
        if name.contains(['/', '\\', '\0']) {
            return Err(SessionError::InvalidArgument(format!(
                "session name {name:?} contains a path separator"
            )));
        }
        Ok(Self(name.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SessionName {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionName {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
