//! Seam for the sketch format converter.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;

use serde::Serialize;

use crate::error::Result;

/// Storage form of a sketch document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Representation {
    /// Single file: header followed by a zip archive.
    Packed,
    /// Directory holding the archive members and the header.
    Expanded,
}

impl Display for Representation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match *self {
            Self::Packed => write!(f, "packed"),
            Self::Expanded => write!(f, "expanded"),
        }
    }
}

/// Converts a sketch between its packed and expanded forms, in place.
pub trait SketchConverter {
    /// Inspects `path` and produces the other form under the same path.
    ///
    /// `compress` only matters when packing. Returns the form `path` is in
    /// afterwards.
    fn convert(&self, path: &Path, compress: bool) -> Result<Representation>;
}
