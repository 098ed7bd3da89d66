//! Fixed directory layout of a Tilt Brush working root.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::constants::{EXPORTS_DIR, SKETCHES_DIR, SNAPSHOTS_DIR, VIDEOS_DIR};

/// Asset categories correlated with a sketch by filename prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    /// Preview images - `Snapshots/<stem>_NN.png`
    Snapshots,
    /// Recorded clips - `Videos/<stem>_NN.{mp4,usda,HQ_Render.bat}`
    Videos,
    /// Exported scenes - every entry of `Exports/<stem>/`
    Exports,
}

impl AssetCategory {
    pub const ALL: [Self; 3] = [Self::Snapshots, Self::Videos, Self::Exports];
}

impl Display for AssetCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match *self {
            Self::Snapshots => write!(f, "snapshots"),
            Self::Videos => write!(f, "videos"),
            Self::Exports => write!(f, "exports"),
        }
    }
}

/// The working root and its sibling asset directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLayout {
    root: PathBuf,
}

impl SessionLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn sketches_dir(&self) -> PathBuf {
        self.root.join(SKETCHES_DIR)
    }

    #[must_use]
    pub fn category_dir(&self, category: AssetCategory) -> PathBuf {
        match category {
            AssetCategory::Snapshots => self.root.join(SNAPSHOTS_DIR),
            AssetCategory::Videos => self.root.join(VIDEOS_DIR),
            AssetCategory::Exports => self.root.join(EXPORTS_DIR),
        }
    }

    /// Export container of one sketch: `Exports/<stem>`.
    #[must_use]
    pub fn export_container(&self, base_identifier: &str) -> PathBuf {
        self.category_dir(AssetCategory::Exports).join(base_identifier)
    }
}
