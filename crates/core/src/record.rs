use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::discovery::SessionAssets;

/// One sketch and every asset correlated with it.
///
/// `base_identifier` is the stem the assets were discovered under and never
/// changes. After a rename, `current_name` carries the live stem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionRecord {
    pub base_identifier: String,
    pub current_path: PathBuf,
    pub current_name: String,
    pub snapshots: Vec<PathBuf>,
    pub videos: Vec<PathBuf>,
    pub exports: Vec<PathBuf>,
    /// `Exports/<stem>`; may not exist on disk.
    pub export_container: PathBuf,
}

impl SessionRecord {
    /// Composes a record from a sketch path and its discovered assets.
    ///
    /// Returns `None` when `sketch_path` has no UTF-8 file stem.
    #[must_use]
    pub fn new(sketch_path: &Path, assets: SessionAssets, export_container: PathBuf) -> Option<Self> {
        let stem = sketch_path.file_stem()?.to_str()?.to_owned();
        Some(Self {
            base_identifier: stem.clone(),
            current_path: sketch_path.to_path_buf(),
            current_name: stem,
            snapshots: assets.snapshots,
            videos: assets.videos,
            exports: assets.exports,
            export_container,
        })
    }

    #[must_use]
    pub fn asset_count(&self) -> usize {
        self.snapshots.len() + self.videos.len() + self.exports.len()
    }
}
