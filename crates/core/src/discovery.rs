//! Asset discovery: which files belong to a sketch, by naming convention.
//!
//! Discovery never mutates the filesystem and never fails. A missing
//! category directory or export container simply yields no assets.

use std::fs;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use serde::Serialize;

use crate::constants::ASSET_DELIMITER;
use crate::layout::{AssetCategory, SessionLayout};

/// Assets found for one sketch, grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionAssets {
    pub snapshots: Vec<PathBuf>,
    pub videos: Vec<PathBuf>,
    pub exports: Vec<PathBuf>,
}

impl SessionAssets {
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len() + self.videos.len() + self.exports.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Runs [`find_assets`] for every category.
#[must_use]
pub fn discover_assets(layout: &SessionLayout, base_identifier: &str) -> SessionAssets {
    SessionAssets {
        snapshots: find_assets(layout, base_identifier, AssetCategory::Snapshots),
        videos: find_assets(layout, base_identifier, AssetCategory::Videos),
        exports: find_assets(layout, base_identifier, AssetCategory::Exports),
    }
}

/// Returns the paths of `category` assets belonging to `base_identifier`,
/// sorted by file name.
///
/// Snapshots and videos match `<base>_*` in their category directory.
/// Exports are every entry of the container directory named exactly
/// `<base>`, whatever the entries are called.
#[must_use]
pub fn find_assets(
    layout: &SessionLayout,
    base_identifier: &str,
    category: AssetCategory,
) -> Vec<PathBuf> {
    if base_identifier.is_empty() {
        tracing::debug!(%category, "empty base identifier, no assets");
        return Vec::new();
    }

    let (dir, pattern) = match category {
        AssetCategory::Snapshots | AssetCategory::Videos => (
            layout.category_dir(category),
            format!("{}{ASSET_DELIMITER}*", globset::escape(base_identifier)),
        ),
        AssetCategory::Exports => (layout.export_container(base_identifier), "*".to_owned()),
    };

    let matcher = match GlobBuilder::new(&pattern).literal_separator(true).build() {
        Ok(glob) => glob.compile_matcher(),
        Err(err) => {
            tracing::warn!(%category, pattern, "invalid asset pattern: {err}");
            return Vec::new();
        },
    };

    let assets = list_matching(&dir, &matcher);
    tracing::debug!(%category, base_identifier, count = assets.len(), "discovered assets");
    assets
}

fn list_matching(dir: &Path, matcher: &GlobMatcher) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::debug!(dir = %dir.display(), "asset directory not readable: {err}");
            return Vec::new();
        },
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| !name.starts_with('.') && matcher.is_match(name))
        })
        .map(|entry| entry.path())
        .collect();
    paths.sort();
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn snapshots_match_prefix_with_delimiter() {
        let tmp = TempDir::new().unwrap();
        let layout = SessionLayout::new(tmp.path());
        let dir = layout.category_dir(AssetCategory::Snapshots);
        for name in ["Untitled_1_01.png", "Untitled_1_00.png", "Untitled_10_00.png", "Untitled_1.png"] {
            touch(&dir.join(name));
        }

        let found = find_assets(&layout, "Untitled_1", AssetCategory::Snapshots);
        assert_eq!(names(&found), ["Untitled_1_00.png", "Untitled_1_01.png"]);
    }

    #[test]
    fn videos_include_every_sibling_file() {
        let tmp = TempDir::new().unwrap();
        let layout = SessionLayout::new(tmp.path());
        let dir = layout.category_dir(AssetCategory::Videos);
        for name in ["Untitled_0_00.HQ_Render.bat", "Untitled_0_00.mp4", "Untitled_0_00.usda"] {
            touch(&dir.join(name));
        }

        let found = find_assets(&layout, "Untitled_0", AssetCategory::Videos);
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn exports_list_the_whole_container() {
        let tmp = TempDir::new().unwrap();
        let layout = SessionLayout::new(tmp.path());
        let container = layout.export_container("Untitled_0");
        for name in ["Untitled_0.fbx", "Untitled_0.json", "readme.txt"] {
            touch(&container.join(name));
        }
        touch(&layout.export_container("Untitled_01").join("Untitled_01.fbx"));

        let found = find_assets(&layout, "Untitled_0", AssetCategory::Exports);
        assert_eq!(names(&found), ["Untitled_0.fbx", "Untitled_0.json", "readme.txt"]);
    }

    #[test]
    fn glob_metacharacters_in_identifier_are_literal() {
        let tmp = TempDir::new().unwrap();
        let layout = SessionLayout::new(tmp.path());
        let dir = layout.category_dir(AssetCategory::Snapshots);
        touch(&dir.join("Sketch[1]_00.png"));
        touch(&dir.join("Sketch1_00.png"));

        let found = find_assets(&layout, "Sketch[1]", AssetCategory::Snapshots);
        assert_eq!(names(&found), ["Sketch[1]_00.png"]);
    }

    #[test]
    fn hidden_files_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let layout = SessionLayout::new(tmp.path());
        touch(&layout.export_container("Untitled_0").join(".DS_Store"));

        assert!(find_assets(&layout, "Untitled_0", AssetCategory::Exports).is_empty());
    }

    #[test]
    fn missing_directories_yield_nothing() {
        let tmp = TempDir::new().unwrap();
        let layout = SessionLayout::new(tmp.path().join("absent"));

        let assets = discover_assets(&layout, "Untitled_0");
        assert!(assets.is_empty());
        assert!(find_assets(&layout, "", AssetCategory::Snapshots).is_empty());
    }
}
