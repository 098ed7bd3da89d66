//! Archival migration: copy the working root under the archive, then clear it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::error::{Result, SessionError};
use crate::name::SessionName;

/// Outcome of removing the working root after the copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum Cleanup {
    Removed,
    /// The archive copy is complete; the working root is left behind.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub archive_path: PathBuf,
    pub files_copied: usize,
    pub cleanup: Cleanup,
}

/// `<archive_base>/<session_name>`
#[must_use]
pub fn archive_path(archive_base: &Path, session_name: &SessionName) -> PathBuf {
    archive_base.join(session_name.as_str())
}

/// Fails with `AlreadyExists` when the session's archive directory is taken.
pub fn ensure_archive_free(archive_base: &Path, session_name: &SessionName) -> Result<PathBuf> {
    let target = archive_path(archive_base, session_name);
    if fs::symlink_metadata(&target).is_ok() {
        return Err(SessionError::AlreadyExists(target));
    }
    Ok(target)
}

/// Copies `working_root` recursively to `<archive_base>/<session_name>` and
/// then removes `working_root`.
///
/// `archive_base` is created if missing (one level only). An existing
/// archive directory fails with `AlreadyExists` before anything is copied.
/// A failed removal is reported in [`MigrationReport::cleanup`] and logged,
/// never returned as an error.
pub fn migrate(
    working_root: &Path,
    archive_base: &Path,
    session_name: &SessionName,
) -> Result<MigrationReport> {
    if !working_root.is_dir() {
        return Err(SessionError::NotFound(working_root.to_path_buf()));
    }
    let target = ensure_archive_free(archive_base, session_name)?;
    reject_nested(working_root, &target)?;

    match fs::create_dir(archive_base) {
        Ok(()) => tracing::info!(path = %archive_base.display(), "created archive root"),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {},
        Err(err) => return Err(SessionError::io("create directory", archive_base, err)),
    }

    let files_copied = copy_tree(working_root, &target)?;
    tracing::info!(
        from = %working_root.display(),
        to = %target.display(),
        files_copied,
        "archived session"
    );

    let cleanup = remove_working_root(working_root);

    Ok(MigrationReport { archive_path: target, files_copied, cleanup })
}

/// Removes the working root once its copy is durable. Failure is logged
/// and reported, never raised.
fn remove_working_root(working_root: &Path) -> Cleanup {
    match fs::remove_dir_all(working_root) {
        Ok(()) => {
            tracing::info!(path = %working_root.display(), "removed working root");
            Cleanup::Removed
        },
        Err(err) => {
            tracing::warn!(
                path = %working_root.display(),
                "unable to remove working root, delete it manually: {err}"
            );
            Cleanup::Failed(err.to_string())
        },
    }
}

/// Copying a tree into itself never terminates.
fn reject_nested(working_root: &Path, target: &Path) -> Result<()> {
    let root = std::path::absolute(working_root)
        .map_err(|err| SessionError::io("resolve", working_root, err))?;
    let target = std::path::absolute(target).map_err(|err| SessionError::io("resolve", target, err))?;
    if target.starts_with(&root) {
        return Err(SessionError::InvalidArgument(format!(
            "archive {} lies inside the working root {}",
            target.display(),
            root.display()
        )));
    }
    Ok(())
}

/// Recreates `src` at `dst` (which must not exist). Returns the number of
/// files copied.
fn copy_tree(src: &Path, dst: &Path) -> Result<usize> {
    fs::create_dir(dst).map_err(|err| SessionError::io("create directory", dst, err))?;

    let mut files = 0usize;
    for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(src).to_path_buf();
            SessionError::io("walk", &path, io::Error::from(err))
        })?;
        let relative = entry.path().strip_prefix(src).map_err(|_| {
            SessionError::InvalidArgument(format!("{} escaped {}", entry.path().display(), src.display()))
        })?;
        let dest = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir(&dest).map_err(|err| SessionError::io("create directory", &dest, err))?;
        } else {
            fs::copy(entry.path(), &dest).map_err(|err| SessionError::io("copy", entry.path(), err))?;
            files = files.saturating_add(1);
        }
    }
    Ok(files)
}
