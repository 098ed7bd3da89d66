//! Rename transaction: gives a sketch and all its assets a new stem.
//!
//! The transaction is staged. [`RenamePlan::build`] computes every
//! old → new path up front and [`RenamePlan::check`] rejects any target that
//! already exists, so collisions fail before the first rename. Applying is
//! strictly ordered (sketch, snapshots, videos, exports, export container)
//! and stops at the first failure without rolling back. Renames that
//! already happened are logged so the operator can finish or revert by hand.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::discovery::find_assets;
use crate::error::{Result, SessionError};
use crate::layout::{AssetCategory, SessionLayout};
use crate::name::SessionName;
use crate::record::SessionRecord;

/// What a single planned rename applies to, with its position in the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameTarget {
    Sketch,
    Snapshot(usize),
    Video(usize),
    Export(usize),
    ExportContainer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOp {
    pub target: RenameTarget,
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Every rename needed to move one session from its current stem to a new one.
#[derive(Debug, Clone)]
pub struct RenamePlan {
    old_name: String,
    new_name: SessionName,
    ops: Vec<RenameOp>,
}

impl RenamePlan {
    /// Computes the old → new mapping for `record` without touching the disk
    /// beyond checking whether the export container exists.
    ///
    /// The old stem is the record's live `current_name`, captured before any
    /// mutation.
    pub fn build(record: &SessionRecord, new_name: &SessionName) -> Result<Self> {
        let old_name = record.current_name.clone();
        let new = new_name.as_str();
        let mut ops = Vec::with_capacity(record.asset_count().saturating_add(2));

        ops.push(RenameOp {
            target: RenameTarget::Sketch,
            from: record.current_path.clone(),
            to: sibling(&record.current_path, &with_extension_of(new, &record.current_path))?,
        });

        for (index, path) in record.snapshots.iter().enumerate() {
            ops.push(RenameOp {
                target: RenameTarget::Snapshot(index),
                from: path.clone(),
                to: sibling(path, &replace_prefix(path, &old_name, new)?)?,
            });
        }

        for (index, path) in record.videos.iter().enumerate() {
            ops.push(RenameOp {
                target: RenameTarget::Video(index),
                from: path.clone(),
                to: sibling(path, &replace_prefix(path, &old_name, new)?)?,
            });
        }

        // Exports keep only their extension, not the old suffix.
        for (index, path) in record.exports.iter().enumerate() {
            if !file_name_str(path).is_some_and(|name| name.starts_with(old_name.as_str())) {
                tracing::debug!(path = %path.display(), "export not named after sketch, left as is");
                continue;
            }
            ops.push(RenameOp {
                target: RenameTarget::Export(index),
                from: path.clone(),
                to: sibling(path, &with_extension_of(new, path))?,
            });
        }

        if container_exists(&record.export_container)? {
            ops.push(RenameOp {
                target: RenameTarget::ExportContainer,
                from: record.export_container.clone(),
                to: sibling(&record.export_container, new)?,
            });
        } else {
            tracing::debug!(
                container = %record.export_container.display(),
                "no export container, skipping"
            );
        }

        Ok(Self { old_name, new_name: new_name.clone(), ops })
    }

    #[must_use]
    pub fn ops(&self) -> &[RenameOp] {
        &self.ops
    }

    #[must_use]
    pub fn old_name(&self) -> &str {
        &self.old_name
    }

    /// Fails with `AlreadyExists` if any target exists on disk or two
    /// sources map onto the same target.
    pub fn check(&self) -> Result<()> {
        let mut targets = HashSet::with_capacity(self.ops.len());
        for op in &self.ops {
            if !targets.insert(op.to.as_path()) || fs::symlink_metadata(&op.to).is_ok() {
                return Err(SessionError::AlreadyExists(op.to.clone()));
            }
        }
        Ok(())
    }

    /// Applies the renames in order, updating `record` as each one lands.
    pub fn apply(self, record: &mut SessionRecord) -> Result<()> {
        let total = self.ops.len();
        for (done, op) in self.ops.into_iter().enumerate() {
            if let Err(err) = rename_path(&op.from, &op.to) {
                if op.target == RenameTarget::ExportContainer && matches!(err, SessionError::NotFound(_)) {
                    tracing::warn!(container = %op.from.display(), "export container vanished, skipping");
                    continue;
                }
                tracing::warn!(
                    completed = done,
                    total,
                    from = %op.from.display(),
                    "rename stopped partway, earlier renames were not reverted"
                );
                return Err(err);
            }
            tracing::info!(from = %op.from.display(), to = %op.to.display(), "renamed");
            record_rename(record, &op, self.new_name.as_str());
        }
        Ok(())
    }
}

/// Renames the session's sketch and every discovered asset to `new_name`.
///
/// Returns the updated record; on error the disk holds whatever renames
/// completed before the failure.
pub fn rename_session(mut record: SessionRecord, new_name: &SessionName) -> Result<SessionRecord> {
    let plan = RenamePlan::build(&record, new_name)?;
    plan.check()?;
    tracing::info!(
        from = plan.old_name(),
        to = %new_name,
        renames = plan.ops().len(),
        "renaming session"
    );
    plan.apply(&mut record)?;
    Ok(record)
}

/// Lists snapshots, videos, the sketch and the export container that still
/// sit under `old_name`.
///
/// Paths the record already tracks are skipped, so a new name that extends
/// the old one (`Untitled_0` -> `Untitled_0_v2`) is not reported. Empty
/// after a complete rename. Fails only when the old export container
/// cannot be inspected.
pub fn stale_assets(
    layout: &SessionLayout,
    record: &SessionRecord,
    old_name: &str,
) -> Result<Vec<PathBuf>> {
    let tracked: HashSet<&Path> =
        record.snapshots.iter().chain(&record.videos).map(PathBuf::as_path).collect();
    let mut stale: Vec<PathBuf> = find_assets(layout, old_name, AssetCategory::Snapshots)
        .into_iter()
        .chain(find_assets(layout, old_name, AssetCategory::Videos))
        .filter(|path| !tracked.contains(path.as_path()))
        .collect();
    let old_sketch = sibling(&record.current_path, &with_extension_of(old_name, &record.current_path));
    if let Ok(path) = old_sketch {
        if fs::symlink_metadata(&path).is_ok() {
            stale.push(path);
        }
    }
    let old_container = layout.export_container(old_name);
    if container_exists(&old_container)? {
        stale.push(old_container);
    }
    Ok(stale)
}

/// `Ok(false)` only when nothing is at `path`; any other stat failure is an error.
fn container_exists(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(meta) => Ok(meta.is_dir()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(SessionError::io("stat", path, err)),
    }
}

fn record_rename(record: &mut SessionRecord, op: &RenameOp, new_name: &str) {
    match op.target {
        RenameTarget::Sketch => {
            record.current_path.clone_from(&op.to);
            new_name.clone_into(&mut record.current_name);
        },
        RenameTarget::Snapshot(index) => replace_at(&mut record.snapshots, index, &op.to),
        RenameTarget::Video(index) => replace_at(&mut record.videos, index, &op.to),
        RenameTarget::Export(index) => replace_at(&mut record.exports, index, &op.to),
        RenameTarget::ExportContainer => {
            for export in &mut record.exports {
                if let Ok(rest) = export.strip_prefix(&op.from) {
                    *export = op.to.join(rest);
                }
            }
            record.export_container.clone_from(&op.to);
        },
    }
}

fn replace_at(paths: &mut [PathBuf], index: usize, to: &Path) {
    if let Some(slot) = paths.get_mut(index) {
        *slot = to.to_path_buf();
    }
}

/// Refuses to overwrite: `fs::rename` silently replaces files on Unix.
fn rename_path(from: &Path, to: &Path) -> Result<()> {
    if fs::symlink_metadata(to).is_ok() {
        return Err(SessionError::AlreadyExists(to.to_path_buf()));
    }
    fs::rename(from, to).map_err(|err| SessionError::io("rename", from, err))
}

fn file_name_str(path: &Path) -> Option<&str> {
    path.file_name()?.to_str()
}

fn sibling(path: &Path, file_name: &str) -> Result<PathBuf> {
    path.parent()
        .map(|dir| dir.join(file_name))
        .ok_or_else(|| SessionError::InvalidArgument(format!("{} has no parent", path.display())))
}

/// `<new><suffix>` where suffix is everything after `old` in the file name.
fn replace_prefix(path: &Path, old: &str, new: &str) -> Result<String> {
    file_name_str(path)
        .and_then(|name| name.strip_prefix(old))
        .map(|suffix| format!("{new}{suffix}"))
        .ok_or_else(|| {
            SessionError::InvalidArgument(format!("{} does not start with {old:?}", path.display()))
        })
}

/// `<new>.<ext>` keeping only the last extension of `path`.
fn with_extension_of(new: &str, path: &Path) -> String {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!("{new}.{ext}"),
        None => new.to_owned(),
    }
}
