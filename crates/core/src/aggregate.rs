//! Session aggregation: one [`SessionRecord`] per unsaved sketch file.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::discovery::discover_assets;
use crate::error::{Result, SessionError};
use crate::layout::SessionLayout;
use crate::record::SessionRecord;

/// Builds a record for every sketch in `Sketches/` whose stem follows the
/// default `<prefix>_<ordinal>` naming.
///
/// Only regular files are candidates; sketches already expanded into
/// directories are skipped. Fails with `NotFound` when the working root
/// itself is missing. A missing `Sketches/` directory yields no sessions.
pub fn list_sessions(layout: &SessionLayout, sketch_prefix: &str) -> Result<Vec<SessionRecord>> {
    if !layout.root().is_dir() {
        return Err(SessionError::NotFound(layout.root().to_path_buf()));
    }

    let records: Vec<SessionRecord> = sketch_files(&layout.sketches_dir(), sketch_prefix)?
        .into_iter()
        .filter_map(|path| {
            let stem = path.file_stem()?.to_str()?.to_owned();
            let assets = discover_assets(layout, &stem);
            SessionRecord::new(&path, assets, layout.export_container(&stem))
        })
        .collect();

    tracing::debug!(root = %layout.root().display(), count = records.len(), "listed sessions");
    Ok(records)
}

fn default_name_pattern(sketch_prefix: &str) -> Result<Regex> {
    Regex::new(&format!(r"^{}_\d+$", regex::escape(sketch_prefix)))
        .map_err(|err| SessionError::InvalidArgument(format!("sketch prefix {sketch_prefix:?}: {err}")))
}

fn sketch_files(dir: &Path, sketch_prefix: &str) -> Result<Vec<PathBuf>> {
    let pattern = default_name_pattern(sketch_prefix)?;
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(dir = %dir.display(), "no sketches directory");
            return Ok(Vec::new());
        },
        Err(err) => return Err(SessionError::io("read directory", dir, err)),
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|ft| ft.is_file()))
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .is_some_and(|stem| pattern.is_match(stem))
        })
        .collect();
    files.sort();
    Ok(files)
}
