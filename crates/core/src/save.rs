//! The end-to-end save flow: aggregate, rename, convert, migrate.
//!
//! One [`SessionRecord`] is threaded through every stage; each stage reads
//! the paths the previous one wrote.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;

use serde::Serialize;

use crate::aggregate::list_sessions;
use crate::config::Settings;
use crate::convert::{Representation, SketchConverter};
use crate::error::{Result, SessionError};
use crate::migrate::{ensure_archive_free, migrate, Cleanup};
use crate::name::SessionName;
use crate::record::SessionRecord;
use crate::rename::{rename_session, stale_assets};

/// Pipeline stage, reported alongside a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStep {
    Discover,
    Preflight,
    Rename,
    Verify,
    Convert,
    Migrate,
}

impl Display for SaveStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match *self {
            Self::Discover => write!(f, "discovering sessions"),
            Self::Preflight => write!(f, "checking the archive target"),
            Self::Rename => write!(f, "renaming session files"),
            Self::Verify => write!(f, "verifying the rename"),
            Self::Convert => write!(f, "converting the sketch"),
            Self::Migrate => write!(f, "archiving the session"),
        }
    }
}

/// A failed save: the stage that failed and why.
#[derive(Debug)]
pub struct SaveError {
    pub step: SaveStep,
    pub source: SessionError,
}

impl Display for SaveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "failed while {}", self.step)
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

trait AtStep<T> {
    fn at(self, step: SaveStep) -> std::result::Result<T, SaveError>;
}

impl<T> AtStep<T> for Result<T> {
    fn at(self, step: SaveStep) -> std::result::Result<T, SaveError> {
        self.map_err(|source| SaveError { step, source })
    }
}

/// Which candidate sketch to save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    /// The first candidate in lexical order.
    #[default]
    First,
    /// The candidate whose stem is exactly this.
    Stem(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    pub record: SessionRecord,
    pub archive_path: PathBuf,
    pub files_copied: usize,
    pub cleanup: Cleanup,
}

/// Picks the session to save out of `sessions`.
pub fn select_session(sessions: Vec<SessionRecord>, selection: &Selection) -> Result<SessionRecord> {
    let total = sessions.len();
    let mut chosen = None;
    let mut others = Vec::new();
    for record in sessions {
        let wanted = match selection {
            Selection::First => chosen.is_none(),
            Selection::Stem(stem) => record.base_identifier == *stem,
        };
        if wanted && chosen.is_none() {
            chosen = Some(record);
        } else {
            others.push(record.base_identifier);
        }
    }

    let Some(record) = chosen else {
        return Err(match selection {
            Selection::First => SessionError::NotFound(PathBuf::from("unsaved sketch")),
            Selection::Stem(stem) => SessionError::NotFound(PathBuf::from(stem)),
        });
    };
    if !others.is_empty() {
        tracing::warn!(
            chosen = %record.base_identifier,
            others = ?others,
            total,
            "several unsaved sketches; the others are archived along with this session"
        );
    }
    Ok(record)
}

/// Saves one session under `new_name` and archives the working root.
///
/// Stops at the first fatal failure, leaving the disk as that stage left it.
pub fn save_session(
    settings: &Settings,
    new_name: &SessionName,
    converter: &dyn SketchConverter,
    selection: &Selection,
) -> std::result::Result<SaveReport, SaveError> {
    let layout = settings.layout();

    let sessions = list_sessions(&layout, &settings.sketch_prefix).at(SaveStep::Discover)?;
    let record = select_session(sessions, selection).at(SaveStep::Discover)?;
    let old_name = record.current_name.clone();
    tracing::info!(
        sketch = %record.current_path.display(),
        assets = record.asset_count(),
        "selected session"
    );

    ensure_archive_free(&settings.archive_root, new_name).at(SaveStep::Preflight)?;

    let record = rename_session(record, new_name).at(SaveStep::Rename)?;

    let remaining = stale_assets(&layout, &record, &old_name).at(SaveStep::Verify)?;
    if !remaining.is_empty() {
        return Err::<SaveReport, _>(SessionError::PartialRename { remaining }).at(SaveStep::Verify);
    }

    let form = converter.convert(&record.current_path, false).at(SaveStep::Convert)?;
    if form != Representation::Expanded {
        return Err::<SaveReport, _>(SessionError::Conversion(format!(
            "{} ended up {form}, expected expanded",
            record.current_path.display()
        )))
        .at(SaveStep::Convert);
    }
    tracing::info!(sketch = %record.current_path.display(), "converted sketch to directory form");

    let report = migrate(layout.root(), &settings.archive_root, new_name).at(SaveStep::Migrate)?;

    Ok(SaveReport {
        record,
        archive_path: report.archive_path,
        files_copied: report.files_copied,
        cleanup: report.cleanup,
    })
}
