//! Settings resolution: defaults from the user's folders, overridable by env vars.

use std::path::{Path, PathBuf};

use crate::constants::{
    ARCHIVE_ROOT_ENV, DEFAULT_ARCHIVE_DIR_NAME, DEFAULT_SESSION_DIR_NAME, DEFAULT_SKETCH_PREFIX,
    SESSION_ROOT_ENV, SKETCH_PREFIX_ENV,
};
use crate::layout::SessionLayout;

/// Where sessions are read from and archived to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Tilt Brush documents folder (the working root).
    pub session_root: PathBuf,
    /// Base folder receiving one directory per archived session.
    pub archive_root: PathBuf,
    /// Family prefix of unsaved sketches.
    pub sketch_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            session_root: default_session_root(),
            archive_root: default_archive_root(),
            sketch_prefix: DEFAULT_SKETCH_PREFIX.to_owned(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_env_values(
            std::env::var(SESSION_ROOT_ENV).ok().as_deref(),
            std::env::var(ARCHIVE_ROOT_ENV).ok().as_deref(),
            std::env::var(SKETCH_PREFIX_ENV).ok().as_deref(),
        )
    }

    fn from_env_values(
        session_root: Option<&str>,
        archive_root: Option<&str>,
        sketch_prefix: Option<&str>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            session_root: env_value_or(SESSION_ROOT_ENV, session_root)
                .map_or(defaults.session_root, PathBuf::from),
            archive_root: env_value_or(ARCHIVE_ROOT_ENV, archive_root)
                .map_or(defaults.archive_root, PathBuf::from),
            sketch_prefix: env_value_or(SKETCH_PREFIX_ENV, sketch_prefix)
                .map_or(defaults.sketch_prefix, str::to_owned),
        }
    }

    #[must_use]
    pub fn with_session_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.session_root = root.into();
        self
    }

    #[must_use]
    pub fn with_archive_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.archive_root = root.into();
        self
    }

    #[must_use]
    pub fn layout(&self) -> SessionLayout {
        SessionLayout::new(&self.session_root)
    }
}

/// Returns the trimmed env value, or `None` when unset.
///
/// A variable that is set but blank logs a warning and falls back to the
/// default rather than pointing the tool at an empty path.
fn env_value_or<'a>(var: &str, raw: Option<&'a str>) -> Option<&'a str> {
    let value = raw?.trim();
    if value.is_empty() {
        tracing::warn!(var, "blank env var value, using default");
        return None;
    }
    Some(value)
}

fn user_dir_or_home(dir: Option<PathBuf>) -> PathBuf {
    dir.or_else(dirs::home_dir).unwrap_or_else(|| Path::new(".").to_path_buf())
}

fn default_session_root() -> PathBuf {
    user_dir_or_home(dirs::document_dir()).join(DEFAULT_SESSION_DIR_NAME)
}

fn default_archive_root() -> PathBuf {
    user_dir_or_home(dirs::desktop_dir()).join(DEFAULT_ARCHIVE_DIR_NAME)
}
