//! Shared constants for tiltsave.
//!
//! Directory names mirror what Tilt Brush writes under its documents folder.

/// Directory holding the primary `.tilt` documents.
pub const SKETCHES_DIR: &str = "Sketches";

/// Directory holding preview images (`<stem>_00.png`, ...).
pub const SNAPSHOTS_DIR: &str = "Snapshots";

/// Directory holding recorded clips (`<stem>_00.mp4`, `<stem>_00.usda`, ...).
pub const VIDEOS_DIR: &str = "Videos";

/// Directory holding one export container per sketch (`Exports/<stem>/`).
pub const EXPORTS_DIR: &str = "Exports";

/// Default family prefix of unsaved sketches (`Untitled_0`, `Untitled_1`, ...).
pub const DEFAULT_SKETCH_PREFIX: &str = "Untitled";

/// Delimiter between a sketch stem and a snapshot/video index.
pub const ASSET_DELIMITER: char = '_';

pub const SESSION_ROOT_ENV: &str = "TILTSAVE_SESSION_ROOT";
pub const ARCHIVE_ROOT_ENV: &str = "TILTSAVE_ARCHIVE_ROOT";
pub const SKETCH_PREFIX_ENV: &str = "TILTSAVE_SKETCH_PREFIX";

/// Folder name of the session root under the user's documents directory.
pub const DEFAULT_SESSION_DIR_NAME: &str = "Tilt Brush";

/// Folder name of the archive root under the user's desktop directory.
pub const DEFAULT_ARCHIVE_DIR_NAME: &str = "TiltBrushWorkarea";
