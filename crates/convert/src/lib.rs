//! Converter for Tilt Brush `.tilt` sketches.
//!
//! A packed sketch is a small header followed by a zip archive. The expanded
//! form is a directory of the same name holding the archive members plus the
//! header as `header.bin`. Tilt Brush loads either form.

mod archive;
mod error;
mod header;

use std::path::Path;

use tiltsave_core::{Representation, SketchConverter};

pub use archive::{expand, pack, HEADER_FILE, METADATA_FILE};
pub use error::TiltError;
pub use header::{check_header, default_header};

/// [`SketchConverter`] for `.tilt` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct TiltConverter;

impl TiltConverter {
    /// Converts `path` to the form it is not currently in.
    pub fn convert_path(path: &Path, compress: bool) -> Result<Representation, TiltError> {
        if path.is_dir() {
            pack(path, compress)?;
            tracing::info!(sketch = %path.display(), compress, "converted to packed format");
            Ok(Representation::Packed)
        } else if path.is_file() {
            let compressed = expand(path)?;
            tracing::info!(sketch = %path.display(), compressed, "converted to directory format");
            Ok(Representation::Expanded)
        } else {
            Err(TiltError::Missing(path.to_path_buf()))
        }
    }
}

impl SketchConverter for TiltConverter {
    fn convert(&self, path: &Path, compress: bool) -> tiltsave_core::Result<Representation> {
        Ok(Self::convert_path(path, compress)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tiltsave_core::ErrorKind;

    #[test]
    fn converts_in_whichever_direction_applies() {
        let tmp = TempDir::new().unwrap();
        let sketch = tmp.path().join("MyArt.tilt");
        fs::create_dir(&sketch).unwrap();
        fs::write(sketch.join(METADATA_FILE), "{}").unwrap();
        fs::write(sketch.join("data.sketch"), b"strokes").unwrap();

        let converter = TiltConverter;
        assert_eq!(converter.convert(&sketch, false).unwrap(), Representation::Packed);
        assert!(sketch.is_file());
        assert_eq!(converter.convert(&sketch, false).unwrap(), Representation::Expanded);
        assert_eq!(fs::read(sketch.join("data.sketch")).unwrap(), b"strokes");
    }

    #[test]
    fn missing_path_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = TiltConverter.convert(&tmp.path().join("gone.tilt"), false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn malformed_sketch_is_a_conversion_error() {
        let tmp = TempDir::new().unwrap();
        let sketch = tmp.path().join("Untitled_0.tilt");
        fs::write(&sketch, b"garbage").unwrap();

        let err = TiltConverter.convert(&sketch, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conversion);
    }
}
