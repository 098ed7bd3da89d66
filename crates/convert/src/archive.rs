//! In-place conversion between a packed `.tilt` file and its expanded directory.
//!
//! Both directions build the new form next to the input (`._part` / `.part`),
//! then swap it in through a `._prev` name. A failure before the swap removes
//! the partial output and leaves the input as it was.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::TiltError;
use crate::header::{check_header, default_header};

pub const HEADER_FILE: &str = "header.bin";
pub const METADATA_FILE: &str = "metadata.json";

/// Member order inside a packed sketch, compared case-insensitively.
const STANDARD_FILE_ORDER: [&str; 5] =
    ["header.bin", "thumbnail.png", "metadata.json", "main.json", "data.sketch"];

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn ensure_absent(path: &Path) -> Result<(), TiltError> {
    if fs::symlink_metadata(path).is_ok() {
        return Err(TiltError::TargetExists(path.to_path_buf()));
    }
    Ok(())
}

/// Expands the packed sketch at `path` into a directory of the same name.
///
/// Returns `true` if any archive member was stored compressed.
pub fn expand(path: &Path) -> Result<bool, TiltError> {
    let bytes = fs::read(path).map_err(TiltError::io("read", path))?;
    let header_len = check_header(&bytes)?;

    let part = with_suffix(path, "._part");
    ensure_absent(&part)?;
    fs::create_dir_all(&part).map_err(TiltError::io("create directory", &part))?;

    let compressed = match extract(&bytes[..header_len], &bytes[header_len..], &part) {
        Ok(compressed) => compressed,
        Err(err) => {
            let _ = fs::remove_dir_all(&part);
            return Err(err);
        },
    };

    swap_into_place(path, &part)?;
    Ok(compressed)
}

fn extract(header: &[u8], archive: &[u8], out: &Path) -> Result<bool, TiltError> {
    let mut zip = ZipArchive::new(Cursor::new(archive))?;
    let mut compressed = false;

    for index in 0..zip.len() {
        let mut member = zip.by_index(index)?;
        if member.compression() != CompressionMethod::Stored {
            compressed = true;
        }
        let relative = member
            .enclosed_name()
            .ok_or_else(|| TiltError::UnsafeMember(member.name().to_owned()))?;
        let target = out.join(relative);

        if member.is_dir() {
            fs::create_dir_all(&target).map_err(TiltError::io("create directory", &target))?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(TiltError::io("create directory", parent))?;
        }
        let mut file = File::create(&target).map_err(TiltError::io("create", &target))?;
        io::copy(&mut member, &mut file).map_err(TiltError::io("write", &target))?;
    }

    let header_path = out.join(HEADER_FILE);
    fs::write(&header_path, header).map_err(TiltError::io("write", &header_path))?;
    Ok(compressed)
}

/// Packs the expanded sketch directory at `path` into a single file of the
/// same name. Members are deflated when `compress` is set, stored otherwise.
pub fn pack(path: &Path, compress: bool) -> Result<(), TiltError> {
    // Drops any trailing separator so the `.part` sibling lands next to it.
    let path: PathBuf = path.components().collect();
    let out = with_suffix(&path, ".part");
    ensure_absent(&out)?;

    validate_metadata(&path.join(METADATA_FILE))?;
    let members = ordered_members(&path)?;

    let header = match members.iter().find(|(name, _)| name.eq_ignore_ascii_case(HEADER_FILE)) {
        Some((_, member_path)) => fs::read(member_path).map_err(TiltError::io("read", member_path))?,
        None => {
            tracing::warn!(sketch = %path.display(), "missing header, using default");
            default_header()
        },
    };
    if check_header(&header)? != header.len() {
        return Err(TiltError::Header(format!("{HEADER_FILE} has trailing bytes")));
    }

    let method = if compress { CompressionMethod::Deflated } else { CompressionMethod::Stored };
    let archive = write_archive(&members, method)?;

    let written = File::create(&out)
        .and_then(|mut file| {
            file.write_all(&header)?;
            file.write_all(&archive)?;
            file.sync_all()
        })
        .map_err(TiltError::io("write", &out));
    if let Err(err) = written {
        let _ = fs::remove_file(&out);
        return Err(err);
    }

    swap_into_place(&path, &out)?;
    Ok(())
}

/// Replaces `path` with `new` through the `._prev` name.
///
/// If `new` cannot be moved in, the input is renamed back to `path` and the
/// partial output removed.
fn swap_into_place(path: &Path, new: &Path) -> Result<(), TiltError> {
    let prev = with_suffix(path, "._prev");
    if let Err(err) = ensure_absent(&prev) {
        let _ = remove_any(new);
        return Err(err);
    }
    fs::rename(path, &prev).map_err(TiltError::io("rename", path))?;

    if let Err(err) = fs::rename(new, path) {
        match fs::rename(&prev, path) {
            Ok(()) => {
                let _ = remove_any(new);
            },
            Err(restore) => tracing::error!(
                input = %prev.display(),
                sketch = %path.display(),
                "unable to restore the input, rename it back manually: {restore}"
            ),
        }
        return Err(TiltError::io("rename", new)(err));
    }

    remove_any(&prev).map_err(TiltError::io("remove", &prev))
}

fn remove_any(path: &Path) -> io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// `metadata.json` must be readable UTF-8 JSON.
fn validate_metadata(path: &Path) -> Result<(), TiltError> {
    let text = fs::read_to_string(path)
        .map_err(|err| TiltError::Metadata(format!("{}: {err}", path.display())))?;
    serde_json::from_str::<serde_json::Value>(&text)
        .map_err(|err| TiltError::Metadata(format!("not valid json: {err}")))?;
    Ok(())
}

/// Top-level files of an expanded sketch in standard order.
fn ordered_members(dir: &Path) -> Result<Vec<(String, PathBuf)>, TiltError> {
    let mut members = Vec::new();
    for entry in fs::read_dir(dir).map_err(TiltError::io("read directory", dir))? {
        let entry = entry.map_err(TiltError::io("read directory", dir))?;
        let entry_path = entry.path();
        if entry_path.is_dir() {
            return Err(TiltError::UnexpectedDirectory(entry_path));
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let lower = name.to_ascii_lowercase();
        let Some(rank) = STANDARD_FILE_ORDER.iter().position(|known| *known == lower) else {
            return Err(TiltError::UnknownMember(name));
        };
        members.push((rank, lower, name, entry_path));
    }
    members.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
    Ok(members.into_iter().map(|(_, _, name, path)| (name, path)).collect())
}

fn write_archive(members: &[(String, PathBuf)], method: CompressionMethod) -> Result<Vec<u8>, TiltError> {
    let options = SimpleFileOptions::default().compression_method(method);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, member_path) in members {
        if name.eq_ignore_ascii_case(HEADER_FILE) {
            continue;
        }
        let data = fs::read(member_path).map_err(TiltError::io("read", member_path))?;
        zip.start_file(name.as_str(), options)?;
        zip.write_all(&data).map_err(TiltError::io("write", member_path))?;
    }
    Ok(zip.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::ZIP_SENTINEL;
    use tempfile::TempDir;

    fn expanded_sketch(dir: &Path, with_header: bool) -> PathBuf {
        let sketch = dir.join("MyArt.tilt");
        fs::create_dir_all(&sketch).unwrap();
        fs::write(sketch.join("metadata.json"), r#"{"EnvironmentPreset":"space"}"#).unwrap();
        fs::write(sketch.join("data.sketch"), vec![7u8; 4096]).unwrap();
        fs::write(sketch.join("thumbnail.png"), b"\x89PNG fake").unwrap();
        if with_header {
            fs::write(sketch.join(HEADER_FILE), default_header()).unwrap();
        }
        sketch
    }

    fn read_member(dir: &Path, name: &str) -> Vec<u8> {
        fs::read(dir.join(name)).unwrap()
    }

    #[test]
    fn pack_writes_header_then_zip_in_standard_order() {
        let tmp = TempDir::new().unwrap();
        let sketch = expanded_sketch(tmp.path(), true);

        pack(&sketch, false).unwrap();

        assert!(sketch.is_file());
        let bytes = fs::read(&sketch).unwrap();
        assert_eq!(&bytes[..16], default_header().as_slice());
        assert_eq!(&bytes[16..20], ZIP_SENTINEL);

        let mut zip = ZipArchive::new(Cursor::new(&bytes[16..])).unwrap();
        let names: Vec<String> = (0..zip.len()).map(|i| zip.by_index(i).unwrap().name().to_owned()).collect();
        assert_eq!(names, ["thumbnail.png", "metadata.json", "data.sketch"]);
        assert!(!with_suffix(&sketch, "._prev").exists());
    }

    #[test]
    fn round_trip_preserves_header_and_members() {
        let tmp = TempDir::new().unwrap();
        let sketch = expanded_sketch(tmp.path(), true);
        let original_data = read_member(&sketch, "data.sketch");
        let original_meta = read_member(&sketch, "metadata.json");

        pack(&sketch, true).unwrap();
        let compressed = expand(&sketch).unwrap();

        assert!(compressed);
        assert!(sketch.is_dir());
        assert_eq!(read_member(&sketch, "data.sketch"), original_data);
        assert_eq!(read_member(&sketch, "metadata.json"), original_meta);
        assert_eq!(read_member(&sketch, HEADER_FILE), default_header());

        pack(&sketch, false).unwrap();
        assert!(!expand(&sketch).unwrap());
        assert_eq!(read_member(&sketch, "data.sketch"), original_data);
    }

    #[test]
    fn missing_header_gets_default() {
        let tmp = TempDir::new().unwrap();
        let sketch = expanded_sketch(tmp.path(), false);

        pack(&sketch, false).unwrap();

        assert_eq!(&fs::read(&sketch).unwrap()[..16], default_header().as_slice());
    }

    #[test]
    fn unknown_member_is_rejected_and_directory_kept() {
        let tmp = TempDir::new().unwrap();
        let sketch = expanded_sketch(tmp.path(), true);
        fs::write(sketch.join("notes.txt"), "hi").unwrap();

        let err = pack(&sketch, false).unwrap_err();

        assert!(matches!(err, TiltError::UnknownMember(ref name) if name == "notes.txt"));
        assert!(sketch.join("notes.txt").exists());
        assert!(!with_suffix(&sketch, ".part").exists());
    }

    #[test]
    fn nested_directory_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let sketch = expanded_sketch(tmp.path(), true);
        fs::create_dir(sketch.join("extra")).unwrap();

        assert!(matches!(pack(&sketch, false), Err(TiltError::UnexpectedDirectory(_))));
    }

    #[test]
    fn invalid_metadata_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let sketch = expanded_sketch(tmp.path(), true);
        fs::write(sketch.join("metadata.json"), "{not json").unwrap();

        assert!(matches!(pack(&sketch, false), Err(TiltError::Metadata(_))));
        assert!(sketch.is_dir());
    }

    #[test]
    fn existing_part_directory_blocks_expand() {
        let tmp = TempDir::new().unwrap();
        let sketch = expanded_sketch(tmp.path(), true);
        pack(&sketch, false).unwrap();
        fs::create_dir(with_suffix(&sketch, "._part")).unwrap();

        assert!(matches!(expand(&sketch), Err(TiltError::TargetExists(_))));
        assert!(sketch.is_file());
    }

    #[test]
    fn failed_swap_restores_the_input() {
        let tmp = TempDir::new().unwrap();
        let sketch = expanded_sketch(tmp.path(), true);
        let missing = with_suffix(&sketch, ".part");

        let err = swap_into_place(&sketch, &missing).unwrap_err();

        assert!(matches!(err, TiltError::Io { op: "rename", .. }));
        assert!(sketch.is_dir());
        assert_eq!(read_member(&sketch, HEADER_FILE), default_header());
        assert!(!with_suffix(&sketch, "._prev").exists());
    }

    #[test]
    fn leftover_prev_blocks_the_swap() {
        let tmp = TempDir::new().unwrap();
        let sketch = expanded_sketch(tmp.path(), true);
        fs::write(with_suffix(&sketch, "._prev"), b"stale").unwrap();

        assert!(matches!(pack(&sketch, false), Err(TiltError::TargetExists(_))));
        assert!(sketch.is_dir());
        assert!(!with_suffix(&sketch, ".part").exists());
    }

    #[test]
    fn compression_flag_follows_member_method() {
        let tmp = TempDir::new().unwrap();
        let sketch = tmp.path().join("Empty.tilt");
        fs::create_dir(&sketch).unwrap();
        fs::write(sketch.join("metadata.json"), "{}").unwrap();
        fs::write(sketch.join("data.sketch"), b"x").unwrap();

        pack(&sketch, false).unwrap();
        assert!(!expand(&sketch).unwrap());

        pack(&sketch, true).unwrap();
        assert!(expand(&sketch).unwrap());
    }

    #[test]
    fn malformed_packed_file_is_untouched() {
        let tmp = TempDir::new().unwrap();
        let sketch = tmp.path().join("Untitled_0.tilt");
        fs::write(&sketch, b"not a sketch at all").unwrap();

        assert!(matches!(expand(&sketch), Err(TiltError::Header(_))));
        assert_eq!(fs::read(&sketch).unwrap(), b"not a sketch at all");
        assert!(!with_suffix(&sketch, "._part").exists());
    }

    #[test]
    fn corrupt_archive_cleans_up_partial_output() {
        let tmp = TempDir::new().unwrap();
        let sketch = tmp.path().join("Untitled_0.tilt");
        let mut bytes = default_header();
        bytes.extend_from_slice(b"PK\x03\x04 truncated");
        fs::write(&sketch, &bytes).unwrap();

        assert!(matches!(expand(&sketch), Err(TiltError::Zip(_))));
        assert!(sketch.is_file());
        assert!(!with_suffix(&sketch, "._part").exists());
    }
}
