//! The fixed header in front of the zip archive of a packed sketch.
//!
//! Layout (little endian): `"tilT"`, u16 header size, u16 version, then
//! version-specific fields up to the declared size. Version 1 carries two
//! reserved u32s, 16 bytes in total.

use crate::error::TiltError;

pub const MAGIC: &[u8; 4] = b"tilT";
pub const VERSION: u16 = 1;
pub const ZIP_SENTINEL: &[u8; 4] = b"PK\x03\x04";

/// magic + size + version
const BASE_LEN: usize = 8;
const V1_LEN: u16 = 16;

/// Header written when an expanded sketch has no `header.bin`.
#[must_use]
pub fn default_header() -> Vec<u8> {
    let mut header = Vec::with_capacity(usize::from(V1_LEN));
    header.extend_from_slice(MAGIC);
    header.extend_from_slice(&V1_LEN.to_le_bytes());
    header.extend_from_slice(&VERSION.to_le_bytes());
    header.extend_from_slice(&0u32.to_le_bytes());
    header.extend_from_slice(&0u32.to_le_bytes());
    header
}

/// Validates the header at the start of `bytes` and returns its length.
///
/// Whatever follows the header must be a zip local file header or nothing.
pub fn check_header(bytes: &[u8]) -> Result<usize, TiltError> {
    let Some(base) = bytes.get(..BASE_LEN) else {
        return Err(TiltError::Header(format!("only {} bytes", bytes.len())));
    };
    if &base[..4] != MAGIC {
        return Err(TiltError::Header(format!("sentinel looks weird: {:?}", &base[..4])));
    }
    let size = usize::from(u16::from_le_bytes([base[4], base[5]]));
    let version = u16::from_le_bytes([base[6], base[7]]);

    if size < BASE_LEN {
        return Err(TiltError::Header(format!("strange header size {size}")));
    }
    if bytes.len() < size {
        return Err(TiltError::Header(format!(
            "bad header size (claim {size}, actual {})",
            bytes.len()
        )));
    }
    let rest = &bytes[size..];
    let sentinel = &rest[..rest.len().min(ZIP_SENTINEL.len())];
    if !sentinel.is_empty() && sentinel != ZIP_SENTINEL {
        return Err(TiltError::Header(format!("no zip sentinel after header: {sentinel:?}")));
    }
    if version != VERSION {
        return Err(TiltError::Header(format!("bogus version {version}")));
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_header_is_valid_v1() {
        let header = default_header();
        assert_eq!(header.len(), 16);
        assert_eq!(check_header(&header).unwrap(), 16);
    }

    #[test]
    fn header_followed_by_zip_is_valid() {
        let mut bytes = default_header();
        bytes.extend_from_slice(b"PK\x03\x04rest-of-archive");
        assert_eq!(check_header(&bytes).unwrap(), 16);
    }

    #[test]
    fn rejects_wrong_magic() {
        let mut bytes = default_header();
        bytes[0] = b'X';
        assert!(matches!(check_header(&bytes), Err(TiltError::Header(_))));
    }

    #[test]
    fn rejects_truncated_and_undersized_headers() {
        assert!(check_header(b"tilT").is_err());

        let mut claims_more = default_header();
        claims_more[4..6].copy_from_slice(&64u16.to_le_bytes());
        assert!(check_header(&claims_more).is_err());

        let mut too_small = default_header();
        too_small[4..6].copy_from_slice(&4u16.to_le_bytes());
        assert!(check_header(&too_small).is_err());
    }

    #[test]
    fn rejects_garbage_after_header_and_bad_version() {
        let mut garbage = default_header();
        garbage.extend_from_slice(b"nope");
        assert!(check_header(&garbage).is_err());

        let mut version = default_header();
        version[6..8].copy_from_slice(&2u16.to_le_bytes());
        assert!(check_header(&version).is_err());
    }
}
