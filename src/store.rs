//! Shared binary framing for model files.
//!
//! Every persisted table uses the same layout: a 4-byte magic, a 1-byte
//! version, then a bincode body. Saves go through a temp file and rename
//! so a crash never leaves a truncated table behind.

use std::fs;
use std::io;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub(crate) const HEADER_SIZE: usize = 5;

/// Unified error type for model-file I/O.
///
/// Covers loading/saving both the n-gram model (LNNG) and the similarity
/// lookup (LNLK) files.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid header (too short)")]
    InvalidHeader,

    #[error("invalid magic bytes (expected LNNG or LNLK)")]
    InvalidMagic,

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    #[error("serialization error: {0}")]
    Serialize(bincode::Error),

    #[error("deserialization error: {0}")]
    Deserialize(bincode::Error),
}

pub(crate) fn encode<T: Serialize>(
    magic: &[u8; 4],
    version: u8,
    data: &T,
) -> Result<Vec<u8>, StoreError> {
    let body = bincode::serialize(data).map_err(StoreError::Serialize)?;
    let mut buf = Vec::with_capacity(HEADER_SIZE + body.len());
    buf.extend_from_slice(magic);
    buf.push(version);
    buf.extend_from_slice(&body);
    Ok(buf)
}

pub(crate) fn decode<T: DeserializeOwned>(
    magic: &[u8; 4],
    version: u8,
    bytes: &[u8],
) -> Result<T, StoreError> {
    if bytes.len() < HEADER_SIZE {
        return Err(StoreError::InvalidHeader);
    }
    if &bytes[0..4] != magic {
        return Err(StoreError::InvalidMagic);
    }
    if bytes[4] != version {
        return Err(StoreError::UnsupportedVersion(bytes[4]));
    }
    bincode::deserialize(&bytes[HEADER_SIZE..]).map_err(StoreError::Deserialize)
}

pub(crate) fn save_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let tmp = path.with_extension("tmp");
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAGIC: &[u8; 4] = b"TEST";

    #[test]
    fn test_round_trip() {
        let buf = encode(MAGIC, 1, &vec![1u32, 2, 3]).unwrap();
        let back: Vec<u32> = decode(MAGIC, 1, &buf).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
    }

    #[test]
    fn test_rejects_wrong_magic() {
        let buf = encode(b"XXXX", 1, &0u8).unwrap();
        let result: Result<u8, _> = decode(MAGIC, 1, &buf);
        assert!(matches!(result, Err(StoreError::InvalidMagic)));
    }

    #[test]
    fn test_rejects_wrong_version() {
        let buf = encode(MAGIC, 2, &0u8).unwrap();
        let result: Result<u8, _> = decode(MAGIC, 1, &buf);
        assert!(matches!(result, Err(StoreError::UnsupportedVersion(2))));
    }

    #[test]
    fn test_rejects_truncated() {
        let result: Result<u8, _> = decode(MAGIC, 1, b"TE");
        assert!(matches!(result, Err(StoreError::InvalidHeader)));
    }
}
