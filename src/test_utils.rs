//! Test utilities and fixtures for tunelink tests.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{silent_wav, mock_tags};
//!
//! #[test]
//! fn test_something() {
//!     let dir = tempfile::tempdir().unwrap();
//!     let path = silent_wav(dir.path(), "track.wav");
//!     // ... test logic
//! }
//! ```

use std::path::{Path, PathBuf};

use crate::matching::CandidateRecord;
use crate::tags::TagSet;
use crate::vendors::Vendor;

/// Tags of a well-known single, with title and artist set.
///
/// Customize using struct update syntax:
///
/// ```ignore
/// let tags = TagSet {
///     album: Some("Shine".to_string()),
///     ..mock_tags()
/// };
/// ```
pub fn mock_tags() -> TagSet {
    TagSet {
        title: Some("Shine".to_string()),
        artist: Some("Spektrem".to_string()),
        ..Default::default()
    }
}

/// A search result with title and artist.
pub fn mock_candidate(vendor: Vendor, id: &str, title: &str, artist: &str) -> CandidateRecord {
    CandidateRecord::new(vendor, id)
        .with_title(title)
        .with_artist(artist)
}

/// Writes a tenth of a second of 16-bit stereo silence as a PCM WAV file.
///
/// Returns the path of the new file inside `dir`.
pub fn silent_wav(dir: &Path, name: &str) -> PathBuf {
    const SAMPLE_RATE: u32 = 44_100;
    const CHANNELS: u16 = 2;
    const BITS: u16 = 16;

    let block_align = CHANNELS * BITS / 8;
    let data_len = SAMPLE_RATE / 10 * u32::from(block_align);

    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&CHANNELS.to_le_bytes());
    bytes.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    bytes.extend_from_slice(&(SAMPLE_RATE * u32::from(block_align)).to_le_bytes());
    bytes.extend_from_slice(&block_align.to_le_bytes());
    bytes.extend_from_slice(&BITS.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.resize(44 + data_len as usize, 0);

    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("Failed to write test WAV");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_tags_defaults() {
        let tags = mock_tags();
        assert_eq!(tags.title.as_deref(), Some("Shine"));
        assert_eq!(tags.artist.as_deref(), Some("Spektrem"));
        assert!(tags.album.is_none());
    }

    #[test]
    fn test_silent_wav_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = silent_wav(dir.path(), "silence.wav");

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(bytes.len(), 44 + 17_640);
    }
}
