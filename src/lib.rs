//! tunelink - tags audio files from streaming and metadata catalogs.
//!
//! Searches Spotify, TIDAL, Qobuz, iTunes and Discogs for a local track,
//! picks the matching result, and merges the vendor's metadata into the
//! file's tags. Files can also be converted between codecs with ffmpeg.

pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod matching;
pub mod tags;
pub mod vendors;
#[cfg(test)]
pub mod test_utils;
