//! Audio files: tag reading and writing, filename parsing and conversion.
//!
//! An [`AudioFile`] owns the [`TagSet`] read from disk. Merges and filename
//! parsing only change that in-memory copy; nothing reaches the file until
//! [`AudioFile::flush`].
//!
//! # Usage
//!
//! ```ignore
//! use tunelink::audio::{AudioFile, Codec, ConvertOptions, Ffmpeg};
//!
//! let mut file = AudioFile::open("01 - Spektrem - Shine.flac")?;
//! file.fill_from_filename(&FilenamePattern::track_artist_title()?);
//! file.flush()?;
//!
//! let ffmpeg = Ffmpeg::locate(None)?;
//! file.convert(&ffmpeg, Codec::Alac, &ConvertOptions::new())?;
//! ```

mod convert;
mod format;
mod io;
mod pattern;

use std::path::{Path, PathBuf};
use std::time::Duration;

pub use convert::{Codec, ConversionPlan, ConvertOptions, Ffmpeg, parse_container, plan_conversion};
pub use format::{AudioFormat, FormatHandler, handler_for};
pub use pattern::{FilenamePattern, PatternError};

use crate::error::{Error, Result, ResultExt};
use crate::tags::{FieldMap, MergeReport, TagField, TagSet};

/// Technical properties of the audio stream. Read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioProperties {
    pub duration: Duration,
    /// Audio bitrate in kbps
    pub bitrate_kbps: Option<u32>,
    /// Sample rate in Hz
    pub sample_rate: Option<u32>,
    pub channels: Option<u8>,
    pub bit_depth: Option<u8>,
    pub codec: Option<Codec>,
}

/// An audio file on disk and its in-memory tags.
#[derive(Debug, Clone)]
pub struct AudioFile {
    path: PathBuf,
    format: AudioFormat,
    tags: TagSet,
    properties: AudioProperties,
}

impl AudioFile {
    /// Open a file, detecting its format and reading its tags.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::not_found(path));
        }

        let format = AudioFormat::detect(path)?;
        let (tags, properties) = handler_for(format).read(path)?;
        tracing::debug!("Opened {} as {}", path.display(), format);

        Ok(Self {
            path: path.to_path_buf(),
            format,
            tags,
            properties,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn handler(&self) -> &'static dyn FormatHandler {
        handler_for(self.format)
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn tags_mut(&mut self) -> &mut TagSet {
        &mut self.tags
    }

    pub fn properties(&self) -> &AudioProperties {
        &self.properties
    }

    /// Merge vendor fields into the in-memory tags.
    pub fn merge(&mut self, source: &FieldMap, overwrite: bool) -> Result<MergeReport> {
        Ok(self.tags.merge(source, overwrite)?)
    }

    /// Fill absent artist, title and track number from the file name.
    pub fn fill_from_filename(&mut self, pattern: &FilenamePattern) -> Vec<TagField> {
        pattern.apply(&self.path, &mut self.tags)
    }

    /// Write the in-memory tags to disk.
    pub fn flush(&self) -> Result<()> {
        self.handler()
            .write(&self.path, &self.tags)
            .with_context(format!("saving tags to {}", self.path.display()))
    }

    /// Convert to another codec with ffmpeg.
    ///
    /// Afterwards this handle points at the new file. Its tags are the
    /// in-memory tags from before the conversion and still need a
    /// [`flush`](Self::flush) to be written.
    pub fn convert(&mut self, ffmpeg: &Ffmpeg, codec: Codec, opts: &ConvertOptions) -> Result<()> {
        let plan = plan_conversion(
            &self.path,
            self.format,
            self.properties.codec,
            self.properties.bit_depth,
            codec,
            opts,
        )?;

        if plan.reencode {
            tracing::warn!(
                "'{}' already has {} audio in a {} container. Re-encoding may lead to quality degradation from generation loss.",
                self.path.display(),
                codec,
                plan.format
            );
        } else if codec.is_lossless() && self.properties.codec.is_some_and(|c| !c.is_lossless()) {
            tracing::warn!("Converting lossy {} audio to lossless {} won't restore quality", self.format, codec);
        }

        ffmpeg.run(&plan)?;

        let (_, properties) = handler_for(plan.format).read(&plan.output)?;
        if !opts.preserve {
            std::fs::remove_file(&self.path)
                .with_context(format!("removing {}", self.path.display()))?;
        }

        self.path = plan.output;
        self.format = plan.format;
        self.properties = properties;
        Ok(())
    }
}
