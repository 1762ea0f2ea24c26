//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`, while the CLI
//! uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level error enum
//! - Module-specific errors ([`VendorError`], [`MergeError`], [`MatchError`])
//!   convert into it with `?`
//!
//! # Example
//!
//! ```ignore
//! use tunelink::error::{Result, ResultExt};
//!
//! fn retag(path: &Path, fields: &FieldMap) -> Result<()> {
//!     let mut file = AudioFile::open(path).with_context("opening input")?;
//!     file.merge(fields, false)?; // MergeError auto-converts
//!     file.flush()
//! }
//! ```

use std::path::PathBuf;

use crate::matching::MatchError;
use crate::tags::MergeError;
use crate::vendors::VendorError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Tag reading/writing error
    #[error("Metadata error for {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    /// Vendor API error
    #[error("Vendor error: {0}")]
    Vendor(#[from] VendorError),

    /// Incompatible field shape while merging
    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    /// Invalid match query
    #[error("Match error: {0}")]
    Match(#[from] MatchError),

    /// File not found
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Unsupported or unrecognized audio format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Transcoding error
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a metadata error.
    pub fn metadata(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Metadata {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a not found error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound(path.into())
    }

    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat(message.into())
    }

    pub fn conversion(message: impl Into<String>) -> Self {
        Self::Conversion(message.into())
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, VendorError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Vendor(e).context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::{FieldKind, TagField};

    #[test]
    fn test_error_display() {
        let err = Error::not_found("/path/to/file.mp3");
        assert!(err.to_string().contains("/path/to/file.mp3"));
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::conversion("ffmpeg exited with status 1").context("while converting track");
        let msg = err.to_string();
        assert!(msg.contains("while converting track"));
        assert!(msg.contains("ffmpeg exited"));
    }

    #[test]
    fn test_metadata_error() {
        let err = Error::metadata("/music/song.mp3", "unsupported format");
        let msg = err.to_string();
        assert!(msg.contains("song.mp3"));
        assert!(msg.contains("unsupported format"));
    }

    #[test]
    fn test_merge_error_converts() {
        let merge = MergeError::TypeMismatch {
            field: TagField::Tempo,
            expected: FieldKind::Integer,
            found: FieldKind::Text,
        };
        let err: Error = merge.into();
        assert!(matches!(err, Error::Merge(_)));
        assert!(err.to_string().contains("tempo"));
    }

    #[test]
    fn test_result_ext() {
        let result: std::result::Result<(), VendorError> = Err(VendorError::RateLimited);
        let with_ctx = result.with_context("searching spotify");
        let msg = with_ctx.unwrap_err().to_string();
        assert!(msg.contains("searching spotify"));
        assert!(msg.contains("Rate limited"));
    }
}
