//! Container formats and their handlers.
//!
//! The format of a file is decided by its leading bytes when they are
//! recognizable, and by its extension otherwise.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use lofty::tag::TagType;

use super::convert::Codec;
use super::io;
use super::AudioProperties;
use crate::error::{Error, Result};
use crate::tags::TagSet;

/// Supported audio containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    Flac,
    Mp3,
    Mp4,
    Ogg,
    Wave,
}

impl AudioFormat {
    /// Preference order when a codec fits more than one container.
    pub const ALL: [AudioFormat; 5] = [
        AudioFormat::Flac,
        AudioFormat::Mp3,
        AudioFormat::Mp4,
        AudioFormat::Ogg,
        AudioFormat::Wave,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AudioFormat::Flac => "FLAC",
            AudioFormat::Mp3 => "MP3",
            AudioFormat::Mp4 => "MP4",
            AudioFormat::Ogg => "Ogg",
            AudioFormat::Wave => "WAVE",
        }
    }

    /// File extensions, preferred one first.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            AudioFormat::Flac => &["flac"],
            AudioFormat::Mp3 => &["mp3"],
            AudioFormat::Mp4 => &["m4a", "aac", "mp4"],
            AudioFormat::Ogg => &["ogg", "oga", "opus"],
            AudioFormat::Wave => &["wav"],
        }
    }

    pub fn preferred_extension(self) -> &'static str {
        self.extensions()[0]
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.extensions().contains(&ext.as_str()))
    }

    /// Recognize a container from the first bytes of a file.
    pub fn from_signature(header: &[u8]) -> Option<Self> {
        match header {
            [b'f', b'L', b'a', b'C', ..] => Some(AudioFormat::Flac),
            [b'I', b'D', b'3', ..] => Some(AudioFormat::Mp3),
            // MPEG audio frame sync with a non-reserved layer (ADTS has layer 00)
            [0xFF, b1, ..] if b1 & 0xE0 == 0xE0 && b1 & 0x06 != 0 => Some(AudioFormat::Mp3),
            [_, _, _, _, b'f', b't', b'y', b'p', ..] => Some(AudioFormat::Mp4),
            [b'O', b'g', b'g', b'S', ..] => Some(AudioFormat::Ogg),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'A', b'V', b'E', ..] => Some(AudioFormat::Wave),
            _ => None,
        }
    }

    /// Detect the format of a file on disk.
    pub fn detect(path: &Path) -> Result<Self> {
        let mut header = Vec::with_capacity(12);
        File::open(path)?.take(12).read_to_end(&mut header)?;

        if let Some(format) = Self::from_signature(&header) {
            return Ok(format);
        }

        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| {
                Error::invalid_format(format!("'{}' has an unsupported audio format", path.display()))
            })
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Format-specific behavior: which tag type to write, which codecs the
/// container holds and how ffmpeg should produce them.
pub trait FormatHandler: Send + Sync {
    fn format(&self) -> AudioFormat;

    /// Tag type written to files of this format.
    fn tag_type(&self) -> TagType;

    /// Codecs this container can hold.
    fn codecs(&self) -> &'static [Codec];

    /// Default ffmpeg arguments producing `codec` in this container, or
    /// `None` if the container can't hold it.
    fn ffmpeg_options(&self, codec: Codec, bit_depth: Option<u8>) -> Option<String>;

    fn extensions(&self) -> &'static [&'static str] {
        self.format().extensions()
    }

    fn supports(&self, codec: Codec) -> bool {
        self.codecs().contains(&codec)
    }

    fn read(&self, path: &Path) -> Result<(TagSet, AudioProperties)> {
        io::read(path)
    }

    fn write(&self, path: &Path, tags: &TagSet) -> Result<()> {
        io::write(path, self.tag_type(), tags)
    }
}

pub struct FlacHandler;
pub struct Mp3Handler;
pub struct Mp4Handler;
pub struct OggHandler;
pub struct WaveHandler;

impl FormatHandler for FlacHandler {
    fn format(&self) -> AudioFormat {
        AudioFormat::Flac
    }

    fn tag_type(&self) -> TagType {
        TagType::VorbisComments
    }

    fn codecs(&self) -> &'static [Codec] {
        &[Codec::Flac]
    }

    fn ffmpeg_options(&self, codec: Codec, _bit_depth: Option<u8>) -> Option<String> {
        (codec == Codec::Flac).then(|| "-c:a flac -c:v copy".to_string())
    }
}

impl FormatHandler for Mp3Handler {
    fn format(&self) -> AudioFormat {
        AudioFormat::Mp3
    }

    fn tag_type(&self) -> TagType {
        TagType::Id3v2
    }

    fn codecs(&self) -> &'static [Codec] {
        &[Codec::Mp3]
    }

    fn ffmpeg_options(&self, codec: Codec, _bit_depth: Option<u8>) -> Option<String> {
        (codec == Codec::Mp3).then(|| "-c:a libmp3lame -q:a 0 -c:v copy".to_string())
    }
}

impl FormatHandler for Mp4Handler {
    fn format(&self) -> AudioFormat {
        AudioFormat::Mp4
    }

    fn tag_type(&self) -> TagType {
        TagType::Mp4Ilst
    }

    fn codecs(&self) -> &'static [Codec] {
        &[Codec::Aac, Codec::Alac]
    }

    fn ffmpeg_options(&self, codec: Codec, _bit_depth: Option<u8>) -> Option<String> {
        match codec {
            Codec::Aac => Some("-b:a 256k -c:a aac -c:v copy".to_string()),
            Codec::Alac => Some("-c:a alac -c:v copy".to_string()),
            _ => None,
        }
    }
}

impl FormatHandler for OggHandler {
    fn format(&self) -> AudioFormat {
        AudioFormat::Ogg
    }

    fn tag_type(&self) -> TagType {
        TagType::VorbisComments
    }

    fn codecs(&self) -> &'static [Codec] {
        &[Codec::Flac, Codec::Opus, Codec::Vorbis]
    }

    // Ogg can't carry a video stream for cover art
    fn ffmpeg_options(&self, codec: Codec, _bit_depth: Option<u8>) -> Option<String> {
        match codec {
            Codec::Flac => Some("-c:a flac".to_string()),
            Codec::Opus => Some("-b:a 256k -c:a libopus -vn".to_string()),
            Codec::Vorbis => Some("-c:a libvorbis -vn".to_string()),
            _ => None,
        }
    }
}

impl FormatHandler for WaveHandler {
    fn format(&self) -> AudioFormat {
        AudioFormat::Wave
    }

    fn tag_type(&self) -> TagType {
        TagType::Id3v2
    }

    fn codecs(&self) -> &'static [Codec] {
        &[Codec::Lpcm]
    }

    fn ffmpeg_options(&self, codec: Codec, bit_depth: Option<u8>) -> Option<String> {
        (codec == Codec::Lpcm).then(|| format!("-c:a pcm_s{}le -c:v copy", pcm_bits(bit_depth)))
    }
}

/// Signed PCM sample size ffmpeg has an encoder for, defaulting to 16 bits.
fn pcm_bits(bit_depth: Option<u8>) -> u8 {
    match bit_depth {
        Some(b) if b > 24 => 32,
        Some(b) if b > 16 => 24,
        _ => 16,
    }
}

/// Handler for a format.
pub fn handler_for(format: AudioFormat) -> &'static dyn FormatHandler {
    match format {
        AudioFormat::Flac => &FlacHandler,
        AudioFormat::Mp3 => &Mp3Handler,
        AudioFormat::Mp4 => &Mp4Handler,
        AudioFormat::Ogg => &OggHandler,
        AudioFormat::Wave => &WaveHandler,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_signatures() {
        assert_eq!(AudioFormat::from_signature(b"fLaC\0\0\0\x22"), Some(AudioFormat::Flac));
        assert_eq!(AudioFormat::from_signature(b"ID3\x04\0"), Some(AudioFormat::Mp3));
        assert_eq!(AudioFormat::from_signature(&[0xFF, 0xFB, 0x90, 0x64]), Some(AudioFormat::Mp3));
        assert_eq!(AudioFormat::from_signature(b"\0\0\0\x20ftypM4A "), Some(AudioFormat::Mp4));
        assert_eq!(AudioFormat::from_signature(b"OggS\0\x02"), Some(AudioFormat::Ogg));
        assert_eq!(AudioFormat::from_signature(b"RIFF\x24\0\0\0WAVEfmt "), Some(AudioFormat::Wave));
    }

    #[test]
    fn test_unrecognized_signatures() {
        // ADTS AAC frame sync has layer bits 00
        assert_eq!(AudioFormat::from_signature(&[0xFF, 0xF1, 0x50, 0x80]), None);
        assert_eq!(AudioFormat::from_signature(b"RIFF\x24\0\0\0AVI "), None);
        assert_eq!(AudioFormat::from_signature(b""), None);
    }

    #[test]
    fn test_extensions() {
        assert_eq!(AudioFormat::from_extension("M4A"), Some(AudioFormat::Mp4));
        assert_eq!(AudioFormat::from_extension(".opus"), Some(AudioFormat::Ogg));
        assert_eq!(AudioFormat::from_extension("wav"), Some(AudioFormat::Wave));
        assert_eq!(AudioFormat::from_extension("wma"), None);
    }

    #[test]
    fn test_detect_prefers_signature() {
        let mut file = tempfile::Builder::new().suffix(".mp3").tempfile().unwrap();
        file.write_all(b"fLaC\0\0\0\x22rest").unwrap();

        assert_eq!(AudioFormat::detect(file.path()).unwrap(), AudioFormat::Flac);
    }

    #[test]
    fn test_detect_falls_back_to_extension() {
        let mut file = tempfile::Builder::new().suffix(".ogg").tempfile().unwrap();
        file.write_all(b"garbage").unwrap();

        assert_eq!(AudioFormat::detect(file.path()).unwrap(), AudioFormat::Ogg);
    }

    #[test]
    fn test_detect_unsupported() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "This is just some text, not music.").unwrap();

        let result = AudioFormat::detect(file.path());
        assert!(matches!(result, Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_handler_codecs() {
        assert!(handler_for(AudioFormat::Mp4).supports(Codec::Alac));
        assert!(!handler_for(AudioFormat::Mp4).supports(Codec::Flac));
        assert!(handler_for(AudioFormat::Ogg).supports(Codec::Flac));
        for format in AudioFormat::ALL {
            let handler = handler_for(format);
            assert_eq!(handler.format(), format);
            for codec in handler.codecs() {
                assert!(handler.ffmpeg_options(*codec, None).is_some());
            }
        }
    }

    #[test]
    fn test_cover_art_stream_handling() {
        let flac = handler_for(AudioFormat::Flac).ffmpeg_options(Codec::Flac, None).unwrap();
        let ogg_flac = handler_for(AudioFormat::Ogg).ffmpeg_options(Codec::Flac, None).unwrap();
        assert!(flac.contains("-c:v copy"));
        assert!(!ogg_flac.contains("-c:v"));
    }

    #[test]
    fn test_pcm_bit_depth() {
        let wave = handler_for(AudioFormat::Wave);
        assert_eq!(
            wave.ffmpeg_options(Codec::Lpcm, Some(24)).as_deref(),
            Some("-c:a pcm_s24le -c:v copy")
        );
        assert_eq!(
            wave.ffmpeg_options(Codec::Lpcm, None).as_deref(),
            Some("-c:a pcm_s16le -c:v copy")
        );
        assert_eq!(pcm_bits(Some(8)), 16);
        assert_eq!(pcm_bits(Some(32)), 32);
    }
}
