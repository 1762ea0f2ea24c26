//! Audio conversion via FFmpeg
//!
//! This module shells out to the `ffmpeg` command-line tool. Planning a
//! conversion (target container, output path, encoder arguments) is pure and
//! separate from running it.
//!
//! Install ffmpeg:
//! - Windows: `winget install Gyan.FFmpeg`
//! - macOS: `brew install ffmpeg`
//! - Linux: `apt install ffmpeg` or equivalent

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

use super::format::{AudioFormat, handler_for};
use crate::error::{Error, Result};

/// Audio codecs we can convert to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    Aac,
    Alac,
    Flac,
    Mp3,
    Opus,
    Vorbis,
    Lpcm,
}

impl Codec {
    pub fn name(self) -> &'static str {
        match self {
            Codec::Aac => "AAC",
            Codec::Alac => "ALAC",
            Codec::Flac => "FLAC",
            Codec::Mp3 => "MP3",
            Codec::Opus => "Opus",
            Codec::Vorbis => "Vorbis",
            Codec::Lpcm => "LPCM",
        }
    }

    pub fn is_lossless(self) -> bool {
        matches!(self, Codec::Alac | Codec::Flac | Codec::Lpcm)
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Codec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "aac" | "m4a" | "mp4" | "mp4a" => Ok(Codec::Aac),
            "alac" => Ok(Codec::Alac),
            "flac" => Ok(Codec::Flac),
            "mp3" => Ok(Codec::Mp3),
            "ogg" | "opus" => Ok(Codec::Opus),
            "vorbis" => Ok(Codec::Vorbis),
            "lpcm" | "wav" | "wave" => Ok(Codec::Lpcm),
            other => Err(Error::conversion(format!("The '{}' codec is not supported", other))),
        }
    }
}

/// Parse a container name, accepting `m4a` for MP4 and `wave` for WAV.
pub fn parse_container(s: &str) -> Result<AudioFormat> {
    let name = s.trim().to_lowercase();
    let name = match name.as_str() {
        "m4a" | "mp4a" => "mp4",
        "wave" => "wav",
        other => other,
    };
    AudioFormat::from_extension(name)
        .ok_or_else(|| Error::conversion(format!("The '{}' container is not supported", s.trim())))
}

/// Caller choices for a conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Target container; the first container that holds the codec if unset
    pub container: Option<AudioFormat>,
    /// ffmpeg arguments replacing the codec's defaults, split like a shell
    /// command line (`-metadata comment="Live at home"` is two arguments)
    pub ffmpeg_options: Option<String>,
    /// Output file. A bare file name is placed next to the input.
    pub filename: Option<PathBuf>,
    /// Keep the input file afterwards
    pub preserve: bool,
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self {
            preserve: true,
            ..Default::default()
        }
    }
}

/// Everything needed to run one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionPlan {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: AudioFormat,
    pub codec: Codec,
    /// Encoder arguments between input and output
    pub options: Vec<String>,
    /// Source already holds this codec in this container
    pub reencode: bool,
}

impl ConversionPlan {
    /// Arguments passed to ffmpeg.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-i".to_string(),
            self.input.to_string_lossy().into_owned(),
        ];
        args.extend(self.options.iter().cloned());
        args.extend(["-loglevel", "error", "-stats"].map(str::to_string));
        args.push(self.output.to_string_lossy().into_owned());
        args
    }
}

/// Work out target container, output file and ffmpeg arguments.
///
/// `source_codec` and `bit_depth` describe the input file when known.
pub fn plan_conversion(
    input: &Path,
    source_format: AudioFormat,
    source_codec: Option<Codec>,
    bit_depth: Option<u8>,
    codec: Codec,
    opts: &ConvertOptions,
) -> Result<ConversionPlan> {
    let format = match opts.container {
        Some(container) => {
            if !handler_for(container).supports(codec) {
                return Err(Error::conversion(format!(
                    "{} audio is incompatible with the {} container",
                    codec, container
                )));
            }
            container
        }
        None => AudioFormat::ALL
            .iter()
            .copied()
            .find(|f| handler_for(*f).supports(codec))
            .ok_or_else(|| Error::conversion(format!("The '{}' codec is not supported", codec)))?,
    };

    let reencode = source_format == format && source_codec == Some(codec);

    let ext = format.preferred_extension();
    let mut output = match &opts.filename {
        None => input.with_extension(ext),
        Some(name) => {
            let name = if name.parent().is_none_or(|p| p.as_os_str().is_empty()) {
                input.parent().unwrap_or(Path::new("")).join(name)
            } else {
                name.clone()
            };
            if name.extension().and_then(|e| e.to_str()) == Some(ext) {
                name
            } else {
                name.with_extension(ext)
            }
        }
    };
    if output == input
        && let Some(stem) = output.file_stem().map(|s| s.to_string_lossy().into_owned())
    {
        output = output.with_file_name(format!("{}_.{}", stem, ext));
    }

    let options = match &opts.ffmpeg_options {
        Some(custom) => custom.clone(),
        None => handler_for(format)
            .ffmpeg_options(codec, bit_depth)
            .ok_or_else(|| Error::conversion(format!("No encoder settings for {} in {}", codec, format)))?,
    };
    let options = shell_words::split(&options)
        .map_err(|e| Error::conversion(format!("Invalid ffmpeg options '{}': {}", options, e)))?;

    Ok(ConversionPlan {
        input: input.to_path_buf(),
        output,
        format,
        codec,
        options,
        reencode,
    })
}

/// Common installation paths for ffmpeg on Windows
#[cfg(windows)]
const FFMPEG_PATHS: &[&str] = &[
    "ffmpeg", // In PATH
    r"C:\Program Files\ffmpeg\bin\ffmpeg.exe",
    r"C:\ffmpeg\bin\ffmpeg.exe",
];

#[cfg(not(windows))]
const FFMPEG_PATHS: &[&str] = &[
    "ffmpeg", // In PATH
    "/usr/bin/ffmpeg",
    "/usr/local/bin/ffmpeg",
    "/opt/homebrew/bin/ffmpeg",
];

fn runs(program: &Path) -> bool {
    Command::new(program)
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Located ffmpeg executable.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    program: PathBuf,
}

impl Ffmpeg {
    /// Find ffmpeg, trying `explicit` first and then common locations.
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        explicit
            .into_iter()
            .map(Path::to_path_buf)
            .chain(FFMPEG_PATHS.iter().map(PathBuf::from))
            .find(|p| runs(p))
            .map(|program| Self { program })
            .ok_or_else(|| {
                Error::conversion("ffmpeg not found. Please install FFmpeg: https://ffmpeg.org/")
            })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// First line of `ffmpeg -version` (for diagnostics)
    pub fn version(&self) -> Option<String> {
        Command::new(&self.program)
            .arg("-version")
            .output()
            .ok()
            .filter(|o| o.status.success())
            .and_then(|o| {
                String::from_utf8_lossy(&o.stdout)
                    .lines()
                    .next()
                    .map(|l| l.trim().to_string())
            })
    }

    /// Run a planned conversion. The input is left in place.
    pub fn run(&self, plan: &ConversionPlan) -> Result<()> {
        if let Some(dir) = plan.output.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)?;
        }

        tracing::info!(
            "Converting {} to {} ({})",
            plan.input.display(),
            plan.output.display(),
            plan.codec
        );

        let output = Command::new(&self.program)
            .args(plan.args())
            .output()
            .map_err(|e| Error::conversion(format!("Failed to run ffmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::conversion(format!("ffmpeg failed: {}", stderr.trim())));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(codec: Codec, opts: &ConvertOptions) -> Result<ConversionPlan> {
        plan_conversion(
            Path::new("/music/shine.flac"),
            AudioFormat::Flac,
            Some(Codec::Flac),
            Some(24),
            codec,
            opts,
        )
    }

    #[test]
    fn test_codec_aliases() {
        assert_eq!("m4a".parse::<Codec>().unwrap(), Codec::Aac);
        assert_eq!("MP4A".parse::<Codec>().unwrap(), Codec::Aac);
        assert_eq!("ogg".parse::<Codec>().unwrap(), Codec::Opus);
        assert_eq!("wave".parse::<Codec>().unwrap(), Codec::Lpcm);
        assert!("wma".parse::<Codec>().is_err());
    }

    #[test]
    fn test_container_aliases() {
        assert_eq!(parse_container("m4a").unwrap(), AudioFormat::Mp4);
        assert_eq!(parse_container("wave").unwrap(), AudioFormat::Wave);
        assert_eq!(parse_container("ogg").unwrap(), AudioFormat::Ogg);
        assert!(parse_container("mkv").is_err());
    }

    #[test]
    fn test_default_container_per_codec() {
        let opts = ConvertOptions::new();
        assert_eq!(plan(Codec::Alac, &opts).unwrap().format, AudioFormat::Mp4);
        assert_eq!(plan(Codec::Opus, &opts).unwrap().format, AudioFormat::Ogg);
        assert_eq!(plan(Codec::Lpcm, &opts).unwrap().format, AudioFormat::Wave);
    }

    #[test]
    fn test_incompatible_container() {
        let opts = ConvertOptions {
            container: Some(AudioFormat::Mp3),
            ..ConvertOptions::new()
        };
        let err = plan(Codec::Flac, &opts).unwrap_err();
        assert!(err.to_string().contains("incompatible"));
    }

    #[test]
    fn test_alac_plan() {
        let plan = plan(Codec::Alac, &ConvertOptions::new()).unwrap();

        assert_eq!(plan.output, PathBuf::from("/music/shine.m4a"));
        assert_eq!(plan.options, ["-c:a", "alac", "-c:v", "copy"]);
        assert!(!plan.reencode);
        assert_eq!(
            plan.args(),
            vec![
                "-y", "-i", "/music/shine.flac", "-c:a", "alac", "-c:v", "copy", "-loglevel",
                "error", "-stats", "/music/shine.m4a"
            ]
        );
    }

    #[test]
    fn test_lpcm_uses_source_bit_depth() {
        let plan = plan(Codec::Lpcm, &ConvertOptions::new()).unwrap();
        assert_eq!(plan.options, ["-c:a", "pcm_s24le", "-c:v", "copy"]);
    }

    #[test]
    fn test_same_file_gets_suffix() {
        let plan = plan(Codec::Flac, &ConvertOptions::new()).unwrap();

        assert!(plan.reencode);
        assert_eq!(plan.output, PathBuf::from("/music/shine_.flac"));
    }

    #[test]
    fn test_custom_filename_and_options() {
        let opts = ConvertOptions {
            filename: Some(PathBuf::from("converted.mp3")),
            ffmpeg_options: Some("-c:a libmp3lame -b:a 320k".to_string()),
            ..ConvertOptions::new()
        };
        let plan = plan(Codec::Mp3, &opts).unwrap();

        assert_eq!(plan.output, PathBuf::from("/music/converted.mp3"));
        assert_eq!(plan.options, ["-c:a", "libmp3lame", "-b:a", "320k"]);
    }

    #[test]
    fn test_quoted_options_stay_one_argument() {
        let opts = ConvertOptions {
            ffmpeg_options: Some(r#"-c:a libmp3lame -metadata comment="Live at home" -b:a '320k'"#.to_string()),
            ..ConvertOptions::new()
        };
        let plan = plan(Codec::Mp3, &opts).unwrap();

        let args = plan.args();
        let comment = args.iter().position(|a| a == "-metadata").unwrap();
        assert_eq!(args[comment + 1], "comment=Live at home");
        assert!(args.contains(&"320k".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("/music/shine.mp3"));
    }

    #[test]
    fn test_unbalanced_quote_is_rejected() {
        let opts = ConvertOptions {
            ffmpeg_options: Some(r#"-metadata title="Shine"#.to_string()),
            ..ConvertOptions::new()
        };

        assert!(matches!(plan(Codec::Mp3, &opts), Err(Error::Conversion(_))));
    }

    #[test]
    fn test_filename_extension_is_forced() {
        let opts = ConvertOptions {
            filename: Some(PathBuf::from("/tmp/out/shine.wav")),
            ..ConvertOptions::new()
        };
        let plan = plan(Codec::Vorbis, &opts).unwrap();

        assert_eq!(plan.output, PathBuf::from("/tmp/out/shine.ogg"));
    }

    #[test]
    fn test_missing_explicit_ffmpeg_falls_through() {
        // Must not panic whether or not ffmpeg is installed
        let _ = Ffmpeg::locate(Some(Path::new("/definitely/not/ffmpeg")));
    }
}
