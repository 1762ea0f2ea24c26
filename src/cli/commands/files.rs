//! Local file commands: inspection, conversion and tool checks.

use std::path::{Path, PathBuf};

use crate::audio::{AudioFile, Codec, ConvertOptions, Ffmpeg, parse_container};
use crate::config::{self, Config};
use crate::tags::TagField;
use crate::vendors::{LookupService, Vendor};

use super::collect_audio_files;

/// Arguments of `tunelink convert`
pub struct ConvertRequest<'a> {
    pub codec: &'a str,
    pub container: Option<&'a str>,
    pub output: Option<&'a Path>,
    pub ffmpeg_options: Option<&'a str>,
    pub recursive: bool,
}

/// Print the tags and audio properties of a file
pub fn cmd_show(path: &Path) -> anyhow::Result<()> {
    let file = AudioFile::open(path)?;
    let props = file.properties();

    println!("{}", path.display());
    println!();
    print!("  Format:   {}", file.format());
    if let Some(codec) = props.codec {
        print!(" ({})", codec);
    }
    println!();
    println!("  Duration: {}s", props.duration.as_secs());
    if let Some(rate) = props.sample_rate {
        print!("  Audio:    {} Hz", rate);
        if let Some(bits) = props.bit_depth {
            print!(", {}-bit", bits);
        }
        if let Some(channels) = props.channels {
            print!(", {} ch", channels);
        }
        println!();
    }
    if let Some(kbps) = props.bitrate_kbps {
        println!("  Bitrate:  {} kbps", kbps);
    }

    println!();
    let tags = file.tags();
    if tags.is_empty() {
        println!("  (no tags)");
        return Ok(());
    }
    for field in TagField::ALL {
        if let Some(value) = tags.get(field) {
            println!("  {:<13} {}", field.name(), value);
        }
    }
    Ok(())
}

/// Convert one file or a directory of files
pub fn cmd_convert(config: &Config, path: &Path, request: &ConvertRequest<'_>) -> anyhow::Result<()> {
    let codec: Codec = request.codec.parse()?;
    let container = request.container.map(parse_container).transpose()?;
    let ffmpeg = Ffmpeg::locate(config.conversion.ffmpeg_path.as_deref())?;

    let files = collect_audio_files(path, request.recursive)?;
    if request.output.is_some() && files.len() > 1 {
        anyhow::bail!("--output can only be used with a single file");
    }

    let opts = ConvertOptions {
        container,
        ffmpeg_options: request.ffmpeg_options.map(str::to_string),
        filename: request.output.map(Path::to_path_buf),
        preserve: config.conversion.preserve_source,
    };

    let mut converted = 0;
    let mut errors = 0;
    for file_path in &files {
        match convert_one(&ffmpeg, file_path, codec, &opts) {
            Ok(output) => {
                println!("✓ {} → {}", file_path.display(), output.display());
                converted += 1;
            }
            Err(e) => {
                eprintln!("✗ {}: {}", file_path.display(), e);
                errors += 1;
            }
        }
    }

    println!();
    println!("Completed: {} converted, {} errors", converted, errors);
    Ok(())
}

/// Convert a file and carry its tags over to the new file.
fn convert_one(
    ffmpeg: &Ffmpeg,
    path: &Path,
    codec: Codec,
    opts: &ConvertOptions,
) -> crate::error::Result<PathBuf> {
    let mut file = AudioFile::open(path)?;
    file.convert(ffmpeg, codec, opts)?;
    file.flush()?;
    Ok(file.path().to_path_buf())
}

/// Check that ffmpeg is installed and which vendors are usable
pub fn cmd_check_tools(config: &Config) -> anyhow::Result<()> {
    println!("Checking tools...\n");

    match Ffmpeg::locate(config.conversion.ffmpeg_path.as_deref()) {
        Ok(ffmpeg) => match ffmpeg.version() {
            Some(version) => println!("✓ ffmpeg: {}", version),
            None => println!("✓ ffmpeg: {}", ffmpeg.program().display()),
        },
        Err(_) => print_ffmpeg_install_instructions(),
    }

    println!();
    println!("Vendors:");
    let configured = LookupService::from_config(config).vendors();
    for vendor in Vendor::ALL {
        if configured.contains(&vendor) {
            println!("✓ {}: available", vendor);
        } else {
            println!("✗ {}: no credentials", vendor);
        }
    }
    if config.credentials.discogs_token.is_none() {
        println!("  Discogs search needs a personal access token (DISCOGS_TOKEN)");
    }

    Ok(())
}

/// Show the active configuration, optionally writing the defaults
pub fn cmd_config(config: &Config, explicit: Option<&Path>, init: bool) -> anyhow::Result<()> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(config::config_path)
        .ok_or(config::ConfigError::NoConfigDir)?;

    if init {
        if path.exists() {
            println!("Config already exists at {:?}", path);
        } else {
            config::save_to(&Config::default(), &path)?;
            println!("✓ Wrote default config to {:?}", path);
        }
        return Ok(());
    }

    println!("# {}", path.display());
    let mut shown = config.clone();
    redact(&mut shown);
    print!("{}", toml::to_string_pretty(&shown)?);
    Ok(())
}

/// Hide secrets before printing.
fn redact(config: &mut Config) {
    let creds = &mut config.credentials;
    for secret in [
        &mut creds.spotify_client_secret,
        &mut creds.tidal_token,
        &mut creds.qobuz_user_token,
        &mut creds.discogs_token,
    ] {
        if secret.is_some() {
            *secret = Some("********".to_string());
        }
    }
}

/// Print installation instructions for ffmpeg
fn print_ffmpeg_install_instructions() {
    eprintln!("✗ ffmpeg: NOT FOUND");
    eprintln!("Install FFmpeg:");
    eprintln!("  Windows: winget install Gyan.FFmpeg");
    eprintln!("  macOS:   brew install ffmpeg");
    eprintln!("  Linux:   apt install ffmpeg");
}
