//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `lookup`: Vendor search and tagging
//! - `files`: Inspecting and converting local files, tool checks

mod files;
mod lookup;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

use crate::audio::AudioFormat;
use crate::config::{self, Config};

pub use files::{cmd_check_tools, cmd_config, cmd_convert, cmd_show};
pub use lookup::{cmd_match, cmd_tag};

/// tunelink CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Vendor credentials; each overrides the config file when given
#[derive(Args, Debug, Default, Clone)]
pub struct CredentialArgs {
    #[arg(long, env = "SPOTIFY_CLIENT_ID", hide_env_values = true)]
    pub spotify_client_id: Option<String>,
    #[arg(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub spotify_client_secret: Option<String>,
    #[arg(long, env = "TIDAL_TOKEN", hide_env_values = true)]
    pub tidal_token: Option<String>,
    #[arg(long, env = "QOBUZ_APP_ID", hide_env_values = true)]
    pub qobuz_app_id: Option<String>,
    #[arg(long, env = "QOBUZ_USER_TOKEN", hide_env_values = true)]
    pub qobuz_user_token: Option<String>,
    #[arg(long, env = "DISCOGS_TOKEN", hide_env_values = true)]
    pub discogs_token: Option<String>,
}

impl CredentialArgs {
    /// Overlay the given credentials onto `config`.
    pub fn apply(&self, config: &mut Config) {
        let creds = &mut config.credentials;
        let pairs = [
            (&self.spotify_client_id, &mut creds.spotify_client_id),
            (&self.spotify_client_secret, &mut creds.spotify_client_secret),
            (&self.tidal_token, &mut creds.tidal_token),
            (&self.qobuz_app_id, &mut creds.qobuz_app_id),
            (&self.qobuz_user_token, &mut creds.qobuz_user_token),
            (&self.discogs_token, &mut creds.discogs_token),
        ];
        for (given, slot) in pairs {
            if let Some(value) = given {
                *slot = Some(value.clone());
            }
        }
    }
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Show the tags and audio properties of a file
    Show {
        /// Path to the audio file
        path: PathBuf,
    },
    /// Search one vendor and show how its results match
    Match {
        /// Vendor to search (spotify, tidal, qobuz, itunes, discogs)
        #[arg(short, long)]
        vendor: String,
        /// Track or album title
        #[arg(short, long)]
        title: String,
        /// Artist name
        #[arg(short, long)]
        artist: String,
        /// ISRC (tracks) or UPC (albums) to match exactly
        #[arg(long)]
        identifier: Option<String>,
        /// Search albums instead of tracks
        #[arg(long)]
        album: bool,
        /// Expected number of tracks on the album (tie-breaker)
        #[arg(long)]
        track_count: Option<u32>,
        #[command(flatten)]
        credentials: CredentialArgs,
    },
    /// Fill tags from vendor catalogs
    Tag {
        /// Path to file or directory to tag
        path: PathBuf,
        /// Vendors to consult in merge order, comma separated (default: from config)
        #[arg(long, value_delimiter = ',')]
        vendors: Vec<String>,
        /// Replace tags the file already has
        #[arg(long)]
        overwrite: bool,
        /// Recursive directory scan
        #[arg(short, long)]
        recursive: bool,
        /// Regex over the file name with named groups artist, title, track_number
        #[arg(long)]
        pattern: Option<String>,
        /// Minimum match score (0.0-1.0), overriding the config
        #[arg(long)]
        threshold: Option<f64>,
        /// Dry run - show what would change without writing files
        #[arg(long)]
        dry_run: bool,
        #[command(flatten)]
        credentials: CredentialArgs,
    },
    /// Convert audio files to another codec with ffmpeg
    Convert {
        /// Path to file or directory to convert
        path: PathBuf,
        /// Target codec (aac, alac, flac, mp3, opus, vorbis, lpcm)
        #[arg(short, long)]
        codec: String,
        /// Target container (mp4, flac, mp3, ogg, wav); picked from the codec if omitted
        #[arg(long)]
        container: Option<String>,
        /// Output file name (single file only)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Extra ffmpeg arguments replacing the format defaults
        #[arg(long, allow_hyphen_values = true)]
        ffmpeg_options: Option<String>,
        /// Delete the source after a successful conversion
        #[arg(long)]
        delete_source: bool,
        /// Recursive directory scan
        #[arg(short, long)]
        recursive: bool,
    },
    /// Check that external tools and credentials are available
    CheckTools,
    /// Show the active configuration, or write the defaults
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let rt = Runtime::new()?;
    let mut config = match &cli.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };

    match &cli.command {
        Commands::Show { path } => cmd_show(path),
        Commands::Match {
            vendor,
            title,
            artist,
            identifier,
            album,
            track_count,
            credentials,
        } => {
            credentials.apply(&mut config);
            let request = lookup::MatchRequest {
                vendor,
                title,
                artist,
                identifier: identifier.as_deref(),
                album: *album,
                track_count: *track_count,
            };
            cmd_match(&rt, &config, &request)
        }
        Commands::Tag {
            path,
            vendors,
            overwrite,
            recursive,
            pattern,
            threshold,
            dry_run,
            credentials,
        } => {
            credentials.apply(&mut config);
            if let Some(t) = threshold {
                config.matching.threshold = *t;
            }
            let options = lookup::TagOptions {
                vendors,
                overwrite: *overwrite,
                recursive: *recursive,
                pattern: pattern.as_deref(),
                dry_run: *dry_run,
            };
            cmd_tag(&rt, &config, path, &options)
        }
        Commands::Convert {
            path,
            codec,
            container,
            output,
            ffmpeg_options,
            delete_source,
            recursive,
        } => {
            if *delete_source {
                config.conversion.preserve_source = false;
            }
            let request = files::ConvertRequest {
                codec,
                container: container.as_deref(),
                output: output.as_deref(),
                ffmpeg_options: ffmpeg_options.as_deref(),
                recursive: *recursive,
            };
            cmd_convert(&config, path, &request)
        }
        Commands::CheckTools => cmd_check_tools(&config),
        Commands::Config { init } => cmd_config(&config, cli.config.as_deref(), *init),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Collect audio files from a path (file or directory)
pub(crate) fn collect_audio_files(path: &Path, recursive: bool) -> anyhow::Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = if recursive {
        walkdir::WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| is_audio_file(e.path()))
            .map(|e| e.path().to_path_buf())
            .collect()
    } else {
        std::fs::read_dir(path)?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter(|e| is_audio_file(&e.path()))
            .map(|e| e.path())
            .collect()
    };
    files.sort();
    Ok(files)
}

/// Check if a path has an audio file extension
pub(crate) fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .and_then(AudioFormat::from_extension)
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_tag_vendor_list() {
        let cli = Cli::parse_from(["tunelink", "tag", "music", "--vendors", "tidal,itunes", "-r"]);
        match cli.command {
            Commands::Tag {
                vendors, recursive, ..
            } => {
                assert_eq!(vendors, vec!["tidal", "itunes"]);
                assert!(recursive);
            }
            _ => panic!("expected tag command"),
        }
    }

    #[test]
    fn test_credentials_override_config() {
        let mut config = Config::default();
        config.credentials.tidal_token = Some("from-file".to_string());
        config.credentials.discogs_token = Some("keep".to_string());

        let args = CredentialArgs {
            tidal_token: Some("from-cli".to_string()),
            ..Default::default()
        };
        args.apply(&mut config);

        assert_eq!(config.credentials.tidal_token.as_deref(), Some("from-cli"));
        assert_eq!(config.credentials.discogs_token.as_deref(), Some("keep"));
    }

    #[test]
    fn test_collect_audio_files() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("disc 2");
        std::fs::create_dir(&nested).unwrap();
        for name in ["b.flac", "a.m4a", "cover.jpg"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::write(nested.join("c.ogg"), b"").unwrap();

        let flat = collect_audio_files(dir.path(), false).unwrap();
        let names: Vec<_> = flat
            .iter()
            .filter_map(|p| p.file_name()?.to_str())
            .collect();
        assert_eq!(names, vec!["a.m4a", "b.flac"]);

        assert_eq!(collect_audio_files(dir.path(), true).unwrap().len(), 3);
    }
}
