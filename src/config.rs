//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\tunelink\config.toml
//! - macOS: ~/Library/Application Support/tunelink/config.toml
//! - Linux: ~/.config/tunelink/config.toml
//!
//! The config file is human-readable and editable. Credentials given on the
//! command line or through environment variables take precedence.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::matching::DEFAULT_THRESHOLD;
use crate::vendors::Vendor;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Vendor API credentials
    pub credentials: Credentials,

    /// Search and matching settings
    pub matching: MatchingConfig,

    /// Cover art settings
    pub artwork: ArtworkConfig,

    /// Transcoding settings
    pub conversion: ConversionConfig,
}

/// Vendor API credentials. A vendor without credentials is simply not used,
/// except iTunes and Discogs lookups which need none.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    /// TIDAL client token sent as `x-tidal-token`
    pub tidal_token: Option<String>,
    pub qobuz_app_id: Option<String>,
    pub qobuz_user_token: Option<String>,
    /// Discogs personal access token (needed for search)
    pub discogs_token: Option<String>,
}

/// Search and matching settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum similarity (0.0 - 1.0) for a fuzzy match to be accepted
    pub threshold: f64,

    /// Results requested from each vendor per search
    pub search_limit: u32,

    /// Vendors consulted when none are given, in merge order
    pub vendors: Vec<String>,

    /// Storefront country code for TIDAL and iTunes
    pub country: String,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            search_limit: 10,
            vendors: Vendor::ALL.iter().map(|v| v.name().to_string()).collect(),
            country: "US".to_string(),
        }
    }
}

impl MatchingConfig {
    /// Configured vendor order, skipping names that aren't recognized.
    pub fn vendor_order(&self) -> Vec<Vendor> {
        self.vendors
            .iter()
            .filter_map(|name| match name.parse::<Vendor>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Ignoring vendor in config: {}", e);
                    None
                }
            })
            .collect()
    }
}

/// Cover art settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtworkConfig {
    /// Whether to download and embed cover art
    pub enabled: bool,

    /// Requested edge length in pixels
    pub size: u32,

    /// Image format requested from vendors that can re-encode (iTunes)
    pub format: String,
}

impl Default for ArtworkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size: 1280,
            format: "jpg".to_string(),
        }
    }
}

/// Transcoding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Explicit ffmpeg binary (searched on PATH when unset)
    pub ffmpeg_path: Option<PathBuf>,

    /// Keep the source file after converting
    pub preserve_source: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            preserve_source: true,
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tunelink"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from disk
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from a specific file, falling back to defaults.
pub fn load_from(path: &std::path::Path) -> Config {
    if !path.exists() {
        tracing::debug!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::debug!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to disk
///
/// Creates the config directory if it doesn't exist.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)
}

/// Save configuration to a specific file.
pub fn save_to(config: &Config, path: &std::path::Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
