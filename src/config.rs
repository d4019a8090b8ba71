//! Library configuration.
//!
//! Everything tunable lives in one [`Config`] loaded from a sparse TOML file.
//! Stock defaults are filled in for any key the file omits, and unknown keys
//! are rejected to catch typos early.
//!
//! ```toml
//! [fetch]
//! max_bytes = 1048576       # Remote fetch cap (1 MiB)
//! timeout_secs = 30         # Per-request timeout
//! # temp_dir = "/var/tmp"   # Where owned temporaries are created
//!
//! [images]
//! jpeg_quality = 85         # JPEG re-encode quality (1-100)
//! copy_on_resize = false    # Resize a staged copy instead of the original
//! do_not_enlarge = true     # Best-fit never upscales
//! best_fill = false         # Crop-to-fill instead of fit-within
//!
//! [readable_id]
//! sequential_attempts = 50
//! random_attempts = 1000000
//! random_suffix_max = 99
//! exhaustive_start = 1000000
//! # exhaustive_cap = 10000000
//!
//! [ids]
//! alphabet = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz"
//! bit_strength = 128
//! ```

use crate::id_generator::{ALPHABET_ALNUM, RandomStringIdGenerator};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Remote content fetching.
    pub fetch: FetchConfig,
    /// Image transform defaults applied to new [`ImageAttributes`](crate::image::ImageAttributes).
    pub images: ImagesConfig,
    /// Slug collision-resolution limits.
    pub readable_id: ReadableIdConfig,
    /// Primary identifier generation.
    pub ids: IdsConfig,
}

impl Config {
    /// Parse a (possibly sparse) TOML document and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch.max_bytes == 0 {
            return Err(ConfigError::Validation(
                "fetch.max_bytes must be non-zero".into(),
            ));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "fetch.timeout_secs must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.images.jpeg_quality) {
            return Err(ConfigError::Validation(
                "images.jpeg_quality must be 1-100".into(),
            ));
        }
        // Same rules the generator enforces, duplicates collapsed
        RandomStringIdGenerator::from_config(&self.ids)
            .map_err(|err| ConfigError::Validation(format!("ids: {err}")))?;
        Ok(())
    }
}

/// Remote fetch settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Maximum number of bytes read from a remote URL.
    pub max_bytes: u64,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Directory for owned temporary files. System temp dir when absent.
    pub temp_dir: Option<PathBuf>,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_bytes: 1024 * 1024,
            timeout_secs: 30,
            temp_dir: None,
        }
    }
}

/// Image transform defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    pub jpeg_quality: u8,
    pub copy_on_resize: bool,
    pub do_not_enlarge: bool,
    pub best_fill: bool,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 85,
            copy_on_resize: false,
            do_not_enlarge: true,
            best_fill: false,
        }
    }
}

/// Limits for the three slug collision phases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReadableIdConfig {
    /// Collisions tolerated in the `-2`, `-3`, ... phase before going random.
    pub sequential_attempts: u64,
    /// Random-suffix lookups before falling back to exhaustive counting.
    pub random_attempts: u64,
    /// Random suffixes are drawn from `0..=random_suffix_max`.
    pub random_suffix_max: u32,
    /// First suffix tried by the exhaustive phase.
    pub exhaustive_start: u64,
    /// Optional hard bound on exhaustive lookups. Unbounded when absent.
    pub exhaustive_cap: Option<u64>,
}

impl Default for ReadableIdConfig {
    fn default() -> Self {
        Self {
            sequential_attempts: 50,
            random_attempts: 1_000_000,
            random_suffix_max: 99,
            exhaustive_start: 1_000_000,
            exhaustive_cap: None,
        }
    }
}

/// Random primary identifier settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdsConfig {
    pub alphabet: String,
    pub bit_strength: u32,
}

impl Default for IdsConfig {
    fn default() -> Self {
        Self {
            alphabet: ALPHABET_ALNUM.to_string(),
            bit_strength: 128,
        }
    }
}

/// Load config from a TOML file.
///
/// A missing file yields the stock defaults. A file that exists but fails to
/// parse or validate is an error.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(path)?;
    Config::from_toml_str(&content)
}

/// Returns a fully-commented stock config with every key at its default.
pub fn stock_config_toml() -> &'static str {
    r##"# Remote content fetching
[fetch]
# Bytes read from a remote URL before the body is truncated.
max_bytes = 1048576
# Request timeout in seconds.
timeout_secs = 30

# Image transform defaults
[images]
# JPEG re-encode quality, 1-100.
jpeg_quality = 85
# Resize a staged temporary copy instead of the original file.
copy_on_resize = false
# Best-fit resizing never upscales past the source dimensions.
do_not_enlarge = true
# Crop to exactly fill the target box instead of fitting inside it.
best_fill = false

# Readable identifier collision handling
[readable_id]
sequential_attempts = 50
random_attempts = 1000000
random_suffix_max = 99
exhaustive_start = 1000000

# Random primary identifiers
[ids]
alphabet = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz"
bit_strength = 128
"##
}
