//! Configuration types for photo-uploader

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Largest batch the photo library accepts in one commit call
pub const MAX_BATCH_SIZE: usize = 50;

/// Upload pipeline configuration (batching and parallelism)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Items committed together in one batch call (default: 8)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Number of parallel upload workers (default: 4)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Timeout applied to each individual upload call (None = no timeout)
    ///
    /// The timeout is per upload, never across the whole run, so items that
    /// already finished keep their progress.
    #[serde(default, with = "optional_duration_serde")]
    pub upload_timeout: Option<Duration>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            concurrency: default_concurrency(),
            upload_timeout: None,
        }
    }
}

/// Network availability window consulted before every upload
///
/// Uploads only start while the local hour is inside `[start_hour, end_hour)`.
/// A window whose start is after its end crosses midnight (e.g. 22 to 6).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AvailabilityConfig {
    /// Whether the window is enforced (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// First allowed hour, inclusive (default: 2)
    #[serde(default = "default_start_hour")]
    pub start_hour: u32,

    /// First disallowed hour, exclusive (default: 14)
    #[serde(default = "default_end_hour")]
    pub end_hour: u32,

    /// Sleep between checks while outside the window (default: 600 seconds)
    #[serde(default = "default_poll_interval", with = "duration_serde")]
    pub poll_interval: Duration,
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            start_hour: default_start_hour(),
            end_hour: default_end_hour(),
            poll_interval: default_poll_interval(),
        }
    }
}

/// Completion ledger location
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Ledger file path; a leading `~/` is expanded (default: "~/.gpupdone")
    #[serde(default = "default_ledger_path")]
    pub path: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: default_ledger_path(),
        }
    }
}

/// Candidate discovery settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// File extensions (with leading dot, case-sensitive) never uploaded
    #[serde(default = "default_excluded_extensions")]
    pub excluded_extensions: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            excluded_extensions: default_excluded_extensions(),
        }
    }
}

/// Remote photo library endpoint and credentials
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Service base URL (default: "https://photoslibrary.googleapis.com")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// OAuth2 bearer token used for every call
    #[serde(default)]
    pub access_token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_token: None,
        }
    }
}

/// Main configuration for [`Uploader`](crate::Uploader)
///
/// Every field has a default, so an empty JSON object is a valid config file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Batching and parallelism
    #[serde(default)]
    pub upload: UploadConfig,

    /// Network availability window
    #[serde(default)]
    pub availability: AvailabilityConfig,

    /// Completion ledger
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Candidate discovery
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Remote API
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Load a configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.upload.batch_size == 0 {
            return Err(Error::config(
                "batch size must be at least 1",
                "upload.batch_size",
            ));
        }
        if self.upload.batch_size > MAX_BATCH_SIZE {
            return Err(Error::config(
                format!("batch size must not exceed {MAX_BATCH_SIZE}"),
                "upload.batch_size",
            ));
        }
        if self.upload.concurrency == 0 {
            return Err(Error::config(
                "concurrency must be at least 1",
                "upload.concurrency",
            ));
        }
        if self.availability.start_hour > 23 {
            return Err(Error::config(
                "hour must be between 0 and 23",
                "availability.start_hour",
            ));
        }
        if self.availability.end_hour > 23 {
            return Err(Error::config(
                "hour must be between 0 and 23",
                "availability.end_hour",
            ));
        }
        if self.availability.poll_interval.is_zero() {
            return Err(Error::config(
                "poll interval must be at least one second",
                "availability.poll_interval",
            ));
        }
        Ok(())
    }
}

fn default_batch_size() -> usize {
    8
}

fn default_concurrency() -> usize {
    4
}

fn default_true() -> bool {
    true
}

fn default_start_hour() -> u32 {
    2
}

fn default_end_hour() -> u32 {
    14
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(600)
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("~/.gpupdone")
}

fn default_excluded_extensions() -> Vec<String> {
    [".MOV", ".tif", ".AAE", ".mpg", ".mp4"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_base_url() -> String {
    "https://photoslibrary.googleapis.com".to_string()
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
