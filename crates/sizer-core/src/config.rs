use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_FILENAME, DEFAULT_MIN_SIZE_MB, DEFAULT_SERVER_URL, DEFAULT_TARGET_SIZE_MB,
    DEFAULT_TIMEOUT_SECS, UPLOAD_ENDPOINT,
};

/// Client settings. Every field falls back to its default when missing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the processing service.
    pub server_url: String,
    /// Path of the upload endpoint on that service.
    pub endpoint: String,
    /// Request timeout in seconds; 0 disables it.
    pub timeout_secs: u64,
    /// Save name used when the response does not suggest one.
    pub default_filename: String,
    /// Directory processed files are saved into.
    pub output_dir: PathBuf,
    pub default_min_size_mb: f64,
    pub default_target_size_mb: f64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.into(),
            endpoint: UPLOAD_ENDPOINT.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_filename: DEFAULT_FILENAME.into(),
            output_dir: PathBuf::from("."),
            default_min_size_mb: DEFAULT_MIN_SIZE_MB,
            default_target_size_mb: DEFAULT_TARGET_SIZE_MB,
        }
    }
}

impl ClientConfig {
    /// Full URL of the upload endpoint.
    pub fn upload_url(&self) -> String {
        format!(
            "{}/{}",
            self.server_url.trim_end_matches('/'),
            self.endpoint.trim_start_matches('/')
        )
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}
