//! Scanner configuration.
//!
//! Every field has a default, so `{}` is a complete config.

use crate::error::ConfigError;
use crate::feedback::FeedbackKind;
use crate::models::Symbology;
use crate::preview::VideoGravity;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default name of the capture worker thread
pub const DEFAULT_WORKER_THREAD_NAME: &str = "qrcode-view-capture";

/// Settings for a [`ScannerView`](crate::ScannerView)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScannerConfig {
    /// Symbologies forwarded to the result predicate
    pub symbologies: Vec<Symbology>,
    /// How the preview fits frames into its bounds
    pub video_gravity: VideoGravity,
    /// Feedback played on an accepted result, `None` for silence
    pub feedback: Option<FeedbackKind>,
    /// Start scanning as soon as configuration succeeds
    pub auto_start: bool,
    /// Name given to the capture worker thread
    pub worker_thread_name: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            symbologies: Symbology::DEFAULT_SET.to_vec(),
            video_gravity: VideoGravity::default(),
            feedback: Some(FeedbackKind::default()),
            auto_start: true,
            worker_thread_name: DEFAULT_WORKER_THREAD_NAME.to_string(),
        }
    }
}

impl ScannerConfig {
    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check values serde cannot rule out
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbologies.is_empty() {
            return Err(ConfigError::Invalid(
                "symbologies must name at least one symbology".to_string(),
            ));
        }
        if self.worker_thread_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "worker_thread_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Same config with `auto_start` switched off
    pub fn manual_start(mut self) -> Self {
        self.auto_start = false;
        self
    }
}
