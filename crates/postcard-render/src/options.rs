use crate::types::{RenderError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Per-run rendering configuration.
///
/// The calendar epoch values change with every print run, so they live here
/// rather than in the card renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Directory the composed sheets are written to
    pub out_dir: PathBuf,

    /// Character width the calendar strings wrap at. Tuned to the card
    /// artwork; re-tune if the string shapes change.
    pub wrap_width: usize,

    /// Day-of-month of the Monday of week zero in the print run's period
    pub epoch_day_offset: u32,
    /// Period label printed after the computed date, e.g. "June 2018"
    pub period_label: String,

    /// JPEG quality for persisted sheets
    pub jpeg_quality: u8,

    /// Record fetch retries before the run aborts
    pub retry_count: u32,
    /// Delay between retries
    pub retry_delay_ms: u64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("./out"),
            wrap_width: 7,
            epoch_day_offset: 4,
            period_label: "June 2018".to_string(),
            jpeg_quality: 95,
            retry_count: 3,
            retry_delay_ms: 500,
        }
    }
}

impl RenderOptions {
    /// Load options from JSON file
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| RenderError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| RenderError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.wrap_width == 0 {
            return Err(RenderError::Config(
                "Wrap width must be at least 1".to_string(),
            ));
        }
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(RenderError::Config(
                "JPEG quality must be between 1 and 100".to_string(),
            ));
        }
        Ok(())
    }
}
