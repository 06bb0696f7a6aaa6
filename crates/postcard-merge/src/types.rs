use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("no sheet images found to merge")]
    NoSheets,
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, MergeError>;

/// Merger configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Maximum sheets per output document. Bounds how many decoded sheet
    /// images are held in memory at once.
    pub chunk_size: usize,
    /// Print resolution the sheet pixels are placed at
    pub dpi: f32,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            chunk_size: 150,
            dpi: 300.0,
        }
    }
}

impl MergeOptions {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(MergeError::Config(
                "Chunk size must be at least 1".to_string(),
            ));
        }
        if self.dpi <= 0.0 {
            return Err(MergeError::Config("DPI must be positive".to_string()));
        }
        Ok(())
    }
}
