//! Template images and fonts, loaded once per run and treated as immutable

use image::RgbImage;
use rusttype::Font;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::{RenderError, Result};

/// Where the fixed assets live on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetPaths {
    /// Address-side card template
    pub address_template: PathBuf,
    /// Calendar-side template for same-day bin and box collections
    pub calendar_template: PathBuf,
    /// Blank SRA3 sheet the four cards are pasted onto
    pub blank_sheet: PathBuf,
    pub address_font: PathBuf,
    pub calendar_font: PathBuf,
    /// Monospace font for the index and UPRN markers
    pub marker_font: PathBuf,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            address_template: PathBuf::from("./in/postcard-front.jpg"),
            calendar_template: PathBuf::from("./in/postcard-back-same-dates.jpg"),
            blank_sheet: PathBuf::from("./in/blank_sra3.jpg"),
            address_font: PathBuf::from("./in/arial.ttf"),
            calendar_font: PathBuf::from("./in/futura-bold-condensed-italic.ttf"),
            marker_font: PathBuf::from("./in/consola.ttf"),
        }
    }
}

/// Decoded templates and parsed fonts shared by every card in the run.
pub struct Assets {
    pub address_template: RgbImage,
    pub calendar_template: RgbImage,
    pub blank_sheet: RgbImage,
    pub address_font: Font<'static>,
    pub calendar_font: Font<'static>,
    pub marker_font: Font<'static>,
}

impl Assets {
    pub async fn load(paths: &AssetPaths) -> Result<Self> {
        let address_template = load_template(&paths.address_template).await?;
        let calendar_template = load_template(&paths.calendar_template).await?;
        let blank_sheet = load_template(&paths.blank_sheet).await?;
        let address_font = load_font(&paths.address_font).await?;
        let calendar_font = load_font(&paths.calendar_font).await?;
        let marker_font = load_font(&paths.marker_font).await?;

        Ok(Self {
            address_template,
            calendar_template,
            blank_sheet,
            address_font,
            calendar_font,
            marker_font,
        })
    }
}

async fn load_template(path: &Path) -> Result<RgbImage> {
    let bytes = tokio::fs::read(path).await?;
    // Decoding the templates is CPU-bound, spawn blocking
    let image = tokio::task::spawn_blocking(move || {
        image::load_from_memory(&bytes).map(|img| img.to_rgb8())
    })
    .await??;
    Ok(image)
}

async fn load_font(path: &Path) -> Result<Font<'static>> {
    let bytes = tokio::fs::read(path).await?;
    Font::try_from_vec(bytes)
        .ok_or_else(|| RenderError::Font(format!("unreadable font file {}", path.display())))
}
