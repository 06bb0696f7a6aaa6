//! Grid compositor - four cards onto one SRA3 sheet
//!
//! The sheet filename is the durable cross-reference back to the batch
//! records: the four UPRNs in their original order plus a side tag, so the
//! reconcile pass can recover exactly which properties a sheet covers.

use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::layout::CARD_OFFSETS;
use crate::types::{RenderError, Result, SheetSide, Uprn};

/// Joins the four UPRNs and the side tag in filenames.
pub const FILENAME_DELIMITER: char = '-';

/// Extension of persisted sheets.
pub const SHEET_EXTENSION: &str = "jpg";

/// Build the sheet filename from the group's *original* (un-permuted) UPRN
/// order. The calendar side's internal pair swap must not leak in here, or
/// the two sides of one group would stop sharing a name prefix.
pub fn sheet_filename(group: &[Uprn; 4], side: SheetSide) -> Result<String> {
    for uprn in group {
        if uprn.as_str().contains(FILENAME_DELIMITER) {
            return Err(RenderError::BadIdentifier(uprn.clone()));
        }
    }
    let mut parts: Vec<&str> = group.iter().map(Uprn::as_str).collect();
    parts.push(side.tag());
    Ok(format!("{}.{}", parts.join("-"), SHEET_EXTENSION))
}

/// Recover the four UPRNs and the side from a sheet filename. Inverse of
/// [`sheet_filename`]; returns `None` for files that aren't sheets.
pub fn parse_sheet_filename(name: &str) -> Option<([Uprn; 4], SheetSide)> {
    let stem = name.strip_suffix(&format!(".{}", SHEET_EXTENSION))?;
    let parts: Vec<&str> = stem.split(FILENAME_DELIMITER).collect();
    if parts.len() != 5 {
        return None;
    }
    let side = match parts[4] {
        "addr" => SheetSide::Address,
        "cal" => SheetSide::Calendar,
        _ => return None,
    };
    Some((
        [
            Uprn::from(parts[0]),
            Uprn::from(parts[1]),
            Uprn::from(parts[2]),
            Uprn::from(parts[3]),
        ],
        side,
    ))
}

/// Paste four rendered cards onto a copy of the blank sheet at the fixed
/// grid offsets (TL, TR, BL, BR). The cards arrive already in grid order;
/// any side-specific permutation happened upstream.
pub fn compose_sheet(cards: &[RgbImage; 4], blank_sheet: &RgbImage) -> RgbImage {
    let mut sheet = blank_sheet.clone();
    for (card, &(x, y)) in cards.iter().zip(CARD_OFFSETS.iter()) {
        image::imageops::replace(&mut sheet, card, i64::from(x), i64::from(y));
    }
    sheet
}

/// Persist a composed sheet under `out_dir/filename` as a JPEG.
pub fn save_sheet(
    sheet: &RgbImage,
    filename: &str,
    out_dir: &Path,
    quality: u8,
) -> Result<PathBuf> {
    let path = out_dir.join(filename);
    let file = File::create(&path)?;
    let mut encoder = JpegEncoder::new_with_quality(BufWriter::new(file), quality);
    encoder.encode_image(sheet)?;
    Ok(path)
}
