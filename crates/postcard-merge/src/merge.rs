//! Chunked JPEG-to-PDF merge

use printpdf::{Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, RawImage, XObjectTransform};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::types::{MergeError, MergeOptions, Result};

const MM_PER_INCH: f32 = 25.4;

/// Output document name for 1-based chunk number `n`.
pub fn document_filename(n: usize) -> String {
    format!("{}-output.pdf", n)
}

/// Every sheet JPEG in the directory, sorted lexicographically by filename.
/// Chunk assignment must not depend on creation order, only on names.
pub fn enumerate_sheets(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "jpg") {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

/// Partition sheets into consecutive runs of at most `chunk_size`.
pub fn chunk_sheets(paths: &[PathBuf], chunk_size: usize) -> Vec<&[PathBuf]> {
    paths.chunks(chunk_size).collect()
}

/// Merge all persisted sheets under `sheet_dir` into numbered PDF documents
/// in `out_dir`, returning the document paths in chunk order.
pub async fn merge(
    sheet_dir: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    options: MergeOptions,
) -> Result<Vec<PathBuf>> {
    options.validate()?;

    let sheet_dir = sheet_dir.as_ref().to_owned();
    let out_dir = out_dir.as_ref().to_owned();

    // Decoding and PDF assembly are CPU-bound, spawn blocking
    tokio::task::spawn_blocking(move || merge_sync(&sheet_dir, &out_dir, &options)).await?
}

fn merge_sync(sheet_dir: &Path, out_dir: &Path, options: &MergeOptions) -> Result<Vec<PathBuf>> {
    let paths = enumerate_sheets(sheet_dir)?;
    if paths.is_empty() {
        return Err(MergeError::NoSheets);
    }
    std::fs::create_dir_all(out_dir)?;

    let mut documents = Vec::new();
    for (number, chunk) in chunk_sheets(&paths, options.chunk_size).into_iter().enumerate() {
        // Everything decoded for this chunk lives inside build_document and
        // is dropped before the next chunk starts
        let bytes = build_document(chunk, options)?;
        let path = out_dir.join(document_filename(number + 1));
        std::fs::write(&path, bytes)?;
        info!("saved {} sheets -> {}", chunk.len(), path.display());
        documents.push(path);
    }

    Ok(documents)
}

/// Build one PDF with a page per sheet, each page sized to the sheet's
/// pixel dimensions at the configured DPI.
fn build_document(chunk: &[PathBuf], options: &MergeOptions) -> Result<Vec<u8>> {
    let mut doc = PdfDocument::new("Postcard sheets");

    for path in chunk {
        let bytes = std::fs::read(path)?;
        let mut warnings = Vec::new();
        let image = RawImage::decode_from_bytes(&bytes, &mut warnings)
            .map_err(|e| MergeError::Pdf(format!("{}: {}", path.display(), e)))?;

        let width_mm = image.width as f32 / options.dpi * MM_PER_INCH;
        let height_mm = image.height as f32 / options.dpi * MM_PER_INCH;
        let image_id = doc.add_image(&image);

        let ops = vec![Op::UseXobject {
            id: image_id,
            transform: XObjectTransform {
                dpi: Some(options.dpi),
                ..Default::default()
            },
        }];
        doc.pages
            .push(PdfPage::new(Mm(width_mm), Mm(height_mm), ops));
    }

    let mut warnings = Vec::new();
    Ok(doc.save(&PdfSaveOptions::default(), &mut warnings))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_paths(count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| PathBuf::from(format!("{:04}-addr.jpg", i)))
            .collect()
    }

    #[test]
    fn chunks_are_bounded_and_ordered() {
        let paths = fake_paths(320);
        let chunks = chunk_sheets(&paths, 150);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 150);
        assert_eq!(chunks[1].len(), 150);
        assert_eq!(chunks[2].len(), 20);
        assert_eq!(chunks[0][0], paths[0]);
        assert_eq!(chunks[2][19], paths[319]);
    }

    #[test]
    fn exact_chunk_boundary() {
        let paths = fake_paths(300);
        let chunks = chunk_sheets(&paths, 150);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].len(), 150);
    }

    #[test]
    fn document_numbering_starts_at_one() {
        assert_eq!(document_filename(1), "1-output.pdf");
        assert_eq!(document_filename(3), "3-output.pdf");
    }

    #[test]
    fn enumerate_sorts_by_filename_and_skips_non_sheets() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b-b-b-b-cal.jpg", "a-a-a-a-addr.jpg", "1-output.pdf", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let paths = enumerate_sheets(dir.path()).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a-a-a-a-addr.jpg", "b-b-b-b-cal.jpg"]);
    }
}
