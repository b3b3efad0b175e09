//! Turning files and archives into image assets
//!
//! Ingestion is lenient: a file that cannot be read or probed is logged and
//! skipped, it never fails the batch. Pixel data is decoded lazily during
//! assembly; here only the header is read to learn the dimensions.

use crate::constants::{ARCHIVE_EXTENSION, IMAGE_EXTENSIONS};
use crate::types::*;
use image::{ImageFormat, ImageReader};
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

/// Outcome of ingesting a batch of inputs
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Accepted images in input order
    pub assets: Vec<ImageAsset>,
    /// Names of inputs that were skipped
    pub skipped: Vec<String>,
}

fn extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// Whether `name` has one of the recognized image extensions
pub fn is_image_file(name: &str) -> bool {
    extension(name).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Whether `name` is an archive that should be expanded
pub fn is_archive_file(name: &str) -> bool {
    extension(name).is_some_and(|ext| ext == ARCHIVE_EXTENSION)
}

/// Build an asset from encoded image bytes, reading only the header
pub fn ingest_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<ImageAsset> {
    let name = name.into();
    let ingestion_error = |reason: String| ComposeError::Ingestion {
        name: name.clone(),
        reason,
    };

    let mut reader = ImageReader::new(Cursor::new(bytes.as_slice()))
        .with_guessed_format()
        .map_err(|e| ingestion_error(e.to_string()))?;
    if reader.format().is_none() {
        reader.set_format(
            ImageFormat::from_path(&name).map_err(|e| ingestion_error(e.to_string()))?,
        );
    }
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| ingestion_error(e.to_string()))?;

    let size = bytes.len();
    ImageAsset::new(name, RasterHandle::from_encoded(bytes), width, height, size)
}

/// Expand an archive, ingesting every image member.
///
/// Directories and non-image members are ignored; image members that fail
/// to ingest are reported in `skipped`.
pub fn ingest_archive(name: &str, bytes: Vec<u8>) -> Result<IngestReport> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut report = IngestReport::default();

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() || !is_image_file(file.name()) {
            continue;
        }

        let member = file.name().to_string();
        let mut contents = Vec::new();
        if let Err(e) = file.read_to_end(&mut contents) {
            log::warn!("Skipping {} in {}: {}", member, name, e);
            report.skipped.push(member);
            continue;
        }

        match ingest_bytes(member.clone(), contents) {
            Ok(asset) => report.assets.push(asset),
            Err(e) => {
                log::warn!("Skipping {} in {}: {}", member, name, e);
                report.skipped.push(member);
            }
        }
    }

    log::debug!(
        "Expanded {}: {} images, {} skipped",
        name,
        report.assets.len(),
        report.skipped.len()
    );
    Ok(report)
}

/// Ingest one input file, expanding it if it is an archive
pub async fn load_path(path: impl AsRef<Path>) -> Result<IngestReport> {
    let path = path.as_ref().to_owned();
    let name = display_name(&path);

    if is_archive_file(&name) {
        let bytes = tokio::fs::read(&path).await?;
        return tokio::task::spawn_blocking(move || ingest_archive(&name, bytes)).await?;
    }

    if !is_image_file(&name) {
        return Err(ComposeError::Ingestion {
            name,
            reason: "not a recognized image type".to_string(),
        });
    }

    let bytes = tokio::fs::read(&path).await?;
    let asset = tokio::task::spawn_blocking(move || ingest_bytes(name, bytes)).await??;
    Ok(IngestReport {
        assets: vec![asset],
        skipped: Vec::new(),
    })
}

/// Ingest several inputs. Failures are logged and collected, never returned.
pub async fn load_images(paths: &[impl AsRef<Path>]) -> IngestReport {
    let mut report = IngestReport::default();
    for path in paths {
        let path = path.as_ref();
        match load_path(path).await {
            Ok(mut loaded) => {
                report.assets.append(&mut loaded.assets);
                report.skipped.append(&mut loaded.skipped);
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                report.skipped.push(display_name(path));
            }
        }
    }
    log::info!(
        "Ingested {} images ({} skipped)",
        report.assets.len(),
        report.skipped.len()
    );
    report
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
