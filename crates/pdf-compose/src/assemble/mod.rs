//! Document assembly - one page per image, in document order
//!
//! For each image of the snapshot, in order:
//! 1. Decode and rotate/re-encode it on a blocking thread
//! 2. Resolve page size and placement
//! 3. Report progress
//!
//! The prepared pages are then written into one document, in the same order,
//! on a blocking thread. A failure on any image aborts the run before
//! anything is produced.

mod io;
mod page;

pub use io::save_pdf;

use crate::geometry::resolve_page;
use crate::options::{LayoutSettings, OutputMode};
use crate::preview::PreviewHandle;
use crate::rotate::rotate_and_encode;
use crate::sequence::DocumentSnapshot;
use crate::types::*;
use page::{PageBuilder, PreparedImage};
use std::path::{Path, PathBuf};

/// Progress of a run, reported after every page
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyProgress {
    /// Human-readable phase, e.g. "Processing image 3 of 10..."
    pub phase: String,
    pub completed: usize,
    pub total: usize,
}

impl AssemblyProgress {
    /// Completion in whole percent, 0-100
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.completed.min(self.total) * 100) / self.total) as u8
    }
}

/// A finished document ready to be written
#[derive(Debug, Clone)]
pub struct PdfFile {
    pub filename: String,
    pub page_count: usize,
    pub bytes: Vec<u8>,
}

impl PdfFile {
    /// Write the document to `dir/<filename>`
    pub async fn save(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(&self.filename);
        save_pdf(&self.bytes, &path).await?;
        Ok(path)
    }
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub enum DocumentOutput {
    File(PdfFile),
    Preview(PreviewHandle),
}

impl DocumentOutput {
    pub fn page_count(&self) -> usize {
        match self {
            DocumentOutput::File(file) => file.page_count,
            DocumentOutput::Preview(handle) => handle.page_count(),
        }
    }

    pub fn filename(&self) -> &str {
        match self {
            DocumentOutput::File(file) => &file.filename,
            DocumentOutput::Preview(handle) => handle.filename(),
        }
    }
}

/// Assemble the snapshot into a document.
///
/// Returns `Ok(None)` for an empty snapshot. In `Preview` mode nothing is
/// written; the returned handle holds the bytes until revoked.
pub async fn assemble<F>(
    snapshot: &DocumentSnapshot,
    settings: &LayoutSettings,
    mode: OutputMode,
    mut on_progress: F,
) -> Result<Option<DocumentOutput>>
where
    F: FnMut(AssemblyProgress) + Send,
{
    let total = snapshot.len();
    if total == 0 {
        log::debug!("Nothing to assemble");
        return Ok(None);
    }

    settings.validate()?;

    log::info!(
        "Assembling {} pages ({}, {:?})",
        total,
        layout_label(settings),
        mode
    );

    let mut pages = Vec::with_capacity(total);

    for (index, asset) in snapshot.assets().iter().enumerate() {
        let prepared = prepare(asset, settings.quality).await?;
        let geometry = resolve_page(asset.effective_size(), settings)?;

        log::debug!(
            "Page {} from {}: {:.1}x{:.1}mm",
            index + 1,
            asset.display_name(),
            geometry.page.width,
            geometry.page.height
        );

        pages.push((prepared, geometry));
        on_progress(AssemblyProgress {
            phase: format!("Processing image {} of {}...", index + 1, total),
            completed: index + 1,
            total,
        });
    }

    on_progress(AssemblyProgress {
        phase: "Saving PDF...".to_string(),
        completed: total,
        total,
    });

    let page_count = pages.len();
    let title = settings.filename_base.clone();
    let (dpi, quality) = (settings.dpi, settings.quality);
    let bytes = tokio::task::spawn_blocking(move || {
        let mut builder = PageBuilder::new(&title, dpi, quality);
        for (prepared, geometry) in pages {
            builder.append(prepared, &geometry);
        }
        builder.finish()
    })
    .await?;
    let filename = settings.output_filename();

    log::info!("Assembled {} ({} pages, {} bytes)", filename, page_count, bytes.len());

    let output = match mode {
        OutputMode::Persist => DocumentOutput::File(PdfFile {
            filename,
            page_count,
            bytes,
        }),
        OutputMode::Preview => {
            DocumentOutput::Preview(PreviewHandle::new(filename, page_count, bytes))
        }
    };
    Ok(Some(output))
}

/// Decode, rotate and re-encode one image off the async executor
async fn prepare(asset: &ImageAsset, quality: f32) -> Result<PreparedImage> {
    let asset = asset.clone();
    tokio::task::spawn_blocking(move || {
        let image = asset.raster().decode(asset.display_name())?;
        let encoded = rotate_and_encode(&image, asset.rotation, quality)?;
        PreparedImage::from_encoded(&encoded)
    })
    .await?
}

fn layout_label(settings: &LayoutSettings) -> String {
    if settings.preserve_size {
        format!("original size at {} dpi", settings.dpi)
    } else {
        format!(
            "{} {:?}, {}",
            settings.page_size.name(),
            settings.orientation,
            if settings.fit_to_page { "fit" } else { "fill" }
        )
    }
}
