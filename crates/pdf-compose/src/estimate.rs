use crate::constants::*;
use crate::types::ImageAsset;

/// Advisory prediction of the output size. Not an exact figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizeEstimate {
    /// Predicted output size in bytes
    pub estimated_bytes: u64,
    /// Combined size of the encoded sources
    pub source_bytes: u64,
    /// Number of pages the output will have
    pub pages: usize,
}

impl SizeEstimate {
    /// Estimated size formatted for display, e.g. "1.4 MB"
    pub fn display(&self) -> String {
        format_bytes(self.estimated_bytes)
    }
}

/// Estimate output size for the given images at `quality`
pub fn estimate_size(assets: &[ImageAsset], quality: f32) -> SizeEstimate {
    let quality = quality.max(0.0) as f64;

    let mut estimated_bytes = ESTIMATE_BASE_OVERHEAD_BYTES;
    let mut source_bytes = 0;
    for asset in assets {
        let pixels = asset.pixel_count() as f64;
        estimated_bytes += (pixels * ESTIMATE_BYTES_PER_PIXEL * quality).round() as u64;
        estimated_bytes += ESTIMATE_PAGE_OVERHEAD_BYTES;
        source_bytes += asset.source_byte_size() as u64;
    }

    SizeEstimate {
        estimated_bytes,
        source_bytes,
        pages: assets.len(),
    }
}

/// Format a byte count with binary units
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
