//! Shared constants for page composition
//!
//! This module centralizes magic numbers used by the geometry resolver,
//! the size estimator and the ordering engine.

use std::time::Duration;

// =============================================================================
// Unit Conversion
// =============================================================================

/// Millimeters per inch
pub const MM_PER_INCH: f32 = 25.4;

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / MM_PER_INCH; // ≈ 2.83465

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Convert a pixel length to millimeters at the given resolution
#[inline]
pub fn px_to_mm(px: u32, dpi: u32) -> f32 {
    px as f32 * MM_PER_INCH / dpi as f32
}

// =============================================================================
// Layout
// =============================================================================

/// Margin on every side of a standard-size page
pub const PAGE_MARGIN_MM: f32 = 10.0;

/// Default resolution used to turn pixels into physical length
pub const DEFAULT_DPI: u32 = 300;

/// Default re-encode quality
pub const DEFAULT_QUALITY: f32 = 0.92;

/// Accepted range for the re-encode quality
pub const MIN_QUALITY: f32 = 0.1;
pub const MAX_QUALITY: f32 = 1.0;

/// Default output file stem
pub const DEFAULT_FILENAME_BASE: &str = "converted-images";

/// Output file extension
pub const PDF_EXTENSION: &str = "pdf";

// =============================================================================
// Size Estimation
// =============================================================================

/// Estimated encoded bytes per pixel at quality 1.0
pub const ESTIMATE_BYTES_PER_PIXEL: f64 = 0.5;

/// Fixed cost of a page object, its content stream and image dictionary
pub const ESTIMATE_PAGE_OVERHEAD_BYTES: u64 = 512;

/// Fixed cost of the document header, catalog, page tree and trailer
pub const ESTIMATE_BASE_OVERHEAD_BYTES: u64 = 1024;

// =============================================================================
// Input
// =============================================================================

/// Contact time before a touch turns into a drag
pub const TOUCH_HOLD_DURATION: Duration = Duration::from_millis(300);

/// Extensions recognized as images (compared case-insensitively)
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "svg"];

/// Extension of archives that are expanded during ingestion
pub const ARCHIVE_EXTENSION: &str = "zip";
