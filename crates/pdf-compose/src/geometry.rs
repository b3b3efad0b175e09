//! Page geometry resolution
//!
//! Turns an image's effective pixel size and the layout settings into a
//! physical page size and the rectangle the image occupies on it. All
//! lengths are millimeters; rectangles use a top-left origin.

use crate::constants::{PAGE_MARGIN_MM, px_to_mm};
use crate::options::LayoutSettings;
use crate::types::{ComposeError, Result, Rotation};

/// Width and height in millimeters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}

/// Rectangle in millimeters, origin at the top-left of the page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Distance from the bottom edge of a page of the given height, for
    /// output formats whose origin is bottom-left
    pub fn bottom_offset(&self, page_height: f32) -> f32 {
        page_height - self.y - self.height
    }
}

/// Resolved layout of one page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page: Size,
    pub placement: Rect,
}

/// Pixel dimensions after rotation: 90 and 270 swap width and height
pub fn effective_size(width: u32, height: u32, rotation: Rotation) -> (u32, u32) {
    if rotation.swaps_axes() {
        (height, width)
    } else {
        (width, height)
    }
}

/// Resolve page size and image placement for an image of the given
/// effective pixel size.
pub fn resolve_page(effective: (u32, u32), settings: &LayoutSettings) -> Result<PageGeometry> {
    let (width_px, height_px) = effective;
    if width_px == 0 || height_px == 0 {
        return Err(ComposeError::Assembly(format!(
            "cannot place image of size {width_px}x{height_px}"
        )));
    }
    if settings.dpi == 0 {
        return Err(ComposeError::Config("DPI must be positive".to_string()));
    }

    let image = Size::new(
        px_to_mm(width_px, settings.dpi),
        px_to_mm(height_px, settings.dpi),
    );

    if settings.preserve_size {
        // Orientation follows from whichever side is longer
        return Ok(PageGeometry {
            page: image,
            placement: Rect::new(0.0, 0.0, image.width, image.height),
        });
    }

    let (page_w, page_h) = settings
        .page_size
        .dimensions_with_orientation(settings.orientation);
    let available = Size::new(page_w - 2.0 * PAGE_MARGIN_MM, page_h - 2.0 * PAGE_MARGIN_MM);

    let placement = if settings.fit_to_page {
        let ratio = fit_ratio(image, available);
        let width = image.width * ratio;
        let height = image.height * ratio;
        Rect::new((page_w - width) / 2.0, (page_h - height) / 2.0, width, height)
    } else {
        // Stretch to the margin box; aspect ratio is not preserved
        Rect::new(PAGE_MARGIN_MM, PAGE_MARGIN_MM, available.width, available.height)
    };

    Ok(PageGeometry {
        page: Size::new(page_w, page_h),
        placement,
    })
}

/// Largest uniform scale that keeps `image` inside `available`
fn fit_ratio(image: Size, available: Size) -> f32 {
    let width_ratio = available.width / image.width;
    let height_ratio = available.height / image.height;
    width_ratio.min(height_ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_ratio_width_limited() {
        let ratio = fit_ratio(Size::new(200.0, 100.0), Size::new(100.0, 100.0));
        assert!((ratio - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_fit_ratio_height_limited() {
        let ratio = fit_ratio(Size::new(100.0, 400.0), Size::new(100.0, 100.0));
        assert!((ratio - 0.25).abs() < 0.001);
    }

    #[test]
    fn test_fit_ratio_grows_small_images() {
        let ratio = fit_ratio(Size::new(10.0, 10.0), Size::new(100.0, 50.0));
        assert!((ratio - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_bottom_offset() {
        let rect = Rect::new(10.0, 20.0, 50.0, 30.0);
        assert!((rect.bottom_offset(100.0) - 50.0).abs() < 0.001);
    }
}
