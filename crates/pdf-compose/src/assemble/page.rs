//! Page construction on top of printpdf

use crate::constants::mm_to_pt;
use crate::geometry::PageGeometry;
use crate::rotate::EncodedRaster;
use crate::types::*;
use image::ImageFormat;
use printpdf::{
    ImageCompression, ImageOptimizationOptions, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions,
    PdfWarnMsg, Pt, RawImage, RawImageData, RawImageFormat, XObjectTransform,
};

/// A re-encoded image converted to the pixel layout printpdf embeds
pub(crate) struct PreparedImage {
    raw: RawImage,
    width_px: u32,
    height_px: u32,
}

impl PreparedImage {
    pub(crate) fn from_encoded(encoded: &EncodedRaster) -> Result<Self> {
        let decoded = image::load_from_memory_with_format(&encoded.bytes, ImageFormat::Jpeg)
            .map_err(|e| ComposeError::Assembly(format!("re-encoded image unreadable: {}", e)))?;
        let rgb = decoded.to_rgb8();
        let (width_px, height_px) = rgb.dimensions();

        let raw = RawImage {
            pixels: RawImageData::U8(rgb.into_raw()),
            width: width_px as usize,
            height: height_px as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };

        Ok(Self {
            raw,
            width_px,
            height_px,
        })
    }
}

/// Accumulates pages in append order
pub(crate) struct PageBuilder {
    doc: PdfDocument,
    dpi: f32,
    quality: f32,
}

impl PageBuilder {
    pub(crate) fn new(title: &str, dpi: u32, quality: f32) -> Self {
        Self {
            doc: PdfDocument::new(title),
            dpi: dpi as f32,
            quality,
        }
    }

    pub(crate) fn page_count(&self) -> usize {
        self.doc.pages.len()
    }

    /// Add one page sized and filled as `geometry` describes
    pub(crate) fn append(&mut self, image: PreparedImage, geometry: &PageGeometry) {
        let xobject_id = self.doc.add_image(&image.raw);

        // Natural size of the image at the configured resolution
        let natural_w_pt = image.width_px as f32 * 72.0 / self.dpi;
        let natural_h_pt = image.height_px as f32 * 72.0 / self.dpi;

        let placement = geometry.placement;
        let scale_x = mm_to_pt(placement.width) / natural_w_pt;
        let scale_y = mm_to_pt(placement.height) / natural_h_pt;

        let ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(mm_to_pt(placement.x))),
                translate_y: Some(Pt(mm_to_pt(placement.bottom_offset(geometry.page.height)))),
                scale_x: Some(scale_x),
                scale_y: Some(scale_y),
                dpi: Some(self.dpi),
                rotate: None,
            },
        }];

        self.doc.pages.push(PdfPage::new(
            Mm(geometry.page.width),
            Mm(geometry.page.height),
            ops,
        ));
    }

    /// Serialize the document
    pub(crate) fn finish(self) -> Vec<u8> {
        log::debug!("Serializing {} pages", self.page_count());
        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = self.doc.save(&save_options(self.quality), &mut warnings);
        if !warnings.is_empty() {
            log::debug!("PDF serialization produced {} warnings", warnings.len());
        }
        bytes
    }
}

/// Embed images at full resolution as JPEG at `quality`. printpdf's defaults
/// would downscale anything over 2MB and pick their own compression.
fn save_options(quality: f32) -> PdfSaveOptions {
    PdfSaveOptions {
        image_optimization: Some(ImageOptimizationOptions {
            quality: Some(quality),
            max_image_size: None,
            dither_greyscale: None,
            convert_to_greyscale: Some(false),
            auto_optimize: Some(false),
            format: Some(ImageCompression::Jpeg),
        }),
        ..Default::default()
    }
}
