//! Rotate-and-re-encode transform applied to each image before placement

use crate::types::{ComposeError, Result, Rotation};
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;

/// A re-encoded raster ready to be embedded in a page
#[derive(Debug, Clone)]
pub struct EncodedRaster {
    /// JPEG bytes
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Map a quality in [0.1, 1.0] onto the encoder's 1-100 scale
pub fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Rotate `image` clockwise by `rotation` and encode it as JPEG at `quality`.
///
/// The rotated surface only lives for the duration of this call. For 90 and
/// 270 degrees the output dimensions are swapped.
pub fn rotate_and_encode(
    image: &DynamicImage,
    rotation: Rotation,
    quality: f32,
) -> Result<EncodedRaster> {
    let rotated = match rotation {
        Rotation::None => image.to_rgb8(),
        Rotation::Clockwise90 => image.rotate90().to_rgb8(),
        Rotation::Clockwise180 => image.rotate180().to_rgb8(),
        Rotation::Clockwise270 => image.rotate270().to_rgb8(),
    };
    let (width, height) = rotated.dimensions();

    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, jpeg_quality(quality));
    DynamicImage::ImageRgb8(rotated)
        .write_with_encoder(encoder)
        .map_err(|e| ComposeError::Assembly(format!("JPEG encoding failed: {}", e)))?;

    log::debug!(
        "Encoded {}x{} raster rotated {}° ({} bytes)",
        width,
        height,
        rotation.degrees(),
        bytes.len()
    );

    Ok(EncodedRaster {
        bytes,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn sample(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, _| {
            if x < width / 2 { Rgb([255, 0, 0]) } else { Rgb([0, 0, 255]) }
        }))
    }

    #[test]
    fn test_quarter_turns_swap_dimensions() {
        let image = sample(40, 20);
        for (rotation, expected) in [
            (Rotation::None, (40, 20)),
            (Rotation::Clockwise90, (20, 40)),
            (Rotation::Clockwise180, (40, 20)),
            (Rotation::Clockwise270, (20, 40)),
        ] {
            let encoded = rotate_and_encode(&image, rotation, 0.9).unwrap();
            assert_eq!((encoded.width, encoded.height), expected);
            let decoded = image::load_from_memory(&encoded.bytes).unwrap();
            assert_eq!((decoded.width(), decoded.height()), expected);
        }
    }

    #[test]
    fn test_rotation_moves_content() {
        // Left half red; after a clockwise quarter turn the red half is on top
        let encoded = rotate_and_encode(&sample(40, 20), Rotation::Clockwise90, 1.0).unwrap();
        let decoded = image::load_from_memory(&encoded.bytes).unwrap().to_rgb8();
        let top = decoded.get_pixel(10, 5);
        let bottom = decoded.get_pixel(10, 35);
        assert!(top[0] > 200 && top[2] < 60);
        assert!(bottom[2] > 200 && bottom[0] < 60);
    }

    #[test]
    fn test_lower_quality_is_not_larger() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(64, 64, |x, y| {
            Rgb([(x * 4) as u8, (y * 4) as u8, ((x + y) * 2) as u8])
        }));
        let high = rotate_and_encode(&image, Rotation::None, 1.0).unwrap();
        let low = rotate_and_encode(&image, Rotation::None, 0.1).unwrap();
        assert!(low.bytes.len() <= high.bytes.len());
    }

    #[test]
    fn test_jpeg_quality_mapping() {
        assert_eq!(jpeg_quality(0.92), 92);
        assert_eq!(jpeg_quality(0.1), 10);
        assert_eq!(jpeg_quality(1.0), 100);
        assert_eq!(jpeg_quality(0.0), 1);
    }
}
