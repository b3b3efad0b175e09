use image::DynamicImage;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposeError {
    /// A single input could not be turned into an asset. Batches skip these.
    #[error("Cannot ingest {name}: {reason}")]
    Ingestion { name: String, reason: String },
    /// Raster data could not be materialized during a run
    #[error("Cannot decode {name}: {reason}")]
    Decode { name: String, reason: String },
    /// Geometry or encode failure inside a run
    #[error("Assembly failed: {0}")]
    Assembly(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Index {index} out of bounds for {len} images")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("No image with id {0}")]
    UnknownAsset(AssetId),
    #[error("Preview has been revoked")]
    PreviewRevoked,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ComposeError>;

/// Page orientation for standard page sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Orientation {
    /// Portrait: height > width
    #[default]
    Portrait,
    /// Landscape: width > height
    Landscape,
}

/// Standard page sizes used when images are not kept at their own size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PageSize {
    #[default]
    A4,
    A3,
    Letter,
    Legal,
}

impl PageSize {
    /// Get base dimensions (always portrait)
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::A3 => (297.0, 420.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Legal => (215.9, 355.6),
        }
    }

    /// Get dimensions with orientation applied
    pub fn dimensions_with_orientation(self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PageSize::A4 => "A4",
            PageSize::A3 => "A3",
            PageSize::Letter => "Letter",
            PageSize::Legal => "Legal",
        }
    }
}

/// Clockwise rotation applied to an image before it is placed on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl Rotation {
    pub fn degrees(self) -> u32 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 90,
            Rotation::Clockwise180 => 180,
            Rotation::Clockwise270 => 270,
        }
    }

    /// Parse a multiple of 90 degrees; any other value is rejected.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::None),
            90 => Some(Rotation::Clockwise90),
            180 => Some(Rotation::Clockwise180),
            270 => Some(Rotation::Clockwise270),
            _ => None,
        }
    }

    /// The next quarter turn, wrapping 270 back to 0
    pub fn quarter_turn(self) -> Self {
        match self {
            Rotation::None => Rotation::Clockwise90,
            Rotation::Clockwise90 => Rotation::Clockwise180,
            Rotation::Clockwise180 => Rotation::Clockwise270,
            Rotation::Clockwise270 => Rotation::None,
        }
    }

    /// Whether width and height trade places under this rotation
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Clockwise90 | Rotation::Clockwise270)
    }
}

static NEXT_ASSET_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an asset, unique for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub u64);

impl AssetId {
    pub fn next() -> Self {
        AssetId(NEXT_ASSET_ID.fetch_add(1, Ordering::SeqCst))
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shared, read-only reference to an asset's pixel data.
///
/// Ingestion keeps the encoded source bytes and defers decoding to the
/// assembly run; callers that already hold pixels can wrap them directly.
/// Cloning is cheap.
#[derive(Clone)]
pub enum RasterHandle {
    Encoded(Arc<[u8]>),
    Decoded(Arc<DynamicImage>),
}

impl RasterHandle {
    pub fn from_encoded(bytes: impl Into<Arc<[u8]>>) -> Self {
        RasterHandle::Encoded(bytes.into())
    }

    pub fn from_image(image: DynamicImage) -> Self {
        RasterHandle::Decoded(Arc::new(image))
    }

    /// Materialize the pixels. `name` is only used for error reporting.
    pub fn decode(&self, name: &str) -> Result<Arc<DynamicImage>> {
        match self {
            RasterHandle::Decoded(image) => Ok(Arc::clone(image)),
            RasterHandle::Encoded(bytes) => image::load_from_memory(bytes)
                .map(Arc::new)
                .map_err(|e| ComposeError::Decode {
                    name: name.to_string(),
                    reason: e.to_string(),
                }),
        }
    }
}

impl std::fmt::Debug for RasterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RasterHandle::Encoded(bytes) => write!(f, "Encoded({} bytes)", bytes.len()),
            RasterHandle::Decoded(image) => {
                write!(f, "Decoded({}x{})", image.width(), image.height())
            }
        }
    }
}

/// One ingested image staged for the output document
#[derive(Debug, Clone)]
pub struct ImageAsset {
    id: AssetId,
    raster: RasterHandle,
    original_width: u32,
    original_height: u32,
    display_name: String,
    source_byte_size: usize,
    /// Mutable through the sequence's rotate operations
    pub rotation: Rotation,
}

impl ImageAsset {
    /// Create an asset with a fresh id. Zero dimensions are rejected.
    pub fn new(
        display_name: impl Into<String>,
        raster: RasterHandle,
        original_width: u32,
        original_height: u32,
        source_byte_size: usize,
    ) -> Result<Self> {
        let display_name = display_name.into();
        if original_width == 0 || original_height == 0 {
            return Err(ComposeError::Ingestion {
                name: display_name,
                reason: format!("invalid dimensions {original_width}x{original_height}"),
            });
        }
        Ok(Self {
            id: AssetId::next(),
            raster,
            original_width,
            original_height,
            display_name,
            source_byte_size,
            rotation: Rotation::None,
        })
    }

    /// Wrap already-decoded pixels
    pub fn from_image(display_name: impl Into<String>, image: DynamicImage) -> Result<Self> {
        let (width, height) = (image.width(), image.height());
        let byte_size = image.as_bytes().len();
        Self::new(
            display_name,
            RasterHandle::from_image(image),
            width,
            height,
            byte_size,
        )
    }

    pub fn id(&self) -> AssetId {
        self.id
    }

    pub fn raster(&self) -> &RasterHandle {
        &self.raster
    }

    pub fn original_width(&self) -> u32 {
        self.original_width
    }

    pub fn original_height(&self) -> u32 {
        self.original_height
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn source_byte_size(&self) -> usize {
        self.source_byte_size
    }

    /// Pixel dimensions after the current rotation is applied
    pub fn effective_size(&self) -> (u32, u32) {
        crate::geometry::effective_size(self.original_width, self.original_height, self.rotation)
    }

    pub fn pixel_count(&self) -> u64 {
        self.original_width as u64 * self.original_height as u64
    }
}
