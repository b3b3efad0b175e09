pub mod assemble;
pub mod constants;
mod estimate;
pub mod geometry;
pub mod ingest;
pub mod natural;
mod options;
mod preview;
pub mod rotate;
pub mod sequence;
mod types;

pub use assemble::{AssemblyProgress, DocumentOutput, PdfFile, assemble, save_pdf};
pub use estimate::{SizeEstimate, estimate_size, format_bytes};
pub use geometry::{PageGeometry, Rect, Size, effective_size, resolve_page};
pub use ingest::{IngestReport, load_images};
pub use natural::natural_cmp;
pub use options::*;
pub use preview::{PreviewHandle, PreviewId};
pub use rotate::{EncodedRaster, rotate_and_encode};
pub use sequence::{DocumentSnapshot, ImageSequence, MoveDirection, SelectionState, TouchDrag};
pub use types::*;
