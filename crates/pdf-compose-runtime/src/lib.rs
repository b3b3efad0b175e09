use std::path::PathBuf;

mod handlers;
mod worker;

pub use worker::worker_task;

// Re-export types from the library crate
pub use pdf_compose::{
    AssetId, LayoutSettings, MoveDirection, OutputMode, PreviewId, Rotation, SizeEstimate,
};

/// Commands sent from the UI to the worker
#[derive(Debug)]
pub enum ComposeCommand {
    /// Ingest files and archives, appending them as one batch
    AddFiles {
        paths: Vec<PathBuf>,
    },
    Reorder {
        from: usize,
        to: usize,
    },
    DragStart {
        index: usize,
    },
    /// Pointer moved over `index` while dragging
    DragOver {
        index: usize,
    },
    DragEnd,
    TouchStart {
        index: usize,
    },
    /// Touch released over `index`
    TouchEnd {
        index: usize,
    },
    Move {
        index: usize,
        direction: MoveDirection,
    },
    EnterSelection,
    ExitSelection,
    ToggleSelect {
        id: AssetId,
    },
    SelectAll,
    DeselectAll,
    DeleteSelected,
    RotateSelected,
    Remove {
        id: AssetId,
    },
    Rotate {
        id: AssetId,
    },
    UpdateSettings {
        settings: LayoutSettings,
    },
    /// Assemble the current order. Persisted files go to `output_dir`.
    Assemble {
        mode: OutputMode,
        output_dir: PathBuf,
    },
    DownloadPreview {
        preview_id: PreviewId,
        output_dir: PathBuf,
    },
    DismissPreview {
        preview_id: PreviewId,
    },
}

/// Summary of one image for display
#[derive(Debug, Clone, PartialEq)]
pub struct AssetSummary {
    pub id: AssetId,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub rotation: Rotation,
    pub selected: bool,
}

/// Updates sent from the worker to the UI
#[derive(Debug, Clone)]
pub enum ComposeUpdate {
    Progress {
        operation: String,
        current: usize,
        total: usize,
    },
    FilesAdded {
        added: usize,
        skipped: Vec<String>,
    },
    SequenceChanged {
        version: u64,
        items: Vec<AssetSummary>,
        selecting: bool,
    },
    EstimateChanged {
        estimate: SizeEstimate,
    },
    Saved {
        path: PathBuf,
        page_count: usize,
    },
    PreviewReady {
        preview_id: PreviewId,
        filename: String,
        page_count: usize,
    },
    PreviewDismissed {
        preview_id: PreviewId,
    },
    /// An assemble request finished without output (empty document)
    Finished,
    Error {
        message: String,
    },
}
