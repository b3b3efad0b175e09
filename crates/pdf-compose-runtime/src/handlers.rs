use crate::worker::WorkerState;
use crate::{AssetSummary, ComposeUpdate};
use pdf_compose::{DocumentOutput, OutputMode, PreviewId, assemble, estimate_size, load_images};
use std::path::PathBuf;
use tokio::sync::mpsc;

pub async fn handle_add_files(
    paths: Vec<PathBuf>,
    state: &mut WorkerState,
    update_tx: &mpsc::UnboundedSender<ComposeUpdate>,
) {
    if paths.is_empty() {
        return;
    }

    let report = load_images(&paths).await;
    let added = report.assets.len();
    state.sequence.append_batch(report.assets);

    let _ = update_tx.send(ComposeUpdate::FilesAdded {
        added,
        skipped: report.skipped,
    });
}

pub async fn handle_assemble(
    mode: OutputMode,
    output_dir: PathBuf,
    state: &mut WorkerState,
    update_tx: &mpsc::UnboundedSender<ComposeUpdate>,
) {
    let snapshot = state.sequence.snapshot();
    let progress = |p: pdf_compose::AssemblyProgress| {
        let _ = update_tx.send(ComposeUpdate::Progress {
            operation: p.phase,
            current: p.completed,
            total: p.total,
        });
    };

    let output = match assemble(&snapshot, &state.settings, mode, progress).await {
        Ok(output) => output,
        Err(e) => {
            let _ = update_tx.send(ComposeUpdate::Error {
                message: format!("Failed to create PDF: {}", e),
            });
            return;
        }
    };

    match output {
        None => {
            let _ = update_tx.send(ComposeUpdate::Finished);
        }
        Some(DocumentOutput::File(file)) => match file.save(&output_dir).await {
            Ok(path) => {
                let _ = update_tx.send(ComposeUpdate::Saved {
                    path,
                    page_count: file.page_count,
                });
            }
            Err(e) => {
                let _ = update_tx.send(ComposeUpdate::Error {
                    message: format!("Failed to save PDF: {}", e),
                });
            }
        },
        Some(DocumentOutput::Preview(handle)) => {
            let preview_id = handle.id();
            let _ = update_tx.send(ComposeUpdate::PreviewReady {
                preview_id,
                filename: handle.filename().to_string(),
                page_count: handle.page_count(),
            });
            state.previews.insert(preview_id, handle);
        }
    }
}

/// Persist a preview's bytes without assembling again
pub async fn handle_download_preview(
    preview_id: PreviewId,
    output_dir: PathBuf,
    state: &WorkerState,
    update_tx: &mpsc::UnboundedSender<ComposeUpdate>,
) {
    let Some(handle) = state.previews.get(&preview_id) else {
        let _ = update_tx.send(ComposeUpdate::Error {
            message: format!("Unknown preview {}", preview_id.0),
        });
        return;
    };

    match handle.download(&output_dir).await {
        Ok(path) => {
            let _ = update_tx.send(ComposeUpdate::Saved {
                path,
                page_count: handle.page_count(),
            });
        }
        Err(e) => {
            let _ = update_tx.send(ComposeUpdate::Error {
                message: format!("Failed to save PDF: {}", e),
            });
        }
    }
}

pub fn handle_dismiss_preview(
    preview_id: PreviewId,
    state: &mut WorkerState,
    update_tx: &mpsc::UnboundedSender<ComposeUpdate>,
) {
    match state.previews.remove(&preview_id) {
        Some(handle) => {
            handle.revoke();
            let _ = update_tx.send(ComposeUpdate::PreviewDismissed { preview_id });
        }
        None => {
            let _ = update_tx.send(ComposeUpdate::Error {
                message: format!("Unknown preview {}", preview_id.0),
            });
        }
    }
}

pub fn publish_sequence(state: &WorkerState, update_tx: &mpsc::UnboundedSender<ComposeUpdate>) {
    let selection = state.sequence.selection();
    let items = state
        .sequence
        .assets()
        .iter()
        .map(|asset| AssetSummary {
            id: asset.id(),
            name: asset.display_name().to_string(),
            width: asset.original_width(),
            height: asset.original_height(),
            rotation: asset.rotation,
            selected: selection.is_selected(asset.id()),
        })
        .collect();

    let _ = update_tx.send(ComposeUpdate::SequenceChanged {
        version: state.sequence.version(),
        items,
        selecting: selection.is_selecting(),
    });
}

pub fn publish_estimate(state: &WorkerState, update_tx: &mpsc::UnboundedSender<ComposeUpdate>) {
    let estimate = estimate_size(state.sequence.assets(), state.settings.quality);
    let _ = update_tx.send(ComposeUpdate::EstimateChanged { estimate });
}
