use crate::{ComposeCommand, ComposeUpdate, handlers};
use pdf_compose::{ImageSequence, LayoutSettings, PreviewHandle, PreviewId, TouchDrag};
use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::mpsc;

/// State owned by the worker. Commands are handled one at a time, so an
/// assemble run never observes a half-applied edit.
pub(crate) struct WorkerState {
    pub(crate) sequence: ImageSequence,
    pub(crate) settings: LayoutSettings,
    pub(crate) previews: HashMap<PreviewId, PreviewHandle>,
    pub(crate) touch: Option<TouchDrag>,
}

impl WorkerState {
    fn new() -> Self {
        Self {
            sequence: ImageSequence::new(),
            settings: LayoutSettings::default(),
            previews: HashMap::new(),
            touch: None,
        }
    }
}

/// Async worker task that processes compose commands and sends updates
pub async fn worker_task(
    mut command_rx: mpsc::UnboundedReceiver<ComposeCommand>,
    update_tx: mpsc::UnboundedSender<ComposeUpdate>,
) {
    let mut state = WorkerState::new();
    let mut pending = None;

    loop {
        let cmd = match pending.take() {
            Some(cmd) => cmd,
            None => match command_rx.recv().await {
                Some(cmd) => cmd,
                None => break,
            },
        };
        pending = process_command(cmd, &mut state, &mut command_rx, &update_tx).await;
    }

    for handle in state.previews.values() {
        handle.revoke();
    }
    log::debug!("Compose worker stopped");
}

/// Handle one command. Returns a command that was pulled off the queue
/// while coalescing and still needs handling.
async fn process_command(
    cmd: ComposeCommand,
    state: &mut WorkerState,
    command_rx: &mut mpsc::UnboundedReceiver<ComposeCommand>,
    update_tx: &mpsc::UnboundedSender<ComposeUpdate>,
) -> Option<ComposeCommand> {
    let version = state.sequence.version();
    let quality = state.settings.quality;
    let mut leftover = None;

    let result = match cmd {
        ComposeCommand::AddFiles { paths } => {
            handlers::handle_add_files(paths, state, update_tx).await;
            Ok(())
        }
        ComposeCommand::Reorder { from, to } => state.sequence.reorder(from, to),
        ComposeCommand::DragStart { index } => state.sequence.begin_drag(index),
        ComposeCommand::DragOver { mut index } => {
            // Consecutive moves collapse into one: the dragged image ends at
            // the last index either way
            while let Ok(next_cmd) = command_rx.try_recv() {
                if let ComposeCommand::DragOver { index: newer } = next_cmd {
                    index = newer;
                } else {
                    leftover = Some(next_cmd);
                    break;
                }
            }
            state.sequence.drag_over(index).map(|_| ())
        }
        ComposeCommand::DragEnd => {
            state.sequence.end_drag();
            Ok(())
        }
        ComposeCommand::TouchStart { index } => {
            state.touch = Some(TouchDrag::new(index, Instant::now()));
            Ok(())
        }
        ComposeCommand::TouchEnd { index } => match state.touch.take() {
            Some(touch) => touch
                .release(&mut state.sequence, index, Instant::now())
                .map(|_| ()),
            None => Ok(()),
        },
        ComposeCommand::Move { index, direction } => {
            state.sequence.move_step(index, direction).map(|_| ())
        }
        ComposeCommand::EnterSelection => {
            state.sequence.enter_selection_mode();
            Ok(())
        }
        ComposeCommand::ExitSelection => {
            state.sequence.exit_selection_mode();
            Ok(())
        }
        ComposeCommand::ToggleSelect { id } => state.sequence.toggle_select(id).map(|_| ()),
        ComposeCommand::SelectAll => {
            state.sequence.select_all();
            Ok(())
        }
        ComposeCommand::DeselectAll => {
            state.sequence.deselect_all();
            Ok(())
        }
        ComposeCommand::DeleteSelected => {
            let removed = state.sequence.delete_selected();
            log::info!("Deleted {} selected images", removed);
            Ok(())
        }
        ComposeCommand::RotateSelected => {
            state.sequence.rotate_selected();
            Ok(())
        }
        ComposeCommand::Remove { id } => state.sequence.remove(id).map(|_| ()),
        ComposeCommand::Rotate { id } => state.sequence.rotate(id).map(|_| ()),
        ComposeCommand::UpdateSettings { settings } => match settings.validate() {
            Ok(()) => {
                state.settings = settings;
                Ok(())
            }
            Err(e) => Err(e),
        },
        ComposeCommand::Assemble { mode, output_dir } => {
            handlers::handle_assemble(mode, output_dir, state, update_tx).await;
            Ok(())
        }
        ComposeCommand::DownloadPreview {
            preview_id,
            output_dir,
        } => {
            handlers::handle_download_preview(preview_id, output_dir, state, update_tx).await;
            Ok(())
        }
        ComposeCommand::DismissPreview { preview_id } => {
            handlers::handle_dismiss_preview(preview_id, state, update_tx);
            Ok(())
        }
    };

    if let Err(e) = result {
        let _ = update_tx.send(ComposeUpdate::Error {
            message: e.to_string(),
        });
    }

    let sequence_changed = state.sequence.version() != version;
    if sequence_changed {
        handlers::publish_sequence(state, update_tx);
    }
    if sequence_changed || state.settings.quality != quality {
        handlers::publish_estimate(state, update_tx);
    }

    leftover
}
