//! Ordering and selection engine
//!
//! `ImageSequence` owns the authoritative page order and the selection
//! state. Every mutation bumps a version counter; assembly runs work on a
//! `DocumentSnapshot` taken up front, so later edits never reach a run in
//! flight.
//!
//! - `mod.rs`: order, reorder, neighbor moves, single-asset edits
//! - `selection.rs`: bulk-edit mode and bulk operations
//! - `drag.rs`: pointer and touch drag sessions

mod drag;
mod selection;

pub use drag::{DragSession, TouchDrag};
pub use selection::SelectionState;

use crate::natural::sort_naturally;
use crate::types::*;
use std::sync::Arc;

/// Direction for keyboard/button moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Toward the start of the document
    Backward,
    /// Toward the end of the document
    Forward,
}

/// Move the element at `from` to `to`, shifting the elements in between.
///
/// Panics if either index is out of bounds; `ImageSequence::reorder` checks
/// bounds before calling this.
pub fn reorder<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from == to {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}

/// Immutable view of the document order taken at the start of a run
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    version: u64,
    assets: Arc<[ImageAsset]>,
}

impl DocumentSnapshot {
    pub fn new(assets: impl Into<Arc<[ImageAsset]>>) -> Self {
        Self {
            version: 0,
            assets: assets.into(),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn assets(&self) -> &[ImageAsset] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// The ordered set of images staged for export
#[derive(Debug, Default)]
pub struct ImageSequence {
    assets: Vec<ImageAsset>,
    selection: SelectionState,
    drag: Option<DragSession>,
    version: u64,
}

impl ImageSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assets(&self) -> &[ImageAsset] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Incremented by every mutation
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get(&self, id: AssetId) -> Option<&ImageAsset> {
        self.assets.iter().find(|a| a.id() == id)
    }

    pub fn position(&self, id: AssetId) -> Option<usize> {
        self.assets.iter().position(|a| a.id() == id)
    }

    pub fn ids(&self) -> Vec<AssetId> {
        self.assets.iter().map(ImageAsset::id).collect()
    }

    /// Copy of the current order for an assembly run
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            version: self.version,
            assets: self.assets.clone().into(),
        }
    }

    /// Append a newly ingested batch. The batch is put in natural filename
    /// order among itself; existing images keep their positions.
    pub fn append_batch(&mut self, mut batch: Vec<ImageAsset>) {
        if batch.is_empty() {
            return;
        }
        sort_naturally(&mut batch, |a| a.display_name());
        log::debug!("Appending {} images after {}", batch.len(), self.assets.len());
        self.assets.extend(batch);
        self.touch();
    }

    /// Move the image at `from` to `to`
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from != to {
            reorder(&mut self.assets, from, to);
            self.touch();
        }
        Ok(())
    }

    /// Swap the image at `index` with its neighbor. Returns the new index,
    /// which is unchanged at either end of the sequence.
    pub fn move_step(&mut self, index: usize, direction: MoveDirection) -> Result<usize> {
        self.check_index(index)?;
        let target = match direction {
            MoveDirection::Backward if index > 0 => index - 1,
            MoveDirection::Forward if index + 1 < self.assets.len() => index + 1,
            _ => return Ok(index),
        };
        self.assets.swap(index, target);
        self.touch();
        Ok(target)
    }

    /// Remove one image; it is also dropped from the selection
    pub fn remove(&mut self, id: AssetId) -> Result<ImageAsset> {
        let index = self.position(id).ok_or(ComposeError::UnknownAsset(id))?;
        let removed = self.assets.remove(index);
        self.selection.forget(id);
        self.drag = None;
        self.touch();
        Ok(removed)
    }

    /// Rotate one image a quarter turn clockwise
    pub fn rotate(&mut self, id: AssetId) -> Result<Rotation> {
        let asset = self
            .assets
            .iter_mut()
            .find(|a| a.id() == id)
            .ok_or(ComposeError::UnknownAsset(id))?;
        asset.rotation = asset.rotation.quarter_turn();
        let rotation = asset.rotation;
        self.selection.forget(id);
        self.touch();
        Ok(rotation)
    }

    /// Drop every image
    pub fn clear(&mut self) {
        self.assets.clear();
        self.selection = SelectionState::Idle;
        self.drag = None;
        self.touch();
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.assets.len() {
            Ok(())
        } else {
            Err(ComposeError::IndexOutOfBounds {
                index,
                len: self.assets.len(),
            })
        }
    }

    fn touch(&mut self) {
        self.version += 1;
    }
}
