//! Bulk-edit mode and bulk operations

use super::ImageSequence;
use crate::types::*;
use std::collections::HashSet;

/// Selection exists only while bulk-edit mode is active
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SelectionState {
    #[default]
    Idle,
    Selecting(HashSet<AssetId>),
}

impl SelectionState {
    pub fn is_selecting(&self) -> bool {
        matches!(self, SelectionState::Selecting(_))
    }

    pub fn is_selected(&self, id: AssetId) -> bool {
        match self {
            SelectionState::Idle => false,
            SelectionState::Selecting(ids) => ids.contains(&id),
        }
    }

    pub fn count(&self) -> usize {
        match self {
            SelectionState::Idle => 0,
            SelectionState::Selecting(ids) => ids.len(),
        }
    }

    pub(super) fn forget(&mut self, id: AssetId) {
        if let SelectionState::Selecting(ids) = self {
            ids.remove(&id);
        }
    }

    fn ids_mut(&mut self) -> &mut HashSet<AssetId> {
        if let SelectionState::Idle = self {
            *self = SelectionState::Selecting(HashSet::new());
        }
        match self {
            SelectionState::Selecting(ids) => ids,
            SelectionState::Idle => unreachable!("selection mode was just entered"),
        }
    }
}

impl ImageSequence {
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Ids of selected images in document order
    pub fn selected_ids(&self) -> Vec<AssetId> {
        self.assets
            .iter()
            .map(ImageAsset::id)
            .filter(|id| self.selection.is_selected(*id))
            .collect()
    }

    pub fn enter_selection_mode(&mut self) {
        if !self.selection.is_selecting() {
            self.selection = SelectionState::Selecting(HashSet::new());
            self.touch();
        }
    }

    /// Leave bulk-edit mode, discarding the selection
    pub fn exit_selection_mode(&mut self) {
        if self.selection.is_selecting() {
            self.selection = SelectionState::Idle;
            self.touch();
        }
    }

    /// Flip one image's membership. Enters selection mode if needed.
    /// Returns whether the image is selected afterwards.
    pub fn toggle_select(&mut self, id: AssetId) -> Result<bool> {
        if self.get(id).is_none() {
            return Err(ComposeError::UnknownAsset(id));
        }
        let ids = self.selection.ids_mut();
        let selected = if ids.remove(&id) {
            false
        } else {
            ids.insert(id);
            true
        };
        self.touch();
        Ok(selected)
    }

    /// Select every image, or clear the selection if everything already is
    pub fn select_all(&mut self) {
        let all: HashSet<AssetId> = self.assets.iter().map(ImageAsset::id).collect();
        let ids = self.selection.ids_mut();
        if !all.is_empty() && *ids == all {
            ids.clear();
        } else {
            *ids = all;
        }
        self.touch();
    }

    /// Clear the selection without leaving selection mode
    pub fn deselect_all(&mut self) {
        if let SelectionState::Selecting(ids) = &mut self.selection {
            if !ids.is_empty() {
                ids.clear();
                self.touch();
            }
        }
    }

    /// Remove every selected image, keeping the survivors' relative order,
    /// then leave selection mode. Returns how many images were removed.
    pub fn delete_selected(&mut self) -> usize {
        let selection = std::mem::take(&mut self.selection);
        let before = self.assets.len();
        self.assets.retain(|a| !selection.is_selected(a.id()));
        let removed = before - self.assets.len();
        self.drag = None;
        self.touch();
        removed
    }

    /// Rotate every selected image a quarter turn. Order and selection are
    /// left as they are. Returns how many images were rotated.
    pub fn rotate_selected(&mut self) -> usize {
        let mut rotated = 0;
        for asset in &mut self.assets {
            if self.selection.is_selected(asset.id()) {
                asset.rotation = asset.rotation.quarter_turn();
                rotated += 1;
            }
        }
        if rotated > 0 {
            self.touch();
        }
        rotated
    }
}
