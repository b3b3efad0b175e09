//! Drag-to-reorder sessions
//!
//! Pointer drags reorder continuously while the pointer moves so the visible
//! order always matches the pending drop. Touch drags only engage after a
//! sustained hold and apply a single reorder on release.

use super::ImageSequence;
use crate::constants::TOUCH_HOLD_DURATION;
use crate::types::*;
use std::time::{Duration, Instant};

/// An active pointer drag. Tracks the dragged image by its current index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSession {
    pub index: usize,
}

/// A touch gesture that may become a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchDrag {
    start_index: usize,
    started_at: Instant,
    hold: Duration,
}

impl TouchDrag {
    pub fn new(start_index: usize, started_at: Instant) -> Self {
        Self::with_hold(start_index, started_at, TOUCH_HOLD_DURATION)
    }

    pub fn with_hold(start_index: usize, started_at: Instant, hold: Duration) -> Self {
        Self {
            start_index,
            started_at,
            hold,
        }
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// Whether contact has lasted long enough to count as a drag
    pub fn is_active(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started_at) >= self.hold
    }

    /// Finish the gesture over `release_index`. A short contact is a tap or
    /// scroll and leaves the order alone. Returns whether the order changed.
    pub fn release(
        self,
        sequence: &mut ImageSequence,
        release_index: usize,
        now: Instant,
    ) -> Result<bool> {
        if !self.is_active(now) || release_index == self.start_index {
            return Ok(false);
        }
        sequence.reorder(self.start_index, release_index)?;
        Ok(true)
    }
}

impl ImageSequence {
    pub fn drag_session(&self) -> Option<DragSession> {
        self.drag
    }

    /// Start a pointer drag on the image at `index`
    pub fn begin_drag(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.drag = Some(DragSession { index });
        Ok(())
    }

    /// The pointer is over `index`. Moves the dragged image there right away
    /// and keeps following it. Returns whether the order changed.
    pub fn drag_over(&mut self, index: usize) -> Result<bool> {
        let Some(session) = self.drag else {
            return Ok(false);
        };
        if session.index == index {
            return Ok(false);
        }
        self.reorder(session.index, index)?;
        self.drag = Some(DragSession { index });
        Ok(true)
    }

    /// Drop or cancel the pointer drag; the order stays as last shown
    pub fn end_drag(&mut self) {
        self.drag = None;
    }
}
