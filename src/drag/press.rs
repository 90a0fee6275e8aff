//! Press Tracking
//!
//! Distinguishes a click from a drag using a movement threshold: a
//! pointer-down only records a pending press, and the drag session starts
//! once the pointer has moved far enough on either axis.

use super::drop_target::Point;
use super::session::DragKind;

/// Movement threshold in pixels to start dragging
pub const DRAG_THRESHOLD_PX: f64 = 5.0;

#[derive(Debug, Clone)]
struct PendingPress {
    kind: DragKind,
    id: String,
    at: Point,
}

/// Pending pointer-down state preceding a drag session
#[derive(Debug, Default)]
pub struct PressTracker {
    pending: Option<PendingPress>,
}

impl PressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pointer-down; replaces any stale pending press
    pub fn press(&mut self, kind: DragKind, id: impl Into<String>, at: Point) {
        self.pending = Some(PendingPress {
            kind,
            id: id.into(),
            at,
        });
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Pointer moved: returns the press to promote into a drag session
    /// once movement exceeds the threshold, consuming the pending state.
    pub fn promote_on_move(&mut self, at: Point) -> Option<(DragKind, String)> {
        let pending = self.pending.as_ref()?;
        let dx = (at.x - pending.at.x).abs();
        let dy = (at.y - pending.at.y).abs();
        if dx > DRAG_THRESHOLD_PX || dy > DRAG_THRESHOLD_PX {
            self.pending.take().map(|p| (p.kind, p.id))
        } else {
            None
        }
    }

    /// Pointer released before the threshold: a plain click
    pub fn release(&mut self) -> bool {
        self.pending.take().is_some()
    }
}
