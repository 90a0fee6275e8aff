//! Drag Session State Machine
//!
//! One gesture at a time: `Idle -> Dragging(kind) -> Idle`. The session
//! owns a live projection of the dragged sequence which it re-splices on
//! every row enter; nothing here performs I/O. Every method degrades to a
//! no-op on invalid input, since pointer-event handlers must never
//! interrupt the event loop with a fault.

use crate::ordering::{diff_sequences, RankChange};

use super::drop_target::{DropTargetResolver, FolderTarget, Point, Rect};
use super::press::PressTracker;

/// What is being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Fragment,
    Folder,
}

/// The single intent a finished drag commits to, if any
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// Batched rank changes for the fragment list
    ReorderFragments(Vec<RankChange>),
    /// Batched rank changes for the folder list
    ReorderFolders(Vec<RankChange>),
    /// The dragged fragment moves to a folder; its rank is untouched
    Reassign {
        fragment_id: String,
        folder_id: Option<String>,
    },
    /// Drag released over the archive zone
    Archive { fragment_id: String },
}

#[derive(Debug)]
struct DragSession {
    kind: DragKind,
    dragged_id: String,
    origin_index: usize,
    /// Pre-drag order, the diff baseline
    snapshot: Vec<String>,
    /// Continuously re-spliced projection of the sequence
    live: Vec<String>,
}

/// Owns the drag gesture from press to drop
#[derive(Debug, Default)]
pub struct DragController {
    press: PressTracker,
    session: Option<DragSession>,
    resolver: DropTargetResolver,
    just_ended: bool,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn kind(&self) -> Option<DragKind> {
        self.session.as_ref().map(|s| s.kind)
    }

    pub fn dragged_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.dragged_id.as_str())
    }

    /// The live projected sequence, while a drag is active
    pub fn live_sequence(&self) -> Option<&[String]> {
        self.session.as_ref().map(|s| s.live.as_slice())
    }

    pub fn drop_target(&self) -> Option<&FolderTarget> {
        self.resolver.current()
    }

    /// Record a pointer-down. Ignored while a session is active: the first
    /// gesture owns the pointer.
    pub fn press(&mut self, kind: DragKind, id: impl Into<String>, at: Point) {
        if self.session.is_some() {
            return;
        }
        self.press.press(kind, id, at);
    }

    /// Pointer moved: returns the press ready to become a session, once
    /// the movement threshold is crossed. The caller supplies the
    /// committed sequence to `begin`.
    pub fn promote_on_move(&mut self, at: Point) -> Option<(DragKind, String)> {
        if self.session.is_some() {
            return None;
        }
        self.press.promote_on_move(at)
    }

    /// Start a session. Rejected (no-op, `false`) if one is already
    /// active or the dragged id is not in the committed sequence.
    pub fn begin(&mut self, kind: DragKind, dragged_id: impl Into<String>, committed: Vec<String>) -> bool {
        if self.session.is_some() {
            log::debug!("drag begin rejected: session already active");
            return false;
        }
        let dragged_id = dragged_id.into();
        let Some(origin_index) = committed.iter().position(|id| *id == dragged_id) else {
            log::debug!("drag begin rejected: {dragged_id} not in sequence");
            return false;
        };

        self.session = Some(DragSession {
            kind,
            dragged_id,
            origin_index,
            live: committed.clone(),
            snapshot: committed,
        });
        if kind == DragKind::Fragment {
            self.resolver.arm();
        }
        true
    }

    /// Pointer entered the row at `target_index`: splice the dragged id
    /// out of the live sequence and back in at the target. Idempotent
    /// under repeated enters at the same index; never loses or
    /// duplicates an id. Entering a row means the pointer is not over a
    /// folder header, so any drop candidate is cleared.
    pub fn enter_row(&mut self, target_index: usize) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        self.resolver.clear();

        let Some(current) = session.live.iter().position(|id| *id == session.dragged_id) else {
            return;
        };
        let target = target_index.min(session.live.len().saturating_sub(1));
        if current == target {
            return;
        }
        let id = session.live.remove(current);
        session.live.insert(target, id);
    }

    /// Pointer entered a folder header: drop-target only, the live order
    /// is untouched. No-op for folder drags (resolver stays disarmed).
    pub fn enter_folder_header(&mut self, target: FolderTarget) {
        if self.session.is_none() {
            return;
        }
        self.resolver.enter_header(target);
    }

    /// Pointer-leave on a folder header, with geometry for the flicker guard
    pub fn leave_folder_header(&mut self, target: &FolderTarget, pointer: Point, header: Rect) {
        self.resolver.leave_header(target, pointer, header);
    }

    /// End the gesture. Two disjoint outcomes: a drop-target folder wins
    /// and discards the live order entirely; otherwise a non-empty diff
    /// becomes a reorder. A no-op drag emits nothing. Always returns to
    /// idle. A release with no session clears any pending press (a click).
    pub fn end(&mut self) -> Option<DragOutcome> {
        let Some(session) = self.session.take() else {
            self.press.release();
            return None;
        };
        let target = self.resolver.take();
        self.resolver.disarm();
        self.just_ended = true;

        if session.kind == DragKind::Fragment {
            if let Some(target) = target {
                return Some(DragOutcome::Reassign {
                    fragment_id: session.dragged_id,
                    folder_id: target.folder_id().map(String::from),
                });
            }
        }

        let changes = diff_sequences(&session.snapshot, &session.live);
        if changes.is_empty() {
            return None;
        }
        Some(match session.kind {
            DragKind::Fragment => DragOutcome::ReorderFragments(changes),
            DragKind::Folder => DragOutcome::ReorderFolders(changes),
        })
    }

    /// End the gesture over the archive zone: the zone intercepts the
    /// drop and the normal diff/reassign logic is skipped. Folder drags
    /// are not archivable and fall back to the normal end.
    pub fn end_in_archive_zone(&mut self) -> Option<DragOutcome> {
        match self.session.as_ref().map(|s| s.kind) {
            Some(DragKind::Fragment) => {
                let session = self.session.take()?;
                self.resolver.disarm();
                self.just_ended = true;
                Some(DragOutcome::Archive {
                    fragment_id: session.dragged_id,
                })
            }
            _ => self.end(),
        }
    }

    /// Origin index of the dragged id in the pre-drag order
    pub fn origin_index(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.origin_index)
    }

    /// One-shot flag to suppress the synthetic click after a drop
    pub fn take_just_ended(&mut self) -> bool {
        std::mem::take(&mut self.just_ended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn dragging(id: &str, ids: &[&str]) -> DragController {
        let mut drag = DragController::new();
        assert!(drag.begin(DragKind::Fragment, id, seq(ids)));
        drag
    }

    #[test]
    fn test_begin_rejects_second_session_of_other_kind() {
        let mut drag = dragging("a", &["a", "b", "c"]);
        assert!(!drag.begin(DragKind::Folder, "F1", seq(&["F1", "F2"])));
        assert_eq!(drag.kind(), Some(DragKind::Fragment));
        assert_eq!(drag.dragged_id(), Some("a"));
    }

    #[test]
    fn test_begin_rejects_unknown_id() {
        let mut drag = DragController::new();
        assert!(!drag.begin(DragKind::Fragment, "ghost", seq(&["a", "b"])));
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_enter_row_splices_without_loss_or_duplication() {
        let mut drag = dragging("a", &["a", "b", "c"]);
        drag.enter_row(2);
        assert_eq!(drag.live_sequence(), Some(seq(&["b", "c", "a"]).as_slice()));
        drag.enter_row(0);
        assert_eq!(drag.live_sequence(), Some(seq(&["a", "b", "c"]).as_slice()));
    }

    #[test]
    fn test_enter_row_is_idempotent() {
        let mut drag = dragging("a", &["a", "b", "c"]);
        drag.enter_row(1);
        let once = drag.live_sequence().unwrap().to_vec();
        drag.enter_row(1);
        drag.enter_row(1);
        assert_eq!(drag.live_sequence(), Some(once.as_slice()));
    }

    #[test]
    fn test_enter_row_clamps_out_of_range_target() {
        let mut drag = dragging("a", &["a", "b", "c"]);
        drag.enter_row(99);
        assert_eq!(drag.live_sequence(), Some(seq(&["b", "c", "a"]).as_slice()));
    }

    #[test]
    fn test_end_emits_reorder_with_all_shifted_ranks() {
        // Scenario A: drag a to index 2 -> [b, c, a], all three shifted
        let mut drag = dragging("a", &["a", "b", "c"]);
        drag.enter_row(2);
        let outcome = drag.end();
        assert_eq!(
            outcome,
            Some(DragOutcome::ReorderFragments(vec![
                RankChange { id: "b".into(), rank: 0 },
                RankChange { id: "c".into(), rank: 1 },
                RankChange { id: "a".into(), rank: 2 },
            ]))
        );
        assert!(!drag.is_dragging());
        assert!(drag.take_just_ended());
        assert!(!drag.take_just_ended());
    }

    #[test]
    fn test_drop_target_wins_and_discards_live_order() {
        // Scenario B: drag c onto folder header F1
        let mut drag = dragging("c", &["a", "b", "c"]);
        drag.enter_folder_header(FolderTarget::Folder("F1".into()));
        let outcome = drag.end();
        assert_eq!(
            outcome,
            Some(DragOutcome::Reassign {
                fragment_id: "c".into(),
                folder_id: Some("F1".into()),
            })
        );
    }

    #[test]
    fn test_reassign_to_uncategorized_header() {
        let mut drag = dragging("c", &["a", "b", "c"]);
        drag.enter_folder_header(FolderTarget::Uncategorized);
        let outcome = drag.end();
        assert_eq!(
            outcome,
            Some(DragOutcome::Reassign {
                fragment_id: "c".into(),
                folder_id: None,
            })
        );
    }

    #[test]
    fn test_row_enter_after_header_clears_drop_target() {
        let mut drag = dragging("c", &["a", "b", "c"]);
        drag.enter_folder_header(FolderTarget::Folder("F1".into()));
        drag.enter_row(0);
        let outcome = drag.end();
        assert!(matches!(outcome, Some(DragOutcome::ReorderFragments(_))));
    }

    #[test]
    fn test_noop_drag_emits_nothing() {
        // Scenario C: release b at its original index
        let mut drag = dragging("b", &["a", "b", "c"]);
        drag.enter_row(1);
        assert_eq!(drag.end(), None);
    }

    #[test]
    fn test_folder_drag_reorders_folder_list() {
        let mut drag = DragController::new();
        assert!(drag.begin(DragKind::Folder, "F1", seq(&["F1", "F2", "F3"])));
        drag.enter_row(2);
        let outcome = drag.end();
        assert_eq!(
            outcome,
            Some(DragOutcome::ReorderFolders(vec![
                RankChange { id: "F2".into(), rank: 0 },
                RankChange { id: "F3".into(), rank: 1 },
                RankChange { id: "F1".into(), rank: 2 },
            ]))
        );
    }

    #[test]
    fn test_folder_drag_never_sets_drop_target() {
        let mut drag = DragController::new();
        assert!(drag.begin(DragKind::Folder, "F1", seq(&["F1", "F2"])));
        drag.enter_folder_header(FolderTarget::Folder("F2".into()));
        assert_eq!(drag.drop_target(), None);
    }

    #[test]
    fn test_archive_zone_intercepts_fragment_drop() {
        let mut drag = dragging("a", &["a", "b", "c"]);
        drag.enter_row(2);
        let outcome = drag.end_in_archive_zone();
        assert_eq!(
            outcome,
            Some(DragOutcome::Archive { fragment_id: "a".into() })
        );
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_archive_zone_falls_back_for_folder_drag() {
        let mut drag = DragController::new();
        assert!(drag.begin(DragKind::Folder, "F1", seq(&["F1", "F2"])));
        drag.enter_row(1);
        let outcome = drag.end_in_archive_zone();
        assert!(matches!(outcome, Some(DragOutcome::ReorderFolders(_))));
    }

    #[test]
    fn test_end_without_session_is_a_noop() {
        let mut drag = DragController::new();
        assert_eq!(drag.end(), None);
        assert!(!drag.take_just_ended());
    }
}
