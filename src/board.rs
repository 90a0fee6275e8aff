//! Fragment Board Controller
//!
//! The long-lived object a view component owns: canonical order model,
//! folder list, assignment map, the just-created-folder marker and the
//! drag controller, all behind a pointer-event-facing surface. Every
//! method is total; invalid input degrades to a no-op instead of a fault.

use std::collections::HashMap;

use crate::domain::{Folder, FolderAssignment, Fragment};
use crate::drag::{DragController, DragKind, DragOutcome, FolderTarget, Point, Rect};
use crate::grouping::{group_by_folder, FolderGroup};
use crate::intent::MutationIntent;
use crate::ordering::{OrderModel, SortMode};

/// Controller for one fragment view and its folder sidebar
#[derive(Debug, Default)]
pub struct FragmentBoard {
    order: OrderModel,
    folders: Vec<Folder>,
    assignment: FolderAssignment,
    just_created: Option<String>,
    drag: DragController,
}

impl FragmentBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the board's read replica with freshly fetched state
    pub fn load(
        &mut self,
        fragments: Vec<Fragment>,
        folders: Vec<Folder>,
        assignments: HashMap<String, String>,
    ) {
        self.order.set_fragments(fragments);
        self.folders = folders;
        self.sort_folders();
        self.assignment = FolderAssignment::from_entries(assignments);
    }

    pub fn set_sort(&mut self, sort: SortMode) {
        self.order.set_sort(sort);
    }

    pub fn set_filtered(&mut self, filtered: bool) {
        self.order.set_filtered(filtered);
    }

    pub fn order(&self) -> &OrderModel {
        &self.order
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn assignment(&self) -> &FolderAssignment {
        &self.assignment
    }

    pub fn just_created(&self) -> Option<&str> {
        self.just_created.as_deref()
    }

    /// Committed folder list, in sidebar order
    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    /// Fragments as they should render right now: the live drag
    /// projection while a fragment drag is active, the committed order
    /// otherwise
    pub fn visible_fragments(&self) -> Vec<Fragment> {
        match (self.drag.kind(), self.drag.live_sequence()) {
            (Some(DragKind::Fragment), Some(live)) => project(self.order.fragments(), live),
            _ => self.order.fragments().to_vec(),
        }
    }

    /// Folders as they should render right now (live projection during a
    /// folder drag)
    pub fn visible_folders(&self) -> Vec<Folder> {
        match (self.drag.kind(), self.drag.live_sequence()) {
            (Some(DragKind::Folder), Some(live)) => project(&self.folders, live),
            _ => self.folders.clone(),
        }
    }

    /// Grouped view for rendering; folders carry projected ranks during a
    /// folder drag so buckets follow the live order
    pub fn groups(&self) -> Vec<FolderGroup> {
        let fragments = self.visible_fragments();
        let mut folders = self.visible_folders();
        for (rank, folder) in folders.iter_mut().enumerate() {
            folder.order = rank as i64;
        }
        group_by_folder(&fragments, &folders, &self.assignment, self.just_created.as_deref())
    }

    // ------------------------------------------------------------------
    // Pointer events
    // ------------------------------------------------------------------

    /// Pointer-down on a fragment row or folder header. Fragment presses
    /// are ignored unless the view is in manual, unfiltered mode.
    pub fn pointer_down(&mut self, kind: DragKind, id: impl Into<String>, at: Point) {
        if kind == DragKind::Fragment && !self.order.can_drag() {
            return;
        }
        self.drag.press(kind, id, at);
    }

    /// Pointer moved: promotes a pending press into a drag session once
    /// the click-vs-drag threshold is crossed
    pub fn pointer_move(&mut self, at: Point) {
        let Some((kind, id)) = self.drag.promote_on_move(at) else {
            return;
        };
        match kind {
            DragKind::Fragment => {
                if self.order.can_drag() {
                    self.drag.begin(kind, id, self.order.snapshot());
                }
            }
            DragKind::Folder => {
                let committed = self.folders.iter().map(|f| f.id.clone()).collect();
                self.drag.begin(kind, id, committed);
            }
        }
    }

    /// Pointer entered the row at `index` in the active drag's list
    pub fn enter_row(&mut self, index: usize) {
        self.drag.enter_row(index);
    }

    /// Pointer entered a folder header (fragment drags only)
    pub fn enter_folder_header(&mut self, target: FolderTarget) {
        self.drag.enter_folder_header(target);
    }

    /// Pointer-leave on a folder header, with the header's rectangle for
    /// the flicker guard
    pub fn leave_folder_header(&mut self, target: &FolderTarget, pointer: Point, header: Rect) {
        self.drag.leave_folder_header(target, pointer, header);
    }

    /// Pointer released: commits the gesture. Applies the outcome to the
    /// local models immediately and returns the intent to dispatch
    /// through the sync coordinator, if the drag changed anything.
    pub fn pointer_up(&mut self) -> Option<MutationIntent> {
        let live = self.drag.live_sequence().map(<[String]>::to_vec);
        let outcome = self.drag.end()?;
        self.apply_outcome(&outcome, live.as_deref());
        Some(outcome.into())
    }

    /// Pointer released over the archive zone: the destructive shortcut
    pub fn pointer_up_in_archive_zone(&mut self) -> Option<MutationIntent> {
        let live = self.drag.live_sequence().map(<[String]>::to_vec);
        let outcome = self.drag.end_in_archive_zone()?;
        self.apply_outcome(&outcome, live.as_deref());
        Some(outcome.into())
    }

    /// One-shot flag to suppress the synthetic click after a drop
    pub fn take_just_ended(&mut self) -> bool {
        self.drag.take_just_ended()
    }

    // ------------------------------------------------------------------
    // Folder CRUD bookkeeping
    // ------------------------------------------------------------------

    /// A folder was created remotely: show it even while empty
    pub fn folder_created(&mut self, folder: Folder) {
        self.just_created = Some(folder.id.clone());
        self.folders.push(folder);
        self.sort_folders();
    }

    pub fn folder_renamed(&mut self, folder_id: &str, name: &str) {
        if let Some(folder) = self.folders.iter_mut().find(|f| f.id == folder_id) {
            folder.name = name.to_string();
        }
    }

    /// Remove a folder; its fragments become uncategorized
    pub fn folder_deleted(&mut self, folder_id: &str) {
        self.folders.retain(|f| f.id != folder_id);
        self.assignment.remove_folder(folder_id);
        if self.just_created.as_deref() == Some(folder_id) {
            self.just_created = None;
        }
    }

    fn apply_outcome(&mut self, outcome: &DragOutcome, live: Option<&[String]>) {
        match outcome {
            DragOutcome::ReorderFragments(_) => {
                if let Some(live) = live {
                    self.order.apply_reorder(live);
                }
            }
            DragOutcome::ReorderFolders(_) => {
                if let Some(live) = live {
                    for (rank, id) in live.iter().enumerate() {
                        if let Some(folder) = self.folders.iter_mut().find(|f| f.id == *id) {
                            folder.order = rank as i64;
                        }
                    }
                    self.sort_folders();
                }
            }
            DragOutcome::Reassign { fragment_id, folder_id } => {
                self.assignment.assign(fragment_id, folder_id.clone());
                // The just-created folder has served its purpose once
                // anything lands in it
                if folder_id.is_some() && *folder_id == self.just_created {
                    self.just_created = None;
                }
            }
            DragOutcome::Archive { fragment_id } => {
                self.order.remove(fragment_id);
                self.assignment.remove_fragment(fragment_id);
            }
        }
    }

    fn sort_folders(&mut self) {
        self.folders.sort_by(|a, b| (a.order, &a.id).cmp(&(b.order, &b.id)));
    }
}

/// Reorder `entries` to follow the id sequence in `live`; entries missing
/// from `live` keep their relative position at the end
fn project<T: Clone + crate::domain::Entity<Id = String>>(entries: &[T], live: &[String]) -> Vec<T> {
    let mut projected = Vec::with_capacity(entries.len());
    for id in live {
        if let Some(entry) = entries.iter().find(|e| e.id() == id) {
            projected.push(entry.clone());
        }
    }
    for entry in entries {
        if !live.contains(entry.id()) {
            projected.push(entry.clone());
        }
    }
    projected
}
