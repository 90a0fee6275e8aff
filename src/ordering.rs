//! Fragment Ordering
//!
//! The canonical, strictly-ordered fragment sequence for one view, with
//! dense rank reassignment and minimal reorder diffs. Manual mode is the
//! only mode that participates in drag reordering.

use serde::{Deserialize, Serialize};

use crate::domain::Fragment;

/// Active sort mode for a fragment view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Manual,
    Name,
    Newest,
    Oldest,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Manual => "manual",
            SortMode::Name => "name",
            SortMode::Newest => "newest",
            SortMode::Oldest => "oldest",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "name" => SortMode::Name,
            "newest" => SortMode::Newest,
            "oldest" => SortMode::Oldest,
            _ => SortMode::Manual,
        }
    }
}

/// One changed rank in a reorder mutation payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankChange {
    pub id: String,
    pub rank: i64,
}

/// Minimal positional diff between two id sequences.
///
/// Returns a `RankChange` for exactly the ids whose position changed;
/// empty iff the sequences are equal. Ids present only in `new` are
/// reported at their new position.
pub fn diff_sequences(old: &[String], new: &[String]) -> Vec<RankChange> {
    let mut changes = Vec::new();
    for (rank, id) in new.iter().enumerate() {
        let old_rank = old.iter().position(|o| o == id);
        if old_rank != Some(rank) {
            changes.push(RankChange {
                id: id.clone(),
                rank: rank as i64,
            });
        }
    }
    changes
}

/// Canonical fragment list for one view, sorted by the active mode
#[derive(Debug, Clone, Default)]
pub struct OrderModel {
    fragments: Vec<Fragment>,
    sort: SortMode,
    filtered: bool,
}

impl OrderModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the fragment list (e.g. after an authoritative refetch)
    pub fn set_fragments(&mut self, fragments: Vec<Fragment>) {
        self.fragments = fragments;
        self.resort();
    }

    pub fn set_sort(&mut self, sort: SortMode) {
        self.sort = sort;
        self.resort();
    }

    pub fn sort(&self) -> SortMode {
        self.sort
    }

    /// A live text filter changes index membership underneath a drag, so
    /// dragging is disabled while one is active.
    pub fn set_filtered(&mut self, filtered: bool) {
        self.filtered = filtered;
    }

    /// Dragging is only meaningful in manual, unfiltered mode
    pub fn can_drag(&self) -> bool {
        self.sort == SortMode::Manual && !self.filtered
    }

    /// Fragments in display order
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.fragments.iter().position(|f| f.id == id)
    }

    /// Immutable copy of the current id order, used for diffing and rollback
    pub fn snapshot(&self) -> Vec<String> {
        self.fragments.iter().map(|f| f.id.clone()).collect()
    }

    /// Reassign ranks as dense increasing integers over exactly the ids in
    /// `sequence`; ids not mentioned keep their existing rank. Unknown ids
    /// are ignored rather than raised.
    pub fn apply_reorder(&mut self, sequence: &[String]) {
        for (rank, id) in sequence.iter().enumerate() {
            if let Some(fragment) = self.fragments.iter_mut().find(|f| f.id == *id) {
                fragment.order = rank as i64;
            }
        }
        self.resort();
    }

    /// Drop a fragment from the view (e.g. archived); no-op if absent
    pub fn remove(&mut self, id: &str) {
        self.fragments.retain(|f| f.id != id);
    }

    fn resort(&mut self) {
        match self.sort {
            SortMode::Manual => {
                self.fragments
                    .sort_by(|a, b| (a.order, a.created_at, &a.id).cmp(&(b.order, b.created_at, &b.id)));
            }
            SortMode::Name => {
                self.fragments.sort_by(|a, b| {
                    (a.title.to_lowercase(), &a.id).cmp(&(b.title.to_lowercase(), &b.id))
                });
            }
            SortMode::Newest => {
                self.fragments.sort_by(|a, b| {
                    (b.created_at, &b.id).cmp(&(a.created_at, &a.id))
                });
            }
            SortMode::Oldest => {
                self.fragments
                    .sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
            }
        }
    }
}
