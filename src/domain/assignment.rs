//! Fragment-to-Folder Assignment
//!
//! Single-valued relation from fragment id to folder id. Absence of an
//! entry, or an entry pointing at a folder that no longer exists, means
//! "uncategorized".

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::folder::Folder;

/// Maps each fragment to at most one folder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderAssignment {
    entries: HashMap<String, String>,
}

impl FolderAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    /// Assign a fragment to a folder; `None` moves it to uncategorized
    pub fn assign(&mut self, fragment_id: &str, folder_id: Option<String>) {
        match folder_id {
            Some(folder_id) => {
                self.entries.insert(fragment_id.to_string(), folder_id);
            }
            None => {
                self.entries.remove(fragment_id);
            }
        }
    }

    /// Raw folder id for a fragment, without checking the folder exists
    pub fn folder_of(&self, fragment_id: &str) -> Option<&str> {
        self.entries.get(fragment_id).map(String::as_str)
    }

    /// Resolved folder id: orphaned entries fall back to uncategorized
    pub fn resolve(&self, fragment_id: &str, folders: &[Folder]) -> Option<&str> {
        self.folder_of(fragment_id)
            .filter(|folder_id| folders.iter().any(|f| f.id == *folder_id))
    }

    /// Drop every entry pointing at a folder (used when the folder is deleted)
    pub fn remove_folder(&mut self, folder_id: &str) {
        self.entries.retain(|_, v| v != folder_id);
    }

    /// Drop the entry for a fragment (used when the fragment is archived)
    pub fn remove_fragment(&mut self, fragment_id: &str) {
        self.entries.remove(fragment_id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
