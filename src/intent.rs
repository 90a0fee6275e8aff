//! Outbound Mutation Intents
//!
//! Each variant corresponds to exactly one remote mutation call. The
//! drag layer emits the first four; folder CRUD completes the grouping
//! surface.

use serde::{Deserialize, Serialize};

use crate::drag::DragOutcome;
use crate::ordering::RankChange;

/// One remote mutation, as emitted by the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MutationIntent {
    ReorderFragments {
        changes: Vec<RankChange>,
    },
    ReorderFolders {
        changes: Vec<RankChange>,
    },
    Reassign {
        #[serde(rename = "fragmentId")]
        fragment_id: String,
        #[serde(rename = "folderId")]
        folder_id: Option<String>,
    },
    Archive {
        #[serde(rename = "fragmentId")]
        fragment_id: String,
    },
    CreateFolder {
        name: String,
    },
    RenameFolder {
        #[serde(rename = "folderId")]
        folder_id: String,
        name: String,
    },
    DeleteFolder {
        #[serde(rename = "folderId")]
        folder_id: String,
    },
}

impl From<DragOutcome> for MutationIntent {
    fn from(outcome: DragOutcome) -> Self {
        match outcome {
            DragOutcome::ReorderFragments(changes) => MutationIntent::ReorderFragments { changes },
            DragOutcome::ReorderFolders(changes) => MutationIntent::ReorderFolders { changes },
            DragOutcome::Reassign { fragment_id, folder_id } => {
                MutationIntent::Reassign { fragment_id, folder_id }
            }
            DragOutcome::Archive { fragment_id } => MutationIntent::Archive { fragment_id },
        }
    }
}
