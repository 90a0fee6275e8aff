//! Folder Grouping
//!
//! Pure bucket computation: partitions an ordered fragment list into
//! folder groups plus the implicit "uncategorized" bucket. No hidden
//! state; identical input produces identical output.

use crate::domain::{Folder, FolderAssignment, Fragment};

/// One rendered group: a folder (or `None` for uncategorized) and the
/// fragments inside it, in view order
#[derive(Debug, Clone, PartialEq)]
pub struct FolderGroup {
    pub folder: Option<Folder>,
    pub fragments: Vec<Fragment>,
}

/// Bucket `fragments` by resolved folder assignment.
///
/// Folders are emitted in `(order, id)` order; pass a pre-projected slice
/// to render a live folder drag. Empty folders are dropped, except a
/// just-created one (kept visible to serve as a drop target). The
/// uncategorized bucket comes last and is included whenever it is
/// non-empty or at least one other group is shown.
pub fn group_by_folder(
    fragments: &[Fragment],
    folders: &[Folder],
    assignment: &FolderAssignment,
    just_created: Option<&str>,
) -> Vec<FolderGroup> {
    let mut ordered_folders: Vec<&Folder> = folders.iter().collect();
    ordered_folders.sort_by(|a, b| (a.order, &a.id).cmp(&(b.order, &b.id)));

    let mut uncategorized = Vec::new();
    let mut buckets: Vec<Vec<Fragment>> = vec![Vec::new(); ordered_folders.len()];

    for fragment in fragments {
        match assignment.resolve(&fragment.id, folders) {
            Some(folder_id) => {
                // resolve() guarantees the folder exists
                if let Some(ix) = ordered_folders.iter().position(|f| f.id == folder_id) {
                    buckets[ix].push(fragment.clone());
                }
            }
            None => uncategorized.push(fragment.clone()),
        }
    }

    let mut groups = Vec::new();
    for (ix, folder) in ordered_folders.iter().enumerate() {
        let bucket = std::mem::take(&mut buckets[ix]);
        if bucket.is_empty() && just_created != Some(folder.id.as_str()) {
            continue;
        }
        groups.push(FolderGroup {
            folder: Some((*folder).clone()),
            fragments: bucket,
        });
    }

    if !uncategorized.is_empty() || !groups.is_empty() {
        groups.push(FolderGroup {
            folder: None,
            fragments: uncategorized,
        });
    }

    groups
}
