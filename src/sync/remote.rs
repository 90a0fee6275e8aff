//! Remote Store Abstraction
//!
//! The remote authority owning fragments, folders and assignments.
//! Implementations can speak any transport; the coordinator only sees
//! this contract. All operations are async.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{DomainResult, Folder, Fragment};
use crate::ordering::RankChange;

/// Read/mutate contract against the remote authority
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Authoritative fragment list
    async fn fetch_fragments(&self) -> DomainResult<Vec<Fragment>>;

    /// Authoritative folder list
    async fn fetch_folders(&self) -> DomainResult<Vec<Folder>>;

    /// Authoritative fragment-to-folder assignment map
    async fn fetch_assignments(&self) -> DomainResult<HashMap<String, String>>;

    /// Persist a batch of fragment rank changes
    async fn reorder_fragments(&self, changes: &[RankChange]) -> DomainResult<()>;

    /// Persist a batch of folder rank changes
    async fn reorder_folders(&self, changes: &[RankChange]) -> DomainResult<()>;

    /// Move a fragment into a folder (`None` = uncategorized)
    async fn reassign_fragment(&self, fragment_id: &str, folder_id: Option<&str>) -> DomainResult<()>;

    /// Archive a fragment (drag-to-archive-zone shortcut)
    async fn archive_fragment(&self, fragment_id: &str) -> DomainResult<()>;

    /// Create a folder; the remote assigns id and rank
    async fn create_folder(&self, name: &str) -> DomainResult<Folder>;

    async fn rename_folder(&self, folder_id: &str, name: &str) -> DomainResult<Folder>;

    /// Delete a folder; fragments inside become uncategorized
    async fn delete_folder(&self, folder_id: &str) -> DomainResult<()>;
}
