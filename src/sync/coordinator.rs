//! Optimistic Sync Coordinator
//!
//! Applies each mutation to the local cache immediately, then settles it
//! against the remote authority: success refreshes the affected
//! collections, failure restores the exact pre-mutation snapshot.
//!
//! Mutations are not serialized per collection: a drag may commit while a
//! previous mutation is still in flight, and its snapshot is taken from
//! the already-optimistic state. If an early mutation fails after a later
//! one succeeded, the rollback also discards the later change until the
//! next authoritative refresh. Accepted tradeoff in exchange for
//! zero-latency sequential drags.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{DomainResult, Folder, Fragment};
use crate::intent::MutationIntent;
use crate::ordering::RankChange;

use super::cache::QueryCache;
use super::remote::RemoteStore;

/// Cache keys for the synced collections
pub mod keys {
    pub const FRAGMENTS: &str = "fragments";
    pub const FOLDERS: &str = "folders";
    pub const ASSIGNMENTS: &str = "assignments";
}

/// Coordinates the local cache with the remote authority
pub struct SyncCoordinator {
    remote: Arc<dyn RemoteStore>,
    cache: Arc<Mutex<QueryCache>>,
}

impl SyncCoordinator {
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            remote,
            cache: Arc::new(Mutex::new(QueryCache::new())),
        }
    }

    pub fn cache(&self) -> Arc<Mutex<QueryCache>> {
        Arc::clone(&self.cache)
    }

    /// Fetch all collections from the remote authority into the cache
    pub async fn refresh_all(&self) -> DomainResult<()> {
        self.refetch(&[keys::FRAGMENTS, keys::FOLDERS, keys::ASSIGNMENTS])
            .await
    }

    /// Cached fragment list (empty if never fetched)
    pub async fn fragments(&self) -> Vec<Fragment> {
        self.cache.lock().await.get_as(keys::FRAGMENTS).unwrap_or_default()
    }

    /// Cached folder list (empty if never fetched)
    pub async fn folders(&self) -> Vec<Folder> {
        self.cache.lock().await.get_as(keys::FOLDERS).unwrap_or_default()
    }

    /// Cached assignment map (empty if never fetched)
    pub async fn assignments(&self) -> HashMap<String, String> {
        self.cache.lock().await.get_as(keys::ASSIGNMENTS).unwrap_or_default()
    }

    /// Dispatch one outbound intent to the matching mutation
    pub async fn apply(&self, intent: MutationIntent) -> DomainResult<()> {
        match intent {
            MutationIntent::ReorderFragments { changes } => self.reorder_fragments(&changes).await,
            MutationIntent::ReorderFolders { changes } => self.reorder_folders(&changes).await,
            MutationIntent::Reassign { fragment_id, folder_id } => {
                self.reassign_fragment(&fragment_id, folder_id.as_deref()).await
            }
            MutationIntent::Archive { fragment_id } => self.archive_fragment(&fragment_id).await,
            MutationIntent::CreateFolder { name } => self.create_folder(&name).await.map(|_| ()),
            MutationIntent::RenameFolder { folder_id, name } => {
                self.rename_folder(&folder_id, &name).await
            }
            MutationIntent::DeleteFolder { folder_id } => self.delete_folder(&folder_id).await,
        }
    }

    /// Persist a batched fragment reorder
    pub async fn reorder_fragments(&self, changes: &[RankChange]) -> DomainResult<()> {
        self.run_optimistic(
            &[keys::FRAGMENTS],
            |cache| {
                let mut fragments: Vec<Fragment> =
                    cache.get_as(keys::FRAGMENTS).unwrap_or_default();
                apply_fragment_ranks(&mut fragments, changes);
                cache.patch_as(keys::FRAGMENTS, &fragments)
            },
            self.remote.reorder_fragments(changes),
        )
        .await
    }

    /// Persist a batched folder reorder
    pub async fn reorder_folders(&self, changes: &[RankChange]) -> DomainResult<()> {
        self.run_optimistic(
            &[keys::FOLDERS],
            |cache| {
                let mut folders: Vec<Folder> = cache.get_as(keys::FOLDERS).unwrap_or_default();
                for change in changes {
                    if let Some(folder) = folders.iter_mut().find(|f| f.id == change.id) {
                        folder.order = change.rank;
                    }
                }
                folders.sort_by(|a, b| (a.order, &a.id).cmp(&(b.order, &b.id)));
                cache.patch_as(keys::FOLDERS, &folders)
            },
            self.remote.reorder_folders(changes),
        )
        .await
    }

    /// Move a fragment into a folder (`None` = uncategorized)
    pub async fn reassign_fragment(&self, fragment_id: &str, folder_id: Option<&str>) -> DomainResult<()> {
        self.run_optimistic(
            &[keys::ASSIGNMENTS],
            |cache| {
                let mut assignments: HashMap<String, String> =
                    cache.get_as(keys::ASSIGNMENTS).unwrap_or_default();
                match folder_id {
                    Some(folder_id) => {
                        assignments.insert(fragment_id.to_string(), folder_id.to_string());
                    }
                    None => {
                        assignments.remove(fragment_id);
                    }
                }
                cache.patch_as(keys::ASSIGNMENTS, &assignments)
            },
            self.remote.reassign_fragment(fragment_id, folder_id),
        )
        .await
    }

    /// Archive a fragment, dropping it from the view and its assignment
    pub async fn archive_fragment(&self, fragment_id: &str) -> DomainResult<()> {
        self.run_optimistic(
            &[keys::FRAGMENTS, keys::ASSIGNMENTS],
            |cache| {
                let mut fragments: Vec<Fragment> =
                    cache.get_as(keys::FRAGMENTS).unwrap_or_default();
                fragments.retain(|f| f.id != fragment_id);
                cache.patch_as(keys::FRAGMENTS, &fragments)?;

                let mut assignments: HashMap<String, String> =
                    cache.get_as(keys::ASSIGNMENTS).unwrap_or_default();
                assignments.remove(fragment_id);
                cache.patch_as(keys::ASSIGNMENTS, &assignments)
            },
            self.remote.archive_fragment(fragment_id),
        )
        .await
    }

    /// Create a folder. Not optimistic: the remote assigns id and rank,
    /// so the folder lands in the cache only on success.
    pub async fn create_folder(&self, name: &str) -> DomainResult<Folder> {
        let folder = self.remote.create_folder(name).await?;
        {
            let mut cache = self.cache.lock().await;
            let mut folders: Vec<Folder> = cache.get_as(keys::FOLDERS).unwrap_or_default();
            folders.push(folder.clone());
            folders.sort_by(|a, b| (a.order, &a.id).cmp(&(b.order, &b.id)));
            cache.patch_as(keys::FOLDERS, &folders)?;
        }
        Ok(folder)
    }

    /// Rename a folder
    pub async fn rename_folder(&self, folder_id: &str, name: &str) -> DomainResult<()> {
        let call = self.remote.rename_folder(folder_id, name);
        self.run_optimistic(
            &[keys::FOLDERS],
            |cache| {
                let mut folders: Vec<Folder> = cache.get_as(keys::FOLDERS).unwrap_or_default();
                if let Some(folder) = folders.iter_mut().find(|f| f.id == folder_id) {
                    folder.name = name.to_string();
                }
                cache.patch_as(keys::FOLDERS, &folders)
            },
            async move { call.await.map(|_| ()) },
        )
        .await
    }

    /// Delete a folder; its fragments become uncategorized immediately
    pub async fn delete_folder(&self, folder_id: &str) -> DomainResult<()> {
        self.run_optimistic(
            &[keys::FOLDERS, keys::ASSIGNMENTS],
            |cache| {
                let mut folders: Vec<Folder> = cache.get_as(keys::FOLDERS).unwrap_or_default();
                folders.retain(|f| f.id != folder_id);
                cache.patch_as(keys::FOLDERS, &folders)?;

                let mut assignments: HashMap<String, String> =
                    cache.get_as(keys::ASSIGNMENTS).unwrap_or_default();
                assignments.retain(|_, v| v != folder_id);
                cache.patch_as(keys::ASSIGNMENTS, &assignments)
            },
            self.remote.delete_folder(folder_id),
        )
        .await
    }

    /// The optimistic protocol: snapshot, patch synchronously, settle the
    /// remote call, then refetch (success) or restore (failure). The cache
    /// lock is released before the remote round-trip.
    async fn run_optimistic<P, Fut>(&self, affected: &[&str], patch: P, call: Fut) -> DomainResult<()>
    where
        P: FnOnce(&mut QueryCache) -> DomainResult<()>,
        Fut: Future<Output = DomainResult<()>>,
    {
        let snapshot = {
            let mut cache = self.cache.lock().await;
            let snapshot = cache.snapshot(affected);
            if let Err(err) = patch(&mut cache) {
                cache.restore(&snapshot);
                return Err(err);
            }
            snapshot
        };

        match call.await {
            Ok(()) => {
                if let Err(err) = self.refetch(affected).await {
                    // Mutation persisted; keep the optimistic value and
                    // leave the keys stale for a later refresh
                    log::warn!("refresh after mutation failed: {err}");
                    let mut cache = self.cache.lock().await;
                    for key in affected {
                        cache.invalidate_where(|k| k == *key);
                    }
                }
                Ok(())
            }
            Err(err) => {
                log::warn!("remote mutation failed, rolling back: {err}");
                self.cache.lock().await.restore(&snapshot);
                Err(err)
            }
        }
    }

    /// Refetch the named collections from the remote authority
    async fn refetch(&self, affected: &[&str]) -> DomainResult<()> {
        for key in affected {
            match *key {
                keys::FRAGMENTS => {
                    let fragments = self.remote.fetch_fragments().await?;
                    self.cache.lock().await.patch_as(keys::FRAGMENTS, &fragments)?;
                }
                keys::FOLDERS => {
                    let folders = self.remote.fetch_folders().await?;
                    self.cache.lock().await.patch_as(keys::FOLDERS, &folders)?;
                }
                keys::ASSIGNMENTS => {
                    let assignments = self.remote.fetch_assignments().await?;
                    self.cache.lock().await.patch_as(keys::ASSIGNMENTS, &assignments)?;
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Apply rank changes to a fragment list and restore manual order
fn apply_fragment_ranks(fragments: &mut [Fragment], changes: &[RankChange]) {
    for change in changes {
        if let Some(fragment) = fragments.iter_mut().find(|f| f.id == change.id) {
            fragment.order = change.rank;
        }
    }
    fragments.sort_by(|a, b| (a.order, a.created_at, &a.id).cmp(&(b.order, b.created_at, &b.id)));
}
