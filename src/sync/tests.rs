//! Sync Integration Tests
//!
//! Exercises the optimistic coordinator against an in-memory fake remote
//! that can be told to fail or stall specific operations.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::domain::{DomainError, DomainResult, Folder, Fragment, FragmentType};
use crate::intent::MutationIntent;
use crate::ordering::RankChange;
use crate::sync::{RemoteStore, SyncCoordinator};

#[derive(Default)]
struct FakeState {
    fragments: Vec<Fragment>,
    folders: Vec<Folder>,
    assignments: HashMap<String, String>,
    next_folder_id: u32,
}

/// In-memory remote with per-operation failure injection
#[derive(Default)]
struct FakeRemote {
    state: Mutex<FakeState>,
    failing: Mutex<HashSet<String>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeRemote {
    fn new(fragments: Vec<Fragment>, folders: Vec<Folder>) -> Self {
        let remote = Self::default();
        {
            let mut state = remote.state.lock().unwrap();
            state.next_folder_id = folders.len() as u32;
            state.fragments = fragments;
            state.folders = folders;
        }
        remote
    }

    /// Make the next call to `op` fail with a transient error
    fn fail_next(&self, op: &str) {
        self.failing.lock().unwrap().insert(op.to_string());
    }

    /// Hold every failing call until the returned handle is notified
    fn gate_failures(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Arc::clone(&notify));
        notify
    }

    async fn check_failure(&self, op: &str) -> DomainResult<()> {
        let failing = self.failing.lock().unwrap().remove(op);
        if !failing {
            return Ok(());
        }
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Err(DomainError::Remote(format!("{op} refused")))
    }
}

#[async_trait]
impl RemoteStore for FakeRemote {
    async fn fetch_fragments(&self) -> DomainResult<Vec<Fragment>> {
        self.check_failure("fetch_fragments").await?;
        Ok(self.state.lock().unwrap().fragments.clone())
    }

    async fn fetch_folders(&self) -> DomainResult<Vec<Folder>> {
        self.check_failure("fetch_folders").await?;
        Ok(self.state.lock().unwrap().folders.clone())
    }

    async fn fetch_assignments(&self) -> DomainResult<HashMap<String, String>> {
        self.check_failure("fetch_assignments").await?;
        Ok(self.state.lock().unwrap().assignments.clone())
    }

    async fn reorder_fragments(&self, changes: &[RankChange]) -> DomainResult<()> {
        self.check_failure("reorder_fragments").await?;
        let mut state = self.state.lock().unwrap();
        for change in changes {
            if let Some(fragment) = state.fragments.iter_mut().find(|f| f.id == change.id) {
                fragment.order = change.rank;
            }
        }
        state
            .fragments
            .sort_by(|a, b| (a.order, a.created_at, &a.id).cmp(&(b.order, b.created_at, &b.id)));
        Ok(())
    }

    async fn reorder_folders(&self, changes: &[RankChange]) -> DomainResult<()> {
        self.check_failure("reorder_folders").await?;
        let mut state = self.state.lock().unwrap();
        for change in changes {
            if let Some(folder) = state.folders.iter_mut().find(|f| f.id == change.id) {
                folder.order = change.rank;
            }
        }
        state.folders.sort_by(|a, b| (a.order, &a.id).cmp(&(b.order, &b.id)));
        Ok(())
    }

    async fn reassign_fragment(&self, fragment_id: &str, folder_id: Option<&str>) -> DomainResult<()> {
        self.check_failure("reassign_fragment").await?;
        let mut state = self.state.lock().unwrap();
        match folder_id {
            Some(folder_id) => {
                state
                    .assignments
                    .insert(fragment_id.to_string(), folder_id.to_string());
            }
            None => {
                state.assignments.remove(fragment_id);
            }
        }
        Ok(())
    }

    async fn archive_fragment(&self, fragment_id: &str) -> DomainResult<()> {
        self.check_failure("archive_fragment").await?;
        let mut state = self.state.lock().unwrap();
        state.fragments.retain(|f| f.id != fragment_id);
        state.assignments.remove(fragment_id);
        Ok(())
    }

    async fn create_folder(&self, name: &str) -> DomainResult<Folder> {
        self.check_failure("create_folder").await?;
        let mut state = self.state.lock().unwrap();
        state.next_folder_id += 1;
        let order = state.folders.len() as i64;
        let folder = Folder::new(format!("F{}", state.next_folder_id), name, order);
        state.folders.push(folder.clone());
        Ok(folder)
    }

    async fn rename_folder(&self, folder_id: &str, name: &str) -> DomainResult<Folder> {
        self.check_failure("rename_folder").await?;
        let mut state = self.state.lock().unwrap();
        let folder = state
            .folders
            .iter_mut()
            .find(|f| f.id == folder_id)
            .ok_or_else(|| DomainError::NotFound(format!("Folder {folder_id} not found")))?;
        folder.name = name.to_string();
        Ok(folder.clone())
    }

    async fn delete_folder(&self, folder_id: &str) -> DomainResult<()> {
        self.check_failure("delete_folder").await?;
        let mut state = self.state.lock().unwrap();
        state.folders.retain(|f| f.id != folder_id);
        state.assignments.retain(|_, v| v != folder_id);
        Ok(())
    }
}

fn fragment(id: &str, order: i64) -> Fragment {
    Fragment::with_order(id, id.to_uppercase(), FragmentType::Note, order)
}

fn seeded() -> (Arc<FakeRemote>, SyncCoordinator) {
    let remote = Arc::new(FakeRemote::new(
        vec![fragment("a", 0), fragment("b", 1), fragment("c", 2)],
        vec![Folder::new("F1", "Characters", 0), Folder::new("F2", "Places", 1)],
    ));
    let coordinator = SyncCoordinator::new(Arc::clone(&remote) as Arc<dyn RemoteStore>);
    (remote, coordinator)
}

fn ids(fragments: &[Fragment]) -> Vec<&str> {
    fragments.iter().map(|f| f.id.as_str()).collect()
}

#[tokio::test]
async fn test_refresh_all_populates_cache() {
    let (_, coordinator) = seeded();
    coordinator.refresh_all().await.expect("refresh failed");

    assert_eq!(ids(&coordinator.fragments().await), vec!["a", "b", "c"]);
    assert_eq!(coordinator.folders().await.len(), 2);
    assert!(coordinator.assignments().await.is_empty());
}

#[tokio::test]
async fn test_reorder_success_settles_to_authoritative_order() {
    let (_, coordinator) = seeded();
    coordinator.refresh_all().await.unwrap();

    let changes = vec![
        RankChange { id: "b".into(), rank: 0 },
        RankChange { id: "c".into(), rank: 1 },
        RankChange { id: "a".into(), rank: 2 },
    ];
    coordinator.reorder_fragments(&changes).await.expect("reorder failed");

    assert_eq!(ids(&coordinator.fragments().await), vec!["b", "c", "a"]);
}

#[tokio::test]
async fn test_reorder_failure_rolls_back_cache() {
    // Scenario D: the optimistic write is discarded on remote failure
    let (remote, coordinator) = seeded();
    coordinator.refresh_all().await.unwrap();

    remote.fail_next("reorder_fragments");
    let changes = vec![
        RankChange { id: "b".into(), rank: 0 },
        RankChange { id: "c".into(), rank: 1 },
        RankChange { id: "a".into(), rank: 2 },
    ];
    let result = coordinator.reorder_fragments(&changes).await;
    assert!(matches!(result, Err(DomainError::Remote(_))));

    assert_eq!(ids(&coordinator.fragments().await), vec!["a", "b", "c"]);
    // The remote never applied it either
    assert_eq!(ids(&remote.state.lock().unwrap().fragments), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_reassign_success_and_failure() {
    let (remote, coordinator) = seeded();
    coordinator.refresh_all().await.unwrap();

    coordinator.reassign_fragment("a", Some("F1")).await.unwrap();
    assert_eq!(coordinator.assignments().await.get("a").map(String::as_str), Some("F1"));

    remote.fail_next("reassign_fragment");
    let result = coordinator.reassign_fragment("b", Some("F2")).await;
    assert!(result.is_err());
    assert!(!coordinator.assignments().await.contains_key("b"));
}

#[tokio::test]
async fn test_archive_drops_fragment_and_assignment() {
    let (_, coordinator) = seeded();
    coordinator.refresh_all().await.unwrap();
    coordinator.reassign_fragment("b", Some("F1")).await.unwrap();

    coordinator.archive_fragment("b").await.unwrap();
    assert_eq!(ids(&coordinator.fragments().await), vec!["a", "c"]);
    assert!(!coordinator.assignments().await.contains_key("b"));
}

#[tokio::test]
async fn test_delete_folder_uncategorizes_fragments() {
    let (_, coordinator) = seeded();
    coordinator.refresh_all().await.unwrap();
    coordinator.reassign_fragment("a", Some("F1")).await.unwrap();
    coordinator.reassign_fragment("b", Some("F2")).await.unwrap();

    coordinator.delete_folder("F1").await.unwrap();
    assert!(!coordinator.assignments().await.contains_key("a"));
    assert_eq!(coordinator.assignments().await.get("b").map(String::as_str), Some("F2"));
    assert!(coordinator.folders().await.iter().all(|f| f.id != "F1"));
}

#[tokio::test]
async fn test_create_and_rename_folder() {
    let (remote, coordinator) = seeded();
    coordinator.refresh_all().await.unwrap();

    let folder = coordinator.create_folder("Drafts").await.unwrap();
    assert!(coordinator.folders().await.iter().any(|f| f.id == folder.id));

    coordinator.rename_folder(&folder.id, "Sketches").await.unwrap();
    let folders = coordinator.folders().await;
    let renamed = folders.iter().find(|f| f.id == folder.id).unwrap();
    assert_eq!(renamed.name, "Sketches");

    // Rename failure restores the old name
    remote.fail_next("rename_folder");
    assert!(coordinator.rename_folder(&folder.id, "Junk").await.is_err());
    let folders = coordinator.folders().await;
    assert_eq!(folders.iter().find(|f| f.id == folder.id).unwrap().name, "Sketches");
}

#[tokio::test]
async fn test_apply_dispatches_intents() {
    let (_, coordinator) = seeded();
    coordinator.refresh_all().await.unwrap();

    coordinator
        .apply(MutationIntent::Reassign {
            fragment_id: "c".into(),
            folder_id: Some("F2".into()),
        })
        .await
        .unwrap();
    assert_eq!(coordinator.assignments().await.get("c").map(String::as_str), Some("F2"));

    coordinator
        .apply(MutationIntent::Archive { fragment_id: "c".into() })
        .await
        .unwrap();
    assert_eq!(ids(&coordinator.fragments().await), vec!["a", "b"]);
}

#[tokio::test]
async fn test_second_mutation_snapshots_from_optimistic_state() {
    // An early failure's rollback also discards a later mutation's
    // successful change until the next authoritative refresh; sequential
    // drags deliberately do not wait for the network.
    let (remote, coordinator) = seeded();
    let coordinator = Arc::new(coordinator);
    coordinator.refresh_all().await.unwrap();

    remote.fail_next("reorder_fragments");
    let release = remote.gate_failures();

    let first = {
        let coordinator = Arc::clone(&coordinator);
        let changes = vec![
            RankChange { id: "b".into(), rank: 0 },
            RankChange { id: "c".into(), rank: 1 },
            RankChange { id: "a".into(), rank: 2 },
        ];
        tokio::spawn(async move { coordinator.reorder_fragments(&changes).await })
    };

    // Wait for the first mutation's optimistic write to land
    while ids(&coordinator.fragments().await) != vec!["b", "c", "a"] {
        tokio::task::yield_now().await;
    }

    // Second drag commits while the first is still in flight; its
    // snapshot includes the first mutation's optimistic state
    let changes = vec![
        RankChange { id: "c".into(), rank: 0 },
        RankChange { id: "b".into(), rank: 1 },
        RankChange { id: "a".into(), rank: 2 },
    ];
    coordinator.reorder_fragments(&changes).await.unwrap();
    assert_eq!(ids(&coordinator.fragments().await), vec!["c", "b", "a"]);

    // Now the first mutation fails: its rollback restores the pre-first
    // snapshot, discarding the second, already-persisted change locally
    release.notify_one();
    let result = first.await.expect("task panicked");
    assert!(matches!(result, Err(DomainError::Remote(_))));
    assert_eq!(ids(&coordinator.fragments().await), vec!["a", "b", "c"]);

    // An authoritative refresh converges back to the remote's truth,
    // where only the second mutation was persisted
    coordinator.refresh_all().await.unwrap();
    assert_eq!(ids(&coordinator.fragments().await), vec!["c", "b", "a"]);
}
