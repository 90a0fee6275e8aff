//! Query Cache
//!
//! A small key-value store over the collections fetched from the remote
//! authority: direct patch, exact snapshot/restore for rollback, and
//! predicate-filtered invalidation for refetch.

use std::collections::{HashMap, HashSet};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::domain::{DomainError, DomainResult};

/// Exact pre-mutation state of a set of keys; restoring re-inserts
/// present values and removes keys that were absent
#[derive(Debug, Clone)]
pub struct CacheSnapshot {
    entries: Vec<(String, Option<Value>)>,
}

/// Keyed store of cached collections
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<String, Value>,
    stale: HashSet<String>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Typed read of a cached collection
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.entries
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Write a value for a key, marking it fresh
    pub fn patch(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
        self.stale.remove(key);
    }

    /// Typed write of a collection
    pub fn patch_as<T: Serialize>(&mut self, key: &str, value: &T) -> DomainResult<()> {
        let value = serde_json::to_value(value).map_err(|e| DomainError::Internal(e.to_string()))?;
        self.patch(key, value);
        Ok(())
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        self.stale.remove(key);
    }

    /// Capture the exact state of `keys` for later rollback
    pub fn snapshot(&self, keys: &[&str]) -> CacheSnapshot {
        CacheSnapshot {
            entries: keys
                .iter()
                .map(|key| (key.to_string(), self.entries.get(*key).cloned()))
                .collect(),
        }
    }

    /// Restore a snapshot, discarding whatever was optimistically written
    pub fn restore(&mut self, snapshot: &CacheSnapshot) {
        for (key, value) in &snapshot.entries {
            match value {
                Some(value) => {
                    self.entries.insert(key.clone(), value.clone());
                }
                None => {
                    self.entries.remove(key);
                }
            }
            self.stale.remove(key);
        }
    }

    /// Mark every key matching the predicate as needing a refetch and
    /// return the matched keys
    pub fn invalidate_where<F: Fn(&str) -> bool>(&mut self, pred: F) -> Vec<String> {
        let matched: Vec<String> = self
            .entries
            .keys()
            .filter(|key| pred(key))
            .cloned()
            .collect();
        for key in &matched {
            self.stale.insert(key.clone());
        }
        matched
    }

    pub fn is_stale(&self, key: &str) -> bool {
        self.stale.contains(key)
    }
}
