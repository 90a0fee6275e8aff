//! Sync Layer
//!
//! Keyed query cache, the remote authority abstraction, and the
//! optimistic-update/rollback coordinator sitting between them.

mod cache;
mod coordinator;
mod remote;

#[cfg(test)]
mod tests;

pub use cache::{CacheSnapshot, QueryCache};
pub use coordinator::{keys, SyncCoordinator};
pub use remote::RemoteStore;
