//! Fragment Board
//!
//! Ordered collection and grouping core for an authoring tool: maintains a
//! user-manipulable manual order over fragments, partitions them into
//! folders, and keeps both in sync with a remote authority through an
//! optimistic-update/rollback protocol while a pointer drag is in progress.
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - ordering / grouping: Pure order and bucket computations
//! - drag: Drag session state machine and drop-target resolution
//! - sync: Query cache, remote store abstraction, optimistic coordinator
//! - board: Long-lived controller tying the layers together

pub mod board;
pub mod domain;
pub mod drag;
pub mod grouping;
pub mod intent;
pub mod ordering;
pub mod sync;

pub use board::FragmentBoard;
pub use domain::{DomainError, DomainResult, FolderAssignment, Folder, Fragment, FragmentType};
pub use drag::{DragController, DragKind, DragOutcome, DropTargetResolver, FolderTarget, Point, Rect};
pub use grouping::{group_by_folder, FolderGroup};
pub use intent::MutationIntent;
pub use ordering::{diff_sequences, OrderModel, RankChange, SortMode};
pub use sync::{CacheSnapshot, QueryCache, RemoteStore, SyncCoordinator};
