//! Drag Layer
//!
//! The ephemeral state covering one pointer-down-to-pointer-up gesture:
//! click-vs-drag press tracking, the drag session state machine with its
//! live sequence projection, and folder-header drop-target resolution.

mod drop_target;
mod press;
mod session;

pub use drop_target::{DropTargetResolver, FolderTarget, Point, Rect};
pub use press::{PressTracker, DRAG_THRESHOLD_PX};
pub use session::{DragController, DragKind, DragOutcome};
