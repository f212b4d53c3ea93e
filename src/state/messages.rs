use courtside_model::loader::{Snapshot, SnapshotError, SnapshotKind};
use crossterm::event::KeyEvent;

/// Sent by the watcher and refresher tasks; applied to `App` by the UI loop only.
#[derive(Debug)]
pub enum WatchEvent {
    SnapshotLoaded(Snapshot),
    /// The file changed but could not be used; it may still be mid-write.
    SnapshotUnavailable { kind: SnapshotKind, error: SnapshotError },
    RefreshTick,
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
}
