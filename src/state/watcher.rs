use crate::state::messages::WatchEvent;
use courtside_model::loader::{SnapshotKind, SnapshotLoader};
use log::{debug, error, warn};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, sleep};

/// How long a burst of file events is given to settle before the directory is compared.
const SETTLE: Duration = Duration::from_millis(50);

/// Reports snapshot files whose contents were created or changed since the previous poll.
///
/// Only the five known file names count; everything else in the directory is ignored.
/// Deletions are noted but not reported. Contents are compared byte for byte, so a rewrite
/// that keeps the length and lands in the same mtime tick is still seen.
#[derive(Debug)]
pub struct ChangeDetector {
    data_dir: PathBuf,
    seen: HashMap<SnapshotKind, Vec<u8>>,
    dir_missing: bool,
}

impl ChangeDetector {
    /// Starts from the directory's current contents, so only later changes are reported.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let mut detector = Self {
            data_dir: data_dir.into(),
            seen: HashMap::new(),
            dir_missing: false,
        };
        detector.poll();
        detector
    }

    pub fn poll(&mut self) -> Vec<SnapshotKind> {
        let current = self.scan();
        let mut changed: Vec<SnapshotKind> = current
            .iter()
            .filter(|&(kind, contents)| self.seen.get(kind) != Some(contents))
            .map(|(kind, _)| *kind)
            .collect();
        for kind in self.seen.keys().filter(|kind| !current.contains_key(*kind)) {
            debug!("{kind} was removed");
        }
        changed.sort_by_key(|kind| SnapshotKind::ALL.iter().position(|k| k == kind));
        self.seen = current;
        changed
    }

    fn scan(&mut self) -> HashMap<SnapshotKind, Vec<u8>> {
        let entries = match fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(e) => {
                if !self.dir_missing {
                    warn!("cannot watch {}: {e}", self.data_dir.display());
                    self.dir_missing = true;
                }
                return HashMap::new();
            }
        };
        self.dir_missing = false;

        let mut found = HashMap::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(kind) = SnapshotKind::from_path(&path) else {
                continue;
            };
            if !entry.file_type().is_ok_and(|t| t.is_file()) {
                continue;
            }
            match fs::read(&path) {
                Ok(contents) => {
                    found.insert(kind, contents);
                }
                Err(e) => debug!("skipping {}: {e}", path.display()),
            }
        }
        found
    }
}

/// Loads each changed snapshot and hands the result to the UI loop.
///
/// File-system events wake it as soon as a snapshot is written; the poll interval is the
/// fallback for directories that cannot be watched (or do not exist yet).
pub struct SnapshotWatcher {
    loader: SnapshotLoader,
    detector: ChangeDetector,
    poll_interval: Duration,
    events: mpsc::Sender<WatchEvent>,
    wake_tx: mpsc::Sender<()>,
    wake_rx: mpsc::Receiver<()>,
    fs_watcher: Option<RecommendedWatcher>,
}

impl SnapshotWatcher {
    /// Primes change detection immediately; create this before the initial load so nothing
    /// written in between is missed.
    pub fn new(
        loader: SnapshotLoader,
        poll_interval: Duration,
        events: mpsc::Sender<WatchEvent>,
    ) -> Self {
        let (wake_tx, wake_rx) = mpsc::channel(1);
        let fs_watcher = watch_dir(loader.data_dir(), wake_tx.clone());
        let detector = ChangeDetector::new(loader.data_dir());
        Self {
            loader,
            detector,
            poll_interval,
            events,
            wake_tx,
            wake_rx,
            fs_watcher,
        }
    }

    pub async fn run(mut self) {
        let mut ticks = interval(self.poll_interval);
        ticks.tick().await;

        loop {
            tokio::select! {
                _ = ticks.tick() => {
                    if self.fs_watcher.is_none() {
                        self.fs_watcher = watch_dir(self.loader.data_dir(), self.wake_tx.clone());
                    }
                }

                Some(()) = self.wake_rx.recv() => {
                    sleep(SETTLE).await;
                    while self.wake_rx.try_recv().is_ok() {}
                }
            }

            if !self.publish_changes().await {
                return;
            }
        }
    }

    /// Returns `false` once the UI loop is gone.
    async fn publish_changes(&mut self) -> bool {
        for kind in self.detector.poll() {
            debug!("{kind} changed");
            let event = match self.loader.load(kind) {
                Ok(snapshot) => WatchEvent::SnapshotLoaded(snapshot),
                Err(error) => WatchEvent::SnapshotUnavailable { kind, error },
            };
            if let Err(e) = self.events.send(event).await {
                error!("Failed to send snapshot event: {e}");
                return false;
            }
        }
        true
    }
}

/// Subscribe to create/modify events for snapshot files in `dir`. Each one nudges `wake`;
/// a full channel already has a wake-up pending.
fn watch_dir(dir: &Path, wake: mpsc::Sender<()>) -> Option<RecommendedWatcher> {
    let handler = move |result: notify::Result<notify::Event>| match result {
        Ok(event) if is_snapshot_write(&event) => {
            let _ = wake.try_send(());
        }
        Ok(_) => {}
        Err(e) => warn!("file watch error: {e}"),
    };
    let mut watcher = match notify::recommended_watcher(handler) {
        Ok(watcher) => watcher,
        Err(e) => {
            warn!("file events unavailable, polling only: {e}");
            return None;
        }
    };
    if let Err(e) = watcher.watch(dir, RecursiveMode::NonRecursive) {
        debug!("cannot subscribe to {}: {e}", dir.display());
        return None;
    }
    debug!("watching {} for file events", dir.display());
    Some(watcher)
}

fn is_snapshot_write(event: &notify::Event) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event
            .paths
            .iter()
            .any(|path| SnapshotKind::from_path(path).is_some())
}
