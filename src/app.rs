use crate::scene::Scene;
use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use crate::state::messages::WatchEvent;
use chrono::{DateTime, Local};
use courtside_model::loader::{Snapshot, SnapshotError, SnapshotKind, SnapshotLoader};
use log::{debug, info, warn};

/// Process-wide context: settings plus everything the watch loop and renderers share.
pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        log::set_max_level(settings.log_level);
        tui_logger::set_default_level(settings.log_level);

        let loader = SnapshotLoader::new(&settings.data_dir);
        info!("loading snapshots from {}", loader.data_dir().display());
        let state = AppState::new(loader.load_all());

        Self { settings, state }
    }

    // -----------------------------------------------------------------------
    // Watch event handlers, called from the UI loop
    // -----------------------------------------------------------------------

    /// Apply one event. Returns whether a render pass should follow.
    pub fn on_watch_event(&mut self, event: WatchEvent) -> bool {
        match event {
            WatchEvent::SnapshotLoaded(snapshot) => {
                self.on_snapshot_loaded(snapshot);
                !self.settings.lazy
            }
            WatchEvent::SnapshotUnavailable { kind, error } => {
                self.on_snapshot_unavailable(kind, error);
                false
            }
            WatchEvent::RefreshTick => true,
        }
    }

    /// Route a snapshot to the state update for its slot, pairing it with cached partner files.
    pub fn on_snapshot_loaded(&mut self, snapshot: Snapshot) {
        let kind = snapshot.kind();
        debug!("applying {kind}");
        let AppState {
            games, snapshots, ..
        } = &mut self.state;
        snapshots.apply(snapshot);

        match kind {
            SnapshotKind::Today => {
                games.update_current(snapshots.today.as_ref(), snapshots.play_by_play.as_deref())
            }
            SnapshotKind::PlayByPlay => games.update_current(None, snapshots.play_by_play.as_deref()),
            SnapshotKind::NextGame => {
                if let Some(next) = &snapshots.next_game {
                    games.update_next(next);
                }
            }
            SnapshotKind::LastGame => {
                games.update_last(snapshots.last_game.as_ref(), snapshots.box_score.as_ref())
            }
            SnapshotKind::BoxScore => games.update_last(None, snapshots.box_score.as_ref()),
        }
    }

    /// Slots keep what they have; only the cached payload of a vanished file is dropped.
    pub fn on_snapshot_unavailable(&mut self, kind: SnapshotKind, error: SnapshotError) {
        if error.is_absent() {
            debug!("{error}");
            self.state.snapshots.forget(kind);
        } else {
            warn!("{error}");
        }
    }

    /// A render pass: compose a fresh scene and remember it for plain redraws.
    pub fn compose_scene(&mut self, now: DateTime<Local>) -> &Scene {
        let scene = Scene::compose(&mut self.state.games, now);
        self.state.scene.insert(scene)
    }

    /// The last composed scene, composing one if there is none yet.
    pub fn current_scene(&mut self, now: DateTime<Local>) -> Scene {
        if let Some(scene) = &self.state.scene {
            return scene.clone();
        }
        self.compose_scene(now).clone()
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }
}
