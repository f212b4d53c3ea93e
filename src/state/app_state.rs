use crate::scene::Scene;
use courtside_model::State;
use courtside_model::loader::Snapshots;

#[derive(Debug, Default)]
pub struct AppState {
    /// The reconciled games. Only the UI loop touches this.
    pub games: State,
    /// Latest good payload per file, for pairing files that arrive separately.
    pub snapshots: Snapshots,
    /// Last composed scene; redraws that are not render passes reuse it.
    pub scene: Option<Scene>,
    pub show_logs: bool,
}

impl AppState {
    pub fn new(snapshots: Snapshots) -> Self {
        Self {
            games: State::from_snapshots(&snapshots),
            snapshots,
            ..Self::default()
        }
    }
}
