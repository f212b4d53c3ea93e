use chrono::{DateTime, Local};
use courtside_model::{BoxLine, Game, Slot, State, period_label};

/// Events shown under the score; the small display has room for this many.
pub const EVENT_LINES: usize = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    PreGame,
    InGame,
    PostGame,
}

/// Renderer-neutral view of `State` at one instant. Both renderers draw from this.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scene {
    pub phase: Phase,
    pub home: String,
    pub away: String,
    pub home_score: u16,
    pub away_score: u16,
    pub status: String,
    pub events: Vec<String>,
    pub detail: Option<String>,
    /// Whether any game changed since the previous scene was composed.
    pub changed: bool,
}

impl Scene {
    /// One render pass: drains the dirty flags exactly once and advances the box-score rotation
    /// of the game shown after the final buzzer.
    pub fn compose(state: &mut State, now: DateTime<Local>) -> Self {
        let changed = state.take_dirty();
        let Some((slot, phase)) = pick(state, now) else {
            return Self::idle(changed);
        };
        let Some(game) = state.game_mut(slot) else {
            return Self::idle(changed);
        };

        let (status, events, detail) = match phase {
            Phase::PreGame => (pre_game_status(game, now), Vec::new(), matchup(game)),
            Phase::InGame => (
                in_game_status(game),
                game.last_few_events(EVENT_LINES)
                    .lines()
                    .map(str::to_owned)
                    .collect(),
                None,
            ),
            Phase::PostGame => ("Final".to_owned(), Vec::new(), rotate_box_score(game)),
            Phase::Idle => (String::new(), Vec::new(), None),
        };

        Self {
            phase,
            home: game.home_abv().to_owned(),
            away: game.away_abv().to_owned(),
            home_score: game.home_score(),
            away_score: game.away_score(),
            status,
            events,
            detail,
            changed,
        }
    }

    fn idle(changed: bool) -> Self {
        Self {
            phase: Phase::Idle,
            home: "HOM".to_owned(),
            away: "VIS".to_owned(),
            home_score: 0,
            away_score: 0,
            status: "No game data".to_owned(),
            events: Vec::new(),
            detail: None,
            changed,
        }
    }

    /// Plain-text rendition, one entry per output line.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("{} {}", self.home, self.away),
            format!("{:>3} {:>3}", self.home_score, self.away_score),
            self.status.clone(),
        ];
        lines.extend(self.events.iter().cloned());
        lines.extend(self.detail.iter().cloned());
        lines
    }
}

/// A live or finished current game first, then the upcoming game, then the last one.
fn pick(state: &State, now: DateTime<Local>) -> Option<(Slot, Phase)> {
    if let Some(current) = state.current() {
        if !current.is_over() {
            let phase = if current.has_started_at(now) || !current.plays().is_empty() {
                Phase::InGame
            } else {
                Phase::PreGame
            };
            return Some((Slot::Current, phase));
        }
        // the last slot carries the box score once the current game wraps up
        if state.last().is_some_and(|last| last.id() == current.id()) {
            return Some((Slot::Last, Phase::PostGame));
        }
        return Some((Slot::Current, Phase::PostGame));
    }
    if state.next().is_some() {
        return Some((Slot::Next, Phase::PreGame));
    }
    state.last().map(|_| (Slot::Last, Phase::PostGame))
}

fn pre_game_status(game: &Game, now: DateTime<Local>) -> String {
    match (game.start_time(), game.time_until_start_at(now)) {
        (None, _) => "Start time TBD".to_owned(),
        (Some(_), Some(countdown)) => format!("Tip-off {countdown}"),
        (Some(_), None) => "Starting".to_owned(),
    }
}

fn in_game_status(game: &Game) -> String {
    let clock = game
        .clock()
        .or_else(|| game.plays().last().map(|play| play.clock.as_str()))
        .unwrap_or("00:00");
    let period = game
        .period()
        .or_else(|| game.plays().last().map(|play| play.quarter))
        .unwrap_or(0);
    format!("{} {clock}", period_label(period))
}

fn matchup(game: &Game) -> Option<String> {
    let home = game.home()?;
    let away = game.away()?;
    Some(format!(
        "{} ({}-{}) vs {} ({}-{})",
        home.name, home.wins, home.losses, away.name, away.wins, away.losses
    ))
}

/// Next category from whichever side has a box score; a one-sided box score still rotates.
fn rotate_box_score(game: &mut Game) -> Option<String> {
    let line = game
        .next_box_category()
        .or_else(|| game.next_box_category())?;
    Some(box_line_text(&line))
}

fn box_line_text(line: &BoxLine) -> String {
    if line.entry.value < 0 {
        return format!("{} {}: -", line.team, line.category);
    }
    format!(
        "{} {}: {} {}",
        line.team, line.category, line.entry.name, line.entry.value
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use courtside_model::wire::{RawBoxScoreFile, RawGame, RawPlay};
    use serde_json::json;

    fn game(value: serde_json::Value) -> RawGame {
        serde_json::from_value(value).unwrap()
    }

    fn now() -> DateTime<Local> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap().with_timezone(&Local)
    }

    #[test]
    fn empty_state_is_idle() {
        let mut state = State::default();
        let scene = Scene::compose(&mut state, now());
        assert_eq!(scene.phase, Phase::Idle);
        assert!(!scene.changed);
        assert_eq!(scene.lines(), vec!["HOM VIS", "  0   0", "No game data"]);
    }

    #[test]
    fn live_game_shows_score_clock_and_recent_plays() {
        let plays: Vec<RawPlay> = serde_json::from_value(json!([
            { "number": 1, "desc": "Jump ball", "home_score": 0, "away_score": 0, "quarter": 1 },
            { "number": 2, "desc": "Edwards layup", "home_score": 2, "away_score": 0, "quarter": 1 },
        ]))
        .unwrap();
        let mut state = State::new(
            Some(&game(json!({
                "id": "G1", "startTime": "2026-03-01T11:30:00Z", "clock": "PT05M12.00S", "period": 2,
                "home": { "triCode": "MIN" }, "away": { "triCode": "DEN" },
            }))),
            Some(plays.as_slice()),
            None,
            None,
            None,
        );

        let scene = Scene::compose(&mut state, now());
        assert_eq!(scene.phase, Phase::InGame);
        assert!(scene.changed);
        assert_eq!(
            scene.lines(),
            vec!["MIN DEN", "  2   0", "Q2 05:12", "Jump ball", "Edwards layup"]
        );

        let again = Scene::compose(&mut state, now());
        assert!(!again.changed);
        assert_eq!(again.lines(), scene.lines());
    }

    #[test]
    fn upcoming_game_counts_down() {
        let mut state = State::new(
            None,
            None,
            Some(&game(json!({
                "id": "N1", "startTime": "2026-03-01T14:30:00Z",
                "home": { "teamName": "Timberwolves", "win": 7, "loss": 21 },
                "away": { "teamName": "Nuggets", "win": 20, "loss": 8 },
            }))),
            None,
            None,
        );
        let scene = Scene::compose(&mut state, now());
        assert_eq!(scene.phase, Phase::PreGame);
        assert_eq!(scene.status, "Tip-off 2h 30m");
        assert_eq!(scene.detail.as_deref(), Some("Timberwolves (7-21) vs Nuggets (20-8)"));
    }

    #[test]
    fn finished_game_rotates_box_score() {
        let box_file: RawBoxScoreFile = serde_json::from_value(json!({
            "home": { "boxScore": { "assist": { "name": "D. Russell", "value": 9 } } },
        }))
        .unwrap();
        let mut state = State::new(
            None,
            None,
            None,
            Some(&game(json!({
                "id": "L1", "endTime": "2026-03-01T04:00:00Z",
                "home": { "triCode": "MIN", "score": 110 }, "away": { "triCode": "DEN", "score": 104 },
            }))),
            Some(&box_file),
        );

        let first = Scene::compose(&mut state, now());
        assert_eq!(first.phase, Phase::PostGame);
        assert_eq!(first.status, "Final");
        assert_eq!((first.home_score, first.away_score), (110, 104));
        assert_eq!(first.detail.as_deref(), Some("MIN Assists: D. Russell 9"));

        let second = Scene::compose(&mut state, now());
        assert_eq!(second.detail.as_deref(), Some("MIN Blocks: -"));
    }

    #[test]
    fn finished_current_game_prefers_last_slot_with_same_id() {
        let mut state = State::new(
            Some(&game(json!({ "id": "G1", "endTime": "2026-03-01T11:00:00Z" }))),
            None,
            Some(&game(json!({ "id": "N1" }))),
            Some(&game(json!({ "id": "G1", "home": { "triCode": "MIN" } }))),
            None,
        );
        let scene = Scene::compose(&mut state, now());
        assert_eq!(scene.phase, Phase::PostGame);
        assert_eq!(scene.home, "MIN");
    }

    #[test]
    fn current_game_before_tip_off_is_pre_game() {
        let mut state = State::new(
            Some(&game(json!({ "id": "G1", "startTime": "2026-03-01T12:00:42Z" }))),
            None,
            None,
            None,
            None,
        );
        let scene = Scene::compose(&mut state, now());
        assert_eq!(scene.phase, Phase::PreGame);
        assert_eq!(scene.status, "Tip-off 42s");
        assert_eq!(scene.detail, None);
    }
}
