pub mod loader;
pub mod time;
pub mod wire;

mod game;
mod state;

pub use game::{BoxLine, Game, UNKNOWN_GAME_ID};
pub use state::{Slot, State};

use wire::{RawBoxScore, RawPlay, RawPlayerStats, RawStatLeader, RawTeam, RawTeamBoxScore, Scalar};

pub const UNKNOWN_PLAYER: &str = "UNKNOWN_PLAYER";

// ---------------------------------------------------------------------------
// Domain types: reconciled view of the snapshots, independent of wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn default_abbrev(self) -> &'static str {
        match self {
            Side::Home => "HOM",
            Side::Away => "VIS",
        }
    }

    pub fn default_name(self) -> &'static str {
        match self {
            Side::Home => "Home",
            Side::Away => "Visitors",
        }
    }

    pub fn other(self) -> Self {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub city: String,
    pub abbrev: String, // 3-letter code, "HOM"/"VIS" when the feed has none
    pub wins: u32,
    pub losses: u32,
    pub score: u16,
    pub in_bonus: bool,
    pub timeouts: Option<u8>,
    pub periods: Vec<u16>, // per-period points, in period order
    pub box_score: Option<BoxScore>,
}

impl Team {
    /// Build a team from its raw record. Every field defaults on its own; this never fails.
    pub fn from_raw(raw: &RawTeam, side: Side) -> Self {
        Self {
            id: raw.id.as_ref().map(Scalar::to_text).unwrap_or_default(),
            name: raw
                .team_name
                .clone()
                .unwrap_or_else(|| side.default_name().to_owned()),
            city: raw.team_city.clone().unwrap_or_default(),
            abbrev: raw
                .tri_code
                .as_deref()
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .unwrap_or(side.default_abbrev())
                .to_owned(),
            wins: number(raw.win.as_ref()).unwrap_or(0),
            losses: number(raw.loss.as_ref()).unwrap_or(0),
            score: number(raw.score.as_ref()).unwrap_or(0),
            in_bonus: raw.in_bonus.as_ref().is_some_and(Scalar::is_truthy),
            timeouts: number(raw.timeouts_remaining.as_ref()),
            periods: raw
                .periods
                .iter()
                .flatten()
                .map(|p| p.score().unwrap_or(0))
                .collect(),
            box_score: None,
        }
    }

    /// Replace the box score wholesale. Returns whether any figure changed.
    pub fn update_box_score(&mut self, raw: &RawTeamBoxScore) -> bool {
        let incoming = BoxScore::from_team_raw(raw);
        let changed = self
            .box_score
            .as_ref()
            .is_none_or(|current| !current.same_figures(&incoming));
        self.box_score = Some(incoming);
        changed
    }
}

fn number<T: TryFrom<i64>>(value: Option<&Scalar>) -> Option<T> {
    value
        .and_then(Scalar::as_i64)
        .and_then(|n| T::try_from(n).ok())
}

// ---------------------------------------------------------------------------
// Box score
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatCategory {
    Assists,
    Blocks,
    Fouled,
    Fouler,
    Steals,
    Turnovers,
    Points,
    PaintPoints,
    Threes,
    Rebounds,
    OffRebounds,
    DefRebounds,
}

impl StatCategory {
    /// Display and cycling order.
    pub const ALL: [StatCategory; 12] = [
        StatCategory::Assists,
        StatCategory::Blocks,
        StatCategory::Fouled,
        StatCategory::Fouler,
        StatCategory::Steals,
        StatCategory::Turnovers,
        StatCategory::Points,
        StatCategory::PaintPoints,
        StatCategory::Threes,
        StatCategory::Rebounds,
        StatCategory::OffRebounds,
        StatCategory::DefRebounds,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatCategory::Assists => "Assists",
            StatCategory::Blocks => "Blocks",
            StatCategory::Fouled => "Fouled",
            StatCategory::Fouler => "Fouler",
            StatCategory::Steals => "Steals",
            StatCategory::Turnovers => "Turnovers",
            StatCategory::Points => "Points",
            StatCategory::PaintPoints => "Paint Points",
            StatCategory::Threes => "Threes",
            StatCategory::Rebounds => "Rebounds",
            StatCategory::OffRebounds => "Off Rebounds",
            StatCategory::DefRebounds => "Def Rebounds",
        }
    }
}

/// Category leader: who, and how many.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxScoreEntry {
    pub name: String,
    pub value: i64,
}

impl Default for BoxScoreEntry {
    fn default() -> Self {
        Self {
            name: UNKNOWN_PLAYER.to_owned(),
            value: -1,
        }
    }
}

impl BoxScoreEntry {
    fn from_raw(raw: Option<&RawStatLeader>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        let fallback = Self::default();
        Self {
            name: raw.name.clone().unwrap_or(fallback.name),
            value: raw.value.as_ref().and_then(Scalar::as_i64).unwrap_or(fallback.value),
        }
    }
}

/// The twelve category leaders of one team plus a round-robin cursor over them.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxScore {
    entries: [BoxScoreEntry; 12],
    /// Always `< entries.len()`.
    position: usize,
}

impl BoxScore {
    pub fn from_raw(raw: &RawBoxScore) -> Self {
        Self {
            entries: StatCategory::ALL.map(|category| BoxScoreEntry::from_raw(raw.leader(category))),
            position: 0,
        }
    }

    /// Derive leaders from per-player lines; the first player with the highest value wins ties.
    pub fn from_players(players: &[RawPlayerStats]) -> Self {
        Self {
            entries: StatCategory::ALL.map(|category| category_leader(players, category)),
            position: 0,
        }
    }

    /// Prefer the pre-computed leaders, then the player lines, then all-defaults.
    pub fn from_team_raw(raw: &RawTeamBoxScore) -> Self {
        match (&raw.box_score, &raw.players) {
            (Some(leaders), _) => Self::from_raw(leaders),
            (None, Some(players)) => Self::from_players(players),
            (None, None) => Self::from_raw(&RawBoxScore::default()),
        }
    }

    pub fn entry(&self, category: StatCategory) -> &BoxScoreEntry {
        &self.entries[category as usize]
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Current category and its leader; advances the cursor, wrapping after the last category.
    pub fn next_category(&mut self) -> (&'static str, &BoxScoreEntry) {
        let index = self.position;
        self.position = (index + 1) % self.entries.len();
        (StatCategory::ALL[index].label(), &self.entries[index])
    }

    /// Same leaders, ignoring where the cursor is.
    pub fn same_figures(&self, other: &BoxScore) -> bool {
        self.entries == other.entries
    }
}

fn category_leader(players: &[RawPlayerStats], category: StatCategory) -> BoxScoreEntry {
    let mut best: Option<BoxScoreEntry> = None;
    for player in players {
        let Some(value) = player.statistics.as_ref().and_then(|s| s.value(category)) else {
            continue;
        };
        if best.as_ref().is_none_or(|b| b.value < value) {
            best = Some(BoxScoreEntry {
                name: player
                    .player_name
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_PLAYER.to_owned()),
                value,
            });
        }
    }
    best.unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Play-by-play
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayKind {
    Period,
    JumpBall,
    TwoPoint,
    ThreePoint,
    Rebound,
    Block,
    Turnover,
    Steal,
    Timeout,
    Substitution,
    Foul,
    FreeThrow,
    Violation,
    Game,
    Other(String),
}

impl PlayKind {
    pub fn from_wire(kind: &str) -> Self {
        match kind.trim().to_ascii_lowercase().as_str() {
            "period" => PlayKind::Period,
            "jumpball" | "jump ball" => PlayKind::JumpBall,
            "2pt" => PlayKind::TwoPoint,
            "3pt" => PlayKind::ThreePoint,
            "rebound" => PlayKind::Rebound,
            "block" => PlayKind::Block,
            "turnover" => PlayKind::Turnover,
            "steal" => PlayKind::Steal,
            "timeout" => PlayKind::Timeout,
            "substitution" => PlayKind::Substitution,
            "foul" => PlayKind::Foul,
            "freethrow" | "free throw" => PlayKind::FreeThrow,
            "violation" => PlayKind::Violation,
            "game" => PlayKind::Game,
            _ => PlayKind::Other(kind.to_owned()),
        }
    }

    pub fn is_scoring(&self) -> bool {
        matches!(self, PlayKind::TwoPoint | PlayKind::ThreePoint | PlayKind::FreeThrow)
    }
}

/// One play-by-play entry as it was when recorded. `number` orders and de-duplicates plays.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayEvent {
    pub number: i64,
    pub kind: PlayKind,
    pub clock: String,
    pub desc: String,
    pub home_score: u16, // running score after this play
    pub away_score: u16,
    pub quarter: u8,
}

impl PlayEvent {
    pub(crate) fn from_raw(raw: &RawPlay, number: i64) -> Self {
        Self {
            number,
            kind: PlayKind::from_wire(raw.kind.as_deref().unwrap_or_default()),
            clock: raw.clock.as_deref().map(time::game_clock).unwrap_or_default(),
            desc: raw.desc.clone().unwrap_or_default(),
            home_score: number_or_zero(raw.home_score.as_ref()),
            away_score: number_or_zero(raw.away_score.as_ref()),
            quarter: number_or_zero(raw.quarter.as_ref()),
        }
    }
}

fn number_or_zero<T: TryFrom<i64> + Default>(value: Option<&Scalar>) -> T {
    number(value).unwrap_or_default()
}

/// `Pre`, `Q1`..`Q4`, `OT`, `2OT`, ...
pub fn period_label(period: u8) -> String {
    match period {
        0 => "Pre".to_owned(),
        1..=4 => format!("Q{period}"),
        5 => "OT".to_owned(),
        n => format!("{}OT", n - 4),
    }
}
