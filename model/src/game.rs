use crate::time::{format_duration_until, game_clock, parse_instant};
use crate::wire::{RawBoxScoreFile, RawGame, RawPeriod, RawPlay, RawTeam, RawTeamBoxScore};
use crate::{BoxScoreEntry, PlayEvent, Side, Team};
use chrono::{DateTime, Local};
use log::{debug, warn};
use serde_json::Value;

pub const UNKNOWN_GAME_ID: &str = "UNKNOWN_GAME_ID";

/// One step of the alternating home/away box-score rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxLine {
    pub team: String,
    pub category: &'static str,
    pub entry: BoxScoreEntry,
}

#[derive(Debug, Clone)]
pub struct Game {
    id: Option<String>,
    start_time: Option<DateTime<Local>>,
    end_time: Option<DateTime<Local>>, // set-once
    clock: Option<String>,
    period: Option<u8>,
    home: Option<Team>,
    away: Option<Team>,
    game_leaders: Option<Value>,
    plays: Vec<PlayEvent>,
    last_play_number: i64,
    dirty: bool,
    next_box_side: Side,
}

impl Game {
    /// Build a game from its record plus whatever play-by-play and box score belong to it.
    pub fn from_raw(raw: &RawGame, plays: &[RawPlay], box_score: Option<&RawBoxScoreFile>) -> Self {
        let id = raw.id_text();
        let label = id.as_deref().unwrap_or(UNKNOWN_GAME_ID);
        let mut game = Self {
            start_time: raw
                .start_time
                .as_deref()
                .and_then(|s| instant_field(label, "start time", s)),
            end_time: raw
                .end_time
                .as_deref()
                .and_then(|s| instant_field(label, "end time", s)),
            clock: raw.clock.as_deref().map(game_clock),
            period: raw.period.as_ref().and_then(RawPeriod::number),
            home: raw.home.as_ref().map(|t| Team::from_raw(t, Side::Home)),
            away: raw.away.as_ref().map(|t| Team::from_raw(t, Side::Away)),
            game_leaders: raw.game_leaders.clone(),
            plays: Vec::with_capacity(plays.len()),
            last_play_number: -1,
            dirty: true,
            next_box_side: Side::Home,
            id,
        };
        game.merge_play_by_play(plays);
        if let Some(box_score) = box_score {
            game.merge_box_score(box_score);
        }
        game
    }

    /// Merge the fields a partial record supplies; everything else stays as it is.
    pub fn merge_core(&mut self, patch: &RawGame) {
        if self.end_time.is_none()
            && let Some(end) = patch
                .end_time
                .as_deref()
                .and_then(|s| instant_field(self.id(), "end time", s))
        {
            debug!("game {} ended at {end}", self.id());
            self.end_time = Some(end);
            self.dirty = true;
        }

        if let Some(clock) = patch.clock.as_deref().map(game_clock)
            && self.clock.as_deref() != Some(clock.as_str())
        {
            self.clock = Some(clock);
            self.dirty = true;
        }

        if let Some(period) = patch.period.as_ref().and_then(RawPeriod::number)
            && self.period != Some(period)
        {
            self.period = Some(period);
            self.dirty = true;
        }

        if let Some(raw) = &patch.home {
            self.dirty |= refresh_team(&mut self.home, raw, Side::Home);
        }
        if let Some(raw) = &patch.away {
            self.dirty |= refresh_team(&mut self.away, raw, Side::Away);
        }
    }

    /// Append plays numbered above the highest one seen, in input order. Returns how many were kept.
    pub fn merge_play_by_play(&mut self, entries: &[RawPlay]) -> usize {
        let mut appended = 0;
        for raw in entries {
            let Some(number) = raw.number() else {
                debug!("game {}: dropping play without a number", self.id());
                continue;
            };
            if number <= self.last_play_number {
                continue;
            }
            self.plays.push(PlayEvent::from_raw(raw, number));
            self.last_play_number = number;
            appended += 1;
        }
        if appended > 0 {
            self.dirty = true;
        }
        appended
    }

    /// Replace both teams' box scores. A file tagged with another game's id is ignored.
    pub fn merge_box_score(&mut self, file: &RawBoxScoreFile) -> bool {
        if let (Some(own), Some(theirs)) = (&self.id, file.id_text())
            && *own != theirs
        {
            warn!("ignoring box score for game {theirs} while showing game {own}");
            return false;
        }
        let mut changed = false;
        if let Some(raw) = &file.home {
            changed |= team_for_box_score(&mut self.home, raw, Side::Home).update_box_score(raw);
        }
        if let Some(raw) = &file.away {
            changed |= team_for_box_score(&mut self.away, raw, Side::Away).update_box_score(raw);
        }
        self.dirty |= changed;
        changed
    }

    /// Whether `patch` names a different game. A patch without an id never does.
    pub fn is_other_game(&self, patch: &RawGame) -> bool {
        patch
            .id_text()
            .is_some_and(|theirs| self.id.as_deref() != Some(theirs.as_str()))
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or(UNKNOWN_GAME_ID)
    }

    pub fn start_time(&self) -> Option<DateTime<Local>> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Local>> {
        self.end_time
    }

    pub fn clock(&self) -> Option<&str> {
        self.clock.as_deref()
    }

    pub fn period(&self) -> Option<u8> {
        self.period
    }

    pub fn home(&self) -> Option<&Team> {
        self.home.as_ref()
    }

    pub fn away(&self) -> Option<&Team> {
        self.away.as_ref()
    }

    pub fn game_leaders(&self) -> Option<&Value> {
        self.game_leaders.as_ref()
    }

    pub fn plays(&self) -> &[PlayEvent] {
        &self.plays
    }

    /// Highest play number seen, `-1` before any.
    pub fn last_play_number(&self) -> i64 {
        self.last_play_number
    }

    pub fn home_abv(&self) -> &str {
        abbrev(self.home.as_ref(), Side::Home)
    }

    pub fn away_abv(&self) -> &str {
        abbrev(self.away.as_ref(), Side::Away)
    }

    /// The latest play's running score wins over the team record once any play exists.
    pub fn home_score(&self) -> u16 {
        match self.plays.last() {
            Some(play) => play.home_score,
            None => self.home.as_ref().map_or(0, |t| t.score),
        }
    }

    pub fn away_score(&self) -> u16 {
        match self.plays.last() {
            Some(play) => play.away_score,
            None => self.away.as_ref().map_or(0, |t| t.score),
        }
    }

    pub fn has_started(&self) -> bool {
        self.has_started_at(Local::now())
    }

    /// An unknown start time is treated as never reached.
    pub fn has_started_at(&self, now: DateTime<Local>) -> bool {
        self.start_time.is_some_and(|start| now >= start)
    }

    pub fn is_over(&self) -> bool {
        self.end_time.is_some()
    }

    pub fn minutes_since_end(&self) -> Option<i64> {
        self.minutes_since_end_at(Local::now())
    }

    pub fn minutes_since_end_at(&self, now: DateTime<Local>) -> Option<i64> {
        self.end_time.map(|end| (now - end).num_minutes())
    }

    pub fn minutes_until_start(&self) -> Option<i64> {
        self.minutes_until_start_at(Local::now())
    }

    pub fn minutes_until_start_at(&self, now: DateTime<Local>) -> Option<i64> {
        self.start_time.map(|start| (start - now).num_minutes())
    }

    pub fn time_until_start(&self) -> Option<String> {
        self.time_until_start_at(Local::now())
    }

    pub fn time_until_start_at(&self, now: DateTime<Local>) -> Option<String> {
        self.start_time
            .and_then(|start| format_duration_until(start, now))
    }

    /// Descriptions of the last `n` plays, oldest first, one per line.
    pub fn last_few_events(&self, n: usize) -> String {
        let skip = self.plays.len().saturating_sub(n);
        self.plays[skip..]
            .iter()
            .map(|play| play.desc.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Next box-score category, alternating home and away on every call.
    /// `None` when the side whose turn it is has no team or no box score yet.
    pub fn next_box_category(&mut self) -> Option<BoxLine> {
        let side = self.next_box_side;
        self.next_box_side = side.other();
        let team = match side {
            Side::Home => self.home.as_mut(),
            Side::Away => self.away.as_mut(),
        }?;
        let code = if team.abbrev.is_empty() {
            side.default_abbrev().to_owned()
        } else {
            team.abbrev.clone()
        };
        let (category, entry) = team.box_score.as_mut()?.next_category();
        Some(BoxLine {
            team: code,
            category,
            entry: entry.clone(),
        })
    }

    /// Returns and clears the change flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

fn abbrev(team: Option<&Team>, side: Side) -> &str {
    team.map(|t| t.abbrev.as_str())
        .filter(|abv| !abv.is_empty())
        .unwrap_or(side.default_abbrev())
}

fn instant_field(game_id: &str, field: &str, raw: &str) -> Option<DateTime<Local>> {
    match parse_instant(raw) {
        Ok(instant) => Some(instant),
        Err(e) => {
            warn!("game {game_id}: leaving {field} unset, {e}");
            None
        }
    }
}

/// Rebuild a team from a fresh record, keeping the box score it already had.
fn refresh_team(slot: &mut Option<Team>, raw: &RawTeam, side: Side) -> bool {
    let mut fresh = Team::from_raw(raw, side);
    let changed = match slot.as_ref() {
        Some(old) => {
            fresh.box_score = old.box_score.clone();
            *old != fresh
        }
        None => true,
    };
    *slot = Some(fresh);
    changed
}

fn team_for_box_score<'a>(slot: &'a mut Option<Team>, raw: &RawTeamBoxScore, side: Side) -> &'a mut Team {
    slot.get_or_insert_with(|| {
        let record = RawTeam {
            tri_code: raw.abv.clone(),
            ..RawTeam::default()
        };
        Team::from_raw(&record, side)
    })
}
