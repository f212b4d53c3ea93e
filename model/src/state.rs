use crate::Game;
use crate::loader::Snapshots;
use crate::wire::{RawBoxScoreFile, RawGame, RawPlay};
use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Current,
    Next,
    Last,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Current, Slot::Next, Slot::Last];
}

/// Everything the viewer remembers: at most one game per slot, nothing older.
#[derive(Debug, Clone, Default)]
pub struct State {
    current: Option<Game>,
    next: Option<Game>,
    last: Option<Game>,
}

impl State {
    /// Absent inputs leave their slot unset.
    pub fn new(
        current: Option<&RawGame>,
        play_by_play: Option<&[RawPlay]>,
        next: Option<&RawGame>,
        last: Option<&RawGame>,
        box_score: Option<&RawBoxScoreFile>,
    ) -> Self {
        Self {
            current: current.map(|raw| Game::from_raw(raw, play_by_play.unwrap_or_default(), None)),
            next: next.map(|raw| Game::from_raw(raw, &[], None)),
            last: last.map(|raw| Game::from_raw(raw, &[], box_score)),
        }
    }

    pub fn from_snapshots(snapshots: &Snapshots) -> Self {
        Self::new(
            snapshots.today.as_ref(),
            snapshots.play_by_play.as_deref(),
            snapshots.next_game.as_ref(),
            snapshots.last_game.as_ref(),
            snapshots.box_score.as_ref(),
        )
    }

    /// Merge into the current game, or start it if there is none yet.
    ///
    /// A patch naming a different game replaces the slot with a game built from the patch
    /// alone; play-by-play passed alongside is not attached since it carries no game id.
    pub fn update_current(&mut self, patch: Option<&RawGame>, play_by_play: Option<&[RawPlay]>) {
        let Some(game) = self.current.as_mut() else {
            if let Some(patch) = patch {
                self.current = Some(Game::from_raw(patch, play_by_play.unwrap_or_default(), None));
            }
            return;
        };

        if let Some(patch) = patch {
            if game.is_other_game(patch) {
                info!("current game changed from {} to {}", game.id(), patch.id_text().unwrap_or_default());
                *game = Game::from_raw(patch, &[], None);
                return;
            }
            game.merge_core(patch);
        }
        if let Some(plays) = play_by_play {
            game.merge_play_by_play(plays);
        }
    }

    /// Always a fresh game; the upcoming game is never merged.
    pub fn update_next(&mut self, patch: &RawGame) {
        self.next = Some(Game::from_raw(patch, &[], None));
    }

    /// Replace the last game when it is unset or a different game; otherwise only its box score
    /// moves, a finished game's score and clock stay put.
    pub fn update_last(&mut self, patch: Option<&RawGame>, box_score: Option<&RawBoxScoreFile>) {
        let Some(game) = self.last.as_mut() else {
            if let Some(patch) = patch {
                self.last = Some(Game::from_raw(patch, &[], box_score));
            }
            return;
        };

        if let Some(patch) = patch
            && game.is_other_game(patch)
        {
            info!("last game changed from {} to {}", game.id(), patch.id_text().unwrap_or_default());
            *game = Game::from_raw(patch, &[], box_score);
            return;
        }
        if let Some(box_score) = box_score {
            game.merge_box_score(box_score);
        }
    }

    pub fn current(&self) -> Option<&Game> {
        self.current.as_ref()
    }

    pub fn next(&self) -> Option<&Game> {
        self.next.as_ref()
    }

    pub fn last(&self) -> Option<&Game> {
        self.last.as_ref()
    }

    pub fn game(&self, slot: Slot) -> Option<&Game> {
        match slot {
            Slot::Current => self.current.as_ref(),
            Slot::Next => self.next.as_ref(),
            Slot::Last => self.last.as_ref(),
        }
    }

    pub fn game_mut(&mut self, slot: Slot) -> Option<&mut Game> {
        match slot {
            Slot::Current => self.current.as_mut(),
            Slot::Next => self.next.as_mut(),
            Slot::Last => self.last.as_mut(),
        }
    }

    /// Drain every slot's change flag; true if any was set.
    pub fn take_dirty(&mut self) -> bool {
        let mut dirty = false;
        for slot in Slot::ALL {
            if let Some(game) = self.game_mut(slot) {
                dirty |= game.take_dirty();
            }
        }
        dirty
    }
}
