use crate::wire::{RawBoxScoreFile, RawGame, RawPlay, RawPlayByPlay};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Which snapshot file a path is, resolved once from its exact file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotKind {
    Today,
    PlayByPlay,
    NextGame,
    LastGame,
    BoxScore,
}

impl SnapshotKind {
    pub const ALL: [SnapshotKind; 5] = [
        SnapshotKind::Today,
        SnapshotKind::PlayByPlay,
        SnapshotKind::NextGame,
        SnapshotKind::LastGame,
        SnapshotKind::BoxScore,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            SnapshotKind::Today => "today.json",
            SnapshotKind::PlayByPlay => "play_by_play.json",
            SnapshotKind::NextGame => "next_game.json",
            SnapshotKind::LastGame => "last_game.json",
            SnapshotKind::BoxScore => "box_score.json",
        }
    }

    /// `None` for anything that is not one of the five snapshot files, editor swap files included.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        Self::ALL.into_iter().find(|kind| kind.file_name() == name)
    }
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// A decoded snapshot, tagged by the file it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Today(RawGame),
    PlayByPlay(Vec<RawPlay>),
    NextGame(RawGame),
    LastGame(RawGame),
    BoxScore(RawBoxScoreFile),
}

impl Snapshot {
    pub fn kind(&self) -> SnapshotKind {
        match self {
            Snapshot::Today(_) => SnapshotKind::Today,
            Snapshot::PlayByPlay(_) => SnapshotKind::PlayByPlay,
            Snapshot::NextGame(_) => SnapshotKind::NextGame,
            Snapshot::LastGame(_) => SnapshotKind::LastGame,
            Snapshot::BoxScore(_) => SnapshotKind::BoxScore,
        }
    }
}

/// Why a snapshot is unavailable right now. Never fatal; the slot just has no new data.
#[derive(Debug)]
pub enum SnapshotError {
    Missing(PathBuf),
    Empty(PathBuf),
    Io(io::Error, PathBuf),
    Parsing(serde_json::Error, PathBuf),
}

impl SnapshotError {
    /// The file is gone or holds nothing, as opposed to being unreadable or half-written.
    pub fn is_absent(&self) -> bool {
        matches!(self, SnapshotError::Missing(_) | SnapshotError::Empty(_))
    }
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Missing(path) => write!(f, "{} does not exist", path.display()),
            SnapshotError::Empty(path) => write!(f, "{} holds no data", path.display()),
            SnapshotError::Io(e, path) => write!(f, "could not read {}: {e}", path.display()),
            SnapshotError::Parsing(e, path) => write!(f, "could not parse {}: {e}", path.display()),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Io(e, _) => Some(e),
            SnapshotError::Parsing(e, _) => Some(e),
            _ => None,
        }
    }
}

/// Latest good payload of each kind, kept so partner files arriving later can be reconciled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshots {
    pub today: Option<RawGame>,
    pub play_by_play: Option<Vec<RawPlay>>,
    pub next_game: Option<RawGame>,
    pub last_game: Option<RawGame>,
    pub box_score: Option<RawBoxScoreFile>,
}

impl Snapshots {
    pub fn apply(&mut self, snapshot: Snapshot) {
        match snapshot {
            Snapshot::Today(game) => self.today = Some(game),
            Snapshot::PlayByPlay(plays) => self.play_by_play = Some(plays),
            Snapshot::NextGame(game) => self.next_game = Some(game),
            Snapshot::LastGame(game) => self.last_game = Some(game),
            Snapshot::BoxScore(box_score) => self.box_score = Some(box_score),
        }
    }

    pub fn forget(&mut self, kind: SnapshotKind) {
        match kind {
            SnapshotKind::Today => self.today = None,
            SnapshotKind::PlayByPlay => self.play_by_play = None,
            SnapshotKind::NextGame => self.next_game = None,
            SnapshotKind::LastGame => self.last_game = None,
            SnapshotKind::BoxScore => self.box_score = None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotLoader {
    data_dir: PathBuf,
}

impl SnapshotLoader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_for(&self, kind: SnapshotKind) -> PathBuf {
        self.data_dir.join(kind.file_name())
    }

    /// Read and decode one snapshot file.
    ///
    /// A game file holding `{}` counts as [`SnapshotError::Empty`]: no game for that slot.
    /// Loads are pure re-derivations of the file, so calling this again for the same change is
    /// always safe.
    pub fn load(&self, kind: SnapshotKind) -> SnapshotResult<Snapshot> {
        let path = self.path_for(kind);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(SnapshotError::Missing(path)),
            Err(e) => return Err(SnapshotError::Io(e, path)),
        };
        if text.trim().is_empty() {
            return Err(SnapshotError::Empty(path));
        }

        let snapshot = match kind {
            SnapshotKind::Today => Snapshot::Today(parse_game(&text, &path)?),
            SnapshotKind::NextGame => Snapshot::NextGame(parse_game(&text, &path)?),
            SnapshotKind::LastGame => Snapshot::LastGame(parse_game(&text, &path)?),
            SnapshotKind::PlayByPlay => {
                Snapshot::PlayByPlay(parse::<RawPlayByPlay>(&text, &path)?.into_plays())
            }
            SnapshotKind::BoxScore => {
                let box_score: RawBoxScoreFile = parse(&text, &path)?;
                if box_score == RawBoxScoreFile::default() {
                    return Err(SnapshotError::Empty(path));
                }
                Snapshot::BoxScore(box_score)
            }
        };
        debug!("loaded {kind}");
        Ok(snapshot)
    }

    /// [`load`](Self::load), with unavailability logged and turned into `None`.
    pub fn load_opt(&self, kind: SnapshotKind) -> Option<Snapshot> {
        match self.load(kind) {
            Ok(snapshot) => Some(snapshot),
            Err(e) if e.is_absent() => {
                debug!("no data for {kind}: {e}");
                None
            }
            Err(e) => {
                warn!("{e}");
                None
            }
        }
    }

    /// Whatever subset of the snapshot files is currently readable.
    pub fn load_all(&self) -> Snapshots {
        let mut snapshots = Snapshots::default();
        for kind in SnapshotKind::ALL {
            if let Some(snapshot) = self.load_opt(kind) {
                snapshots.apply(snapshot);
            }
        }
        snapshots
    }
}

fn parse<T: DeserializeOwned>(text: &str, path: &Path) -> SnapshotResult<T> {
    serde_json::from_str(text).map_err(|e| SnapshotError::Parsing(e, path.to_path_buf()))
}

fn parse_game(text: &str, path: &Path) -> SnapshotResult<RawGame> {
    let game: RawGame = parse(text, path)?;
    if game.is_empty() {
        return Err(SnapshotError::Empty(path.to_path_buf()));
    }
    Ok(game)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Slot, State};
    use tempfile::TempDir;

    fn write(dir: &TempDir, kind: SnapshotKind, contents: &str) {
        fs::write(dir.path().join(kind.file_name()), contents).unwrap();
    }

    #[test]
    fn kind_from_exact_file_name_only() {
        assert_eq!(SnapshotKind::from_path(Path::new("/data/today.json")), Some(SnapshotKind::Today));
        assert_eq!(
            SnapshotKind::from_path(Path::new("box_score.json")),
            Some(SnapshotKind::BoxScore)
        );
        assert_eq!(SnapshotKind::from_path(Path::new("/data/today.json.swp")), None);
        assert_eq!(SnapshotKind::from_path(Path::new("/data/not_today.json")), None);
        assert_eq!(SnapshotKind::from_path(Path::new("/")), None);
    }

    #[test]
    fn missing_file_is_unavailable_not_an_error() {
        let dir = TempDir::new().unwrap();
        let loader = SnapshotLoader::new(dir.path());
        let err = loader.load(SnapshotKind::BoxScore).unwrap_err();
        assert!(matches!(err, SnapshotError::Missing(_)));
        assert!(err.is_absent());
        assert_eq!(loader.load_opt(SnapshotKind::BoxScore), None);
    }

    #[test]
    fn empty_files_and_objects_mean_no_game() {
        let dir = TempDir::new().unwrap();
        write(&dir, SnapshotKind::Today, "{}");
        write(&dir, SnapshotKind::NextGame, "  \n");
        write(&dir, SnapshotKind::BoxScore, "{}");
        let loader = SnapshotLoader::new(dir.path());
        for kind in [SnapshotKind::Today, SnapshotKind::NextGame, SnapshotKind::BoxScore] {
            assert!(matches!(loader.load(kind), Err(SnapshotError::Empty(_))), "{kind}");
        }
    }

    #[test]
    fn half_written_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, SnapshotKind::LastGame, r#"{"id": "L1", "home": {"#);
        let loader = SnapshotLoader::new(dir.path());
        let err = loader.load(SnapshotKind::LastGame).unwrap_err();
        assert!(matches!(err, SnapshotError::Parsing(..)));
        assert!(!err.is_absent());
        assert!(err.to_string().contains("last_game.json"));
    }

    #[test]
    fn loads_each_kind() {
        let dir = TempDir::new().unwrap();
        write(&dir, SnapshotKind::Today, r#"{"id": "G1", "clock": "5:00", "period": 2}"#);
        write(
            &dir,
            SnapshotKind::PlayByPlay,
            r#"[{"number": 1, "type": "2pt", "clock": "5:00", "desc": "Layup", "home_score": 2, "away_score": 0, "quarter": 2}]"#,
        );
        write(&dir, SnapshotKind::BoxScore, r#"{"home": {"boxScore": {"points": {"name": "A", "value": 2}}}}"#);
        let loader = SnapshotLoader::new(dir.path());

        match loader.load(SnapshotKind::Today).unwrap() {
            Snapshot::Today(game) => assert_eq!(game.id_text().as_deref(), Some("G1")),
            other => panic!("unexpected {other:?}"),
        }
        let plays = loader.load(SnapshotKind::PlayByPlay).unwrap();
        assert_eq!(plays.kind(), SnapshotKind::PlayByPlay);
        assert!(matches!(plays, Snapshot::PlayByPlay(ref p) if p.len() == 1));
        assert!(matches!(loader.load(SnapshotKind::BoxScore), Ok(Snapshot::BoxScore(_))));
    }

    #[test]
    fn load_all_feeds_state() {
        let dir = TempDir::new().unwrap();
        write(&dir, SnapshotKind::Today, r#"{"id": "G1"}"#);
        write(&dir, SnapshotKind::PlayByPlay, r#"{"game": {"actions": [{"actionNumber": 3, "scoreHome": "7", "scoreAway": "5"}]}}"#);
        write(&dir, SnapshotKind::LastGame, "not json");
        let snapshots = SnapshotLoader::new(dir.path()).load_all();
        assert!(snapshots.today.is_some());
        assert!(snapshots.last_game.is_none());
        assert!(snapshots.box_score.is_none());

        let state = State::from_snapshots(&snapshots);
        assert_eq!(state.game(Slot::Current).map(|g| g.home_score()), Some(7));
        assert!(state.last().is_none());
        assert!(state.next().is_none());
    }

    #[test]
    fn cache_apply_and_forget() {
        let mut snapshots = Snapshots::default();
        snapshots.apply(Snapshot::PlayByPlay(Vec::new()));
        assert_eq!(snapshots.play_by_play, Some(Vec::new()));
        snapshots.forget(SnapshotKind::PlayByPlay);
        assert_eq!(snapshots, Snapshots::default());
    }
}
