/// Raw snapshot shapes: serde mirrors of the JSON files written by the data producer.
/// Every field is optional and wrong-typed values decode to `None`, so a snapshot never fails
/// to load because one field is missing or odd. Mapping into domain types lives next to the
/// domain types (`Team::from_raw`, `Game::from_raw`, ...).
use crate::StatCategory;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode a field, swallowing type mismatches into `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Producers disagree on whether ids, records and scores are strings or numbers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(i64),
    Float(f64),
    Flag(bool),
    Text(String),
}

impl Scalar {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Float(f) => Some(*f as i64),
            Scalar::Flag(b) => Some(i64::from(*b)),
            Scalar::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            Scalar::Number(n) => n.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Flag(b) => b.to_string(),
            Scalar::Text(s) => s.clone(),
        }
    }

    /// `true`, non-zero numbers, and strings that read `"true"`, `"yes"` or a non-zero number.
    pub fn is_truthy(&self) -> bool {
        match self {
            Scalar::Flag(b) => *b,
            Scalar::Text(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes")
                || self.as_i64().is_some_and(|n| n != 0),
            _ => self.as_i64().is_some_and(|n| n != 0),
        }
    }
}

// ---------------------------------------------------------------------------
// Game records  (today.json, next_game.json, last_game.json)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawGame {
    #[serde(default, alias = "gameId", deserialize_with = "lenient")]
    pub id: Option<Scalar>,
    #[serde(default, alias = "startTimeUTC", alias = "gameTimeUTC", deserialize_with = "lenient")]
    pub start_time: Option<String>,
    #[serde(default, alias = "endTimeUTC", deserialize_with = "lenient")]
    pub end_time: Option<String>,
    #[serde(default, alias = "gameClock", deserialize_with = "lenient")]
    pub clock: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub period: Option<RawPeriod>,
    #[serde(default, alias = "hTeam", alias = "homeTeam", deserialize_with = "lenient")]
    pub home: Option<RawTeam>,
    #[serde(default, alias = "vTeam", alias = "awayTeam", deserialize_with = "lenient")]
    pub away: Option<RawTeam>,
    /// Opaque; handed to renderers untouched.
    #[serde(default)]
    pub game_leaders: Option<Value>,
}

impl RawGame {
    /// `{}` carries no game at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn id_text(&self) -> Option<String> {
        self.id.as_ref().map(Scalar::to_text).filter(|id| !id.is_empty())
    }
}

/// Either a bare period number or the scoreboard's period object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPeriod {
    Number(i64),
    Text(String),
    Detail(RawPeriodDetail),
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawPeriodDetail {
    #[serde(default, deserialize_with = "lenient")]
    pub current: Option<i64>,
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub kind: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_halftime: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_end_of_period: Option<bool>,
}

impl RawPeriod {
    pub fn number(&self) -> Option<u8> {
        let n = match self {
            RawPeriod::Number(n) => Some(*n),
            RawPeriod::Text(s) => s.trim().parse().ok(),
            RawPeriod::Detail(d) => d.current,
        }?;
        u8::try_from(n).ok()
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawTeam {
    #[serde(default, alias = "teamId", deserialize_with = "lenient")]
    pub id: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub team_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub team_city: Option<String>,
    #[serde(default, alias = "teamTricode", deserialize_with = "lenient")]
    pub tri_code: Option<String>,
    #[serde(default, alias = "wins", deserialize_with = "lenient")]
    pub win: Option<Scalar>,
    #[serde(default, alias = "losses", deserialize_with = "lenient")]
    pub loss: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub score: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub in_bonus: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub timeouts_remaining: Option<Scalar>,
    #[serde(default, alias = "linescore", deserialize_with = "lenient")]
    pub periods: Option<Vec<RawLineScore>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawLineScore {
    Plain(Scalar),
    Detail {
        #[serde(default)]
        score: Option<Scalar>,
    },
}

impl RawLineScore {
    pub fn score(&self) -> Option<u16> {
        let raw = match self {
            RawLineScore::Plain(s) => s.as_i64(),
            RawLineScore::Detail { score } => score.as_ref().and_then(Scalar::as_i64),
        }?;
        u16::try_from(raw).ok()
    }
}

// ---------------------------------------------------------------------------
// Play-by-play  (play_by_play.json)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct RawPlay {
    #[serde(default, alias = "actionNumber", deserialize_with = "lenient")]
    pub number: Option<Scalar>,
    #[serde(default, rename = "type", alias = "actionType", deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub clock: Option<String>,
    #[serde(default, alias = "description", deserialize_with = "lenient")]
    pub desc: Option<String>,
    #[serde(default, alias = "homeScore", alias = "scoreHome", deserialize_with = "lenient")]
    pub home_score: Option<Scalar>,
    #[serde(default, alias = "awayScore", alias = "scoreAway", deserialize_with = "lenient")]
    pub away_score: Option<Scalar>,
    #[serde(default, alias = "period", deserialize_with = "lenient")]
    pub quarter: Option<Scalar>,
}

impl RawPlay {
    pub fn number(&self) -> Option<i64> {
        self.number.as_ref().and_then(Scalar::as_i64)
    }
}

/// The play file is either a bare list or the live-data feed envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPlayByPlay {
    List(Vec<RawPlay>),
    Feed { game: RawPlayFeed },
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct RawPlayFeed {
    #[serde(default)]
    pub actions: Vec<RawPlay>,
}

impl RawPlayByPlay {
    pub fn into_plays(self) -> Vec<RawPlay> {
        match self {
            RawPlayByPlay::List(plays) => plays,
            RawPlayByPlay::Feed { game } => game.actions,
        }
    }
}

// ---------------------------------------------------------------------------
// Box score  (box_score.json)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawBoxScoreFile {
    #[serde(default, alias = "gameId", deserialize_with = "lenient")]
    pub id: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub home: Option<RawTeamBoxScore>,
    #[serde(default, deserialize_with = "lenient")]
    pub away: Option<RawTeamBoxScore>,
}

impl RawBoxScoreFile {
    pub fn id_text(&self) -> Option<String> {
        self.id.as_ref().map(Scalar::to_text).filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawTeamBoxScore {
    #[serde(default, alias = "teamTricode", deserialize_with = "lenient")]
    pub abv: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub box_score: Option<RawBoxScore>,
    /// Per-player lines; category leaders are derived from these when `boxScore` is absent.
    #[serde(default, deserialize_with = "lenient")]
    pub players: Option<Vec<RawPlayerStats>>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawBoxScore {
    #[serde(default, alias = "assists", deserialize_with = "lenient")]
    pub assist: Option<RawStatLeader>,
    #[serde(default, deserialize_with = "lenient")]
    pub blocks: Option<RawStatLeader>,
    #[serde(default, deserialize_with = "lenient")]
    pub fouled: Option<RawStatLeader>,
    #[serde(default, deserialize_with = "lenient")]
    pub fouler: Option<RawStatLeader>,
    #[serde(default, deserialize_with = "lenient")]
    pub steals: Option<RawStatLeader>,
    #[serde(default, deserialize_with = "lenient")]
    pub turnovers: Option<RawStatLeader>,
    #[serde(default, deserialize_with = "lenient")]
    pub points: Option<RawStatLeader>,
    #[serde(default, deserialize_with = "lenient")]
    pub paint_points: Option<RawStatLeader>,
    #[serde(default, deserialize_with = "lenient")]
    pub threes: Option<RawStatLeader>,
    #[serde(default, deserialize_with = "lenient")]
    pub rebounds: Option<RawStatLeader>,
    #[serde(default, deserialize_with = "lenient")]
    pub off_rebounds: Option<RawStatLeader>,
    #[serde(default, deserialize_with = "lenient")]
    pub def_rebounds: Option<RawStatLeader>,
}

impl RawBoxScore {
    pub fn leader(&self, category: StatCategory) -> Option<&RawStatLeader> {
        match category {
            StatCategory::Assists => self.assist.as_ref(),
            StatCategory::Blocks => self.blocks.as_ref(),
            StatCategory::Fouled => self.fouled.as_ref(),
            StatCategory::Fouler => self.fouler.as_ref(),
            StatCategory::Steals => self.steals.as_ref(),
            StatCategory::Turnovers => self.turnovers.as_ref(),
            StatCategory::Points => self.points.as_ref(),
            StatCategory::PaintPoints => self.paint_points.as_ref(),
            StatCategory::Threes => self.threes.as_ref(),
            StatCategory::Rebounds => self.rebounds.as_ref(),
            StatCategory::OffRebounds => self.off_rebounds.as_ref(),
            StatCategory::DefRebounds => self.def_rebounds.as_ref(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct RawStatLeader {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub value: Option<Scalar>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawPlayerStats {
    #[serde(default, alias = "nameI", deserialize_with = "lenient")]
    pub player_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub statistics: Option<RawPlayerStatistics>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawPlayerStatistics {
    #[serde(default, deserialize_with = "lenient")]
    pub assists: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub blocks: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub fouls_drawn: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub fouls_personal: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub steals: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub turnovers: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub points: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub points_in_the_paint: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub three_pointers_made: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub rebounds_total: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub rebounds_offensive: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub rebounds_defensive: Option<i64>,
}

impl RawPlayerStatistics {
    pub fn value(&self, category: StatCategory) -> Option<i64> {
        match category {
            StatCategory::Assists => self.assists,
            StatCategory::Blocks => self.blocks,
            StatCategory::Fouled => self.fouls_drawn,
            StatCategory::Fouler => self.fouls_personal,
            StatCategory::Steals => self.steals,
            StatCategory::Turnovers => self.turnovers,
            StatCategory::Points => self.points,
            StatCategory::PaintPoints => self.points_in_the_paint,
            StatCategory::Threes => self.three_pointers_made,
            StatCategory::Rebounds => self.rebounds_total,
            StatCategory::OffRebounds => self.rebounds_offensive,
            StatCategory::DefRebounds => self.rebounds_defensive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wrong_typed_fields_decode_to_none() {
        let raw: RawGame = serde_json::from_value(json!({
            "id": "G1",
            "clock": 42,
            "home": "not a team",
            "period": true,
        }))
        .unwrap();
        assert_eq!(raw.id_text().as_deref(), Some("G1"));
        assert!(raw.clock.is_none());
        assert!(raw.home.is_none());
        assert!(raw.period.is_none());
    }

    #[test]
    fn live_feed_aliases_are_accepted() {
        let raw: RawGame = serde_json::from_value(json!({
            "gameId": "0022000123",
            "gameTimeUTC": "2021-02-18T01:00:00Z",
            "gameClock": "PT05M12.00S",
            "period": { "current": 3, "type": 0, "isHalftime": false, "isEndOfPeriod": false },
            "homeTeam": { "teamId": 1610612750, "teamTricode": "MIN", "wins": 7, "losses": "21", "score": "88" },
        }))
        .unwrap();
        assert_eq!(raw.id_text().as_deref(), Some("0022000123"));
        assert_eq!(raw.period.as_ref().and_then(RawPeriod::number), Some(3));
        let home = raw.home.unwrap();
        assert_eq!(home.tri_code.as_deref(), Some("MIN"));
        assert_eq!(home.loss.as_ref().and_then(Scalar::as_i64), Some(21));
        assert_eq!(home.score.as_ref().and_then(Scalar::as_i64), Some(88));
    }

    #[test]
    fn empty_object_is_empty_game() {
        let raw: RawGame = serde_json::from_value(json!({})).unwrap();
        assert!(raw.is_empty());
        let raw: RawGame = serde_json::from_value(json!({ "clock": "1:00" })).unwrap();
        assert!(!raw.is_empty());
    }

    #[test]
    fn line_scores_accept_numbers_and_objects() {
        let raw: RawTeam = serde_json::from_value(json!({
            "periods": [30, { "period": 2, "score": "25" }, { "period": 3 }],
        }))
        .unwrap();
        let scores: Vec<Option<u16>> = raw.periods.unwrap().iter().map(RawLineScore::score).collect();
        assert_eq!(scores, vec![Some(30), Some(25), None]);
    }

    #[test]
    fn play_file_accepts_list_and_feed_envelope() {
        let list: RawPlayByPlay = serde_json::from_value(json!([
            { "number": 1, "type": "period", "clock": "12:00", "desc": "Start", "home_score": 0, "away_score": 0, "quarter": 1 }
        ]))
        .unwrap();
        assert_eq!(list.into_plays().len(), 1);

        let feed: RawPlayByPlay = serde_json::from_value(json!({
            "game": { "actions": [
                { "actionNumber": 7, "actionType": "2pt", "scoreHome": "2", "scoreAway": "0", "period": 1 }
            ] }
        }))
        .unwrap();
        let plays = feed.into_plays();
        assert_eq!(plays[0].number(), Some(7));
        assert_eq!(plays[0].home_score.as_ref().and_then(Scalar::as_i64), Some(2));
    }

    #[test]
    fn scalar_truthiness() {
        assert!(Scalar::Text("1".into()).is_truthy());
        assert!(Scalar::Text("true".into()).is_truthy());
        assert!(Scalar::Text(" Yes ".into()).is_truthy());
        assert!(!Scalar::Text("no".into()).is_truthy());
        assert!(!Scalar::Text("0".into()).is_truthy());
        assert!(Scalar::Number(2).is_truthy());
        assert!(!Scalar::Flag(false).is_truthy());
    }
}
