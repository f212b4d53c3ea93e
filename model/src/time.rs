use chrono::{DateTime, Local};
use std::fmt;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedTimestamp {
    pub input: String,
}

impl fmt::Display for MalformedTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed timestamp: {:?}", self.input)
    }
}

impl std::error::Error for MalformedTimestamp {}

/// Parse a wire timestamp carrying an explicit UTC offset into local time.
///
/// Accepts RFC 3339 (`2021-02-18T01:10:24Z`, `...+00:00`, fractional seconds) and the compact
/// `%Y-%m-%dT%H:%M:%S%z` form (`2021-02-18T01:10:24+0000`). Timestamps without an offset are
/// rejected rather than guessed.
pub fn parse_instant(input: &str) -> Result<DateTime<Local>, MalformedTimestamp> {
    let trimmed = input.trim();
    DateTime::parse_from_rfc3339(trimmed)
        .or_else(|_| DateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%z"))
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|_| MalformedTimestamp { input: input.to_owned() })
}

/// Countdown from `now` until `target`, or `None` once `target` has been reached.
///
/// More than six hours out shows the absolute date and time. From one hour up to six hours
/// inclusive it is `"{h}h {m}m"`, from one minute it is `"{m}m"`, and below a minute it counts
/// down in whole seconds.
pub fn format_duration_until(target: DateTime<Local>, now: DateTime<Local>) -> Option<String> {
    let secs = (target - now).num_seconds();
    if secs <= 0 {
        return None;
    }
    let formatted = if secs > 6 * HOUR {
        target.format("%m/%d/%y %H:%M").to_string()
    } else if secs >= HOUR {
        format!("{}h {}m", secs / HOUR, (secs % HOUR) / MINUTE)
    } else if secs >= MINUTE {
        format!("{}m", secs / MINUTE)
    } else {
        format!("{secs}s")
    };
    Some(formatted)
}

/// Normalize an ISO-8601 game clock (`PT05M12.00S`) to `05:12`. Anything else passes through.
pub fn game_clock(raw: &str) -> String {
    let trimmed = raw.trim();
    parse_iso_clock(trimmed).unwrap_or_else(|| trimmed.to_owned())
}

fn parse_iso_clock(raw: &str) -> Option<String> {
    let rest = raw.strip_prefix("PT")?;
    let (minutes, seconds) = rest.split_once('M')?;
    let seconds = seconds.strip_suffix('S')?;
    let whole = seconds.split('.').next()?;
    let minutes: u32 = minutes.parse().ok()?;
    let whole: u32 = whole.parse().ok()?;
    Some(format!("{minutes:02}:{whole:02}"))
}
