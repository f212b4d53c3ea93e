use log::{LevelFilter, warn};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_REFRESH: Duration = Duration::from_secs(180);
const MIN_REFRESH: Duration = Duration::from_secs(1);
const DEFAULT_POLL: Duration = Duration::from_millis(1000);
const MIN_POLL: Duration = Duration::from_millis(100);
/// Text mode has no log pane, so its log goes here unless `COURTSIDE_LOG_FILE` says otherwise.
pub const TEXT_MODE_LOG_FILE: &str = "courtside.log";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Print the scene to stdout whenever it changes.
    #[default]
    Text,
    /// Full-terminal small-display panel.
    Display,
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(RenderMode::Text),
            "display" => Ok(RenderMode::Display),
            other => Err(format!("unknown mode {other:?}, expected text or display")),
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Text => f.write_str("text"),
            RenderMode::Display => f.write_str("display"),
        }
    }
}

/// What the command line asked for; anything left `None` comes from the environment.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CliArgs {
    pub mode: Option<RenderMode>,
    pub lazy: bool,
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub data_dir: PathBuf,
    pub mode: RenderMode,
    /// Render only on the periodic tick instead of after every snapshot.
    pub lazy: bool,
    pub refresh_interval: Duration,
    pub poll_interval: Duration,
    pub log_level: LevelFilter,
    /// Where the captured log is also written. Always set in text mode.
    pub log_file: Option<PathBuf>,
    pub full_screen: bool,
}

impl AppSettings {
    pub fn load(cli: CliArgs) -> Self {
        Self::from_lookup(cli, |key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(cli: CliArgs, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = cli
            .data_dir
            .or_else(|| non_empty(&lookup, "COURTSIDE_DATA_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let mode = cli
            .mode
            .or_else(|| parsed(&lookup, "COURTSIDE_MODE"))
            .unwrap_or_default();
        let log_file = non_empty(&lookup, "COURTSIDE_LOG_FILE")
            .map(PathBuf::from)
            .or_else(|| match mode {
                RenderMode::Text => Some(std::env::temp_dir().join(TEXT_MODE_LOG_FILE)),
                RenderMode::Display => None,
            });

        Self {
            data_dir,
            mode,
            lazy: cli.lazy,
            refresh_interval: parsed(&lookup, "COURTSIDE_REFRESH_SECS")
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_REFRESH)
                .max(MIN_REFRESH),
            poll_interval: parsed(&lookup, "COURTSIDE_POLL_MS")
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_POLL)
                .max(MIN_POLL),
            log_level: parsed(&lookup, "COURTSIDE_LOG").unwrap_or(LevelFilter::Info),
            log_file,
            full_screen: false,
        }
    }
}

fn non_empty<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str) -> Option<String> {
    lookup(key).filter(|value| !value.trim().is_empty())
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = non_empty(lookup, key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring {key}={raw:?}, using the default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(cli: CliArgs, env: &[(&str, &str)]) -> AppSettings {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppSettings::from_lookup(cli, |key| env.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let s = settings(CliArgs::default(), &[]);
        assert_eq!(s.data_dir, PathBuf::from("data"));
        assert_eq!(s.mode, RenderMode::Text);
        assert!(!s.lazy);
        assert_eq!(s.refresh_interval, Duration::from_secs(180));
        assert_eq!(s.poll_interval, Duration::from_millis(1000));
        assert_eq!(s.log_level, LevelFilter::Info);
        assert_eq!(s.log_file, Some(std::env::temp_dir().join(TEXT_MODE_LOG_FILE)));
    }

    #[test]
    fn log_file_default_follows_the_render_mode() {
        let display = CliArgs {
            mode: Some(RenderMode::Display),
            ..CliArgs::default()
        };
        assert_eq!(settings(display.clone(), &[]).log_file, None);

        let explicit = [("COURTSIDE_LOG_FILE", "/var/log/courtside.log")];
        let expected = Some(PathBuf::from("/var/log/courtside.log"));
        assert_eq!(settings(display, &explicit).log_file, expected);
        assert_eq!(settings(CliArgs::default(), &explicit).log_file, expected);
    }

    #[test]
    fn environment_overrides_defaults() {
        let s = settings(
            CliArgs::default(),
            &[
                ("COURTSIDE_DATA_DIR", "/srv/scores"),
                ("COURTSIDE_MODE", "Display"),
                ("COURTSIDE_REFRESH_SECS", "30"),
                ("COURTSIDE_POLL_MS", "250"),
                ("COURTSIDE_LOG", "debug"),
            ],
        );
        assert_eq!(s.data_dir, PathBuf::from("/srv/scores"));
        assert_eq!(s.mode, RenderMode::Display);
        assert_eq!(s.refresh_interval, Duration::from_secs(30));
        assert_eq!(s.poll_interval, Duration::from_millis(250));
        assert_eq!(s.log_level, LevelFilter::Debug);
    }

    #[test]
    fn command_line_wins_over_environment() {
        let cli = CliArgs {
            mode: Some(RenderMode::Text),
            lazy: true,
            data_dir: Some(PathBuf::from("here")),
        };
        let s = settings(cli, &[("COURTSIDE_DATA_DIR", "there"), ("COURTSIDE_MODE", "display")]);
        assert_eq!(s.data_dir, PathBuf::from("here"));
        assert_eq!(s.mode, RenderMode::Text);
        assert!(s.lazy);
    }

    #[test]
    fn bad_values_fall_back_and_intervals_are_clamped() {
        let s = settings(
            CliArgs::default(),
            &[
                ("COURTSIDE_MODE", "hologram"),
                ("COURTSIDE_REFRESH_SECS", "0"),
                ("COURTSIDE_POLL_MS", "5"),
                ("COURTSIDE_LOG", "loud"),
                ("COURTSIDE_DATA_DIR", "  "),
            ],
        );
        assert_eq!(s.mode, RenderMode::Text);
        assert_eq!(s.refresh_interval, Duration::from_secs(1));
        assert_eq!(s.poll_interval, Duration::from_millis(100));
        assert_eq!(s.log_level, LevelFilter::Info);
        assert_eq!(s.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn mode_parsing() {
        assert_eq!("text".parse::<RenderMode>(), Ok(RenderMode::Text));
        assert_eq!(" DISPLAY ".parse::<RenderMode>(), Ok(RenderMode::Display));
        assert!("eink".parse::<RenderMode>().is_err());
        assert_eq!(RenderMode::Display.to_string(), "display");
    }
}
