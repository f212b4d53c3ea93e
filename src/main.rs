mod app;
mod draw;
mod keys;
mod print;
mod scene;
mod state;
mod ui;

use crate::app::App;
use crate::print::Printer;
use crate::state::app_settings::{AppSettings, CliArgs, RenderMode};
use crate::state::messages::{UiEvent, WatchEvent};
use crate::state::refresher::PeriodicRefresher;
use crate::state::watcher::SnapshotWatcher;
use chrono::Local;
use courtside_model::loader::SnapshotLoader;
use crossterm::event::{self as crossterm_event, Event, KeyEventKind};
use crossterm::{cursor, execute, terminal};
use log::{LevelFilter, error, info};
use std::io::{self, Stdout};
use std::panic;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::time::Duration;
use tui::{Terminal, backend::CrosstermBackend};
use tui_logger::TuiLoggerFile;

const INPUT_POLL: Duration = Duration::from_millis(250);

#[derive(Debug, PartialEq)]
enum CliCommand {
    Run(CliArgs),
    Help,
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(cli) = handle_cli_args() else {
        return Ok(());
    };

    better_panic::install();

    tui_logger::init_logger(LevelFilter::Trace)?;
    let settings = AppSettings::load(cli);
    if let Some(path) = &settings.log_file {
        tui_logger::set_log_file(TuiLoggerFile::new(&path.to_string_lossy()));
        if settings.mode == RenderMode::Text {
            eprintln!("courtside: logging to {}", path.display());
        }
    }

    let (watch_tx, watch_rx) = mpsc::channel::<WatchEvent>(100);

    // Prime change detection before the initial load so nothing written in between is missed.
    let watcher = SnapshotWatcher::new(
        SnapshotLoader::new(&settings.data_dir),
        settings.poll_interval,
        watch_tx.clone(),
    );
    let refresher = PeriodicRefresher::new(watch_tx, settings.refresh_interval);
    let mode = settings.mode;

    let app = Arc::new(Mutex::new(App::new(settings)));
    info!("starting in {mode} mode");

    let watch_task = tokio::spawn(watcher.run());
    let refresh_task = tokio::spawn(refresher.run());

    let result = match mode {
        RenderMode::Text => run_text(app, watch_rx).await,
        RenderMode::Display => run_display(app, watch_rx).await,
    };

    watch_task.abort();
    refresh_task.abort();
    result
}

fn handle_cli_args() -> Option<CliArgs> {
    match parse_args(std::env::args().skip(1)) {
        Ok(CliCommand::Run(cli)) => Some(cli),
        Ok(CliCommand::Help) => {
            println!("{}", usage_text());
            None
        }
        Ok(CliCommand::Version) => {
            println!("courtside {}", env!("CARGO_PKG_VERSION"));
            None
        }
        Err(message) => {
            eprintln!("{message}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn parse_args<I>(args: I) -> Result<CliCommand, String>
where
    I: IntoIterator<Item = String>,
{
    let mut cli = CliArgs::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(CliCommand::Help),
            "-V" | "--version" => return Ok(CliCommand::Version),
            "--lazy" => cli.lazy = true,
            "-m" | "--mode" => {
                let value = args.next().ok_or_else(|| format!("{arg} needs a value"))?;
                cli.mode = Some(value.parse()?);
            }
            flag if flag.starts_with("--mode=") => {
                cli.mode = Some(flag["--mode=".len()..].parse()?);
            }
            flag if flag.starts_with('-') => return Err(format!("Unknown argument: {flag}")),
            dir if cli.data_dir.is_some() => {
                return Err(format!("Only one data directory can be given, got another: {dir}"));
            }
            dir => cli.data_dir = Some(PathBuf::from(dir)),
        }
    }
    Ok(CliCommand::Run(cli))
}

fn usage_text() -> &'static str {
    "courtside - live game scores from snapshot files

Usage:
  courtside [--mode text|display] [--lazy] [DATA_DIR]
  courtside --help
  courtside --version

Options:
  -m, --mode MODE   text prints the scene when it changes (default),
                    display draws a small panel; f=full screen, \"=logs, q=quit
  --lazy            render only on the periodic refresh tick

Environment:
  COURTSIDE_DATA_DIR       Snapshot directory when DATA_DIR is not given (default data)
  COURTSIDE_MODE           Default render mode
  COURTSIDE_REFRESH_SECS   Refresh tick in seconds (default 180)
  COURTSIDE_POLL_MS        File change poll interval in milliseconds (default 1000)
  COURTSIDE_LOG            off|error|warn|info|debug|trace (default info)
  COURTSIDE_LOG_FILE       Also write the log to this file. Text mode has no log pane and
                           writes to courtside.log in the temp directory unless this is set"
}

// ---------------------------------------------------------------------------
// Text mode
// ---------------------------------------------------------------------------

async fn run_text(
    app: Arc<Mutex<App>>,
    mut watch_events: mpsc::Receiver<WatchEvent>,
) -> anyhow::Result<()> {
    let mut printer = Printer::new(io::stdout());
    {
        let mut guard = app.lock().await;
        printer.render(guard.compose_scene(Local::now()))?;
    }

    loop {
        tokio::select! {
            Some(event) = watch_events.recv() => {
                let mut guard = app.lock().await;
                if guard.on_watch_event(event) {
                    printer.render(guard.compose_scene(Local::now()))?;
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, shutting down");
                return Ok(());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Display mode
// ---------------------------------------------------------------------------

async fn run_display(
    app: Arc<Mutex<App>>,
    mut watch_events: mpsc::Receiver<WatchEvent>,
) -> anyhow::Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    setup_panic_hook();
    setup_terminal()?;

    let (ui_event_tx, mut ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx));

    let result = main_ui_loop(&mut terminal, &app, &mut watch_events, &mut ui_event_rx).await;

    drop(ui_event_rx);
    input_handler.abort();
    cleanup_terminal();
    result
}

async fn main_ui_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &Arc<Mutex<App>>,
    watch_events: &mut mpsc::Receiver<WatchEvent>,
    ui_events: &mut mpsc::Receiver<UiEvent>,
) -> anyhow::Result<()> {
    {
        let mut guard = app.lock().await;
        let scene = guard.compose_scene(Local::now()).clone();
        draw::draw(terminal, &guard, &scene)?;
    }

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                if let UiEvent::KeyPressed(key_event) = ui_event
                    && !keys::handle_key_bindings(key_event, app).await
                {
                    return Ok(());
                }
                // a redraw, not a render pass: dirty flags and the box rotation stay put
                let mut guard = app.lock().await;
                let scene = guard.current_scene(Local::now());
                draw::draw(terminal, &guard, &scene)?;
            }

            Some(event) = watch_events.recv() => {
                let mut guard = app.lock().await;
                if guard.on_watch_event(event) {
                    let scene = guard.compose_scene(Local::now()).clone();
                    draw::draw(terminal, &guard, &scene)?;
                }
            }

            else => return Ok(()),
        }
    }
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    while !ui_events.is_closed() {
        match crossterm_event::poll(INPUT_POLL) {
            Ok(true) => {}
            Ok(false) => {
                tokio::task::yield_now().await;
                continue;
            }
            Err(e) => {
                error!("terminal input failed: {e}");
                break;
            }
        }

        let ui_event = match crossterm_event::read() {
            Ok(Event::Key(key_event)) if key_event.kind == KeyEventKind::Press => {
                Some(UiEvent::KeyPressed(key_event))
            }
            Ok(Event::Resize(_, _)) => Some(UiEvent::Resize),
            Ok(_) => None,
            Err(e) => {
                error!("terminal input failed: {e}");
                break;
            }
        };

        if let Some(ui_event) = ui_event
            && ui_events.send(ui_event).await.is_err()
        {
            break;
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliCommand, String> {
        parse_args(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn no_arguments_runs_with_defaults() {
        assert_eq!(parse(&[]), Ok(CliCommand::Run(CliArgs::default())));
    }

    #[test]
    fn mode_lazy_and_data_dir() {
        let expected = CliArgs {
            mode: Some(RenderMode::Display),
            lazy: true,
            data_dir: Some(PathBuf::from("/srv/scores")),
        };
        assert_eq!(
            parse(&["--mode", "display", "--lazy", "/srv/scores"]),
            Ok(CliCommand::Run(expected.clone()))
        );
        assert_eq!(
            parse(&["/srv/scores", "--mode=display", "--lazy"]),
            Ok(CliCommand::Run(expected))
        );
    }

    #[test]
    fn help_and_version_short_circuit() {
        assert_eq!(parse(&["--lazy", "-h"]), Ok(CliCommand::Help));
        assert_eq!(parse(&["--version"]), Ok(CliCommand::Version));
        assert_eq!(parse(&["-V", "--bogus"]), Ok(CliCommand::Version));
    }

    #[test]
    fn invalid_arguments_are_errors() {
        assert!(parse(&["--bogus"]).is_err());
        assert!(parse(&["--mode"]).is_err());
        assert!(parse(&["--mode", "eink"]).is_err());
        assert!(parse(&["--mode=eink"]).is_err());
        assert!(parse(&["one", "two"]).is_err());
    }
}
