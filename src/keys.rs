use crate::app::App;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Returns `false` when the key asks to quit.
pub async fn handle_key_bindings(key_event: KeyEvent, app: &Arc<Mutex<App>>) -> bool {
    let mut guard = app.lock().await;

    match (key_event.code, key_event.modifiers) {
        (Char('q'), _) | (Char('c'), KeyModifiers::CONTROL) => return false,
        (Char('f'), _) => guard.toggle_full_screen(),
        (Char('"'), _) => guard.toggle_show_logs(),
        _ => {}
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::app_settings::{AppSettings, CliArgs};
    use crossterm::event::KeyCode;
    use tempfile::TempDir;

    fn app(dir: &TempDir) -> Arc<Mutex<App>> {
        let cli = CliArgs {
            data_dir: Some(dir.path().to_path_buf()),
            ..CliArgs::default()
        };
        Arc::new(Mutex::new(App::new(AppSettings::from_lookup(cli, |_| None))))
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[tokio::test]
    async fn toggles_full_screen_and_logs() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        assert!(handle_key_bindings(key(Char('f'), KeyModifiers::NONE), &app).await);
        assert!(handle_key_bindings(key(Char('"'), KeyModifiers::SHIFT), &app).await);
        let guard = app.lock().await;
        assert!(guard.settings.full_screen);
        assert!(guard.state.show_logs);
    }

    #[tokio::test]
    async fn quit_keys() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        assert!(!handle_key_bindings(key(Char('q'), KeyModifiers::NONE), &app).await);
        assert!(!handle_key_bindings(key(Char('c'), KeyModifiers::CONTROL), &app).await);
        assert!(handle_key_bindings(key(Char('c'), KeyModifiers::NONE), &app).await);
        assert!(handle_key_bindings(key(KeyCode::Esc, KeyModifiers::NONE), &app).await);
    }
}
