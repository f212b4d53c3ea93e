pub mod app_settings;
pub mod app_state;
pub mod messages;
pub mod refresher;
pub mod watcher;
