//! Cycle Watcher
//!
//! Watches the opponent's card slots in a stream of screenshots, identifies
//! each card as it is played, and infers the hidden part of the rotation.
//!
//! Usage: `cycle-watcher [FRAMES_DIR]` replays the screenshots in
//! `FRAMES_DIR` (default `<exe_dir>/frames/`). `cycle-watcher --write-config`
//! writes the default config.json next to the executable.

mod capture;
mod detection;
mod error;
mod identify;
mod paths;
mod review;
mod tracking;
mod watcher;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use watcher::{WatcherConfig, WatcherState};

const LOG_FILE_NAME: &str = "cycle_watcher.log";

/// Logs a message to both console and log file with timestamp.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    print!("{}", line);
    let log_path = paths::get_logs_dir().join(LOG_FILE_NAME);
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}

fn main() -> Result<()> {
    // Set up panic hook to log panics
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = panic_info
            .location()
            .map(|loc| format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_default();
        let log_msg = format!("[PANIC]{} {}\n", location, msg);
        eprintln!("{}", log_msg);
        let log_path = paths::get_logs_dir().join(LOG_FILE_NAME);
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&log_path) {
            let _ = file.write_all(log_msg.as_bytes());
        }
    }));

    paths::ensure_directories().context("Failed to create working directories")?;

    let arg = std::env::args().nth(1);
    if arg.as_deref() == Some("--write-config") {
        let config_path = paths::get_exe_dir().join("config.json");
        WatcherConfig::save_default(&config_path)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        log(&format!("Default config written to {}", config_path.display()));
        return Ok(());
    }

    watcher::init_config();

    match watcher::start(arg.map(PathBuf::from))? {
        WatcherState::Error(msg) => Err(anyhow::anyhow!("Watcher failed: {}", msg)),
        state => {
            log(&format!("Watcher finished: {}", state));
            Ok(())
        }
    }
}
