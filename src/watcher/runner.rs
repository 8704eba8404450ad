//! Watcher runner - builds the collaborators and drives the loop.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::capture::{FrameSource, ReplayCapture};
use crate::identify::TemplateLibrary;
use crate::review::{review_channel, OperatorConsole, StdinConsole};
use crate::tracking::{DashboardSink, JsonDashboard};
use crate::watcher::config::get_config;
use crate::watcher::state::{Watcher, WatcherState};

/// Runs the state machine until it stops and returns the final state.
pub fn run_watcher<F: FrameSource, C: OperatorConsole, D: DashboardSink>(
    watcher: &mut Watcher<F, C, D>,
) -> WatcherState {
    loop {
        match watcher.step() {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                crate::log(&format!("[WATCH] Watcher error: {:#}", e));
                watcher.state = WatcherState::Error(e.to_string());
                break;
            }
        }
    }

    match &watcher.state {
        WatcherState::Stopped => crate::log(&format!(
            "[WATCH] Stopped after {} cycle(s), {} play(s) in {:.1}s",
            watcher.cycles,
            watcher.plays.len(),
            watcher.start_time.elapsed().as_secs_f32()
        )),
        WatcherState::Aborted => crate::log(&format!("[WATCH] {}", watcher.status_string())),
        WatcherState::Error(msg) => crate::log(&format!("[WATCH] Failed: {}", msg)),
        _ => {}
    }

    let snapshot = watcher.tracker.snapshot();
    crate::log(&format!(
        "[ROTATION] Final hand {:?} | queue {:?}",
        snapshot.hand, snapshot.queue
    ));

    watcher.state.clone()
}

/// Signal handler body: asks the watcher to stop before its next cycle.
fn abort_on_signal(abort: Arc<AtomicBool>) -> impl Fn() + Send + 'static {
    move || {
        crate::log("[WATCH] Termination signal received, stopping after this cycle");
        abort.store(true, Ordering::SeqCst);
    }
}

/// Watches the recorded frames in `frames_dir` (or the default frames
/// directory) with the global configuration.
pub fn start(frames_dir: Option<PathBuf>) -> Result<WatcherState> {
    let config = get_config().clone();
    let frames_dir = frames_dir.unwrap_or_else(crate::paths::get_frames_dir);

    let source = ReplayCapture::open(&frames_dir, config.capture_origin)
        .context("Failed to open replay capture")?;

    let learned_dir = crate::paths::get_learned_templates_dir();
    let library = TemplateLibrary::load_dirs(
        &[crate::paths::get_templates_dir(), learned_dir.clone()],
        config.blur_sigma,
    );

    let output_dir = crate::paths::get_output_dir();
    let dashboard = JsonDashboard::new(output_dir.join("dashboard.json"));
    crate::log(&format!("[WATCH] Dashboard: {}", dashboard.path().display()));

    // Terminal prompts run on their own thread behind a channel console
    let (console, desk) = review_channel();
    let preview_path = output_dir.join("review_preview.png");
    let desk_thread = std::thread::spawn(move || desk.serve(StdinConsole::new(preview_path)));

    let mut watcher = Watcher::new(config, source, console, dashboard, library, learned_dir);
    watcher.debug_view = Some(output_dir.join("debug_view.png"));

    if let Err(e) = ctrlc::set_handler(abort_on_signal(watcher.abort_handle())) {
        crate::log(&format!("[WARN] Failed to install Ctrl-C handler: {}", e));
    }

    let state = run_watcher(&mut watcher);

    let unplayed = watcher.source.remaining();
    if unplayed > 0 {
        crate::log(&format!("[CAPTURE] {} frame(s) left unplayed", unplayed));
    }

    // Dropping the watcher hangs up the desk
    drop(watcher);
    match desk_thread.join() {
        Ok(served) => crate::log(&format!("[REVIEW] {} review(s) answered", served)),
        Err(_) => crate::log("[REVIEW] Review desk thread panicked"),
    }

    Ok(state)
}
