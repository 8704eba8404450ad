//! Polling state machine for the watcher.
//!
//! Every `Watching` step is one cycle: grab a frame, classify each slot in
//! id order, and follow any EMPTY -> FULL edge on a hand slot through
//! identification, review, and rotation tracking. Cycles that change a slot
//! also rewrite the debug view. The abort handle is checked between cycles
//! only.

use anyhow::{anyhow, Result};
use image::RgbImage;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::capture::{CaptureRegion, FrameSource};
use crate::detection::{
    render_debug_view, sample_slot, OccupancyClassifier, OccupancyState, SlotMark, SlotStates,
    SlotTransition,
};
use crate::error::WatchError;
use crate::identify::TemplateLibrary;
use crate::review::{ConfirmationSource, OperatorConsole, Reviewer};
use crate::tracking::{DashboardSink, DashboardSnapshot, RotationTracker};
use crate::watcher::config::{SlotConfig, WatcherConfig};

/// Watcher states.
#[derive(Debug, Clone, PartialEq)]
pub enum WatcherState {
    /// Not started
    Idle,
    /// Polling frames
    Watching,
    /// Capture source gave out
    Stopped,
    /// Abort handle was set
    Aborted,
    /// Unrecoverable setup problem
    Error(String),
}

impl std::fmt::Display for WatcherState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WatcherState::Idle => write!(f, "Idle"),
            WatcherState::Watching => write!(f, "Watching"),
            WatcherState::Stopped => write!(f, "Stopped"),
            WatcherState::Aborted => write!(f, "Aborted"),
            WatcherState::Error(msg) => write!(f, "Error: {}", msg),
        }
    }
}

/// One confirmed play fed into the rotation tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayEvent {
    pub slot: usize,
    pub name: String,
    pub source: ConfirmationSource,
    pub score: f32,
    /// Card the tracker moved into the slot, once past bootstrap
    pub predicted: Option<String>,
    /// Cycle the edge was seen in (1-based)
    pub cycle: u64,
}

/// Watcher context owning every piece of per-run state.
pub struct Watcher<F: FrameSource, C: OperatorConsole, D: DashboardSink> {
    /// Current state
    pub state: WatcherState,
    pub config: WatcherConfig,
    pub source: F,
    pub console: C,
    pub dashboard: D,
    pub classifier: OccupancyClassifier,
    pub slot_states: SlotStates,
    pub library: TemplateLibrary,
    pub reviewer: Reviewer,
    pub tracker: RotationTracker,
    /// Capture failures since the last successful grab
    pub consecutive_failures: u32,
    /// Completed cycles
    pub cycles: u64,
    /// Every confirmed play, in order
    pub plays: Vec<PlayEvent>,
    /// Last card confirmed in each slot
    pub identities: Vec<Option<String>>,
    /// Where the debug view is written; `None` disables it
    pub debug_view: Option<PathBuf>,
    /// Slots already reported as not fitting the frame
    out_of_bounds: HashSet<usize>,
    abort: Arc<AtomicBool>,
    /// Time the watcher was created
    pub start_time: Instant,
}

impl<F: FrameSource, C: OperatorConsole, D: DashboardSink> Watcher<F, C, D> {
    pub fn new(
        mut config: WatcherConfig,
        source: F,
        console: C,
        dashboard: D,
        library: TemplateLibrary,
        learned_dir: PathBuf,
    ) -> Self {
        config.slots.sort_by_key(|slot| slot.id);
        let slot_count = config.slots.iter().map(|s| s.id + 1).max().unwrap_or(0);

        Self {
            state: WatcherState::Idle,
            classifier: OccupancyClassifier::from_config(&config),
            slot_states: SlotStates::new(slot_count),
            reviewer: Reviewer::new(config.confirmation_threshold, learned_dir),
            tracker: RotationTracker::new(),
            config,
            source,
            console,
            dashboard,
            library,
            consecutive_failures: 0,
            cycles: 0,
            plays: Vec::new(),
            identities: vec![None; slot_count],
            debug_view: None,
            out_of_bounds: HashSet::new(),
            abort: Arc::new(AtomicBool::new(false)),
            start_time: Instant::now(),
        }
    }

    /// Shared flag that stops the watcher before its next cycle.
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    /// Advances the watcher by one step.
    ///
    /// Returns `Ok(true)` to keep going, `Ok(false)` once stopped or aborted.
    pub fn step(&mut self) -> Result<bool> {
        if self.abort.load(Ordering::SeqCst) {
            crate::log("[WATCH] Abort requested, stopping");
            self.state = WatcherState::Aborted;
            return Ok(false);
        }

        match &self.state {
            WatcherState::Idle => {
                if self.config.slots.is_empty() {
                    return Err(anyhow!("No slots configured"));
                }
                if self.library.is_empty() {
                    crate::log("[WATCH] Template library is empty; every play will be reviewed");
                }
                crate::log(&format!(
                    "[WATCH] Watching {} slot(s), {} hand slot(s), threshold {:.2}",
                    self.config.slots.len(),
                    self.config.hand_slot_count,
                    self.reviewer.threshold()
                ));
                self.state = WatcherState::Watching;
                Ok(true)
            }

            WatcherState::Watching => {
                let Some(frame) = self.source.grab() else {
                    return Ok(self.on_capture_failure());
                };
                self.consecutive_failures = 0;
                self.cycles += 1;

                let region = self.source.region_info();
                let slots = self.config.slots.clone();
                let mut changed = false;
                for slot in &slots {
                    changed |= self.process_slot(&frame, &region, slot);
                }

                if changed {
                    self.write_debug_view(&frame, &region);
                }
                self.publish();
                sleep_ms(self.config.poll_interval_ms);
                Ok(true)
            }

            WatcherState::Stopped | WatcherState::Aborted | WatcherState::Error(_) => Ok(false),
        }
    }

    /// Counts a failed grab. Returns false once the ceiling is reached.
    fn on_capture_failure(&mut self) -> bool {
        self.consecutive_failures += 1;
        let err = WatchError::CaptureFailure {
            consecutive: self.consecutive_failures,
            limit: self.config.max_capture_failures,
        };
        crate::log(&format!("[CAPTURE] {}", err));

        if self.consecutive_failures >= self.config.max_capture_failures {
            crate::log("[CAPTURE] Failure ceiling reached, stopping");
            self.state = WatcherState::Stopped;
            return false;
        }

        sleep_ms(self.config.capture_retry_ms);
        true
    }

    /// Classifies one slot and follows its edge. Returns true if the slot's
    /// state changed, including its first classification.
    fn process_slot(
        &mut self,
        frame: &RgbImage,
        region: &CaptureRegion,
        slot: &SlotConfig,
    ) -> bool {
        let Some(img) = self.sample(frame, region, slot) else {
            return false;
        };

        let previous = self.slot_states.get(slot.id);
        let signals = self.classifier.measure(&img);
        let current = self.classifier.decide(&signals);

        match self.slot_states.apply(slot.id, current) {
            Some(SlotTransition::Filled) => {
                crate::log(&format!(
                    "[SLOT] S{} {} -> {} ({})",
                    slot.id, previous, current, signals
                ));
                if self.config.is_hand_slot(slot.id) {
                    self.handle_play(slot);
                }
                true
            }
            Some(SlotTransition::Emptied) => {
                crate::log(&format!(
                    "[SLOT] S{} {} -> {} ({})",
                    slot.id, previous, current, signals
                ));
                true
            }
            None if previous == OccupancyState::Unknown => {
                crate::log(&format!(
                    "[SLOT] S{} initial state {} ({})",
                    slot.id, current, signals
                ));
                true
            }
            None => false,
        }
    }

    /// Writes the boxed and labelled frame to the debug view path, if set.
    fn write_debug_view(&self, frame: &RgbImage, region: &CaptureRegion) {
        let Some(path) = &self.debug_view else {
            return;
        };

        let marks: Vec<SlotMark> = self
            .config
            .slots
            .iter()
            .filter(|slot| !self.out_of_bounds.contains(&slot.id))
            .map(|slot| SlotMark {
                id: slot.id,
                x: slot.left - region.left,
                y: slot.top - region.top,
                state: self.slot_states.get(slot.id),
                identity: self.identities.get(slot.id).cloned().flatten(),
            })
            .collect();

        let view = render_debug_view(
            frame,
            &marks,
            self.config.card_width,
            self.config.card_height,
            self.config.debug_view_scale,
        );
        if let Err(e) = view.save(path) {
            crate::log(&format!(
                "[DEBUG] Failed to write debug view {}: {}",
                path.display(),
                e
            ));
        }
    }

    /// Crops a slot, reporting a slot that does not fit only once until it
    /// fits again.
    fn sample(
        &mut self,
        frame: &RgbImage,
        region: &CaptureRegion,
        slot: &SlotConfig,
    ) -> Option<RgbImage> {
        match sample_slot(
            frame,
            region,
            slot,
            self.config.card_width,
            self.config.card_height,
        ) {
            Ok(img) => {
                self.out_of_bounds.remove(&slot.id);
                Some(img)
            }
            Err(e) => {
                if self.out_of_bounds.insert(slot.id) {
                    crate::log(&format!("[SLOT] {}, skipping", e));
                }
                None
            }
        }
    }

    /// Identifies the card that just filled `slot` and records the play.
    fn handle_play(&mut self, slot: &SlotConfig) {
        // Let the play animation finish before re-sampling
        sleep_ms(self.config.settle_delay_ms);

        let Some(frame) = self.source.grab() else {
            crate::log(&format!("[PLAY] S{} re-capture failed, dropping event", slot.id));
            return;
        };
        let region = self.source.region_info();
        let Some(candidate) = self.sample(&frame, &region, slot) else {
            return;
        };

        let guess = self.library.best_guess(&candidate);
        crate::log(&format!(
            "[PLAY] S{} best guess '{}' score {:.3}",
            slot.id,
            guess.name.as_deref().unwrap_or("-"),
            guess.score
        ));

        let confirmation = match self.reviewer.resolve(
            slot.id,
            &candidate,
            guess,
            &mut self.library,
            &mut self.console,
        ) {
            Ok(confirmation) => confirmation,
            Err(e) => {
                crate::log(&format!("[PLAY] {}, dropping event", e));
                return;
            }
        };

        if let Some(identity) = self.identities.get_mut(slot.id) {
            *identity = Some(confirmation.name.clone());
        }

        match self.tracker.observe_play(slot.id, &confirmation.name) {
            Ok(predicted) => {
                crate::log(&format!(
                    "[PLAY] S{} {} ({}, {:.3})",
                    slot.id, confirmation.name, confirmation.source, confirmation.score
                ));
                self.plays.push(PlayEvent {
                    slot: slot.id,
                    name: confirmation.name,
                    source: confirmation.source,
                    score: confirmation.score,
                    predicted,
                    cycle: self.cycles,
                });
            }
            Err(e) => crate::log(&format!("[PLAY] {}", e)),
        }
    }

    fn publish(&mut self) {
        let snapshot = DashboardSnapshot::from_rotation(&self.tracker.snapshot());
        if let Err(e) = self.dashboard.publish(&snapshot) {
            crate::log(&format!("[DASHBOARD] Failed to publish: {:#}", e));
        }
    }

    /// Returns a one-line status for logging.
    pub fn status_string(&self) -> String {
        match &self.state {
            WatcherState::Watching => format!(
                "Watching - cycle {}, {} play(s), {}",
                self.cycles,
                self.plays.len(),
                self.tracker.phase()
            ),
            state => format!("{} after {} cycle(s)", state, self.cycles),
        }
    }
}

fn sleep_ms(ms: u64) {
    if ms > 0 {
        std::thread::sleep(Duration::from_millis(ms));
    }
}
