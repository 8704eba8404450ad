//! Watcher module for following the opponent's card cycle.
//!
//! This module provides:
//! - Configuration loaded from config.json (`config`)
//! - The per-cycle polling state machine (`state`)
//! - The runner that wires capture, review, and dashboard together (`runner`)

pub mod config;
pub mod runner;
pub mod state;

pub use config::{get_config, init_config, WatcherConfig};
pub use runner::{run_watcher, start};
pub use state::{PlayEvent, Watcher, WatcherState};
