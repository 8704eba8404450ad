//! Per-slot occupancy detection.
//!
//! This module provides:
//! - Slot cropping from full-screen frames (`sample_slot`)
//! - EMPTY/FULL classification from color statistics
//! - Edge detection between consecutive classifications
//! - The debug view with slot boxes and identity labels (`overlay`)

pub mod occupancy;
pub mod overlay;
pub mod region;
pub mod transition;

pub use occupancy::{OccupancyClassifier, OccupancyState};
pub use overlay::{render_debug_view, SlotMark};
pub use region::sample_slot;
pub use transition::{SlotStates, SlotTransition};
