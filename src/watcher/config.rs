//! Configuration types for the watcher.
//!
//! Loads settings from config.json at startup. Provides slot positions,
//! occupancy and identification thresholds, and timing parameters.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<WatcherConfig> = OnceLock::new();

/// Absolute screen position of one monitored card slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotConfig {
    /// Slot index (0..N-1). Indices below `hand_slot_count` are hand slots.
    pub id: usize,
    /// Screen X of the top-left corner
    pub left: i64,
    /// Screen Y of the top-left corner
    pub top: i64,
}

/// Screen position of the replayed frames' top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureOrigin {
    pub top: i64,
    pub left: i64,
}

/// Complete watcher configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// Monitored slots, evaluated in id order every cycle
    pub slots: Vec<SlotConfig>,
    /// Fixed slot width in pixels
    pub card_width: u32,
    /// Fixed slot height in pixels
    pub card_height: u32,
    /// Slots with an index below this feed the rotation tracker
    pub hand_slot_count: usize,
    /// Origin reported by the replay capture backend
    pub capture_origin: CaptureOrigin,
    /// Half side of the centered window used for the background color average
    pub center_half: u32,
    /// Average colors of an empty slot, as `#rrggbb`
    pub background_colors: Vec<String>,
    /// Maximum RGB distance to a background color for the slot to count as empty
    pub red_color_tolerance: f32,
    /// Mean HSV saturation (0-255) above which a card is present
    pub saturation_threshold: f32,
    /// Match score accepted without asking the operator (0.0-1.0)
    pub confirmation_threshold: f32,
    /// Gaussian blur sigma applied before template comparison
    pub blur_sigma: f32,
    /// Consecutive capture failures tolerated before stopping
    pub max_capture_failures: u32,
    /// Delay between capture retries (milliseconds)
    pub capture_retry_ms: u64,
    /// Delay after a slot fills before re-sampling it (milliseconds)
    pub settle_delay_ms: u64,
    /// Delay between polling cycles (milliseconds)
    pub poll_interval_ms: u64,
    /// Size of the written debug view relative to the frame
    pub debug_view_scale: f32,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            slots: (0..8)
                .map(|id| SlotConfig {
                    id,
                    left: 731 + 65 * id as i64,
                    top: 58,
                })
                .collect(),
            card_width: 61,
            card_height: 90,
            hand_slot_count: 4,
            capture_origin: CaptureOrigin::default(),
            center_half: 40,
            background_colors: ["#92463a", "#843c32", "#9c4c3c", "#8c3c34", "#7c342c"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            red_color_tolerance: 25.0,
            saturation_threshold: 60.0,
            confirmation_threshold: 0.75,
            // sigma of OpenCV's 3x3 kernel
            blur_sigma: 0.8,
            max_capture_failures: 5,
            capture_retry_ms: 1000,
            settle_delay_ms: 1500,
            poll_interval_ms: 30,
            debug_view_scale: 0.5,
        }
    }
}

impl WatcherConfig {
    /// Returns true if the slot index takes part in rotation tracking.
    pub fn is_hand_slot(&self, slot: usize) -> bool {
        slot < self.hand_slot_count
    }

    /// Parses `background_colors` into RGB triples, skipping malformed entries.
    pub fn background_palette(&self) -> Vec<[u8; 3]> {
        self.background_colors
            .iter()
            .filter_map(|hex| match parse_hex_color(hex) {
                Some(rgb) => Some(rgb),
                None => {
                    crate::log(&format!(
                        "[CONFIG] Ignoring malformed background color '{}'",
                        hex
                    ));
                    None
                }
            })
            .collect()
    }

    /// Load config from file, or return defaults if it is missing or invalid.
    pub fn load(config_path: &Path) -> Self {
        crate::log(&format!("Looking for config at: {}", config_path.display()));

        if config_path.exists() {
            match fs::read_to_string(config_path) {
                Ok(contents) => match serde_json::from_str(&contents) {
                    Ok(config) => {
                        crate::log("Config loaded from config.json");
                        return config;
                    }
                    Err(e) => {
                        crate::log(&format!(
                            "Failed to parse config.json: {}. Using defaults.",
                            e
                        ));
                    }
                },
                Err(e) => {
                    crate::log(&format!(
                        "Failed to read config.json: {}. Using defaults.",
                        e
                    ));
                }
            }
        } else {
            crate::log("config.json not found. Using default config.");
        }

        Self::default()
    }

    /// Save default config to file (for reference).
    pub fn save_default(config_path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&Self::default())?;
        fs::write(config_path, json)?;
        Ok(())
    }
}

/// Parses `#rrggbb` (leading `#` optional) into an RGB triple.
pub fn parse_hex_color(hex: &str) -> Option<[u8; 3]> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some([r, g, b])
}

/// Initializes the global configuration. Call once at startup.
/// Looks for config.json in the same directory as the executable.
pub fn init_config() {
    let config_path = crate::paths::get_exe_dir().join("config.json");
    let _ = CONFIG.set(WatcherConfig::load(&config_path));
}

/// Returns a reference to the global configuration.
/// Panics if called before init_config().
pub fn get_config() -> &'static WatcherConfig {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
}
