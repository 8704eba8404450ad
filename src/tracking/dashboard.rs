//! Publication of the inferred rotation.
//!
//! The watcher hands an owned snapshot to a `DashboardSink` after every
//! successful cycle. `JsonDashboard` writes it to a file that external
//! renderers can poll; the write goes through a temp file and a rename so
//! readers never see a half-written document.

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use super::rotation::RotationSnapshot;

/// What a dashboard shows: one entry per slot plus the structured view.
#[derive(Clone, Debug, Serialize)]
pub struct DashboardSnapshot {
    /// Hand slots 0..4, then queue positions 4..8
    pub slots: Vec<Option<String>>,
    pub hand: Vec<Option<String>>,
    pub queue: Vec<String>,
    /// Local time, `%Y-%m-%dT%H:%M:%S%.3f`
    pub updated_at: String,
}

impl DashboardSnapshot {
    pub fn from_rotation(rotation: &RotationSnapshot) -> Self {
        Self {
            slots: rotation.to_slots(),
            hand: rotation.hand.to_vec(),
            queue: rotation.queue.clone(),
            updated_at: Local::now().format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
        }
    }
}

pub trait DashboardSink {
    fn publish(&mut self, snapshot: &DashboardSnapshot) -> Result<()>;
}

/// Writes each snapshot as pretty JSON to a fixed path.
pub struct JsonDashboard {
    path: PathBuf,
}

impl JsonDashboard {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl DashboardSink for JsonDashboard {
    fn publish(&mut self, snapshot: &DashboardSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(snapshot)
            .context("Failed to serialize dashboard snapshot")?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        Ok(())
    }
}
