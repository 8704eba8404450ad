//! Rotation inference and dashboard publication.

pub mod dashboard;
pub mod rotation;

pub use dashboard::{DashboardSink, DashboardSnapshot, JsonDashboard};
pub use rotation::{RotationPhase, RotationSnapshot, RotationTracker};
