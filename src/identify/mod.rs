//! Card identification by nearest reference image.
//!
//! This module provides:
//! - Template file name normalization (`naming`)
//! - Blurred-luma normalized cross-correlation (`matcher`)
//! - The append-only reference library (`TemplateLibrary`)

pub mod library;
pub mod matcher;
pub mod naming;

pub use library::TemplateLibrary;

/// Best match for a candidate image.
#[derive(Clone, Debug, PartialEq)]
pub struct Identification {
    /// Card name, or `None` when nothing in the library could be compared
    pub name: Option<String>,
    /// Match score in [0, 1]
    pub score: f32,
}

impl Identification {
    pub fn none() -> Self {
        Self {
            name: None,
            score: 0.0,
        }
    }

    /// True if the match is good enough to accept without review.
    pub fn is_confident(&self, threshold: f32) -> bool {
        self.name.is_some() && self.score >= threshold
    }
}
