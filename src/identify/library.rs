//! In-memory reference library and nearest-template lookup.

use image::{GrayImage, RgbImage};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::matcher::{match_score, preprocess};
use super::naming::canonical_card_name;
use super::Identification;
use crate::error::WatchError;

const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// One card and its preprocessed reference images.
#[derive(Debug, Clone)]
pub struct CardReference {
    pub name: String,
    images: Vec<GrayImage>,
}

impl CardReference {
    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}

/// Reference images keyed by canonical card name.
///
/// Insertion order is kept so that ties during lookup resolve to the card
/// that was loaded first. The library only grows.
#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    cards: Vec<CardReference>,
    index: HashMap<String, usize>,
    blur_sigma: f32,
}

impl TemplateLibrary {
    pub fn new(blur_sigma: f32) -> Self {
        Self {
            cards: Vec::new(),
            index: HashMap::new(),
            blur_sigma,
        }
    }

    /// Loads every template directory in order. Missing directories and
    /// unreadable files are logged and skipped.
    pub fn load_dirs(dirs: &[PathBuf], blur_sigma: f32) -> Self {
        let mut library = Self::new(blur_sigma);

        for dir in dirs {
            if !dir.exists() {
                crate::log(&format!(
                    "[WARN][TEMPLATES] Directory not found: {}",
                    dir.display()
                ));
                continue;
            }
            library.load_dir(dir);
        }

        crate::log(&format!(
            "[INIT][TEMPLATES] Total={} | Unique cards={}",
            library.image_count(),
            library.len()
        ));
        if !library.is_empty() {
            crate::log(&format!(
                "[INIT][TEMPLATES] Cards: {}",
                library.names().collect::<Vec<_>>().join(", ")
            ));
        }
        library
    }

    /// Loads one directory and returns the number of images added.
    pub fn load_dir(&mut self, dir: &Path) -> usize {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                crate::log(&format!(
                    "[WARN][TEMPLATES] Failed to read {}: {}",
                    dir.display(),
                    e
                ));
                return 0;
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| is_supported(path))
            .collect();
        paths.sort();

        crate::log(&format!(
            "[INIT][TEMPLATES] {}: loading {} file(s)",
            dir.display(),
            paths.len()
        ));

        let mut loaded = 0;
        for path in paths {
            match load_reference(&path) {
                Ok((name, image)) => {
                    self.add_reference(&name, &image);
                    loaded += 1;
                }
                Err(e) => crate::log(&format!("[WARN][TEMPLATES] {}", e)),
            }
        }
        loaded
    }

    /// Adds a reference image under `name`. Takes effect for the next lookup.
    pub fn add_reference(&mut self, name: &str, image: &RgbImage) {
        let processed = preprocess(image, self.blur_sigma);

        match self.index.get(name) {
            Some(&idx) => self.cards[idx].images.push(processed),
            None => {
                self.index.insert(name.to_string(), self.cards.len());
                self.cards.push(CardReference {
                    name: name.to_string(),
                    images: vec![processed],
                });
            }
        }
    }

    /// Scores the candidate against every reference and returns the best.
    ///
    /// An empty library yields `(None, 0.0)`. References that cannot be
    /// compared are skipped.
    pub fn best_guess(&self, candidate: &RgbImage) -> Identification {
        let mut best = Identification::none();
        if self.cards.is_empty() {
            return best;
        }

        let target = preprocess(candidate, self.blur_sigma);

        for card in &self.cards {
            for reference in &card.images {
                let Ok(score) = match_score(&target, reference) else {
                    continue;
                };
                if score > best.score {
                    best = Identification {
                        name: Some(card.name.clone()),
                        score,
                    };
                }
            }
        }

        best
    }

    pub fn get(&self, name: &str) -> Option<&CardReference> {
        self.index.get(name).map(|&idx| &self.cards[idx])
    }

    /// Card names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cards.iter().map(|card| card.name.as_str())
    }

    /// Number of unique card names.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Total number of reference images.
    pub fn image_count(&self) -> usize {
        self.cards.iter().map(CardReference::image_count).sum()
    }
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Decodes one template file and derives its card name.
fn load_reference(path: &Path) -> Result<(String, RgbImage), WatchError> {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = canonical_card_name(&stem);
    if name.is_empty() {
        return Err(WatchError::ReferenceLoad {
            path: path.to_path_buf(),
            reason: "file name yields no card name".to_string(),
        });
    }

    let image = image::open(path).map_err(|e| WatchError::ReferenceLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok((name, image.to_rgb8()))
}
