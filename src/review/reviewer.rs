//! Confirmation of low-confidence identifications.

use image::RgbImage;
use std::fmt;
use std::path::PathBuf;

use super::console::{OperatorConsole, ReviewRequest};
use super::store::save_learned_template;
use crate::error::WatchError;
use crate::identify::naming::normalize_operator_input;
use crate::identify::{Identification, TemplateLibrary};

/// Where a confirmed name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationSource {
    /// Accepted from the library without asking
    Template,
    /// Confirmed or typed by the operator
    Manual,
}

impl fmt::Display for ConfirmationSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfirmationSource::Template => write!(f, "TEMPLATE"),
            ConfirmationSource::Manual => write!(f, "MANUAL"),
        }
    }
}

/// A card name that is safe to feed into rotation tracking.
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    pub name: String,
    pub source: ConfirmationSource,
    pub score: f32,
    /// Learned image written for a manual confirmation
    pub saved_to: Option<PathBuf>,
}

/// Turns a best guess into a confirmed name, asking the operator when the
/// guess is not confident enough.
pub struct Reviewer {
    threshold: f32,
    learned_dir: PathBuf,
}

impl Reviewer {
    pub fn new(threshold: f32, learned_dir: PathBuf) -> Self {
        Self {
            threshold,
            learned_dir,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Resolves the candidate in `slot`.
    ///
    /// A guess scoring at or above the threshold is accepted as is. Anything
    /// else goes to the console; an empty answer keeps the guess. Manually
    /// confirmed names are saved to the learned directory and added to
    /// `library` so the next lookup sees them. Fails with `ReviewAbort` when
    /// no name results.
    pub fn resolve<C: OperatorConsole + ?Sized>(
        &self,
        slot: usize,
        candidate: &RgbImage,
        guess: Identification,
        library: &mut TemplateLibrary,
        console: &mut C,
    ) -> Result<Confirmation, WatchError> {
        if guess.is_confident(self.threshold) {
            if let Some(name) = guess.name {
                return Ok(Confirmation {
                    name,
                    source: ConfirmationSource::Template,
                    score: guess.score,
                    saved_to: None,
                });
            }
        }

        crate::log(&format!(
            "[REVIEW] S{} low confidence: guess='{}' score={:.2} < {:.2}",
            slot,
            guess.name.as_deref().unwrap_or("-"),
            guess.score,
            self.threshold
        ));

        let request = ReviewRequest::new(slot, guess.name.clone(), guess.score, candidate.clone());
        let answer = console.ask(&request);

        let Some(name) = normalize_operator_input(&answer).or(guess.name) else {
            crate::log(&format!("[REVIEW] S{} no name given, dropping event", slot));
            return Err(WatchError::ReviewAbort { slot });
        };

        let saved_to = match save_learned_template(&self.learned_dir, &name, candidate) {
            Ok(path) => Some(path),
            Err(e) => {
                crate::log(&format!(
                    "[REVIEW] Failed to save learned image for '{}': {:#}",
                    name, e
                ));
                None
            }
        };
        library.add_reference(&name, candidate);

        crate::log(&format!(
            "[REVIEW] Learned '{}' ({} reference image(s)) -> {}",
            name,
            library.get(&name).map_or(0, |card| card.image_count()),
            saved_to
                .as_ref()
                .map_or("not saved".to_string(), |path| path.display().to_string())
        ));

        Ok(Confirmation {
            name,
            source: ConfirmationSource::Manual,
            score: guess.score,
            saved_to,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{card_art, ScriptedConsole};
    use tempfile::tempdir;

    fn guess(name: Option<&str>, score: f32) -> Identification {
        Identification {
            name: name.map(str::to_string),
            score,
        }
    }

    #[test]
    fn test_confident_guess_skips_console() {
        let dir = tempdir().unwrap();
        let reviewer = Reviewer::new(0.75, dir.path().to_path_buf());
        let mut library = TemplateLibrary::new(0.8);
        let mut console = ScriptedConsole::new(&["should not be used"]);

        let confirmation = reviewer
            .resolve(0, &card_art(1), guess(Some("Hog Rider"), 0.75), &mut library, &mut console)
            .unwrap();

        assert_eq!(confirmation.name, "Hog Rider");
        assert_eq!(confirmation.source, ConfirmationSource::Template);
        assert_eq!(confirmation.saved_to, None);
        assert_eq!(console.prompts.len(), 0);
        assert!(library.is_empty());
    }

    #[test]
    fn test_empty_answer_confirms_guess() {
        let dir = tempdir().unwrap();
        let reviewer = Reviewer::new(0.75, dir.path().to_path_buf());
        let mut library = TemplateLibrary::new(0.8);
        let mut console = ScriptedConsole::new(&[""]);

        let confirmation = reviewer
            .resolve(2, &card_art(1), guess(Some("Giant"), 0.74), &mut library, &mut console)
            .unwrap();

        assert_eq!(confirmation.name, "Giant");
        assert_eq!(confirmation.source, ConfirmationSource::Manual);
        assert_eq!(console.prompts.len(), 1);
        assert_eq!(console.prompts[0].slot, 2);
        assert_eq!(console.prompts[0].guess.as_deref(), Some("Giant"));

        let saved = confirmation.saved_to.unwrap();
        assert!(saved.exists());
        assert!(saved.file_name().unwrap().to_string_lossy().starts_with("giant_"));
    }

    #[test]
    fn test_operator_override_is_learned() {
        let dir = tempdir().unwrap();
        let reviewer = Reviewer::new(0.75, dir.path().to_path_buf());
        let mut library = TemplateLibrary::new(0.8);
        library.add_reference("Giant", &card_art(3));
        let mut console = ScriptedConsole::new(&["  hog rider  "]);

        let candidate = card_art(1);
        let confirmation = reviewer
            .resolve(1, &candidate, guess(Some("Giant"), 0.3), &mut library, &mut console)
            .unwrap();

        assert_eq!(confirmation.name, "Hog Rider");
        assert_eq!(library.len(), 2);

        // The next identical candidate is now confident
        let next = library.best_guess(&candidate);
        assert_eq!(next.name.as_deref(), Some("Hog Rider"));
        assert!(next.is_confident(0.75));
    }

    #[test]
    fn test_confirmed_name_survives_reload() {
        let dir = tempdir().unwrap();
        let reviewer = Reviewer::new(0.75, dir.path().to_path_buf());

        for (seed, typed) in [(1, "x-bow"), (2, "ice_golem"), (4, "barbarians evo")] {
            let mut library = TemplateLibrary::new(0.8);
            let mut console = ScriptedConsole::new(&[typed]);
            let confirmation = reviewer
                .resolve(0, &card_art(seed), Identification::none(), &mut library, &mut console)
                .unwrap();

            let reloaded = TemplateLibrary::load_dirs(&[dir.path().to_path_buf()], 0.8);
            assert!(
                reloaded.get(&confirmation.name).is_some(),
                "'{}' missing after reload: {:?}",
                confirmation.name,
                reloaded.names().collect::<Vec<_>>()
            );
        }

        let reloaded = TemplateLibrary::load_dirs(&[dir.path().to_path_buf()], 0.8);
        let names: Vec<&str> = reloaded.names().collect();
        assert_eq!(names, vec!["Barbarians Evo", "Ice Golem", "X Bow"]);
    }

    #[test]
    fn test_no_guess_and_no_answer_aborts() {
        let dir = tempdir().unwrap();
        let learned = dir.path().join("templates-user");
        let reviewer = Reviewer::new(0.75, learned.clone());
        let mut library = TemplateLibrary::new(0.8);
        let mut console = ScriptedConsole::new(&["   "]);

        let err = reviewer
            .resolve(3, &card_art(1), Identification::none(), &mut library, &mut console)
            .unwrap_err();

        assert!(matches!(err, WatchError::ReviewAbort { slot: 3 }));
        assert!(library.is_empty());
        assert!(!learned.exists());
    }

    #[test]
    fn test_save_failure_still_confirms() {
        let dir = tempdir().unwrap();
        // A file where the learned directory should be
        let blocker = dir.path().join("templates-user");
        std::fs::write(&blocker, b"occupied").unwrap();

        let reviewer = Reviewer::new(0.75, blocker);
        let mut library = TemplateLibrary::new(0.8);
        let mut console = ScriptedConsole::new(&["zap"]);

        let confirmation = reviewer
            .resolve(0, &card_art(2), Identification::none(), &mut library, &mut console)
            .unwrap();

        assert_eq!(confirmation.name, "Zap");
        assert_eq!(confirmation.saved_to, None);
        assert_eq!(library.len(), 1);
    }
}
