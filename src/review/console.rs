//! Operator consoles for low-confidence reviews.
//!
//! The review step parks the watcher until an answer arrives. Where the
//! answer comes from is behind `OperatorConsole`: a terminal prompt, or an
//! mpsc channel pair so another thread (or a test) can decide.

use chrono::{DateTime, Local, TimeDelta};
use image::RgbImage;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, SendError, Sender};

/// Everything an operator needs to decide on one candidate.
#[derive(Debug, Clone)]
pub struct ReviewRequest {
    /// Slot the card appeared in
    pub slot: usize,
    /// Best library match, if any
    pub guess: Option<String>,
    /// Score of the best match
    pub score: f32,
    /// The re-sampled slot image
    pub image: RgbImage,
    /// When the review was requested
    pub requested_at: DateTime<Local>,
}

impl ReviewRequest {
    pub fn new(slot: usize, guess: Option<String>, score: f32, image: RgbImage) -> Self {
        Self {
            slot,
            guess,
            score,
            image,
            requested_at: Local::now(),
        }
    }

    /// Time since the review was requested.
    pub fn waited(&self) -> TimeDelta {
        Local::now() - self.requested_at
    }
}

/// A source of operator answers.
///
/// `ask` blocks until the operator answers and returns the raw line. An
/// empty answer confirms the suggestion; anything else replaces it. Console
/// failures are reported as an empty answer.
pub trait OperatorConsole {
    fn ask(&mut self, request: &ReviewRequest) -> String;
}

/// Prompts on the terminal.
///
/// The candidate is written to `preview_path` so the operator can open it
/// while the prompt waits.
pub struct StdinConsole {
    preview_path: PathBuf,
}

impl StdinConsole {
    pub fn new(preview_path: PathBuf) -> Self {
        Self { preview_path }
    }

    fn write_preview(&self, request: &ReviewRequest) {
        match request.image.save(&self.preview_path) {
            Ok(()) => crate::log(&format!(
                "[REVIEW] S{} candidate image: {}",
                request.slot,
                self.preview_path.display()
            )),
            Err(e) => crate::log(&format!(
                "[REVIEW] Failed to write preview {}: {}",
                self.preview_path.display(),
                e
            )),
        }
    }
}

impl OperatorConsole for StdinConsole {
    fn ask(&mut self, request: &ReviewRequest) -> String {
        self.write_preview(request);

        crate::log(&format!(
            "[REVIEW] S{} suggestion='{}' score={:.2}",
            request.slot,
            request.guess.as_deref().unwrap_or("-"),
            request.score
        ));
        crate::log("[REVIEW] ENTER confirms the suggestion; type a name to correct it.");

        print!("Review> ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        if let Err(e) = std::io::stdin().lock().read_line(&mut line) {
            crate::log(&format!("[REVIEW] Failed to read answer: {}", e));
            line.clear();
        }

        crate::log(&format!(
            "[REVIEW] S{} answered after {:.1}s",
            request.slot,
            request.waited().num_milliseconds() as f32 / 1000.0
        ));
        line
    }
}

/// Forwards review requests over a channel and waits for the answer.
pub struct ChannelConsole {
    requests: Sender<ReviewRequest>,
    answers: Receiver<String>,
}

/// The deciding end of a `ChannelConsole`.
pub struct ReviewDesk {
    requests: Receiver<ReviewRequest>,
    answers: Sender<String>,
}

impl ReviewDesk {
    /// Blocks until the watcher asks for a review. `None` once the console is dropped.
    pub fn next_request(&self) -> Option<ReviewRequest> {
        self.requests.recv().ok()
    }

    pub fn answer(&self, text: &str) -> Result<(), SendError<String>> {
        self.answers.send(text.to_string())
    }

    /// Answers every request with `console` until the watcher side hangs up.
    /// Returns the number of reviews served.
    pub fn serve<C: OperatorConsole>(self, mut console: C) -> usize {
        let mut served = 0;
        while let Some(request) = self.next_request() {
            let answer = console.ask(&request);
            if self.answer(&answer).is_err() {
                break;
            }
            served += 1;
        }
        served
    }
}

/// Creates a connected console/desk pair.
///
/// Both channels are unbounded, but the console never has more than one
/// request outstanding because `ask` waits for its answer.
pub fn review_channel() -> (ChannelConsole, ReviewDesk) {
    let (request_tx, request_rx) = channel();
    let (answer_tx, answer_rx) = channel();
    (
        ChannelConsole {
            requests: request_tx,
            answers: answer_rx,
        },
        ReviewDesk {
            requests: request_rx,
            answers: answer_tx,
        },
    )
}

impl OperatorConsole for ChannelConsole {
    fn ask(&mut self, request: &ReviewRequest) -> String {
        if self.requests.send(request.clone()).is_err() {
            crate::log("[REVIEW] Review desk is gone, treating as empty answer");
            return String::new();
        }

        self.answers.recv().unwrap_or_else(|_| {
            crate::log("[REVIEW] Review desk closed without answering");
            String::new()
        })
    }
}
