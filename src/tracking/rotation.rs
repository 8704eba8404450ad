//! FIFO model of the opponent's card rotation.
//!
//! Eight cards cycle through four visible hand slots and a hidden queue of
//! four. A played card goes to the back of the queue and the card at the
//! front takes its hand slot. The first four plays only fill the queue;
//! after that every play both reveals a hand card and advances the queue.

use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

use crate::error::WatchError;

pub const HAND_SIZE: usize = 4;
pub const QUEUE_CAPACITY: usize = 4;

/// Whether the queue has been filled yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotationPhase {
    /// Fewer than `QUEUE_CAPACITY` plays seen
    Bootstrap { observed: usize },
    SteadyState,
}

impl fmt::Display for RotationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationPhase::Bootstrap { observed } => {
                write!(f, "Bootstrap ({}/{})", observed, QUEUE_CAPACITY)
            }
            RotationPhase::SteadyState => write!(f, "Steady state"),
        }
    }
}

/// Owned copy of the inferred rotation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RotationSnapshot {
    pub hand: [Option<String>; HAND_SIZE],
    /// Front of the queue first
    pub queue: Vec<String>,
}

impl RotationSnapshot {
    /// Per-slot view: hand slots 0..4, then queue positions 4..8.
    pub fn to_slots(&self) -> Vec<Option<String>> {
        let mut slots: Vec<Option<String>> = self.hand.to_vec();
        slots.extend((0..QUEUE_CAPACITY).map(|i| self.queue.get(i).cloned()));
        slots
    }
}

#[derive(Clone, Debug, Default)]
pub struct RotationTracker {
    hand: [Option<String>; HAND_SIZE],
    queue: VecDeque<String>,
}

impl RotationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `card_name` was played from `hand_slot`.
    ///
    /// Returns the card predicted to have moved into `hand_slot`, or `None`
    /// while bootstrapping. Slots outside the hand are rejected without
    /// touching the model.
    pub fn observe_play(
        &mut self,
        hand_slot: usize,
        card_name: &str,
    ) -> Result<Option<String>, WatchError> {
        if hand_slot >= HAND_SIZE {
            return Err(WatchError::InvalidHandSlot { slot: hand_slot });
        }

        if self.queue.len() < QUEUE_CAPACITY {
            self.queue.push_back(card_name.to_string());
            crate::log(&format!(
                "[ROTATION] {} queued from S{} | {}",
                card_name,
                hand_slot,
                self.phase()
            ));
            return Ok(None);
        }

        let predicted = self.queue.pop_front();
        self.hand[hand_slot] = predicted.clone();
        self.queue.push_back(card_name.to_string());

        crate::log(&format!(
            "[ROTATION] {} played from S{} -> S{} now {}",
            card_name,
            hand_slot,
            hand_slot,
            predicted.as_deref().unwrap_or("-")
        ));
        Ok(predicted)
    }

    pub fn current_hand(&self) -> &[Option<String>; HAND_SIZE] {
        &self.hand
    }

    /// Queue contents, front first.
    pub fn queue_snapshot(&self) -> Vec<String> {
        self.queue.iter().cloned().collect()
    }

    pub fn snapshot(&self) -> RotationSnapshot {
        RotationSnapshot {
            hand: self.hand.clone(),
            queue: self.queue_snapshot(),
        }
    }

    pub fn phase(&self) -> RotationPhase {
        if self.queue.len() < QUEUE_CAPACITY {
            RotationPhase::Bootstrap {
                observed: self.queue.len(),
            }
        } else {
            RotationPhase::SteadyState
        }
    }
}
