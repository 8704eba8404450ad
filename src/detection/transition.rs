use super::occupancy::OccupancyState;

/// Edge between two consecutive classifications of a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotTransition {
    /// EMPTY -> FULL: a card was played into the slot
    Filled,
    /// FULL -> EMPTY
    Emptied,
}

/// Compares two classifications. The first classification of a slot
/// (`previous == Unknown`) is a baseline and never produces an edge.
pub fn detect_transition(
    previous: OccupancyState,
    current: OccupancyState,
) -> Option<SlotTransition> {
    match (previous, current) {
        (OccupancyState::Empty, OccupancyState::Full) => Some(SlotTransition::Filled),
        (OccupancyState::Full, OccupancyState::Empty) => Some(SlotTransition::Emptied),
        _ => None,
    }
}

/// Last known occupancy of every monitored slot.
#[derive(Clone, Debug)]
pub struct SlotStates {
    states: Vec<OccupancyState>,
}

impl SlotStates {
    pub fn new(slot_count: usize) -> Self {
        Self {
            states: vec![OccupancyState::Unknown; slot_count],
        }
    }

    pub fn get(&self, slot: usize) -> OccupancyState {
        self.states.get(slot).copied().unwrap_or_default()
    }

    /// Records the current classification and returns the edge, if any.
    pub fn apply(&mut self, slot: usize, current: OccupancyState) -> Option<SlotTransition> {
        let previous = self.states.get_mut(slot)?;
        let transition = detect_transition(*previous, current);
        *previous = current;
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OccupancyState::*;

    #[test]
    fn test_detect_transition_edges() {
        assert_eq!(detect_transition(Empty, Full), Some(SlotTransition::Filled));
        assert_eq!(detect_transition(Full, Empty), Some(SlotTransition::Emptied));
        assert_eq!(detect_transition(Full, Full), None);
        assert_eq!(detect_transition(Empty, Empty), None);
    }

    #[test]
    fn test_first_classification_is_baseline() {
        assert_eq!(detect_transition(Unknown, Full), None);
        assert_eq!(detect_transition(Unknown, Empty), None);

        let mut states = SlotStates::new(8);
        for slot in 0..8 {
            let current = if slot % 2 == 0 { Full } else { Empty };
            assert_eq!(states.apply(slot, current), None);
        }
        assert_eq!(states.get(0), Full);
        assert_eq!(states.get(1), Empty);
    }

    #[test]
    fn test_one_event_per_change() {
        let mut states = SlotStates::new(1);
        assert_eq!(states.apply(0, Empty), None);
        assert_eq!(states.apply(0, Full), Some(SlotTransition::Filled));
        assert_eq!(states.apply(0, Full), None);
        assert_eq!(states.apply(0, Empty), Some(SlotTransition::Emptied));
    }

    #[test]
    fn test_unknown_slot_index_is_ignored() {
        let mut states = SlotStates::new(2);
        assert_eq!(states.apply(5, Full), None);
        assert_eq!(states.get(5), Unknown);
    }
}
