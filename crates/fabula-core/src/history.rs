//! World-state snapshot history.

use crate::world::WorldState;

/// An append-only sequence of world-state snapshots.
///
/// Index 0 is the initial state; one snapshot is pushed after every
/// state-changing action or event. The history exists for speculative plan
/// rollback: truncation restores both the length and the current state in a
/// single operation, so no reader can observe a half-reverted session.
#[derive(Debug, Clone)]
pub struct StateHistory {
    snapshots: Vec<WorldState>,
}

impl StateHistory {
    /// Create a history seeded with the initial state.
    pub fn new(initial: WorldState) -> Self {
        Self {
            snapshots: vec![initial],
        }
    }

    /// Record a snapshot of the state after a change.
    pub fn push(&mut self, snapshot: WorldState) {
        self.snapshots.push(snapshot);
    }

    /// Number of recorded snapshots (at least 1).
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always false; the initial snapshot is never discarded.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The most recent snapshot.
    pub fn last(&self) -> &WorldState {
        self.snapshots
            .last()
            .expect("history always holds the initial snapshot")
    }

    /// Drop every snapshot recorded after `len` and return the surviving
    /// most recent snapshot. Truncating to a larger length is a no-op.
    pub fn truncate_to(&mut self, len: usize) -> &WorldState {
        let keep = len.max(1);
        self.snapshots.truncate(keep);
        self.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fact::Fact;

    fn state(n: i64) -> WorldState {
        let mut world = WorldState::new();
        world.insert(Fact::binary("counter", "c1", crate::fact::Num::Int(n)));
        world
    }

    #[test]
    fn truncate_restores_earlier_snapshot() {
        let mut history = StateHistory::new(state(0));
        history.push(state(1));
        history.push(state(2));
        assert_eq!(history.len(), 3);

        let restored = history.truncate_to(1);
        assert_eq!(restored, &state(0));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn truncate_never_drops_initial_state() {
        let mut history = StateHistory::new(state(0));
        history.push(state(1));
        history.truncate_to(0);
        assert_eq!(history.len(), 1);
        assert_eq!(history.last(), &state(0));
    }

    #[test]
    fn truncate_to_larger_length_is_noop() {
        let mut history = StateHistory::new(state(0));
        history.push(state(1));
        history.truncate_to(5);
        assert_eq!(history.len(), 2);
        assert_eq!(history.last(), &state(1));
    }
}
