//! Perception and exploration tracking.
//!
//! The player never sees the whole fact set. Each turn perceives: their own
//! location, the mutable-state facts of visible room contents, the inventory
//! content and its item count, and the current room's passages. The tracker
//! accumulates what has ever been perceived and records one snapshot per
//! turn, which plan rollback truncates together with the world history.

use std::collections::HashSet;

use fabula_core::{Fact, WorldState};
use fabula_defs::AdventureDef;

use crate::binding::player_room;
use crate::constants::{INVENTORY_ID, PLAYER_ID};
use crate::describe::Describer;

/// The facts the player perceives in the current state.
pub fn current_perceived(world: &WorldState, def: &AdventureDef) -> HashSet<Fact> {
    let mut perceived = HashSet::new();
    let describer = Describer::new(world, def);

    for fact in world.facts_about(PLAYER_ID) {
        if fact.predicate == "at" {
            perceived.insert(fact.clone());
        }
    }

    let visible = describer.visible_room_contents();
    for fact in world.iter() {
        let Some(subject) = fact.id_arg(0) else {
            continue;
        };
        if visible.iter().any(|v| v == subject)
            && def.domain.mutable_predicates.contains(&fact.predicate)
        {
            perceived.insert(fact.clone());
        }
    }

    let inventory = describer.inventory_contents();
    for fact in world.iter() {
        let Some(subject) = fact.id_arg(0) else {
            continue;
        };
        if inventory.iter().any(|v| v == subject)
            && (fact.predicate == "at" || fact.predicate == "in")
        {
            perceived.insert(fact.clone());
        }
        if subject == INVENTORY_ID && fact.predicate == "itemcount" {
            perceived.insert(fact.clone());
        }
    }

    if let Some(room) = player_room(world) {
        for fact in world.facts_with_predicate("exit") {
            if fact.id_arg(0) == Some(room.as_str()) {
                perceived.insert(fact.clone());
            }
        }
    }

    perceived
}

/// Exploration metadata attached to every turn result.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplorationReport {
    /// Whether the resolved action gathers knowledge.
    pub action_epistemic: bool,
    /// Whether the resolved action advances goals.
    pub action_pragmatic: bool,
    /// Newly perceived facts this turn, counted for epistemic actions only.
    pub epistemic_gain: usize,
    /// Share of entities whose location has ever been perceived.
    pub known_entities_ratio: f64,
    /// Share of rooms the player has ever stood in.
    pub visited_rooms_ratio: f64,
    /// Share of goal-relevant entities among the known ones.
    pub known_goal_entities_ratio: f64,
}

/// Accumulates the player's knowledge of the world over a session.
#[derive(Debug, Clone, Default)]
pub struct ExplorationTracker {
    state: HashSet<Fact>,
    history: Vec<HashSet<Fact>>,
}

impl ExplorationTracker {
    /// Create a tracker seeded with the initially perceived facts.
    pub fn new(initial: HashSet<Fact>) -> Self {
        Self {
            state: initial.clone(),
            history: vec![initial],
        }
    }

    /// Number of recorded snapshots.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// The accumulated exploration state.
    pub fn state(&self) -> &HashSet<Fact> {
        &self.state
    }

    /// Record one turn: union in the newly perceived facts, drop the facts
    /// the turn's own effects removed, and snapshot.
    ///
    /// Dropping only the action's removals (instead of intersecting with the
    /// current perception) keeps knowledge gained in other rooms intact when
    /// the player moves away.
    pub fn track(&mut self, perceived: HashSet<Fact>, removed: &[Fact]) {
        let prior = self
            .history
            .last()
            .cloned()
            .unwrap_or_default();
        let newly: HashSet<Fact> = perceived.difference(&prior).cloned().collect();
        self.state.extend(newly);
        for fact in removed {
            self.state.remove(fact);
        }
        self.history.push(self.state.clone());
    }

    /// Drop every snapshot recorded after `len` and restore the state.
    pub fn truncate_to(&mut self, len: usize) {
        let keep = len.max(1);
        self.history.truncate(keep);
        self.state = self.history.last().cloned().unwrap_or_default();
    }

    /// Build the exploration report for the just-resolved turn.
    pub fn report(
        &self,
        world: &WorldState,
        goals: &HashSet<Fact>,
        action_epistemic: bool,
        action_pragmatic: bool,
    ) -> ExplorationReport {
        let prior = if self.history.len() >= 2 {
            self.history[self.history.len() - 2].clone()
        } else {
            HashSet::new()
        };
        let gained = self.state.difference(&prior).count();
        let epistemic_gain = if action_epistemic { gained } else { 0 };

        let all_entities = world.entity_instances().count();
        let known_entities: HashSet<&Fact> = self
            .state
            .iter()
            .filter(|f| f.predicate == "at")
            .collect();
        let known_entities_ratio = ratio(known_entities.len(), all_entities);

        let all_rooms = world.room_instances().count();
        let visited_rooms: HashSet<&str> = self
            .history
            .iter()
            .flatten()
            .filter(|f| f.predicate == "at" && f.id_arg(0) == Some(PLAYER_ID))
            .filter_map(|f| f.id_arg(1))
            .collect();
        let visited_rooms_ratio = ratio(visited_rooms.len(), all_rooms);

        let mut goal_entities: HashSet<&str> = HashSet::new();
        for goal in goals {
            goal_entities.extend(goal.args.iter().filter_map(|a| a.as_id()));
        }
        let known_goal: HashSet<&Fact> = known_entities
            .iter()
            .filter(|known| {
                known
                    .id_arg(0)
                    .is_some_and(|id| goal_entities.contains(id))
            })
            .copied()
            .collect();
        let known_goal_entities_ratio = ratio(known_goal.len(), goal_entities.len());

        ExplorationReport {
            action_epistemic,
            action_pragmatic,
            epistemic_gain,
            known_entities_ratio,
            visited_rooms_ratio,
            known_goal_entities_ratio,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
