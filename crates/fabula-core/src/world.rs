//! The mutable set of facts describing the current world.

use std::collections::{BTreeMap, HashSet};

use crate::fact::{Fact, Num};

/// Predicate defining an entity instance's type.
pub const TYPE_PREDICATE: &str = "type";
/// Predicate defining a room instance's type.
pub const ROOM_PREDICATE: &str = "room";

/// The set of all currently true facts, plus an instance-to-type index.
///
/// Membership queries are the sole primitive the evaluator uses: no fact
/// carries implicit defaults. The index is maintained by every insert and
/// remove of a `type`/`room` fact, so instance types are never inferred from
/// identifier shape. The index is ordered, which makes "the instance of a
/// type" resolution deterministic when an adventure ever holds duplicates
/// (lowest identifier wins).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldState {
    facts: HashSet<Fact>,
    entity_types: BTreeMap<String, String>,
    room_types: BTreeMap<String, String>,
}

impl WorldState {
    /// Create an empty world state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fact. Returns `false` if it was already present.
    pub fn insert(&mut self, fact: Fact) -> bool {
        if let (Some(id), Some(type_name)) = (fact.id_arg(0), fact.id_arg(1)) {
            if fact.predicate == TYPE_PREDICATE {
                self.entity_types.insert(id.to_string(), type_name.to_string());
            } else if fact.predicate == ROOM_PREDICATE {
                self.room_types.insert(id.to_string(), type_name.to_string());
            }
        }
        self.facts.insert(fact)
    }

    /// Remove a fact. Removing an absent fact is a no-op returning `false`.
    pub fn remove(&mut self, fact: &Fact) -> bool {
        let removed = self.facts.remove(fact);
        if !removed {
            return false;
        }
        if let Some(id) = fact.id_arg(0) {
            if fact.predicate == TYPE_PREDICATE {
                self.entity_types.remove(id);
            } else if fact.predicate == ROOM_PREDICATE {
                self.room_types.remove(id);
            }
        }
        true
    }

    /// Whether the fact is currently true.
    pub fn contains(&self, fact: &Fact) -> bool {
        self.facts.contains(fact)
    }

    /// Iterate over all facts, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.facts.iter()
    }

    /// Number of facts.
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Whether the world holds no facts.
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// The declared type of an entity or room instance.
    pub fn type_of(&self, id: &str) -> Option<&str> {
        self.entity_types
            .get(id)
            .or_else(|| self.room_types.get(id))
            .map(String::as_str)
    }

    /// Whether the identifier names a known entity or room instance.
    pub fn is_instance(&self, id: &str) -> bool {
        self.entity_types.contains_key(id) || self.room_types.contains_key(id)
    }

    /// The instance of the given concrete type, if any exists.
    ///
    /// Adventures are assumed to hold at most one instance per type; if that
    /// assumption is ever violated, the lowest identifier wins.
    pub fn instance_of(&self, type_name: &str) -> Option<&str> {
        let entity = self
            .entity_types
            .iter()
            .find(|(_, t)| t.as_str() == type_name)
            .map(|(id, _)| id.as_str());
        let room = self
            .room_types
            .iter()
            .find(|(_, t)| t.as_str() == type_name)
            .map(|(id, _)| id.as_str());
        match (entity, room) {
            (Some(entity), Some(room)) => Some(entity.min(room)),
            (entity, room) => entity.or(room),
        }
    }

    /// All entity instance identifiers, in identifier order.
    pub fn entity_instances(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entity_types
            .iter()
            .map(|(id, t)| (id.as_str(), t.as_str()))
    }

    /// All room instance identifiers, in identifier order.
    pub fn room_instances(&self) -> impl Iterator<Item = (&str, &str)> {
        self.room_types
            .iter()
            .map(|(id, t)| (id.as_str(), t.as_str()))
    }

    /// Identifiers of all instances (entities and rooms) whose declared type
    /// is one of `type_names`, in identifier order.
    pub fn instances_with_types(&self, type_names: &[String]) -> Vec<String> {
        self.entity_types
            .iter()
            .chain(self.room_types.iter())
            .filter(|(_, t)| type_names.contains(t))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// All facts with the given predicate.
    pub fn facts_with_predicate<'a>(
        &'a self,
        predicate: &'a str,
    ) -> impl Iterator<Item = &'a Fact> {
        self.facts.iter().filter(move |f| f.predicate == predicate)
    }

    /// All facts whose first argument is the given identifier.
    pub fn facts_about<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Fact> {
        self.facts.iter().filter(move |f| f.id_arg(0) == Some(id))
    }

    /// The numeric value of the function fact `predicate(owner,n)`, if any.
    pub fn numeric_value(&self, predicate: &str, owner: &str) -> Option<Num> {
        self.facts
            .iter()
            .find(|f| f.predicate == predicate && f.id_arg(0) == Some(owner))
            .and_then(|f| f.num_arg(1))
    }

    /// The full function fact `predicate(owner,n)`, if any.
    pub fn function_fact(&self, predicate: &str, owner: &str) -> Option<&Fact> {
        self.facts
            .iter()
            .find(|f| f.predicate == predicate && f.id_arg(0) == Some(owner) && f.num_arg(1).is_some())
    }
}

impl FromIterator<Fact> for WorldState {
    fn from_iter<I: IntoIterator<Item = Fact>>(iter: I) -> Self {
        let mut world = WorldState::new();
        for fact in iter {
            world.insert(fact);
        }
        world
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_world() -> WorldState {
        [
            Fact::binary("type", "apple1", "apple"),
            Fact::binary("room", "kitchen1", "kitchen"),
            Fact::binary("at", "apple1", "kitchen1"),
            Fact::unary("takeable", "apple1"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn insert_is_set_like() {
        let mut world = small_world();
        let len = world.len();
        assert!(!world.insert(Fact::unary("takeable", "apple1")));
        assert_eq!(world.len(), len);
    }

    #[test]
    fn remove_absent_fact_is_noop() {
        let mut world = small_world();
        let before = world.clone();
        assert!(!world.remove(&Fact::unary("takeable", "pear1")));
        assert_eq!(world, before);
    }

    #[test]
    fn type_index_tracks_inserts_and_removes() {
        let mut world = small_world();
        assert_eq!(world.type_of("apple1"), Some("apple"));
        assert_eq!(world.type_of("kitchen1"), Some("kitchen"));

        world.remove(&Fact::binary("type", "apple1", "apple"));
        assert_eq!(world.type_of("apple1"), None);

        world.insert(Fact::binary("type", "apple1", "pear"));
        assert_eq!(world.type_of("apple1"), Some("pear"));
    }

    #[test]
    fn instance_of_resolves_types_deterministically() {
        let mut world = small_world();
        assert_eq!(world.instance_of("apple"), Some("apple1"));
        assert_eq!(world.instance_of("pear"), None);

        // Duplicate instances resolve to the lowest identifier.
        world.insert(Fact::binary("type", "apple0", "apple"));
        assert_eq!(world.instance_of("apple"), Some("apple0"));

        // The lowest identifier wins across the entity and room indexes too.
        world.insert(Fact::binary("type", "bgarden1", "garden"));
        world.insert(Fact::binary("room", "agarden1", "garden"));
        assert_eq!(world.instance_of("garden"), Some("agarden1"));
    }

    #[test]
    fn numeric_value_lookup() {
        let mut world = small_world();
        world.insert(Fact::binary("itemcount", "inventory", Num::Int(2)));
        assert_eq!(world.numeric_value("itemcount", "inventory"), Some(Num::Int(2)));
        assert_eq!(world.numeric_value("itemcount", "apple1"), None);
    }

    #[test]
    fn instances_with_types_is_sorted() {
        let mut world = small_world();
        world.insert(Fact::binary("type", "pear1", "pear"));
        let ids = world.instances_with_types(&["apple".to_string(), "pear".to_string()]);
        assert_eq!(ids, vec!["apple1".to_string(), "pear1".to_string()]);
    }
}
