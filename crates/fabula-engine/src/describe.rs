//! Description text generation.
//!
//! Builds the room, inventory, container, and entity descriptions the
//! success templates can reference. All listings are ordered by instance
//! identifier so repeated calls over the same state produce the same text.

use fabula_core::{Fact, WorldState};
use fabula_defs::AdventureDef;

use crate::binding::{player_room, resolve_literal};
use crate::constants::{
    CONTAINER, EMPTY_INVENTORY, FLOOR_TYPE, INVENTORY_ID, INVENTORY_TEMPLATE, MULTI_ITEM_TEMPLATE,
    NEEDS_SUPPORT, PLAYER_ID, ROOM_TEMPLATE, SINGLE_ITEM_TEMPLATE, SUPPORT,
};

/// Renders descriptions of one world state.
#[derive(Debug, Clone, Copy)]
pub struct Describer<'a> {
    world: &'a WorldState,
    def: &'a AdventureDef,
}

impl<'a> Describer<'a> {
    /// Create a describer over a world state and its definitions.
    pub fn new(world: &'a WorldState, def: &'a AdventureDef) -> Self {
        Self { world, def }
    }

    /// Surface string of an instance: its adjectives plus its type's
    /// `repr_str`, e.g. `red apple`.
    pub fn instance_label(&self, id: &str) -> String {
        let mut parts: Vec<String> = self
            .world
            .facts_about(id)
            .filter(|f| f.predicate == "adj")
            .filter_map(|f| f.id_arg(1))
            .map(str::to_string)
            .collect();
        parts.sort();
        parts.push(self.type_label(id));
        parts.join(" ")
    }

    fn type_label(&self, id: &str) -> String {
        let Some(type_name) = self.world.type_of(id) else {
            return id.to_string();
        };
        if let Some(entity_def) = self.def.entity_types.get(type_name) {
            return entity_def.repr_str.clone();
        }
        if let Some(room_def) = self.def.room_types.get(type_name) {
            return room_def.repr_str.clone();
        }
        type_name.to_string()
    }

    /// Entities in the player's room, the player excluded, in id order.
    pub fn room_contents(&self) -> Vec<String> {
        let Some(room) = player_room(self.world) else {
            return Vec::new();
        };
        let mut contents: Vec<String> = self
            .world
            .facts_with_predicate("at")
            .filter(|f| f.id_arg(1) == Some(room.as_str()))
            .filter_map(|f| f.id_arg(0))
            .filter(|id| *id != PLAYER_ID)
            .map(str::to_string)
            .collect();
        contents.sort();
        contents
    }

    /// Room contents the player can see.
    ///
    /// Excludes hidden-typed entities and entities inside closed containers
    /// or the inventory.
    pub fn visible_room_contents(&self) -> Vec<String> {
        self.room_contents()
            .into_iter()
            .filter(|id| !self.is_hidden(id))
            .filter(|id| self.is_visible_where_contained(id))
            .collect()
    }

    fn is_hidden(&self, id: &str) -> bool {
        self.world
            .type_of(id)
            .and_then(|t| self.def.entity_types.get(t))
            .is_some_and(|d| d.hidden)
    }

    fn is_visible_where_contained(&self, id: &str) -> bool {
        let container = self
            .world
            .facts_about(id)
            .filter(|f| f.predicate == "in")
            .filter_map(|f| f.id_arg(1))
            .min();
        match container {
            None => true,
            Some(INVENTORY_ID) => false,
            Some(container) => !self.world.contains(&Fact::unary("closed", container)),
        }
    }

    /// Full description of the player's current room.
    pub fn room_description(&self) -> String {
        let Some(room) = player_room(self.world) else {
            return String::new();
        };
        let mut description = ROOM_TEMPLATE.replace("{room}", &self.instance_label(&room));

        let visible = self.visible_room_contents();
        let labels: Vec<String> = visible.iter().map(|id| self.instance_label(id)).collect();
        match labels.len() {
            0 => {}
            1 => {
                description.push(' ');
                description.push_str(&SINGLE_ITEM_TEMPLATE.replace("{items}", &labels[0]));
            }
            _ => {
                description.push(' ');
                description.push_str(&MULTI_ITEM_TEMPLATE.replace("{items}", &listing(&labels)));
            }
        }

        for sentence in self.content_state_sentences(&visible) {
            description.push(' ');
            description.push_str(&sentence);
        }

        description.push_str(&self.exits_sentence(&room));
        description
    }

    /// One sentence per open/closed/in/on fact of each visible entity.
    fn content_state_sentences(&self, visible: &[String]) -> Vec<String> {
        let mut sentences = Vec::new();
        for id in visible {
            let label = self.instance_label(id);
            if self.world.contains(&Fact::unary("closed", id.as_str())) {
                sentences.push(format!("The {label} is closed."));
            }
            if self.world.contains(&Fact::unary("open", id.as_str())) {
                sentences.push(format!("The {label} is open."));
            }
            for fact in self.placement_facts(id) {
                let Some(holder) = fact.id_arg(1) else {
                    continue;
                };
                sentences.push(format!(
                    "The {label} is {} the {}.",
                    fact.predicate,
                    self.instance_label(holder)
                ));
            }
        }
        sentences
    }

    fn placement_facts(&self, id: &str) -> Vec<Fact> {
        let mut facts: Vec<Fact> = self
            .world
            .facts_about(id)
            .filter(|f| f.predicate == "in" || f.predicate == "on")
            .cloned()
            .collect();
        facts.sort_by(|a, b| a.to_string().cmp(&b.to_string()));
        facts
    }

    fn exits_sentence(&self, room: &str) -> String {
        let mut exits: Vec<String> = self
            .world
            .facts_with_predicate("exit")
            .filter(|f| f.id_arg(0) == Some(room))
            .filter_map(|f| f.id_arg(1))
            .map(|id| self.instance_label(id))
            .collect();
        exits.sort();
        match exits.len() {
            0 => String::new(),
            1 => format!(" There is a passage to a {} here.", exits[0]),
            _ => format!(" There are passages to a {} here.", listing(&exits)),
        }
    }

    /// Entities currently in the inventory, in id order.
    pub fn inventory_contents(&self) -> Vec<String> {
        let mut contents: Vec<String> = self
            .world
            .facts_with_predicate("in")
            .filter(|f| f.id_arg(1) == Some(INVENTORY_ID))
            .filter_map(|f| f.id_arg(0))
            .map(str::to_string)
            .collect();
        contents.sort();
        contents
    }

    /// Text description of the inventory content.
    pub fn inventory_description(&self) -> String {
        let labels: Vec<String> = self
            .inventory_contents()
            .iter()
            .map(|id| format!("a {}", self.instance_label(id)))
            .collect();
        if labels.is_empty() {
            return EMPTY_INVENTORY.to_string();
        }
        INVENTORY_TEMPLATE.replace("{items}", &join_with_and(&labels))
    }

    /// Text description of a container's content.
    pub fn container_content_description(&self, container_id: &str) -> String {
        let container_label = self.instance_label(container_id);
        let mut labels: Vec<String> = self
            .world
            .facts_with_predicate("in")
            .filter(|f| f.id_arg(1) == Some(container_id))
            .filter_map(|f| f.id_arg(0))
            .map(|id| format!("a {}", self.instance_label(id)))
            .collect();
        labels.sort();
        match labels.len() {
            0 => format!("The {container_label} is empty."),
            1 => format!("In the {container_label} there is {}.", labels[0]),
            _ => format!(
                "In the {container_label} there are {}.",
                join_with_and(&labels)
            ),
        }
    }

    /// Examine description of an entity, given a type name or instance id.
    pub fn entity_description(&self, entity: &str) -> String {
        if entity == INVENTORY_ID {
            return self.inventory_description();
        }
        let Some(id) = resolve_literal(self.world, entity) else {
            return String::new();
        };
        let label = self.instance_label(&id);
        let mut sentences = vec![format!("This is a {label}.")];

        if self.has_fact("text", &id) {
            sentences.push("There is writing on it.".to_string());
        }
        if self.has_fact("openable", &id) {
            let state = if self.has_fact("open", &id) {
                "open"
            } else if self.has_fact("closed", &id) {
                "closed"
            } else {
                "unknown"
            };
            sentences.push(format!("The {label} is openable and currently {state}."));
        }
        if self.has_fact("takeable", &id) {
            sentences.push(format!("The {label} is takeable."));
        }
        if self.has_fact(NEEDS_SUPPORT, &id) {
            if let Some(fact) = self.placement_facts(&id).first() {
                if let Some(holder) = fact.id_arg(1) {
                    let holder_label = self.holder_label(holder);
                    sentences.push(format!(
                        "The {label} is {} the {holder_label}.",
                        fact.predicate
                    ));
                }
            }
        }
        if self.has_fact(CONTAINER, &id) {
            if self.has_fact("closed", &id) {
                sentences.push(format!(
                    "You can't see the {label}'s contents because it is closed."
                ));
            } else {
                sentences.push(self.container_content_description(&id));
            }
        }
        if self.has_fact(SUPPORT, &id) {
            sentences.push(self.support_content_description(&id, &label));
        }
        sentences.join(" ")
    }

    fn holder_label(&self, holder: &str) -> String {
        if holder == INVENTORY_ID {
            return INVENTORY_ID.to_string();
        }
        if self.world.type_of(holder) == Some(FLOOR_TYPE) {
            return "floor".to_string();
        }
        self.instance_label(holder)
    }

    fn support_content_description(&self, id: &str, label: &str) -> String {
        let mut labels: Vec<String> = self
            .world
            .facts_with_predicate("on")
            .filter(|f| f.id_arg(1) == Some(id))
            .filter_map(|f| f.id_arg(0))
            .map(|on_id| format!("a {}", self.instance_label(on_id)))
            .collect();
        labels.sort();
        match labels.len() {
            0 => format!("There is nothing on the {label}."),
            1 => format!("There is {} on the {label}.", labels[0]),
            _ => format!("There are {} on the {label}.", join_with_and(&labels)),
        }
    }

    /// The readable text of an entity, for READ-style actions.
    pub fn entity_text(&self, entity: &str) -> Option<String> {
        let id = resolve_literal(self.world, entity)?;
        self.world
            .facts_about(&id)
            .find(|f| f.predicate == "text")
            .map(|f| {
                f.args[1..]
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",")
            })
    }

    fn has_fact(&self, predicate: &str, id: &str) -> bool {
        self.world.contains(&Fact::unary(predicate, id))
    }
}

/// Join labels as `a, b and c`, the listing form the room template expects.
fn listing(labels: &[String]) -> String {
    join_with(labels, ", a ", " and a ")
}

fn join_with_and(labels: &[String]) -> String {
    join_with(labels, ", ", " and ")
}

fn join_with(labels: &[String], separator: &str, conjunction: &str) -> String {
    match labels.len() {
        0 => String::new(),
        1 => labels[0].clone(),
        _ => {
            let head = labels[..labels.len() - 1].join(separator);
            format!("{head}{conjunction}{}", labels[labels.len() - 1])
        }
    }
}
