//! Event resolution.
//!
//! Events are autonomous rules checked after every action. Each check walks
//! the events in declaration order, enumerates candidate bindings as the
//! cartesian product of sorted instance lists, and triggers the first event
//! whose precondition a candidate satisfies. Triggering applies the event's
//! effects and, for randomized events, durably rewrites the stored effect
//! tree to point at a newly drawn value.

use std::collections::BTreeSet;

use fabula_core::{TypeGraph, WorldState};
use fabula_defs::{AdventureDef, EventSchema};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::apply::{apply_effects, StateDiff};
use crate::binding::Binding;
use crate::describe::Describer;
use crate::eval::Evaluator;
use crate::feedback;

/// One triggered event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventOutcome {
    /// Name of the triggered event.
    pub name: String,
    /// Rendered event feedback.
    pub feedback: String,
    /// Facts the event's effects actually changed.
    pub diff: StateDiff,
}

/// One event schema plus its current randomized value, if any.
#[derive(Debug, Clone)]
struct EventState {
    schema: EventSchema,
    current_value: Option<String>,
}

/// Owns the event schemas and the session's random source.
///
/// The engine holds its own copies of the schemas because randomization
/// rewrites them in place between triggers.
#[derive(Debug, Clone)]
pub struct EventEngine {
    events: Vec<EventState>,
    rng: StdRng,
}

impl EventEngine {
    /// Create an engine over the given event schemas, seeded for
    /// reproducible randomization.
    pub fn new(events: Vec<EventSchema>, seed: u64) -> Self {
        Self {
            events: events
                .into_iter()
                .map(|schema| EventState {
                    schema,
                    current_value: None,
                })
                .collect(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Check all events once and trigger the first satisfied one.
    ///
    /// Returns `None` when no event fires. Callers loop until quiescent;
    /// each trigger may enable further events.
    pub fn run_once(
        &mut self,
        world: &mut WorldState,
        graph: &TypeGraph,
        def: &AdventureDef,
    ) -> Option<EventOutcome> {
        let (index, binding) = self.events.iter().enumerate().find_map(|(i, event)| {
            satisfied_binding(world, graph, &event.schema).map(|binding| (i, binding))
        })?;

        let diff = apply_effects(world, graph, &self.events[index].schema.effects, &binding);
        let feedback = render_feedback(world, def, &self.events[index].schema, &binding, &diff);
        let name = self.events[index].schema.name.clone();
        self.randomize(world, index);
        Some(EventOutcome {
            name,
            feedback,
            diff,
        })
    }

    /// Draw the next value for a randomized event and rewrite its effects.
    fn randomize(&mut self, world: &WorldState, index: usize) {
        let event = &mut self.events[index];
        let Some(rule) = event.schema.randomize.clone() else {
            return;
        };
        let current = event
            .current_value
            .get_or_insert_with(|| rule.initial_value.clone())
            .clone();

        let candidates: BTreeSet<&str> = world
            .facts_with_predicate(&rule.replace_predicate)
            .filter_map(|f| f.id_arg(0))
            .filter(|id| !rule.exclude.iter().any(|e| e == id))
            .collect();
        let candidates: Vec<&str> = candidates.into_iter().collect();
        if candidates.is_empty() {
            return;
        }
        let chosen = candidates[self.rng.random_range(0..candidates.len())].to_string();
        event.schema.replace_literal(&current, &chosen);
        event.current_value = Some(chosen);
    }
}

/// The first candidate binding that satisfies the event's precondition.
///
/// Candidates are the cartesian product of per-parameter instance lists,
/// walked in parameter order with sorted instance ids, so the first match is
/// deterministic.
fn satisfied_binding(
    world: &WorldState,
    graph: &TypeGraph,
    schema: &EventSchema,
) -> Option<Binding> {
    let mut candidate_lists: Vec<Vec<String>> = Vec::with_capacity(schema.parameters.len());
    for parameter in &schema.parameters {
        let instances = world.instances_with_types(&graph.concrete_types_of(&parameter.type_name));
        if instances.is_empty() {
            return None;
        }
        candidate_lists.push(instances);
    }

    let evaluator = Evaluator::new(world);
    let mut indices = vec![0usize; candidate_lists.len()];
    loop {
        let mut binding = Binding::new();
        for (slot, parameter) in schema.parameters.iter().enumerate() {
            binding.set(
                parameter.variable.clone(),
                Some(candidate_lists[slot][indices[slot]].clone()),
            );
        }
        if evaluator.evaluate(&schema.precondition, &binding).satisfied {
            return Some(binding);
        }

        // Odometer increment over the candidate lists.
        let mut slot = candidate_lists.len();
        loop {
            if slot == 0 {
                return None;
            }
            slot -= 1;
            indices[slot] += 1;
            if indices[slot] < candidate_lists[slot].len() {
                break;
            }
            indices[slot] = 0;
        }
    }
}

fn render_feedback(
    world: &WorldState,
    def: &AdventureDef,
    schema: &EventSchema,
    binding: &Binding,
    diff: &StateDiff,
) -> String {
    let describer = Describer::new(world, def);
    let template = &schema.feedback_template;
    let mut values: std::collections::BTreeMap<String, String> = binding
        .iter()
        .filter_map(|(variable, value)| {
            let value = value?;
            Some((
                variable.trim_start_matches('?').to_string(),
                describer.instance_label(value),
            ))
        })
        .collect();

    if feedback::wants(template, "prep") {
        if let Some(prep) = diff.placement_preposition() {
            values.insert("prep".to_string(), prep.to_string());
        }
    }
    if feedback::wants(template, "room_desc") {
        values.insert("room_desc".to_string(), describer.room_description());
    }
    if feedback::wants(template, "inventory_desc") {
        values.insert(
            "inventory_desc".to_string(),
            describer.inventory_description(),
        );
    }
    if feedback::wants(template, "container_content") {
        if let Some(container) = diff.opened_container() {
            values.insert(
                "container_content".to_string(),
                describer.container_content_description(container),
            );
        }
    }
    feedback::render(template, &values)
}
