//! Parameter binding.
//!
//! Binding resolves each schema parameter to a concrete instance identifier
//! from a fixed vocabulary of sources. Unresolvable parameters bind to
//! `None`; that sentinel flows through condition evaluation and effect
//! application instead of aborting the resolution.

use std::collections::BTreeMap;

use fabula_core::WorldState;
use fabula_defs::schema::{ActionSchema, BindingSource};
use fabula_defs::Term;

use crate::constants::{FLOOR_ID_SUFFIX, INVENTORY_ID, PLAYER_ID};
use crate::session::ActionRequest;

/// A resolved assignment of schema parameter names to instance identifiers.
///
/// Built fresh per resolution attempt and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binding {
    values: BTreeMap<String, Option<String>>,
}

impl Binding {
    /// Create an empty binding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a variable, `None` marking an unresolvable parameter.
    pub fn set(&mut self, variable: impl Into<String>, value: Option<String>) {
        self.values.insert(variable.into(), value);
    }

    /// The bound identifier of a variable, if bound and resolved.
    pub fn get(&self, variable: &str) -> Option<&str> {
        self.values.get(variable).and_then(|v| v.as_deref())
    }

    /// Whether any parameter bound to `None`.
    pub fn has_unresolved(&self) -> bool {
        self.values.values().any(Option::is_none)
    }

    /// Iterate over `(variable, resolved identifier)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.values
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// A copy of this binding with one extra variable, for `forall` bodies.
    pub fn child(&self, variable: impl Into<String>, value: String) -> Self {
        let mut child = self.clone();
        child.set(variable, Some(value));
        child
    }
}

/// The room the player is currently in.
pub fn player_room(world: &WorldState) -> Option<String> {
    world
        .facts_about(PLAYER_ID)
        .filter(|f| f.predicate == "at")
        .filter_map(|f| f.id_arg(1))
        .min()
        .map(str::to_string)
}

/// Resolve a literal to a concrete identifier.
///
/// A literal naming a known instance (or the inventory) is used verbatim;
/// otherwise it is read as a type name and resolved to the unique instance of
/// that type. No match yields `None`, never an error.
pub fn resolve_literal(world: &WorldState, literal: &str) -> Option<String> {
    if literal == INVENTORY_ID || world.is_instance(literal) {
        return Some(literal.to_string());
    }
    world.instance_of(literal).map(str::to_string)
}

/// Resolve a condition or effect term against a binding.
pub fn resolve_term(world: &WorldState, binding: &Binding, term: &Term) -> Option<String> {
    match term {
        Term::Literal(lit) => resolve_literal(world, lit),
        Term::Variable(var) => binding.get(var).map(str::to_string),
    }
}

/// Bind every parameter of an action schema for one request.
pub fn bind_parameters(
    world: &WorldState,
    schema: &ActionSchema,
    request: &ActionRequest,
) -> Binding {
    let mut binding = Binding::new();
    for parameter in &schema.parameters {
        let value = resolve_source(world, schema, &binding, request, parameter.source)
            .or_else(|| {
                parameter
                    .fallback
                    .and_then(|f| resolve_source(world, schema, &binding, request, f))
            });
        binding.set(parameter.variable.clone(), value);
    }
    binding
}

fn resolve_source(
    world: &WorldState,
    schema: &ActionSchema,
    binding: &Binding,
    request: &ActionRequest,
    source: BindingSource,
) -> Option<String> {
    match source {
        BindingSource::Arg1 => request
            .arg1
            .as_deref()
            .and_then(|a| resolve_literal(world, a)),
        BindingSource::Arg2 => request
            .arg2
            .as_deref()
            .and_then(|a| resolve_literal(world, a)),
        BindingSource::CurrentRoom => player_room(world),
        BindingSource::Player => Some(PLAYER_ID.to_string()),
        BindingSource::Inventory => Some(INVENTORY_ID.to_string()),
        BindingSource::CurrentRoomFloor => {
            player_room(world).map(|room| format!("{room}{FLOOR_ID_SUFFIX}"))
        }
        BindingSource::Arg1Receptacle => {
            let arg1_param = schema
                .parameters
                .iter()
                .find(|p| p.source == BindingSource::Arg1)?;
            let arg1_value = binding.get(&arg1_param.variable)?;
            receptacle_of(world, arg1_value)
        }
    }
}

/// The container or support an entity currently rests in or on.
fn receptacle_of(world: &WorldState, entity: &str) -> Option<String> {
    world
        .facts_about(entity)
        .filter(|f| f.predicate == "in" || f.predicate == "on")
        .filter_map(|f| f.id_arg(1))
        .min()
        .map(str::to_string)
}
