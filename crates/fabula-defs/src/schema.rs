//! Action and event schemas.

use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::effect::Effect;

/// Where a parameter's concrete identifier comes from during binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingSource {
    /// The request's first argument, resolved from its type name.
    Arg1,
    /// The request's second argument, resolved from its type name.
    Arg2,
    /// The room the player is currently in.
    CurrentRoom,
    /// The player instance itself.
    Player,
    /// The inventory pseudo-entity.
    Inventory,
    /// The floor of the room the player is currently in.
    CurrentRoomFloor,
    /// The container or support the first argument currently rests in or on.
    Arg1Receptacle,
}

/// One typed parameter of an action schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// The variable name, e.g. `?item`.
    pub variable: String,
    /// The required type, checked through the type graph after binding.
    pub type_name: String,
    /// Primary binding source.
    pub source: BindingSource,
    /// Fallback source consulted when the primary yields nothing.
    #[serde(default)]
    pub fallback: Option<BindingSource>,
}

/// A failure feedback template plus its machine-readable kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureTemplate {
    /// Template text with `{var}` placeholders.
    pub template: String,
    /// Machine-readable failure kind, e.g. `not_accessible`.
    pub kind: String,
}

/// The declarative definition of one player action.
///
/// Failure templates are positional: `parameter_failures[i]` answers a type
/// mismatch of `parameters[i]`, and `precondition_failures[j]` answers the
/// precondition leaf with evaluation index `j`. Load-time validation rejects
/// schemas whose template lists do not cover their parameters and leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSchema {
    /// The action kind matched against requests, e.g. `take`.
    pub kind: String,
    /// Typed parameters, in declaration order.
    pub parameters: Vec<Parameter>,
    /// The precondition tree (conceptually rooted in an `all`).
    pub precondition: Condition,
    /// Effects applied on success, in order.
    pub effects: Vec<Effect>,
    /// Success feedback template.
    pub success_template: String,
    /// One failure template per parameter, for type-check mismatches.
    pub parameter_failures: Vec<FailureTemplate>,
    /// One failure template per precondition leaf, by evaluation index.
    pub precondition_failures: Vec<FailureTemplate>,
    /// Whether the action gathers knowledge rather than changing the world.
    #[serde(default)]
    pub epistemic: bool,
    /// Whether the action advances the player's goals when it succeeds.
    #[serde(default = "default_true")]
    pub pragmatic: bool,
}

fn default_true() -> bool {
    true
}

/// One typed parameter of an event schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventParameter {
    /// The variable name.
    pub variable: String,
    /// The required type; candidates are enumerated through the type graph.
    pub type_name: String,
}

/// Randomization rule of an event schema.
///
/// After each trigger, a replacement for the designated value is sampled from
/// the first arguments of all facts with `replace_predicate`, excluding the
/// listed identifiers, and substituted into the schema's own trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomizeRule {
    /// The designated value as it appears in the freshly loaded trees.
    pub initial_value: String,
    /// Predicate whose facts' first arguments form the candidate pool.
    pub replace_predicate: String,
    /// Identifiers never sampled.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// The declarative definition of one ambient world event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSchema {
    /// The event name, for feedback and diagnostics.
    pub name: String,
    /// Typed parameters; candidate bindings are their cartesian product.
    pub parameters: Vec<EventParameter>,
    /// The precondition tree.
    pub precondition: Condition,
    /// Effects applied when a candidate binding satisfies the precondition.
    pub effects: Vec<Effect>,
    /// Feedback template rendered on trigger.
    pub feedback_template: String,
    /// Optional durable randomization of the designated value.
    #[serde(default)]
    pub randomize: Option<RandomizeRule>,
}

impl EventSchema {
    /// Durably replace `from` with `to` across the effect tree.
    ///
    /// The precondition is left untouched; randomization designates a value
    /// the event produces, not one it is conditioned on.
    pub fn replace_literal(&mut self, from: &str, to: &str) {
        for effect in &mut self.effects {
            effect.replace_literal(from, to);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Term;

    #[test]
    fn action_schema_deserializes_with_defaults() {
        let json = r#"{
            "kind": "take",
            "parameters": [
                {"variable": "?item", "type_name": "takeable", "source": "arg1"}
            ],
            "precondition": {"predicate": {"name": "accessible", "args": [{"variable": "?item"}]}},
            "effects": [],
            "success_template": "You take the {item}.",
            "parameter_failures": [{"template": "You cannot take that.", "kind": "not_takeable"}],
            "precondition_failures": [{"template": "You cannot reach the {item}.", "kind": "not_accessible"}]
        }"#;
        let schema: ActionSchema = serde_json::from_str(json).unwrap();
        assert_eq!(schema.kind, "take");
        assert!(!schema.epistemic);
        assert!(schema.pragmatic);
        assert_eq!(schema.parameters[0].fallback, None);
    }

    #[test]
    fn event_replace_literal_rewrites_effects_only() {
        let mut event = EventSchema {
            name: "spill".to_string(),
            parameters: vec![],
            precondition: Condition::predicate("open", vec![Term::lit("jar1")]),
            effects: vec![Effect::add("wet", vec![Term::lit("jar1")])],
            feedback_template: String::new(),
            randomize: None,
        };
        event.replace_literal("jar1", "jar2");
        assert_eq!(
            event.precondition,
            Condition::predicate("open", vec![Term::lit("jar1")])
        );
        assert_eq!(event.effects, vec![Effect::add("wet", vec![Term::lit("jar2")])]);
    }
}
