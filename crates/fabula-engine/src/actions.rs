//! Action resolution.
//!
//! Resolution runs binding, type checking, precondition evaluation, and
//! effect application in a fixed order. Type-check failures are held back
//! until the precondition has been checked: precondition feedback is
//! authored with more context and takes priority, matching the feedback
//! players actually need first.

use std::collections::BTreeMap;

use fabula_core::{TypeGraph, WorldState};
use fabula_defs::{ActionSchema, AdventureDef};

use crate::apply::{apply_effects, StateDiff};
use crate::binding::{bind_parameters, Binding};
use crate::constants::{CANNOT_DO_THAT, UNRESOLVED_ARGUMENT};
use crate::describe::Describer;
use crate::error::{ActionFailure, FailurePhase};
use crate::eval::Evaluator;
use crate::feedback;
use crate::session::ActionRequest;

/// A successfully resolved action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    /// Rendered success feedback.
    pub feedback: String,
    /// Facts the action's effects actually changed.
    pub diff: StateDiff,
    /// The binding the action resolved under.
    pub binding: Binding,
}

/// Resolves action requests against a world state.
#[derive(Debug, Clone, Copy)]
pub struct ActionResolver<'a> {
    graph: &'a TypeGraph,
    def: &'a AdventureDef,
}

impl<'a> ActionResolver<'a> {
    /// Create a resolver over the domain graph and definitions.
    pub fn new(graph: &'a TypeGraph, def: &'a AdventureDef) -> Self {
        Self { graph, def }
    }

    /// Resolve one request, mutating the world on success.
    ///
    /// A failure leaves the world untouched: effects are applied only after
    /// every check has passed, so there are no partial effects to undo.
    pub fn resolve(
        &self,
        world: &mut WorldState,
        schema: &ActionSchema,
        request: &ActionRequest,
    ) -> Result<ActionOutcome, ActionFailure> {
        let binding = bind_parameters(world, schema, request);
        let type_mismatch = self.check_parameter_types(world, schema, &binding);

        let evaluation = Evaluator::new(world).evaluate(&schema.precondition, &binding);
        if !evaluation.satisfied {
            return Err(self.precondition_failure(world, schema, &binding, &evaluation));
        }
        if let Some(failure) = type_mismatch {
            return Err(failure);
        }

        let diff = apply_effects(world, self.graph, &schema.effects, &binding);
        let feedback = self.success_feedback(world, schema, request, &binding, &diff);
        Ok(ActionOutcome {
            feedback,
            diff,
            binding,
        })
    }

    /// The first parameter whose bound instance fails its type constraint.
    ///
    /// Unresolved parameters are not type-checked; they surface through the
    /// precondition path instead.
    fn check_parameter_types(
        &self,
        world: &WorldState,
        schema: &ActionSchema,
        binding: &Binding,
    ) -> Option<ActionFailure> {
        for (index, parameter) in schema.parameters.iter().enumerate() {
            let Some(value) = binding.get(&parameter.variable) else {
                continue;
            };
            let concrete = world.type_of(value).unwrap_or(value);
            if self.graph.is_subtype(concrete, &parameter.type_name) {
                continue;
            }
            let Some(template) = schema.parameter_failures.get(index) else {
                return Some(ActionFailure {
                    phase: FailurePhase::TypeCheck,
                    kind: UNRESOLVED_ARGUMENT.to_string(),
                    feedback: CANNOT_DO_THAT.to_string(),
                });
            };
            let values = self.binding_labels(world, binding);
            return Some(ActionFailure {
                phase: FailurePhase::TypeCheck,
                kind: template.kind.clone(),
                feedback: feedback::capitalize(&feedback::render(&template.template, &values)),
            });
        }
        None
    }

    fn precondition_failure(
        &self,
        world: &WorldState,
        schema: &ActionSchema,
        binding: &Binding,
        evaluation: &crate::eval::Evaluation,
    ) -> ActionFailure {
        // An unresolved parameter means the request named something that
        // does not exist here; no authored template applies.
        if binding.has_unresolved() {
            return ActionFailure {
                phase: FailurePhase::Binding,
                kind: UNRESOLVED_ARGUMENT.to_string(),
                feedback: CANNOT_DO_THAT.to_string(),
            };
        }

        let template = evaluation
            .first_failing_leaf()
            .and_then(|leaf| schema.precondition_failures.get(leaf.index));
        match template {
            Some(template) => {
                let values = self.binding_labels(world, binding);
                ActionFailure {
                    phase: FailurePhase::Precondition,
                    kind: template.kind.clone(),
                    feedback: feedback::capitalize(&feedback::render(
                        &template.template,
                        &values,
                    )),
                }
            }
            None => ActionFailure {
                phase: FailurePhase::Precondition,
                kind: UNRESOLVED_ARGUMENT.to_string(),
                feedback: CANNOT_DO_THAT.to_string(),
            },
        }
    }

    fn success_feedback(
        &self,
        world: &WorldState,
        schema: &ActionSchema,
        request: &ActionRequest,
        binding: &Binding,
        diff: &StateDiff,
    ) -> String {
        let describer = Describer::new(world, self.def);
        let template = &schema.success_template;
        let mut values = self.binding_labels(world, binding);

        if feedback::wants(template, "prep") {
            let prep = request
                .prep
                .as_deref()
                .or_else(|| diff.placement_preposition());
            if let Some(prep) = prep {
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
        if feedback::wants(template, "arg1_desc") {
            if let Some(arg1) = request.arg1.as_deref() {
                values.insert("arg1_desc".to_string(), describer.entity_description(arg1));
            }
        }
        if feedback::wants(template, "arg2_desc") {
            if let Some(arg2) = request.arg2.as_deref() {
                values.insert("arg2_desc".to_string(), describer.entity_description(arg2));
            }
        }
        if feedback::wants(template, "arg1_text") {
            let text = request
                .arg1
                .as_deref()
                .and_then(|arg1| describer.entity_text(arg1));
            if let Some(text) = text {
                values.insert("arg1_text".to_string(), text);
            }
        }

        feedback::render(template, &values)
    }

    /// Binding values as surface labels, keyed by the template variable name
    /// (the parameter variable without its `?` sigil).
    fn binding_labels(&self, world: &WorldState, binding: &Binding) -> BTreeMap<String, String> {
        let describer = Describer::new(world, self.def);
        binding
            .iter()
            .filter_map(|(variable, value)| {
                let value = value?;
                let key = variable.trim_start_matches('?').to_string();
                Some((key, describer.instance_label(value)))
            })
            .collect()
    }
}
