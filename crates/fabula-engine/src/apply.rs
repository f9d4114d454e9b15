//! Effect application.
//!
//! Effects mutate the world state in place and collect a diff of actual
//! mutations. Effects whose arguments do not resolve are skipped entirely;
//! removing an absent fact is a no-op. Neither case is an error.

use std::collections::BTreeSet;

use fabula_core::{Fact, FactValue, Num, TypeGraph, WorldState};
use fabula_defs::{Effect, FunctionOp, FunctionRef, IterFilter, NumTerm, Polarity};

use crate::binding::{resolve_term, Binding};
use crate::eval::Evaluator;

/// Facts added to and removed from the world by one resolution.
///
/// Records actual mutations only: adding an already-present fact or removing
/// an absent one contributes nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateDiff {
    /// Facts that became true.
    pub added: Vec<Fact>,
    /// Facts that stopped being true.
    pub removed: Vec<Fact>,
}

impl StateDiff {
    /// Create an empty diff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// The predicate of the first added `in`/`on` fact, for `{prep}` feedback.
    pub fn placement_preposition(&self) -> Option<&str> {
        self.added
            .iter()
            .find(|f| f.predicate == "in" || f.predicate == "on")
            .map(|f| f.predicate.as_str())
    }

    /// The first container an added `open` fact refers to.
    pub fn opened_container(&self) -> Option<&str> {
        self.added
            .iter()
            .find(|f| f.predicate == "open")
            .and_then(|f| f.id_arg(0))
    }
}

/// Apply a list of effects under a binding, collecting the diff.
pub fn apply_effects(
    world: &mut WorldState,
    graph: &TypeGraph,
    effects: &[Effect],
    binding: &Binding,
) -> StateDiff {
    let mut diff = StateDiff::new();
    for effect in effects {
        apply_effect(world, graph, effect, binding, &mut diff);
    }
    diff
}

fn apply_effect(
    world: &mut WorldState,
    graph: &TypeGraph,
    effect: &Effect,
    binding: &Binding,
    diff: &mut StateDiff,
) {
    match effect {
        Effect::Fact {
            polarity,
            predicate,
            args,
        } => apply_fact(world, *polarity, predicate, args, binding, diff),
        Effect::When { condition, then } => {
            let satisfied = Evaluator::new(world).evaluate(condition, binding).satisfied;
            if satisfied {
                for effect in then {
                    apply_effect(world, graph, effect, binding, diff);
                }
            }
        }
        Effect::Forall {
            variable,
            filter,
            body,
        } => {
            for instance in iterated_instances(world, graph, filter) {
                let child = binding.child(variable.clone(), instance);
                for effect in body {
                    apply_effect(world, graph, effect, &child, diff);
                }
            }
        }
        Effect::FunctionChange { op, target, amount } => {
            apply_function_change(world, *op, target, amount, binding, diff);
        }
    }
}

fn apply_fact(
    world: &mut WorldState,
    polarity: Polarity,
    predicate: &str,
    args: &[fabula_defs::Term],
    binding: &Binding,
    diff: &mut StateDiff,
) {
    let resolved: Option<Vec<String>> = args
        .iter()
        .map(|t| resolve_term(world, binding, t))
        .collect();
    // A fact with an unresolved argument is never stored.
    let Some(resolved) = resolved else {
        return;
    };
    let fact = Fact::new(
        predicate,
        resolved.into_iter().map(FactValue::Id).collect(),
    );
    match polarity {
        Polarity::Add => {
            if world.insert(fact.clone()) {
                diff.added.push(fact);
            }
        }
        Polarity::Remove => {
            if world.remove(&fact) {
                diff.removed.push(fact);
            }
        }
    }
}

/// Instances a `forall` iterates, in identifier order.
///
/// A type filter matches instances whose declared type satisfies the filter
/// through the type graph, plus carriers of a matching unary trait fact.
fn iterated_instances(world: &WorldState, graph: &TypeGraph, filter: &IterFilter) -> Vec<String> {
    match filter {
        IterFilter::AllEntities => world
            .entity_instances()
            .map(|(id, _)| id.to_string())
            .collect(),
        IterFilter::Types(names) => {
            let mut matched = BTreeSet::new();
            for name in names {
                matched.extend(world.instances_with_types(&graph.concrete_types_of(name)));
                matched.extend(
                    world
                        .facts_with_predicate(name)
                        .filter(|f| f.args.len() == 1)
                        .filter_map(|f| f.id_arg(0))
                        .map(str::to_string),
                );
            }
            matched.into_iter().collect()
        }
    }
}

fn apply_function_change(
    world: &mut WorldState,
    op: FunctionOp,
    target: &FunctionRef,
    amount: &NumTerm,
    binding: &Binding,
    diff: &mut StateDiff,
) {
    let Some(owner) = resolve_term(world, binding, &target.owner) else {
        return;
    };
    let Some(operand) = resolve_num(world, amount, binding) else {
        return;
    };

    let current = world.function_fact(&target.predicate, &owner).cloned();
    let base = current
        .as_ref()
        .and_then(|f| f.num_arg(1))
        .unwrap_or(Num::Int(0));
    let new_value = match op {
        FunctionOp::Assign => operand,
        FunctionOp::Increase => base.add(operand),
        FunctionOp::Decrease => base.sub(operand),
    };
    let new_fact = Fact::binary(target.predicate.clone(), owner, new_value);

    if let Some(old) = current {
        if old == new_fact {
            return;
        }
        world.remove(&old);
        diff.removed.push(old);
    }
    world.insert(new_fact.clone());
    diff.added.push(new_fact);
}

fn resolve_num(world: &WorldState, side: &NumTerm, binding: &Binding) -> Option<Num> {
    match side {
        NumTerm::Number(n) => Some(*n),
        NumTerm::Function(FunctionRef { predicate, owner }) => {
            let owner_id = resolve_term(world, binding, owner)?;
            world.numeric_value(predicate, &owner_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabula_defs::{Condition, Term};

    fn world() -> WorldState {
        [
            Fact::binary("type", "apple1", "apple"),
            Fact::binary("type", "pear1", "pear"),
            Fact::binary("type", "box1", "box"),
            Fact::binary("room", "kitchen1", "kitchen"),
            Fact::binary("in", "apple1", "box1"),
            Fact::binary("in", "pear1", "box1"),
            Fact::unary("closed", "box1"),
            Fact::binary("itemcount", "inventory", Num::Int(1)),
        ]
        .into_iter()
        .collect()
    }

    fn graph() -> TypeGraph {
        TypeGraph::builder()
            .hierarchy([("entity", vec!["apple", "pear", "box"])])
            .build()
    }

    #[test]
    fn add_and_remove_record_actual_mutations_only() {
        let mut world = world();
        let effects = vec![
            Effect::add("open", vec![Term::lit("box")]),
            Effect::add("closed", vec![Term::lit("box")]),
            Effect::remove("closed", vec![Term::lit("box")]),
            Effect::remove("locked", vec![Term::lit("box")]),
        ];
        let diff = apply_effects(&mut world, &graph(), &effects, &Binding::new());
        assert_eq!(diff.added, vec![Fact::unary("open", "box1")]);
        assert_eq!(diff.removed, vec![Fact::unary("closed", "box1")]);
    }

    #[test]
    fn unresolved_argument_skips_the_effect() {
        let mut world = world();
        let before = world.clone();
        let effects = vec![Effect::add("at", vec![Term::var("?missing"), Term::lit("kitchen")])];
        let diff = apply_effects(&mut world, &graph(), &effects, &Binding::new());
        assert!(diff.is_empty());
        assert_eq!(world, before);
    }

    #[test]
    fn when_guard_gates_its_effects() {
        let mut world = world();
        let effects = vec![Effect::When {
            condition: Condition::predicate("open", vec![Term::lit("box")]),
            then: vec![Effect::add("accessible", vec![Term::lit("apple")])],
        }];
        let diff = apply_effects(&mut world, &graph(), &effects, &Binding::new());
        assert!(diff.is_empty());

        world.insert(Fact::unary("open", "box1"));
        let diff = apply_effects(&mut world, &graph(), &effects, &Binding::new());
        assert_eq!(diff.added, vec![Fact::unary("accessible", "apple1")]);
    }

    #[test]
    fn forall_iterates_matching_instances_with_private_bindings() {
        let mut world = world();
        world.insert(Fact::unary("open", "box1"));
        let effects = vec![Effect::Forall {
            variable: "?e".to_string(),
            filter: IterFilter::AllEntities,
            body: vec![Effect::When {
                condition: Condition::predicate("in", vec![Term::var("?e"), Term::lit("box")]),
                then: vec![Effect::add("accessible", vec![Term::var("?e")])],
            }],
        }];
        let diff = apply_effects(&mut world, &graph(), &effects, &Binding::new());
        assert_eq!(
            diff.added,
            vec![
                Fact::unary("accessible", "apple1"),
                Fact::unary("accessible", "pear1"),
            ]
        );
    }

    #[test]
    fn forall_type_filter_matches_through_graph_and_traits() {
        let world_facts = [
            Fact::binary("type", "apple1", "apple"),
            Fact::binary("type", "box1", "box"),
            Fact::unary("container", "box1"),
        ];
        let world: WorldState = world_facts.into_iter().collect();
        let graph = TypeGraph::builder()
            .edge("fruit", "apple")
            .build();
        assert_eq!(
            iterated_instances(&world, &graph, &IterFilter::Types(vec!["fruit".to_string()])),
            vec!["apple1".to_string()]
        );
        assert_eq!(
            iterated_instances(
                &world,
                &graph,
                &IterFilter::Types(vec!["container".to_string()])
            ),
            vec!["box1".to_string()]
        );
    }

    #[test]
    fn function_change_rewrites_the_numeric_fact() {
        let mut world = world();
        let effects = vec![Effect::FunctionChange {
            op: FunctionOp::Increase,
            target: FunctionRef {
                predicate: "itemcount".to_string(),
                owner: Term::lit("inventory"),
            },
            amount: NumTerm::Number(Num::Int(1)),
        }];
        let diff = apply_effects(&mut world, &graph(), &effects, &Binding::new());
        assert_eq!(
            diff.removed,
            vec![Fact::binary("itemcount", "inventory", Num::Int(1))]
        );
        assert_eq!(
            diff.added,
            vec![Fact::binary("itemcount", "inventory", Num::Int(2))]
        );
        assert_eq!(
            world.numeric_value("itemcount", "inventory"),
            Some(Num::Int(2))
        );
    }

    #[test]
    fn assign_to_current_value_is_a_noop() {
        let mut world = world();
        let effects = vec![Effect::FunctionChange {
            op: FunctionOp::Assign,
            target: FunctionRef {
                predicate: "itemcount".to_string(),
                owner: Term::lit("inventory"),
            },
            amount: NumTerm::Number(Num::Int(1)),
        }];
        let diff = apply_effects(&mut world, &graph(), &effects, &Binding::new());
        assert!(diff.is_empty());
    }
}
