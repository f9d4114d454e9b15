//! Effect trees applied to a world state.

use serde::{Deserialize, Serialize};

use crate::condition::{Condition, FunctionRef, NumTerm, Term};

/// Whether a fact effect adds or removes its fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Insert the fact.
    Add,
    /// Remove the fact. Removing an absent fact is a no-op.
    Remove,
}

/// Operation of a numeric function change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionOp {
    /// Overwrite the value.
    Assign,
    /// Add the amount to the current value.
    Increase,
    /// Subtract the amount from the current value.
    Decrease,
}

/// Instance filter of a [`Effect::Forall`] iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IterFilter {
    /// Every entity instance in the world.
    AllEntities,
    /// Instances whose type matches one of these, through the type graph.
    Types(Vec<String>),
}

/// A node of an effect tree.
///
/// Like conditions, effects are a closed sum type matched exhaustively by the
/// applier. Effects with unresolved arguments are skipped, never stored, so a
/// schema may reference optional parameters without guarding every branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Add or remove one concrete fact built from the terms.
    Fact {
        /// Add or remove.
        polarity: Polarity,
        /// The fact predicate.
        predicate: String,
        /// The argument terms, in fact order.
        args: Vec<Term>,
    },
    /// Apply `then` only if `condition` holds in the current state.
    When {
        /// The guard condition.
        condition: Condition,
        /// Effects applied when the guard holds.
        then: Vec<Effect>,
    },
    /// Apply `body` once per matching instance, binding it to `variable`.
    Forall {
        /// The iteration variable introduced for the body.
        variable: String,
        /// Which instances to iterate.
        filter: IterFilter,
        /// Effects applied per instance.
        body: Vec<Effect>,
    },
    /// Rewrite the numeric fact referenced by `target`.
    FunctionChange {
        /// Assign, increase, or decrease.
        op: FunctionOp,
        /// The function fact to rewrite.
        target: FunctionRef,
        /// The operand.
        amount: NumTerm,
    },
}

impl Effect {
    /// Shorthand for an add-fact effect.
    pub fn add(predicate: impl Into<String>, args: Vec<Term>) -> Self {
        Effect::Fact {
            polarity: Polarity::Add,
            predicate: predicate.into(),
            args,
        }
    }

    /// Shorthand for a remove-fact effect.
    pub fn remove(predicate: impl Into<String>, args: Vec<Term>) -> Self {
        Effect::Fact {
            polarity: Polarity::Remove,
            predicate: predicate.into(),
            args,
        }
    }

    /// Replace every literal term equal to `from` with `to`, recursively.
    ///
    /// Event randomization uses this to durably rewrite the schema's own
    /// effect tree between triggers.
    pub fn replace_literal(&mut self, from: &str, to: &str) {
        match self {
            Effect::Fact { args, .. } => {
                for term in args {
                    if let Term::Literal(lit) = term {
                        if lit == from {
                            *lit = to.to_string();
                        }
                    }
                }
            }
            Effect::When { condition, then } => {
                condition.replace_literal(from, to);
                for effect in then {
                    effect.replace_literal(from, to);
                }
            }
            Effect::Forall { body, .. } => {
                for effect in body {
                    effect.replace_literal(from, to);
                }
            }
            Effect::FunctionChange { target, amount, .. } => {
                if let Term::Literal(lit) = &mut target.owner {
                    if lit == from {
                        *lit = to.to_string();
                    }
                }
                if let NumTerm::Function(fref) = amount {
                    if let Term::Literal(lit) = &mut fref.owner {
                        if lit == from {
                            *lit = to.to_string();
                        }
                    }
                }
            }
        }
    }
}
