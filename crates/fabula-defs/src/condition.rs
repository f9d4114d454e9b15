//! Condition trees evaluated against a world state.

use fabula_core::Num;
use serde::{Deserialize, Serialize};

/// One argument position of a predicate condition or effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    /// A literal: a concrete instance identifier or a bare type name that the
    /// evaluator resolves to the unique instance of that type.
    Literal(String),
    /// A schema parameter, substituted from the variable binding.
    Variable(String),
}

impl Term {
    /// Shorthand for a literal term.
    pub fn lit(s: impl Into<String>) -> Self {
        Term::Literal(s.into())
    }

    /// Shorthand for a variable term.
    pub fn var(s: impl Into<String>) -> Self {
        Term::Variable(s.into())
    }
}

/// Reference to a numeric function fact, e.g. `itemcount` of `?container`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRef {
    /// The predicate carrying the numeric value.
    pub predicate: String,
    /// The owner of the value, as a term.
    pub owner: Term,
}

/// One side of a numeric comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumTerm {
    /// A literal number.
    Number(Num),
    /// The current value of a numeric function fact.
    Function(FunctionRef),
}

/// Comparison operator of a numeric condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    /// Numeric equality.
    #[serde(rename = "=")]
    Equal,
    /// Strictly less than.
    #[serde(rename = "<")]
    Less,
    /// Less than or equal.
    #[serde(rename = "<=")]
    LessEq,
    /// Strictly greater than.
    #[serde(rename = ">")]
    Greater,
    /// Greater than or equal.
    #[serde(rename = ">=")]
    GreaterEq,
}

/// A node of a precondition tree.
///
/// The tree is a closed sum type: the evaluator matches every variant
/// exhaustively, so an unhandled condition kind is a compile error rather
/// than a runtime surprise. The order of children inside [`Condition::All`]
/// and [`Condition::Any`] is the authoring mechanism for failure-feedback
/// priority, so it is preserved verbatim from the definition file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Membership test of a concrete fact built from the terms.
    Predicate {
        /// The fact predicate.
        name: String,
        /// The argument terms, in fact order.
        args: Vec<Term>,
    },
    /// Logical negation of the inner condition.
    Not(Box<Condition>),
    /// True iff no child is false. Children are never short-circuited.
    All(Vec<Condition>),
    /// True iff any child is true. Children are never short-circuited.
    Any(Vec<Condition>),
    /// Numeric comparison between two resolved number terms.
    Compare {
        /// The comparison operator.
        op: CompareOp,
        /// Left-hand side.
        lhs: NumTerm,
        /// Right-hand side.
        rhs: NumTerm,
    },
}

impl Condition {
    /// Shorthand for a predicate condition.
    pub fn predicate(name: impl Into<String>, args: Vec<Term>) -> Self {
        Condition::Predicate {
            name: name.into(),
            args,
        }
    }

    /// Number of leaves (predicates and comparisons) in evaluation order.
    ///
    /// Failure templates are keyed by leaf index, so an action schema must
    /// declare at least this many of them.
    pub fn leaf_count(&self) -> usize {
        match self {
            Condition::Predicate { .. } | Condition::Compare { .. } => 1,
            Condition::Not(inner) => inner.leaf_count(),
            Condition::All(children) | Condition::Any(children) => {
                children.iter().map(Condition::leaf_count).sum()
            }
        }
    }

    /// Replace every literal term equal to `from` with `to`, recursively.
    ///
    /// Used by event randomization to durably rewrite a schema's trees.
    pub fn replace_literal(&mut self, from: &str, to: &str) {
        match self {
            Condition::Predicate { args, .. } => {
                for term in args {
                    if let Term::Literal(lit) = term {
                        if lit == from {
                            *lit = to.to_string();
                        }
                    }
                }
            }
            Condition::Not(inner) => inner.replace_literal(from, to),
            Condition::All(children) | Condition::Any(children) => {
                for child in children {
                    child.replace_literal(from, to);
                }
            }
            Condition::Compare { lhs, rhs, .. } => {
                for side in [lhs, rhs] {
                    if let NumTerm::Function(fref) = side {
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
}
