//! Condition evaluation with failure traces.
//!
//! Every leaf (predicate or comparison) is assigned a strictly increasing
//! index as it is evaluated. `all`/`any` children are never short-circuited,
//! because failure-feedback selection needs the first failing leaf in
//! declaration order: the order of predicates inside a tree is the authoring
//! mechanism for feedback priority.

use fabula_core::{Fact, FactValue, WorldState};
use fabula_defs::{CompareOp, Condition, FunctionRef, NumTerm};

use crate::binding::{resolve_term, Binding};

/// Record of one evaluated leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafRecord {
    /// Evaluation-order index, starting at 0.
    pub index: usize,
    /// The concrete fact that was tested, when all arguments resolved.
    pub fact: Option<Fact>,
    /// Whether the leaf held.
    pub fulfilled: bool,
}

/// The evaluation trace of a condition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Trace {
    /// A predicate or comparison leaf.
    Leaf(LeafRecord),
    /// A negation node.
    Not {
        /// Trace of the negated condition.
        inner: Box<Trace>,
        /// Whether the negation held.
        fulfilled: bool,
    },
    /// An `all` node.
    All {
        /// Child traces, in declaration order.
        children: Vec<Trace>,
        /// Whether every child held.
        fulfilled: bool,
    },
    /// An `any` node.
    Any {
        /// Child traces, in declaration order.
        children: Vec<Trace>,
        /// Whether at least one child held.
        fulfilled: bool,
    },
}

impl Trace {
    /// Whether this node held.
    pub fn fulfilled(&self) -> bool {
        match self {
            Trace::Leaf(leaf) => leaf.fulfilled,
            Trace::Not { fulfilled, .. }
            | Trace::All { fulfilled, .. }
            | Trace::Any { fulfilled, .. } => *fulfilled,
        }
    }

    /// The leftmost leaf record under this node.
    fn first_leaf(&self) -> Option<&LeafRecord> {
        match self {
            Trace::Leaf(leaf) => Some(leaf),
            Trace::Not { inner, .. } => inner.first_leaf(),
            Trace::All { children, .. } | Trace::Any { children, .. } => {
                children.iter().find_map(Trace::first_leaf)
            }
        }
    }

    /// The first failing leaf in declaration order, if this node failed.
    ///
    /// A failed negation reports the leftmost leaf of its inner condition:
    /// that leaf is the one whose truth caused the failure, and its index is
    /// what the failure templates are keyed by.
    fn failing_leaf(&self) -> Option<&LeafRecord> {
        match self {
            Trace::Leaf(leaf) => (!leaf.fulfilled).then_some(leaf),
            Trace::Not { inner, fulfilled } => {
                if *fulfilled {
                    None
                } else {
                    inner.first_leaf()
                }
            }
            Trace::All { children, fulfilled } | Trace::Any { children, fulfilled } => {
                if *fulfilled {
                    None
                } else {
                    children
                        .iter()
                        .find(|c| !c.fulfilled())
                        .and_then(Trace::failing_leaf)
                }
            }
        }
    }
}

/// Result of evaluating one condition tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Whether the root condition held.
    pub satisfied: bool,
    /// The full trace, one node per condition node.
    pub trace: Trace,
    /// Every evaluated leaf, in evaluation order.
    pub leaves: Vec<LeafRecord>,
}

impl Evaluation {
    /// The first unsatisfied leaf in evaluation order, if the root failed.
    pub fn first_failing_leaf(&self) -> Option<&LeafRecord> {
        if self.satisfied {
            None
        } else {
            self.trace.failing_leaf()
        }
    }
}

/// Evaluates condition trees against one world state.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    world: &'a WorldState,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator over the given world state.
    pub fn new(world: &'a WorldState) -> Self {
        Self { world }
    }

    /// Evaluate a condition tree under a binding.
    pub fn evaluate(&self, condition: &Condition, binding: &Binding) -> Evaluation {
        let mut leaves = Vec::new();
        let trace = self.eval_node(condition, binding, &mut leaves);
        Evaluation {
            satisfied: trace.fulfilled(),
            trace,
            leaves,
        }
    }

    fn eval_node(
        &self,
        condition: &Condition,
        binding: &Binding,
        leaves: &mut Vec<LeafRecord>,
    ) -> Trace {
        match condition {
            Condition::Predicate { name, args } => {
                let record = self.eval_predicate(name, args, binding, leaves.len());
                leaves.push(record.clone());
                Trace::Leaf(record)
            }
            Condition::Not(inner) => {
                let inner_trace = self.eval_node(inner, binding, leaves);
                let fulfilled = !inner_trace.fulfilled();
                Trace::Not {
                    inner: Box::new(inner_trace),
                    fulfilled,
                }
            }
            Condition::All(children) => {
                let traces: Vec<Trace> = children
                    .iter()
                    .map(|c| self.eval_node(c, binding, leaves))
                    .collect();
                let fulfilled = traces.iter().all(Trace::fulfilled);
                Trace::All {
                    children: traces,
                    fulfilled,
                }
            }
            Condition::Any(children) => {
                let traces: Vec<Trace> = children
                    .iter()
                    .map(|c| self.eval_node(c, binding, leaves))
                    .collect();
                let fulfilled = traces.iter().any(Trace::fulfilled);
                Trace::Any {
                    children: traces,
                    fulfilled,
                }
            }
            Condition::Compare { op, lhs, rhs } => {
                let record = self.eval_compare(*op, lhs, rhs, binding, leaves.len());
                leaves.push(record.clone());
                Trace::Leaf(record)
            }
        }
    }

    fn eval_predicate(
        &self,
        name: &str,
        args: &[fabula_defs::Term],
        binding: &Binding,
        index: usize,
    ) -> LeafRecord {
        let resolved: Vec<Option<String>> = args
            .iter()
            .map(|t| resolve_term(self.world, binding, t))
            .collect();

        // An unresolved argument marks an optional parameter that was not
        // supplied; the leaf counts as satisfied rather than failing.
        if resolved.iter().any(Option::is_none) {
            return LeafRecord {
                index,
                fact: None,
                fulfilled: true,
            };
        }

        let fact = Fact::new(
            name,
            resolved
                .into_iter()
                .map(|a| FactValue::Id(a.unwrap_or_default()))
                .collect(),
        );
        let fulfilled = self.world.contains(&fact);
        LeafRecord {
            index,
            fact: Some(fact),
            fulfilled,
        }
    }

    fn eval_compare(
        &self,
        op: CompareOp,
        lhs: &NumTerm,
        rhs: &NumTerm,
        binding: &Binding,
        index: usize,
    ) -> LeafRecord {
        let lhs_value = self.resolve_num(lhs, binding);
        let rhs_value = self.resolve_num(rhs, binding);

        // A comparison with an unresolvable side fails; there is nothing
        // meaningful to compare.
        let fulfilled = match (lhs_value, rhs_value) {
            (Some(a), Some(b)) => match op {
                CompareOp::Equal => a == b,
                CompareOp::Less => a < b,
                CompareOp::LessEq => a <= b,
                CompareOp::Greater => a > b,
                CompareOp::GreaterEq => a >= b,
            },
            _ => false,
        };

        let fact = if fulfilled {
            None
        } else {
            self.compare_fact(lhs, binding)
                .or_else(|| self.compare_fact(rhs, binding))
        };
        LeafRecord {
            index,
            fact,
            fulfilled,
        }
    }

    /// The function fact a failed comparison was checking, for diagnostics.
    fn compare_fact(&self, side: &NumTerm, binding: &Binding) -> Option<Fact> {
        let NumTerm::Function(FunctionRef { predicate, owner }) = side else {
            return None;
        };
        let owner_id = resolve_term(self.world, binding, owner)?;
        self.world.function_fact(predicate, &owner_id).cloned()
    }

    fn resolve_num(&self, side: &NumTerm, binding: &Binding) -> Option<fabula_core::Num> {
        match side {
            NumTerm::Number(n) => Some(*n),
            NumTerm::Function(FunctionRef { predicate, owner }) => {
                let owner_id = resolve_term(self.world, binding, owner)?;
                self.world.numeric_value(predicate, &owner_id)
            }
        }
    }
}
