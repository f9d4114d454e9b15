//! Session controller.
//!
//! The session owns the world state, its history, the goal set, the event
//! engine, and the exploration tracker, and advances them one request at a
//! time. Every accepted request produces a [`TurnReport`]; fatal faults are
//! confined to construction.

use std::collections::{BTreeSet, HashSet};

use fabula_core::{Fact, StateHistory, TypeGraph, WorldState};
use fabula_defs::{ActionSchema, AdventureDef};

use crate::actions::ActionResolver;
use crate::apply::StateDiff;
use crate::describe::Describer;
use crate::error::{ActionFailure, EngineError, EngineResult};
use crate::events::EventEngine;
use crate::explore::{current_perceived, ExplorationReport, ExplorationTracker};
use crate::init::{build_initial_world, parse_goal_state};

/// A structured player request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    /// The action kind, matched against the schema table.
    pub kind: String,
    /// First argument, a type name or instance id.
    pub arg1: Option<String>,
    /// Second argument.
    pub arg2: Option<String>,
    /// Preposition supplied with the request, for `{prep}` feedback.
    pub prep: Option<String>,
}

impl ActionRequest {
    /// A request with no arguments, e.g. `look`.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            arg1: None,
            arg2: None,
            prep: None,
        }
    }

    /// A request with one argument, e.g. `take apple`.
    pub fn with_arg1(kind: impl Into<String>, arg1: impl Into<String>) -> Self {
        Self {
            arg1: Some(arg1.into()),
            ..Self::new(kind)
        }
    }

    /// A request with two arguments, e.g. `put apple table`.
    pub fn with_args(
        kind: impl Into<String>,
        arg1: impl Into<String>,
        arg2: impl Into<String>,
    ) -> Self {
        Self {
            arg1: Some(arg1.into()),
            arg2: Some(arg2.into()),
            ..Self::new(kind)
        }
    }

    /// Attach a preposition to the request.
    #[must_use]
    pub fn with_prep(mut self, prep: impl Into<String>) -> Self {
        self.prep = Some(prep.into());
        self
    }
}

/// The result of one processed request.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReport {
    /// Whether the action resolved.
    pub success: bool,
    /// Action feedback, with any triggered event feedback appended
    /// newline-separated.
    pub feedback: String,
    /// Goal facts that hold after this turn, in textual form.
    pub achieved_goals: BTreeSet<String>,
    /// Facts the action changed. Empty on failure.
    pub diff: StateDiff,
    /// The failure, when the action did not resolve.
    pub failure: Option<ActionFailure>,
    /// Exploration metrics for this turn.
    pub exploration: ExplorationReport,
}

/// A running adventure.
pub struct Session {
    def: AdventureDef,
    graph: TypeGraph,
    world: WorldState,
    history: StateHistory,
    goals: HashSet<Fact>,
    exploration: ExplorationTracker,
    events: EventEngine,
}

impl Session {
    /// Build a session from a validated definition and a randomization seed.
    pub fn new(def: AdventureDef, seed: u64) -> EngineResult<Self> {
        def.validate()?;
        let graph = build_graph(&def);
        let world = build_initial_world(&def, &graph)?;
        let goals = parse_goal_state(&def, &graph)?;
        let history = StateHistory::new(world.clone());
        let exploration = ExplorationTracker::new(current_perceived(&world, &def));
        let events = EventEngine::new(def.events.clone(), seed);
        Ok(Self {
            def,
            graph,
            world,
            history,
            goals,
            exploration,
            events,
        })
    }

    /// Process one request: resolve the action, update history and
    /// exploration, then run events until quiescent.
    ///
    /// Goal and exploration bookkeeping observe the post-action state, not
    /// the post-event state: events are ambient happenings the player has not
    /// perceived yet when the turn's report is assembled.
    pub fn process_action(&mut self, request: &ActionRequest) -> EngineResult<TurnReport> {
        let schema = self
            .def
            .actions
            .iter()
            .find(|s| s.kind == request.kind)
            .ok_or_else(|| EngineError::UnknownAction(request.kind.clone()))?
            .clone();

        let resolver = ActionResolver::new(&self.graph, &self.def);
        let result = resolver.resolve(&mut self.world, &schema, request);

        let mut report = match result {
            Ok(outcome) => {
                self.history.push(self.world.clone());
                self.track_exploration(&outcome.diff.removed);
                TurnReport {
                    success: true,
                    feedback: outcome.feedback,
                    achieved_goals: self.achieved_goals(),
                    diff: outcome.diff,
                    failure: None,
                    exploration: self.exploration_report(&schema),
                }
            }
            Err(failure) => {
                self.track_exploration(&[]);
                TurnReport {
                    success: false,
                    feedback: failure.feedback.clone(),
                    achieved_goals: self.achieved_goals(),
                    diff: StateDiff::new(),
                    failure: Some(failure),
                    exploration: self.exploration_report(&schema),
                }
            }
        };

        for feedback in self.run_events() {
            report.feedback.push('\n');
            report.feedback.push_str(&feedback);
        }
        Ok(report)
    }

    /// Advance the ambient world after a request that never matched any
    /// action, e.g. input the host failed to parse.
    ///
    /// The turn still counts: exploration observes the current perception
    /// set and events run until quiescent, exactly as after a resolved
    /// action. Returns the triggered events' feedback joined with newlines,
    /// empty when nothing fires.
    pub fn process_parse_failure(&mut self) -> String {
        self.track_exploration(&[]);
        self.run_events().join("\n")
    }

    /// Execute requests in order, stopping at the first failure, then revert
    /// world, history, and exploration to their pre-plan state.
    ///
    /// The returned reports describe what would have happened; the session
    /// state is as if the plan never ran. Truncating by length also discards
    /// the snapshots of events the plan triggered.
    pub fn execute_plan_sequence(
        &mut self,
        requests: &[ActionRequest],
    ) -> EngineResult<Vec<TurnReport>> {
        let history_len = self.history.len();
        let exploration_len = self.exploration.history_len();

        let mut reports = Vec::new();
        for request in requests {
            let report = self.process_action(request)?;
            let failed = !report.success;
            reports.push(report);
            if failed {
                break;
            }
        }

        self.world = self.history.truncate_to(history_len).clone();
        self.exploration.truncate_to(exploration_len);
        Ok(reports)
    }

    /// Run events until no more trigger, snapshotting after each.
    fn run_events(&mut self) -> Vec<String> {
        let mut feedbacks = Vec::new();
        while let Some(outcome) = self
            .events
            .run_once(&mut self.world, &self.graph, &self.def)
        {
            self.history.push(self.world.clone());
            if !outcome.feedback.is_empty() {
                feedbacks.push(outcome.feedback);
            }
        }
        feedbacks
    }

    fn track_exploration(&mut self, removed: &[Fact]) {
        let perceived = current_perceived(&self.world, &self.def);
        self.exploration.track(perceived, removed);
    }

    fn exploration_report(&self, schema: &ActionSchema) -> ExplorationReport {
        self.exploration
            .report(&self.world, &self.goals, schema.epistemic, schema.pragmatic)
    }

    /// Goal facts currently satisfied, in textual form.
    pub fn achieved_goals(&self) -> BTreeSet<String> {
        self.goals
            .iter()
            .filter(|g| self.world.contains(g))
            .map(ToString::to_string)
            .collect()
    }

    /// The current world state.
    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Number of snapshots in the state history.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Description of the player's current room.
    pub fn room_description(&self) -> String {
        Describer::new(&self.world, &self.def).room_description()
    }

    /// Description of the inventory content.
    pub fn inventory_description(&self) -> String {
        Describer::new(&self.world, &self.def).inventory_description()
    }
}

/// Assemble the domain type graph from the definition: the declared
/// hierarchy, one trait edge per entity-type trait, and the numeric function
/// descriptors.
fn build_graph(def: &AdventureDef) -> TypeGraph {
    let mut builder = TypeGraph::builder().hierarchy(
        def.domain
            .hierarchy
            .iter()
            .map(|(supertype, subtypes)| (supertype.clone(), subtypes.clone())),
    );
    for (type_name, entity_def) in &def.entity_types {
        for type_trait in &entity_def.traits {
            builder = builder.entity_trait(type_trait.clone(), type_name.clone());
        }
    }
    for function in &def.domain.functions {
        builder = builder.function(function.clone());
    }
    builder.build()
}
