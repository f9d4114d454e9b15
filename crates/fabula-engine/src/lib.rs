//! The Fabula resolution engine.
//!
//! Interprets the declarative definitions of `fabula-defs` against the world
//! model of `fabula-core`: binds player requests to schema parameters, checks
//! preconditions with a failure trace, applies effect trees, cascades ambient
//! events, and tracks exploration. The [`Session`] type ties all of it
//! together and is the only entry point collaborators need.

/// Action resolution pipeline.
pub mod actions;
/// Effect application.
pub mod apply;
/// Parameter binding.
pub mod binding;
/// Fixed identifiers and message texts.
pub mod constants;
/// Description text generation.
pub mod describe;
/// Error types and player-facing failure values.
pub mod error;
/// Event resolution and randomization.
pub mod events;
/// Condition evaluation with failure traces.
pub mod eval;
/// Perception and exploration tracking.
pub mod explore;
/// Feedback template rendering.
pub mod feedback;
/// Initial world construction and augmentation.
pub mod init;
/// Session controller.
pub mod session;

pub use actions::{ActionOutcome, ActionResolver};
pub use apply::StateDiff;
pub use binding::Binding;
pub use error::{ActionFailure, EngineError, EngineResult, FailurePhase};
pub use events::{EventEngine, EventOutcome};
pub use eval::{Evaluation, LeafRecord, Trace};
pub use explore::{ExplorationReport, ExplorationTracker};
pub use session::{ActionRequest, Session, TurnReport};
