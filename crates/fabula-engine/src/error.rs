//! Error types and player-facing failure values.

use fabula_core::CoreError;
use fabula_defs::DefsError;

/// Alias for `Result<T, EngineError>`.
pub type EngineResult<T> = Result<T, EngineError>;

/// Fatal configuration faults. A session refuses to start rather than run
/// with a partially specified adventure.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The adventure definition failed validation.
    #[error(transparent)]
    Defs(#[from] DefsError),

    /// A textual fact in the initial or goal state could not be parsed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The initial state places no player anywhere.
    #[error("initial state contains no at() fact for the player")]
    MissingPlayer,

    /// A request named an action kind no schema defines.
    #[error("unknown action kind \"{0}\"")]
    UnknownAction(String),
}

/// Which phase of action resolution rejected the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePhase {
    /// A parameter could not be resolved to any instance.
    Binding,
    /// A bound parameter's type does not satisfy its constraint.
    TypeCheck,
    /// A precondition leaf is unsatisfied.
    Precondition,
}

/// A player-facing action failure.
///
/// Failures are values, not errors: they carry the rendered feedback and a
/// machine-readable kind, and they never abort the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionFailure {
    /// The resolution phase that failed.
    pub phase: FailurePhase,
    /// Machine-readable failure kind from the schema, e.g. `not_accessible`.
    pub kind: String,
    /// Rendered, capitalized feedback text.
    pub feedback: String,
}
