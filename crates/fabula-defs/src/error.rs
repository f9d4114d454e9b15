//! Error types for definition loading and validation.

/// Alias for `Result<T, DefsError>`.
pub type DefsResult<T> = Result<T, DefsError>;

/// Fatal configuration faults encountered while loading an adventure.
///
/// Every variant aborts session construction. A schema that cannot express
/// feedback for all of its failure modes is rejected up front rather than
/// failing mid-session.
#[derive(Debug, thiserror::Error)]
pub enum DefsError {
    /// The definition JSON could not be deserialized.
    #[error("failed to parse adventure definition: {0}")]
    Parse(#[from] serde_json::Error),

    /// An action schema declared no parameters.
    #[error("action \"{0}\" declares no parameters")]
    NoParameters(String),

    /// An action's per-parameter failure templates do not cover its parameters.
    #[error(
        "action \"{action}\" has {templates} parameter failure templates for {parameters} parameters"
    )]
    ParameterFailureMismatch {
        /// The offending action kind.
        action: String,
        /// Number of parameter failure templates declared.
        templates: usize,
        /// Number of parameters declared.
        parameters: usize,
    },

    /// An action's precondition failure templates do not cover its leaves.
    #[error(
        "action \"{action}\" has {templates} precondition failure templates for {leaves} precondition leaves"
    )]
    PreconditionFailureMismatch {
        /// The offending action kind.
        action: String,
        /// Number of precondition failure templates declared.
        templates: usize,
        /// Number of leaves in the precondition tree.
        leaves: usize,
    },

    /// Two actions or two events share a name.
    #[error("duplicate schema name \"{0}\"")]
    DuplicateSchema(String),
}
