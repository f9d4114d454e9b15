//! Error types used throughout the crate.

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when building core data from adventure input.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A textual fact did not match the `predicate(arg,...)` form.
    #[error("malformed fact: \"{0}\"")]
    MalformedFact(String),

    /// A fact had no arguments or more than three.
    #[error("fact \"{fact}\" has {count} arguments, expected 1 to 3")]
    BadArity {
        /// The offending fact text.
        fact: String,
        /// The argument count encountered.
        count: usize,
    },
}
