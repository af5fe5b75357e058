//! Error types for the resolution engine.

/// Alias for `Result<T, EngineError>`.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while resolving tables and tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// A dice notation string could not be parsed. Distinct from the valid
    /// "no notation" empty case, which is not an error.
    #[error("malformed dice notation: \"{0}\"")]
    MalformedNotation(String),

    /// A table reference did not resolve through the installed lookup.
    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// A token was missing a required positional argument.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// Resolution recursed past the depth bound — tables reference each
    /// other in a cycle.
    #[error("cyclic table reference: recursion exceeded depth {0}")]
    CyclicReference(usize),

    /// A selection step addressed a subtable with nothing selectable in it.
    #[error("nothing to select in table: {0}")]
    EmptyTable(String),
}
