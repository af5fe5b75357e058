//! Error types for NPC generation.

use tm_engine::EngineError;

/// Alias for `Result<T, NpcError>`.
pub type NpcResult<T> = Result<T, NpcError>;

/// Errors that can occur when registering schemas or generating NPCs.
#[derive(Debug, thiserror::Error)]
pub enum NpcError {
    /// The schema name is empty or reserved.
    #[error("reserved schema name: \"{0}\"")]
    ReservedName(String),

    /// No schema is registered under the given name.
    #[error("unknown schema: {0}")]
    UnknownSchema(String),

    /// A schema definition could not be parsed.
    #[error("invalid schema definition: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field source failed to resolve through the engine.
    #[error(transparent)]
    Engine(#[from] EngineError),
}
