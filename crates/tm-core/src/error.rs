//! Error types for the core table model.

/// Alias for `Result<T, TableError>`.
pub type CoreResult<T> = Result<T, TableError>;

/// Errors that can occur when importing or exporting table definitions.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The table configuration could not be parsed or serialized.
    #[error("invalid table definition: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One validation problem on a single table field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// The offending field name.
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl FieldError {
    /// Create a field error.
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
