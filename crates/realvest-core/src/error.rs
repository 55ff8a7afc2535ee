use thiserror::Error;

#[derive(Debug, Error)]
pub enum RealvestError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division undefined in {context}")]
    DivisionUndefined { context: String },

    #[error("Numeric overflow while computing {context}")]
    NumericOverflow { context: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for RealvestError {
    fn from(e: serde_json::Error) -> Self {
        RealvestError::SerializationError(e.to_string())
    }
}
