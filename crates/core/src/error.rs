#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} not found: {name}")]
    NotFound { entity: &'static str, name: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for an unknown-sensor-kind error.
    pub fn unknown_kind(name: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: "sensor kind",
            name: name.into(),
        }
    }
}
