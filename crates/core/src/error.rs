#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The (simulated) generation model cannot accept work right now.
    #[error("Model overloaded")]
    ModelOverloaded,

    #[error("Internal error: {0}")]
    Internal(String),
}
