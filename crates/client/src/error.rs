use genstudio_core::error::CoreError;

/// Failure taxonomy seen by callers of the client library.
///
/// Only [`ClientError::Overloaded`] is ever retried automatically.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    /// The request was rejected before or by the server as invalid input.
    #[error("{0}")]
    Validation(String),

    /// The model reported the transient overload condition.
    #[error("Model overloaded")]
    Overloaded,

    /// The logical operation was aborted or superseded.
    #[error("Request cancelled")]
    Cancelled,

    /// Missing, invalid or expired credential.
    #[error("{0}")]
    Auth(String),

    /// Network failures, server errors and malformed responses.
    #[error("{0}")]
    Unexpected(String),
}

impl ClientError {
    pub fn is_overload(&self) -> bool {
        matches!(self, ClientError::Overloaded)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }
}

impl From<CoreError> for ClientError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => ClientError::Validation(msg),
            CoreError::Unauthorized(msg) => ClientError::Auth(msg),
            CoreError::ModelOverloaded => ClientError::Overloaded,
            CoreError::Internal(msg) => ClientError::Unexpected(msg),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Unexpected(format!("HTTP request failed: {err}"))
    }
}
