//! The seam between the coordinator and the generation service.

use async_trait::async_trait;

use crate::error::ClientError;
use crate::model::{GenerationRequest, GenerationResult};

/// Remote operations the coordinator depends on.
///
/// Implementations must be cancel-safe: the coordinator drops an in-flight
/// future when its operation is aborted or superseded.
#[async_trait]
pub trait GenerationApi: Send + Sync {
    /// Submit one generation attempt. The overload condition is reported as
    /// [`ClientError::Overloaded`].
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, ClientError>;

    /// Most recent generations of the current user, newest first.
    async fn history(&self, limit: i64) -> Result<Vec<GenerationResult>, ClientError>;
}
