//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// History paging parameters (`?limit=`).
///
/// Validated in the handler via
/// [`validate_history_limit`](genstudio_core::generation::validate_history_limit).
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<i64>,
}
