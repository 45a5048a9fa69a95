//! Client-side cache of the user's recent generations.

use genstudio_core::generation::{clamp_history_limit, DEFAULT_HISTORY_LIMIT};
use tokio::sync::watch;

use crate::api::GenerationApi;
use crate::error::ClientError;
use crate::model::GenerationResult;

/// Latest `limit` generations, newest first, observable through a watch
/// channel.
pub struct HistoryStore {
    limit: i64,
    entries: watch::Sender<Vec<GenerationResult>>,
}

impl HistoryStore {
    /// `limit` is clamped into the range the server accepts.
    pub fn new(limit: i64) -> Self {
        let (entries, _) = watch::channel(Vec::new());
        Self {
            limit: clamp_history_limit(limit),
            entries,
        }
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn entries(&self) -> Vec<GenerationResult> {
        self.entries.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<GenerationResult>> {
        self.entries.subscribe()
    }

    /// Replace the cached list, keeping at most `limit` entries.
    pub fn replace(&self, mut entries: Vec<GenerationResult>) {
        entries.truncate(self.limit as usize);
        self.entries.send_replace(entries);
    }

    /// Fetch the latest entries from `api` without caching them.
    pub async fn fetch(&self, api: &dyn GenerationApi) -> Result<Vec<GenerationResult>, ClientError> {
        api.history(self.limit).await
    }

    /// Fetch the latest entries from `api` and cache them.
    pub async fn refresh(&self, api: &dyn GenerationApi) -> Result<Vec<GenerationResult>, ClientError> {
        let entries = self.fetch(api).await?;
        self.replace(entries);
        tracing::debug!(count = self.entries.borrow().len(), "History refreshed");
        Ok(self.entries())
    }

    pub fn clear(&self) {
        self.entries.send_replace(Vec::new());
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn entry(id: i64) -> GenerationResult {
        GenerationResult {
            id,
            user_id: 1,
            prompt: format!("p{id}"),
            style: "anime".into(),
            image_url: format!("/uploads/{id}.png"),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(HistoryStore::new(0).limit(), 1);
        assert_eq!(HistoryStore::new(51).limit(), 50);
        assert_eq!(HistoryStore::default().limit(), 5);
    }

    #[test]
    fn replace_truncates_to_limit() {
        let store = HistoryStore::new(2);
        store.replace((1..=4).map(entry).collect());

        let ids: Vec<i64> = store.entries().iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
