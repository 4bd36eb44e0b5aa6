// Search backend trait and the tagged outcome the orchestrator matches on

use async_trait::async_trait;
use std::time::Duration;

use super::errors::BackendError;
use crate::models::{Source, VideoRecord};

/// Result of one backend search call.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendOutcome {
    Found(Vec<VideoRecord>),
    Empty,
    Failed(BackendError),
}

impl From<Result<Vec<VideoRecord>, BackendError>> for BackendOutcome {
    fn from(result: Result<Vec<VideoRecord>, BackendError>) -> Self {
        match result {
            Ok(videos) if videos.is_empty() => BackendOutcome::Empty,
            Ok(videos) => BackendOutcome::Found(videos),
            Err(e) => BackendOutcome::Failed(e),
        }
    }
}

/// A mechanism able to look up videos by keyword.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Name of the backend (for logging)
    fn name(&self) -> &'static str;

    /// Tag reported in responses served by this backend
    fn source(&self) -> Source;

    /// Cheap usability check. Never performs a full search unless the
    /// backend has no lighter call available.
    async fn probe(&self, deadline: Duration) -> bool;

    /// Up to `limit` videos matching `query`, most relevant first.
    async fn search(&self, query: &str, limit: usize, deadline: Duration) -> BackendOutcome;

    /// Single best match. Same shape as a one-result search.
    async fn top_video(&self, query: &str, deadline: Duration) -> BackendOutcome {
        match self.search(query, 1, deadline).await {
            BackendOutcome::Found(mut videos) => {
                videos.truncate(1);
                BackendOutcome::Found(videos)
            }
            other => other,
        }
    }

    /// Full record for a single video id, `None` if the platform has no such video.
    async fn video_details(
        &self,
        video_id: &str,
        deadline: Duration,
    ) -> Result<Option<VideoRecord>, BackendError>;
}
