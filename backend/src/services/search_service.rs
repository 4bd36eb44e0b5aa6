// Backend selection and fallback
//
// Order per request:
// 1. Hosted API, when configured. Empty results and failures fall through.
// 2. External tool, after a probe. Its outcome is final.

use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;

use super::backend::{BackendOutcome, SearchBackend};
use super::errors::SearchError;
use crate::models::{AvailabilityStatus, SearchResponse, Source, VideoRecord};
use crate::utils::{is_valid_video_id, MAX_RESULTS, MIN_RESULTS};

pub const INVALID_QUERY: &str = "Query is required and must be a non-empty string";

#[derive(Debug, Clone, Copy)]
pub struct Deadlines {
    /// Bound on a single search or lookup call
    pub call: Duration,
    /// Bound on a single availability probe
    pub probe: Duration,
}

impl Default for Deadlines {
    fn default() -> Self {
        Self {
            call: Duration::from_secs(30),
            probe: Duration::from_secs(5),
        }
    }
}

pub struct VideoSearchService {
    api: Option<Arc<dyn SearchBackend>>,
    external: Arc<dyn SearchBackend>,
    deadlines: Deadlines,
}

impl VideoSearchService {
    pub fn new(
        api: Option<Arc<dyn SearchBackend>>,
        external: Arc<dyn SearchBackend>,
        deadlines: Deadlines,
    ) -> Self {
        Self {
            api,
            external,
            deadlines,
        }
    }

    pub fn has_api_backend(&self) -> bool {
        self.api.is_some()
    }

    /// Runs `query` against the first usable backend.
    ///
    /// `limit` is clamped to `1..=10`; the response never holds more videos than that.
    pub async fn search(&self, query: &str, limit: usize) -> Result<SearchResponse, SearchError> {
        let query = normalize_query(query)?;
        let limit = limit.clamp(MIN_RESULTS, MAX_RESULTS);

        info!("Search request: query=\"{query}\", limit={limit}");

        if let Some(api) = &self.api {
            match self.call_search(api.as_ref(), query, limit).await {
                BackendOutcome::Found(videos) => return Ok(respond(videos, limit, api.source())),
                BackendOutcome::Empty => {
                    info!("{} returned no results, falling back", api.name());
                }
                BackendOutcome::Failed(e) => {
                    warn!("{} failed, falling back: {e}", api.name());
                }
            }
        }

        let external = self.external.as_ref();
        if !external.probe(self.deadlines.probe).await {
            warn!("{} is not available", external.name());
            return Err(SearchError::Unavailable(format!(
                "{} is not available",
                external.name()
            )));
        }

        match self.call_search(external, query, limit).await {
            BackendOutcome::Found(videos) => Ok(respond(videos, limit, external.source())),
            BackendOutcome::Empty => {
                info!("No videos found for \"{query}\"");
                Err(SearchError::NotFound)
            }
            BackendOutcome::Failed(e) => {
                error!("{} search failed: {e}", external.name());
                Err(e.into())
            }
        }
    }

    async fn call_search(
        &self,
        backend: &dyn SearchBackend,
        query: &str,
        limit: usize,
    ) -> BackendOutcome {
        if limit == 1 {
            backend.top_video(query, self.deadlines.call).await
        } else {
            backend.search(query, limit, self.deadlines.call).await
        }
    }

    /// Reports the backend a search would currently use. Never cached.
    pub async fn availability(&self) -> AvailabilityStatus {
        if let Some(api) = &self.api {
            if api.probe(self.deadlines.probe).await {
                return AvailabilityStatus {
                    available: true,
                    source: api.source(),
                    message: format!("{} is working", api.name()),
                };
            }
            warn!("{} probe failed, checking {}", api.name(), self.external.name());
        }

        let available = self.external.probe(self.deadlines.probe).await;
        let message = if available {
            format!("{} is available", self.external.name())
        } else {
            format!("{} is not available", self.external.name())
        };

        AvailabilityStatus {
            available,
            source: self.external.source(),
            message,
        }
    }

    /// Looks up one video, with the same fallback order as [`Self::search`].
    pub async fn video_details(&self, video_id: &str) -> Result<VideoRecord, SearchError> {
        let video_id = video_id.trim();
        if !is_valid_video_id(video_id) {
            return Err(SearchError::Validation(format!(
                "Invalid video id: {video_id}"
            )));
        }

        if let Some(api) = &self.api {
            match api.video_details(video_id, self.deadlines.call).await {
                Ok(Some(video)) => return Ok(video),
                Ok(None) => info!("{} has no video {video_id}, falling back", api.name()),
                Err(e) => warn!("{} lookup failed, falling back: {e}", api.name()),
            }
        }

        let external = self.external.as_ref();
        if !external.probe(self.deadlines.probe).await {
            return Err(SearchError::Unavailable(format!(
                "{} is not available",
                external.name()
            )));
        }

        match external.video_details(video_id, self.deadlines.call).await {
            Ok(Some(video)) => Ok(video),
            Ok(None) => Err(SearchError::NotFound),
            Err(e) => {
                error!("{} lookup failed: {e}", external.name());
                Err(SearchError::from(e))
            }
        }
    }
}

fn respond(mut videos: Vec<VideoRecord>, limit: usize, source: Source) -> SearchResponse {
    videos.truncate(limit);
    info!("Returning {} videos from {source:?}", videos.len());
    SearchResponse::new(videos, source)
}

pub fn normalize_query(query: &str) -> Result<&str, SearchError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(SearchError::Validation(INVALID_QUERY.to_string()));
    }
    Ok(trimmed)
}
