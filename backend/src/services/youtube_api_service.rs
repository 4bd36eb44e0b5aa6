use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use super::backend::{BackendOutcome, SearchBackend};
use super::errors::BackendError;
use crate::models::{Source, VideoRecord};

const UNKNOWN_TITLE: &str = "Unknown Title";
const PROBE_QUERY: &str = "test";

/// Client for the YouTube Data API v3.
pub struct YouTubeApiClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl YouTubeApiClient {
    pub fn new(api_key: impl Into<String>, base_url: &str) -> Result<Self> {
        // Url::join drops the last path segment unless it ends with a slash
        let base = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        Ok(Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: Url::parse(&base)
                .with_context(|| format!("Invalid YouTube API base URL: {base_url}"))?,
        })
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, BackendError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| BackendError::Http(format!("Invalid endpoint {path}: {e}")))?;
        url.query_pairs_mut()
            .extend_pairs(params)
            .append_pair("key", &self.api_key);
        Ok(url)
    }

    async fn get_json(&self, url: Url, deadline: Duration) -> Result<Value, BackendError> {
        let response = self
            .client
            .get(url)
            .timeout(deadline)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;
        let json: Option<Value> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            let message = json
                .as_ref()
                .and_then(api_error_message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string());
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        json.ok_or_else(|| BackendError::Parse("YouTube API returned invalid JSON".to_string()))
    }

    // Documentation: https://developers.google.com/youtube/v3/docs/search/list
    pub async fn search_videos(
        &self,
        query: &str,
        max_results: usize,
        deadline: Duration,
    ) -> Result<Vec<VideoRecord>, BackendError> {
        info!("Searching YouTube API for \"{query}\" (max {max_results})");

        let max_results = max_results.to_string();
        let url = self.endpoint(
            "search",
            &[
                ("part", "snippet"),
                ("q", query),
                ("maxResults", max_results.as_str()),
                ("type", "video"),
                ("order", "relevance"),
            ],
        )?;

        let response = self.get_json(url, deadline).await?;
        let videos = parse_search_response(&response);
        info!("YouTube API returned {} videos", videos.len());
        Ok(videos)
    }

    // Documentation: https://developers.google.com/youtube/v3/docs/videos/list
    pub async fn get_video_details(
        &self,
        video_id: &str,
        deadline: Duration,
    ) -> Result<Option<VideoRecord>, BackendError> {
        debug!("Fetching YouTube API details for {video_id}");

        let url = self.endpoint(
            "videos",
            &[("part", "snippet,statistics"), ("id", video_id)],
        )?;
        let response = self.get_json(url, deadline).await?;

        Ok(response["items"]
            .as_array()
            .and_then(|items| items.first())
            .and_then(|item| {
                let id = item["id"].as_str()?;
                Some(record_from_snippet(id, &item["snippet"]))
            }))
    }
}

fn map_transport_error(e: reqwest::Error) -> BackendError {
    if e.is_timeout() {
        BackendError::Timeout
    } else {
        // the request url carries the api key
        BackendError::Http(e.without_url().to_string())
    }
}

/// Google error bodies look like `{"error": {"code": 403, "message": "..."}}`.
fn api_error_message(body: &Value) -> Option<String> {
    body["error"]["message"].as_str().map(String::from)
}

fn record_from_snippet(video_id: &str, snippet: &Value) -> VideoRecord {
    let mut video = VideoRecord::new(
        video_id,
        snippet["title"].as_str().unwrap_or(UNKNOWN_TITLE),
    );
    video.description = snippet["description"].as_str().map(String::from);
    video.thumbnail = snippet["thumbnails"]["medium"]["url"]
        .as_str()
        .map(String::from);
    video.channel_title = snippet["channelTitle"].as_str().map(String::from);
    video.published_at = snippet["publishedAt"].as_str().map(String::from);
    video
}

/// Maps search items to records. Items without a video id (channels,
/// playlists) are dropped.
pub fn parse_search_response(response: &Value) -> Vec<VideoRecord> {
    response["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let video_id = item["id"]["videoId"].as_str()?;
                    Some(record_from_snippet(video_id, &item["snippet"]))
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl SearchBackend for YouTubeApiClient {
    fn name(&self) -> &'static str {
        "youtube-data-api-v3"
    }

    fn source(&self) -> Source {
        Source::Api
    }

    /// The Data API has no ping endpoint; a one-result search stands in.
    async fn probe(&self, deadline: Duration) -> bool {
        match self.search_videos(PROBE_QUERY, 1, deadline).await {
            Ok(_) => true,
            Err(e) => {
                warn!("YouTube API probe failed: {e}");
                false
            }
        }
    }

    async fn search(&self, query: &str, limit: usize, deadline: Duration) -> BackendOutcome {
        self.search_videos(query, limit, deadline).await.into()
    }

    async fn video_details(
        &self,
        video_id: &str,
        deadline: Duration,
    ) -> Result<Option<VideoRecord>, BackendError> {
        self.get_video_details(video_id, deadline).await
    }
}
