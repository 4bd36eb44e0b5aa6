// External-tool backend: shells out to yt-dlp
//
// Search uses the `ytsearchN:<query>` pseudo-URL with `--flat-playlist`, which
// prints one JSON object per result without resolving formats.

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info, warn};
use serde_json::Value;
use std::io::ErrorKind;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use super::backend::{BackendOutcome, SearchBackend};
use super::errors::BackendError;
use crate::models::{Source, VideoRecord};
use crate::utils::watch_url;

const UNKNOWN_TITLE: &str = "Unknown Title";

/// stderr fragments yt-dlp prints for ids that resolve to no watchable video
const MISSING_VIDEO_MARKERS: [&str; 3] = [
    "Video unavailable",
    "Private video",
    "This video is not available",
];

pub struct YtDlpBackend {
    program: String,
}

impl YtDlpBackend {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn search_args(query: &str, limit: usize) -> Vec<String> {
        vec![
            "-j".to_string(),
            "--flat-playlist".to_string(),
            "--no-warnings".to_string(),
            format!("ytsearch{limit}:{query}"),
        ]
    }

    fn details_args(video_id: &str) -> Vec<String> {
        vec![
            "-j".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            watch_url(video_id),
        ]
    }

    /// Runs yt-dlp with `args`. The child is killed if `deadline` passes first.
    async fn run(&self, args: &[String], deadline: Duration) -> Result<Output, BackendError> {
        debug!("Running {} {}", self.program, args.join(" "));

        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        match timeout(deadline, command.output()).await {
            Err(_) => Err(BackendError::Timeout),
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                Err(BackendError::ToolNotFound(self.program.clone()))
            }
            Ok(Err(e)) => Err(BackendError::Execution(format!(
                "Failed to start {}: {e}",
                self.program
            ))),
            Ok(Ok(output)) => Ok(output),
        }
    }

    async fn run_checked(
        &self,
        args: &[String],
        deadline: Duration,
    ) -> Result<String, BackendError> {
        let output = self.run(args, deadline).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BackendError::Execution(stderr.trim().to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// One record per parsable line. Unparsable lines and entries without an
    /// id are skipped so a single bad line does not lose the other results.
    pub fn parse_search_output(stdout: &str) -> Vec<VideoRecord> {
        stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter_map(|line| match serde_json::from_str::<Value>(line) {
                Ok(entry) => Self::parse_entry(&entry),
                Err(e) => {
                    warn!("Skipping unparsable yt-dlp line ({e}): {line}");
                    None
                }
            })
            .collect()
    }

    fn parse_entry(entry: &Value) -> Option<VideoRecord> {
        let id = entry["id"].as_str().filter(|id| !id.is_empty())?;
        let title = entry["title"].as_str().unwrap_or(UNKNOWN_TITLE);
        Some(VideoRecord::new(id, title))
    }

    fn parse_details(stdout: &str) -> Result<Option<VideoRecord>, BackendError> {
        let Some(line) = stdout.lines().map(str::trim).find(|l| !l.is_empty()) else {
            return Ok(None);
        };

        let json: Value = serde_json::from_str(line)
            .map_err(|e| BackendError::Parse(format!("Invalid JSON: {e}")))?;

        let Some(mut video) = Self::parse_entry(&json) else {
            return Ok(None);
        };

        video.description = json["description"].as_str().map(String::from);
        video.thumbnail = json["thumbnail"].as_str().map(String::from);
        video.channel_title = json["channel"]
            .as_str()
            .or_else(|| json["uploader"].as_str())
            .map(String::from);
        video.published_at = json["upload_date"].as_str().and_then(format_upload_date);

        Ok(Some(video))
    }
}

/// yt-dlp reports upload dates as `YYYYMMDD`.
fn format_upload_date(raw: &str) -> Option<String> {
    NaiveDate::parse_from_str(raw, "%Y%m%d")
        .ok()
        .map(|date| date.format("%Y-%m-%d").to_string())
}

#[async_trait]
impl SearchBackend for YtDlpBackend {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    fn source(&self) -> Source {
        Source::ExternalTool
    }

    async fn probe(&self, deadline: Duration) -> bool {
        match self.run(&["--version".to_string()], deadline).await {
            Ok(output) => output.status.success(),
            Err(e) => {
                debug!("yt-dlp probe failed: {e}");
                false
            }
        }
    }

    async fn search(&self, query: &str, limit: usize, deadline: Duration) -> BackendOutcome {
        info!("Searching yt-dlp for \"{query}\" (limit {limit})");

        let result = self
            .run_checked(&Self::search_args(query, limit), deadline)
            .await
            .map(|stdout| {
                debug!("yt-dlp output: {stdout}");
                let mut videos = Self::parse_search_output(&stdout);
                videos.truncate(limit);
                videos
            });

        if let Ok(videos) = &result {
            info!("yt-dlp returned {} videos", videos.len());
        }
        result.into()
    }

    async fn video_details(
        &self,
        video_id: &str,
        deadline: Duration,
    ) -> Result<Option<VideoRecord>, BackendError> {
        match self.run_checked(&Self::details_args(video_id), deadline).await {
            Ok(stdout) => Self::parse_details(&stdout),
            Err(BackendError::Execution(stderr))
                if MISSING_VIDEO_MARKERS.iter().any(|m| stderr.contains(m)) =>
            {
                info!("yt-dlp reports no video for id {video_id}");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
