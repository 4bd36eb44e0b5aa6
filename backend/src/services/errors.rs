use crate::models::ErrorResponse;
use rocket::http::Status;
use std::fmt;

/// Failure of a single backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendError {
    /// yt-dlp executable could not be started
    ToolNotFound(String),

    /// yt-dlp exited with a non-zero status
    Execution(String),

    /// Output or response body could not be decoded
    Parse(String),

    /// Transport failure talking to the hosted API
    Http(String),

    /// The hosted API answered with an error status
    Api { status: u16, message: String },

    /// The call did not finish before its deadline
    Timeout,
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToolNotFound(tool) => write!(f, "Tool not found: {tool}"),
            Self::Execution(msg) => write!(f, "Execution error: {msg}"),
            Self::Parse(msg) => write!(f, "Parse error: {msg}"),
            Self::Http(msg) => write!(f, "HTTP error: {msg}"),
            Self::Api { status, message } => write!(f, "API error ({status}): {message}"),
            Self::Timeout => write!(f, "Backend did not respond before the deadline"),
        }
    }
}

impl std::error::Error for BackendError {}

/// Outcome of a search request as seen by the HTTP layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchError {
    Validation(String),
    NotFound,
    Unavailable(String),
    Backend(BackendError),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "{msg}"),
            Self::NotFound => write!(f, "No videos found for the given query"),
            Self::Unavailable(msg) => write!(f, "No video service available: {msg}"),
            Self::Backend(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SearchError {}

impl From<BackendError> for SearchError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Timeout => Self::Unavailable(e.to_string()),
            other => Self::Backend(other),
        }
    }
}

impl SearchError {
    pub fn status(&self) -> Status {
        match self {
            Self::Validation(_) => Status::BadRequest,
            Self::NotFound => Status::NotFound,
            Self::Unavailable(_) => Status::ServiceUnavailable,
            Self::Backend(_) => Status::InternalServerError,
        }
    }
}

impl From<SearchError> for ErrorResponse {
    fn from(e: SearchError) -> Self {
        let status = e.status();
        match e {
            SearchError::Validation(msg) => ErrorResponse::new(status, msg, None),
            SearchError::NotFound => ErrorResponse::new(
                status,
                "No videos found",
                Some("No videos found for the given query".to_string()),
            ),
            SearchError::Unavailable(msg) => ErrorResponse::new(
                status,
                "No video service available",
                Some(format!(
                    "{msg}. Set YOUTUBE_API_KEY or install yt-dlp: https://github.com/yt-dlp/yt-dlp"
                )),
            ),
            SearchError::Backend(e) => {
                ErrorResponse::new(status, "Failed to search videos", Some(e.to_string()))
            }
        }
    }
}
