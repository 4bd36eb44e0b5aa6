use crate::services::backend::SearchBackend;
use crate::services::search_service::{Deadlines, VideoSearchService};
use crate::services::youtube_api_service::YouTubeApiClient;
use crate::services::ytdlp_service::YtDlpBackend;
use crate::AppState;
use anyhow::Result;
use env_logger::Builder;
use lazy_static::lazy_static;
use log::{info, warn, LevelFilter};
use rocket::http::Method;
use rocket_cors::{AllowedHeaders, AllowedOrigins, CorsOptions};
use std::env;
use std::sync::Arc;
use std::time::Duration;

lazy_static! {
    /// Blank or unset disables the YouTube Data API backend.
    pub static ref YOUTUBE_API_KEY: Option<String> = env::var("YOUTUBE_API_KEY")
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty());
    pub static ref YOUTUBE_API_BASE_URL: String = env::var("YOUTUBE_API_BASE_URL")
        .unwrap_or_else(|_| "https://www.googleapis.com/youtube/v3/".to_string());
    pub static ref YT_DLP_PATH: String =
        env::var("YT_DLP_PATH").unwrap_or_else(|_| "yt-dlp".to_string());
    pub static ref SEARCH_TIMEOUT_SECS: u64 = env::var("SEARCH_TIMEOUT_SECS")
        .unwrap_or_else(|_| "30".to_string())
        .parse::<u64>()
        .unwrap_or(30);
    pub static ref PROBE_TIMEOUT_SECS: u64 = env::var("PROBE_TIMEOUT_SECS")
        .unwrap_or_else(|_| "5".to_string())
        .parse::<u64>()
        .unwrap_or(5);
    pub static ref PORT: u16 = env::var("PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()
        .unwrap_or(3001);
}

pub fn init_logger() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
    info!("Starting video finder backend...");
}

pub fn load_environment() {
    dotenv::dotenv().ok();
}

pub fn create_api_backend() -> Result<Option<Arc<dyn SearchBackend>>> {
    match YOUTUBE_API_KEY.as_deref() {
        Some(api_key) => {
            info!("YouTube Data API backend enabled ({})", &*YOUTUBE_API_BASE_URL);
            let client: Arc<dyn SearchBackend> =
                Arc::new(YouTubeApiClient::new(api_key, &YOUTUBE_API_BASE_URL)?);
            Ok(Some(client))
        }
        None => {
            warn!("YOUTUBE_API_KEY is not set, searches go straight to yt-dlp");
            Ok(None)
        }
    }
}

pub fn create_app_state() -> Result<AppState> {
    let api = create_api_backend()?;

    info!("Using yt-dlp executable: {}", &*YT_DLP_PATH);
    let external = Arc::new(YtDlpBackend::new(YT_DLP_PATH.as_str()));

    let deadlines = Deadlines {
        call: Duration::from_secs(*SEARCH_TIMEOUT_SECS),
        probe: Duration::from_secs(*PROBE_TIMEOUT_SECS),
    };

    let search_service = VideoSearchService::new(api, external, deadlines);
    info!(
        "Search order: {}",
        if search_service.has_api_backend() {
            "YouTube Data API, then yt-dlp"
        } else {
            "yt-dlp only"
        }
    );

    Ok(AppState { search_service })
}

pub fn create_cors() -> Result<rocket_cors::Cors> {
    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .allowed_methods(
            vec![Method::Get, Method::Post, Method::Options]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .allowed_headers(AllowedHeaders::some(&["Content-Type"]))
        .allow_credentials(false)
        .send_wildcard(true)
        .to_cors()
        .map_err(|e| anyhow::anyhow!("Failed to create CORS options: {}", e))?;

    Ok(cors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_builds() {
        assert!(create_cors().is_ok());
    }
}
