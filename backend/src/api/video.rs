use crate::models::{ErrorResponse, VideoRecord};
use crate::services::errors::SearchError;
use crate::AppState;
use log::{error, info};
use rocket::serde::json::Json;
use rocket::{get, State};

#[get("/video/<id>")]
pub async fn get_video(
    id: &str,
    state: &State<AppState>,
) -> Result<Json<VideoRecord>, ErrorResponse> {
    match state.search_service.video_details(id).await {
        Ok(video) => {
            info!("Found video {}: {}", video.id, video.title);
            Ok(Json(video))
        }
        Err(e) => {
            match &e {
                SearchError::Backend(_) | SearchError::Unavailable(_) => {
                    error!("Failed to fetch video {id}: {e}")
                }
                _ => info!("Video lookup for {id} rejected: {e}"),
            }
            Err(e.into())
        }
    }
}
