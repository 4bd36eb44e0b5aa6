pub mod backend;
pub mod errors;
pub mod search_service;
pub mod youtube_api_service;
pub mod ytdlp_service;
