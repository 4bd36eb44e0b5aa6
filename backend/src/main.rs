#[macro_use]
extern crate rocket;

mod api;
mod config;
mod models;
mod services;
mod utils;

use rocket::{Build, Rocket};
use services::search_service::VideoSearchService;

pub struct AppState {
    pub search_service: VideoSearchService,
}

pub fn build_rocket(state: AppState, cors: rocket_cors::Cors) -> Rocket<Build> {
    let figment = rocket::Config::figment().merge(("port", *config::PORT));

    rocket::custom(figment)
        .manage(state)
        .attach(cors)
        .mount(
            "/api",
            routes![
                api::health,
                api::availability,
                api::preflight,
                api::search_videos_get,
                api::search_videos_post,
                api::get_video,
            ],
        )
        .register(
            "/",
            catchers![
                api::not_found,
                api::unprocessable_entity,
                api::default_catcher
            ],
        )
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    config::load_environment();
    config::init_logger();

    let state = config::create_app_state()?;
    let cors = config::create_cors()?;

    build_rocket(state, cors)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Rocket failed to launch: {e}"))?;

    Ok(())
}
