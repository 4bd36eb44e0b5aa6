pub mod catchers;
pub mod search;
pub mod status;
pub mod video;

pub use catchers::*;
pub use search::*;
pub use status::*;
pub use video::*;

#[cfg(test)]
pub(crate) async fn test_client(
    search_service: crate::services::search_service::VideoSearchService,
) -> rocket::local::asynchronous::Client {
    let cors = crate::config::create_cors().expect("valid CORS options");
    let rocket = crate::build_rocket(crate::AppState { search_service }, cors);
    rocket::local::asynchronous::Client::tracked(rocket)
        .await
        .expect("valid rocket instance")
}
