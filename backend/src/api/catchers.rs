use crate::models::ErrorResponse;
use rocket::http::Status;
use rocket::{catch, Request};

#[catch(404)]
pub fn not_found(req: &Request) -> ErrorResponse {
    ErrorResponse::new(
        Status::NotFound,
        "Not found",
        Some(format!("No route for {} {}", req.method(), req.uri())),
    )
}

/// Body guards that fail to decode are reported as bad requests.
#[catch(422)]
pub fn unprocessable_entity(_req: &Request) -> ErrorResponse {
    ErrorResponse::new(
        Status::BadRequest,
        "Invalid request body",
        Some("Expected a JSON object like {\"query\": \"...\", \"limit\": 1}".to_string()),
    )
}

#[catch(default)]
pub fn default_catcher(status: Status, _req: &Request) -> ErrorResponse {
    ErrorResponse::new(status, status.reason().unwrap_or("Request failed"), None)
}
