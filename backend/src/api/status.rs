use crate::models::{AvailabilityStatus, HealthResponse};
use crate::AppState;
use log::info;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, options, State};

/// Liveness only. Backends are not touched.
#[get("/health")]
pub fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[get("/availability")]
pub async fn availability(state: &State<AppState>) -> Json<AvailabilityStatus> {
    let status = state.search_service.availability().await;
    info!(
        "Availability: available={}; source={:?};",
        status.available, status.source
    );
    Json(status)
}

#[options("/<_..>")]
pub fn preflight() -> Status {
    Status::Ok
}

#[cfg(test)]
mod tests {
    use crate::api::test_client;
    use crate::models::Source;
    use crate::services::backend::BackendOutcome;
    use crate::services::search_service::testing::{service, FakeBackend};
    use rocket::http::Status;
    use serde_json::Value;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    #[rocket::async_test]
    async fn test_health_does_not_probe() {
        let tool = Arc::new(FakeBackend::new(Source::ExternalTool, BackendOutcome::Empty));
        let client = test_client(service(None, tool.clone())).await;

        let response = client.get("/api/health").dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["status"], "ok");
        let timestamp = body["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
        assert_eq!(tool.probes.load(Ordering::SeqCst), 0);
    }

    #[rocket::async_test]
    async fn test_availability_reports_source() {
        let api = Arc::new(FakeBackend::new(Source::Api, BackendOutcome::Empty).unavailable());
        let tool = Arc::new(FakeBackend::new(Source::ExternalTool, BackendOutcome::Empty));
        let client = test_client(service(Some(api.clone()), tool.clone())).await;

        let response = client.get("/api/availability").dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["available"], true);
        assert_eq!(body["source"], "external-tool");

        // recomputed on every call
        client.get("/api/availability").dispatch().await;
        assert_eq!(api.probes.load(Ordering::SeqCst), 2);
        assert_eq!(tool.probes.load(Ordering::SeqCst), 2);
        assert_eq!(tool.calls(), 0);
    }

    #[rocket::async_test]
    async fn test_options_short_circuits() {
        let tool = Arc::new(FakeBackend::new(Source::ExternalTool, BackendOutcome::Empty));
        let client = test_client(service(None, tool.clone())).await;

        let response = client.options("/api/search").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert!(response.into_string().await.unwrap_or_default().is_empty());
        assert_eq!(tool.calls(), 0);
    }
}
