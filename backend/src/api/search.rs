use crate::models::{ErrorResponse, SearchRequest, SearchResponse};
use crate::services::errors::SearchError;
use crate::services::search_service::INVALID_QUERY;
use crate::utils::{limit_from_json, limit_from_str};
use crate::AppState;
use log::{error, info};
use rocket::serde::json::{self, Json};
use rocket::{get, post, State};
use serde_json::Value;

#[get("/search?<query>&<limit>")]
pub async fn search_videos_get(
    query: Option<String>,
    limit: Option<String>,
    state: &State<AppState>,
) -> Result<Json<SearchResponse>, ErrorResponse> {
    let limit = limit_from_str(limit.as_deref());
    run_search(state, query.as_deref().unwrap_or_default(), limit).await
}

#[post("/search", data = "<request>")]
pub async fn search_videos_post(
    request: Result<Json<SearchRequest>, json::Error<'_>>,
    state: &State<AppState>,
) -> Result<Json<SearchResponse>, ErrorResponse> {
    // bodies that are not a JSON object carry no query
    let request = match request {
        Ok(request) => request.into_inner(),
        Err(e) => {
            info!("Rejected unreadable search body: {e}");
            return Err(SearchError::Validation(INVALID_QUERY.to_string()).into());
        }
    };
    let limit = limit_from_json(request.limit.as_ref());

    match request.query {
        Some(Value::String(query)) => run_search(state, &query, limit).await,
        _ => {
            info!("Rejected search request without a string query");
            Err(SearchError::Validation(INVALID_QUERY.to_string()).into())
        }
    }
}

async fn run_search(
    state: &AppState,
    query: &str,
    limit: usize,
) -> Result<Json<SearchResponse>, ErrorResponse> {
    match state.search_service.search(query, limit).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            match &e {
                SearchError::Backend(_) | SearchError::Unavailable(_) => {
                    error!("Search error: {e}")
                }
                _ => info!("Search rejected: {e}"),
            }
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::api::test_client;
    use crate::models::{Source, VideoRecord};
    use crate::services::backend::BackendOutcome;
    use crate::services::errors::BackendError;
    use crate::services::search_service::testing::{service, videos, FakeBackend};
    use rocket::http::{ContentType, Header, Status};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn backend(source: Source, outcome: BackendOutcome) -> Arc<FakeBackend> {
        Arc::new(FakeBackend::new(source, outcome))
    }

    #[rocket::async_test]
    async fn test_lofi_end_to_end() {
        let api = backend(
            Source::Api,
            BackendOutcome::Found(vec![VideoRecord::new("abc123", "Lofi Hip Hop Radio")]),
        );
        let tool = backend(Source::ExternalTool, BackendOutcome::Found(videos(1)));
        let client = test_client(service(Some(api), tool.clone())).await;

        let response = client
            .post("/api/search")
            .header(ContentType::JSON)
            .body(r#"{"query": "lofi beats", "limit": 1}"#)
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(
            body,
            json!({
                "success": true,
                "videos": [{
                    "id": "abc123",
                    "title": "Lofi Hip Hop Radio",
                    "url": "https://www.youtube.com/watch?v=abc123"
                }],
                "count": 1,
                "source": "api"
            })
        );
        assert_eq!(tool.calls(), 0);
    }

    #[rocket::async_test]
    async fn test_get_search_uses_external_tool() {
        let tool = backend(Source::ExternalTool, BackendOutcome::Found(videos(3)));
        let client = test_client(service(None, tool)).await;

        let response = client
            .get("/api/search?query=rust%20async&limit=3")
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["source"], "external-tool");
        assert_eq!(body["count"], 3);
    }

    #[rocket::async_test]
    async fn test_blank_queries_are_bad_requests() {
        let api = backend(Source::Api, BackendOutcome::Found(videos(1)));
        let tool = backend(Source::ExternalTool, BackendOutcome::Found(videos(1)));
        let client = test_client(service(Some(api.clone()), tool.clone())).await;

        for uri in ["/api/search", "/api/search?query=", "/api/search?query=%20%20&limit=4"] {
            let response = client.get(uri).dispatch().await;
            assert_eq!(response.status(), Status::BadRequest, "GET {uri}");
        }

        for body in [r#"{}"#, r#"{"query": "   "}"#, r#"{"query": 42}"#, r#"{"query": null}"#] {
            let response = client
                .post("/api/search")
                .header(ContentType::JSON)
                .body(body)
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::BadRequest, "POST {body}");
            let body: Value = response.into_json().await.unwrap();
            assert_eq!(
                body["error"],
                "Query is required and must be a non-empty string"
            );
        }

        assert_eq!(api.calls(), 0);
        assert_eq!(tool.calls(), 0);
    }

    #[rocket::async_test]
    async fn test_malformed_body() {
        let tool = backend(Source::ExternalTool, BackendOutcome::Found(videos(1)));
        let client = test_client(service(None, tool.clone())).await;

        let response = client
            .post("/api/search")
            .header(ContentType::JSON)
            .body("{not json")
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
        assert_eq!(response.content_type(), Some(ContentType::JSON));
        assert_eq!(tool.calls(), 0);
    }

    #[rocket::async_test]
    async fn test_non_object_body_is_bad_request() {
        let tool = backend(Source::ExternalTool, BackendOutcome::Found(videos(1)));
        let client = test_client(service(None, tool.clone())).await;

        for body in [r#""lofi""#, "[]", "7"] {
            let response = client
                .post("/api/search")
                .header(ContentType::JSON)
                .body(body)
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::BadRequest, "POST {body}");
            let body: Value = response.into_json().await.unwrap();
            assert_eq!(
                body["error"],
                "Query is required and must be a non-empty string"
            );
        }
        assert_eq!(tool.calls(), 0);
    }

    #[rocket::async_test]
    async fn test_limit_is_clamped() {
        let api = backend(Source::Api, BackendOutcome::Found(videos(25)));
        let tool = backend(Source::ExternalTool, BackendOutcome::Empty);
        let client = test_client(service(Some(api), tool)).await;

        let cases = [
            ("/api/search?query=lofi&limit=50", 10),
            ("/api/search?query=lofi&limit=abc", 1),
            ("/api/search?query=lofi", 1),
            ("/api/search?query=lofi&limit=6", 6),
        ];
        for (uri, expected) in cases {
            let response = client.get(uri).dispatch().await;
            let body: Value = response.into_json().await.unwrap();
            assert_eq!(body["count"], expected, "GET {uri}");
        }

        let response = client
            .post("/api/search")
            .header(ContentType::JSON)
            .body(r#"{"query": "lofi", "limit": "7"}"#)
            .dispatch()
            .await;
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["count"], 7);
    }

    #[rocket::async_test]
    async fn test_no_backend_is_service_unavailable() {
        let tool = Arc::new(
            FakeBackend::new(Source::ExternalTool, BackendOutcome::Found(videos(1))).unavailable(),
        );
        let client = test_client(service(None, tool)).await;

        let response = client.get("/api/search?query=lofi").dispatch().await;
        assert_eq!(response.status(), Status::ServiceUnavailable);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error"], "No video service available");
    }

    #[rocket::async_test]
    async fn test_no_results_is_not_found() {
        let api = backend(Source::Api, BackendOutcome::Empty);
        let tool = backend(Source::ExternalTool, BackendOutcome::Empty);
        let client = test_client(service(Some(api), tool)).await;

        let response = client.get("/api/search?query=zzzz").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error"], "No videos found");
    }

    #[rocket::async_test]
    async fn test_tool_failure_is_internal_error() {
        let tool = backend(
            Source::ExternalTool,
            BackendOutcome::Failed(BackendError::Execution("ERROR: boom".to_string())),
        );
        let client = test_client(service(None, tool)).await;

        let response = client.get("/api/search?query=lofi&limit=2").dispatch().await;
        assert_eq!(response.status(), Status::InternalServerError);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error"], "Failed to search videos");
        assert_eq!(body["message"], "Execution error: ERROR: boom");
    }

    #[rocket::async_test]
    async fn test_cors_allows_any_origin() {
        let tool = backend(Source::ExternalTool, BackendOutcome::Found(videos(1)));
        let client = test_client(service(None, tool)).await;

        let response = client
            .get("/api/search?query=lofi")
            .header(Header::new("Origin", "https://finder.example.com"))
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);
        assert_eq!(
            response.headers().get_one("Access-Control-Allow-Origin"),
            Some("*")
        );
    }
}
