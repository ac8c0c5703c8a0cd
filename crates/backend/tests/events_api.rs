//! End-to-end tests of the API driven in-process, with the identity and
//! calendar providers stood in by mock HTTP servers.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use backend::auth::jwt;
use backend::config::AppConfig;
use backend::{build_router, AppState};
use chrono::Duration;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use shared_types::CalendarEvent;
use tower::ServiceExt;
use wiremock::matchers::{bearer_token, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const JWT_SECRET: &str = "integration-test-secret";
const IDENTITY_KEY: &str = "sk_test_identity";
const USER_ID: &str = "user_123";
const ACCESS_TOKEN: &str = "ya29.user-access-token";

fn test_config(identity_url: &str, calendar_url: &str, expose_details: bool) -> AppConfig {
    AppConfig {
        port: 0,
        expose_error_details: expose_details,
        jwt_secret: JWT_SECRET.to_string(),
        cookie_name: "auth_token".to_string(),
        identity_api_url: identity_url.to_string(),
        identity_secret_key: IDENTITY_KEY.to_string(),
        calendar_api_url: calendar_url.to_string(),
        cors_allowed_origins: None,
        frontend_dir: "frontend/dist".to_string(),
    }
}

fn app(identity: &MockServer, calendar: &MockServer, expose_details: bool) -> Router {
    build_router(AppState::new(test_config(
        &identity.uri(),
        &calendar.uri(),
        expose_details,
    )))
}

fn session_token() -> String {
    jwt::create_token(JWT_SECRET, USER_ID, Duration::days(1)).unwrap()
}

async fn get_events(app: Router, auth_header: Option<String>) -> (StatusCode, Value) {
    let mut request = Request::builder().uri("/api/events");
    if let Some(value) = auth_header {
        request = request.header(header::AUTHORIZATION, value);
    }

    let response = app
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, body)
}

async fn mock_user(identity: &MockServer, accounts: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/users/{USER_ID}")))
        .and(bearer_token(IDENTITY_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": USER_ID,
            "external_accounts": accounts,
        })))
        .mount(identity)
        .await;
}

async fn mock_access_token(identity: &MockServer, data: Value) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/users/{USER_ID}/oauth_access_tokens/oauth_google"
        )))
        .and(bearer_token(IDENTITY_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
        .mount(identity)
        .await;
}

#[tokio::test]
async fn health_reports_ok() {
    let identity = MockServer::start().await;
    let calendar = MockServer::start().await;
    let app = app(&identity, &calendar, true);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn missing_credential_is_rejected_before_any_upstream_call() {
    let identity = MockServer::start().await;
    let calendar = MockServer::start().await;

    let (status, body) = get_events(app(&identity, &calendar, true), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
    assert!(body["message"].as_str().unwrap().contains("logged in"));
    assert!(identity.received_requests().await.unwrap().is_empty());
    assert!(calendar.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_credential_is_rejected_before_any_upstream_call() {
    let identity = MockServer::start().await;
    let calendar = MockServer::start().await;

    let (status, body) = get_events(
        app(&identity, &calendar, true),
        Some("Bearer not-a-valid-token".to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
    assert!(calendar.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn user_without_linked_account_is_not_connected() {
    let identity = MockServer::start().await;
    let calendar = MockServer::start().await;
    mock_user(&identity, json!([{"provider": "oauth_github"}])).await;

    let (status, body) = get_events(
        app(&identity, &calendar, true),
        Some(format!("Bearer {}", session_token())),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Not Connected");
    assert!(calendar.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_token_response_is_no_token() {
    let identity = MockServer::start().await;
    let calendar = MockServer::start().await;
    mock_user(&identity, json!([{"provider": "oauth_google"}])).await;
    mock_access_token(&identity, json!([])).await;

    let (status, body) = get_events(
        app(&identity, &calendar, true),
        Some(format!("Bearer {}", session_token())),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "No Token");
    assert!(calendar.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn events_are_fetched_normalized_and_order_preserved() {
    let identity = MockServer::start().await;
    let calendar = MockServer::start().await;
    mock_user(
        &identity,
        json!([{"provider": "oauth_google"}, {"provider": "oauth_github"}]),
    )
    .await;
    mock_access_token(&identity, json!([{"token": ACCESS_TOKEN}])).await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .and(bearer_token(ACCESS_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"id": "e1", "summary": "Meet", "description": "d", "location": "l",
                 "start": {"dateTime": "2025-06-01T10:00:00Z"}},
                {"id": "e2",
                 "start": {"date": "2025-06-02"}},
                {"summary": "No id"},
            ]
        })))
        .mount(&calendar)
        .await;

    let (status, body) = get_events(
        app(&identity, &calendar, true),
        Some(format!("Bearer {}", session_token())),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let events: Vec<CalendarEvent> = serde_json::from_value(body).unwrap();
    assert_eq!(
        events,
        vec![
            CalendarEvent {
                id: "e1".to_string(),
                name: "Meet".to_string(),
                date: "2025-06-01T10:00:00Z".to_string(),
                description: "d".to_string(),
                location: "l".to_string(),
            },
            CalendarEvent {
                id: "e2".to_string(),
                name: "Untitled Event".to_string(),
                date: "2025-06-02".to_string(),
                description: String::new(),
                location: String::new(),
            },
            CalendarEvent {
                id: String::new(),
                name: "No id".to_string(),
                date: String::new(),
                description: String::new(),
                location: String::new(),
            },
        ]
    );

    // The upstream listing is requested with the fixed window parameters.
    let requests = calendar.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let query = requests[0].url.query().unwrap();
    assert!(query.contains("maxResults=50"));
    assert!(query.contains("singleEvents=true"));
    assert!(query.contains("orderBy=startTime"));
    assert!(query.contains("timeMin="));
    assert!(query.contains("timeMax="));
}

#[tokio::test]
async fn empty_upstream_listing_yields_empty_array() {
    let identity = MockServer::start().await;
    let calendar = MockServer::start().await;
    mock_user(&identity, json!([{"provider": "oauth_google"}])).await;
    mock_access_token(&identity, json!([{"token": ACCESS_TOKEN}])).await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&calendar)
        .await;

    let (status, body) = get_events(
        app(&identity, &calendar, true),
        Some(format!("Bearer {}", session_token())),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn cookie_credential_is_accepted() {
    let identity = MockServer::start().await;
    let calendar = MockServer::start().await;
    mock_user(&identity, json!([{"provider": "oauth_google"}])).await;
    mock_access_token(&identity, json!([{"token": ACCESS_TOKEN}])).await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&calendar)
        .await;

    let request = Request::builder()
        .uri("/api/events")
        .header(header::COOKIE, format!("auth_token={}", session_token()))
        .body(Body::empty())
        .unwrap();

    let response = app(&identity, &calendar, true).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn identity_failure_maps_to_fetch_error() {
    let identity = MockServer::start().await;
    let calendar = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/users/{USER_ID}")))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({"message": "service unavailable"})),
        )
        .mount(&identity)
        .await;

    let (status, body) = get_events(
        app(&identity, &calendar, true),
        Some(format!("Bearer {}", session_token())),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch calendar events");
    assert_eq!(body["message"], "service unavailable");
}

#[tokio::test]
async fn upstream_error_details_are_exposed_outside_production() {
    let identity = MockServer::start().await;
    let calendar = MockServer::start().await;
    mock_user(&identity, json!([{"provider": "oauth_google"}])).await;
    mock_access_token(&identity, json!([{"token": ACCESS_TOKEN}])).await;

    let payload = json!({"error": {"code": 500, "message": "Backend Error"}});
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(500).set_body_json(payload.clone()))
        .mount(&calendar)
        .await;

    let (status, body) = get_events(
        app(&identity, &calendar, true),
        Some(format!("Bearer {}", session_token())),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch calendar events");
    assert_eq!(body["message"], "Backend Error");
    assert_eq!(body["details"], payload);
}

#[tokio::test]
async fn upstream_error_details_are_suppressed_in_production() {
    let identity = MockServer::start().await;
    let calendar = MockServer::start().await;
    mock_user(&identity, json!([{"provider": "oauth_google"}])).await;
    mock_access_token(&identity, json!([{"token": ACCESS_TOKEN}])).await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"error": {"code": 500, "message": "Backend Error"}})),
        )
        .mount(&calendar)
        .await;

    let (status, body) = get_events(
        app(&identity, &calendar, false),
        Some(format!("Bearer {}", session_token())),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch calendar events");
    assert_eq!(body["message"], "Backend Error");
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn malformed_upstream_body_maps_to_fetch_error() {
    let identity = MockServer::start().await;
    let calendar = MockServer::start().await;
    mock_user(&identity, json!([{"provider": "oauth_google"}])).await;
    mock_access_token(&identity, json!([{"token": ACCESS_TOKEN}])).await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&calendar)
        .await;

    let (status, body) = get_events(
        app(&identity, &calendar, true),
        Some(format!("Bearer {}", session_token())),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch calendar events");
}
