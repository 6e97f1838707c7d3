use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use pentopublic_admin::{
    auth::Session,
    config::AdminConfig,
    controller::{CatalogController, DashboardController},
    catalog::CatalogFilter,
    models::NotificationKind,
    services::{AdminError, AdminService, Endpoint, HttpAdminService},
};

#[derive(Clone, Default)]
struct MockApi {
    decisions: Arc<Mutex<Vec<(i64, &'static str)>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "Bearer admin-token")
}

async fn dashboard(headers: HeaderMap) -> impl IntoResponse {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "no token"})));
    }
    (
        StatusCode::OK,
        Json(json!({
            "books": {"total": 10, "approved": 6, "pending": 3, "rejected": 1},
            "users": {"authors": 2, "readers": 5, "subscribedReaders": 1}
        })),
    )
}

async fn pending() -> Json<Value> {
    Json(json!([
        {"id": 1, "title": "One", "author": "A", "submittedDate": "2024-06-01T09:30:00"},
        {"id": 2, "title": "Two", "author": "B", "category": "Poetry"},
        {"id": 3, "title": "Three", "author": "C"}
    ]))
}

async fn readers() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn authors() -> Json<Value> {
    Json(Value::Null)
}

async fn books_summary() -> Json<Value> {
    Json(json!([{"id": 7, "title": "Seven", "isActive": true}]))
}

async fn approve(State(api): State<MockApi>, Path(id): Path<i64>) -> impl IntoResponse {
    if id > 3 {
        return StatusCode::NOT_FOUND.into_response();
    }
    api.decisions.lock().unwrap().push((id, "approve"));
    if id % 2 == 0 {
        (StatusCode::OK, "Book approved successfully").into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

async fn reject(State(api): State<MockApi>, Path(id): Path<i64>) -> impl IntoResponse {
    if id > 3 {
        return (StatusCode::NOT_FOUND, "book not pending").into_response();
    }
    api.decisions.lock().unwrap().push((id, "reject"));
    Json(json!({"status": "rejected"})).into_response()
}

async fn login(Json(body): Json<Value>) -> impl IntoResponse {
    if body["userName"] == "admin" && body["password"] == "secret" {
        Json(json!({"token": "admin-token", "role": "admin"})).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response()
    }
}

async fn books_with_files() -> Json<Value> {
    Json(json!([
        {"id": 1, "title": "Paid", "price": 5.0, "uploadDate": "2024-01-01"},
        {"id": 2, "title": "Gratis", "isFree": true, "createdAt": "2024-05-01T00:00:00Z",
         "author": {"name": "Ilse"}, "bookFiles": [{"audioPath": "/a.mp3"}]}
    ]))
}

async fn top_books() -> Json<Value> {
    Json(json!([{"id": 2, "title": "Gratis"}]))
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!([]))
}

async fn spawn_api(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/api")
}

fn mock_router(api: MockApi) -> Router {
    Router::new()
        .route("/api/admin/dashboard", get(dashboard))
        .route("/api/admin/pending-books", get(pending))
        .route("/api/admin/readers", get(readers))
        .route("/api/admin/authors", get(authors))
        .route("/api/admin/books-summary", get(books_summary))
        .route("/api/admin/books/:id/approve", post(approve))
        .route("/api/admin/books/:id/reject", post(reject))
        .route("/api/auth/login", post(login))
        .route("/api/books/with-files", get(books_with_files))
        .route("/api/books/top", get(top_books))
        .with_state(api)
}

fn config(base: &str) -> AdminConfig {
    AdminConfig {
        api_base: base.to_string(),
        token: Some("admin-token".into()),
        request_timeout: Duration::from_secs(2),
        ..AdminConfig::default()
    }
}

#[tokio::test]
async fn dashboard_over_http_tolerates_failing_endpoint() {
    let api = MockApi::default();
    let base = spawn_api(mock_router(api.clone())).await;
    let cfg = config(&base);
    let service = HttpAdminService::from_config(&cfg).unwrap();
    let dashboard = DashboardController::new(service, &cfg);

    let outcome = dashboard.load_all().await;
    let error = outcome.error.expect("readers endpoint fails");
    assert_eq!(error.failed, vec![Endpoint::Readers]);

    let state = dashboard.snapshot();
    assert_eq!(state.pending.len(), 3);
    assert!(state.pending[0].submitted_date.is_some());
    assert_eq!(state.pending[1].category.as_deref(), Some("Poetry"));
    assert!(state.authors.is_empty());
    assert_eq!(state.books_summary.len(), 1);
    assert_eq!(
        state.summary.unwrap().users.unwrap().subscribed_readers,
        Some(1)
    );

    dashboard.approve(2).await.unwrap();
    dashboard.reject(3).await.unwrap();
    assert!(dashboard.reject(42).await.is_err());
    let note = dashboard.notification().unwrap();
    assert_eq!(note.kind, NotificationKind::Error);
    assert!(note.text.contains("HTTP 404"));

    let state = dashboard.snapshot();
    let ids: Vec<_> = state.pending.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![1]);
    let books = state.summary.unwrap().books.unwrap();
    assert_eq!((books.approved, books.pending, books.rejected), (Some(7), Some(1), Some(2)));
    assert_eq!(
        *api.decisions.lock().unwrap(),
        vec![(2, "approve"), (3, "reject")]
    );
}

#[tokio::test]
async fn plain_text_and_empty_success_bodies_count_as_approval() {
    let base = spawn_api(mock_router(MockApi::default())).await;
    let cfg = config(&base);
    let service = HttpAdminService::from_config(&cfg).unwrap();
    let dashboard = DashboardController::new(service, &cfg);
    dashboard.load_all().await;

    dashboard.approve(2).await.unwrap();
    let state = dashboard.snapshot();
    assert_eq!(state.pending.len(), 2);
    assert!(state.pending.iter().all(|s| s.id != 2));
    let books = state.summary.unwrap().books.unwrap();
    assert_eq!(books.approved, Some(7));
    assert_eq!(books.pending, Some(2));
    let note = dashboard.notification().unwrap();
    assert_eq!(note.kind, NotificationKind::Success);
    assert_eq!(note.text, "Book approved successfully");

    dashboard.approve(1).await.unwrap();
    let books = dashboard.snapshot().summary.unwrap().books.unwrap();
    assert_eq!(books.approved, Some(8));
    assert_eq!(books.pending, Some(1));
}

#[tokio::test]
async fn missing_token_is_a_status_error() {
    let base = spawn_api(mock_router(MockApi::default())).await;
    let service = HttpAdminService::new(&base, None, Duration::from_secs(2)).unwrap();
    match service.get_dashboard_summary().await {
        Err(AdminError::Status { status, .. }) => assert_eq!(status, 401),
        other => panic!("expected 401, got {other:?}"),
    }
}

#[tokio::test]
async fn login_yields_admin_session() {
    let base = spawn_api(mock_router(MockApi::default())).await;
    let service = HttpAdminService::new(&base, None, Duration::from_secs(2)).unwrap();

    let resp = service.login("admin", "secret").await.unwrap();
    let session = Session::from_login("admin", resp).unwrap();
    assert!(session.require_admin().is_ok());
    assert_eq!(session.token, "admin-token");

    assert!(matches!(
        service.login("admin", "wrong").await,
        Err(AdminError::Status { status: 401, .. })
    ));
}

#[tokio::test]
async fn catalog_over_http() {
    let base = spawn_api(mock_router(MockApi::default())).await;
    let service = HttpAdminService::from_config(&config(&base)).unwrap();
    let mut catalog = CatalogController::new(service);

    catalog.set_filter(CatalogFilter::Recent).await.unwrap();
    let ids: Vec<_> = catalog.visible().iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![2, 1]);

    catalog.set_search("ilse");
    assert_eq!(catalog.visible().len(), 1);

    catalog.set_filter(CatalogFilter::Audio).await.unwrap();
    assert_eq!(catalog.visible().len(), 1);

    catalog.set_filter(CatalogFilter::Top).await.unwrap();
    assert_eq!(catalog.visible()[0].title, "Gratis");
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let router = Router::new().route("/api/admin/readers", get(slow));
    let base = spawn_api(router).await;
    let service = HttpAdminService::new(&base, None, Duration::from_millis(200)).unwrap();
    assert!(matches!(service.get_readers().await, Err(AdminError::Timeout)));
}

#[tokio::test]
async fn unreachable_api_fails_every_endpoint() {
    let cfg = config("http://127.0.0.1:9");
    let service = HttpAdminService::from_config(&cfg).unwrap();
    let dashboard = DashboardController::new(service, &cfg);
    let outcome = dashboard.load_all().await;
    assert!(outcome.failed_entirely);
    assert_eq!(outcome.error.unwrap().count(), 5);
}
