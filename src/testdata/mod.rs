//! In-process stand-in for the Toolhub API, bound to an ephemeral port.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, Query, Request, State},
    http::{header, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::api::ApiClient;
use crate::config::ClientConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    /// Path plus query string.
    pub path: String,
    pub csrf_token: Option<String>,
    pub body: Option<Value>,
}

struct BackendState {
    user: Value,
    urls: Vec<Value>,
    apps: Vec<Value>,
    authorized: Vec<Value>,
    page_size: usize,
    next_id: i64,
    requests: Vec<RecordedRequest>,
    fail_next: Option<(StatusCode, String)>,
}

impl Default for BackendState {
    fn default() -> Self {
        Self {
            user: json!({ "is_authenticated": false, "csrf_token": "" }),
            urls: Vec::new(),
            apps: Vec::new(),
            authorized: Vec::new(),
            page_size: 10,
            next_id: 100,
            requests: Vec::new(),
            fail_next: None,
        }
    }
}

impl BackendState {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

type Shared = Arc<Mutex<BackendState>>;

pub struct MockBackend {
    base_url: String,
    shared: Shared,
    handle: JoinHandle<()>,
}

impl MockBackend {
    pub const CSRF_TOKEN: &'static str = "test-csrf-token";

    pub async fn start() -> Self {
        let shared: Shared = Arc::new(Mutex::new(BackendState::default()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");
        let app = router(shared.clone());
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend stopped");
        });

        Self {
            base_url: format!("http://{addr}/"),
            shared,
            handle,
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.base_url).expect("mock base url")
    }

    pub fn api(&self) -> ApiClient {
        ApiClient::new(&self.client_config()).expect("api client")
    }

    pub async fn set_user(&self, user: Value) {
        self.shared.lock().await.user = user;
    }

    pub async fn sign_in(&self) {
        self.set_user(json!({
            "is_authenticated": true,
            "csrf_token": Self::CSRF_TOKEN,
            "username": "alice"
        }))
        .await;
    }

    pub async fn seed_urls(&self, urls: Vec<Value>) {
        self.shared.lock().await.urls = urls;
    }

    pub async fn seed_apps(&self, apps: Vec<Value>) {
        self.shared.lock().await.apps = apps;
    }

    pub async fn seed_authorized(&self, authorized: Vec<Value>) {
        self.shared.lock().await.authorized = authorized;
    }

    pub async fn set_page_size(&self, page_size: usize) {
        self.shared.lock().await.page_size = page_size.max(1);
    }

    /// Answer the next request with `status` and the raw `body`.
    pub async fn fail_next(&self, status: StatusCode, body: &str) {
        self.shared.lock().await.fail_next = Some((status, body.to_string()));
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.shared.lock().await.requests.clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A client pointed at a port nothing listens on.
pub fn unreachable_api() -> ApiClient {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe");
        listener.local_addr().expect("probe address").port()
    };
    let config = ClientConfig::new(&format!("http://127.0.0.1:{port}/")).expect("config");
    ApiClient::new(&config).expect("api client")
}

fn router(shared: Shared) -> Router {
    Router::new()
        .route("/api/user/", get(get_user))
        .route("/api/crawler/urls/", post(create_url))
        .route("/api/crawler/urls/self/", get(list_urls))
        .route("/api/crawler/urls/:id/", delete(delete_url))
        .route("/api/oauth/applications/", get(list_apps).post(create_app))
        .route(
            "/api/oauth/applications/:client_id/",
            patch(update_app).delete(delete_app),
        )
        .route("/api/oauth/authorized/", get(list_authorized))
        .route("/api/oauth/authorized/:id/", delete(delete_authorized))
        .layer(middleware::from_fn_with_state(shared.clone(), intercept))
        .with_state(shared)
}

/// Records the request, then applies injected failures and the CSRF check.
async fn intercept(State(shared): State<Shared>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    let csrf_token = parts
        .headers
        .get("x-csrftoken")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let injected = {
        let mut state = shared.lock().await;
        state.requests.push(RecordedRequest {
            method: parts.method.to_string(),
            path: parts
                .uri
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| parts.uri.path().to_string()),
            csrf_token: csrf_token.clone(),
            body: serde_json::from_slice(&bytes).ok(),
        });
        state.fail_next.take()
    };

    if let Some((status, body)) = injected {
        return (status, [(header::CONTENT_TYPE, "application/json")], body).into_response();
    }

    let safe = matches!(parts.method, Method::GET | Method::HEAD | Method::OPTIONS);
    if !safe && csrf_token.as_deref() != Some(MockBackend::CSRF_TOKEN) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "detail": "CSRF Failed: CSRF token missing or incorrect." })),
        )
            .into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<usize>,
}

fn paginate(items: &[Value], page: Option<usize>, page_size: usize) -> Value {
    let page = page.unwrap_or(1).max(1);
    let start = (page - 1) * page_size;
    let results: Vec<Value> = items.iter().skip(start).take(page_size).cloned().collect();
    let next = (start + page_size < items.len()).then(|| format!("?page={}", page + 1));
    let previous = (page > 1).then(|| format!("?page={}", page - 1));
    json!({
        "count": items.len(),
        "next": next,
        "previous": previous,
        "results": results,
    })
}

fn validation_error(field: &str, message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "code": 4000,
            "message": "Validation error",
            "errors": [{ "field": field, "message": message }],
        })),
    )
        .into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response()
}

fn text_field<'a>(body: &'a Value, field: &str) -> &'a str {
    body.get(field).and_then(Value::as_str).unwrap_or_default()
}

async fn get_user(State(shared): State<Shared>) -> Response {
    Json(shared.lock().await.user.clone()).into_response()
}

async fn create_url(State(shared): State<Shared>, Json(body): Json<Value>) -> Response {
    let url = text_field(&body, "url");
    if url.trim().is_empty() {
        return validation_error("url", "This field may not be blank.");
    }
    let mut state = shared.lock().await;
    let record = json!({
        "id": state.allocate_id(),
        "url": url,
        "created_date": "2021-03-01T12:00:00Z",
    });
    state.urls.push(record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn list_urls(State(shared): State<Shared>, Query(query): Query<PageQuery>) -> Response {
    let state = shared.lock().await;
    Json(paginate(&state.urls, query.page, state.page_size)).into_response()
}

async fn delete_url(State(shared): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut state = shared.lock().await;
    match state.urls.iter().position(|u| u["id"] == json!(id)) {
        Some(index) => {
            state.urls.remove(index);
            StatusCode::NO_CONTENT.into_response()
        }
        None => not_found(),
    }
}

async fn list_apps(State(shared): State<Shared>, Query(query): Query<PageQuery>) -> Response {
    let state = shared.lock().await;
    Json(paginate(&state.apps, query.page, state.page_size)).into_response()
}

async fn create_app(State(shared): State<Shared>, Json(body): Json<Value>) -> Response {
    let name = text_field(&body, "name");
    if name.trim().is_empty() {
        return validation_error("name", "This field may not be blank.");
    }
    let mut state = shared.lock().await;
    let id = state.allocate_id();
    let record = json!({
        "client_id": format!("client-{id}"),
        "name": name,
        "redirect_url": text_field(&body, "redirect_url"),
        "user": { "id": 1, "username": "alice" },
        "created_date": "2021-03-01T12:00:00Z",
        "modified_date": "2021-03-01T12:00:00Z",
    });
    state.apps.push(record.clone());

    let mut created = record;
    created["client_secret"] = json!(format!("secret-{id}"));
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn update_app(
    State(shared): State<Shared>,
    Path(client_id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = shared.lock().await;
    let Some(app) = state.apps.iter_mut().find(|a| a["client_id"] == json!(client_id)) else {
        return not_found();
    };
    if let Some(redirect_url) = body.get("redirect_url") {
        app["redirect_url"] = redirect_url.clone();
        app["modified_date"] = json!("2021-03-02T08:30:00Z");
    }
    Json(app.clone()).into_response()
}

async fn delete_app(State(shared): State<Shared>, Path(client_id): Path<String>) -> Response {
    let mut state = shared.lock().await;
    match state.apps.iter().position(|a| a["client_id"] == json!(client_id)) {
        Some(index) => {
            state.apps.remove(index);
            StatusCode::NO_CONTENT.into_response()
        }
        None => not_found(),
    }
}

async fn list_authorized(State(shared): State<Shared>, Query(query): Query<PageQuery>) -> Response {
    let state = shared.lock().await;
    Json(paginate(&state.authorized, query.page, state.page_size)).into_response()
}

async fn delete_authorized(State(shared): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut state = shared.lock().await;
    match state.authorized.iter().position(|a| a["id"] == json!(id)) {
        Some(index) => {
            state.authorized.remove(index);
            StatusCode::NO_CONTENT.into_response()
        }
        None => not_found(),
    }
}
