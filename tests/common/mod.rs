use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path as UrlPath, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::{json, Value};
use strava_dash::config::Config;
use strava_dash::credentials::{self, Credentials};

pub const FRESH_ACCESS: &str = "fresh-access";
pub const FRESH_REFRESH: &str = "fresh-refresh";

/// In-process stand-in for the Strava API.
pub struct MockStrava {
    pub token_status: StatusCode,
    pub activities_status: StatusCode,
    pub activities: Vec<Value>,
    pub details: HashMap<u64, Value>,
    pub token_hits: AtomicUsize,
    pub activity_list_hits: AtomicUsize,
    pub seen_tokens: Mutex<Vec<String>>,
    pub token_forms: Mutex<Vec<HashMap<String, String>>>,
    pub list_queries: Mutex<Vec<HashMap<String, String>>>,
    /// Held before the activity list answers.
    pub list_delay: Option<Duration>,
}

impl MockStrava {
    pub fn new(activities: Vec<Value>, details: Vec<Value>) -> Self {
        Self {
            token_status: StatusCode::OK,
            activities_status: StatusCode::OK,
            activities,
            details: details
                .into_iter()
                .filter_map(|d| Some((d.get("id")?.as_u64()?, d)))
                .collect(),
            token_hits: AtomicUsize::new(0),
            activity_list_hits: AtomicUsize::new(0),
            seen_tokens: Mutex::new(Vec::new()),
            token_forms: Mutex::new(Vec::new()),
            list_queries: Mutex::new(Vec::new()),
            list_delay: None,
        }
    }

    pub fn token_hits(&self) -> usize {
        self.token_hits.load(Ordering::SeqCst)
    }

    pub fn activity_list_hits(&self) -> usize {
        self.activity_list_hits.load(Ordering::SeqCst)
    }

    pub fn seen_tokens(&self) -> Vec<String> {
        self.seen_tokens.lock().expect("lock").clone()
    }

    pub fn token_forms(&self) -> Vec<HashMap<String, String>> {
        self.token_forms.lock().expect("lock").clone()
    }

    pub fn list_queries(&self) -> Vec<HashMap<String, String>> {
        self.list_queries.lock().expect("lock").clone()
    }

    fn record_token(&self, headers: &HeaderMap) {
        let token = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .unwrap_or_default()
            .to_string();
        self.seen_tokens.lock().expect("lock").push(token);
    }
}

pub async fn spawn(mock: Arc<MockStrava>) -> SocketAddr {
    let app = Router::new()
        .route("/oauth/token", post(token))
        .route("/api/v3/athlete/activities", get(list_activities))
        .route("/api/v3/activities/:id", get(get_activity))
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock");
    let addr = listener.local_addr().expect("mock addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock server");
    });
    addr
}

async fn token(
    State(mock): State<Arc<MockStrava>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    mock.token_hits.fetch_add(1, Ordering::SeqCst);
    mock.token_forms.lock().expect("lock").push(form);

    if !mock.token_status.is_success() {
        return (mock.token_status, r#"{"message":"Bad Request"}"#).into_response();
    }

    Json(json!({
        "token_type": "Bearer",
        "access_token": FRESH_ACCESS,
        "refresh_token": FRESH_REFRESH,
        "expires_at": 4_102_444_800i64,
        "expires_in": 21600
    }))
    .into_response()
}

async fn list_activities(
    State(mock): State<Arc<MockStrava>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    mock.activity_list_hits.fetch_add(1, Ordering::SeqCst);
    mock.record_token(&headers);
    mock.list_queries.lock().expect("lock").push(params.clone());

    if let Some(delay) = mock.list_delay {
        tokio::time::sleep(delay).await;
    }

    if !mock.activities_status.is_success() {
        return (mock.activities_status, "upstream exploded").into_response();
    }

    let per_page: usize = params
        .get("per_page")
        .and_then(|v| v.parse().ok())
        .unwrap_or(30);
    let page: usize = params.get("page").and_then(|v| v.parse().ok()).unwrap_or(1);
    let start = (page - 1) * per_page;

    let slice: Vec<Value> = mock
        .activities
        .iter()
        .skip(start)
        .take(per_page)
        .cloned()
        .collect();
    Json(Value::Array(slice)).into_response()
}

async fn get_activity(
    State(mock): State<Arc<MockStrava>>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<u64>,
) -> Response {
    mock.record_token(&headers);
    match mock.details.get(&id) {
        Some(detail) => Json(detail.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, r#"{"message":"Record Not Found"}"#).into_response(),
    }
}

pub fn config_for(addr: SocketAddr, credentials_path: &Path) -> Config {
    Config {
        credentials_path: credentials_path.to_path_buf(),
        api_base: format!("http://{}/api/v3", addr),
        token_url: format!("http://{}/oauth/token", addr),
        activities_after: Some(1_767_225_600),
        ..Config::default()
    }
}

pub async fn write_credentials(path: &Path, access_token: &str, expires_at: i64) {
    credentials::save(
        path,
        &Credentials {
            client_id: "12345".to_string(),
            client_secret: "secret".to_string(),
            refresh_token: "stale-refresh".to_string(),
            access_token: access_token.to_string(),
            expires_at,
        },
    )
    .await
    .expect("write credentials");
}

pub fn run(id: u64, distance: f64, moving_time: u64, average_speed: f64) -> Value {
    json!({
        "id": id,
        "type": "Run",
        "name": format!("Run {}", id),
        "distance": distance,
        "moving_time": moving_time,
        "elapsed_time": moving_time + 60,
        "average_speed": average_speed,
        "total_elevation_gain": 25.0,
        "start_date": "2026-03-01T07:00:00Z"
    })
}

pub fn ride(id: u64, distance: f64) -> Value {
    json!({
        "id": id,
        "type": "Ride",
        "name": "Commute",
        "distance": distance,
        "moving_time": 3600,
        "elapsed_time": 3700,
        "average_speed": 6.0,
        "total_elevation_gain": 120.0
    })
}
