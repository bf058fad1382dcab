#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use classroom_collector::config::Config;

pub fn test_config() -> Config {
    Config {
        dashboard_path: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("dashboard/index.html"),
        ..Config::default()
    }
}

pub fn create_test_app() -> Router {
    classroom_collector::create_app(test_config())
}

pub fn create_test_app_with_idle(idle: Duration) -> Router {
    classroom_collector::create_app(Config {
        idle_eviction: idle,
        ..test_config()
    })
}

pub fn metrics(id: &str, name: &str, fatigue: u8) -> Value {
    serde_json::json!({
        "student_id": id,
        "student_name": name,
        "ear": 0.27,
        "eye_status": "OPEN",
        "fatigue": fatigue,
        "yawning_status": "NO",
        "head_status": "NORMAL",
        "status": "ACTIVE",
        "timestamp": 1_700_000_000.0
    })
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn post_update(app: &Router, payload: Value) -> StatusCode {
    send(app, "POST", "/update", Some(payload)).await.status()
}

pub async fn send_raw(app: &Router, uri: &str, body: &'static str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}
