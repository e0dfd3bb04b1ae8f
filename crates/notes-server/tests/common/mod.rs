#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use notes_server::{AppState, RequestLogSink, ServerConfig, routes};
use notes_store::Store;
use sqlx::PgPool;
use tower::ServiceExt;

pub const BOUNDARY: &str = "----notes-test-boundary";

/// Build a config pointing attachments at `upload_dir`.
pub fn test_config(upload_dir: &Path) -> ServerConfig {
    let vars = HashMap::from([
        ("JWT_SECRET".to_string(), "integration-test-secret".to_string()),
        (
            "UPLOAD_DIR".to_string(),
            upload_dir.to_string_lossy().into_owned(),
        ),
    ]);
    ServerConfig::from_lookup(|name| vars.get(name).cloned()).expect("test config")
}

/// Build the application router, as `main` does, on the given pool.
pub fn build_test_app(pool: PgPool, upload_dir: &Path) -> Router {
    let store = Store::from_pool(pool);
    let (sink, _worker) = RequestLogSink::start(store.clone(), 64);
    let state = AppState::new(store, &test_config(upload_dir), sink);
    routes::build_router(state)
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.expect("router is infallible")
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

/// Build a multipart body from text fields and an optional file.
pub fn multipart_request(
    method: &str,
    uri: &str,
    token: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((field, file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; \
                 filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body))
        .expect("request")
}

/// Register a user and return its token.
pub async fn register(app: &Router, email: &str, password: &str) -> String {
    let response = send(
        app,
        json_request(
            "POST",
            "/register",
            None,
            serde_json::json!({"email": email, "password": password}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["token"].as_str().expect("token").to_string()
}

/// Create a note through the API and return its id.
pub async fn create_note(app: &Router, token: &str, title: &str, content: &str) -> String {
    let response = send(
        app,
        json_request(
            "POST",
            "/notes",
            Some(token),
            serde_json::json!({"title": title, "content": content}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["id"].as_str().expect("id").to_string()
}
