//! Middleware recording every request and its response in the request log.
//!
//! Both bodies are buffered so they can be recorded and then handed on
//! unchanged. The finished record goes to the [`RequestLogSink`] without
//! waiting for it to be stored.
//!
//! [`RequestLogSink`]: crate::request_log::RequestLogSink

use axum::{
    Json,
    body::{Body, to_bytes},
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use notes_store::NewRequestLog;

use crate::error::{ErrorDetails, ErrorResponse};
use crate::state::AppState;

/// Replacement for the `Authorization` header value.
pub const MASKED_VALUE: &str = "***MASKED***";

/// JSON fields whose values never reach the log: credentials going in,
/// session tokens coming out.
pub const SENSITIVE_FIELDS: &[&str] = &["password", "token"];

/// Largest request body the middleware will buffer.
pub const MAX_CAPTURED_BODY_BYTES: usize = 8 * 1024 * 1024;

/// How a body is rendered into the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Text,
    Multipart,
    Binary,
}

impl BodyKind {
    /// Classify a body by its `Content-Type`. A missing type counts as text.
    pub fn of(headers: &HeaderMap) -> Self {
        let Some(content_type) = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase())
        else {
            return Self::Text;
        };

        if content_type.starts_with("multipart/") {
            Self::Multipart
        } else if content_type.starts_with("text/")
            || content_type.contains("json")
            || content_type.contains("xml")
            || content_type.contains("x-www-form-urlencoded")
        {
            Self::Text
        } else {
            Self::Binary
        }
    }
}

/// Render a body for the log.
///
/// JSON bodies are re-serialized with [`SENSITIVE_FIELDS`] masked at any depth.
pub fn describe_body(kind: BodyKind, bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }
    match kind {
        BodyKind::Text => match serde_json::from_slice::<serde_json::Value>(bytes) {
            Ok(mut value) => {
                redact_json(&mut value);
                value.to_string()
            }
            Err(_) => String::from_utf8_lossy(bytes).into_owned(),
        },
        BodyKind::Multipart => format!("[multipart body: {} bytes]", bytes.len()),
        BodyKind::Binary => format!("[binary body: {} bytes]", bytes.len()),
    }
}

/// Mask the values of [`SENSITIVE_FIELDS`] in place.
pub fn redact_json(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if SENSITIVE_FIELDS.iter().any(|s| key.eq_ignore_ascii_case(s)) {
                    *field = serde_json::Value::String(MASKED_VALUE.to_string());
                } else {
                    redact_json(field);
                }
            }
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(redact_json),
        _ => {}
    }
}

/// Header map as a JSON object, with the authorization value masked.
///
/// Repeated headers are joined with `", "`.
pub fn redact_headers(headers: &HeaderMap) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for name in headers.keys() {
        let value = if name == header::AUTHORIZATION {
            MASKED_VALUE.to_string()
        } else {
            headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(", ")
        };
        map.insert(name.as_str().to_string(), serde_json::Value::String(value));
    }
    serde_json::Value::Object(map)
}

/// Record the request/response pair and pass the response through.
pub async fn capture_request_log(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let started = Utc::now();
    let method = request.method().to_string();
    let endpoint = request.uri().path().to_string();
    let headers = redact_headers(request.headers());
    let request_kind = BodyKind::of(request.headers());

    let (parts, body) = request.into_parts();
    let (response, request_body) = match to_bytes(body, MAX_CAPTURED_BODY_BYTES).await {
        Ok(bytes) => {
            let described = describe_body(request_kind, &bytes);
            let response = next.run(Request::from_parts(parts, Body::from(bytes))).await;
            (response, described)
        }
        Err(e) => {
            tracing::debug!(endpoint = %endpoint, error = %e, "Request body could not be buffered");
            (payload_too_large(), String::new())
        }
    };

    let status = response.status();
    let response_kind = BodyKind::of(response.headers());
    let (parts, body) = response.into_parts();
    let (response, response_body) = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => {
            let described = describe_body(response_kind, &bytes);
            (Response::from_parts(parts, Body::from(bytes)), described)
        }
        Err(e) => {
            tracing::warn!(endpoint = %endpoint, error = %e, "Response body could not be buffered");
            (StatusCode::INTERNAL_SERVER_ERROR.into_response(), String::new())
        }
    };

    state.request_log().record(NewRequestLog {
        datetime: started,
        method,
        endpoint,
        headers,
        request_body,
        response_body,
        status_code: i32::from(status.as_u16()),
    });

    response
}

fn payload_too_large() -> Response {
    let body = ErrorResponse {
        error: ErrorDetails {
            code: "PAYLOAD_TOO_LARGE".to_string(),
            message: format!("Request body exceeds {} bytes", MAX_CAPTURED_BODY_BYTES),
        },
    };
    (StatusCode::PAYLOAD_TOO_LARGE, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn authorization_is_masked() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer secret.jwt"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let json = redact_headers(&headers);
        assert_eq!(json["authorization"], MASKED_VALUE);
        assert_eq!(json["content-type"], "application/json");
        assert!(!json.to_string().contains("secret.jwt"));
    }

    #[test]
    fn repeated_headers_are_joined() {
        let mut headers = HeaderMap::new();
        headers.append(header::ACCEPT, HeaderValue::from_static("text/html"));
        headers.append(header::ACCEPT, HeaderValue::from_static("application/json"));

        let json = redact_headers(&headers);
        assert_eq!(json["accept"], "text/html, application/json");
    }

    #[test]
    fn body_kinds() {
        let kind = |ct: &str| {
            let mut headers = HeaderMap::new();
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_str(ct).unwrap());
            BodyKind::of(&headers)
        };

        assert_eq!(BodyKind::of(&HeaderMap::new()), BodyKind::Text);
        assert_eq!(kind("application/json"), BodyKind::Text);
        assert_eq!(kind("text/plain; charset=utf-8"), BodyKind::Text);
        assert_eq!(kind("multipart/form-data; boundary=x"), BodyKind::Multipart);
        assert_eq!(kind("image/png"), BodyKind::Binary);
    }

    #[test]
    fn bodies_are_described() {
        assert_eq!(describe_body(BodyKind::Text, b""), "");
        assert_eq!(describe_body(BodyKind::Text, br#"{"a":1}"#), r#"{"a":1}"#);
        assert_eq!(
            describe_body(BodyKind::Multipart, &[0u8; 42]),
            "[multipart body: 42 bytes]"
        );
        assert_eq!(describe_body(BodyKind::Binary, &[1, 2, 3]), "[binary body: 3 bytes]");
        assert_eq!(describe_body(BodyKind::Text, b"plain words"), "plain words");
    }

    #[test]
    fn credentials_and_tokens_are_masked_in_bodies() {
        let request = describe_body(
            BodyKind::Text,
            br#"{"email":"alice@example.com","password":"alice-secret-pw"}"#,
        );
        assert!(!request.contains("alice-secret-pw"));
        assert!(request.contains("alice@example.com"));

        let response = describe_body(
            BodyKind::Text,
            br#"{"token":"eyJ.sig","user":{"id":"1","Password":"x"},"items":[{"token":"t2"}]}"#,
        );
        let json: serde_json::Value = serde_json::from_str(&response).unwrap();
        assert_eq!(json["token"], MASKED_VALUE);
        assert_eq!(json["user"]["Password"], MASKED_VALUE);
        assert_eq!(json["items"][0]["token"], MASKED_VALUE);
        assert_eq!(json["user"]["id"], "1");
    }
}
