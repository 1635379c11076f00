use axum::{
    body::{to_bytes, Body, Bytes, HttpBody},
    http::{header::CONTENT_LENGTH, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use super::request_id::RequestId;

const MAX_BUFFERED_BODY_BYTES: usize = 64 * 1024;
const MAX_LOGGED_BODY_BYTES: usize = 2048;

/// Logs 4xx responses as warnings and 5xx responses as errors, with a body
/// preview. Bodies known to fit in `MAX_BUFFERED_BODY_BYTES` are buffered and
/// forwarded unchanged; larger or unsized bodies are passed through untouched
/// and logged without a preview.
pub async fn log_error_responses(req: Request<Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let uri = req.uri().path().to_string();
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    let start = Instant::now();

    let response = next.run(req).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let latency_ms = start.elapsed().as_millis() as u64;
    let (mut parts, body) = response.into_parts();
    let fits = body
        .size_hint()
        .upper()
        .is_some_and(|upper| upper <= MAX_BUFFERED_BODY_BYTES as u64);
    let (body, preview) = if !fits {
        let preview = match body.size_hint().exact() {
            Some(len) => format!("<body not previewed, {} bytes>", len),
            None => "<body not previewed>".to_string(),
        };
        (body, preview)
    } else {
        match to_bytes(body, MAX_BUFFERED_BODY_BYTES).await {
            Ok(bytes) => {
                let preview = preview_body(&bytes);
                (Body::from(bytes), preview)
            }
            Err(err) => {
                parts.headers.remove(CONTENT_LENGTH);
                (Body::empty(), format!("<unreadable body: {}>", err))
            }
        }
    };

    let status = status.as_u16();
    if status >= 500 {
        tracing::error!(status, %method, %uri, %request_id, latency_ms, body = %preview, "Request failed");
    } else {
        tracing::warn!(status, %method, %uri, %request_id, latency_ms, body = %preview, "Request rejected");
    }

    Response::from_parts(parts, body)
}

fn preview_body(bytes: &Bytes) -> String {
    if bytes.len() > MAX_LOGGED_BODY_BYTES {
        format!(
            "{}... (truncated, {} bytes total)",
            String::from_utf8_lossy(&bytes[..MAX_LOGGED_BODY_BYTES]),
            bytes.len()
        )
    } else {
        String::from_utf8_lossy(bytes).to_string()
    }
}
