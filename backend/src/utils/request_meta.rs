//! Device metadata pulled from request headers for session display.

use axum::http::{header::USER_AGENT, HeaderMap};

use crate::models::active_session::SessionMetadata;

const DEVICE_LABEL_HEADER: &str = "x-device-label";
const MAX_METADATA_LEN: usize = 255;

pub fn session_metadata_from_headers(headers: &HeaderMap) -> SessionMetadata {
    SessionMetadata {
        device_label: header_value(headers, DEVICE_LABEL_HEADER),
        user_agent: extract_user_agent(headers),
        ip_address: extract_ip(headers),
    }
}

pub fn extract_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        return value
            .split(',')
            .next()
            .map(|ip| ip.trim().to_string())
            .filter(|ip| !ip.is_empty());
    }
    header_value(headers, "x-real-ip")
}

pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    header_value(headers, USER_AGENT.as_str())
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.chars().take(MAX_METADATA_LEN).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn prefers_first_forwarded_address() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 10.0.0.2"));
        headers.insert("x-real-ip", HeaderValue::from_static("192.168.0.1"));
        assert_eq!(extract_ip(&headers).as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn collects_device_details() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("  Firefox/130 "));
        headers.insert("x-real-ip", HeaderValue::from_static("192.168.0.1"));
        headers.insert(DEVICE_LABEL_HEADER, HeaderValue::from_static("work laptop"));

        let metadata = session_metadata_from_headers(&headers);
        assert_eq!(metadata.user_agent.as_deref(), Some("Firefox/130"));
        assert_eq!(metadata.ip_address.as_deref(), Some("192.168.0.1"));
        assert_eq!(metadata.device_label.as_deref(), Some("work laptop"));
    }

    #[test]
    fn blank_headers_are_dropped() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("   "));
        assert_eq!(session_metadata_from_headers(&headers), SessionMetadata::default());
    }
}
