//! Response helpers for route handlers.
//!
//! # Responsibilities
//! - Build responses with status, headers, and body
//! - Stamp every response with the edge marker headers
//! - Build redirects
//!
//! # Design Decisions
//! - Invalid caller headers are skipped, never fatal
//! - A redirect's `Location` always comes from its target argument

use axum::body::Body;
use axum::http::header::{HeaderName, HeaderValue, LOCATION};
use axum::http::{HeaderMap, Response, StatusCode};

/// Marker header added to every helper-built response.
pub const X_EDGE_ROUTER: &str = "x-edge-router";
/// Timestamp of when the response was built (RFC 2822).
pub const X_EDGE_ROUTER_LAST_MODIFIED: &str = "x-edge-router-last-modified";

const EDGE_ROUTER_BANNER: &str = "Served by edge-router.";

/// Everything needed to build a response.
#[derive(Debug, Clone)]
pub struct ResponseSpec {
    pub body: String,
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
}

impl ResponseSpec {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            status: StatusCode::OK,
            headers: Vec::new(),
        }
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Build a response from a spec.
pub fn respond(spec: ResponseSpec) -> Response<Body> {
    let mut headers = HeaderMap::new();
    for (name, value) in &spec.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!(header = %name, "Skipping invalid response header"),
        }
    }
    stamp(&mut headers);

    let mut response = Response::new(Body::from(spec.body));
    *response.status_mut() = spec.status;
    *response.headers_mut() = headers;
    response
}

/// 200 response with a plain body.
pub fn text(body: impl Into<String>) -> Response<Body> {
    respond(ResponseSpec::new(body))
}

/// 200 response with an HTML content type.
pub fn html(body: impl Into<String>) -> Response<Body> {
    respond(ResponseSpec::new(body).header("content-type", "text/html"))
}

/// Empty-bodied redirect to `uri`.
pub fn redirect(uri: &str, status: StatusCode, extra_headers: &[(&str, &str)]) -> Response<Body> {
    let mut spec = ResponseSpec::new("").status(status);
    for (name, value) in extra_headers {
        if !name.eq_ignore_ascii_case(LOCATION.as_str()) {
            spec = spec.header(*name, *value);
        }
    }
    spec = spec.header(LOCATION.as_str(), uri);
    respond(spec)
}

/// 302 redirect with no extra headers.
pub fn found(uri: &str) -> Response<Body> {
    redirect(uri, StatusCode::FOUND, &[])
}

fn stamp(headers: &mut HeaderMap) {
    headers.insert(X_EDGE_ROUTER, HeaderValue::from_static(EDGE_ROUTER_BANNER));
    if let Ok(value) = HeaderValue::from_str(&chrono::Utc::now().to_rfc2822()) {
        headers.insert(X_EDGE_ROUTER_LAST_MODIFIED, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_text(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_text_defaults() {
        let res = text("Hello World");
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[X_EDGE_ROUTER], EDGE_ROUTER_BANNER);
        let stamp = res.headers()[X_EDGE_ROUTER_LAST_MODIFIED].to_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc2822(stamp).is_ok());
        assert_eq!(body_text(res).await, "Hello World");
    }

    #[test]
    fn test_custom_status_and_headers() {
        let res = respond(
            ResponseSpec::new("<p>made</p>")
                .status(StatusCode::CREATED)
                .header("content-type", "text/html")
                .header("custom-header", "custom-value"),
        );
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.headers()["content-type"], "text/html");
        assert_eq!(res.headers()["custom-header"], "custom-value");
        assert_eq!(res.headers()[X_EDGE_ROUTER], EDGE_ROUTER_BANNER);
    }

    #[test]
    fn test_invalid_header_skipped() {
        let res = respond(ResponseSpec::new("x").header("bad header", "v").header("ok", "v"));
        assert!(res.headers().get("bad header").is_none());
        assert_eq!(res.headers()["ok"], "v");
    }

    #[tokio::test]
    async fn test_redirect() {
        let res = found("https://example.com/search?q=test#top");
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(res.headers()[LOCATION], "https://example.com/search?q=test#top");
        assert_eq!(res.headers()[X_EDGE_ROUTER], EDGE_ROUTER_BANNER);
        assert_eq!(body_text(res).await, "");
    }

    #[test]
    fn test_redirect_location_wins_over_extra_headers() {
        let res = redirect(
            "https://original.com",
            StatusCode::TEMPORARY_REDIRECT,
            &[("Location", "https://override.com"), ("cache-control", "no-cache")],
        );
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(res.headers()[LOCATION], "https://original.com");
        assert_eq!(res.headers()["cache-control"], "no-cache");
    }
}
