//! Request context extraction.
//!
//! # Responsibilities
//! - Turn a decoded `axum::http` request head into [`RequestOverrides`]
//! - Buffer the body (bounded) for the payload and form fields
//! - Attach the built [`Request`] to the request extensions
//!
//! # Design Decisions
//! - Host and port come from the `Host` header, falling back to the URI authority
//! - The scheme comes from the URI, then `X-Forwarded-Proto`, then the defaults
//! - Credentials are only read from `Basic` authorization

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{header, request::Parts, uri::Authority, Request as HttpRequest, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::Engine;
use http_body_util::LengthLimitError;

use crate::config::{AppConfig, RequestDefaults};
use crate::http::headers::collect_headers;
use crate::request::{parse_form, Request, RequestOverrides, RequestResult};

const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// State required by the context middleware.
#[derive(Debug, Clone)]
pub struct ContextState {
    pub defaults: RequestDefaults,
    /// Deployment prefix declared on every request.
    pub base_path: Option<String>,
    /// Bodies above this size are rejected.
    pub max_payload_bytes: usize,
}

impl ContextState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            defaults: config.defaults.clone(),
            base_path: config.deployment.base_path.clone(),
            max_payload_bytes: config.deployment.max_payload_bytes,
        }
    }
}

/// Gather overrides from a request head.
pub fn overrides_from_parts(parts: &Parts, state: &ContextState) -> RequestOverrides {
    let mut overrides = RequestOverrides {
        method: Some(parts.method.as_str().to_string()),
        scheme: request_scheme(parts),
        base_path: state.base_path.clone(),
        headers: Some(collect_headers(&parts.headers)),
        ..RequestOverrides::default()
    };

    if let Some(authority) = request_authority(parts) {
        overrides.host = Some(authority.host().to_string());
        overrides.port = authority.port_u16();
    }

    if let Some((user, pass)) = basic_credentials(parts) {
        overrides.user = Some(user);
        overrides.pass = Some(pass);
    }

    overrides
}

/// Build a [`Request`] from a request head and its buffered body.
pub fn build_request(parts: &Parts, body: &[u8], state: &ContextState) -> RequestResult<Request> {
    let mut overrides = overrides_from_parts(parts, state);
    if is_form(parts) {
        overrides.post = Some(parse_form(body));
    }
    overrides.payload = Some(body.to_vec());

    Request::with_defaults(&parts.uri.to_string(), overrides, &state.defaults)
}

/// Middleware that attaches a [`Request`] to every incoming request.
///
/// Handlers read it back with `Extension<Request>`.
pub async fn request_context_middleware(
    State(state): State<ContextState>,
    req: HttpRequest<Body>,
    next: Next,
) -> Response {
    let (parts, body) = req.into_parts();

    let bytes = match to_bytes(body, state.max_payload_bytes).await {
        Ok(bytes) => bytes,
        Err(e) if exceeds_limit(&e) => {
            tracing::warn!(
                uri = %parts.uri,
                limit = state.max_payload_bytes,
                "Request body too large"
            );
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
        Err(e) => {
            tracing::warn!(uri = %parts.uri, error = %e, "Failed to read request body");
            return (StatusCode::BAD_REQUEST, "Failed to read request body").into_response();
        }
    };

    let request = match build_request(&parts, &bytes, &state) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(uri = %parts.uri, error = %e, "Rejecting request");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    tracing::debug!(
        path = request.path(),
        base_path = request.base_path().unwrap_or_default(),
        script_path = request.script_path().unwrap_or_default(),
        "Request context built"
    );

    let mut req = HttpRequest::from_parts(parts, Body::from(bytes));
    req.extensions_mut().insert(request);
    next.run(req).await
}

fn exceeds_limit(error: &axum::Error) -> bool {
    let mut source = std::error::Error::source(error);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

fn request_scheme(parts: &Parts) -> Option<String> {
    if let Some(scheme) = parts.uri.scheme_str() {
        return Some(scheme.to_string());
    }
    parts
        .headers
        .get(X_FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty())
}

fn request_authority(parts: &Parts) -> Option<Authority> {
    parts
        .headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<Authority>().ok())
        .or_else(|| parts.uri.authority().cloned())
}

fn basic_credentials(parts: &Parts) -> Option<(String, String)> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (auth_scheme, encoded) = value.trim_start().split_once(' ')?;
    if !auth_scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let credentials = String::from_utf8(decoded).ok()?;
    let (user, pass) = credentials.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

fn is_form(parts: &Parts) -> bool {
    parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{FieldValue, Scheme};

    fn head(builder: axum::http::request::Builder) -> Parts {
        builder.body(()).unwrap().into_parts().0
    }

    fn state(base_path: Option<&str>) -> ContextState {
        ContextState {
            defaults: RequestDefaults::default(),
            base_path: base_path.map(str::to_string),
            max_payload_bytes: 1024,
        }
    }

    #[test]
    fn test_overrides_from_host_header() {
        let parts = head(
            HttpRequest::builder()
                .method("POST")
                .uri("/app/index.php/users?page=2")
                .header("Host", "example.com:8080")
                .header("x-request-id", "abc"),
        );
        let overrides = overrides_from_parts(&parts, &state(Some("/app/index.php")));
        assert_eq!(overrides.method.as_deref(), Some("POST"));
        assert_eq!(overrides.host.as_deref(), Some("example.com"));
        assert_eq!(overrides.port, Some(8080));
        assert_eq!(overrides.scheme, None);
        assert_eq!(overrides.base_path.as_deref(), Some("/app/index.php"));
        assert_eq!(
            overrides.headers.as_ref().and_then(|h| h.get("X-Request-Id")).map(String::as_str),
            Some("abc")
        );
    }

    #[test]
    fn test_forwarded_proto_and_basic_auth() {
        // "alice:s3cret"
        let parts = head(
            HttpRequest::builder()
                .uri("/")
                .header("Host", "example.com")
                .header("X-Forwarded-Proto", "HTTPS, http")
                .header("Authorization", "Basic YWxpY2U6czNjcmV0"),
        );
        let overrides = overrides_from_parts(&parts, &state(None));
        assert_eq!(overrides.scheme.as_deref(), Some("https"));
        assert_eq!(overrides.port, None);
        assert_eq!(overrides.user.as_deref(), Some("alice"));
        assert_eq!(overrides.pass.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_basic_scheme_name_is_case_insensitive() {
        for value in ["basic YWxpY2U6czNjcmV0", "BASIC YWxpY2U6czNjcmV0"] {
            let parts = head(HttpRequest::builder().uri("/").header("Authorization", value));
            assert_eq!(
                basic_credentials(&parts),
                Some(("alice".to_string(), "s3cret".to_string()))
            );
        }

        let parts = head(
            HttpRequest::builder()
                .uri("/")
                .header("Authorization", "Bearer YWxpY2U6czNjcmV0"),
        );
        assert_eq!(basic_credentials(&parts), None);
    }

    #[tokio::test]
    async fn test_only_length_limit_errors_exceed_limit() {
        let err = to_bytes(Body::from("more than four bytes"), 4).await.unwrap_err();
        assert!(exceeds_limit(&err));

        let err = axum::Error::new(std::io::Error::other("connection reset"));
        assert!(!exceeds_limit(&err));
    }

    #[test]
    fn test_build_request() {
        let parts = head(
            HttpRequest::builder()
                .method("POST")
                .uri("/app/index.php/users/5?tab=posts")
                .header("Host", "example.com")
                .header("X-Forwarded-Proto", "https")
                .header("Content-Type", "application/x-www-form-urlencoded"),
        );
        let req = build_request(&parts, b"name=Ada&tags[]=a&tags[]=b", &state(Some("/app/index.php"))).unwrap();

        assert_eq!(req.scheme(), Scheme::Https);
        assert_eq!(req.port(), Some(443));
        assert_eq!(req.host(), "example.com");
        assert_eq!(req.base_path(), Some("/app/index.php"));
        assert_eq!(req.script_path(), Some("/users/5"));
        assert_eq!(req.search("tab").and_then(FieldValue::as_str), Some("posts"));
        assert_eq!(req.post("name").and_then(FieldValue::as_str), Some("Ada"));
        assert_eq!(req.header("content-type"), Some("application/x-www-form-urlencoded"));
        assert_eq!(req.payload(), b"name=Ada&tags[]=a&tags[]=b");
        assert_eq!(req.url(), "https://example.com:443/app/index.php/users/5?tab=posts");
    }

    #[test]
    fn test_build_request_rejects_unsupported_scheme() {
        let parts = head(
            HttpRequest::builder()
                .uri("/")
                .header("X-Forwarded-Proto", "wss"),
        );
        assert!(build_request(&parts, b"", &state(None)).is_err());
    }

    #[test]
    fn test_json_body_is_not_a_form() {
        let parts = head(
            HttpRequest::builder()
                .method("PUT")
                .uri("/items/1")
                .header("Content-Type", "application/json"),
        );
        let req = build_request(&parts, br#"{"a":1}"#, &state(None)).unwrap();
        assert!(req.post_vars().is_empty());
        assert_eq!(req.payload(), br#"{"a":1}"#);
        assert_eq!(req.host(), "localhost");
    }
}
