use axum::{
    body::Body,
    extract::{MatchedPath, Request},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// HTTP header carrying the request ID in both directions
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Per-request correlation id, stored in request extensions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reuses the caller's id when it is a well-formed UUID
    fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
            .map(Self)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Attaches a [`RequestId`] to every request and echoes it on the response.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id =
        RequestId::from_headers(request.headers()).unwrap_or_else(RequestId::generate);

    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// Span factory for `TraceLayer`.
///
/// Tags the span with the request id and the matched route template, so every
/// poll of `/search/:session_id` groups together. `session_id` starts empty and
/// is filled in by the search handlers via [`record_session_id`].
pub fn make_span_with_request_id(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(ToString::to_string)
        .unwrap_or_else(|| "unknown".to_string());

    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(MatchedPath::as_str)
        .unwrap_or("unmatched");

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        route = %route,
        request_id = %request_id,
        session_id = tracing::field::Empty,
    )
}

/// Attaches the search session a request operates on to the current request span
pub fn record_session_id(session_id: &Uuid) {
    tracing::Span::current().record("session_id", tracing::field::display(session_id));
}
