//! Per-request span and its enrichment.

use axum::{
    body::Body,
    http::{
        header::{REFERER, USER_AGENT},
        HeaderName, Request,
    },
    middleware::Next,
    response::Response,
};
use tracing::{field, Span};

use crate::http::request::request_id;

/// Create the `request` span all logging for one request happens in.
///
/// Fields start empty and are filled by [`enrich_span`].
pub fn make_request_span(_request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = field::Empty,
        referer = field::Empty,
        request_id = field::Empty,
        url = field::Empty,
        user_agent = field::Empty,
    )
}

/// Record request details on the current request span.
pub async fn enrich_span(request: Request<Body>, next: Next) -> Response {
    let span = Span::current();

    span.record("method", request.method().as_str());
    if let Some(referer) = header_str(&request, &REFERER) {
        span.record("referer", referer);
    }
    if let Some(id) = request_id(request.headers()) {
        span.record("request_id", id);
    }
    let url = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    span.record("url", url);
    if let Some(agent) = header_str(&request, &USER_AGENT) {
        span.record("user_agent", agent);
    }

    next.run(request).await
}

fn header_str<'a>(request: &'a Request<Body>, name: &HeaderName) -> Option<&'a str> {
    request.headers().get(name).and_then(|v| v.to_str().ok())
}
