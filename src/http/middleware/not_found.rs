//! Custom not-found substitution.

use axum::{
    body::Body,
    extract::State,
    http::{header::SET_COOKIE, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::MethodRouter,
};
use tower::ServiceExt;

use crate::http::context::SharedFlash;

/// Replace a 404 from the wrapped handler with the custom not-found handler.
///
/// Every other status passes through unchanged. Both handlers share one
/// flash cookie state, and cookies set by the replaced response are kept.
pub async fn not_found_fallback(
    State(handler): State<MethodRouter>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if request.extensions().get::<SharedFlash>().is_none() {
        let flash = SharedFlash::from_headers(request.headers());
        request.extensions_mut().insert(flash);
    }

    let head = clone_head(&request);
    let response = next.run(request).await;

    if response.status() != StatusCode::NOT_FOUND {
        return response;
    }

    tracing::debug!(path = %head.uri().path(), "Serving custom not-found page");
    let mut custom = handler.oneshot(head).await.into_response();
    for cookie in response.headers().get_all(SET_COOKIE) {
        custom.headers_mut().append(SET_COOKIE, cookie.clone());
    }
    custom
}

/// Copy of the request head with an empty body.
fn clone_head(request: &Request<Body>) -> Request<Body> {
    let mut head = Request::new(Body::empty());
    *head.method_mut() = request.method().clone();
    *head.uri_mut() = request.uri().clone();
    *head.version_mut() = request.version();
    *head.headers_mut() = request.headers().clone();
    *head.extensions_mut() = request.extensions().clone();
    head
}
