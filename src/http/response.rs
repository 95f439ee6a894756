//! Response helpers shared by rendering and redirects.
//!
//! # Design Decisions
//! - Internal failures map to one fixed plain-text 500; engine error text never reaches the client
//! - Headers already staged for the response (e.g. flash removal) are kept on the 500

use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::Response,
};

pub const TEXT_HTML_UTF_8: &str = "text/html; charset=utf-8";
pub const TEXT_PLAIN_UTF_8: &str = "text/plain; charset=utf-8";

/// Body of every internal error response.
pub const INTERNAL_ERROR_BODY: &str = "Internal Server Error\n";

/// A generic 500 carrying the headers staged so far.
pub fn internal_error(mut headers: HeaderMap) -> Response {
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN_UTF_8));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));

    let mut response = Response::new(Body::from(INTERNAL_ERROR_BODY));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().extend(headers);
    response
}
