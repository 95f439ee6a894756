//! Request identification.
//!
//! # Responsibilities
//! - Name the request id header shared by the chain and handlers
//! - Read the id a request carries
//!
//! # Design Decisions
//! - An incoming `x-request-id` is trusted and kept
//! - Otherwise a UUID v4 is assigned before the enrichment stage runs

use axum::http::{HeaderMap, HeaderName};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// The request id carried in `headers`, if it is valid UTF-8.
pub fn request_id(headers: &HeaderMap) -> Option<&str> {
    headers.get(X_REQUEST_ID).and_then(|v| v.to_str().ok())
}
