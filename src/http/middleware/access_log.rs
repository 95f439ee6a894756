//! Access logging.

use std::time::Instant;

use axum::{
    body::{Body, HttpBody},
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::observability::metrics;

/// Log one entry per request after everything downstream has completed.
pub async fn access_log(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let url = request.uri().to_string();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let size = response.body().size_hint().exact().unwrap_or(0);
    let duration = start.elapsed();

    tracing::info!(
        method = %method,
        url = %url,
        status,
        size,
        duration_ms = duration.as_secs_f64() * 1000.0,
        "Request completed"
    );
    metrics::record_request(method.as_str(), status, duration);

    response
}
