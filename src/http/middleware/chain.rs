//! Ordered middleware chain.
//!
//! # Responsibilities
//! - Assemble the stages every route shares, in a fixed order
//! - Apply them to a fully routed `Router` (routes, static assets, fallback)
//!
//! # Design Decisions
//! - Building the chain is pure composition; it cannot fail per request
//! - The only fallible input, the security policy, is checked at construction
//! - Panics in handlers are left to the server boundary

use std::sync::Arc;

use axum::{
    http::{header::InvalidHeaderValue, HeaderMap},
    middleware, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use super::access_log::access_log;
use crate::observability::span::{enrich_span, make_request_span};
use crate::security::{security_headers, Security};

/// The stages wrapped around every route.
#[derive(Debug, Clone)]
pub struct MiddlewareChain {
    security: Arc<HeaderMap>,
}

impl MiddlewareChain {
    /// Build the chain for a security policy.
    pub fn new(security: &Security) -> Result<Self, InvalidHeaderValue> {
        Ok(Self {
            security: Arc::new(security.headers()?),
        })
    }

    /// Wrap `router`. Call once every route and the fallback are registered.
    pub fn apply(&self, router: Router) -> Router {
        router.layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(make_request_span)
                        .on_request(())
                        .on_response(())
                        .on_failure(()),
                )
                .layer(middleware::from_fn(access_log))
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(middleware::from_fn(enrich_span))
                .layer(middleware::from_fn_with_state(
                    self.security.clone(),
                    security_headers,
                )),
        )
    }
}
