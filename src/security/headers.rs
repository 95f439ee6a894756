//! Security response headers.
//!
//! # Responsibilities
//! - Map a [`Security`] policy to the response headers it implies
//! - Apply those headers to every response passing through the chain
//!
//! # Design Decisions
//! - The policy is compiled to a `HeaderMap` once, when the chain is built
//! - Headers are only added when the handler did not set its own value
//! - Never rejects a request

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{
            InvalidHeaderValue, CONTENT_SECURITY_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
        },
        HeaderMap, HeaderValue, Request,
    },
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};

/// Value of the `X-Frame-Options` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum FrameOptions {
    #[serde(rename = "DENY")]
    Deny,
    #[serde(rename = "SAMEORIGIN")]
    SameOrigin,
}

impl FrameOptions {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameOptions::Deny => "DENY",
            FrameOptions::SameOrigin => "SAMEORIGIN",
        }
    }
}

/// Security header policy.
///
/// `Security::default()` is the process-wide default: frames denied,
/// content sniffing disabled and `default-src 'self'` as CSP. An override
/// read from config starts from nothing set, so omitted fields stay unset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Security {
    /// Frame-embedding policy. `None` leaves the header off.
    #[serde(default)]
    pub frame_options: Option<FrameOptions>,

    /// Send `X-Content-Type-Options: nosniff`.
    #[serde(default)]
    pub no_sniff: bool,

    /// Content-Security-Policy, sent verbatim. Empty or `None` is not sent.
    #[serde(default)]
    pub csp: Option<String>,
}

pub const DEFAULT_CSP: &str = "default-src 'self'";

impl Default for Security {
    fn default() -> Self {
        Self {
            frame_options: Some(FrameOptions::Deny),
            no_sniff: true,
            csp: Some(DEFAULT_CSP.to_string()),
        }
    }
}

impl Security {
    /// A policy that sets no headers at all.
    pub fn none() -> Self {
        Self {
            frame_options: None,
            no_sniff: false,
            csp: None,
        }
    }

    /// The header writes this policy implies.
    ///
    /// Fails only when the CSP string is not a legal header value.
    pub fn headers(&self) -> Result<HeaderMap, InvalidHeaderValue> {
        let mut headers = HeaderMap::new();

        if let Some(frame) = self.frame_options {
            headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static(frame.as_str()));
        }

        if self.no_sniff {
            headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
        }

        if let Some(csp) = self.csp.as_deref().filter(|csp| !csp.is_empty()) {
            headers.insert(CONTENT_SECURITY_POLICY, HeaderValue::from_str(csp)?);
        }

        Ok(headers)
    }
}

/// Middleware applying precompiled security headers to the response.
pub async fn security_headers(
    State(headers): State<Arc<HeaderMap>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    let target = response.headers_mut();
    for (name, value) in headers.iter() {
        target.entry(name.clone()).or_insert_with(|| value.clone());
    }

    response
}
