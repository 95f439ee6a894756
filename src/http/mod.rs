//! HTTP request lifecycle.
//!
//! # Data Flow
//! ```text
//! TCP connection (axum::serve)
//!     → server.rs (App → Router: static assets, routes, fallback)
//!     → middleware/ (span, access log, request id, enrichment, security headers, 404 substitution)
//!     → handler with context.rs RequestContext
//!     → render::Page::render / render::redirect
//!     → response.rs helpers for failures
//! ```

pub mod assets;
pub mod context;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use assets::{StaticAssets, STATIC_PREFIX};
pub use context::{AppContext, RequestContext};
pub use request::X_REQUEST_ID;
pub use server::{App, AppError};
