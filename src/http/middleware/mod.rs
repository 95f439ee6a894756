//! Middleware chain wrapping every route.
//!
//! # Data Flow
//! ```text
//! request
//!     → TraceLayer (per-request `request` span)
//!     → access_log.rs (times the rest, logs once after it completes)
//!     → SetRequestId / PropagateRequestId (x-request-id)
//!     → span enrichment (method, referer, request_id, url, user_agent)
//!     → security headers
//!     → not_found.rs (404 owner routes only)
//!     → handler
//! ```

pub mod access_log;
pub mod chain;
pub mod not_found;

pub use chain::MiddlewareChain;
pub use not_found::not_found_fallback;
