//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! App setup:
//!     Security (config override or default)
//!     → headers.rs (compile to header writes)
//!     → security_headers middleware in the chain
//!
//! Request:
//!     → handler runs
//!     → missing security headers added to the response
//!     → csrf.rs collaborator available via RequestContext
//! ```

pub mod csrf;
pub mod headers;

pub use csrf::CsrfProtection;
pub use headers::{security_headers, FrameOptions, Security, DEFAULT_CSP};
