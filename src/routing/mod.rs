//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route registration (at startup):
//!     path → handler entries
//!     → router.rs validate (reserved prefix, exact paths)
//!     → frozen into the axum Router by http::server
//!
//! Dispatch (per request):
//!     /static/...      → static asset service
//!     exact match      → route handler (root may be 404-wrapped)
//!     anything else    → fallback (custom 404 when configured)
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - A bad table aborts startup instead of failing requests

pub mod router;

pub use router::{RouteError, Routes, ROOT_PATH};
