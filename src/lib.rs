//! Request lifecycle layer for server-rendered web applications.
//!
//! Composes exact-path routing, a fixed middleware chain, flash messages
//! carried in a cookie across one redirect, and base + child page templates.

// Core subsystems
pub mod config;
pub mod http;
pub mod routing;

// Page rendering
pub mod flash;
pub mod render;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::AppConfig;
pub use flash::FlashMessage;
pub use http::{App, AppContext, AppError, RequestContext};
pub use lifecycle::Shutdown;
pub use render::{redirect, Page, RenderData, TemplateStore};
pub use security::Security;
