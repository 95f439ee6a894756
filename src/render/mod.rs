//! Template composition and page rendering.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     template dir → store.rs compose(name, base) → Arc<Page> (immutable)
//!
//! Request:
//!     handler → page.rs render(ctx, status, data)
//!         → flash consumed from the request, injected into data
//!         → template executed into a buffer
//!         → 200..599 HTML response, or a generic 500 on failure
//!     handler → page.rs redirect(ctx, url, code)
//!         → queued flashes written to the flash cookie
//! ```
//!
//! # Design Decisions
//! - Pages are composed before traffic is served; load failures are startup errors
//! - Rendered output is fully buffered, never partially sent
//! - Template engine errors are logged, never shown to the client

pub mod page;
pub mod store;

use serde::Serialize;

use crate::flash::FlashMessage;

pub use page::redirect;
pub use store::{Page, TemplateError, TemplateStore};

/// Data handed to a page template.
///
/// Every page data type carries the flash messages shown on that view.
pub trait RenderData: Serialize {
    fn set_flashes(&mut self, flashes: Vec<FlashMessage>);
}
