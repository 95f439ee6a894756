//! Flash messages carried across one redirect in a cookie.
//!
//! # Data Flow
//! ```text
//! Request N (handler pushes flashes, then redirects):
//!     → cookie.rs set_if_needed(redirect = true)
//!     → codec.rs encode
//!     → Set-Cookie: flash=<encoded>; Path=/; SameSite=Strict; Secure
//!
//! Request N+1 (carries the cookie):
//!     → cookie.rs check_and_consume
//!     → codec.rs decode
//!     → messages handed to the page render, removal cookie emitted
//! ```
//!
//! # Design Decisions
//! - One hop only: an inbound cookie is always cleared, even on a redirect
//! - A request that consumed a cookie never writes a new one
//! - Decoding fails soft to no messages

pub mod codec;
pub mod cookie;

use serde::{Deserialize, Serialize};

pub use cookie::{FlashCookie, FLASH_COOKIE};

/// A one-time notice shown on the next page view.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FlashMessage {
    /// Category used for styling, e.g. "success" or "error".
    pub kind: String,
    pub text: String,
}

impl FlashMessage {
    pub fn new(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new("success", text)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new("info", text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new("warning", text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new("error", text)
    }
}
