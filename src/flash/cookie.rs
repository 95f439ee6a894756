//! The flash cookie protocol.
//!
//! # Responsibilities
//! - Find the inbound `flash` cookie on a request
//! - Decode and clear it exactly once per request
//! - Write a new cookie on redirects when nothing was consumed

use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};
use cookie::{Cookie, SameSite};

use super::{codec, FlashMessage};

/// Name of the cookie carrying flash messages.
pub const FLASH_COOKIE: &str = "flash";

/// Per-request flash cookie state.
#[derive(Debug, Default)]
pub struct FlashCookie {
    /// Raw inbound value, until consumed.
    inbound: Option<String>,
    consumed: bool,
    messages: Vec<FlashMessage>,
}

impl FlashCookie {
    /// Read the inbound `flash` cookie from request headers, if any.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let inbound = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == FLASH_COOKIE)
            .map(|cookie| cookie.value().to_string());

        Self {
            inbound,
            ..Self::default()
        }
    }

    /// Decode and clear the inbound cookie.
    ///
    /// Returns whether a cookie was consumed during this request. Only the
    /// first call decodes and emits the removal cookie.
    pub fn check_and_consume(&mut self, response: &mut HeaderMap) -> bool {
        if let Some(value) = self.inbound.take() {
            self.messages = codec::decode(&value);
            self.consumed = true;
            append_cookie(response, removal_cookie());
        }

        self.consumed
    }

    /// Write `flashes` for the next request when this one is a redirect.
    ///
    /// Nothing is written when the response is not a redirect, when a cookie
    /// was consumed in this request, or when there is nothing to carry.
    pub fn set_if_needed(
        &mut self,
        response: &mut HeaderMap,
        redirect: bool,
        flashes: &[FlashMessage],
    ) {
        let consumed = self.check_and_consume(response);
        if !redirect || consumed {
            return;
        }

        if flashes.is_empty() {
            return;
        }

        let cookie = Cookie::build((FLASH_COOKIE, codec::encode(flashes)))
            .path("/")
            .same_site(SameSite::Strict)
            .secure(true)
            .build();
        append_cookie(response, cookie);
    }

    /// Hand over the decoded messages. Later calls return nothing.
    pub fn take_messages(&mut self) -> Vec<FlashMessage> {
        std::mem::take(&mut self.messages)
    }
}

fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((FLASH_COOKIE, "")).path("/").build();
    cookie.make_removal();
    cookie
}

fn append_cookie(headers: &mut HeaderMap, cookie: Cookie<'_>) {
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            headers.append(SET_COOKIE, value);
        }
        Err(e) => tracing::error!(error = %e, "Invalid flash Set-Cookie value"),
    }
}
