//! Application and request-scoped context.
//!
//! # Responsibilities
//! - Hold the values every request may read: time zone, static assets,
//!   CSRF collaborator, composed templates
//! - Give handlers an explicit per-request context with the flash state
//!
//! # Design Decisions
//! - `AppContext` is built once and shared read-only through an `Arc`
//! - `RequestContext` is an extractor, so handlers name it in their signature

use std::convert::Infallible;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::flash::{FlashCookie, FlashMessage};
use crate::http::assets::StaticAssets;
use crate::http::request::request_id;
use crate::render::{Page, TemplateStore};
use crate::security::CsrfProtection;

struct Shared {
    location: Tz,
    static_assets: StaticAssets,
    csrf: Option<Arc<dyn CsrfProtection>>,
    templates: TemplateStore,
    base_url: String,
}

/// Values owned by the application for the lifetime of the process.
#[derive(Clone)]
pub struct AppContext {
    inner: Arc<Shared>,
}

impl AppContext {
    pub fn new(
        location: Tz,
        static_assets: StaticAssets,
        csrf: Option<Arc<dyn CsrfProtection>>,
        templates: TemplateStore,
        base_url: impl Into<String>,
    ) -> Self {
        if csrf.is_some() {
            tracing::info!("CSRF protection enabled");
        } else {
            tracing::warn!("CSRF protection disabled");
        }

        Self {
            inner: Arc::new(Shared {
                location,
                static_assets,
                csrf,
                templates,
                base_url: base_url.into(),
            }),
        }
    }

    /// Time zone used to present dates. UTC unless configured.
    pub fn location(&self) -> Tz {
        self.inner.location
    }

    /// Current time in the configured time zone.
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.inner.location)
    }

    pub fn static_assets(&self) -> &StaticAssets {
        &self.inner.static_assets
    }

    pub fn csrf(&self) -> Option<&dyn CsrfProtection> {
        self.inner.csrf.as_deref()
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.inner.templates
    }

    /// Shortcut for `templates().get(name)`.
    pub fn page(&self, name: &str) -> Option<Arc<Page>> {
        self.inner.templates.get(name)
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new(
            Tz::UTC,
            StaticAssets::new("static"),
            None,
            TemplateStore::new("templates"),
            "",
        )
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("location", &self.inner.location)
            .field("static_assets", &self.inner.static_assets)
            .field("csrf", &self.inner.csrf.is_some())
            .field("templates", &self.inner.templates.len())
            .field("base_url", &self.inner.base_url)
            .finish()
    }
}

/// Flash cookie state shared by every extraction within one request.
///
/// Stored in the request extensions so a substituted not-found handler sees
/// the state left by the handler it replaced.
#[derive(Debug, Clone)]
pub(crate) struct SharedFlash(Arc<Mutex<FlashCookie>>);

impl SharedFlash {
    pub(crate) fn from_headers(headers: &HeaderMap) -> Self {
        Self(Arc::new(Mutex::new(FlashCookie::from_headers(headers))))
    }
}

/// Per-request context handed to route handlers.
#[derive(Debug)]
pub struct RequestContext {
    app: AppContext,
    request_id: Option<String>,
    flash: SharedFlash,
    /// Flashes queued by the handler for the next request.
    pending: Vec<FlashMessage>,
}

impl RequestContext {
    /// Build the context for a request with the given headers.
    pub fn new(app: AppContext, headers: &HeaderMap) -> Self {
        Self::with_shared_flash(app, headers, SharedFlash::from_headers(headers))
    }

    fn with_shared_flash(app: AppContext, headers: &HeaderMap, flash: SharedFlash) -> Self {
        Self {
            app,
            request_id: request_id(headers).map(str::to_string),
            flash,
            pending: Vec::new(),
        }
    }

    pub fn app(&self) -> &AppContext {
        &self.app
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Queue a flash message, written only if the handler redirects.
    pub fn push_flash(&mut self, message: FlashMessage) {
        self.pending.push(message);
    }

    /// Run `f` on this request's flash cookie state.
    pub fn with_flash<R>(&mut self, f: impl FnOnce(&mut FlashCookie) -> R) -> R {
        let mut flash = self.flash.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *flash)
    }

    pub(crate) fn take_pending_flashes(&mut self) -> Vec<FlashMessage> {
        std::mem::take(&mut self.pending)
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    AppContext: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let flash = match parts.extensions.get::<SharedFlash>() {
            Some(flash) => flash.clone(),
            None => {
                let flash = SharedFlash::from_headers(&parts.headers);
                parts.extensions.insert(flash.clone());
                flash
            }
        };
        Ok(Self::with_shared_flash(
            AppContext::from_ref(state),
            &parts.headers,
            flash,
        ))
    }
}
