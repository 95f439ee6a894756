//! Application assembly and serving.
//!
//! # Responsibilities
//! - Collect routes, the not-found handler and shared collaborators
//! - Validate the configuration and build the axum `Router`
//! - Serve it with graceful shutdown and a bounded grace period
//!
//! # Design Decisions
//! - Every configuration problem surfaces as an `AppError` before serving
//! - Shared values are built once and only read afterwards

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    handler::Handler,
    http::{header::InvalidHeaderValue, StatusCode},
    middleware,
    routing::{any, MethodRouter},
    Router,
};
use chrono_tz::Tz;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, watch};

use crate::config::AppConfig;
use crate::http::assets::{StaticAssets, STATIC_PREFIX};
use crate::http::context::AppContext;
use crate::http::middleware::{not_found_fallback, MiddlewareChain};
use crate::lifecycle::signals::wait_for_shutdown;
use crate::render::{TemplateError, TemplateStore};
use crate::routing::{RouteError, Routes, ROOT_PATH};
use crate::security::{CsrfProtection, Security};

/// Startup failure.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("invalid security policy: {0}")]
    Security(#[from] InvalidHeaderValue),

    #[error("unknown time zone: {0}")]
    Location(String),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// An application: routes plus the values shared by every request.
pub struct App {
    routes: Routes,
    not_found: Option<MethodRouter<AppContext>>,
    security: Security,
    location: Tz,
    static_assets: StaticAssets,
    templates: TemplateStore,
    csrf: Option<Arc<dyn CsrfProtection>>,
    base_url: String,
}

impl App {
    /// An application with default settings and no routes.
    pub fn new() -> Self {
        Self {
            routes: Routes::new(),
            not_found: None,
            security: Security::default(),
            location: Tz::UTC,
            static_assets: StaticAssets::new("static"),
            templates: TemplateStore::new("templates"),
            csrf: None,
            base_url: String::new(),
        }
    }

    /// An application configured from `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let location = match config.location.as_deref() {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|_| AppError::Location(name.to_string()))?,
            None => Tz::UTC,
        };

        Ok(Self {
            security: config.security(),
            location,
            static_assets: StaticAssets::new(&config.static_dir),
            templates: TemplateStore::new(&config.template_dir),
            base_url: config.base_url.clone(),
            ..Self::new()
        })
    }

    /// Register a handler at an exact path.
    pub fn route(mut self, path: &str, handler: MethodRouter<AppContext>) -> Self {
        self.routes.insert(path, handler);
        self
    }

    /// Handler for requests nothing else answers, for any method.
    pub fn not_found<H, T>(mut self, handler: H) -> Self
    where
        H: Handler<T, AppContext>,
        T: 'static,
    {
        self.not_found = Some(any(handler));
        self
    }

    pub fn security(mut self, security: Security) -> Self {
        self.security = security;
        self
    }

    pub fn location(mut self, location: Tz) -> Self {
        self.location = location;
        self
    }

    pub fn static_assets(mut self, assets: StaticAssets) -> Self {
        self.static_assets = assets;
        self
    }

    pub fn templates(mut self, templates: TemplateStore) -> Self {
        self.templates = templates;
        self
    }

    pub fn csrf(mut self, csrf: Arc<dyn CsrfProtection>) -> Self {
        self.csrf = Some(csrf);
        self
    }

    /// Validate and assemble the router.
    pub fn into_router(self) -> Result<Router, AppError> {
        self.routes.validate()?;
        let chain = MiddlewareChain::new(&self.security)?;

        let context = AppContext::new(
            self.location,
            self.static_assets,
            self.csrf,
            self.templates,
            self.base_url,
        );
        let not_found: Option<MethodRouter> = self
            .not_found
            .map(|handler| handler.with_state(context.clone()));

        let mut router = Router::new().nest_service(
            STATIC_PREFIX.trim_end_matches('/'),
            context.static_assets().service(),
        );

        let root_owner = not_found.clone().filter(|_| self.routes.has_root());
        for (path, handler) in self.routes.into_entries() {
            let mut handler: MethodRouter = handler.with_state(context.clone());
            if let (ROOT_PATH, Some(custom)) = (path.as_str(), &root_owner) {
                handler = handler.layer(middleware::from_fn_with_state(
                    custom.clone(),
                    not_found_fallback,
                ));
            }
            router = router.route(&path, handler);
        }

        if let Some(custom) = not_found {
            let fallback: MethodRouter = any(|| async { StatusCode::NOT_FOUND })
                .layer(middleware::from_fn_with_state(custom, not_found_fallback));
            router = router.fallback_service(fallback);
        }

        Ok(chain.apply(router))
    }

    /// Serve until Ctrl-C, SIGTERM or `shutdown` fires.
    ///
    /// In-flight requests get `grace` to finish before the server is dropped.
    pub async fn run(
        self,
        listener: TcpListener,
        grace: Duration,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), AppError> {
        let router = self.into_router()?;
        let addr = listener.local_addr()?;

        tracing::info!(address = %addr, "HTTP server starting");

        let (stopping_tx, mut stopping_rx) = watch::channel(false);
        let server = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                wait_for_shutdown(shutdown).await;
                let _ = stopping_tx.send(true);
            })
            .into_future();

        let deadline = async move {
            if stopping_rx.wait_for(|stopping| *stopping).await.is_err() {
                std::future::pending::<()>().await;
            }
            tokio::time::sleep(grace).await;
        };

        tokio::select! {
            result = server => result?,
            _ = deadline => {
                tracing::warn!(
                    grace_secs = grace.as_secs_f64(),
                    "Grace period elapsed, dropping in-flight requests"
                );
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flash::{codec, FlashMessage, FLASH_COOKIE};
    use crate::http::context::RequestContext;
    use crate::render::{redirect, RenderData};
    use axum::{
        body::Body,
        http::{
            header::{CONTENT_SECURITY_POLICY, COOKIE, LOCATION, SET_COOKIE, X_FRAME_OPTIONS},
            Request,
        },
        routing::{get, post},
    };
    use serde::Serialize;
    use tower::ServiceExt;

    #[derive(Debug, Default, Serialize)]
    struct View {
        title: String,
        flashes: Vec<FlashMessage>,
    }

    impl RenderData for View {
        fn set_flashes(&mut self, flashes: Vec<FlashMessage>) {
            self.flashes = flashes;
        }
    }

    async fn send(
        router: &Router,
        request: Request<Body>,
    ) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[test]
    fn test_reserved_path_aborts_build() {
        let err = App::new()
            .route("/static/", get(|| async { "nope" }))
            .into_router()
            .unwrap_err();
        assert!(matches!(err, AppError::Route(RouteError::Reserved(_))));
    }

    #[test]
    fn test_unknown_location_rejected() {
        let config = AppConfig {
            location: Some("Mars/Olympus_Mons".to_string()),
            ..AppConfig::default()
        };
        assert!(matches!(App::from_config(&config), Err(AppError::Location(_))));
    }

    #[tokio::test]
    async fn test_exact_dispatch() {
        let router = App::new()
            .route("/items", get(|| async { "items" }))
            .into_router()
            .unwrap();

        assert_eq!(send(&router, get_request("/items")).await.2, "items");
        assert_eq!(send(&router, get_request("/items/1")).await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unmatched_path_gets_custom_404() {
        let router = App::new()
            .route("/", get(|| async { "home" }))
            .not_found(|| async { (StatusCode::NOT_FOUND, "custom not found") })
            .into_router()
            .unwrap();

        let (status, headers, body) = send(&router, get_request("/does/not/exist")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "custom not found");
        assert_eq!(headers.get(X_FRAME_OPTIONS).unwrap(), "DENY");

        assert_eq!(send(&router, get_request("/")).await.2, "home");
    }

    #[tokio::test]
    async fn test_root_route_is_404_wrapped() {
        let router = App::new()
            .route("/", get(|| async { StatusCode::NOT_FOUND }))
            .not_found(|| async { (StatusCode::NOT_FOUND, "custom not found") })
            .into_router()
            .unwrap();

        let (status, _, body) = send(&router, get_request("/")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "custom not found");
    }

    #[tokio::test]
    async fn test_other_routes_not_404_wrapped() {
        let router = App::new()
            .route("/items", get(|| async { (StatusCode::NOT_FOUND, "no such item") }))
            .not_found(|| async { (StatusCode::NOT_FOUND, "custom not found") })
            .into_router()
            .unwrap();

        assert_eq!(send(&router, get_request("/items")).await.2, "no such item");
    }

    #[tokio::test]
    async fn test_custom_security_policy() {
        let router = App::new()
            .route("/", get(|| async { "home" }))
            .security(Security {
                csp: Some("default-src 'none'".to_string()),
                ..Security::none()
            })
            .into_router()
            .unwrap();

        let (_, headers, _) = send(&router, get_request("/")).await;
        assert_eq!(headers.get(CONTENT_SECURITY_POLICY).unwrap(), "default-src 'none'");
        assert!(headers.get(X_FRAME_OPTIONS).is_none());
    }

    #[tokio::test]
    async fn test_static_assets_served() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("site.css"), "body {}").unwrap();

        let router = App::new()
            .static_assets(StaticAssets::new(dir.path()))
            .into_router()
            .unwrap();

        let (status, _, body) = send(&router, get_request("/static/site.css")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "body {}");
    }

    #[tokio::test]
    async fn test_flash_cleared_after_one_hop() {
        let router = App::new()
            .route(
                "/bounce",
                post(|mut ctx: RequestContext| async move {
                    ctx.push_flash(FlashMessage::success("Saved"));
                    redirect(&mut ctx, "/bounce-again", StatusCode::SEE_OTHER)
                }),
            )
            .into_router()
            .unwrap();

        let first = Request::builder()
            .method("POST")
            .uri("/bounce")
            .body(Body::empty())
            .unwrap();
        let (status, headers, _) = send(&router, first).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers.get(LOCATION).unwrap(), "/bounce-again");
        let cookie = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        let encoded = codec::encode(&[FlashMessage::success("Saved")]);
        assert!(cookie.starts_with(&format!("{}={}", FLASH_COOKIE, encoded)));

        // Redirecting again while carrying the cookie only clears it.
        let second = Request::builder()
            .method("POST")
            .uri("/bounce")
            .header(COOKIE, format!("{}={}", FLASH_COOKIE, encoded))
            .body(Body::empty())
            .unwrap();
        let (_, headers, _) = send(&router, second).await;
        let cookies: Vec<_> = headers.get_all(SET_COOKIE).iter().collect();
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].to_str().unwrap().starts_with("flash=;"));
    }

    #[tokio::test]
    async fn test_root_404_substitution_decodes_flash_once() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("base.html"), "{% block content %}{% endblock %}").unwrap();
        std::fs::write(
            dir.path().join("page.html"),
            "{% block content %}{% for f in flashes %}[{{ f.text }}]{% endfor %}{{ title }}{% endblock %}",
        )
        .unwrap();
        let mut templates = TemplateStore::new(dir.path());
        let page = templates.compose("page.html", "base.html").unwrap();
        let custom_page = page.clone();

        let router = App::new()
            .templates(templates)
            .route(
                "/",
                get(move |mut ctx: RequestContext| {
                    let page = page.clone();
                    async move {
                        let view = View {
                            title: "root".into(),
                            ..View::default()
                        };
                        page.render(&mut ctx, StatusCode::NOT_FOUND, view)
                    }
                }),
            )
            .not_found(move |mut ctx: RequestContext| {
                let page = custom_page.clone();
                async move {
                    let view = View {
                        title: "custom".into(),
                        ..View::default()
                    };
                    page.render(&mut ctx, StatusCode::NOT_FOUND, view)
                }
            })
            .into_router()
            .unwrap();

        let encoded = codec::encode(&[FlashMessage::success("Saved")]);
        let request = Request::builder()
            .uri("/")
            .header(COOKIE, format!("{}={}", FLASH_COOKIE, encoded))
            .body(Body::empty())
            .unwrap();
        let (status, headers, body) = send(&router, request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "custom");
        let cookies: Vec<_> = headers.get_all(SET_COOKIE).iter().collect();
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].to_str().unwrap().starts_with("flash=;"));
    }
}
