//! End-to-end tests for the request lifecycle over a real socket.

use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::routing::{get, post};
use lantern::flash::{codec, FLASH_COOKIE};
use lantern::{redirect, App, FlashMessage, Page, RenderData, RequestContext, Security};
use reqwest::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use serde::Serialize;

mod common;

#[derive(Debug, Default, Serialize)]
struct View {
    flashes: Vec<FlashMessage>,
    items: Vec<String>,
}

impl RenderData for View {
    fn set_flashes(&mut self, flashes: Vec<FlashMessage>) {
        self.flashes = flashes;
    }
}

const ITEMS: &str =
    "{% block content %}<ul>{% for i in items %}<li>{{ i }}</li>{% endfor %}</ul>{% endblock %}";
const NOT_FOUND: &str = "{% block content %}<h1>Nothing here</h1>{% endblock %}";

async fn items_server() -> common::TestServer {
    let dir = common::template_dir(&[
        ("base.html", common::BASE),
        ("items.html", ITEMS),
        ("404.html", NOT_FOUND),
    ]);
    let mut templates = common::store(&dir);
    let items_page = templates.compose("items.html", "base.html").unwrap();
    let not_found_page = templates.compose("404.html", "base.html").unwrap();
    let items: Arc<Mutex<Vec<String>>> = Arc::default();

    let list = {
        let items = items.clone();
        move |mut ctx: RequestContext| {
            let page: Arc<Page> = items_page.clone();
            let items = items.lock().unwrap().clone();
            async move {
                let view = View {
                    items,
                    ..View::default()
                };
                page.render(&mut ctx, StatusCode::OK, view)
            }
        }
    };
    let create = move |mut ctx: RequestContext| {
        items.lock().unwrap().push("lamp".to_string());
        async move {
            ctx.push_flash(FlashMessage::success("Saved"));
            redirect(&mut ctx, "/items", StatusCode::SEE_OTHER)
        }
    };

    let app = App::new()
        .templates(templates)
        .route("/items", get(list).post(create))
        .not_found(move |mut ctx: RequestContext| {
            let page = not_found_page.clone();
            async move { page.render(&mut ctx, StatusCode::NOT_FOUND, View::default()) }
        });

    common::start(app, dir).await
}

#[tokio::test]
async fn test_flash_survives_exactly_one_redirect() {
    let server = items_server().await;
    let client = common::client();

    let resp = client.post(server.url("/items")).send().await.unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()[LOCATION], "/items");
    let set_cookie = resp.headers()[SET_COOKIE].to_str().unwrap().to_string();
    let pair = set_cookie.split(';').next().unwrap().to_string();
    assert_eq!(
        pair,
        format!("{}={}", FLASH_COOKIE, codec::encode(&[FlashMessage::success("Saved")]))
    );

    let resp = client
        .get(server.url("/items"))
        .header(COOKIE, &pair)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let cleared = resp.headers()[SET_COOKIE].to_str().unwrap().to_string();
    assert!(cleared.starts_with("flash=;"));
    assert!(cleared.contains("Max-Age=0"));
    let body = resp.text().await.unwrap();
    assert_eq!(body.matches("Saved").count(), 1);
    assert!(body.contains("<li>lamp</li>"));

    let resp = client.get(server.url("/items")).send().await.unwrap();
    assert!(resp.headers().get(SET_COOKIE).is_none());
    assert!(!resp.text().await.unwrap().contains("Saved"));

    server.stop().await;
}

#[tokio::test]
async fn test_unmatched_path_renders_custom_404() {
    let server = items_server().await;
    let client = common::client();

    let resp = client.get(server.url("/nope")).send().await.unwrap();
    assert_eq!(resp.status(), 404);
    assert_eq!(resp.headers()["x-frame-options"], "DENY");
    assert!(resp.text().await.unwrap().contains("Nothing here"));

    let resp = client.delete(server.url("/items/7")).send().await.unwrap();
    assert_eq!(resp.status(), 404);

    server.stop().await;
}

#[tokio::test]
async fn test_default_security_headers_and_request_id() {
    let server = items_server().await;
    let client = common::client();

    let resp = client.get(server.url("/items")).send().await.unwrap();
    let headers = resp.headers();
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["content-security-policy"], "default-src 'self'");
    assert!(!headers["x-request-id"].is_empty());

    let resp = client
        .get(server.url("/items"))
        .header("x-request-id", "req-42")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["x-request-id"], "req-42");

    server.stop().await;
}

#[tokio::test]
async fn test_render_failure_hides_partial_output() {
    let dir = common::template_dir(&[
        ("base.html", common::BASE),
        (
            "broken.html",
            "{% block content %}<p>partial{% include \"gone.html\" %}</p>{% endblock %}",
        ),
    ]);
    let mut templates = common::store(&dir);
    let page = templates.compose("broken.html", "base.html").unwrap();

    let app = App::new().templates(templates).route(
        "/broken",
        get(move |mut ctx: RequestContext| {
            let page = page.clone();
            async move { page.render(&mut ctx, StatusCode::OK, View::default()) }
        }),
    );
    let server = common::start(app, dir).await;

    let resp = common::client().get(server.url("/broken")).send().await.unwrap();
    assert_eq!(resp.status(), 500);
    assert_eq!(resp.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
    assert_eq!(resp.text().await.unwrap(), "Internal Server Error\n");

    server.stop().await;
}

#[tokio::test]
async fn test_handler_headers_win_over_defaults() {
    let dir = common::template_dir(&[]);
    let app = App::new()
        .security(Security::default())
        .route(
            "/embed",
            post(|| async { ([("x-frame-options", "SAMEORIGIN")], "ok") }),
        );
    let server = common::start(app, dir).await;

    let resp = common::client().post(server.url("/embed")).send().await.unwrap();
    assert_eq!(resp.headers()["x-frame-options"], "SAMEORIGIN");
    assert_eq!(resp.headers()["x-content-type-options"], "nosniff");

    server.stop().await;
}

#[tokio::test]
async fn test_shutdown_stops_server() {
    let dir = common::template_dir(&[]);
    let app = App::new().route("/", get(|| async { "home" }));
    let server = common::start(app, dir).await;
    let url = server.url("/");

    assert_eq!(common::client().get(&url).send().await.unwrap().status(), 200);
    server.stop().await;

    assert!(common::client().get(&url).send().await.is_err());
}
