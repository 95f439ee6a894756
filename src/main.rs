//! Demo server for the lantern request lifecycle.
//!
//! Serves a small item list: `/` shows a welcome page, `/items` lists items
//! and accepts new ones via a form that redirects back with a flash message.
//!
//! ```text
//! lantern --config lantern.toml
//! lantern --dev
//! ```

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::{extract::Form, http::StatusCode, response::Response, routing::get};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use lantern::config::{load_config, AppConfig};
use lantern::observability::{logging::init_logging, metrics::init_metrics};
use lantern::{
    redirect, App, FlashMessage, Page, RenderData, RequestContext, Shutdown, TemplateStore,
};

#[derive(Parser)]
#[command(name = "lantern")]
#[command(about = "Demo server for the lantern request lifecycle", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Development mode (pretty logs).
    #[arg(long)]
    dev: bool,
}

type Items = Arc<Mutex<Vec<String>>>;

#[derive(Debug, Default, Serialize)]
struct ViewData {
    title: String,
    now: String,
    flashes: Vec<FlashMessage>,
    items: Vec<String>,
}

impl RenderData for ViewData {
    fn set_flashes(&mut self, flashes: Vec<FlashMessage>) {
        self.flashes = flashes;
    }
}

impl ViewData {
    fn new(ctx: &RequestContext, title: &str) -> Self {
        Self {
            title: title.to_string(),
            now: ctx.app().now().format("%Y-%m-%d %H:%M %Z").to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct NewItem {
    name: String,
}

async fn home(mut ctx: RequestContext, page: Arc<Page>) -> Response {
    let data = ViewData::new(&ctx, "Home");
    page.render(&mut ctx, StatusCode::OK, data)
}

async fn list_items(mut ctx: RequestContext, page: Arc<Page>, items: Items) -> Response {
    let mut data = ViewData::new(&ctx, "Items");
    data.items = items.lock().unwrap_or_else(|e| e.into_inner()).clone();
    page.render(&mut ctx, StatusCode::OK, data)
}

async fn create_item(mut ctx: RequestContext, items: Items, form: NewItem) -> Response {
    let name = form.name.trim();
    if name.is_empty() {
        ctx.push_flash(FlashMessage::error("Name must not be empty"));
    } else {
        items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(name.to_string());
        ctx.push_flash(FlashMessage::success("Saved"));
    }
    redirect(&mut ctx, "/items", StatusCode::SEE_OTHER)
}

async fn not_found(mut ctx: RequestContext, page: Arc<Page>) -> Response {
    let data = ViewData::new(&ctx, "Not Found");
    page.render(&mut ctx, StatusCode::NOT_FOUND, data)
}

fn build_app(config: &AppConfig) -> Result<App, Box<dyn std::error::Error>> {
    let mut templates = TemplateStore::new(&config.template_dir);
    let home_page = templates.compose("home.html", "base.html")?;
    let items_page = templates.compose("items.html", "base.html")?;
    let not_found_page = templates.compose("404.html", "base.html")?;

    let items: Items = Arc::default();

    let app = App::from_config(config)?
        .templates(templates)
        .route("/", get(move |ctx: RequestContext| home(ctx, home_page.clone())))
        .route(
            "/items",
            get({
                let items = items.clone();
                move |ctx: RequestContext| list_items(ctx, items_page.clone(), items.clone())
            })
            .post(move |ctx: RequestContext, Form(form): Form<NewItem>| {
                create_item(ctx, items.clone(), form)
            }),
        )
        .not_found(move |ctx: RequestContext| not_found(ctx, not_found_page.clone()));

    Ok(app)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    config.run.dev |= cli.dev;

    init_logging(&config.observability, config.run.dev);
    tracing::info!("lantern v0.1.0 starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        template_dir = %config.template_dir.display(),
        static_dir = %config.static_dir.display(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let app = build_app(&config)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let shutdown = Shutdown::new();
    app.run(listener, config.run.shutdown_timeout(), shutdown.subscribe())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
