//! Toolverse API Server
//!
//! Backend for the browser tools. Provides REST endpoints for:
//!
//! - IP lookups (`/api/ip-proxy`, `/api/my-ip`), keeping the ipinfo.io
//!   token off the client
//! - Server-assisted page reordering (`/api/pdf/reorder`)
//! - Server-side split/extract (`/api/pdf/split`)

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod error;
mod geo;
#[cfg(test)]
mod tests;

use geo::IpInfoClient;

/// Command-line arguments for the Toolverse server
#[derive(Parser, Debug)]
#[command(name = "toolverse-api")]
#[command(about = "Toolverse API server for IP lookups and PDF page assembly")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3001")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// ipinfo.io access token
    #[arg(long, env = "IPINFO_TOKEN")]
    ipinfo_token: Option<String>,

    /// Base URL of the IP lookup service
    #[arg(long, env = "IPINFO_BASE_URL", default_value = "https://ipinfo.io")]
    ipinfo_base_url: String,

    /// Largest accepted upload in megabytes
    #[arg(long, env = "MAX_UPLOAD_MB", default_value = "50")]
    max_upload_mb: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub geo: Arc<IpInfoClient>,
}

/// Build the router with all routes and middleware
pub fn app(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(api::handle_health))
        // IP lookups
        .route("/api/ip-proxy", get(api::handle_ip_proxy))
        .route("/api/my-ip", get(api::handle_my_ip))
        // PDF page assembly
        .route("/api/pdf/reorder", post(api::handle_reorder))
        .route("/api/pdf/split", post(api::handle_split))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("toolverse_api={}", level).parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    if args.ipinfo_token.is_none() {
        info!("IPINFO_TOKEN not set, using anonymous lookups");
    }

    let state = AppState {
        geo: Arc::new(IpInfoClient::new(
            &args.ipinfo_base_url,
            args.ipinfo_token.clone(),
        )),
    };
    let app = app(state, args.max_upload_mb * 1024 * 1024);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Toolverse API listening on http://{}", addr);
    info!("Upload limit: {} MB", args.max_upload_mb);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
