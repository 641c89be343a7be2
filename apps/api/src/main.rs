mod config;
mod errors;
mod hash;
mod models;
mod recommender;
mod routes;
mod session;
mod sheets;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::recommender::RecommenderClient;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::sheets::GoogleSheetsMirror;
use crate::state::AppState;
use crate::store::CredentialStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Skillbridge API v{}", env!("CARGO_PKG_VERSION"));

    // Load the credential store (creates an empty file on first run)
    let store = CredentialStore::load(&config.users_file)?;

    // Spreadsheet mirror for profile rows and the course log
    let mirror = GoogleSheetsMirror::new(
        config.spreadsheet_id.clone(),
        config.sheets_api_token.clone(),
        config.user_sheet_name.clone(),
        config.course_sheet_name.clone(),
    );
    info!("Sheets mirror initialized (spreadsheet: {})", config.spreadsheet_id);

    // Recommendation webhook client
    let recommender = RecommenderClient::new(config.webhook_url.clone());
    info!("Recommender client initialized ({})", config.webhook_url);

    // Build app state
    let state = AppState {
        store: Arc::new(Mutex::new(store)),
        sessions: Arc::new(SessionStore::new()),
        recommender,
        mirror: Arc::new(mirror),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
