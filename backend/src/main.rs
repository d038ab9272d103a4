// main.rs

mod analytics;
mod error;
mod settings;
mod state;
mod store;
mod tracker;
mod web;

use crate::settings::Settings;
use crate::state::AppState;
use crate::store::ConfigStore;

use axum::Router;
use std::fs;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cycletime_backend=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env();
    tracing::info!(?settings, "starting cycle time analyzer");

    // --- DB path ---
    let db_path = &settings.db_path;
    if !db_path.exists() {
        if let Some(dir) = db_path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(db_path, b"")?;
        tracing::info!(path = %db_path.display(), "created empty DB file");
    }

    let db = sqlx::SqlitePool::connect(&format!("sqlite://{}", db_path.display())).await?;

    // --- Tables ---
    let store = ConfigStore::new(db);
    store.migrate().await?;

    // --- Shared state ---
    let http = reqwest::Client::builder()
        .timeout(settings.tracker_timeout)
        .build()?;

    let state = Arc::new(AppState {
        store,
        http,
        settings: Arc::new(settings),
    });

    // --- Webserver ---
    let addr = state.settings.bind_addr.clone();
    let app: Router = web::router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
