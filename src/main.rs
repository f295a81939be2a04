//! LinkPress - URL Shortening & Notes Backend
//! Mission: JWT-secured link shortening, notes, and click analytics

use anyhow::{Context, Result};
use dotenv::dotenv;
use linkpress_backend::{
    app::{build_router, AppState},
    auth::TokenProvider,
    store::{BlacklistStore, Db},
};
use std::path::Path;
use std::{env, sync::Arc, time::Duration};
use tokio::{net::TcpListener, time::interval};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default sweep cadence for expired revocation records: hourly.
const BLACKLIST_SWEEP_SECS: u64 = 3600;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    load_env();
    init_tracing();

    info!("LinkPress backend starting");

    // A missing or malformed signing secret aborts startup.
    let secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
    let tokens = Arc::new(
        TokenProvider::from_base64_secret(&secret).context("JWT_SECRET is not usable")?,
    );

    let db_path = env::var("DB_PATH").unwrap_or_else(|_| "linkpress.db".to_string());
    let db = Db::open(&db_path)?;

    let state = AppState::new(db, tokens);

    tokio::spawn(blacklist_sweep_polling(state.blacklist.clone()));

    let app = build_router(state);

    let addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Periodically drops blacklist rows whose token has expired on its own.
/// The cadence is overridable for operational tuning; revocation correctness
/// never depends on this task running.
async fn blacklist_sweep_polling(blacklist: BlacklistStore) {
    let sweep_secs = env::var("BLACKLIST_SWEEP_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(BLACKLIST_SWEEP_SECS);

    info!("Starting blacklist sweeper (every {}s)", sweep_secs);
    let mut ticker = interval(Duration::from_secs(sweep_secs));

    loop {
        ticker.tick().await;
        if let Err(e) = blacklist.sweep_expired() {
            error!("Blacklist sweep failed: {:#}", e);
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "linkpress_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // 2) Also try the manifest-dir .env (common when running with
    //    --manifest-path from elsewhere)
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let candidate = manifest_dir.join(".env");
    if candidate.exists() {
        let _ = dotenv::from_path(&candidate);
    }
}
