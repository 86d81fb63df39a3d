// region:    --- Imports
use auctions::config::Config;
use auctions::database::DatabaseManager;
use auctions::router::{self, AppState};
use auctions::store::{AuctionStore, MemoryAuctionStore, PostgresAuctionStore};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time()
        .with_target(false)
        .init();

    info!(
        "{:<12} --> bind_addr: {}, max_connections: {}",
        "Main", config.bind_addr, config.max_connections
    );

    let store: Arc<dyn AuctionStore> = match config.database_url.as_deref() {
        Some(database_url) => {
            let db_manager = DatabaseManager::connect(database_url, config.max_connections).await?;
            if let Err(e) = db_manager.initialize_database().await {
                error!("{:<12} --> schema initialization failed: {:?}", "Main", e);
                return Err(e.into());
            }
            info!("{:<12} --> using Postgres store", "Main");
            Arc::new(PostgresAuctionStore::new(Arc::new(db_manager)))
        }
        None => {
            warn!(
                "{:<12} --> DATABASE_URL not set; data lives in memory only",
                "Main"
            );
            Arc::new(MemoryAuctionStore::new())
        }
    };

    if config.session_secret.is_none() {
        warn!(
            "{:<12} --> no session_secret; sessions end on restart",
            "Main"
        );
    }
    let state = AppState::new(store, config.cookie_key()?);
    let cors = router::cors_layer(config.allowed_origin.as_deref())?;
    let routes_all = router::auction_router(state).layer(cors);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
