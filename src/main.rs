use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use stoat::analytics::GeoIpService;
use stoat::config::{Config, StorageBackend};
use stoat::storage::{MemoryStorage, SqliteStorage, Storage};
use stoat::{api, redirect};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Initialize storage. The backend is chosen once here and never
    // switched mid-request; an unreachable SQLite database degrades to
    // the ephemeral in-memory store.
    let storage: Arc<dyn Storage> = match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage");
            Arc::new(MemoryStorage::new())
        }
        StorageBackend::Sqlite => {
            match SqliteStorage::new(&config.storage.database_url, 5).await {
                Ok(storage) => {
                    info!("Using SQLite storage: {}", config.storage.database_url);
                    Arc::new(storage)
                }
                Err(err) => {
                    warn!(error = %err, "SQLite unavailable, falling back to in-memory storage");
                    Arc::new(MemoryStorage::new())
                }
            }
        }
    };

    info!("Initializing storage...");
    storage.init().await?;
    info!("Storage initialized successfully");

    // Initialize GeoIP
    let geoip = Arc::new(GeoIpService::new(config.geoip.city_db_path.as_deref())?);
    match config.geoip.city_db_path {
        Some(ref path) => info!("GeoIP city database loaded from {}", path),
        None => info!("GeoIP database not configured, clicks will resolve as Unknown"),
    }

    // Create routers
    let api_router = api::create_api_router(Arc::clone(&storage));
    let redirect_router = redirect::create_redirect_router(Arc::clone(&storage), geoip);

    // Start API server
    let api_addr = format!("{}:{}", config.api_server.host, config.api_server.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("API server listening on http://{}", api_addr);
    info!("   - API endpoints available at http://{}/api/...", api_addr);

    // Start redirect server
    let redirect_addr = format!(
        "{}:{}",
        config.redirect_server.host, config.redirect_server.port
    );
    let redirect_listener = tokio::net::TcpListener::bind(&redirect_addr).await?;
    info!("Redirect server listening on http://{}", redirect_addr);

    // Run both servers concurrently
    tokio::try_join!(
        axum::serve(
            api_listener,
            api_router.into_make_service_with_connect_info::<SocketAddr>(),
        ),
        axum::serve(
            redirect_listener,
            redirect_router.into_make_service_with_connect_info::<SocketAddr>(),
        ),
    )?;

    Ok(())
}
