//! Guest logger server - REST API over the guest count time series

use std::net::SocketAddr;
use std::sync::Arc;

use pool_guest_logger::{
    api,
    config::AppConfig,
    logging,
    repository::{self, Repository},
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().expect("Failed to load configuration");
    let _log_guard = logging::init(&config.logging);

    tracing::info!("Starting guest logger v{}", env!("CARGO_PKG_VERSION"));

    let pool = repository::connect(&config.database)
        .await
        .expect("Failed to open database");
    repository::migrate(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database ready at {}", config.database.path.display());

    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    let repository = Repository::new(pool, config.history.max_limit);
    let services = Services::new(repository, &config).expect("Failed to create services");

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    warm_up(&state);

    let app = api::create_router(state);

    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Log one sample in the background when the store is still empty
fn warm_up(state: &AppState) {
    let services = state.services.clone();
    tokio::spawn(async move {
        match services.guest_logs.latest().await {
            Ok(None) => {
                if let Err(e) = services.fetcher.fetch_and_store().await {
                    tracing::warn!("Warm-up fetch failed: {}", e);
                }
            }
            Ok(Some(_)) => {}
            Err(e) => tracing::warn!("Warm-up skipped: {}", e),
        }
    });
}
