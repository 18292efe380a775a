use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};

use game_core::{Game, RngSelector};
use game_persistence::{
    HistoryRepository, KeyValueRepository, KeyValueStore, MemoryStore,
    connection::connect_and_migrate,
};
use game_server::{
    config::Config,
    create_routes,
    game_manager::GameManager,
    text_generation::{AnthropicClient, OfflineGenerator, TextGenerator},
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting imposter game server...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let addr: std::net::IpAddr = match config.host.parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!("Invalid HOST '{}': {}", config.host, e);
            std::process::exit(1);
        }
    };

    // Storage failures never stop the game; fall back to memory.
    let store: Arc<dyn KeyValueStore> = match connect_and_migrate(&config.database_url).await {
        Ok(db) => Arc::new(KeyValueRepository::new(db)),
        Err(e) => {
            warn!(
                "Failed to open database '{}', history will not survive restarts: {}",
                config.database_url, e
            );
            Arc::new(MemoryStore::new())
        }
    };

    let generator: Arc<dyn TextGenerator> = match &config.text_gen_api_key {
        Some(api_key) => match AnthropicClient::new(
            config.text_gen_api_url.clone(),
            api_key.clone(),
            config.text_gen_model.clone(),
            Duration::from_secs(config.text_gen_timeout_seconds),
        ) {
            Ok(client) => {
                info!("Using text generation model {}", config.text_gen_model);
                Arc::new(client)
            }
            Err(e) => {
                warn!("Failed to build text generation client, using fallbacks: {}", e);
                Arc::new(OfflineGenerator)
            }
        },
        None => {
            info!("TEXT_GEN_API_KEY not set, using built-in questions and analysis");
            Arc::new(OfflineGenerator)
        }
    };

    let game = match config.rng_seed {
        Some(seed) => Game::with_seed(seed),
        None => Game::new(RngSelector::from_entropy()),
    };

    let game_manager = GameManager::start(
        game,
        generator,
        HistoryRepository::new(store),
        Duration::from_millis(config.countdown_tick_millis),
    )
    .await;

    let routes = create_routes(Arc::new(game_manager));

    info!("Server starting on {}:{}", config.host, config.port);

    let (addr, server) =
        warp::serve(routes).bind_with_graceful_shutdown((addr, config.port), shutdown_signal());

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let (Ok(mut sigint), Ok(mut sigterm)) = (
            signal::unix::signal(signal::unix::SignalKind::interrupt()),
            signal::unix::signal(signal::unix::SignalKind::terminate()),
        ) else {
            warn!("Failed to install signal handlers, falling back to Ctrl+C");
            wait_for_ctrl_c().await;
            return;
        };

        tokio::select! {
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down gracefully...");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down gracefully...");
            }
        }
    }

    #[cfg(not(unix))]
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down gracefully..."),
        Err(e) => {
            // Without a signal source, run until the process is killed.
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
