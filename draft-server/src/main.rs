use std::sync::Arc;
use tokio::signal;
use tracing::info;

use draft_core::LeaderboardAggregator;
use draft_persistence::{
    connection::connect_and_migrate,
    repositories::{GameRepository, LeaderboardRepository},
};
use draft_server::{config::Config, create_routes, events};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Draft Arena leaderboard server...");

    let config = Config::new();

    // Initialize database connection and run migrations
    let db = match connect_and_migrate().await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to connect to database and run migrations: {}", e);
            std::process::exit(1);
        }
    };

    let ranking_store = Arc::new(LeaderboardRepository::new(db.clone()));
    let aggregator = Arc::new(LeaderboardAggregator::new(ranking_store));
    let game_repository = Arc::new(GameRepository::new(db));

    // Recorded games reach the ranking pipeline through this channel
    let (game_events, receiver) = events::game_event_channel();
    events::spawn_game_recorded_consumer(aggregator.clone(), receiver);

    let routes = create_routes(aggregator, game_repository, game_events);

    info!("Server starting on {}:{}", config.host, config.port);

    let addr = (
        config.host.parse::<std::net::IpAddr>().unwrap(),
        config.port,
    );

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown(addr, async {
        // Wait for SIGINT (Ctrl+C) or SIGTERM
        #[cfg(unix)]
        {
            let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt()).unwrap();
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate()).unwrap();

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
        {
            signal::ctrl_c().await.expect("Failed to listen for ctrl+c");
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    });

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}
