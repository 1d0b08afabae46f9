use nba_table_api::{db, router, AppState, Config, PlayerTable};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting api server...");

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    let players = db::load_players(&config.dataset_path)?;
    tracing::info!(
        "Loaded {} players from {}",
        players.len(),
        config.dataset_path.display()
    );

    let table = PlayerTable::new(players);
    if table.is_empty() {
        tracing::warn!("Dataset is empty; the table starts with no players");
    }

    let app = router(AppState::new(table));

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
