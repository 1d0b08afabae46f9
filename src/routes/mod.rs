use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::db::PlayerTable;

pub mod health;
pub mod nba;

/// Shared handler state. Every mutation takes the write lock for its whole
/// find-then-modify sequence.
#[derive(Clone, Default)]
pub struct AppState {
    pub table: Arc<RwLock<PlayerTable>>,
}

impl AppState {
    pub fn new(table: PlayerTable) -> Self {
        Self {
            table: Arc::new(RwLock::new(table)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Root and health
        .route("/", get(|| async { "NBA Player Table API - v1.0" }))
        .route("/health", get(health::health_check))

        // Player table
        .route(
            "/nba",
            get(nba::list_players)
                .post(nba::insert_player)
                .put(nba::upsert_player)
                .delete(nba::delete_player)
                .patch(nba::patch_player),
        )

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
