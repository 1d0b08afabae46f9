use axum::{extract::State, response::Json};

use super::AppState;
use crate::args::Validated;
use crate::error::ApiError;
use crate::models::{DataResponse, Player, PlayerKey, PlayerPatch, SortQuery};

// GET /nba?sort_age=true - Full table, optionally ordered by age
pub async fn list_players(
    State(state): State<AppState>,
    Validated(query): Validated<SortQuery>,
) -> Json<DataResponse> {
    let table = state.table.read().await;
    let data = table.list(query.sort_age.unwrap_or(false));

    Json(DataResponse { data })
}

// POST /nba - Append a player, 409 if (last, first) is taken
pub async fn insert_player(
    State(state): State<AppState>,
    Validated(player): Validated<Player>,
) -> Result<Json<DataResponse>, ApiError> {
    let key = player.key();
    let data = state.table.write().await.insert(player)?;
    tracing::info!(player = %key, rows = data.len(), "Inserted player");

    Ok(Json(DataResponse { data }))
}

// PUT /nba - Replace the matching row or append a new one
pub async fn upsert_player(
    State(state): State<AppState>,
    Validated(player): Validated<Player>,
) -> Json<DataResponse> {
    let key = player.key();
    let data = state.table.write().await.upsert(player);
    tracing::info!(player = %key, rows = data.len(), "Upserted player");

    Json(DataResponse { data })
}

// DELETE /nba - Remove the first matching row, 404 if absent
pub async fn delete_player(
    State(state): State<AppState>,
    Validated(key): Validated<PlayerKey>,
) -> Result<Json<DataResponse>, ApiError> {
    let data = state.table.write().await.delete(&key)?;
    tracing::info!(player = %key, rows = data.len(), "Deleted player");

    Ok(Json(DataResponse { data }))
}

// PATCH /nba - Overwrite only the supplied stats, 404 if absent
pub async fn patch_player(
    State(state): State<AppState>,
    Validated(patch): Validated<PlayerPatch>,
) -> Result<Json<DataResponse>, ApiError> {
    let data = state.table.write().await.patch(&patch)?;
    tracing::info!(player = %patch.key, "Patched player");

    Ok(Json(DataResponse { data }))
}
