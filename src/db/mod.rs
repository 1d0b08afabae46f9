use std::path::Path;

use thiserror::Error;

use crate::error::DatasetError;
use crate::models::{Player, PlayerKey, PlayerPatch, TableSnapshot};

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("{0} already exists")]
    Conflict(PlayerKey),

    #[error("{0} does not exist")]
    NotFound(PlayerKey),
}

/// Ordered, in-memory player table. Rows are matched by a linear scan on
/// (last, first); the first match wins.
#[derive(Debug, Clone, Default)]
pub struct PlayerTable {
    rows: Vec<Player>,
}

impl PlayerTable {
    pub fn new(rows: Vec<Player>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn position(&self, last: &str, first: &str) -> Option<usize> {
        self.rows.iter().position(|p| p.matches(last, first))
    }

    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            rows: self.rows.clone(),
        }
    }

    /// Full table, optionally ordered by ascending age. Ties keep their
    /// stored order; the table itself is never reordered.
    pub fn list(&self, sort_by_age: bool) -> TableSnapshot {
        let mut snapshot = self.snapshot();
        if sort_by_age {
            snapshot.rows.sort_by(|a, b| a.age.total_cmp(&b.age));
        }
        snapshot
    }

    pub fn insert(&mut self, player: Player) -> Result<TableSnapshot, StoreError> {
        if self.position(&player.last, &player.first).is_some() {
            return Err(StoreError::Conflict(player.key()));
        }

        self.rows.push(player);
        Ok(self.snapshot())
    }

    pub fn upsert(&mut self, player: Player) -> TableSnapshot {
        match self.position(&player.last, &player.first) {
            Some(idx) => self.rows[idx] = player,
            None => self.rows.push(player),
        }

        self.snapshot()
    }

    pub fn delete(&mut self, key: &PlayerKey) -> Result<TableSnapshot, StoreError> {
        let idx = self
            .position(&key.last, &key.first)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;

        self.rows.remove(idx);
        Ok(self.snapshot())
    }

    pub fn patch(&mut self, patch: &PlayerPatch) -> Result<TableSnapshot, StoreError> {
        let idx = self
            .position(&patch.key.last, &patch.key.first)
            .ok_or_else(|| StoreError::NotFound(patch.key.clone()))?;

        patch.apply_to(&mut self.rows[idx]);
        Ok(self.snapshot())
    }
}

/// Read the startup dataset: a JSON array of player rows
pub fn load_players(path: impl AsRef<Path>) -> Result<Vec<Player>, DatasetError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let raw = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: display.clone(),
        source,
    })?;

    parse_players(&raw, &display)
}

fn parse_players(raw: &str, path: &str) -> Result<Vec<Player>, DatasetError> {
    let players: Vec<Player> = serde_json::from_str(raw).map_err(|source| DatasetError::Json {
        path: path.to_string(),
        source,
    })?;

    if let Some((index, player)) = players.iter().enumerate().find(|(_, p)| !p.is_well_formed()) {
        return Err(DatasetError::InvalidRow {
            index,
            player: player.key().to_string(),
        });
    }

    Ok(players)
}
