use std::sync::Arc;

use anyhow::{Context, Result};
use game_types::{GameRecord, HISTORY_LIMIT};

use crate::store::KeyValueStore;

pub const HISTORY_KEY: &str = "imposter-game-history";

/// Reads and writes the bounded match history as JSON under one fixed key.
#[derive(Clone)]
pub struct HistoryRepository {
    store: Arc<dyn KeyValueStore>,
}

impl HistoryRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored history, oldest first. Empty when nothing was saved yet.
    pub async fn load(&self) -> Result<Vec<GameRecord>> {
        let Some(raw) = self.store.get(HISTORY_KEY).await? else {
            return Ok(Vec::new());
        };

        let records: Vec<GameRecord> =
            serde_json::from_str(&raw).context("Stored game history is not valid JSON")?;
        Ok(records)
    }

    /// Replace the stored history with the most recent games of `records`.
    pub async fn save(&self, records: &[GameRecord]) -> Result<()> {
        let start = records.len().saturating_sub(HISTORY_LIMIT);
        let value = serde_json::to_string(&records[start..])?;
        self.store.set(HISTORY_KEY, value).await?;

        tracing::info!("Saved {} games to history", records.len() - start);
        Ok(())
    }
}
