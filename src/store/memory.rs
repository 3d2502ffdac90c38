//! In-process store.

use super::{MatchRecord, MatchStore, StoreError};
use crate::matches::{Match, MatchId};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

#[derive(Debug, Default)]
struct Inner {
    matches: HashMap<MatchId, Match>,
    records: HashMap<MatchId, MatchRecord>,
}

/// Keeps everything in memory. Lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl MatchStore for MemoryStore {
    #[instrument(skip(self))]
    async fn load(&self, id: &MatchId) -> Result<Option<Match>, StoreError> {
        Ok(self.inner.read().await.matches.get(id).cloned())
    }

    #[instrument(skip(self, game), fields(match_id = %game.id))]
    async fn save(&self, game: &Match) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .matches
            .insert(game.id.clone(), game.clone());
        debug!("Snapshot saved");
        Ok(())
    }

    #[instrument(skip(self, game), fields(match_id = %game.id))]
    async fn append_record(&self, game: &Match) -> Result<MatchRecord, StoreError> {
        let record = MatchRecord::from_finished(game)?;
        self.inner
            .write()
            .await
            .records
            .insert(game.id.clone(), record.clone());
        debug!(result = %record.result(), "Record archived");
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn record(&self, id: &MatchId) -> Result<Option<MatchRecord>, StoreError> {
        Ok(self.inner.read().await.records.get(id).cloned())
    }

    #[instrument(skip(self))]
    async fn records_for_user(
        &self,
        user: &str,
        limit: usize,
    ) -> Result<Vec<MatchRecord>, StoreError> {
        let inner = self.inner.read().await;
        let mut records: Vec<MatchRecord> = inner
            .records
            .values()
            .filter(|r| r.involves(user))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.finished_at().cmp(a.finished_at()));
        records.truncate(limit);
        Ok(records)
    }
}
