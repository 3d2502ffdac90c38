//! Persistence collaborator for match snapshots and finished-match records.

mod error;
mod flusher;
mod memory;
mod record;
mod schema;
mod sqlite;

pub use error::StoreError;
pub use flusher::{SnapshotFlusher, spawn_flusher};
pub use memory::MemoryStore;
pub use record::{MatchRecord, MatchResult};
pub use sqlite::SqliteStore;

use crate::matches::{Match, MatchId};

/// Storage for match snapshots and archived results.
///
/// Rooms never wait on [`MatchStore::save`]; it is driven by a per-room
/// flusher. [`MatchStore::append_record`] is awaited when a match finishes.
#[async_trait::async_trait]
pub trait MatchStore: Send + Sync + std::fmt::Debug {
    /// Loads the latest snapshot of a match.
    async fn load(&self, id: &MatchId) -> Result<Option<Match>, StoreError>;

    /// Stores a snapshot, replacing any earlier one.
    async fn save(&self, game: &Match) -> Result<(), StoreError>;

    /// Archives a finished match.
    async fn append_record(&self, game: &Match) -> Result<MatchRecord, StoreError>;

    /// The archived record of one match.
    async fn record(&self, id: &MatchId) -> Result<Option<MatchRecord>, StoreError>;

    /// Most recent records involving `user`, newest first.
    async fn records_for_user(&self, user: &str, limit: usize)
    -> Result<Vec<MatchRecord>, StoreError>;
}
