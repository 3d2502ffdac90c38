//! SQLite store backed by diesel.

use super::{MatchRecord, MatchResult, MatchStore, StoreError, schema};
use crate::matches::{Match, MatchId, MatchMode, MatchType, Winner};
use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use std::str::FromStr;
use tracing::{debug, info, instrument};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Latest snapshot of a match.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = schema::matches)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct MatchRow {
    id: String,
    status: String,
    snapshot: String,
    updated_at: NaiveDateTime,
}

/// Archived record of a finished match.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = schema::match_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct RecordRow {
    match_id: String,
    mode: String,
    match_type: String,
    player1: String,
    player2: String,
    winner: i32,
    result: String,
    total_moves: i32,
    duration_secs: i64,
    move_log: String,
    finished_at: NaiveDateTime,
}

impl RecordRow {
    fn from_record(record: &MatchRecord) -> Result<Self, StoreError> {
        Ok(Self {
            match_id: record.match_id().to_string(),
            mode: record.mode().to_string(),
            match_type: record.match_type().to_string(),
            player1: record.player1().clone(),
            player2: record.player2().clone(),
            winner: i32::from(u8::from(*record.winner())),
            result: record.result().to_string(),
            total_moves: i32::try_from(*record.total_moves())
                .map_err(|e| StoreError::new(format!("Move count overflow: {}", e)))?,
            duration_secs: *record.duration_secs(),
            move_log: serde_json::to_string(record.move_log())?,
            finished_at: record.finished_at().naive_utc(),
        })
    }

    fn into_record(self) -> Result<MatchRecord, StoreError> {
        let parse_err = |what: &str, value: &str| StoreError::new(format!("Invalid {} '{}'", what, value));
        let mode = MatchMode::from_str(&self.mode).map_err(|_| parse_err("mode", &self.mode))?;
        let match_type = MatchType::from_str(&self.match_type)
            .map_err(|_| parse_err("match type", &self.match_type))?;
        let winner = u8::try_from(self.winner)
            .ok()
            .and_then(|n| Winner::try_from(n).ok())
            .ok_or_else(|| parse_err("winner", &self.winner.to_string()))?;
        let result =
            MatchResult::from_str(&self.result).map_err(|_| parse_err("result", &self.result))?;

        Ok(MatchRecord::from_parts(
            MatchId::new(self.match_id),
            mode,
            match_type,
            self.player1,
            self.player2,
            winner,
            result,
            self.duration_secs,
            serde_json::from_str(&self.move_log)?,
            DateTime::from_naive_utc_and_offset(self.finished_at, Utc),
        ))
    }
}

/// Match store in a SQLite file. Every call opens its own connection on
/// the blocking pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: String,
}

impl SqliteStore {
    /// Opens the database at `db_path` and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path.as_ref()))]
    pub fn open(db_path: impl AsRef<str>) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref().to_string();
        let mut conn = establish(&db_path)?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::new(format!("Migrations failed: {}", e)))?;
        info!(path = %db_path, migrations = applied.len(), "SQLite store ready");
        Ok(Self { db_path })
    }

    /// Runs `op` with a fresh connection on the blocking pool.
    async fn with_conn<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T, StoreError> + Send + 'static,
    {
        let path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = establish(&path)?;
            op(&mut conn)
        })
        .await?
    }
}

fn establish(path: &str) -> Result<SqliteConnection, StoreError> {
    debug!(path, "Establishing connection");
    SqliteConnection::establish(path)
        .map_err(|e| StoreError::new(format!("Failed to connect to '{}': {}", path, e)))
}

#[async_trait::async_trait]
impl MatchStore for SqliteStore {
    #[instrument(skip(self))]
    async fn load(&self, id: &MatchId) -> Result<Option<Match>, StoreError> {
        let id = id.to_string();
        let row = self
            .with_conn(move |conn| {
                Ok(schema::matches::table
                    .find(id)
                    .select(MatchRow::as_select())
                    .first(conn)
                    .optional()?)
            })
            .await?;

        row.map(|r| serde_json::from_str(&r.snapshot).map_err(StoreError::from))
            .transpose()
    }

    #[instrument(skip(self, game), fields(match_id = %game.id, status = %game.status))]
    async fn save(&self, game: &Match) -> Result<(), StoreError> {
        let row = MatchRow {
            id: game.id.to_string(),
            status: game.status.to_string(),
            snapshot: serde_json::to_string(game)?,
            updated_at: Utc::now().naive_utc(),
        };
        self.with_conn(move |conn| {
            diesel::replace_into(schema::matches::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
        .await?;
        debug!("Snapshot saved");
        Ok(())
    }

    #[instrument(skip(self, game), fields(match_id = %game.id))]
    async fn append_record(&self, game: &Match) -> Result<MatchRecord, StoreError> {
        let record = MatchRecord::from_finished(game)?;
        let row = RecordRow::from_record(&record)?;
        self.with_conn(move |conn| {
            diesel::replace_into(schema::match_records::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
        .await?;
        info!(result = %record.result(), total_moves = record.total_moves(), "Record archived");
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn record(&self, id: &MatchId) -> Result<Option<MatchRecord>, StoreError> {
        let id = id.to_string();
        let row = self
            .with_conn(move |conn| {
                Ok(schema::match_records::table
                    .find(id)
                    .select(RecordRow::as_select())
                    .first(conn)
                    .optional()?)
            })
            .await?;
        row.map(RecordRow::into_record).transpose()
    }

    #[instrument(skip(self))]
    async fn records_for_user(
        &self,
        user: &str,
        limit: usize,
    ) -> Result<Vec<MatchRecord>, StoreError> {
        use schema::match_records::dsl;

        let user = user.to_string();
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = self
            .with_conn(move |conn| {
                Ok(dsl::match_records
                    .filter(dsl::player1.eq(&user).or(dsl::player2.eq(&user)))
                    .order(dsl::finished_at.desc())
                    .limit(limit)
                    .select(RecordRow::as_select())
                    .load(conn)?)
            })
            .await?;

        debug!(count = rows.len(), "Records loaded");
        rows.into_iter().map(RecordRow::into_record).collect()
    }
}
