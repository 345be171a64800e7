use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info};

use crate::{
    core::{event_log::EventLog, session::ScoutSession},
    op::{OP_FORMAT_VERSION, StoredOp},
    types::OpSeq,
};

use super::{OpSink, PersistError, PersistResult, SavedGame};

/// Game journal in a single SQLite file.
///
/// Ops go into an append-only `ops` table keyed by sequence; the teams and
/// clock live in a one-row `game` table that is overwritten on every save.
pub struct SqliteOpSink {
    conn: Connection,
}

impl SqliteOpSink {
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> PersistResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> PersistResult<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    /// Rebuilds the event log by replaying every journaled op.
    pub fn load_log(&self) -> PersistResult<EventLog> {
        let ops = self.ops_after(0)?;
        debug!(replayed = ops.len(), "replaying journal");

        let mut log = EventLog::new();
        for op in ops {
            log.apply_replayed_op(op)?;
        }
        Ok(log)
    }

    /// Teams and clock from the last save, if the game was ever saved.
    pub fn load_game(&self) -> PersistResult<Option<SavedGame>> {
        let payload: Option<String> = self
            .conn
            .query_row("SELECT payload FROM game WHERE id = 1", [], |row| row.get(0))
            .optional()?;
        payload
            .map(|p| serde_json::from_str(&p).map_err(PersistError::from))
            .transpose()
    }

    /// Restores the saved game with its replayed log.
    ///
    /// The clock comes back paused at its saved reading.
    pub fn resume(&self) -> PersistResult<Option<ScoutSession>> {
        let Some(SavedGame { home, away, mut clock }) = self.load_game()? else {
            return Ok(None);
        };
        let log = self.load_log()?;
        clock.pause();
        info!(events = log.len(), at = clock.current_time(), "game resumed from journal");
        Ok(Some(ScoutSession::restore(home, away, log, clock)))
    }

    /// Highest journaled sequence, `0` for an empty journal.
    pub fn latest_seq(&self) -> PersistResult<OpSeq> {
        let seq: Option<i64> = self
            .conn
            .query_row("SELECT MAX(seq) FROM ops", [], |row| row.get(0))?;
        Ok(seq.unwrap_or(0) as OpSeq)
    }

    fn ops_after(&self, seq: OpSeq) -> PersistResult<Vec<StoredOp>> {
        let mut stmt = self.conn.prepare(
            "SELECT seq, ts_ms, format_version, payload FROM ops WHERE seq > ?1 ORDER BY seq",
        )?;
        let rows = stmt
            .query_map(params![seq as i64], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, u16>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(seq, ts_ms, version, payload)| {
                if version != OP_FORMAT_VERSION {
                    return Err(PersistError::UnsupportedFormat(version));
                }
                Ok(StoredOp {
                    seq: seq as OpSeq,
                    ts_ms: ts_ms as u64,
                    op: serde_json::from_str(&payload)?,
                })
            })
            .collect()
    }
}

impl OpSink for SqliteOpSink {
    fn append_ops(&mut self, ops: &[StoredOp]) -> PersistResult<OpSeq> {
        let Some(last) = ops.last() else {
            return self.latest_seq();
        };

        let tx = self.conn.transaction()?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO ops (seq, ts_ms, kind, event_id, format_version, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for stored in ops {
                insert.execute(params![
                    stored.seq as i64,
                    stored.ts_ms as i64,
                    stored.op.kind(),
                    stored.op.event_id().map(|id| id as i64),
                    OP_FORMAT_VERSION,
                    serde_json::to_string(&stored.op)?,
                ])?;
            }
        }
        tx.commit()?;
        Ok(last.seq)
    }

    fn save_game(&mut self, game: &SavedGame) -> PersistResult<()> {
        self.conn.execute(
            "INSERT INTO game (id, saved_at_ms, payload) VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET saved_at_ms = excluded.saved_at_ms, payload = excluded.payload",
            params![Utc::now().timestamp_millis(), serde_json::to_string(game)?],
        )?;
        Ok(())
    }
}
