mod error;
mod models;

pub use error::{DbError, Result};
pub use models::{AdminTimeRecord, ONLINE_SENTINEL};

use std::time::Duration;
use tokio_rusqlite::Connection;
use tokio_rusqlite::rusqlite::{self, OptionalExtension, params};
use tracing::{debug, info};

/// How long a statement waits on a lock held by another connection
/// (e.g. a second instance running the schema setup) before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Durable per-(admin, server) time accounting.
///
/// Every mutation is a single SQL statement, so concurrent or duplicated
/// calls for the same key cannot corrupt the counters.
#[derive(Clone)]
pub struct Ledger {
  conn: Connection,
}

impl Ledger {
  /// Open or create the ledger at the given path (or SQLite URI).
  /// Fails fast if the connection string is empty.
  pub async fn open(connection_string: &str) -> Result<Self> {
    if connection_string.trim().is_empty() {
      return Err(DbError::EmptyConnectionString);
    }
    let conn = Connection::open(connection_string)
      .await
      .map_err(DbError::Sqlite)?;
    let ledger = Self { conn };
    ledger.initialize().await?;
    Ok(ledger)
  }

  /// Create an in-memory ledger (useful for testing).
  pub async fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .await
      .map_err(DbError::Sqlite)?;
    let ledger = Self { conn };
    ledger.initialize().await?;
    Ok(ledger)
  }

  /// Create the schema if it does not exist. Safe to run on every startup.
  pub async fn initialize(&self) -> Result<()> {
    self.conn
            .call(|conn| -> rusqlite::Result<()> {
                conn.busy_timeout(BUSY_TIMEOUT)?;

                // WAL lets readers proceed while the tracker writes
                conn.pragma_update(None, "journal_mode", "WAL")?;

                conn.execute_batch(
                    r#"
                    -- disconnect_time = -1 means the admin is online
                    CREATE TABLE IF NOT EXISTS admin_time (
                        id INTEGER PRIMARY KEY AUTOINCREMENT,
                        admin_id TEXT NOT NULL,
                        admin_name TEXT NOT NULL,
                        connect_time INTEGER NOT NULL,
                        disconnect_time INTEGER NOT NULL DEFAULT -1,
                        played_time INTEGER NOT NULL DEFAULT 0,
                        spectator_time INTEGER NOT NULL DEFAULT 0,
                        server_id TEXT NOT NULL,
                        UNIQUE(admin_id, server_id)
                    );
                    "#,
                )?;
                Ok(())
            })
            .await?;

    info!("admin time schema initialized");
    Ok(())
  }

  /// Mark an admin as connected.
  ///
  /// Creates the record on first connect. On an existing record this
  /// overwrites the name and connect time and resets the online sentinel,
  /// leaving `played_time` alone: an open session that never saw a
  /// disconnect loses its interval.
  pub async fn record_connect(
    &self,
    admin_id: String,
    admin_name: String,
    server_id: String,
    at: i64,
  ) -> Result<()> {
    let admin_id_log = admin_id.clone();

    self
      .conn
      .call(move |conn| -> rusqlite::Result<()> {
        conn
          .prepare_cached(
            r#"
            INSERT INTO admin_time (admin_id, admin_name, connect_time, server_id)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(admin_id, server_id) DO UPDATE SET
                admin_name = excluded.admin_name,
                connect_time = excluded.connect_time,
                disconnect_time = -1
            "#,
          )?
          .execute(params![&admin_id, &admin_name, at, &server_id])?;
        Ok(())
      })
      .await?;

    debug!(admin_id = %admin_id_log, at, "recorded admin connect");
    Ok(())
  }

  /// Mark an admin as disconnected and add the session length to `played_time`.
  ///
  /// Only applies while the record is online, so duplicate disconnects are
  /// counted once. Returns whether a record transitioned to offline.
  pub async fn record_disconnect(&self, admin_id: String, server_id: String, at: i64) -> Result<bool> {
    let admin_id_log = admin_id.clone();

    let changed = self
      .conn
      .call(move |conn| -> rusqlite::Result<usize> {
        conn
          .prepare_cached(
            r#"
            UPDATE admin_time
            SET disconnect_time = ?3,
                played_time = played_time + MAX(?3 - connect_time, 0)
            WHERE admin_id = ?1 AND server_id = ?2 AND disconnect_time = -1
            "#,
          )?
          .execute(params![&admin_id, &server_id, at])
      })
      .await?;

    if changed == 0 {
      debug!(admin_id = %admin_id_log, "disconnect ignored, no online record");
    } else {
      debug!(admin_id = %admin_id_log, at, "recorded admin disconnect");
    }
    Ok(changed > 0)
  }

  /// Add spectator seconds to an existing record.
  ///
  /// Never creates a record. Returns whether a record matched.
  pub async fn add_spectator_time(
    &self,
    admin_id: String,
    server_id: String,
    seconds: i64,
  ) -> Result<bool> {
    let admin_id_log = admin_id.clone();
    let seconds = seconds.max(0);

    let changed = self
      .conn
      .call(move |conn| -> rusqlite::Result<usize> {
        conn
          .prepare_cached(
            "UPDATE admin_time SET spectator_time = spectator_time + ?3 WHERE admin_id = ?1 AND server_id = ?2",
          )?
          .execute(params![&admin_id, &server_id, seconds])
      })
      .await?;

    if changed == 0 {
      debug!(admin_id = %admin_id_log, seconds, "spectator time ignored, no record");
    } else {
      debug!(admin_id = %admin_id_log, seconds, "added spectator time");
    }
    Ok(changed > 0)
  }

  /// Get the record for an admin on a server.
  /// Returns None if the admin never connected there.
  pub async fn get_record(
    &self,
    admin_id: String,
    server_id: String,
  ) -> Result<Option<AdminTimeRecord>> {
    let record = self
      .conn
      .call(move |conn| -> rusqlite::Result<Option<AdminTimeRecord>> {
        conn
          .prepare_cached(
            r#"
            SELECT id, admin_id, admin_name, connect_time, disconnect_time,
                   played_time, spectator_time, server_id
            FROM admin_time
            WHERE admin_id = ?1 AND server_id = ?2
            "#,
          )?
          .query_row(params![&admin_id, &server_id], |row| {
            Ok(AdminTimeRecord {
              id: row.get(0)?,
              admin_id: row.get(1)?,
              admin_name: row.get(2)?,
              connect_time: row.get(3)?,
              disconnect_time: row.get(4)?,
              played_time: row.get(5)?,
              spectator_time: row.get(6)?,
              server_id: row.get(7)?,
            })
          })
          .optional()
      })
      .await?;

    Ok(record)
  }
}
