use thiserror::Error;

/// Errors that abort startup. Steady-state event handling never returns these.
#[derive(Debug, Error)]
pub enum StartupError {
  #[error("ledger setup failed: {0}")]
  Database(#[from] admintime_db::DbError),

  #[error("failed to read admin directory: {0}")]
  DirectoryRead(#[from] std::io::Error),

  #[error("failed to parse admin directory: {0}")]
  DirectoryParse(#[from] serde_json::Error),

  #[error("server id must not be empty")]
  EmptyServerId,
}
