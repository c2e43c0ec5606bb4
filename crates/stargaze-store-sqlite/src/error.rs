//! Error type for `stargaze-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] stargaze_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("sky not found: {0}")]
  SkyNotFound(String),

  #[error("sky already exists: {0}")]
  SkyExists(String),

  #[error("action {key:?} already defined in sky {sky_id:?}")]
  ActionExists { sky_id: String, key: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
