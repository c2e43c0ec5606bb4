//! Error types for `stargaze-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid sky id: {0:?}")]
  InvalidSkyId(String),

  #[error("invalid action key: {0:?}")]
  InvalidActionKey(String),

  #[error("action weight must be at least 1, got {0}")]
  InvalidWeight(u32),

  #[error("unknown phase: {0:?}")]
  UnknownPhase(String),

  #[error("unknown action kind: {0:?}")]
  UnknownActionKind(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
