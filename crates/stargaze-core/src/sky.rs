//! Sky: a named context whose participation is aggregated and visualised
//! independently of every other sky.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Longest accepted sky key.
pub const MAX_SKY_ID_LEN: usize = 64;

/// Check that `id` is a usable sky key: non-empty, at most
/// [`MAX_SKY_ID_LEN`] characters of `[a-z0-9_-]`.
pub fn validate_sky_id(id: &str) -> Result<()> {
  let valid = !id.is_empty()
    && id.len() <= MAX_SKY_ID_LEN
    && id
      .bytes()
      .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_');
  if valid {
    Ok(())
  } else {
    Err(Error::InvalidSkyId(id.to_owned()))
  }
}

/// A campaign or event. Created once by an administrator; never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sky {
  pub sky_id:     String,
  pub title:      String,
  pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accepts_slug_keys() {
    assert!(validate_sky_id("climate-week_2024").is_ok());
    assert!(validate_sky_id("a").is_ok());
  }

  #[test]
  fn rejects_empty_uppercase_and_long_keys() {
    assert!(validate_sky_id("").is_err());
    assert!(validate_sky_id("Main").is_err());
    assert!(validate_sky_id("has space").is_err());
    assert!(validate_sky_id(&"x".repeat(MAX_SKY_ID_LEN + 1)).is_err());
  }
}
