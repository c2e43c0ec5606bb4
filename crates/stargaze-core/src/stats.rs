//! Aggregate statistics for a sky.
//!
//! [`SkyStats`] is derived, never stored by the core. It is either read
//! verbatim from a precomputed summary or recomputed in full from the
//! participation records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::participation::ParticipantMeta;

/// A precomputed summary row as the store holds it. Not yet trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
  pub total_stars:   i64,
  pub total_actions: i64,
  pub updated_at:    Option<DateTime<Utc>>,
}

impl SummaryRow {
  /// Convert to [`SkyStats`] if the row is well-formed: non-negative totals
  /// and a timestamp.
  pub fn into_stats(self, sky_id: &str) -> Option<SkyStats> {
    let total_stars = u64::try_from(self.total_stars).ok()?;
    let total_actions = u64::try_from(self.total_actions).ok()?;
    Some(SkyStats {
      sky_id: sky_id.to_owned(),
      total_stars,
      total_actions,
      updated_at: self.updated_at?,
    })
  }
}

/// Weighted score, record count and freshness of one sky.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkyStats {
  pub sky_id:        String,
  /// Sum of action weights over every participation in the sky.
  pub total_stars:   u64,
  /// Number of participations in the sky.
  pub total_actions: u64,
  pub updated_at:    DateTime<Utc>,
}

impl SkyStats {
  /// The always-renderable fallback value.
  pub fn zero(sky_id: impl Into<String>) -> Self {
    Self {
      sky_id:        sky_id.into(),
      total_stars:   0,
      total_actions: 0,
      updated_at:    Utc::now(),
    }
  }
}

/// Everything the visualisation needs for one reseed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkySnapshot {
  pub stats:        SkyStats,
  /// Oldest first, so index `i` always names the same participation.
  #[serde(default)]
  pub participants: Vec<ParticipantMeta>,
}

impl SkySnapshot {
  pub fn empty(sky_id: impl Into<String>) -> Self {
    Self { stats: SkyStats::zero(sky_id), participants: Vec::new() }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn negative_or_undated_summary_is_malformed() {
    let now = Utc::now();
    let bad_total = SummaryRow { total_stars: -1, total_actions: 2, updated_at: Some(now) };
    assert!(bad_total.into_stats("demo").is_none());

    let undated = SummaryRow { total_stars: 4, total_actions: 3, updated_at: None };
    assert!(undated.into_stats("demo").is_none());

    let good = SummaryRow { total_stars: 4, total_actions: 3, updated_at: Some(now) };
    let stats = good.into_stats("demo").unwrap();
    assert_eq!((stats.total_stars, stats.total_actions), (4, 3));
  }
}
