//! The aggregation engine.
//!
//! Turns the participation stream of a sky into a single [`SkyStats`]. The
//! precomputed summary is the fast path and is authoritative when present;
//! otherwise the same numbers are derived from the raw records joined with
//! their action weights.
//!
//! Store failures never escape this module. The visualisation must always
//! have a renderable value, so errors are logged and absorbed: reads degrade
//! to a zeroed [`SkyStats`] and rejected writes come back as `None`.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::{
  participation::{NewParticipation, ParticipantMeta, WeightedParticipation},
  stats::{SkySnapshot, SkyStats},
  store::SkyStore,
};

/// Default upper bound on a participation comment, in characters.
pub const DEFAULT_MAX_COMMENT_LEN: usize = 500;

/// Tunables for [`Aggregator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorConfig {
  pub max_comment_len: usize,
}

impl Default for AggregatorConfig {
  fn default() -> Self { Self { max_comment_len: DEFAULT_MAX_COMMENT_LEN } }
}

/// Computes and records participation for skies held in a [`SkyStore`].
///
/// Cloning is cheap; the store is reference-counted.
pub struct Aggregator<S> {
  store:  Arc<S>,
  config: AggregatorConfig,
}

impl<S> Clone for Aggregator<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), config: self.config }
  }
}

impl<S: SkyStore> Aggregator<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self::with_config(store, AggregatorConfig::default())
  }

  pub fn with_config(store: Arc<S>, config: AggregatorConfig) -> Self {
    Self { store, config }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn config(&self) -> AggregatorConfig { self.config }

  /// Weighted score, record count and freshness of `sky_id`.
  ///
  /// Never fails: a store outage yields [`SkyStats::zero`].
  pub async fn compute_stats(&self, sky_id: &str) -> SkyStats {
    match self.store.summary_read(sky_id).await {
      Ok(Some(row)) => match row.clone().into_stats(sky_id) {
        Some(stats) => return stats,
        None => warn!(sky_id, ?row, "malformed sky summary; recomputing"),
      },
      Ok(None) => debug!(sky_id, "no precomputed summary; recomputing"),
      Err(e) => warn!(sky_id, error = %e, "summary read failed; recomputing"),
    }

    match self.store.participations_with_weights(sky_id).await {
      Ok(rows) => derive_stats(sky_id, &rows),
      Err(e) => {
        error!(sky_id, error = %e, "participation read failed; reporting zero");
        SkyStats::zero(sky_id)
      }
    }
  }

  /// Validate and append one participation, then return the fresh stats for
  /// its sky.
  ///
  /// Returns `None` without writing anything when the action key is not in
  /// the sky's registry, when the comment is too long, or when the store
  /// fails.
  pub async fn record_participation(
    &self,
    input: NewParticipation,
  ) -> Option<SkyStats> {
    let input = input.normalized();

    let action = match self
      .store
      .action_lookup(&input.sky_id, &input.action_key)
      .await
    {
      Ok(Some(action)) => action,
      Ok(None) => {
        info!(
          sky_id = %input.sky_id,
          action_key = %input.action_key,
          "rejected participation: unknown action"
        );
        return None;
      }
      Err(e) => {
        warn!(sky_id = %input.sky_id, error = %e, "action lookup failed");
        return None;
      }
    };

    if let Some(comment) = &input.comment
      && comment.chars().count() > self.config.max_comment_len
    {
      info!(
        sky_id = %input.sky_id,
        max = self.config.max_comment_len,
        "rejected participation: comment too long"
      );
      return None;
    }

    let sky_id = input.sky_id.clone();
    match self.store.insert_participation(input).await {
      Ok(p) => debug!(
        sky_id = %sky_id,
        participation_id = %p.participation_id,
        weight = action.weight,
        "recorded participation"
      ),
      Err(e) => {
        error!(sky_id = %sky_id, error = %e, "participation insert failed");
        return None;
      }
    }

    Some(self.compute_stats(&sky_id).await)
  }

  /// Participant metadata for colouring and labelling, oldest first.
  /// A failed read degrades to an empty list.
  pub async fn participants(&self, sky_id: &str, limit: usize) -> Vec<ParticipantMeta> {
    self
      .store
      .list_participants(sky_id, limit)
      .await
      .unwrap_or_else(|e| {
        warn!(sky_id, error = %e, "participant read failed; labels degrade");
        Vec::new()
      })
  }

  /// Stats and participant metadata in one value, for a reseed.
  pub async fn snapshot(&self, sky_id: &str, limit: usize) -> SkySnapshot {
    let stats = self.compute_stats(sky_id).await;
    let participants = self.participants(sky_id, limit).await;
    SkySnapshot { stats, participants }
  }
}

/// Recompute stats from raw rows. An inconsistent join (no weight) counts as
/// weight 1; an empty sky is stamped with the current time.
pub fn derive_stats(sky_id: &str, rows: &[WeightedParticipation]) -> SkyStats {
  let total_stars = rows
    .iter()
    .map(|r| u64::from(r.weight.unwrap_or(1)))
    .sum();
  let updated_at = rows
    .iter()
    .map(|r| r.created_at)
    .max()
    .unwrap_or_else(Utc::now);

  SkyStats {
    sky_id: sky_id.to_owned(),
    total_stars,
    total_actions: rows.len() as u64,
    updated_at,
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use chrono::{DateTime, Duration, Utc};
  use uuid::Uuid;

  use super::*;
  use crate::{
    action::{ActionDef, Phase},
    participation::Participation,
    sky::Sky,
    stats::SummaryRow,
  };

  #[derive(Debug, thiserror::Error)]
  #[error("store offline")]
  struct Offline;

  /// In-memory store with switchable failures.
  #[derive(Default)]
  struct FakeStore {
    actions:     Vec<ActionDef>,
    rows:        Mutex<Vec<Participation>>,
    summary:     Option<SummaryRow>,
    fail_reads:  bool,
    fail_insert: bool,
  }

  impl FakeStore {
    fn with_actions(weights: &[(&str, u32)]) -> Self {
      Self {
        actions: weights
          .iter()
          .map(|(k, w)| ActionDef::new("demo", *k, *k, Phase::Day).with_weight(*w))
          .collect(),
        ..Self::default()
      }
    }

    fn count(&self) -> usize { self.rows.lock().unwrap().len() }
  }

  impl SkyStore for FakeStore {
    type Error = Offline;

    async fn create_sky(&self, sky_id: String, title: String) -> Result<Sky, Offline> {
      Ok(Sky { sky_id, title, created_at: Utc::now() })
    }

    async fn get_sky(&self, _sky_id: &str) -> Result<Option<Sky>, Offline> { Ok(None) }

    async fn list_skies(&self) -> Result<Vec<Sky>, Offline> { Ok(Vec::new()) }

    async fn define_action(&self, def: ActionDef) -> Result<ActionDef, Offline> { Ok(def) }

    async fn list_actions(&self, _sky_id: &str) -> Result<Vec<ActionDef>, Offline> {
      Ok(self.actions.clone())
    }

    async fn action_lookup(
      &self,
      sky_id: &str,
      key: &str,
    ) -> Result<Option<ActionDef>, Offline> {
      Ok(
        self
          .actions
          .iter()
          .find(|a| a.sky_id == sky_id && a.key == key)
          .cloned(),
      )
    }

    async fn summary_read(&self, _sky_id: &str) -> Result<Option<SummaryRow>, Offline> {
      if self.fail_reads {
        return Err(Offline);
      }
      Ok(self.summary.clone())
    }

    async fn participations_with_weights(
      &self,
      sky_id: &str,
    ) -> Result<Vec<WeightedParticipation>, Offline> {
      if self.fail_reads {
        return Err(Offline);
      }
      let rows = self.rows.lock().unwrap();
      Ok(
        rows
          .iter()
          .filter(|p| p.sky_id == sky_id)
          .map(|p| WeightedParticipation {
            action_key: p.action_key.clone(),
            weight:     self
              .actions
              .iter()
              .find(|a| a.key == p.action_key)
              .map(|a| a.weight),
            created_at: p.created_at,
          })
          .collect(),
      )
    }

    async fn insert_participation(
      &self,
      input: NewParticipation,
    ) -> Result<Participation, Offline> {
      if self.fail_insert {
        return Err(Offline);
      }
      let p = Participation {
        participation_id: Uuid::new_v4(),
        sky_id:           input.sky_id,
        action_key:       input.action_key,
        name:             input.name,
        email:            input.email,
        comment:          input.comment,
        created_at:       Utc::now(),
      };
      self.rows.lock().unwrap().push(p.clone());
      Ok(p)
    }

    async fn list_participants(
      &self,
      _sky_id: &str,
      _limit: usize,
    ) -> Result<Vec<ParticipantMeta>, Offline> {
      Err(Offline)
    }
  }

  fn aggregator(store: FakeStore) -> Aggregator<FakeStore> {
    Aggregator::new(Arc::new(store))
  }

  #[tokio::test]
  async fn empty_sky_reports_zero() {
    let agg = aggregator(FakeStore::default());
    let stats = agg.compute_stats("demo").await;
    assert_eq!((stats.total_stars, stats.total_actions), (0, 0));
  }

  #[tokio::test]
  async fn weights_are_summed_and_records_counted() {
    let agg = aggregator(FakeStore::with_actions(&[("flyer", 1), ("march", 2)]));
    for key in ["flyer", "march", "flyer"] {
      assert!(agg.record_participation(NewParticipation::new("demo", key)).await.is_some());
    }

    let stats = agg.compute_stats("demo").await;
    assert_eq!(stats.total_stars, 4);
    assert_eq!(stats.total_actions, 3);
  }

  #[tokio::test]
  async fn compute_stats_is_idempotent_without_writes() {
    let agg = aggregator(FakeStore::with_actions(&[("march", 2)]));
    agg.record_participation(NewParticipation::new("demo", "march")).await;

    let a = agg.compute_stats("demo").await;
    let b = agg.compute_stats("demo").await;
    assert_eq!((a.total_stars, a.total_actions), (b.total_stars, b.total_actions));
  }

  #[tokio::test]
  async fn well_formed_summary_is_returned_verbatim() {
    let at = Utc::now() - Duration::hours(1);
    let store = FakeStore {
      summary: Some(SummaryRow { total_stars: 90, total_actions: 41, updated_at: Some(at) }),
      ..FakeStore::with_actions(&[("flyer", 1)])
    };
    let stats = aggregator(store).compute_stats("demo").await;
    assert_eq!(stats.total_stars, 90);
    assert_eq!(stats.total_actions, 41);
    assert_eq!(stats.updated_at, at);
  }

  #[tokio::test]
  async fn malformed_summary_falls_back_to_derived() {
    let store = FakeStore {
      summary: Some(SummaryRow { total_stars: -5, total_actions: 1, updated_at: None }),
      ..FakeStore::with_actions(&[("march", 3)])
    };
    let agg = aggregator(store);
    agg.record_participation(NewParticipation::new("demo", "march")).await;

    let stats = agg.compute_stats("demo").await;
    assert_eq!(stats.total_stars, 3);
  }

  #[tokio::test]
  async fn store_outage_yields_zero_instead_of_error() {
    let store = FakeStore { fail_reads: true, ..FakeStore::default() };
    let stats = aggregator(store).compute_stats("demo").await;
    assert_eq!(stats.total_stars, 0);
    assert_eq!(stats.sky_id, "demo");
  }

  #[tokio::test]
  async fn unknown_action_is_rejected_without_write() {
    let agg = aggregator(FakeStore::with_actions(&[("flyer", 1)]));
    let result = agg.record_participation(NewParticipation::new("demo", "nope")).await;
    assert!(result.is_none());
    assert_eq!(agg.store().count(), 0);
  }

  #[tokio::test]
  async fn oversize_comment_is_rejected_without_write() {
    let agg = Aggregator::with_config(
      Arc::new(FakeStore::with_actions(&[("flyer", 1)])),
      AggregatorConfig { max_comment_len: 10 },
    );
    let input = NewParticipation::new("demo", "flyer").with_comment("ü".repeat(11));
    assert!(agg.record_participation(input).await.is_none());
    assert_eq!(agg.store().count(), 0);

    let at_limit = NewParticipation::new("demo", "flyer").with_comment("ü".repeat(10));
    assert!(agg.record_participation(at_limit).await.is_some());
  }

  #[tokio::test]
  async fn successful_record_raises_score_by_action_weight() {
    let agg = aggregator(FakeStore::with_actions(&[("flyer", 1), ("host", 5)]));
    agg.record_participation(NewParticipation::new("demo", "flyer")).await;
    let before = agg.compute_stats("demo").await;

    let after = agg
      .record_participation(NewParticipation::new("demo", "host").with_name("Ada"))
      .await
      .unwrap();
    assert_eq!(after.total_stars, before.total_stars + 5);
    assert_eq!(after.total_actions, before.total_actions + 1);
  }

  #[tokio::test]
  async fn failed_insert_returns_none() {
    let store = FakeStore { fail_insert: true, ..FakeStore::with_actions(&[("flyer", 1)]) };
    let agg = aggregator(store);
    assert!(agg.record_participation(NewParticipation::new("demo", "flyer")).await.is_none());
  }

  #[tokio::test]
  async fn snapshot_survives_participant_read_failure() {
    let agg = aggregator(FakeStore::with_actions(&[("flyer", 1)]));
    agg.record_participation(NewParticipation::new("demo", "flyer")).await;
    let snap = agg.snapshot("demo", 500).await;
    assert_eq!(snap.stats.total_stars, 1);
    assert!(snap.participants.is_empty());
  }

  #[test]
  fn derive_counts_missing_weight_as_one_and_takes_latest_timestamp() {
    let t0: DateTime<Utc> = Utc::now() - Duration::minutes(5);
    let t1 = t0 + Duration::minutes(2);
    let rows = vec![
      WeightedParticipation { action_key: "a".into(), weight: Some(2), created_at: t1 },
      WeightedParticipation { action_key: "gone".into(), weight: None, created_at: t0 },
    ];
    let stats = derive_stats("demo", &rows);
    assert_eq!(stats.total_stars, 3);
    assert_eq!(stats.total_actions, 2);
    assert_eq!(stats.updated_at, t1);
  }
}
