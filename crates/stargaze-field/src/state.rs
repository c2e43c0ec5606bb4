//! The owned state of one sky's visualisation.
//!
//! [`SkyState`] holds everything a render context needs between frames: the
//! latest stats and participant metadata, the generated [`Field`] and the
//! viewport it was generated for. It is the single writer of the field;
//! reseeds swap the whole field at once, so the animator always sees a
//! complete point set. Observers follow the stats through a watch channel.

use rand::{SeedableRng, rngs::StdRng};
use stargaze_core::{
  participation::ParticipantMeta,
  stats::{SkySnapshot, SkyStats},
};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
  generate::{self, Field, FieldConfig},
  geometry::Viewport,
};

/// What happens to stars already on screen when new data arrives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReseedPolicy {
  /// Throw the field away and generate a new one.
  #[default]
  Regenerate,
  /// Keep placed stars where they are; only add, recolour and relabel.
  /// Constellations are placed again when the grid gains a row.
  Preserve,
}

pub struct SkyState {
  sky_id:       String,
  stats:        SkyStats,
  participants: Vec<ParticipantMeta>,
  field:        Field,
  config:       FieldConfig,
  policy:       ReseedPolicy,
  rng:          StdRng,
  notify:       watch::Sender<SkyStats>,
}

impl SkyState {
  pub fn new(
    sky_id: impl Into<String>,
    viewport: Viewport,
    config: FieldConfig,
    policy: ReseedPolicy,
  ) -> Self {
    Self::with_rng(sky_id, viewport, config, policy, StdRng::from_entropy())
  }

  /// A zero-score sky: ambient stars only.
  pub fn with_rng(
    sky_id: impl Into<String>,
    viewport: Viewport,
    config: FieldConfig,
    policy: ReseedPolicy,
    mut rng: StdRng,
  ) -> Self {
    let sky_id = sky_id.into();
    let stats = SkyStats::zero(sky_id.clone());
    let field = generate::seed_with(0, &[], viewport, &config, &mut rng);
    let (notify, _) = watch::channel(stats.clone());
    Self {
      sky_id,
      stats,
      participants: Vec::new(),
      field,
      config,
      policy,
      rng,
      notify,
    }
  }

  pub fn sky_id(&self) -> &str { &self.sky_id }

  pub fn stats(&self) -> &SkyStats { &self.stats }

  pub fn participants(&self) -> &[ParticipantMeta] { &self.participants }

  pub fn field(&self) -> &Field { &self.field }

  /// Mutable access for the animator, which advances twinkle phases.
  pub fn field_mut(&mut self) -> &mut Field { &mut self.field }

  pub fn viewport(&self) -> Viewport { self.field.viewport }

  pub fn policy(&self) -> ReseedPolicy { self.policy }

  pub fn set_policy(&mut self, policy: ReseedPolicy) { self.policy = policy; }

  /// Observe stats changes. The receiver starts at the current value.
  pub fn subscribe(&self) -> watch::Receiver<SkyStats> { self.notify.subscribe() }

  /// Take a new snapshot and reseed. Snapshots for another sky are ignored.
  pub fn apply(&mut self, snapshot: SkySnapshot) {
    if snapshot.stats.sky_id != self.sky_id {
      warn!(
        expected = %self.sky_id,
        got = %snapshot.stats.sky_id,
        "ignoring snapshot for another sky"
      );
      return;
    }
    self.stats = snapshot.stats;
    self.participants = snapshot.participants;
    self.reseed(self.field.viewport);
    debug!(
      sky_id = %self.sky_id,
      total_stars = self.stats.total_stars,
      points = self.field.points.len(),
      "reseeded"
    );
    self.notify.send_replace(self.stats.clone());
  }

  /// Regenerate for a new surface size. A no-op when the size is unchanged.
  pub fn resize(&mut self, viewport: Viewport) {
    if viewport != self.field.viewport {
      self.reseed(viewport);
    }
  }

  /// Apply the latest value from a refresh loop, if it has not been seen.
  /// Returns whether a reseed happened.
  pub fn poll(&mut self, updates: &mut watch::Receiver<Option<SkySnapshot>>) -> bool {
    if !matches!(updates.has_changed(), Ok(true)) {
      return false;
    }
    let Some(snapshot) = updates.borrow_and_update().clone() else {
      return false;
    };
    self.apply(snapshot);
    true
  }

  fn reseed(&mut self, viewport: Viewport) {
    let total = self.stats.total_stars;
    self.field = match self.policy {
      ReseedPolicy::Regenerate => generate::seed_with(
        total,
        &self.participants,
        viewport,
        &self.config,
        &mut self.rng,
      ),
      ReseedPolicy::Preserve => generate::reseed_preserving(
        &self.field,
        total,
        &self.participants,
        viewport,
        &self.config,
        &mut self.rng,
      ),
    };
  }
}

#[cfg(test)]
mod tests {
  use stargaze_core::action::Phase;

  use super::*;

  fn state(policy: ReseedPolicy) -> SkyState {
    SkyState::with_rng(
      "demo",
      Viewport::new(600.0, 400.0),
      FieldConfig::default(),
      policy,
      StdRng::seed_from_u64(5),
    )
  }

  fn snapshot(total: u64, participants: Vec<ParticipantMeta>) -> SkySnapshot {
    let mut s = SkySnapshot::empty("demo");
    s.stats.total_stars = total;
    s.stats.total_actions = total;
    s.participants = participants;
    s
  }

  #[test]
  fn starts_with_ambient_stars_only() {
    let s = state(ReseedPolicy::default());
    assert_eq!(s.policy(), ReseedPolicy::Regenerate);
    assert_eq!(s.field().points.len(), 5);
    assert_eq!(s.stats().total_stars, 0);
  }

  #[test]
  fn apply_reseeds_and_notifies() {
    let mut s = state(ReseedPolicy::Regenerate);
    let mut rx = s.subscribe();
    s.apply(snapshot(61, vec![]));
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().total_stars, 61);
    assert_eq!(s.field().template_names(), vec!["dipper", "hunter"]);
    assert_eq!(s.field().participation_count(), 61);
  }

  #[test]
  fn snapshot_for_other_sky_is_ignored() {
    let mut s = state(ReseedPolicy::Regenerate);
    let rx = s.subscribe();
    let mut other = snapshot(10, vec![]);
    other.stats.sky_id = "elsewhere".into();
    s.apply(other);
    assert!(!rx.has_changed().unwrap());
    assert_eq!(s.field().points.len(), 5);
  }

  #[test]
  fn resize_regenerates_inside_new_bounds() {
    let mut s = state(ReseedPolicy::Preserve);
    s.apply(snapshot(40, vec![]));
    s.resize(Viewport::new(100.0, 50.0));
    assert_eq!(s.viewport(), Viewport::new(100.0, 50.0));
    assert_eq!(s.field().participation_count(), 40);
    assert!(s.field().points.iter().all(|p| s.viewport().contains(p.position)));
  }

  #[test]
  fn preserve_policy_keeps_positions() {
    let mut s = state(ReseedPolicy::Preserve);
    s.apply(snapshot(10, vec![]));
    let before: Vec<_> = s.field().points.iter().map(|p| p.position).collect();
    let meta = ParticipantMeta { name: None, phase: Some(Phase::Before), action_label: None };
    s.apply(snapshot(12, vec![meta]));
    let after: Vec<_> = s.field().points.iter().map(|p| p.position).collect();
    assert_eq!(&after[..before.len()], &before[..]);
    assert_eq!(after.len(), before.len() + 2);
  }

  #[test]
  fn poll_applies_unseen_snapshots_once() {
    let mut s = state(ReseedPolicy::Regenerate);
    let (tx, mut rx) = watch::channel(None);
    assert!(!s.poll(&mut rx));
    tx.send_replace(Some(snapshot(3, vec![])));
    assert!(s.poll(&mut rx));
    assert!(!s.poll(&mut rx));
    assert_eq!(s.stats().total_stars, 3);
  }
}
