//! The `SkyStore` trait, the durable collaborator of the aggregation engine.
//!
//! The trait is implemented by storage backends (e.g.
//! `stargaze-store-sqlite`). Higher layers (`stargaze-api`, the refresh loop)
//! depend on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  action::ActionDef,
  participation::{
    NewParticipation, ParticipantMeta, Participation, WeightedParticipation,
  },
  sky::Sky,
  stats::SummaryRow,
};

/// Abstraction over a Stargaze storage backend.
///
/// Participations are append-only. Skies and action definitions are written
/// once by an administrator and are read-only to the aggregation path.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SkyStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Skies ─────────────────────────────────────────────────────────────

  /// Create and persist a new sky. Returns an error if the key is taken.
  fn create_sky(
    &self,
    sky_id: String,
    title: String,
  ) -> impl Future<Output = Result<Sky, Self::Error>> + Send + '_;

  /// Retrieve a sky by key. Returns `None` if not found.
  fn get_sky<'a>(
    &'a self,
    sky_id: &'a str,
  ) -> impl Future<Output = Result<Option<Sky>, Self::Error>> + Send + 'a;

  fn list_skies(
    &self,
  ) -> impl Future<Output = Result<Vec<Sky>, Self::Error>> + Send + '_;

  // ── Action registry ───────────────────────────────────────────────────

  /// Add an action to a sky's registry. Returns an error if the sky does not
  /// exist or the key is already defined in it.
  fn define_action(
    &self,
    def: ActionDef,
  ) -> impl Future<Output = Result<ActionDef, Self::Error>> + Send + '_;

  fn list_actions<'a>(
    &'a self,
    sky_id: &'a str,
  ) -> impl Future<Output = Result<Vec<ActionDef>, Self::Error>> + Send + 'a;

  /// Look up one action by key within a sky.
  fn action_lookup<'a>(
    &'a self,
    sky_id: &'a str,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<ActionDef>, Self::Error>> + Send + 'a;

  // ── Aggregation inputs ────────────────────────────────────────────────

  /// Read the precomputed summary for a sky, if one exists.
  fn summary_read<'a>(
    &'a self,
    sky_id: &'a str,
  ) -> impl Future<Output = Result<Option<SummaryRow>, Self::Error>> + Send + 'a;

  /// Every participation of a sky joined with its action weight.
  fn participations_with_weights<'a>(
    &'a self,
    sky_id: &'a str,
  ) -> impl Future<Output = Result<Vec<WeightedParticipation>, Self::Error>>
  + Send
  + 'a;

  // ── Append-only writes ────────────────────────────────────────────────

  /// Append a participation. The `created_at` timestamp is set by the store.
  /// Validation against the registry is the engine's job, not the store's.
  fn insert_participation(
    &self,
    input: NewParticipation,
  ) -> impl Future<Output = Result<Participation, Self::Error>> + Send + '_;

  // ── Visualisation metadata ────────────────────────────────────────────

  /// Name and category of the first `limit` participations, oldest first.
  fn list_participants<'a>(
    &'a self,
    sky_id: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<ParticipantMeta>, Self::Error>> + Send + 'a;
}
