//! Read-only aggregate endpoints. These never fail: an unreachable store or
//! an unknown sky reads as an empty sky.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/skies/{sky}/stats` | Weighted score and record count |
//! | `GET`  | `/skies/{sky}/participants` | Optional `?limit=n`, oldest first |
//! | `GET`  | `/skies/{sky}/snapshot` | Stats and participants together |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::Deserialize;
use stargaze_core::{
  engine::Aggregator,
  participation::ParticipantMeta,
  stats::{SkySnapshot, SkyStats},
  store::SkyStore,
};

use crate::PARTICIPANT_LIMIT;

#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
  pub limit: Option<usize>,
}

impl LimitParams {
  fn resolve(&self) -> usize { self.limit.unwrap_or(PARTICIPANT_LIMIT).min(PARTICIPANT_LIMIT) }
}

/// `GET /skies/{sky}/stats`
pub async fn stats<S: SkyStore>(
  State(engine): State<Aggregator<S>>,
  Path(sky_id): Path<String>,
) -> Json<SkyStats> {
  Json(engine.compute_stats(&sky_id).await)
}

/// `GET /skies/{sky}/participants[?limit=<n>]`
pub async fn participants<S: SkyStore>(
  State(engine): State<Aggregator<S>>,
  Path(sky_id): Path<String>,
  Query(params): Query<LimitParams>,
) -> Json<Vec<ParticipantMeta>> {
  Json(engine.participants(&sky_id, params.resolve()).await)
}

/// `GET /skies/{sky}/snapshot[?limit=<n>]`
pub async fn snapshot<S: SkyStore>(
  State(engine): State<Aggregator<S>>,
  Path(sky_id): Path<String>,
  Query(params): Query<LimitParams>,
) -> Json<SkySnapshot> {
  Json(engine.snapshot(&sky_id, params.resolve()).await)
}
