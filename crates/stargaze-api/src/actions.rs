//! Handlers for a sky's action registry.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/skies/{sky}/actions` | 404 if the sky does not exist |
//! | `POST` | `/skies/{sky}/actions` | Body: `{"key":"march","label":"Join the march","phase":"day","weight":2}` |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use stargaze_core::{
  action::{ActionDef, ActionKind, Phase},
  engine::Aggregator,
  store::SkyStore,
};
use tracing::info;

use crate::{error::ApiError, skies::require_sky};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /skies/{sky}/actions`
pub async fn list<S: SkyStore>(
  State(engine): State<Aggregator<S>>,
  Path(sky_id): Path<String>,
) -> Result<Json<Vec<ActionDef>>, ApiError> {
  require_sky(&engine, &sky_id).await?;
  let actions = engine
    .store()
    .list_actions(&sky_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(actions))
}

// ─── Define ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DefineBody {
  pub key:    String,
  pub label:  String,
  pub phase:  Phase,
  pub weight: Option<u32>,
  #[serde(default)]
  pub kind:   ActionKind,
}

/// `POST /skies/{sky}/actions`
pub async fn define<S: SkyStore>(
  State(engine): State<Aggregator<S>>,
  Path(sky_id): Path<String>,
  Json(body): Json<DefineBody>,
) -> Result<impl IntoResponse, ApiError> {
  let mut def =
    ActionDef::new(&sky_id, body.key.trim(), body.label, body.phase).with_kind(body.kind);
  if let Some(weight) = body.weight {
    def = def.with_weight(weight);
  }
  def.validate()?;
  require_sky(&engine, &sky_id).await?;

  let store = engine.store();
  if store
    .action_lookup(&sky_id, &def.key)
    .await
    .map_err(ApiError::store)?
    .is_some()
  {
    return Err(ApiError::Conflict(format!("action {} already defined in {sky_id}", def.key)));
  }

  let def = store.define_action(def).await.map_err(ApiError::store)?;
  info!(sky_id = %def.sky_id, key = %def.key, weight = def.weight, "defined action");
  Ok((StatusCode::CREATED, Json(def)))
}
