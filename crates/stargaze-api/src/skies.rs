//! Handlers for `/skies` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/skies` | All skies |
//! | `POST` | `/skies` | Body: `{"sky_id":"climate-week","title":"Climate Week"}` |
//! | `GET`  | `/skies/{sky}` | 404 if not found |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use stargaze_core::{
  engine::Aggregator,
  sky::{Sky, validate_sky_id},
  store::SkyStore,
};
use tracing::info;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /skies`
pub async fn list<S: SkyStore>(
  State(engine): State<Aggregator<S>>,
) -> Result<Json<Vec<Sky>>, ApiError> {
  let skies = engine.store().list_skies().await.map_err(ApiError::store)?;
  Ok(Json(skies))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub sky_id: String,
  pub title:  String,
}

/// `POST /skies`
pub async fn create<S: SkyStore>(
  State(engine): State<Aggregator<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  validate_sky_id(&body.sky_id)?;
  let store = engine.store();
  if store.get_sky(&body.sky_id).await.map_err(ApiError::store)?.is_some() {
    return Err(ApiError::Conflict(format!("sky {} already exists", body.sky_id)));
  }
  let sky = store
    .create_sky(body.sky_id, body.title)
    .await
    .map_err(ApiError::store)?;
  info!(sky_id = %sky.sky_id, "created sky");
  Ok((StatusCode::CREATED, Json(sky)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /skies/{sky}`
pub async fn get_one<S: SkyStore>(
  State(engine): State<Aggregator<S>>,
  Path(sky_id): Path<String>,
) -> Result<Json<Sky>, ApiError> {
  Ok(Json(require_sky(&engine, &sky_id).await?))
}

/// 404 unless `sky_id` exists.
pub(crate) async fn require_sky<S: SkyStore>(
  engine: &Aggregator<S>,
  sky_id: &str,
) -> Result<Sky, ApiError> {
  engine
    .store()
    .get_sky(sky_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("sky {sky_id} not found")))
}
