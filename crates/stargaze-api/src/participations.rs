//! `POST /skies/{sky}/participations`: record one participation.
//!
//! Body: `{"action_key":"march","name":"Ada","email":null,"comment":"See you there"}`.
//! Responds `201` with the sky's fresh stats, or `422` when the engine
//! rejects the participation (unknown action, oversized comment, store
//! failure). The engine does not say which; neither does this handler.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use stargaze_core::{engine::Aggregator, participation::NewParticipation, store::SkyStore};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct RecordBody {
  pub action_key: String,
  pub name:       Option<String>,
  pub email:      Option<String>,
  pub comment:    Option<String>,
}

/// `POST /skies/{sky}/participations`
pub async fn record<S: SkyStore>(
  State(engine): State<Aggregator<S>>,
  Path(sky_id): Path<String>,
  Json(body): Json<RecordBody>,
) -> Result<impl IntoResponse, ApiError> {
  let input = NewParticipation {
    sky_id,
    action_key: body.action_key,
    name: body.name,
    email: body.email,
    comment: body.comment,
  };
  let stats = engine
    .record_participation(input)
    .await
    .ok_or_else(|| ApiError::Rejected("participation was not recorded".to_owned()))?;
  Ok((StatusCode::CREATED, Json(stats)))
}
