//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Enums are stored as their lowercase tags.

use chrono::{DateTime, Utc};
use stargaze_core::{
  action::{ActionDef, ActionKind, Phase},
  participation::{ParticipantMeta, Participation, WeightedParticipation},
  sky::Sky,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Weight ──────────────────────────────────────────────────────────────────

/// Weights are positive in the schema; anything else reads as "no weight".
fn decode_weight(w: Option<i64>) -> Option<u32> {
  w.and_then(|w| u32::try_from(w).ok()).filter(|w| *w >= 1)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `skies` row.
pub struct RawSky {
  pub sky_id:     String,
  pub title:      String,
  pub created_at: String,
}

impl RawSky {
  pub fn into_sky(self) -> Result<Sky> {
    Ok(Sky {
      sky_id:     self.sky_id,
      title:      self.title,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from an `actions` row.
pub struct RawAction {
  pub sky_id: String,
  pub key:    String,
  pub label:  String,
  pub weight: i64,
  pub phase:  String,
  pub kind:   String,
}

impl RawAction {
  pub fn into_action(self) -> Result<ActionDef> {
    Ok(ActionDef {
      weight: decode_weight(Some(self.weight)).unwrap_or(1),
      phase:  self.phase.parse::<Phase>()?,
      kind:   self.kind.parse::<ActionKind>()?,
      sky_id: self.sky_id,
      key:    self.key,
      label:  self.label,
    })
  }
}

/// Raw values read directly from a `participations` row.
pub struct RawParticipation {
  pub participation_id: String,
  pub sky_id:           String,
  pub action_key:       String,
  pub name:             Option<String>,
  pub email:            Option<String>,
  pub comment:          Option<String>,
  pub created_at:       String,
}

impl RawParticipation {
  pub fn into_participation(self) -> Result<Participation> {
    Ok(Participation {
      participation_id: decode_uuid(&self.participation_id)?,
      created_at:       decode_dt(&self.created_at)?,
      sky_id:           self.sky_id,
      action_key:       self.action_key,
      name:             self.name,
      email:            self.email,
      comment:          self.comment,
    })
  }
}

/// A participation left-joined with its action's weight.
pub struct RawWeighted {
  pub action_key: String,
  pub weight:     Option<i64>,
  pub created_at: String,
}

impl RawWeighted {
  pub fn into_weighted(self) -> Result<WeightedParticipation> {
    Ok(WeightedParticipation {
      weight:     decode_weight(self.weight),
      created_at: decode_dt(&self.created_at)?,
      action_key: self.action_key,
    })
  }
}

/// A participation left-joined with its action's phase and label.
pub struct RawParticipant {
  pub name:         Option<String>,
  pub phase:        Option<String>,
  pub action_label: Option<String>,
}

impl RawParticipant {
  /// Metadata is cosmetic: an unknown phase degrades to `None` rather than
  /// failing the whole read.
  pub fn into_meta(self) -> ParticipantMeta {
    ParticipantMeta {
      name:         self.name,
      phase:        self.phase.and_then(|p| p.parse().ok()),
      action_label: self.action_label,
    }
  }
}
