//! Action registry types.
//!
//! Every sky carries a catalogue of actions a participant can perform. Each
//! action contributes a fixed weight to the sky's score and is tagged with
//! the phase of the campaign it belongs to, which also drives its colour in
//! the visualisation.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Phase ───────────────────────────────────────────────────────────────────

/// When, relative to the main event, an action takes place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
  /// Preparation and support actions ahead of the event.
  Before,
  /// Primary actions on the day itself.
  Day,
}

impl Phase {
  /// The lowercase tag used on the wire and in storage.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Before => "before",
      Self::Day => "day",
    }
  }
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Phase {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "before" => Ok(Self::Before),
      "day" => Ok(Self::Day),
      other => Err(Error::UnknownPhase(other.to_owned())),
    }
  }
}

// ─── Kind ────────────────────────────────────────────────────────────────────

/// Whether an action is done in person or online. Informational only.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
  #[default]
  InPerson,
  Online,
}

impl ActionKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::InPerson => "in_person",
      Self::Online => "online",
    }
  }
}

impl FromStr for ActionKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "in_person" => Ok(Self::InPerson),
      "online" => Ok(Self::Online),
      other => Err(Error::UnknownActionKind(other.to_owned())),
    }
  }
}

// ─── ActionDef ───────────────────────────────────────────────────────────────

fn default_weight() -> u32 { 1 }

/// One entry of a sky's action registry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDef {
  pub sky_id: String,
  /// Unique within the sky.
  pub key:    String,
  pub label:  String,
  /// Contribution of one participation to the sky's score.
  #[serde(default = "default_weight")]
  pub weight: u32,
  pub phase:  Phase,
  #[serde(default)]
  pub kind:   ActionKind,
}

impl ActionDef {
  /// Convenience constructor with weight 1 and an in-person kind.
  pub fn new(
    sky_id: impl Into<String>,
    key: impl Into<String>,
    label: impl Into<String>,
    phase: Phase,
  ) -> Self {
    Self {
      sky_id: sky_id.into(),
      key: key.into(),
      label: label.into(),
      weight: default_weight(),
      phase,
      kind: ActionKind::default(),
    }
  }

  pub fn with_weight(mut self, weight: u32) -> Self {
    self.weight = weight;
    self
  }

  pub fn with_kind(mut self, kind: ActionKind) -> Self {
    self.kind = kind;
    self
  }

  /// Reject definitions that would corrupt aggregation: an empty key or a
  /// zero weight.
  pub fn validate(&self) -> Result<()> {
    crate::sky::validate_sky_id(&self.sky_id)?;
    if self.key.trim().is_empty() || self.key.len() > 64 {
      return Err(Error::InvalidActionKey(self.key.clone()));
    }
    if self.weight == 0 {
      return Err(Error::InvalidWeight(self.weight));
    }
    Ok(())
  }
}
