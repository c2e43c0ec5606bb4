//! Participation records, the append-only stream the sky is built from.
//!
//! A participation is written once and never mutated or deleted. Aggregates
//! are always recomputed from the full set (or read from a precomputed
//! summary), never patched in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::action::Phase;

// ─── NewParticipation ────────────────────────────────────────────────────────

/// Input to [`crate::engine::Aggregator::record_participation`].
/// `created_at` is always set by the store; it is not accepted from callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewParticipation {
  pub sky_id:     String,
  pub action_key: String,
  pub name:       Option<String>,
  pub email:      Option<String>,
  pub comment:    Option<String>,
}

impl NewParticipation {
  pub fn new(sky_id: impl Into<String>, action_key: impl Into<String>) -> Self {
    Self {
      sky_id: sky_id.into(),
      action_key: action_key.into(),
      ..Self::default()
    }
  }

  pub fn with_name(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  pub fn with_email(mut self, email: impl Into<String>) -> Self {
    self.email = Some(email.into());
    self
  }

  pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
    self.comment = Some(comment.into());
    self
  }

  /// Trim optional text fields and collapse blank ones to `None`.
  pub fn normalized(self) -> Self {
    fn clean(v: Option<String>) -> Option<String> {
      v.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
    }
    Self {
      sky_id:     self.sky_id,
      action_key: self.action_key.trim().to_owned(),
      name:       clean(self.name),
      email:      clean(self.email),
      comment:    clean(self.comment),
    }
  }
}

// ─── Participation ───────────────────────────────────────────────────────────

/// A stored participation. Once written, no field is ever updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participation {
  pub participation_id: Uuid,
  pub sky_id:           String,
  pub action_key:       String,
  pub name:             Option<String>,
  pub email:            Option<String>,
  pub comment:          Option<String>,
  /// Server-assigned timestamp; never changes after creation.
  pub created_at:       DateTime<Utc>,
}

/// A participation joined with the weight of its action.
///
/// `weight` is `None` when the join found no matching action, which the
/// aggregation engine counts as weight 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedParticipation {
  pub action_key: String,
  pub weight:     Option<u32>,
  pub created_at: DateTime<Utc>,
}

// ─── ParticipantMeta ─────────────────────────────────────────────────────────

/// Label used for a star whose participant left no name.
pub const ANONYMOUS_LABEL: &str = "anonymous";

/// Per-participation metadata consumed by the field generator for colouring
/// and labelling. Every field is optional; the generator has a typed fallback
/// for each.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantMeta {
  pub name:         Option<String>,
  pub phase:        Option<Phase>,
  pub action_label: Option<String>,
}

impl ParticipantMeta {
  /// The tooltip text for this participant's star.
  pub fn display_label(&self) -> String {
    match (&self.name, &self.action_label) {
      (Some(name), Some(action)) => format!("{name} · {action}"),
      (Some(name), None) => name.clone(),
      (None, Some(action)) => format!("{ANONYMOUS_LABEL} · {action}"),
      (None, None) => ANONYMOUS_LABEL.to_owned(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalized_drops_blank_fields() {
    let input = NewParticipation::new("demo", " flyer ")
      .with_name("  ")
      .with_email(" ada@example.org ")
      .with_comment("");
    let out = input.normalized();
    assert_eq!(out.action_key, "flyer");
    assert_eq!(out.name, None);
    assert_eq!(out.email.as_deref(), Some("ada@example.org"));
    assert_eq!(out.comment, None);
  }

  #[test]
  fn display_label_falls_back_to_anonymous() {
    assert_eq!(ParticipantMeta::default().display_label(), "anonymous");

    let named = ParticipantMeta {
      name:         Some("Ada".into()),
      phase:        Some(Phase::Day),
      action_label: Some("March".into()),
    };
    assert_eq!(named.display_label(), "Ada · March");
  }
}
