//! [`SqliteStore`]: the SQLite implementation of [`SkyStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use stargaze_core::{
  action::ActionDef,
  participation::{
    NewParticipation, ParticipantMeta, Participation, WeightedParticipation,
  },
  sky::{Sky, validate_sky_id},
  stats::SummaryRow,
  store::SkyStore,
};
use tracing::debug;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    RawAction, RawParticipant, RawParticipation, RawSky, RawWeighted, decode_dt,
    encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Stargaze store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Every stored participation of a sky, oldest first. Includes contact
  /// fields, so this is for administrative export rather than display.
  pub async fn participations(&self, sky_id: &str) -> Result<Vec<Participation>> {
    let sky_id = sky_id.to_owned();

    let raws: Vec<RawParticipation> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT participation_id, sky_id, action_key, name, email, comment, created_at
           FROM participations
           WHERE sky_id = ?1
           ORDER BY created_at, rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![sky_id], |row| {
            Ok(RawParticipation {
              participation_id: row.get(0)?,
              sky_id:           row.get(1)?,
              action_key:       row.get(2)?,
              name:             row.get(3)?,
              email:            row.get(4)?,
              comment:          row.get(5)?,
              created_at:       row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawParticipation::into_participation).collect()
  }

  /// Drop every precomputed summary row, forcing readers onto the derived
  /// path until the next insert recreates it.
  #[cfg(test)]
  pub(crate) async fn clear_summaries(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute("DELETE FROM sky_summaries", [])?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SkyStore impl ───────────────────────────────────────────────────────────

impl SkyStore for SqliteStore {
  type Error = Error;

  // ── Skies ─────────────────────────────────────────────────────────────────

  async fn create_sky(&self, sky_id: String, title: String) -> Result<Sky> {
    validate_sky_id(&sky_id)?;

    let sky = Sky { sky_id, title, created_at: Utc::now() };

    let id_str    = sky.sky_id.clone();
    let title_str = sky.title.clone();
    let at_str    = encode_dt(sky.created_at);

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT INTO skies (sky_id, title, created_at) VALUES (?1, ?2, ?3)
           ON CONFLICT (sky_id) DO NOTHING",
          rusqlite::params![id_str, title_str, at_str],
        )?;
        Ok(n == 1)
      })
      .await?;

    if !inserted {
      return Err(Error::SkyExists(sky.sky_id));
    }
    debug!(sky_id = %sky.sky_id, "created sky");
    Ok(sky)
  }

  async fn get_sky(&self, sky_id: &str) -> Result<Option<Sky>> {
    let id_str = sky_id.to_owned();

    let raw: Option<RawSky> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT sky_id, title, created_at FROM skies WHERE sky_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawSky {
                  sky_id:     row.get(0)?,
                  title:      row.get(1)?,
                  created_at: row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSky::into_sky).transpose()
  }

  async fn list_skies(&self) -> Result<Vec<Sky>> {
    let raws: Vec<RawSky> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare("SELECT sky_id, title, created_at FROM skies ORDER BY created_at")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawSky {
              sky_id:     row.get(0)?,
              title:      row.get(1)?,
              created_at: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSky::into_sky).collect()
  }

  // ── Action registry ───────────────────────────────────────────────────────

  async fn define_action(&self, def: ActionDef) -> Result<ActionDef> {
    def.validate()?;

    if self.get_sky(&def.sky_id).await?.is_none() {
      return Err(Error::SkyNotFound(def.sky_id));
    }

    let sky_id = def.sky_id.clone();
    let key    = def.key.clone();
    let label  = def.label.clone();
    let weight = i64::from(def.weight);
    let phase  = def.phase.as_str();
    let kind   = def.kind.as_str();

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT INTO actions (sky_id, key, label, weight, phase, kind)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT (sky_id, key) DO NOTHING",
          rusqlite::params![sky_id, key, label, weight, phase, kind],
        )?;
        Ok(n == 1)
      })
      .await?;

    if !inserted {
      return Err(Error::ActionExists { sky_id: def.sky_id, key: def.key });
    }
    Ok(def)
  }

  async fn list_actions(&self, sky_id: &str) -> Result<Vec<ActionDef>> {
    let id_str = sky_id.to_owned();

    let raws: Vec<RawAction> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT sky_id, key, label, weight, phase, kind
           FROM actions WHERE sky_id = ?1 ORDER BY phase, key",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawAction {
              sky_id: row.get(0)?,
              key:    row.get(1)?,
              label:  row.get(2)?,
              weight: row.get(3)?,
              phase:  row.get(4)?,
              kind:   row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAction::into_action).collect()
  }

  async fn action_lookup(&self, sky_id: &str, key: &str) -> Result<Option<ActionDef>> {
    let id_str  = sky_id.to_owned();
    let key_str = key.to_owned();

    let raw: Option<RawAction> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT sky_id, key, label, weight, phase, kind
               FROM actions WHERE sky_id = ?1 AND key = ?2",
              rusqlite::params![id_str, key_str],
              |row| {
                Ok(RawAction {
                  sky_id: row.get(0)?,
                  key:    row.get(1)?,
                  label:  row.get(2)?,
                  weight: row.get(3)?,
                  phase:  row.get(4)?,
                  kind:   row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAction::into_action).transpose()
  }

  // ── Aggregation inputs ────────────────────────────────────────────────────

  async fn summary_read(&self, sky_id: &str) -> Result<Option<SummaryRow>> {
    let id_str = sky_id.to_owned();

    let raw: Option<(i64, i64, Option<String>)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT total_stars, total_actions, updated_at
               FROM sky_summaries WHERE sky_id = ?1",
              rusqlite::params![id_str],
              |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?,
        )
      })
      .await?;

    // An unparseable timestamp leaves `updated_at` empty, which marks the
    // row as malformed for the engine.
    Ok(raw.map(|(total_stars, total_actions, updated_at)| SummaryRow {
      total_stars,
      total_actions,
      updated_at: updated_at.as_deref().and_then(|s| decode_dt(s).ok()),
    }))
  }

  async fn participations_with_weights(
    &self,
    sky_id: &str,
  ) -> Result<Vec<WeightedParticipation>> {
    let id_str = sky_id.to_owned();

    let raws: Vec<RawWeighted> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT p.action_key, a.weight, p.created_at
           FROM participations p
           LEFT JOIN actions a ON a.sky_id = p.sky_id AND a.key = p.action_key
           WHERE p.sky_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawWeighted {
              action_key: row.get(0)?,
              weight:     row.get(1)?,
              created_at: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawWeighted::into_weighted).collect()
  }

  // ── Append-only writes ────────────────────────────────────────────────────

  async fn insert_participation(&self, input: NewParticipation) -> Result<Participation> {
    let p = Participation {
      participation_id: Uuid::new_v4(),
      sky_id:           input.sky_id,
      action_key:       input.action_key,
      name:             input.name,
      email:            input.email,
      comment:          input.comment,
      created_at:       Utc::now(),
    };

    let id_str     = encode_uuid(p.participation_id);
    let sky_id     = p.sky_id.clone();
    let action_key = p.action_key.clone();
    let name       = p.name.clone();
    let email      = p.email.clone();
    let comment    = p.comment.clone();
    let at_str     = encode_dt(p.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO participations (
             participation_id, sky_id, action_key, name, email, comment, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, sky_id, action_key, name, email, comment, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(p)
  }

  // ── Visualisation metadata ────────────────────────────────────────────────

  async fn list_participants(
    &self,
    sky_id: &str,
    limit:  usize,
  ) -> Result<Vec<ParticipantMeta>> {
    let id_str    = sky_id.to_owned();
    let limit_val = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawParticipant> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT p.name, a.phase, a.label
           FROM participations p
           LEFT JOIN actions a ON a.sky_id = p.sky_id AND a.key = p.action_key
           WHERE p.sky_id = ?1
           ORDER BY p.created_at, p.rowid
           LIMIT ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str, limit_val], |row| {
            Ok(RawParticipant {
              name:         row.get(0)?,
              phase:        row.get(1)?,
              action_label: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(RawParticipant::into_meta).collect())
  }
}
