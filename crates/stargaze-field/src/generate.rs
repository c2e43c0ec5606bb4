//! The field generator: score in, points of light out.
//!
//! A field is the concatenation of three populations, in this order:
//!
//! 1. a fixed handful of white *ambient* stars, present even at zero score;
//! 2. one *participation* star per point of score, up to a hard cap, tinted
//!    and labelled from the participant metadata at the same index;
//! 3. one *constellation* per full multiple of the milestone threshold, up
//!    to a cap of its own, each a fixed template shape placed in its own grid
//!    cell.
//!
//! Counts and structure are a pure function of the score, the viewport and
//! the template cycle; exact positions come from the supplied RNG.

use std::{f32::consts::TAU, ops::Range};

use rand::Rng;
use stargaze_core::participation::{ANONYMOUS_LABEL, ParticipantMeta};

use crate::{
  geometry::{Vec2, Viewport},
  palette::{self, Rgb},
  templates::{TEMPLATE_SIZE, template_for},
};

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldConfig {
  /// Ambient stars emitted regardless of score.
  pub base_count:         usize,
  /// Upper bound on participation stars.
  pub cap:                usize,
  /// Score needed per constellation.
  pub threshold:          u64,
  /// Upper bound on constellations.
  pub max_constellations: usize,
  /// Columns of the constellation grid.
  pub grid_columns:       usize,
}

impl Default for FieldConfig {
  fn default() -> Self {
    Self { base_count: 5, cap: 500, threshold: 30, max_constellations: 36, grid_columns: 3 }
  }
}

impl FieldConfig {
  pub fn participation_count(&self, total_stars: u64) -> usize {
    usize::try_from(total_stars).map_or(self.cap, |n| n.min(self.cap))
  }

  pub fn constellation_count(&self, total_stars: u64) -> usize {
    match total_stars.checked_div(self.threshold) {
      Some(n) => {
        usize::try_from(n).map_or(self.max_constellations, |n| n.min(self.max_constellations))
      }
      None => 0,
    }
  }

  /// Rows of the constellation grid holding `count` constellations.
  pub fn grid_rows(&self, count: usize) -> usize { count.div_ceil(self.grid_columns.max(1)) }
}

// ─── Points ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarKind {
  Ambient,
  /// Stands for the participation at `index` (oldest first).
  Participation { index: usize },
  /// Member `member` of constellation `id`.
  Constellation { id: usize, member: usize },
}

/// One point of light. Regenerated on every reseed; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct StarPoint {
  /// Resting position before parallax.
  pub position:      Vec2,
  pub radius:        f32,
  pub twinkle_phase: f32,
  /// Parallax factor: 0 stays put, 1 follows the full offset.
  pub depth:         f32,
  pub color:         Rgb,
  pub label:         String,
  pub kind:          StarKind,
}

impl StarPoint {
  pub fn constellation_id(&self) -> Option<usize> {
    match self.kind {
      StarKind::Constellation { id, .. } => Some(id),
      _ => None,
    }
  }

  pub fn is_constellation(&self) -> bool { self.constellation_id().is_some() }
}

/// A placed constellation. Its members are the [`TEMPLATE_SIZE`] points
/// starting at `first`; `edges` index into that slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Constellation {
  pub id:       usize,
  pub template: &'static str,
  pub first:    usize,
  pub edges:    Vec<(usize, usize)>,
}

impl Constellation {
  pub fn members<'a>(&self, points: &'a [StarPoint]) -> &'a [StarPoint] {
    &points[self.first..self.first + TEMPLATE_SIZE]
  }

  /// Edges as indices into the whole field.
  pub fn links(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
    self.edges.iter().map(|&(a, b)| (self.first + a, self.first + b))
  }
}

// ─── Field ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
  pub points:         Vec<StarPoint>,
  pub constellations: Vec<Constellation>,
  pub viewport:       Viewport,
}

impl Field {
  pub fn empty(viewport: Viewport) -> Self {
    Self { points: Vec::new(), constellations: Vec::new(), viewport }
  }

  fn count_where(&self, pred: impl Fn(&StarKind) -> bool) -> usize {
    self.points.iter().filter(|p| pred(&p.kind)).count()
  }

  pub fn ambient_count(&self) -> usize {
    self.count_where(|k| matches!(k, StarKind::Ambient))
  }

  pub fn participation_count(&self) -> usize {
    self.count_where(|k| matches!(k, StarKind::Participation { .. }))
  }

  pub fn constellation_point_count(&self) -> usize {
    self.count_where(|k| matches!(k, StarKind::Constellation { .. }))
  }

  pub fn template_names(&self) -> Vec<&'static str> {
    self.constellations.iter().map(|c| c.template).collect()
  }
}

// ─── Seeding ─────────────────────────────────────────────────────────────────

/// Generate a field using the thread RNG.
pub fn seed(
  total_stars: u64,
  participants: &[ParticipantMeta],
  viewport: Viewport,
  config: &FieldConfig,
) -> Field {
  seed_with(total_stars, participants, viewport, config, &mut rand::thread_rng())
}

/// Generate a field, drawing positions from `rng`.
pub fn seed_with<R: Rng + ?Sized>(
  total_stars: u64,
  participants: &[ParticipantMeta],
  viewport: Viewport,
  config: &FieldConfig,
  rng: &mut R,
) -> Field {
  let participation = config.participation_count(total_stars);
  let constellations = config.constellation_count(total_stars);

  let mut points =
    Vec::with_capacity(config.base_count + participation + constellations * TEMPLATE_SIZE);
  points.extend((0..config.base_count).map(|_| ambient_star(viewport, rng)));
  points.extend(
    (0..participation).map(|i| participation_star(i, participants.get(i), viewport, rng)),
  );
  let placed =
    place_constellations(0..constellations, constellations, viewport, config, rng, &mut points);

  Field { points, constellations: placed, viewport }
}

/// Reseed while keeping stars that are already on screen in place.
///
/// Ambient stars and existing participation stars keep their position,
/// radius and twinkle; they are only recoloured and relabelled from the new
/// metadata. New participation stars are appended.
///
/// Constellations keep their place while the grid keeps its row count; only
/// the newly reached ones are placed, in their own cells. When a milestone
/// adds a grid row every cell shrinks, so all constellations are placed
/// again. A viewport change regenerates everything.
pub fn reseed_preserving<R: Rng + ?Sized>(
  previous: &Field,
  total_stars: u64,
  participants: &[ParticipantMeta],
  viewport: Viewport,
  config: &FieldConfig,
  rng: &mut R,
) -> Field {
  if previous.viewport != viewport || previous.ambient_count() != config.base_count {
    return seed_with(total_stars, participants, viewport, config, rng);
  }

  let participation = config.participation_count(total_stars);
  let constellations = config.constellation_count(total_stars);

  let mut points: Vec<StarPoint> = previous
    .points
    .iter()
    .filter(|p| p.kind == StarKind::Ambient)
    .cloned()
    .collect();

  let kept: Vec<&StarPoint> = previous
    .points
    .iter()
    .filter(|p| matches!(p.kind, StarKind::Participation { .. }))
    .collect();
  for i in 0..participation {
    let meta = participants.get(i);
    match kept.get(i) {
      Some(old) => {
        let mut star = (*old).clone();
        star.color = palette::phase_color(meta.and_then(|m| m.phase));
        star.label = participation_label(meta);
        points.push(star);
      }
      None => points.push(participation_star(i, meta, viewport, rng)),
    }
  }

  let mut placed = Vec::with_capacity(constellations);
  let previous_count = previous.constellations.len();
  let reused = if config.grid_rows(previous_count) == config.grid_rows(constellations) {
    constellations.min(previous_count)
  } else {
    0
  };
  for c in &previous.constellations[..reused] {
    let first = points.len();
    points.extend(c.members(&previous.points).iter().cloned());
    placed.push(Constellation { first, ..c.clone() });
  }
  placed.extend(place_constellations(
    reused..constellations,
    constellations,
    viewport,
    config,
    rng,
    &mut points,
  ));

  Field { points, constellations: placed, viewport }
}

fn random_position<R: Rng + ?Sized>(viewport: Viewport, rng: &mut R) -> Vec2 {
  Vec2::new(rng.gen_range(0.0..=viewport.width), rng.gen_range(0.0..=viewport.height))
}

fn ambient_star<R: Rng + ?Sized>(viewport: Viewport, rng: &mut R) -> StarPoint {
  StarPoint {
    position:      random_position(viewport, rng),
    radius:        rng.gen_range(0.6..1.4),
    twinkle_phase: rng.gen_range(0.0..TAU),
    depth:         rng.gen_range(0.25..0.45),
    color:         palette::AMBIENT,
    label:         "a distant star".to_owned(),
    kind:          StarKind::Ambient,
  }
}

fn participation_label(meta: Option<&ParticipantMeta>) -> String {
  meta.map_or_else(|| ANONYMOUS_LABEL.to_owned(), ParticipantMeta::display_label)
}

fn participation_star<R: Rng + ?Sized>(
  index: usize,
  meta: Option<&ParticipantMeta>,
  viewport: Viewport,
  rng: &mut R,
) -> StarPoint {
  StarPoint {
    position:      random_position(viewport, rng),
    radius:        rng.gen_range(1.0..2.2),
    twinkle_phase: rng.gen_range(0.0..TAU),
    depth:         rng.gen_range(0.5..1.0),
    color:         palette::phase_color(meta.and_then(|m| m.phase)),
    label:         participation_label(meta),
    kind:          StarKind::Participation { index },
  }
}

/// Place constellations `ids` on the grid sized for `count` constellations in
/// `grid_columns` columns. Rows share the viewport height equally, so every
/// cluster stays inside its own cell.
fn place_constellations<R: Rng + ?Sized>(
  ids: Range<usize>,
  count: usize,
  viewport: Viewport,
  config: &FieldConfig,
  rng: &mut R,
  points: &mut Vec<StarPoint>,
) -> Vec<Constellation> {
  if ids.is_empty() {
    return Vec::new();
  }

  let columns = config.grid_columns.max(1);
  let rows = config.grid_rows(count);
  let cell_w = viewport.width / columns as f32;
  let cell_h = viewport.height / rows as f32;
  let size = cell_w.min(cell_h) * 0.6;
  let slack = Vec2::new(cell_w - size, cell_h - size);

  let mut placed = Vec::with_capacity(ids.len());
  for c in ids {
    let template = template_for(c);
    let cell = Vec2::new((c % columns) as f32 * cell_w, (c / columns) as f32 * cell_h);
    let origin = cell
      + Vec2::new(
        slack.x * rng.gen_range(0.25..=0.75),
        slack.y * rng.gen_range(0.25..=0.75),
      );
    let milestone = (c as u64 + 1).saturating_mul(config.threshold);

    let first = points.len();
    for (member, &(u, v)) in template.points.iter().enumerate() {
      points.push(StarPoint {
        position:      origin + Vec2::new(u * size, v * size),
        radius:        rng.gen_range(2.0..2.6),
        twinkle_phase: rng.gen_range(0.0..TAU),
        depth:         1.0,
        color:         palette::CONSTELLATION,
        label:         format!("{} · {milestone} stars", template.title),
        kind:          StarKind::Constellation { id: c, member },
      });
    }
    placed.push(Constellation {
      id: c,
      template: template.name,
      first,
      edges: template.edges.to_vec(),
    });
  }
  placed
}
