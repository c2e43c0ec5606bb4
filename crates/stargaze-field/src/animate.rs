//! Per-frame animation of a [`Field`] onto a host surface.
//!
//! The animator never owns the points. It is handed the current field on
//! every tick, so a reseed can swap the whole field between two frames
//! without the animator noticing anything but new points.

use std::time::Duration;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
  generate::{Field, StarPoint},
  geometry::{Vec2, Viewport},
  palette::{self, Rgb},
};

/// Frame rate that per-frame increments are expressed in.
const REFERENCE_FPS: f32 = 60.0;
/// Width that meteor velocities are expressed in.
const REFERENCE_WIDTH: f32 = 800.0;

/// A drawing surface. Coordinates and widths are in viewport units; `alpha`
/// is in `[0, 1]`.
pub trait Painter {
  fn fill_background(&mut self, top: Rgb, bottom: Rgb);
  fn glow(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32);
  fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgb, alpha: f32);
  fn circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimatorConfig {
  /// Fraction of the remaining parallax distance closed per frame.
  pub damping:         f32,
  /// Upper bound on frames simulated by a single tick.
  pub max_frames:      f32,
  /// Parallax shift of the glow layer relative to a depth-1 star.
  pub glow_depth:      f32,
  pub twinkle_step:    f32,
  pub twinkle_jitter:  f32,
  /// Frames between meteor spawn attempts.
  pub meteor_interval: f32,
  pub meteor_chance:   f64,
  pub max_meteors:     usize,
  /// Lifetime in frames.
  pub meteor_life:     f32,
  /// Per-frame velocity at an 800-unit-wide viewport.
  pub meteor_velocity: Vec2,
  pub trail_segments:  usize,
}

impl Default for AnimatorConfig {
  fn default() -> Self {
    Self {
      damping:         0.06,
      max_frames:      4.0,
      glow_depth:      0.2,
      twinkle_step:    0.035,
      twinkle_jitter:  0.02,
      meteor_interval: 90.0,
      meteor_chance:   0.35,
      max_meteors:     3,
      meteor_life:     48.0,
      meteor_velocity: Vec2::new(-7.0, 3.5),
      trail_segments:  8,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Meteor {
  pub position: Vec2,
  pub velocity: Vec2,
  /// Remaining frames.
  pub life:     f32,
}

/// Twinkle brightness in `[0, 1]` for a phase.
pub fn brightness(phase: f32) -> f32 { 0.5 + 0.5 * phase.sin() }

/// Parallax offset for a pointer: the field leans away from the pointer by
/// up to `max_shift` units at the viewport edges.
pub fn parallax_target(pointer: Vec2, viewport: Viewport, max_shift: f32) -> Vec2 {
  let c = viewport.center();
  let nx = ((pointer.x - c.x) / c.x).clamp(-1.0, 1.0);
  let ny = ((pointer.y - c.y) / c.y).clamp(-1.0, 1.0);
  Vec2::new(-nx * max_shift, -ny * max_shift)
}

pub struct Animator<R = StdRng> {
  config:     AnimatorConfig,
  parallax:   Vec2,
  meteors:    Vec<Meteor>,
  /// Frames simulated so far (fractional).
  frame:      f32,
  next_spawn: f32,
  last:       Option<Duration>,
  rng:        R,
}

impl Animator<StdRng> {
  pub fn new(config: AnimatorConfig) -> Self { Self::with_rng(config, StdRng::from_entropy()) }
}

impl Default for Animator<StdRng> {
  fn default() -> Self { Self::new(AnimatorConfig::default()) }
}

impl<R: Rng> Animator<R> {
  pub fn with_rng(config: AnimatorConfig, rng: R) -> Self {
    Self {
      next_spawn: config.meteor_interval,
      config,
      parallax: Vec2::ZERO,
      meteors: Vec::new(),
      frame: 0.0,
      last: None,
      rng,
    }
  }

  pub fn config(&self) -> &AnimatorConfig { &self.config }

  pub fn parallax(&self) -> Vec2 { self.parallax }

  pub fn meteors(&self) -> &[Meteor] { &self.meteors }

  pub fn frame(&self) -> f32 { self.frame }

  /// Where `point` is drawn this frame.
  pub fn animated_position(&self, point: &StarPoint) -> Vec2 {
    point.position + self.parallax * point.depth
  }

  /// Frames elapsed since the previous tick, clamped. The first tick counts
  /// as one frame; a clock running backwards counts as none.
  fn frames_since(&mut self, elapsed: Duration) -> f32 {
    let frames = match self.last {
      None => 1.0,
      Some(last) => elapsed.saturating_sub(last).as_secs_f32() * REFERENCE_FPS,
    };
    self.last = Some(self.last.map_or(elapsed, |last| last.max(elapsed)));
    frames.clamp(0.0, self.config.max_frames)
  }

  /// Advance one display frame and paint it. `elapsed` is the time since
  /// the animation started and should not decrease.
  pub fn tick(
    &mut self,
    field: &mut Field,
    parallax_target: Vec2,
    elapsed: Duration,
    painter: &mut impl Painter,
  ) {
    let frames = self.frames_since(elapsed);
    self.frame += frames;

    let blend = 1.0 - (1.0 - self.config.damping).powf(frames);
    self.parallax = self.parallax + (parallax_target - self.parallax) * blend;

    self.paint_sky(field.viewport, painter);
    self.paint_links(field, painter);
    self.paint_points(field, frames, painter);
    self.advance_meteors(field.viewport, frames, painter);
  }

  fn paint_sky(&self, viewport: Viewport, painter: &mut impl Painter) {
    painter.fill_background(palette::SKY_TOP, palette::SKY_BOTTOM);
    let shift = self.parallax * self.config.glow_depth;
    for ((fx, fy), radius, color, alpha) in palette::GLOWS {
      painter.glow(viewport.at(fx, fy) + shift, radius * viewport.min_side(), color, alpha);
    }
  }

  fn paint_links(&self, field: &Field, painter: &mut impl Painter) {
    let pulse = 0.5 + 0.5 * (self.frame * 0.05).sin();
    for constellation in &field.constellations {
      for (a, b) in constellation.links() {
        let (Some(pa), Some(pb)) = (field.points.get(a), field.points.get(b)) else {
          continue;
        };
        let (from, to) = (self.animated_position(pa), self.animated_position(pb));
        let color = palette::CONSTELLATION_LINK;
        painter.line(from, to, 4.0, color, 0.08);
        painter.line(from, to, 1.2, color, 0.45);
        painter.line(from, to, 2.2, color, 0.06 + 0.14 * pulse);
      }
    }
  }

  fn paint_points(&mut self, field: &mut Field, frames: f32, painter: &mut impl Painter) {
    let (step, jitter) = (self.config.twinkle_step, self.config.twinkle_jitter);
    for point in &mut field.points {
      point.twinkle_phase =
        (point.twinkle_phase + (step + self.rng.gen_range(0.0..=jitter)) * frames)
          % std::f32::consts::TAU;
      let b = brightness(point.twinkle_phase);
      let at = point.position + self.parallax * point.depth;

      if point.is_constellation() {
        for (scale, alpha) in [(3.2, 0.05), (2.2, 0.10), (1.5, 0.18)] {
          painter.circle(at, point.radius * scale, point.color, alpha * (0.6 + 0.4 * b));
        }
        painter.circle(at, point.radius, point.color, 0.75 + 0.25 * b);
        painter.circle(at, point.radius * 0.45, palette::AMBIENT, 0.95);
      } else {
        painter.circle(at, point.radius * (0.8 + 0.4 * b), point.color, b);
      }
    }
  }

  fn advance_meteors(&mut self, viewport: Viewport, frames: f32, painter: &mut impl Painter) {
    while self.frame >= self.next_spawn {
      self.next_spawn += self.config.meteor_interval.max(1.0);
      if self.meteors.len() < self.config.max_meteors
        && self.rng.gen_bool(self.config.meteor_chance.clamp(0.0, 1.0))
      {
        let position = Vec2::new(
          self.rng.gen_range(0.0..=viewport.width),
          self.rng.gen_range(0.0..=viewport.height * 0.6),
        );
        let velocity = self.config.meteor_velocity * (viewport.width / REFERENCE_WIDTH);
        self.meteors.push(Meteor { position, velocity, life: self.config.meteor_life });
      }
    }

    let (segments, max_life) = (self.config.trail_segments, self.config.meteor_life.max(1.0));
    for meteor in &mut self.meteors {
      let fade = (meteor.life / max_life).clamp(0.0, 1.0);
      for s in 0..segments {
        let head = meteor.position - meteor.velocity * s as f32;
        let tail = head - meteor.velocity;
        let alpha = fade * (1.0 - s as f32 / segments as f32);
        painter.line(head, tail, 1.5, palette::METEOR, alpha);
      }
      meteor.position = meteor.position + meteor.velocity * frames;
      meteor.life -= frames;
    }
    self.meteors.retain(|m| m.life > 0.0 && viewport.contains(m.position));
  }
}
