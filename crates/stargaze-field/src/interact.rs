//! Pointer hit-testing.
//!
//! Runs on pointer events, not on the animation clock, against the points'
//! current animated positions.

use crate::{
  generate::StarPoint,
  geometry::{Vec2, Viewport},
};

/// Hit radius as a multiple of a star's drawn radius.
pub const DEFAULT_HIT_FACTOR: f32 = 3.0;

/// The star under `pointer`, if any.
///
/// A star is hit when the pointer is strictly closer than `radius * k` to its
/// parallax-shifted position. When several are hit the closest wins; equal
/// distances go to the earlier star.
pub fn hit_test<'a>(
  pointer: Vec2,
  points: &'a [StarPoint],
  parallax: Vec2,
  k: f32,
) -> Option<&'a StarPoint> {
  points
    .iter()
    .filter_map(|p| {
      let d = pointer.distance(p.position + parallax * p.depth);
      (d < p.radius * k).then_some((d, p))
    })
    .min_by(|(a, _), (b, _)| a.total_cmp(b))
    .map(|(_, p)| p)
}

/// A pointer-anchored label.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
  pub text:   String,
  pub anchor: Vec2,
}

impl Tooltip {
  /// Offset of the label from the pointer.
  const OFFSET: Vec2 = Vec2::new(12.0, -12.0);

  pub fn for_point(point: &StarPoint, pointer: Vec2) -> Self {
    Self { text: point.label.clone(), anchor: pointer + Self::OFFSET }
  }

  /// Keep the anchor inside `viewport` for a label `width` units wide.
  pub fn clamped(mut self, viewport: Viewport, width: f32) -> Self {
    let max_x = (viewport.width - width).max(0.0);
    self.anchor.x = self.anchor.x.clamp(0.0, max_x);
    self.anchor.y = self.anchor.y.clamp(0.0, viewport.height);
    self
  }
}

/// Tracks the last pointer position and recomputes the tooltip only when the
/// pointer moves.
#[derive(Debug, Default)]
pub struct PointerTracker {
  pointer: Option<Vec2>,
  tooltip: Option<Tooltip>,
}

impl PointerTracker {
  pub fn pointer(&self) -> Option<Vec2> { self.pointer }

  pub fn tooltip(&self) -> Option<&Tooltip> { self.tooltip.as_ref() }

  /// Handle a pointer move. Returns the visible tooltip.
  pub fn moved(&mut self, pointer: Vec2, points: &[StarPoint], parallax: Vec2) -> Option<&Tooltip> {
    self.pointer = Some(pointer);
    self.tooltip = hit_test(pointer, points, parallax, DEFAULT_HIT_FACTOR)
      .map(|p| Tooltip::for_point(p, pointer));
    self.tooltip.as_ref()
  }

  /// Pointer left the surface.
  pub fn left(&mut self) {
    self.pointer = None;
    self.tooltip = None;
  }
}

#[cfg(test)]
mod tests {
  use rand::{SeedableRng, rngs::StdRng};

  use super::*;
  use crate::{
    generate::{FieldConfig, StarKind, seed_with},
    palette,
  };

  fn star(x: f32, y: f32, radius: f32, label: &str) -> StarPoint {
    StarPoint {
      position:      Vec2::new(x, y),
      radius,
      twinkle_phase: 0.0,
      depth:         1.0,
      color:         palette::AMBIENT,
      label:         label.into(),
      kind:          StarKind::Ambient,
    }
  }

  #[test]
  fn hit_iff_within_scaled_radius() {
    let points = [star(100.0, 100.0, 2.0, "a")];
    assert!(hit_test(Vec2::new(105.9, 100.0), &points, Vec2::ZERO, 3.0).is_some());
    assert!(hit_test(Vec2::new(106.0, 100.0), &points, Vec2::ZERO, 3.0).is_none());
    assert!(hit_test(Vec2::new(100.0, 94.5), &points, Vec2::ZERO, 3.0).is_some());
  }

  #[test]
  fn closest_star_wins_over_insertion_order() {
    let points = [star(100.0, 100.0, 4.0, "far"), star(104.0, 100.0, 4.0, "near")];
    let hit = hit_test(Vec2::new(103.0, 100.0), &points, Vec2::ZERO, 3.0);
    assert_eq!(hit.map(|p| p.label.as_str()), Some("near"));
  }

  #[test]
  fn equal_distance_keeps_first() {
    let points = [star(98.0, 100.0, 4.0, "left"), star(102.0, 100.0, 4.0, "right")];
    let hit = hit_test(Vec2::new(100.0, 100.0), &points, Vec2::ZERO, 3.0);
    assert_eq!(hit.map(|p| p.label.as_str()), Some("left"));
  }

  #[test]
  fn uses_parallax_shifted_position() {
    let mut s = star(100.0, 100.0, 1.0, "a");
    s.depth = 0.5;
    let points = [s];
    let parallax = Vec2::new(20.0, 0.0);
    assert!(hit_test(Vec2::new(100.0, 100.0), &points, parallax, 3.0).is_none());
    assert!(hit_test(Vec2::new(110.0, 100.0), &points, parallax, 3.0).is_some());
  }

  #[test]
  fn far_pointer_misses_whole_field() {
    let field = seed_with(
      120,
      &[],
      Viewport::new(400.0, 300.0),
      &FieldConfig::default(),
      &mut StdRng::seed_from_u64(1),
    );
    let reach = field.points.iter().map(|p| p.radius).fold(0.0, f32::max) * DEFAULT_HIT_FACTOR;
    let pointer = Vec2::new(400.0 + reach + 1.0, 300.0 + reach + 1.0);
    assert!(hit_test(pointer, &field.points, Vec2::ZERO, DEFAULT_HIT_FACTOR).is_none());

    let target = &field.points[7];
    let hit = hit_test(target.position, &field.points, Vec2::ZERO, DEFAULT_HIT_FACTOR);
    assert!(hit.is_some());
  }

  #[test]
  fn tracker_shows_and_hides_tooltip() {
    let points = [star(50.0, 50.0, 2.0, "Ada · Flyers")];
    let mut tracker = PointerTracker::default();
    let tip = tracker.moved(Vec2::new(51.0, 50.0), &points, Vec2::ZERO).cloned();
    assert_eq!(tip.map(|t| t.text), Some("Ada · Flyers".to_owned()));
    assert!(tracker.moved(Vec2::new(200.0, 50.0), &points, Vec2::ZERO).is_none());
    tracker.left();
    assert!(tracker.pointer().is_none());
  }

  #[test]
  fn tooltip_clamps_to_viewport() {
    let s = star(395.0, 5.0, 1.0, "edge");
    let tip = Tooltip::for_point(&s, Vec2::new(395.0, 5.0)).clamped(Viewport::new(400.0, 300.0), 40.0);
    assert_eq!(tip.anchor, Vec2::new(360.0, 0.0));
  }
}
