//! The constellation library.
//!
//! Each milestone of the sky's score adds one constellation. Shapes are taken
//! from this fixed library in order, cycling, so the `c`-th constellation of
//! a sky is always the same shape no matter how often the field is reseeded.
//!
//! Coordinates are in a unit square with y growing downward. Every template
//! has exactly [`TEMPLATE_SIZE`] stars.

pub const TEMPLATE_SIZE: usize = 7;

#[derive(Debug)]
pub struct Template {
  /// Stable identifier.
  pub name:   &'static str,
  /// Human-readable name used in tooltips.
  pub title:  &'static str,
  pub points: [(f32, f32); TEMPLATE_SIZE],
  /// Pairs of indices into `points`.
  pub edges:  &'static [(usize, usize)],
}

pub const TEMPLATES: [Template; 4] = [
  // Alkaid, Mizar, Alioth, Megrez, Phecda, Merak, Dubhe.
  Template {
    name:   "dipper",
    title:  "The Dipper",
    points: [
      (0.00, 0.15),
      (0.18, 0.25),
      (0.33, 0.32),
      (0.50, 0.40),
      (0.55, 0.72),
      (0.92, 0.78),
      (0.97, 0.42),
    ],
    edges:  &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 6), (6, 3)],
  },
  // Betelgeuse, Bellatrix, the belt, Saiph, Rigel.
  Template {
    name:   "hunter",
    title:  "The Hunter",
    points: [
      (0.15, 0.08),
      (0.80, 0.14),
      (0.38, 0.50),
      (0.50, 0.47),
      (0.62, 0.44),
      (0.25, 0.92),
      (0.85, 0.88),
    ],
    edges:  &[(0, 1), (0, 2), (1, 4), (2, 3), (3, 4), (2, 5), (4, 6)],
  },
  // Deneb, Sadr, Eta, Albireo and the wings.
  Template {
    name:   "swan",
    title:  "The Swan",
    points: [
      (0.50, 0.00),
      (0.50, 0.35),
      (0.50, 0.66),
      (0.50, 1.00),
      (0.12, 0.24),
      (0.82, 0.44),
      (1.00, 0.58),
    ],
    edges:  &[(0, 1), (1, 2), (2, 3), (1, 4), (1, 5), (5, 6)],
  },
  // The arc of the northern crown.
  Template {
    name:   "crown",
    title:  "The Crown",
    points: [
      (0.00, 0.30),
      (0.12, 0.62),
      (0.30, 0.85),
      (0.50, 0.92),
      (0.70, 0.85),
      (0.88, 0.62),
      (1.00, 0.30),
    ],
    edges:  &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 6)],
  },
];

/// The template of the `c`-th constellation.
pub fn template_for(c: usize) -> &'static Template { &TEMPLATES[c % TEMPLATES.len()] }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn templates_are_well_formed() {
    for t in &TEMPLATES {
      assert!(!t.edges.is_empty(), "{} has no edges", t.name);
      for &(a, b) in t.edges {
        assert!(a < TEMPLATE_SIZE && b < TEMPLATE_SIZE, "{} edge out of range", t.name);
        assert_ne!(a, b);
      }
      for &(x, y) in &t.points {
        assert!((0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y));
      }
    }
  }

  #[test]
  fn selection_cycles_through_library() {
    assert_eq!(template_for(0).name, "dipper");
    assert_eq!(template_for(1).name, "hunter");
    assert_eq!(template_for(4).name, "dipper");
    assert_eq!(template_for(7).name, "crown");
  }
}
