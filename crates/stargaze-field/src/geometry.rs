//! Plain 2-D vector and viewport types in viewport units (y grows downward).

use std::ops::{Add, Mul, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
  pub x: f32,
  pub y: f32,
}

impl Vec2 {
  pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

  pub const fn new(x: f32, y: f32) -> Self { Self { x, y } }

  pub fn length(self) -> f32 { self.x.hypot(self.y) }

  pub fn distance(self, other: Self) -> f32 { (self - other).length() }
}

impl Add for Vec2 {
  type Output = Self;

  fn add(self, rhs: Self) -> Self { Self::new(self.x + rhs.x, self.y + rhs.y) }
}

impl Sub for Vec2 {
  type Output = Self;

  fn sub(self, rhs: Self) -> Self { Self::new(self.x - rhs.x, self.y - rhs.y) }
}

impl Mul<f32> for Vec2 {
  type Output = Self;

  fn mul(self, rhs: f32) -> Self { Self::new(self.x * rhs, self.y * rhs) }
}

/// The drawable surface, sized by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
  pub width:  f32,
  pub height: f32,
}

impl Viewport {
  /// A viewport of at least one unit in each direction.
  pub fn new(width: f32, height: f32) -> Self {
    Self { width: width.max(1.0), height: height.max(1.0) }
  }

  pub fn center(self) -> Vec2 { Vec2::new(self.width / 2.0, self.height / 2.0) }

  /// Scale a point given in fractions of the viewport.
  pub fn at(self, fx: f32, fy: f32) -> Vec2 { Vec2::new(fx * self.width, fy * self.height) }

  pub fn contains(self, p: Vec2) -> bool {
    (0.0..=self.width).contains(&p.x) && (0.0..=self.height).contains(&p.y)
  }

  pub fn min_side(self) -> f32 { self.width.min(self.height) }
}

impl Default for Viewport {
  fn default() -> Self { Self::new(800.0, 600.0) }
}
