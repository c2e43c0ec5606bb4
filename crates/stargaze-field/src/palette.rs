//! Colours of the sky.
//!
//! Participation stars are tinted by the phase of the action they stand for,
//! so a glance at the sky shows the balance between preparation and the day
//! itself.

use stargaze_core::action::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
  /// Linear blend towards `other`; `t` is clamped to `[0, 1]`.
  pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8;
    Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
  }
}

pub const AMBIENT: Rgb = Rgb(255, 255, 255);
/// Support actions ahead of the event.
pub const BEFORE: Rgb = Rgb(158, 203, 255);
/// Primary actions on the day.
pub const DAY: Rgb = Rgb(255, 210, 127);
/// A participation with no known phase.
pub const UNKNOWN: Rgb = Rgb(255, 244, 214);
pub const CONSTELLATION: Rgb = Rgb(255, 236, 200);
pub const CONSTELLATION_LINK: Rgb = Rgb(190, 210, 255);
pub const METEOR: Rgb = Rgb(235, 245, 255);

pub const SKY_TOP: Rgb = Rgb(4, 6, 20);
pub const SKY_BOTTOM: Rgb = Rgb(18, 22, 56);

/// Soft ambience blobs: relative centre, radius as a fraction of the shorter
/// viewport side, colour and alpha.
pub const GLOWS: [((f32, f32), f32, Rgb, f32); 3] = [
  ((0.22, 0.30), 0.45, Rgb(70, 60, 160), 0.18),
  ((0.78, 0.22), 0.35, Rgb(40, 110, 170), 0.14),
  ((0.55, 0.82), 0.50, Rgb(110, 50, 130), 0.12),
];

pub fn phase_color(phase: Option<Phase>) -> Rgb {
  match phase {
    Some(Phase::Before) => BEFORE,
    Some(Phase::Day) => DAY,
    None => UNKNOWN,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lerp_endpoints_and_clamp() {
    let a = Rgb(0, 0, 0);
    let b = Rgb(200, 100, 50);
    assert_eq!(a.lerp(b, 0.0), a);
    assert_eq!(a.lerp(b, 1.0), b);
    assert_eq!(a.lerp(b, 7.0), b);
    assert_eq!(a.lerp(b, 0.5), Rgb(100, 50, 25));
  }

  #[test]
  fn phases_have_distinct_hues() {
    assert_ne!(phase_color(Some(Phase::Before)), phase_color(Some(Phase::Day)));
    assert_eq!(phase_color(None), UNKNOWN);
  }
}
