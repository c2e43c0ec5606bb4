//! Sky pane: the animated star field on a braille canvas.
//!
//! The animator paints into a [`DrawList`] first; the canvas then replays it.
//! Braille dots cannot blend, so alpha is folded into the colour against the
//! sky and near-invisible strokes are dropped.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Style},
  symbols::Marker,
  widgets::{
    Clear, Paragraph,
    canvas::{Canvas, Circle, Context, Line, Points},
  },
};
use stargaze_field::{Painter, Rgb, Tooltip, Vec2, Viewport, palette};

use crate::app::App;

/// Braille dots per terminal cell.
const DOTS_X: f32 = 2.0;
const DOTS_Y: f32 = 4.0;

/// Strokes fainter than this are not drawn.
const MIN_ALPHA: f32 = 0.1;

/// Gain on glow alpha; a glow is only an outline here.
const GLOW_GAIN: f32 = 1.25;

/// The field viewport for a terminal area, in braille dots.
pub fn viewport_for(area: Rect) -> Viewport {
  Viewport::new(f32::from(area.width) * DOTS_X, f32::from(area.height) * DOTS_Y)
}

/// The viewport point under a terminal cell, if the cell is inside `area`.
pub fn cell_to_point(area: Rect, column: u16, row: u16) -> Option<Vec2> {
  let inside = column >= area.x
    && column < area.x + area.width
    && row >= area.y
    && row < area.y + area.height;
  inside.then(|| {
    Vec2::new(
      (f32::from(column - area.x) + 0.5) * DOTS_X,
      (f32::from(row - area.y) + 0.5) * DOTS_Y,
    )
  })
}

/// The terminal cell under a viewport point.
pub fn point_to_cell(area: Rect, p: Vec2) -> (u16, u16) {
  let col = (p.x / DOTS_X).max(0.0) as u16;
  let row = (p.y / DOTS_Y).max(0.0) as u16;
  (
    area.x + col.min(area.width.saturating_sub(1)),
    area.y + row.min(area.height.saturating_sub(1)),
  )
}

pub fn to_color(c: Rgb) -> Color { Color::Rgb(c.0, c.1, c.2) }

/// The one-line cell rect for `tip`, padded by a space on each side and kept
/// inside `area`.
pub fn tooltip_rect(area: Rect, tip: &Tooltip) -> Rect {
  let width = (tip.text.chars().count() as u16).saturating_add(2).min(area.width);
  let tip = tip.clone().clamped(viewport_for(area), f32::from(width) * DOTS_X);
  let (col, row) = point_to_cell(area, tip.anchor);
  Rect::new(col, row, width, 1)
}

#[derive(Debug, Clone, PartialEq)]
enum Op {
  Line { from: Vec2, to: Vec2, color: Color },
  Circle { center: Vec2, radius: f32, color: Color },
  Dot { at: Vec2, color: Color },
}

/// A recorded frame.
#[derive(Debug)]
pub struct DrawList {
  viewport:   Viewport,
  background: Color,
  ops:        Vec<Op>,
}

impl DrawList {
  pub fn new(viewport: Viewport) -> Self {
    Self { viewport, background: to_color(palette::SKY_TOP), ops: Vec::new() }
  }

  fn shade(color: Rgb, alpha: f32) -> Option<Color> {
    (alpha >= MIN_ALPHA).then(|| to_color(palette::SKY_TOP.lerp(color, alpha)))
  }

  /// Canvas y grows upward.
  fn flip(&self, p: Vec2) -> (f64, f64) {
    (f64::from(p.x), f64::from(self.viewport.height - p.y))
  }

  fn replay(&self, ctx: &mut Context<'_>) {
    for op in &self.ops {
      match *op {
        Op::Line { from, to, color } => {
          let ((x1, y1), (x2, y2)) = (self.flip(from), self.flip(to));
          ctx.draw(&Line { x1, y1, x2, y2, color });
        }
        Op::Circle { center, radius, color } => {
          let (x, y) = self.flip(center);
          ctx.draw(&Circle { x, y, radius: f64::from(radius), color });
        }
        Op::Dot { at, color } => {
          let coords = [self.flip(at)];
          ctx.draw(&Points { coords: &coords, color });
        }
      }
    }
  }
}

impl Painter for DrawList {
  fn fill_background(&mut self, top: Rgb, bottom: Rgb) {
    self.background = to_color(top.lerp(bottom, 0.5));
  }

  fn glow(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32) {
    if let Some(color) = Self::shade(color, alpha * GLOW_GAIN) {
      self.ops.push(Op::Circle { center, radius, color });
    }
  }

  fn line(&mut self, from: Vec2, to: Vec2, _width: f32, color: Rgb, alpha: f32) {
    if let Some(color) = Self::shade(color, alpha) {
      self.ops.push(Op::Line { from, to, color });
    }
  }

  fn circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32) {
    let Some(color) = Self::shade(color, alpha) else { return };
    if radius < 1.5 {
      self.ops.push(Op::Dot { at: center, color });
    } else {
      self.ops.push(Op::Circle { center, radius, color });
    }
  }
}

/// Advance the animation one frame and render the sky into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &mut App) {
  let viewport = viewport_for(area);
  app.sky_area = area;
  app.state.resize(viewport);

  let mut list = DrawList::new(viewport);
  app.paint_frame(&mut list);

  let canvas = Canvas::default()
    .marker(Marker::Braille)
    .background_color(list.background)
    .x_bounds([0.0, f64::from(viewport.width)])
    .y_bounds([0.0, f64::from(viewport.height)])
    .paint(|ctx| list.replay(ctx));
  f.render_widget(canvas, area);

  if let Some(tip) = app.pointer.tooltip() {
    let rect = tooltip_rect(area, tip);
    let text = format!(" {} ", tip.text);
    f.render_widget(Clear, rect);
    let style = Style::default()
      .fg(Color::Black)
      .bg(to_color(palette::CONSTELLATION));
    f.render_widget(Paragraph::new(text).style(style), rect);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn viewport_is_braille_resolution() {
    let vp = viewport_for(Rect::new(0, 1, 80, 22));
    assert_eq!(vp, Viewport::new(160.0, 88.0));
  }

  #[test]
  fn cells_map_into_and_out_of_viewport() {
    let area = Rect::new(0, 1, 80, 22);
    assert_eq!(cell_to_point(area, 0, 0), None);
    let p = cell_to_point(area, 10, 5).unwrap();
    assert_eq!(p, Vec2::new(21.0, 18.0));
    assert_eq!(point_to_cell(area, p), (10, 5));
    assert_eq!(point_to_cell(area, Vec2::new(1e6, 1e6)), (79, 22));
  }

  #[test]
  fn tooltip_stays_inside_the_sky() {
    let area = Rect::new(0, 1, 40, 10);
    let tip = Tooltip { text: "Ada · March".into(), anchor: Vec2::new(78.0, -12.0) };
    let rect = tooltip_rect(area, &tip);
    assert_eq!(rect.width, 13);
    assert_eq!(rect.y, 1);
    assert!(rect.x + rect.width <= area.x + area.width);

    let wide = Tooltip { text: "x".repeat(100), anchor: Vec2::new(10.0, 10.0) };
    assert_eq!(tooltip_rect(area, &wide), Rect::new(0, 3, 40, 1));
  }

  #[test]
  fn faint_strokes_are_dropped_and_small_stars_are_dots() {
    let mut list = DrawList::new(Viewport::new(100.0, 100.0));
    list.line(Vec2::ZERO, Vec2::new(5.0, 5.0), 1.0, palette::METEOR, 0.05);
    assert!(list.ops.is_empty());
    list.circle(Vec2::new(3.0, 3.0), 1.0, palette::AMBIENT, 1.0);
    list.circle(Vec2::new(3.0, 3.0), 4.0, palette::AMBIENT, 1.0);
    assert!(matches!(list.ops[0], Op::Dot { .. }));
    assert!(matches!(list.ops[1], Op::Circle { .. }));
  }

  #[test]
  fn canvas_y_is_flipped() {
    let list = DrawList::new(Viewport::new(100.0, 50.0));
    assert_eq!(list.flip(Vec2::new(10.0, 0.0)), (10.0, 50.0));
  }
}
