//! Viewer state and event dispatcher.

use std::{
  sync::Arc,
  time::{Duration, Instant},
};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use stargaze_core::stats::{SkySnapshot, SkyStats};
use stargaze_field::{
  Animator, FieldConfig, Painter, PointerTracker, RefreshHandle, RefreshLoop, ReseedPolicy,
  SkyState, Vec2, Viewport, animate::parallax_target,
};
use tokio::sync::watch;
use tracing::info;

use crate::{client::ApiClient, ui::sky};

/// Largest parallax shift, in braille dots.
const PARALLAX_SHIFT: f32 = 3.0;

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level viewer state.
pub struct App {
  /// Owned field, stats and reseed policy of the sky on screen.
  pub state: SkyState,

  pub animator: Animator,

  /// Pointer position and the tooltip under it.
  pub pointer: PointerTracker,

  /// Stats as last published by `state`; drives the header.
  pub stats: watch::Receiver<SkyStats>,

  /// Where the sky was last drawn, in terminal cells.
  pub sky_area: Rect,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  refresh: RefreshHandle,
  updates: watch::Receiver<Option<SkySnapshot>>,
  started: Instant,
}

impl App {
  /// Start polling `sky_id` through `client`. Must be called inside a tokio
  /// runtime.
  pub fn new(client: ApiClient, sky_id: &str, every: Duration, policy: ReseedPolicy) -> Self {
    let state = SkyState::new(sky_id, Viewport::default(), FieldConfig::default(), policy);
    let stats = state.subscribe();
    let refresh = RefreshLoop::spawn(Arc::new(client), sky_id, every);
    let updates = refresh.subscribe();
    Self {
      state,
      animator: Animator::default(),
      pointer: PointerTracker::default(),
      stats,
      sky_area: Rect::default(),
      status_msg: "Loading sky…".into(),
      refresh,
      updates,
      started: Instant::now(),
    }
  }

  // ── Frame ─────────────────────────────────────────────────────────────────

  /// Apply a finished refresh, if one arrived since the last frame. Until the
  /// first one arrives, the status bar carries the last fetch error.
  pub fn sync(&mut self) {
    if self.state.poll(&mut self.updates) {
      self.status_msg.clear();
      if let Some(p) = self.pointer.pointer() {
        self.pointer.moved(p, &self.state.field().points, self.animator.parallax());
      }
    } else if !self.refresh.has_snapshot() {
      if let Some(e) = self.refresh.last_error() {
        self.status_msg = format!("Waiting for server: {e}");
      }
    }
  }

  /// Advance the animation one frame onto `painter`.
  pub fn paint_frame(&mut self, painter: &mut impl Painter) {
    let viewport = self.state.viewport();
    let target = self
      .pointer
      .pointer()
      .map_or(Vec2::ZERO, |p| parallax_target(p, viewport, PARALLAX_SHIFT));
    self
      .animator
      .tick(self.state.field_mut(), target, self.started.elapsed(), painter);
  }

  // ── Events ────────────────────────────────────────────────────────────────

  /// Handle a key press. Returns `false` when the viewer should exit.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }
    match key.code {
      KeyCode::Char('q') | KeyCode::Esc => return false,
      KeyCode::Char('r') => {
        self.refresh.refresh_now();
        self.status_msg = "Refreshing…".into();
      }
      KeyCode::Char('p') => {
        let next = match self.state.policy() {
          ReseedPolicy::Regenerate => ReseedPolicy::Preserve,
          ReseedPolicy::Preserve => ReseedPolicy::Regenerate,
        };
        self.state.set_policy(next);
        info!(policy = ?next, "reseed policy changed");
        self.status_msg = format!("Reseed policy: {next:?}");
      }
      _ => {}
    }
    true
  }

  /// Hit-test on pointer movement; hide the tooltip when the pointer leaves
  /// the sky.
  pub fn handle_mouse(&mut self, mouse: MouseEvent) {
    if !matches!(mouse.kind, MouseEventKind::Moved | MouseEventKind::Drag(_)) {
      return;
    }
    match sky::cell_to_point(self.sky_area, mouse.column, mouse.row) {
      Some(p) => {
        self.pointer.moved(p, &self.state.field().points, self.animator.parallax());
      }
      None => self.pointer.left(),
    }
  }

  /// Stop the refresh loop.
  pub async fn shutdown(self) { self.refresh.shutdown().await; }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::client::ApiConfig;

  #[tokio::test]
  async fn unreachable_server_shows_waiting_status() {
    let client = ApiClient::new(ApiConfig { base_url: "http://127.0.0.1:1".into() }).unwrap();
    let mut app = App::new(client, "demo", Duration::from_millis(50), ReseedPolicy::default());
    assert_eq!(app.status_msg, "Loading sky…");

    tokio::time::timeout(Duration::from_secs(5), async {
      loop {
        app.sync();
        if app.status_msg.starts_with("Waiting for server") {
          break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
      }
    })
    .await
    .unwrap();
    assert_eq!(app.stats.borrow().total_stars, 0);
    app.shutdown().await;
  }
}
